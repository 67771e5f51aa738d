//! Reading extended signal information from a modem.

use zbus::Connection;

use crate::Result;
use crate::api::models::{
    CdmaSignal, EvdoSignal, GsmSignal, LteSignal, ModemError, Reading, SignalValues, UmtsSignal,
};
use crate::dbus::MMSignalProxy;

async fn signal_proxy<'a>(conn: &'a Connection, modem_path: &'a str) -> Result<MMSignalProxy<'a>> {
    Ok(MMSignalProxy::builder(conn)
        .path(modem_path)?
        .build()
        .await?)
}

fn read_failed(modem_path: &str, what: &str) -> impl FnOnce(zbus::Error) -> ModemError + use<> {
    let context = format!("failed to read {what} of {modem_path}");
    move |source| ModemError::DbusOperation { context, source }
}

/// Reads the current refresh rate.
pub(crate) async fn rate(conn: &Connection, modem_path: &str) -> Result<u32> {
    let proxy = signal_proxy(conn, modem_path).await?;
    proxy
        .rate()
        .await
        .map_err(read_failed(modem_path, "signal refresh rate"))
}

/// Requests a new refresh rate.
pub(crate) async fn setup(conn: &Connection, modem_path: &str, rate: u32) -> Result<()> {
    let proxy = signal_proxy(conn, modem_path).await?;
    proxy
        .setup(rate)
        .await
        .map_err(|e| ModemError::DbusOperation {
            context: format!("failed to set signal refresh rate {rate} on {modem_path}"),
            source: e,
        })
}

/// Reads every measurement property and rebuilds the snapshot.
///
/// A technology counts as available when its first field is marked valid.
pub(crate) async fn values(conn: &Connection, modem_path: &str) -> Result<SignalValues> {
    let proxy = signal_proxy(conn, modem_path).await?;
    let failed = |what: &str| read_failed(modem_path, what);

    let cdma_rssi = proxy.cdma_rssi().await.map_err(failed("CdmaRssi"))?;
    let cdma_ecio = proxy.cdma_ecio().await.map_err(failed("CdmaEcio"))?;
    let evdo_rssi = proxy.evdo_rssi().await.map_err(failed("EvdoRssi"))?;
    let evdo_ecio = proxy.evdo_ecio().await.map_err(failed("EvdoEcio"))?;
    let evdo_sinr = proxy.evdo_sinr().await.map_err(failed("EvdoSinr"))?;
    let evdo_io = proxy.evdo_io().await.map_err(failed("EvdoIo"))?;
    let gsm_rssi = proxy.gsm_rssi().await.map_err(failed("GsmRssi"))?;
    let umts_rssi = proxy.umts_rssi().await.map_err(failed("UmtsRssi"))?;
    let umts_ecio = proxy.umts_ecio().await.map_err(failed("UmtsEcio"))?;
    let lte_rssi = proxy.lte_rssi().await.map_err(failed("LteRssi"))?;
    let lte_rsrq = proxy.lte_rsrq().await.map_err(failed("LteRsrq"))?;
    let lte_rsrp = proxy.lte_rsrp().await.map_err(failed("LteRsrp"))?;
    let lte_snr = proxy.lte_snr().await.map_err(failed("LteSnr"))?;

    Ok(SignalValues {
        cdma: valid(cdma_rssi).then_some(CdmaSignal {
            rssi: cdma_rssi.1,
            ecio: cdma_ecio.1,
        }),
        evdo: valid(evdo_rssi).then_some(EvdoSignal {
            rssi: evdo_rssi.1,
            ecio: evdo_ecio.1,
            sinr: evdo_sinr.1,
            io: evdo_io.1,
        }),
        gsm: valid(gsm_rssi).then_some(GsmSignal { rssi: gsm_rssi.1 }),
        umts: valid(umts_rssi).then_some(UmtsSignal {
            rssi: umts_rssi.1,
            ecio: umts_ecio.1,
        }),
        lte: valid(lte_rssi).then_some(LteSignal {
            rssi: lte_rssi.1,
            rsrq: lte_rsrq.1,
            rsrp: lte_rsrp.1,
            snr: lte_snr.1,
        }),
    })
}

fn valid(reading: Reading) -> bool {
    reading.0
}
