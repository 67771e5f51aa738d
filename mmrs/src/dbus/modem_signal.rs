//! ModemManager Signal proxy.

use zbus::{Result, proxy};

/// Proxy for a modem's extended signal interface.
///
/// Each measurement property is a `(valid, value)` pair; `valid` is `false`
/// while the technology is not reported.
#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Signal",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait MMSignal {
    /// Sets the refresh rate in seconds (0 disables refreshing).
    fn setup(&self, rate: u32) -> Result<()>;

    /// Current refresh rate in seconds.
    #[zbus(property)]
    fn rate(&self) -> Result<u32>;

    #[zbus(property)]
    fn cdma_rssi(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn cdma_ecio(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn evdo_rssi(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn evdo_ecio(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn evdo_sinr(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn evdo_io(&self) -> Result<(bool, f64)>;

    /// GSM received signal strength (dBm).
    #[zbus(property)]
    fn gsm_rssi(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn umts_rssi(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn umts_ecio(&self) -> Result<(bool, f64)>;

    #[zbus(property)]
    fn lte_rssi(&self) -> Result<(bool, f64)>;

    /// LTE reference signal received quality (dB).
    #[zbus(property)]
    fn lte_rsrq(&self) -> Result<(bool, f64)>;

    /// LTE reference signal received power (dBm).
    #[zbus(property)]
    fn lte_rsrp(&self) -> Result<(bool, f64)>;

    /// LTE signal-to-noise ratio (dB).
    #[zbus(property)]
    fn lte_snr(&self) -> Result<(bool, f64)>;
}
