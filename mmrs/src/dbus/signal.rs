//! Served `org.freedesktop.ModemManager1.Modem.Signal` interface.
//!
//! The interface object only mirrors state: `Setup` calls are forwarded to the
//! device's [`SignalService`](crate::SignalService) and property values are
//! pushed in by the service through [`DbusSignalSkeleton`].

use async_trait::async_trait;
use log::debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use zbus::message::Header;
use zbus::object_server::SignalEmitter;
use zbus::{Connection, fdo, interface};
use zvariant::OwnedObjectPath;

use crate::Result;
use crate::api::hooks::{SignalExporter, SignalSkeleton};
use crate::api::models::{ModemError, Reading, Requester, SignalValues, Technology};
use crate::api::service::SignalHandle;

/// Values exposed as properties.
#[derive(Debug, Default)]
struct Published {
    rate: u32,
    values: SignalValues,
}

#[derive(Debug, Clone, Default)]
struct SharedState(Arc<Mutex<Published>>);

impl SharedState {
    fn lock(&self) -> MutexGuard<'_, Published> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reading(&self, technology: Technology, field: &str) -> Reading {
        self.lock().values.reading(technology, field)
    }
}

/// The object registered on the bus.
pub struct SignalInterface {
    state: SharedState,
    handle: SignalHandle,
}

#[interface(name = "org.freedesktop.ModemManager1.Modem.Signal")]
impl SignalInterface {
    /// Sets the refresh rate in seconds; `0` disables refreshing.
    async fn setup(&self, rate: u32, #[zbus(header)] header: Header<'_>) -> fdo::Result<()> {
        let requester = header
            .sender()
            .map(|sender| Requester::new(sender.as_str()))
            .ok_or_else(|| fdo::Error::AccessDenied("Request has no sender".into()))?;
        debug!("Signal.Setup({rate}) from {requester}");
        self.handle.setup(rate, requester).await.map_err(Into::into)
    }

    #[zbus(property)]
    fn rate(&self) -> u32 {
        self.state.lock().rate
    }

    #[zbus(property)]
    fn cdma_rssi(&self) -> Reading {
        self.state.reading(Technology::Cdma, "rssi")
    }

    #[zbus(property)]
    fn cdma_ecio(&self) -> Reading {
        self.state.reading(Technology::Cdma, "ecio")
    }

    #[zbus(property)]
    fn evdo_rssi(&self) -> Reading {
        self.state.reading(Technology::Evdo, "rssi")
    }

    #[zbus(property)]
    fn evdo_ecio(&self) -> Reading {
        self.state.reading(Technology::Evdo, "ecio")
    }

    #[zbus(property)]
    fn evdo_sinr(&self) -> Reading {
        self.state.reading(Technology::Evdo, "sinr")
    }

    #[zbus(property)]
    fn evdo_io(&self) -> Reading {
        self.state.reading(Technology::Evdo, "io")
    }

    #[zbus(property)]
    fn gsm_rssi(&self) -> Reading {
        self.state.reading(Technology::Gsm, "rssi")
    }

    #[zbus(property)]
    fn umts_rssi(&self) -> Reading {
        self.state.reading(Technology::Umts, "rssi")
    }

    #[zbus(property)]
    fn umts_ecio(&self) -> Reading {
        self.state.reading(Technology::Umts, "ecio")
    }

    #[zbus(property)]
    fn lte_rssi(&self) -> Reading {
        self.state.reading(Technology::Lte, "rssi")
    }

    #[zbus(property)]
    fn lte_rsrq(&self) -> Reading {
        self.state.reading(Technology::Lte, "rsrq")
    }

    #[zbus(property)]
    fn lte_rsrp(&self) -> Reading {
        self.state.reading(Technology::Lte, "rsrp")
    }

    #[zbus(property)]
    fn lte_snr(&self) -> Reading {
        self.state.reading(Technology::Lte, "snr")
    }
}

impl SignalInterface {
    async fn emit_reading_changed(
        &self,
        emitter: &SignalEmitter<'_>,
        technology: Technology,
        field: &str,
    ) -> zbus::Result<()> {
        match (technology, field) {
            (Technology::Cdma, "rssi") => self.cdma_rssi_changed(emitter).await,
            (Technology::Cdma, "ecio") => self.cdma_ecio_changed(emitter).await,
            (Technology::Evdo, "rssi") => self.evdo_rssi_changed(emitter).await,
            (Technology::Evdo, "ecio") => self.evdo_ecio_changed(emitter).await,
            (Technology::Evdo, "sinr") => self.evdo_sinr_changed(emitter).await,
            (Technology::Evdo, "io") => self.evdo_io_changed(emitter).await,
            (Technology::Gsm, "rssi") => self.gsm_rssi_changed(emitter).await,
            (Technology::Umts, "rssi") => self.umts_rssi_changed(emitter).await,
            (Technology::Umts, "ecio") => self.umts_ecio_changed(emitter).await,
            (Technology::Lte, "rssi") => self.lte_rssi_changed(emitter).await,
            (Technology::Lte, "rsrq") => self.lte_rsrq_changed(emitter).await,
            (Technology::Lte, "rsrp") => self.lte_rsrp_changed(emitter).await,
            (Technology::Lte, "snr") => self.lte_snr_changed(emitter).await,
            _ => Ok(()),
        }
    }
}

/// Pushes rate and value updates into the exported object.
///
/// Updates made before the object is exported are kept and become visible
/// once it is.
pub struct DbusSignalSkeleton {
    conn: Connection,
    path: OwnedObjectPath,
    state: SharedState,
}

#[async_trait]
impl SignalSkeleton for DbusSignalSkeleton {
    async fn set_rate(&self, rate: u32) -> Result<()> {
        self.state.lock().rate = rate;
        let Ok(iface) = self
            .conn
            .object_server()
            .interface::<_, SignalInterface>(self.path.as_str())
            .await
        else {
            return Ok(());
        };
        iface.get().await.rate_changed(iface.signal_emitter()).await?;
        Ok(())
    }

    async fn publish(&self, values: &SignalValues) -> Result<()> {
        let previous = std::mem::replace(&mut self.state.lock().values, *values);
        let changed = values.changed_readings(&previous);
        if changed.is_empty() {
            return Ok(());
        }
        let Ok(iface) = self
            .conn
            .object_server()
            .interface::<_, SignalInterface>(self.path.as_str())
            .await
        else {
            return Ok(());
        };
        let iface_ref = iface.get().await;
        for (technology, field) in changed {
            iface_ref
                .emit_reading_changed(iface.signal_emitter(), technology, field)
                .await?;
        }
        Ok(())
    }
}

/// Exports [`SignalInterface`] on a connection's object server.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use mmrs::{DbusSignalExporter, ModemState, SignalController, SignalHandle};
/// # use mmrs::Authorizer;
///
/// # async fn example(authorizer: Arc<dyn Authorizer>) -> mmrs::Result<()> {
/// let conn = zbus::Connection::session().await?;
/// let (handle, requests) = SignalHandle::channel(16);
/// let exporter = DbusSignalExporter::new(
///     conn,
///     "/org/freedesktop/ModemManager1/Modem/0",
///     handle.clone(),
/// )?;
/// let controller = SignalController::builder(
///     Arc::new(|| ModemState::Enabled),
///     authorizer,
///     Arc::new(exporter),
/// )
/// .build()?;
/// # Ok(())
/// # }
/// ```
pub struct DbusSignalExporter {
    conn: Connection,
    path: OwnedObjectPath,
    handle: SignalHandle,
    state: SharedState,
}

impl DbusSignalExporter {
    /// Creates an exporter for the object at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidArgument` if `path` is not a valid object
    /// path.
    pub fn new(conn: Connection, path: &str, handle: SignalHandle) -> Result<Self> {
        let path = OwnedObjectPath::try_from(path)
            .map_err(|e| ModemError::InvalidArgument(format!("invalid object path '{path}': {e}")))?;
        Ok(Self {
            conn,
            path,
            handle,
            state: SharedState::default(),
        })
    }
}

#[async_trait]
impl SignalExporter for DbusSignalExporter {
    fn create_skeleton(&self) -> Arc<dyn SignalSkeleton> {
        Arc::new(DbusSignalSkeleton {
            conn: self.conn.clone(),
            path: self.path.clone(),
            state: self.state.clone(),
        })
    }

    async fn export(&self) -> Result<()> {
        let iface = SignalInterface {
            state: self.state.clone(),
            handle: self.handle.clone(),
        };
        let added = self.conn.object_server().at(self.path.as_str(), iface).await?;
        if !added {
            debug!("Signal interface already exported at {}", self.path.as_str());
        }
        Ok(())
    }

    async fn unexport(&self) -> Result<()> {
        self.conn
            .object_server()
            .remove::<SignalInterface, _>(self.path.as_str())
            .await?;
        Ok(())
    }
}
