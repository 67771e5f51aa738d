//! Collaborator seams for the signal interface.
//!
//! The refresh logic only needs four things from the daemon around it: the
//! current modem state, an authorization check, the driver's signal query and
//! a place to publish values. Each is a trait here so the daemon (or a test)
//! can plug in its own implementation.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::api::models::{AuthorizationKind, ModemState, Requester, SignalValues};
use crate::Result;

/// Driver hook that loads one set of extended signal measurements.
///
/// A driver that cannot report extended signal information simply does not
/// provide one; the interface then reports itself as unsupported.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use mmrs::{GsmSignal, SignalSource, SignalValues};
///
/// struct FixedGsm;
///
/// #[async_trait]
/// impl SignalSource for FixedGsm {
///     async fn load_values(&self) -> mmrs::Result<SignalValues> {
///         Ok(SignalValues {
///             gsm: Some(GsmSignal { rssi: -73.0 }),
///             ..Default::default()
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Queries the device. The operation is not cancellable; callers discard
    /// results they no longer want.
    async fn load_values(&self) -> Result<SignalValues>;
}

/// Read access to the modem's lifecycle state.
pub trait ModemStateSource: Send + Sync {
    fn modem_state(&self) -> ModemState;
}

impl<F> ModemStateSource for F
where
    F: Fn() -> ModemState + Send + Sync,
{
    fn modem_state(&self) -> ModemState {
        self()
    }
}

impl ModemStateSource for watch::Receiver<ModemState> {
    fn modem_state(&self) -> ModemState {
        *self.borrow()
    }
}

/// Authorization check performed before a request may change device state.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Resolves to `Ok(())` when `requester` holds `kind`.
    ///
    /// The error returned on refusal is handed back to the requester as is.
    async fn authorize(&self, requester: &Requester, kind: AuthorizationKind) -> Result<()>;
}

/// The externally visible signal interface object.
///
/// Implementations publish whatever they are given right away.
#[async_trait]
pub trait SignalSkeleton: Send + Sync {
    /// Publishes a new `Rate` value.
    async fn set_rate(&self, rate: u32) -> Result<()>;

    /// Publishes a full snapshot of signal values.
    async fn publish(&self, values: &SignalValues) -> Result<()>;
}

/// Creates, exports and removes the signal interface object.
#[async_trait]
pub trait SignalExporter: Send + Sync {
    /// Creates the interface object without making it visible.
    fn create_skeleton(&self) -> Arc<dyn SignalSkeleton>;

    /// Makes the interface visible and starts routing `Setup` requests to it.
    async fn export(&self) -> Result<()>;

    /// Removes the interface from the bus.
    async fn unexport(&self) -> Result<()>;
}
