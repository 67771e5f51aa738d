//! A Rust library for ModemManager's extended signal and firmware interfaces.
//!
//! This crate provides two things:
//!
//! - The daemon side of `org.freedesktop.ModemManager1.Modem.Signal`: a
//!   per-device refresh loop that periodically queries the modem for extended
//!   signal measurements (CDMA, EV-DO, GSM, UMTS, LTE) and publishes them,
//!   reconfigured at runtime through the `Setup` method
//! - A typed codec for firmware update settings, the `(ua{sv})` value a modem
//!   publishes to describe how it enters firmware update mode
//!
//! plus a small client, [`ModemManager`], for reading both from a running
//! modem.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use mmrs::{
//!     Authorizer, DbusSignalExporter, ModemState, SignalController, SignalHandle,
//!     SignalService, SignalSource,
//! };
//!
//! # async fn example(
//! #     source: Arc<dyn SignalSource>,
//! #     authorizer: Arc<dyn Authorizer>,
//! # ) -> mmrs::Result<()> {
//! let conn = zbus::Connection::session().await?;
//! let path = "/org/freedesktop/ModemManager1/Modem/0";
//!
//! let (handle, requests) = SignalHandle::channel(16);
//! let exporter = DbusSignalExporter::new(conn, path, handle.clone())?;
//! let controller = SignalController::builder(
//!     Arc::new(|| ModemState::Registered),
//!     authorizer,
//!     Arc::new(exporter),
//! )
//! .source(source)
//! .build()?;
//! tokio::spawn(SignalService::new(controller, requests).run());
//!
//! handle.initialize().await?;
//! handle.enable().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, ModemError>`. At the bus boundary errors
//! are mapped onto the standard `org.freedesktop.DBus.Error.*` names.
//!
//! # Logging
//!
//! This crate uses the [`log`](https://docs.rs/log) facade for logging. To see
//! log output, add a logging implementation like `env_logger`. For example:
//!
//! ```no_run,ignore
//! env_logger::init();
//! // ...
//! ```

// Internal implementation modules
mod core;
mod dbus;

// Public API modules
pub mod api;
pub mod types;

pub use types::constants;

// Re-exported public API
pub use api::firmware_settings::{FirmwareUpdateMethod, FirmwareUpdateSettings, WirePayload};
pub use api::hooks::{
    Authorizer, ModemStateSource, SignalExporter, SignalSkeleton, SignalSource,
};
pub use api::modem_manager::ModemManager;
pub use api::models::{
    AuthorizationKind, CdmaSignal, EvdoSignal, GsmSignal, LteSignal, ModemError, ModemState,
    Reading, Requester, SignalConfig, SignalValues, Technology, TechnologyRecord, UmtsSignal,
};
pub use api::service::{SignalHandle, SignalRequests, SignalService};
pub use api::signal::{LifecycleState, SignalController, SignalControllerBuilder, SignalStatus};
pub use crate::core::refresh::TimerId;
pub use dbus::signal::{DbusSignalExporter, DbusSignalSkeleton, SignalInterface};

/// A specialized `Result` type for modem operations.
pub type Result<T> = std::result::Result<T, ModemError>;
