//! D-Bus interfaces for ModemManager.
//!
//! Client proxies for the modem interfaces read by this crate, and the
//! served extended signal interface.

mod firmware;
mod modem_signal;
pub(crate) mod signal;

pub(crate) use firmware::MMFirmwareProxy;
pub(crate) use modem_signal::MMSignalProxy;
