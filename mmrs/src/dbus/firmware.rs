//! ModemManager Firmware proxy.

use zbus::{Result, proxy};
use zvariant::OwnedValue;

/// Proxy for a modem's firmware interface.
#[proxy(
    interface = "org.freedesktop.ModemManager1.Modem.Firmware",
    default_service = "org.freedesktop.ModemManager1"
)]
pub trait MMFirmware {
    /// Update method and method-specific settings, encoded as `(ua{sv})`.
    #[zbus(property)]
    fn update_settings(&self) -> Result<OwnedValue>;
}
