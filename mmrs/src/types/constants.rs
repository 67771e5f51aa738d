//! Constants for ModemManager D-Bus interface values.
//!
//! These constants correspond to the numeric codes, property keys and bus
//! names used by ModemManager's D-Bus API for modem states, firmware update
//! methods and the extended signal interface.

/// ModemManager modem state codes (`MMModemState`).
pub mod modem_state {
    pub const FAILED: i32 = -1;
    pub const UNKNOWN: i32 = 0;
    pub const INITIALIZING: i32 = 1;
    pub const LOCKED: i32 = 2;
    pub const DISABLED: i32 = 3;
    pub const DISABLING: i32 = 4;
    pub const ENABLING: i32 = 5;
    pub const ENABLED: i32 = 6;
    pub const SEARCHING: i32 = 7;
    pub const REGISTERED: i32 = 8;
    pub const DISCONNECTING: i32 = 9;
    pub const CONNECTING: i32 = 10;
    pub const CONNECTED: i32 = 11;
}

/// Firmware update method tags (`MMModemFirmwareUpdateMethod`).
pub mod firmware_method {
    pub const UNKNOWN: u32 = 0;
    pub const FASTBOOT: u32 = 1;
}

/// Keys recognized in the firmware update settings dictionary.
pub mod settings_key {
    /// AT command that resets the module into fastboot mode.
    pub const FASTBOOT_AT: &str = "fastboot-at";
}

/// Well-known bus name and default object path.
pub mod bus {
    pub const SERVICE: &str = "org.freedesktop.ModemManager1";
    pub const DEFAULT_MODEM_PATH: &str = "/org/freedesktop/ModemManager1/Modem/0";
}

/// Defaults for the per-device refresh loop.
pub mod defaults {
    /// Refresh rate a freshly created device starts with (reporting off).
    pub const INITIAL_RATE: u32 = 0;

    /// Capacity of the request queue feeding a device's event loop.
    pub const REQUEST_QUEUE_CAPACITY: usize = 16;
}
