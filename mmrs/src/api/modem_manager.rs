use zbus::Connection;

use crate::Result;
use crate::api::firmware_settings::FirmwareUpdateSettings;
use crate::api::models::SignalValues;
use crate::core::{firmware, signal_reader};

/// Client for modems exported by ModemManager.
///
/// Talks to the `Signal` and `Firmware` interfaces of a modem object over
/// D-Bus. Every method takes the modem's object path, e.g.
/// `/org/freedesktop/ModemManager1/Modem/0`.
///
/// # Examples
///
/// ```no_run
/// use mmrs::ModemManager;
///
/// # async fn example() -> mmrs::Result<()> {
/// let mm = ModemManager::new().await?;
/// let modem = "/org/freedesktop/ModemManager1/Modem/0";
///
/// // Refresh extended signal information every 5 seconds
/// mm.setup_signal(modem, 5).await?;
/// let values = mm.signal_values(modem).await?;
/// for record in values.records() {
///     println!("{record:?}");
/// }
///
/// let settings = mm.firmware_update_settings(modem).await?;
/// println!("update method: {}", settings.method());
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// `ModemManager` is `Clone`; clones share the same D-Bus connection.
#[derive(Debug, Clone)]
pub struct ModemManager {
    conn: Connection,
}

impl ModemManager {
    /// Creates a new `ModemManager` connected to the system D-Bus.
    pub async fn new() -> Result<Self> {
        let conn = Connection::system().await?;
        Ok(Self { conn })
    }

    /// Uses an existing connection, e.g. a session bus in tests.
    pub fn with_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Reads the modem's firmware update settings.
    ///
    /// # Errors
    ///
    /// Returns `ModemError::InvalidArgument` if the published value is
    /// malformed, or a D-Bus error if it cannot be read.
    pub async fn firmware_update_settings(&self, modem_path: &str) -> Result<FirmwareUpdateSettings> {
        firmware::update_settings(&self.conn, modem_path).await
    }

    /// Sets the extended signal refresh rate in seconds; `0` disables it.
    pub async fn setup_signal(&self, modem_path: &str, rate: u32) -> Result<()> {
        signal_reader::setup(&self.conn, modem_path, rate).await
    }

    /// Reads the current extended signal refresh rate.
    pub async fn signal_rate(&self, modem_path: &str) -> Result<u32> {
        signal_reader::rate(&self.conn, modem_path).await
    }

    /// Reads the latest extended signal snapshot.
    pub async fn signal_values(&self, modem_path: &str) -> Result<SignalValues> {
        signal_reader::values(&self.conn, modem_path).await
    }
}
