//! Reading firmware update settings from a modem.

use log::debug;
use zbus::Connection;

use crate::Result;
use crate::api::firmware_settings::FirmwareUpdateSettings;
use crate::api::models::ModemError;
use crate::dbus::MMFirmwareProxy;

/// Reads and decodes the `UpdateSettings` property of the modem at
/// `modem_path`.
pub(crate) async fn update_settings(
    conn: &Connection,
    modem_path: &str,
) -> Result<FirmwareUpdateSettings> {
    let proxy = MMFirmwareProxy::builder(conn)
        .path(modem_path)?
        .build()
        .await?;

    let raw = proxy
        .update_settings()
        .await
        .map_err(|e| ModemError::DbusOperation {
            context: format!("failed to read firmware update settings of {modem_path}"),
            source: e,
        })?;

    let settings = FirmwareUpdateSettings::from_variant(Some(&*raw))?;
    debug!("Firmware update method of {modem_path}: {}", settings.method());
    Ok(settings)
}
