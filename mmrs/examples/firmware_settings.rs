use mmrs::ModemManager;

#[tokio::main]
async fn main() -> mmrs::Result<()> {
    let modem = std::env::args()
        .nth(1)
        .unwrap_or_else(|| mmrs::constants::bus::DEFAULT_MODEM_PATH.to_string());

    let mm = ModemManager::new().await?;
    let settings = mm.firmware_update_settings(&modem).await?;

    println!("Update method: {}", settings.method());
    if let Some(at) = settings.try_fastboot_at() {
        println!("Fastboot AT command: {at}");
    }

    Ok(())
}
