use mmrs::ModemManager;
use std::time::Duration;

#[tokio::main]
async fn main() -> mmrs::Result<()> {
    let modem = mmrs::constants::bus::DEFAULT_MODEM_PATH;
    let mm = ModemManager::new().await?;

    println!("Refreshing extended signal information every 5 seconds...");
    mm.setup_signal(modem, 5).await?;

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(5)).await;
        let values = mm.signal_values(modem).await?;
        for record in values.records().iter().filter(|r| r.available) {
            let fields: Vec<String> = record
                .fields
                .iter()
                .map(|(name, value)| format!("{name}={value:.1}"))
                .collect();
            println!("{:5} {}", record.technology.as_str(), fields.join(" "));
        }
    }

    mm.setup_signal(modem, 0).await?;
    Ok(())
}
