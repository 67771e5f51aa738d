pub mod file_lock;
pub mod simulated;

use anyhow::Context;
use clap::{ArgAction, Parser};
use log::info;
use std::sync::Arc;
use tokio::sync::watch;

use mmrs::constants::{bus, defaults};
use mmrs::{
    DbusSignalExporter, ModemState, SignalConfig, SignalController, SignalHandle, SignalService,
};

use crate::file_lock::acquire_daemon_lock;
use crate::simulated::{SimulatedModem, StaticAuthorizer};

#[derive(Parser, Debug)]
#[command(name = "mmrs-signald")]
#[command(disable_version_flag = true)]
#[command(version)]
struct Args {
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    /// Serve on the session bus instead of the system bus
    #[arg(long)]
    session: bool,

    /// Well-known bus name to own
    #[arg(long, default_value = bus::SERVICE)]
    name: String,

    /// Object path of the simulated modem
    #[arg(long, default_value = bus::DEFAULT_MODEM_PATH)]
    object_path: String,

    /// Refresh rate in seconds to start with (0 keeps reporting off)
    #[arg(long, default_value_t = defaults::INITIAL_RATE)]
    rate: u32,

    /// Refuse every Setup request
    #[arg(long)]
    deny_setup: bool,
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.version {
        println!("mmrs-signald {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    env_logger::init();

    let _lock = match acquire_daemon_lock(&args.object_path) {
        Ok(lock) => lock,
        Err(e) => {
            eprintln!("Failed to start: {e}");
            std::process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;
    runtime.block_on(serve(args))
}

async fn serve(args: Args) -> anyhow::Result<()> {
    let config = SignalConfig::new()
        .with_object_path(args.object_path.as_str())
        .with_initial_rate(args.rate);
    config.validate()?;

    let builder = if args.session {
        zbus::connection::Builder::session()?
    } else {
        zbus::connection::Builder::system()?
    };
    let conn = builder
        .name(args.name.as_str())?
        .build()
        .await
        .with_context(|| format!("failed to own bus name {}", args.name))?;

    let (handle, requests) = SignalHandle::channel(config.request_queue_capacity);
    let exporter = DbusSignalExporter::new(conn, &config.object_path, handle.clone())?;
    let (modem_state, modem_state_rx) = watch::channel(ModemState::Disabled);

    let controller = SignalController::builder(
        Arc::new(modem_state_rx),
        Arc::new(StaticAuthorizer::new(!args.deny_setup)),
        Arc::new(exporter),
    )
    .source(Arc::new(SimulatedModem::new()))
    .config(config.clone())
    .build()?;
    tokio::spawn(SignalService::new(controller, requests).run());

    handle.initialize().await?;
    modem_state.send_replace(ModemState::Enabled);
    handle.enable().await?;
    info!(
        "Serving extended signal information for {} on {}",
        config.object_path, args.name
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutting down");
    handle.shutdown().await?;
    Ok(())
}
