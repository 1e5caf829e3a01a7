//! lmsh client binary entry point.
//!
//! Connects a local terminal to the library session host, falling back to
//! the built-in simulated session when no host is reachable.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use lmsh_client::{
    Cli, ConnectionManager, ManagerConfig, RawModeGuard, StatusReporter, TermDisplay, WsTransport,
    spawn_stdin_reader,
};
use lmsh_core::transport::Transport;

fn main() {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = lmsh_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "lmsh client starting");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(&cli)) {
        eprintln!("lmsh: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> lmsh_core::Result<()> {
    let transport: Arc<dyn Transport> = Arc::new(WsTransport::new(&cli.url)?);

    let config = ManagerConfig {
        local_only: cli.local,
        ..ManagerConfig::default()
    };

    let manager = ConnectionManager::new(
        config,
        transport,
        TermDisplay::new(),
        StatusReporter::new(),
    );
    let handle = manager.handle();

    // Keystrokes must arrive unbuffered and unechoed; without a tty the
    // session still runs, just with line-buffered input.
    let raw_mode = match RawModeGuard::enter() {
        Ok(guard) => Some(guard),
        Err(e) => {
            warn!(error = %e, "raw terminal mode unavailable");
            None
        }
    };

    spawn_stdin_reader(handle);

    manager.run().await;
    drop(raw_mode);
    info!("session ended");

    Ok(())
}
