//! # Lift Cell PLC
//!
//! Runs the dual-lift cell controller: builds the variable tree, then
//! advances the cell on a fixed tick until a shutdown signal arrives.
//!
//! Usage: `liftcell_plc [ENDPOINT] [CONFIG.toml]`
//!
//! The endpoint names the fieldbus attachment point for the transport layer
//! in front of this process; the core itself treats the variable tree as
//! the boundary. Exits 0 on clean shutdown, nonzero on fatal init failure.

use std::path::Path;
use std::process;
use std::time::Instant;

use tokio::signal;
use tokio::time::interval;
use tracing::{debug, error, info};

use liftcell_plc::cell::Cell;
use liftcell_plc::config::CellConfig;

const DEFAULT_ENDPOINT: &str = "opc.tcp://0.0.0.0:4860/liftcell/plc/";

#[tokio::main]
async fn main() {
    let endpoint = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let config = match std::env::args().nth(2) {
        Some(path) => match CellConfig::load_validated(Path::new(&path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("FATAL: {path}: {e}");
                process::exit(1);
            }
        },
        None => CellConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(config.shared.log_level.as_filter_str())
            }),
        )
        .with_target(false)
        .init();

    info!(
        service = %config.shared.service_name,
        %endpoint,
        tick_ms = config.tick_period_ms,
        "starting lift cell PLC"
    );

    let mut cell = Cell::new(config);
    let started = Instant::now();
    let mut ticker = interval(cell.config().tick_period());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = cell.tick(started.elapsed()) {
                    error!("tick failed: {e}");
                    process::exit(1);
                }
                for path in cell.vars_mut().drain_changes() {
                    debug!(%path, "published");
                }
            }
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    info!("lift cell PLC shutdown complete");
}
