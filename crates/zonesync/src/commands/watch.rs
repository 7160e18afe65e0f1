//! Live subscription: one compact JSON envelope per published update.

use std::time::Duration;

use tracing::info;

use zonesync_core::{ClientStore, ControllerConfig, SyncEngine};

use crate::cli::WatchArgs;
use crate::error::CliError;
use crate::output::{self, Envelope};

/// Apply `--interval` before the engine is built.
pub fn configure(args: &WatchArgs, config: &mut ControllerConfig) -> Result<(), CliError> {
    match args.interval {
        Some(0) => Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be greater than zero".into(),
        }),
        Some(secs) => {
            config.poll_interval = Duration::from_secs(secs);
            Ok(())
        }
        None => Ok(()),
    }
}

pub async fn handle<S: ClientStore>(engine: &SyncEngine<S>, args: &WatchArgs) -> Result<(), CliError> {
    if args.ticks == Some(0) {
        return Err(CliError::Validation {
            field: "ticks".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let mut sub = engine.subscribe();
    info!(
        connection = %sub.id(),
        interval = ?engine.config().poll_interval,
        "watching connected clients"
    );

    let mut delivered: u64 = 0;
    loop {
        tokio::select! {
            update = sub.recv() => {
                let Some(update) = update else { break };
                output::print_line(&Envelope::ok(&update));
                delivered += 1;
                if args.ticks.is_some_and(|limit| delivered >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!(connection = %sub.id(), delivered, "watch finished");
    sub.close().await;
    Ok(())
}
