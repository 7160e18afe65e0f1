mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use zonesync_core::{ClientStore, JsonFileStore, MemoryStore, SyncEngine};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let format = cli.global.output;
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        let envelope = output::failure(err.to_string(), err.status());
        output::print_output(&output::render(format, &envelope), false);
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the envelope; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local commands don't need a controller
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),
        Command::Store(args) => commands::store::handle(args, &cli.global).await,

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "zonesync", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let mut controller_config = config::controller_config(&cli.global)?;
            if let Command::Watch(ref args) = cmd {
                commands::watch::configure(args, &mut controller_config)?;
            }

            tracing::debug!(command = ?cmd, url = %controller_config.url, "dispatching command");
            if commands::persists(&cmd) {
                let store = JsonFileStore::open(config::store_path(&cli.global)?).await?;
                let engine = SyncEngine::new(controller_config, Arc::new(store))?;
                serve(cmd, &engine, &cli.global).await
            } else {
                let engine = SyncEngine::new(controller_config, Arc::new(MemoryStore::new()))?;
                serve(cmd, &engine, &cli.global).await
            }
        }
    }
}

/// Run a controller-bound command, then release the cached session.
async fn serve<S: ClientStore>(
    cmd: Command,
    engine: &SyncEngine<S>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = commands::dispatch(cmd, engine, global).await;
    engine.shutdown().await;
    result
}
