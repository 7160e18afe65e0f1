//! Config command handlers. These never touch the controller.

use serde::Serialize;

use zonesync_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, Envelope};

const MASK: &str = "********";

#[derive(Serialize)]
struct PathPayload {
    path: String,
}

#[derive(Serialize)]
struct ShowPayload {
    path: String,
    config: Config,
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global).display().to_string();
    let out = match args.command {
        ConfigCommand::Path => output::render(global.output, &Envelope::ok(PathPayload { path })),

        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some(MASK.into());
                }
            }
            output::render(global.output, &Envelope::ok(ShowPayload { path, config: cfg }))
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
