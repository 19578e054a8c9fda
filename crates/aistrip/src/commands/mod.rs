//! Command dispatch: bridges CLI args -> platform operations -> output formatting.

pub mod accessories;
pub mod config_cmd;
pub mod devices;
pub mod outlet;
pub mod run;
pub mod sync;
pub mod util;

use aistrip_config::Config;
use aistrip_core::PlatformConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cfg: &Config,
    platform_config: PlatformConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(platform_config, &args, global).await,
        Command::Sync => sync::handle(cfg, platform_config, global).await,
        Command::Outlet(args) => outlet::handle(platform_config, args, global).await,
        Command::Run(args) => run::handle(cfg, platform_config, &args, global).await,
        // Handled before dispatch
        Command::Accessories | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "this command does not talk to the service".into(),
            })
        }
    }
}
