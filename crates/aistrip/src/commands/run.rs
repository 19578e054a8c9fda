//! Long-running bridge: launch, then keep re-discovering until Ctrl-C.

use tracing::{info, warn};

use aistrip_config::Config;
use aistrip_core::{PlatformConfig, ReconcileOutcome};

use crate::cli::{GlobalOpts, RunArgs};
use crate::error::CliError;
use crate::output;

use super::sync::{SyncSummary, detail};
use super::util;

pub async fn handle(
    cfg: &Config,
    mut platform_config: PlatformConfig,
    args: &RunArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(interval) = args.interval {
        platform_config.refresh_interval_secs = interval;
    }
    let interval = platform_config.refresh_interval_secs;
    let (platform, _registry) = util::persistent_platform(cfg, platform_config)?;

    let outcome = platform.did_finish_launching().await?;
    match outcome {
        // Keep running: the next periodic cycle may succeed.
        ReconcileOutcome::Skipped { ref reason } => warn!(%reason, "initial discovery skipped"),
        ReconcileOutcome::Applied(_) => {
            let summary = SyncSummary::from_outcome(&outcome, platform.last_discovery())?;
            output::print_output(&detail(&summary), global.quiet);
        }
    }

    // Prime every outlet's cache.
    for record in platform.accessories() {
        if let Some(outlet) = platform.controller(&record.identity) {
            outlet.get();
        }
    }

    info!(interval, "bridge running, press Ctrl-C to stop");
    let mut discovery = platform.subscribe_discovery();
    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                res?;
                break;
            }
            changed = discovery.changed() => {
                if changed.is_err() {
                    break;
                }
                info!(accessories = platform.accessories().len(), "re-discovery applied");
            }
        }
    }

    platform.shutdown().await;
    info!("bridge stopped");
    Ok(())
}
