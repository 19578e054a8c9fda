//! One-shot reconciliation of the local registry.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use aistrip_config::Config;
use aistrip_core::{PlatformConfig, ReconcileOutcome};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util::{self, AccessorySummary};

/// What a sync did, for structured output.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    pub added: Vec<AccessorySummary>,
    pub updated: Vec<AccessorySummary>,
    pub removed: Vec<AccessorySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
}

impl SyncSummary {
    /// Summarize an applied outcome; a skipped cycle is an error.
    pub fn from_outcome(
        outcome: &ReconcileOutcome,
        synced_at: Option<DateTime<Utc>>,
    ) -> Result<Self, CliError> {
        match outcome {
            ReconcileOutcome::Skipped { reason } => Err(CliError::DiscoverySkipped {
                reason: reason.clone(),
            }),
            ReconcileOutcome::Applied(plan) => Ok(Self {
                added: plan.added().map(AccessorySummary::from).collect(),
                updated: plan.updated().map(AccessorySummary::from).collect(),
                removed: plan.remove.iter().map(AccessorySummary::from).collect(),
                synced_at,
            }),
        }
    }
}

pub(super) fn detail(summary: &SyncSummary) -> String {
    let mut out = String::new();
    for (label, items) in [
        ("added", &summary.added),
        ("updated", &summary.updated),
        ("removed", &summary.removed),
    ] {
        for a in items {
            let _ = writeln!(out, "{label:<8} {} ({})", a.name, a.device_id);
        }
    }
    let _ = write!(
        out,
        "{} added, {} updated, {} removed",
        summary.added.len(),
        summary.updated.len(),
        summary.removed.len()
    );
    if let Some(at) = summary.synced_at {
        let _ = write!(out, " at {}", at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    out
}

pub async fn handle(
    cfg: &Config,
    platform_config: PlatformConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (platform, _registry) = util::persistent_platform(cfg, platform_config)?;

    let outcome = platform.did_finish_launching().await?;
    let summary = SyncSummary::from_outcome(&outcome, platform.last_discovery())?;

    let out = output::render_single(&global.output, &summary, detail, |s| {
        s.added
            .iter()
            .chain(&s.updated)
            .map(|a| a.device_id.clone())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
