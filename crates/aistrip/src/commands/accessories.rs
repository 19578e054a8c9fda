//! Offline listing of the local accessory registry.

use aistrip_core::AccessoryRegistry;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, AccessoryRow};

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let registry = util::open_registry(&cfg)?;
    let records = registry.restored();

    if records.is_empty() && matches!(global.output, OutputFormat::Table) {
        if !global.quiet {
            eprintln!(
                "No accessories in {}. Run: aistrip sync",
                registry.path().display()
            );
        }
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &records,
        |r| AccessoryRow::from(r),
        |r| r.identity.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
