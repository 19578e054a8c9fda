//! Device listing.

use tabled::Tabled;

use aistrip_core::{NormalizedDevice, PlatformConfig};

use crate::cli::{DevicesArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&NormalizedDevice> for DeviceRow {
    fn from(d: &NormalizedDevice) -> Self {
        Self {
            id: d.device_id.clone(),
            name: d.device_name.clone(),
        }
    }
}

pub async fn handle(
    platform_config: PlatformConfig,
    args: &DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let platform = util::ephemeral_platform(platform_config)?;

    if args.raw {
        let raw = platform.client().list_devices_raw().await?;
        let compact = matches!(global.output, OutputFormat::JsonCompact);
        output::print_output(&output::render_json(&raw, compact)?, global.quiet);
        return Ok(());
    }

    let devices = platform.directory().fetch_devices().await?;
    let out = output::render_list(
        &global.output,
        &devices,
        |d| DeviceRow::from(d),
        |d| d.device_id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
