//! Outlet read / switch.

use serde::Serialize;

use aistrip_core::{AccessoryRecord, OutletController, PlatformConfig};

use crate::cli::{GlobalOpts, OutletArgs, OutletCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutletState {
    device_id: String,
    name: String,
    on: bool,
}

pub async fn handle(
    platform_config: PlatformConfig,
    args: OutletArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let platform = util::ephemeral_platform(platform_config)?;
    let devices = platform.directory().fetch_devices().await?;

    let (identifier, desired) = match args.command {
        OutletCommand::Get { device } => (device, None),
        OutletCommand::Set { device, state } => (device, Some(state.is_on())),
    };
    let device = util::resolve_device(&devices, &identifier)?;

    let record = AccessoryRecord::new(platform.identity_for(&device.device_id), device);
    let outlet = OutletController::new(std::sync::Arc::clone(platform.client()), &record);

    let on = match desired {
        Some(desired) => outlet.control(desired).await?,
        None => outlet.refresh().await?,
    };

    let state = OutletState {
        device_id: record.device().device_id.clone(),
        name: record.display_name.clone(),
        on,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &state,
        |s| format!("{} ({}): {}", s.name, s.device_id, output::power_label(s.on, color)),
        |s| output::power_label(s.on, false),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
