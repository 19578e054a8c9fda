//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};

use aistrip_config::Config;
use aistrip_core::DEFAULT_BASE_URL;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` safe to print.
fn redacted(cfg: &Config) -> Config {
    Config {
        key: cfg.key.as_ref().map(|_| "****".into()),
        ..cfg.clone()
    }
}

/// Format config for display as TOML-ish lines.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let _ = writeln!(out, "name = \"{}\"", cfg.name);
    if let Some(ref env) = cfg.key_env {
        let _ = writeln!(out, "key_env = \"{env}\"");
    }
    if let Some(ref key) = cfg.key {
        let _ = writeln!(out, "key = \"{key}\"");
    }
    let _ = writeln!(out, "base_url = \"{}\"", cfg.base_url);
    let _ = writeln!(out, "timeout = {}", cfg.timeout);
    let _ = writeln!(out, "refresh_interval = {}", cfg.refresh_interval);
    let _ = write!(
        out,
        "registry = \"{}\"",
        config::registry_path(cfg).display()
    );
    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_key() -> Result<String, CliError> {
    let key = Password::new()
        .with_prompt("Account key")
        .interact()
        .map_err(prompt_err)?;
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "key".into(),
            reason: "key cannot be empty".into(),
        });
    }
    Ok(key)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_file(global);
            eprintln!("AiStrip bridge configuration");
            eprintln!("   Config path: {}\n", path.display());

            let name: String = Input::new()
                .with_prompt("Platform name")
                .default("AiStrip".into())
                .interact_text()
                .map_err(prompt_err)?;

            let base_url: String = Input::new()
                .with_prompt("Service base URL")
                .default(DEFAULT_BASE_URL.into())
                .interact_text()
                .map_err(prompt_err)?;

            let key = prompt_key()?;
            let choices = &[
                "Store in system keyring (recommended)",
                "Save to config file (plaintext)",
            ];
            let selection = Select::new()
                .with_prompt("Where to store the key?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let plaintext = if selection == 0 {
                aistrip_config::store_key(&name, &key)?;
                eprintln!("   ✓ key stored in system keyring");
                None
            } else {
                Some(key)
            };

            let cfg = Config {
                name,
                key: plaintext,
                base_url,
                ..Config::default()
            };
            aistrip_config::save_config_to(&cfg, &path)?;

            eprintln!("\n✓ Configuration written to {}", path.display());
            eprintln!("  Test it: aistrip devices");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load(global)?);
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                c.name.clone()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), false);
            Ok(())
        }

        // ── Set key ─────────────────────────────────────────────────
        ConfigCommand::SetKey { secret } => {
            let cfg = config::load(global)?;
            let key = match secret {
                Some(key) if !key.is_empty() => key,
                _ => prompt_key()?,
            };
            aistrip_config::store_key(&cfg.name, &key)?;
            eprintln!("✓ Key for '{}' stored in system keyring", cfg.name);
            Ok(())
        }
    }
}
