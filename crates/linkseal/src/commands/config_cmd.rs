//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Confirm, Input};

use linkseal_config::{Config, ConfigError, Profile, config_path, load_config_or_default, save_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

fn config_err(e: ConfigError) -> CliError {
    CliError::Validation {
        field: "config".into(),
        reason: e.to_string(),
    }
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn empty_profile() -> Profile {
    Profile {
        server: String::new(),
        insecure: None,
        timeout: None,
        poll_interval: None,
        top_limit: None,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config_path();
            eprintln!("linkseal configuration wizard");
            eprintln!("  Config path: {}\n", path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Service URL")
                .default("https://links.example.com".into())
                .interact_text()
                .map_err(prompt_err)?;

            let insecure = Confirm::new()
                .with_prompt("Accept self-signed TLS certificates?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                insecure: insecure.then_some(true),
                timeout: None,
                poll_interval: None,
                top_limit: None,
            };

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Default::default(),
                profiles,
            };
            save_config(&cfg).map_err(config_err)?;

            eprintln!("\nConfiguration written to {}", path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: linkseal stats");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = load_config_or_default();
            let profile_name = active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(empty_profile);

            match key.as_str() {
                "server" => profile.server = value,
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                "poll_interval" | "poll-interval" => {
                    profile.poll_interval =
                        Some(value.parse().map_err(|_| CliError::Validation {
                            field: "poll_interval".into(),
                            reason: "must be a number (seconds)".into(),
                        })?);
                }
                "top_limit" | "top-limit" => {
                    profile.top_limit = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "top_limit".into(),
                        reason: "must be a number".into(),
                    })?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, insecure, \
                             timeout, poll_interval, top_limit"
                        ),
                    });
                }
            }

            save_config(&cfg).map_err(config_err)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: linkseal config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: if available.is_empty() {
                        format!("no profile named '{name}' (none configured)")
                    } else {
                        format!(
                            "no profile named '{name}'. Available: {}",
                            available.join(", ")
                        )
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg).map_err(config_err)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }
    }
}
