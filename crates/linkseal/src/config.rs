//! Config resolution for the CLI: profile + flag overrides.

use std::time::Duration;

use linkseal_config::{Config, Profile, config_path, load_config_or_default};
use linkseal_core::ServiceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Name of the profile the invocation should use.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a [`ServiceConfig`] from the config file, profile, and CLI flags.
///
/// Flags win over the profile, which wins over file-level defaults. A
/// bare `--server` with no profile at all works too.
pub fn build_service_config(global: &GlobalOpts) -> Result<ServiceConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match (cfg.profiles.get(&profile_name), &global.server) {
        (Some(profile), _) => profile.clone(),
        // No profile, but --server given: synthesize one.
        (None, Some(server)) => Profile {
            server: server.clone(),
            insecure: None,
            timeout: None,
            poll_interval: None,
            top_limit: None,
        },
        (None, None) => {
            return Err(CliError::NoProfile {
                profile: profile_name,
                path: config_path().display().to_string(),
            });
        }
    };

    let mut service = profile
        .to_service_config(&cfg.defaults)
        .map_err(|e| CliError::Validation {
            field: "profile".into(),
            reason: e.to_string(),
        })?;

    // CLI flag overrides.
    if let Some(ref server) = global.server {
        service.base_url = server.parse().map_err(|e| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL '{server}': {e}"),
        })?;
    }
    if global.insecure {
        service.accept_invalid_certs = true;
    }
    service.timeout = Duration::from_secs(global.timeout);

    Ok(service)
}
