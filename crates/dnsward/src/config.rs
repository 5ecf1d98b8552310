//! CLI configuration: thin wrapper around `dnsward_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--api-root, --password, --insecure, ...).

use std::time::Duration;

use clap::ArgMatches;
use clap::ValueEnum;
use clap::parser::ValueSource;
use secrecy::SecretString;

use dnsward_core::{ClientConfig, TlsVerification};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use dnsward_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Fill `--output` and `--color` from the config's `[defaults]` when
/// neither the flag nor its environment variable was given.
pub fn apply_defaults(
    global: &mut GlobalOpts,
    matches: &ArgMatches,
    defaults: &Defaults,
) -> Result<(), CliError> {
    if fell_back(matches, "output") {
        global.output = parse_default::<OutputFormat>("defaults.output", &defaults.output)?;
    }
    if fell_back(matches, "color") {
        global.color = parse_default::<ColorMode>("defaults.color", &defaults.color)?;
    }
    Ok(())
}

fn fell_back(matches: &ArgMatches, id: &str) -> bool {
    matches!(matches.value_source(id), None | Some(ValueSource::DefaultValue))
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Build a `ClientConfig` from the config file, the active profile, and
/// CLI overrides.
///
/// Without a matching profile, `--api-root` alone is enough. A profile
/// named explicitly with `--profile` must exist.
pub fn build_client_config(global: &GlobalOpts) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &cfg.defaults, global);
    }

    if global.profile.is_some() {
        let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
        available.sort();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }

    let raw = global.api_root.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let api_root = dnsward_config::parse_api_root(raw)?;

    Ok(ClientConfig {
        api_root,
        stored_credential: session_credential(global, None),
        tls: if global.insecure || cfg.defaults.insecure {
            TlsVerification::DangerAcceptInvalid
        } else {
            TlsVerification::SystemDefaults
        },
        timeout: Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout)),
    })
}

/// Translate a `Profile` + global flags into a `ClientConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ClientConfig, CliError> {
    let mut config = dnsward_config::profile_to_client_config(profile, defaults)?;

    if let Some(ref raw) = global.api_root {
        config.api_root = dnsward_config::parse_api_root(raw)?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    config.stored_credential = session_credential(global, Some(profile));

    Ok(config)
}

/// `--password` (or `DNSWARD_PASSWORD`) first, then the profile's
/// `password_env` variable.
fn session_credential(global: &GlobalOpts, profile: Option<&Profile>) -> Option<SecretString> {
    global
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| SecretString::from(p.to_owned()))
        .or_else(|| dnsward_config::resolve_session_credential(profile))
}
