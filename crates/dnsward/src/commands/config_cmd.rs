//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config as TOML-ish text, profiles sorted by name.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_root = \"{}\"", p.api_root);
        if let Some(ref env) = p.password_env {
            let _ = writeln!(out, "password_env = \"{env}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                output::notice("No profiles configured. Run: dnsward config init", global.quiet);
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                let lines: Vec<String> = names
                    .into_iter()
                    .map(|name| {
                        let marker = if *name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}

/// Interactive wizard. Writes a fresh config with one profile.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("dnsward configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_root: String = Input::new()
        .with_prompt("Filter URL")
        .default("http://127.0.0.1:8080".into())
        .validate_with(|raw: &String| {
            dnsward_config::parse_api_root(raw)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let tls_choices = &[
        "Verify certificates (recommended)",
        "Accept self-signed certificates",
    ];
    let insecure = Select::new()
        .with_prompt("TLS verification")
        .items(tls_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
        == 1;

    eprintln!("\n   Passwords are never written to disk. Name an environment");
    eprintln!("   variable to read it from, or leave blank to be prompted.\n");
    let password_env: String = Input::new()
        .with_prompt("Password variable")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let profile = Profile {
        api_root,
        password_env: Some(password_env).filter(|v| !v.trim().is_empty()),
        ca_cert: None,
        insecure: insecure.then_some(true),
        timeout: None,
    };

    let cfg = Config {
        default_profile: Some(profile_name.clone()),
        defaults: Defaults::default(),
        profiles: HashMap::from([(profile_name.clone(), profile)]),
    };
    config::save_config(&cfg)?;

    output::notice(
        format!(
            "\n✓ Configuration written to {}\n  Active profile: {profile_name}\n\n  Test it: dnsward dashboard",
            config_path.display()
        ),
        global.quiet,
    );
    Ok(())
}
