//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use tokio::sync::watch;

use dnsward_core::{Controller, ViewState};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Ask the operator for the management password.
///
/// Only on an interactive terminal; scripts must pass `--password`.
pub fn prompt_password(profile: &str) -> Result<SecretString, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: profile.into(),
        });
    }
    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(password))
}

/// Make sure the session has a credential to send, prompting if not.
pub fn ensure_credential(controller: &Controller, profile: &str) -> Result<(), CliError> {
    if controller.session().credential().is_none() {
        controller.session().set_input(prompt_password(profile)?);
    }
    Ok(())
}

// ── Progress ────────────────────────────────────────────────────────

/// Spinner on stderr while `fut` runs, labelled with the controller's
/// current stage. Hidden when stderr is not a terminal or `--quiet`.
pub async fn with_progress<F, T>(controller: &Controller, global: &GlobalOpts, fut: F) -> T
where
    F: Future<Output = T>,
{
    if global.quiet || !io::stderr().is_terminal() {
        return fut.await;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    let label = tokio::spawn(follow_stage(controller.subscribe_view(), spinner.clone()));
    let result = fut.await;
    label.abort();
    spinner.finish_and_clear();
    result
}

async fn follow_stage(mut view: watch::Receiver<ViewState>, spinner: ProgressBar) {
    loop {
        let message = stage_label(&view.borrow_and_update());
        spinner.set_message(message);
        if view.changed().await.is_err() {
            break;
        }
    }
}

fn stage_label(state: &ViewState) -> &'static str {
    match state {
        ViewState::Unauthenticated { .. } => "Connecting",
        ViewState::FetchingStatistics => "Fetching filter statistics",
        ViewState::FetchingCache => "Fetching cache",
        ViewState::FetchingInstrumentation => "Fetching resolver timings",
        ViewState::FetchingAllowedDomains => "Fetching allow-list",
        ViewState::Ready => "Done",
    }
}
