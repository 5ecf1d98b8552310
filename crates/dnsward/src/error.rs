//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use dnsward_config::ConfigError;
use dnsward_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the filter API at {url}")]
    #[diagnostic(
        code(dnsward::connection_failed),
        help(
            "Check that the filter is running and reachable.\n\
             Reason: {reason}\n\
             Try: dnsward --insecure stats"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(dnsward::tls),
        help(
            "Check the profile's ca_cert path, or use --insecure (-k) to accept\n\
             a self-signed certificate."
        )
    )]
    TlsError { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(dnsward::timeout),
        help("Increase the timeout with --timeout or check the filter's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(dnsward::auth_failed),
        help(
            "The filter rejected the password.\n\
             Pass it with --password or set DNSWARD_PASSWORD for this shell."
        )
    )]
    AuthFailed { message: String },

    #[error("No password available for profile '{profile}'")]
    #[diagnostic(
        code(dnsward::no_credentials),
        help(
            "Pass --password, set DNSWARD_PASSWORD, or run dnsward from an\n\
             interactive terminal to be prompted."
        )
    )]
    NoCredentials { profile: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Filter API returned {status}: {status_text}")]
    #[diagnostic(code(dnsward::request_failed))]
    RequestFailed { status: u16, status_text: String },

    #[error("Unexpected response from the filter API: {message}")]
    #[diagnostic(
        code(dnsward::malformed_response),
        help("Re-run with -vv to log each request.")
    )]
    MalformedResponse { message: String },

    #[error("Transport error: {message}")]
    #[diagnostic(code(dnsward::transport))]
    Transport { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(dnsward::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(dnsward::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: dnsward config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No filter configured")]
    #[diagnostic(
        code(dnsward::no_config),
        help(
            "Create a profile with: dnsward config init\n\
             Or pass --api-root. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(dnsward::config))]
    Config(Box<figment::Error>),

    #[error("Configuration error: {message}")]
    #[diagnostic(code(dnsward::config))]
    ConfigInvalid { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } | Self::Transport { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::RequestFailed {
                status,
                status_text,
            } => CliError::RequestFailed {
                status,
                status_text,
            },
            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            CoreError::Transport { message } => CliError::Transport { message },
            CoreError::Tls { message } => CliError::TlsError { message },
            CoreError::Superseded => CliError::Transport {
                message: "refresh was superseded by a newer one".into(),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "domain".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::ConfigInvalid { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::ConfigInvalid {
                message: e.to_string(),
            },
        }
    }
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}
