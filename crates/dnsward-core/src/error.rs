// ── Core error types ──
//
// User-facing errors from dnsward-core. Consumers never see reqwest or
// serde errors directly; the `From<dnsward_api::Error>` impl translates
// transport-layer failures into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Request errors ───────────────────────────────────────────────
    #[error("Request failed (HTTP {status}): {status_text}")]
    RequestFailed { status: u16, status_text: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach filter API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to the filter API timed out")]
    Timeout,

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("TLS setup failed: {message}")]
    Tls { message: String },

    // ── Pipeline ─────────────────────────────────────────────────────
    /// A newer refresh cycle started before this one finished.
    #[error("Refresh superseded by a newer cycle")]
    Superseded,

    // ── Input / configuration ────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the operator has to authenticate again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<dnsward_api::Error> for CoreError {
    fn from(err: dnsward_api::Error) -> Self {
        match err {
            dnsward_api::Error::Unauthorized { status_text } => CoreError::Unauthorized {
                message: status_text,
            },
            dnsward_api::Error::InvalidCredential(message) => CoreError::Unauthorized { message },
            dnsward_api::Error::RequestFailed {
                status,
                status_text,
            } => CoreError::RequestFailed {
                status,
                status_text,
            },
            dnsward_api::Error::MalformedResponse { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            dnsward_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            dnsward_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            dnsward_api::Error::Tls(message) => CoreError::Tls { message },
        }
    }
}
