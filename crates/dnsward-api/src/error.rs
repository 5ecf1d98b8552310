use thiserror::Error;

/// Top-level error type for the `dnsward-api` crate.
///
/// Every failure of an authenticated call lands in one of these variants.
/// `dnsward-core` maps them into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API answered 401. The stored credential has already been
    /// cleared from the session by the time the caller sees this.
    #[error("Unauthorized: {status_text}")]
    Unauthorized { status_text: String },

    /// The credential cannot be carried in an HTTP header.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    // ── HTTP status ─────────────────────────────────────────────────
    /// Any non-200, non-401 status. Carries the response's status text.
    #[error("Request failed (HTTP {status}): {status_text}")]
    RequestFailed { status: u16, status_text: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The body was not JSON, or did not match the endpoint's schema.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// Returns `true` if the credential was rejected and the operator
    /// has to authenticate again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::RequestFailed { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// The HTTP status behind this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
