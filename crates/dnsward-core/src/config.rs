// ── Runtime connection configuration ──
//
// These types describe *how* to reach the filter's management API.
// They carry the session credential and transport tuning, but never
// touch disk. The CLI constructs a `ClientConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use dnsward_api::transport::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one operator session against one filter.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root or API root (e.g., `https://filter.lan`).
    pub api_root: Url,
    /// Credential restored from session-scoped storage, if any.
    pub stored_credential: Option<SecretString>,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout, enforced by the HTTP transport.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_root: Url) -> Self {
        Self {
            api_root,
            stored_credential: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Translate into the api crate's transport settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
