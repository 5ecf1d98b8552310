// dnsward-api: Async Rust client for the dnsward DNS-filter management API

pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use client::{API_ROOT_PATH, ApiClient, Resource};
pub use error::Error;
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};
