//! Refresh pipeline and aggregation layer between `dnsward-api` and the
//! operator-facing surfaces.
//!
//! - **[`Controller`]**: Owns the shared session and runs the refresh
//!   cycle: filter statistics, cache, instrumentation, allow-list, strictly
//!   in that order. A cycle publishes one complete [`Dashboard`] or nothing;
//!   any failure drops back to [`ViewState::Unauthenticated`].
//!
//! - **[`aggregate`]**: Pure transforms from wire payloads to display
//!   rows: ordering by count / expiry and per-resolver latency averages.
//!
//! - **Domain model** ([`model`]): `StatisticEntry`, `CacheEntry`,
//!   `ResolverStat`, and the `Dashboard` snapshot that bundles them.

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, TlsVerification};
pub use controller::{Controller, ViewState};
pub use error::CoreError;
pub use model::{AllowedDomain, CacheEntry, Dashboard, ResolverStat, StatisticEntry};

pub use dnsward_api::Session;
