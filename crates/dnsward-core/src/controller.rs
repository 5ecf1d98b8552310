// ── Controller ──
//
// Runs the refresh cycle against the management API and owns the view
// state. One cycle at a time: a new cycle supersedes the one in flight,
// and a cycle publishes its dashboard only if every stage succeeded.

use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use dnsward_api::{ApiClient, Session};

use crate::aggregate;
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{AllowedDomain, CacheEntry, Dashboard, ResolverStat, StatisticEntry};

// ── ViewState ────────────────────────────────────────────────────

/// Which surface the operator is looking at, and what the current cycle
/// is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Login surface. Carries the error that sent us here, if any.
    Unauthenticated { error: Option<String> },
    FetchingStatistics,
    FetchingCache,
    FetchingInstrumentation,
    FetchingAllowedDomains,
    Ready,
}

impl ViewState {
    /// Whether the main surface is shown. It appears once the first
    /// call of a cycle has been accepted.
    pub fn is_main_visible(&self) -> bool {
        matches!(
            self,
            Self::FetchingCache
                | Self::FetchingInstrumentation
                | Self::FetchingAllowedDomains
                | Self::Ready
        )
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. All clones share one
/// session, one view state, and one cycle slot.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    client: ApiClient,
    session: Arc<Session>,
    view: watch::Sender<ViewState>,
    dashboard: watch::Sender<Option<Arc<Dashboard>>>,
    /// Held for the whole of a cycle.
    cycle_lock: Mutex<()>,
    /// Token of the most recently requested cycle.
    latest_cycle: StdMutex<CancellationToken>,
}

impl Controller {
    /// Build a controller and its session from configuration.
    ///
    /// A credential in `config.stored_credential` is restored into the
    /// session. Nothing is fetched until [`refresh`](Self::refresh) or
    /// [`login`](Self::login).
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let session = Arc::new(match &config.stored_credential {
            Some(secret) => Session::restore(secret.clone()),
            None => Session::new(),
        });
        let client = ApiClient::new(config.api_root.as_str(), session, &config.transport())?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing API client, sharing its session.
    pub fn with_client(client: ApiClient) -> Self {
        let session = Arc::clone(client.session());
        let (view, _) = watch::channel(ViewState::Unauthenticated { error: None });
        let (dashboard, _) = watch::channel(None);

        Self {
            inner: Arc::new(ControllerInner {
                client,
                session,
                view,
                dashboard,
                cycle_lock: Mutex::new(()),
                latest_cycle: StdMutex::new(CancellationToken::new()),
            }),
        }
    }

    /// One-shot: build, run closure, drop.
    pub async fn oneshot<F, Fut, T>(config: &ClientConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config)?;
        f(controller).await
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.inner.session
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Take a credential from the operator and run a full cycle with it.
    ///
    /// The credential is kept for the session only if the first call of
    /// the cycle is accepted.
    pub async fn login(&self, secret: SecretString) -> Result<Arc<Dashboard>, CoreError> {
        self.inner.session.set_input(secret);
        self.refresh().await
    }

    /// Forget the credential and return to the login surface.
    pub fn logout(&self) {
        self.inner.session.reset();
        self.set_view(ViewState::Unauthenticated { error: None });
        info!("logged out");
    }

    // ── Refresh cycle ────────────────────────────────────────────

    /// Run a full refresh cycle.
    ///
    /// Stages run strictly in sequence: statistics, cache,
    /// instrumentation, allow-list. On success the new dashboard is
    /// published and the view becomes [`ViewState::Ready`]. On the first
    /// failure the cycle stops, nothing is published, and the view drops
    /// to [`ViewState::Unauthenticated`] with the error; the previous
    /// dashboard stays in place behind the login surface.
    ///
    /// Starting a cycle while another is in flight cancels the older
    /// one, which returns [`CoreError::Superseded`] without touching the
    /// view state.
    pub async fn refresh(&self) -> Result<Arc<Dashboard>, CoreError> {
        let token = CancellationToken::new();
        {
            let mut latest = self
                .inner
                .latest_cycle
                .lock()
                .expect("cycle token lock poisoned");
            latest.cancel();
            *latest = token.clone();
        }

        let _cycle = self.inner.cycle_lock.lock().await;
        if token.is_cancelled() {
            debug!("refresh superseded before it started");
            return Err(CoreError::Superseded);
        }

        info!("refresh cycle started");
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(CoreError::Superseded),
            result = self.run_cycle() => result,
        };

        match outcome {
            Ok(dashboard) => {
                let dashboard = Arc::new(dashboard);
                self.inner
                    .dashboard
                    .send_replace(Some(Arc::clone(&dashboard)));
                self.set_view(ViewState::Ready);
                info!(
                    statistics = dashboard.statistics.len(),
                    cache = dashboard.cache_count(),
                    resolvers = dashboard.resolvers.len(),
                    allowed_domains = dashboard.allowed_domains.len(),
                    "refresh cycle complete"
                );
                Ok(dashboard)
            }
            Err(CoreError::Superseded) => {
                debug!("refresh superseded mid-cycle");
                Err(CoreError::Superseded)
            }
            Err(e) => {
                warn!(error = %e, "refresh cycle failed");
                self.set_view(ViewState::Unauthenticated {
                    error: Some(e.to_string()),
                });
                Err(e)
            }
        }
    }

    /// The stages of one cycle. Results stay local until all succeed.
    async fn run_cycle(&self) -> Result<Dashboard, CoreError> {
        let client = &self.inner.client;

        self.set_view(ViewState::FetchingStatistics);
        let statistics = aggregate::sort_statistics(client.filter_statistics().await?);
        self.inner.session.persist_input();

        self.set_view(ViewState::FetchingCache);
        let cache = aggregate::sort_cache(client.cache().await?);

        self.set_view(ViewState::FetchingInstrumentation);
        let resolvers = aggregate::aggregate_instrumentation(&client.instrumentation().await?)?;

        self.set_view(ViewState::FetchingAllowedDomains);
        let allowed_domains = client.allowed_domains().await?;

        Ok(Dashboard {
            statistics,
            cache,
            resolvers,
            allowed_domains,
            fetched_at: Utc::now(),
        })
    }

    // ── Allow-list mutations ─────────────────────────────────────

    /// Add a domain to the allow-list, then run a full cycle.
    ///
    /// If the add itself fails the view state is left as it was.
    pub async fn add_allowed_domain(&self, name: &str) -> Result<Arc<Dashboard>, CoreError> {
        let name = validate_domain(name)?;
        self.inner.client.add_allowed_domain(name).await?;
        info!(domain = name, "domain added to allow-list");
        self.refresh().await
    }

    /// Remove a domain from the allow-list, then run a full cycle.
    ///
    /// If the delete itself fails the view state is left as it was.
    pub async fn delete_allowed_domain(&self, name: &str) -> Result<Arc<Dashboard>, CoreError> {
        let name = validate_domain(name)?;
        self.inner.client.delete_allowed_domain(name).await?;
        info!(domain = name, "domain removed from allow-list");
        self.refresh().await
    }

    // ── Single-category reads ────────────────────────────────────
    //
    // One call plus its aggregation. These do not move the view state
    // or touch the published dashboard.

    pub async fn statistics(&self) -> Result<Vec<StatisticEntry>, CoreError> {
        let counts = self.inner.client.filter_statistics().await?;
        Ok(aggregate::sort_statistics(counts))
    }

    pub async fn cache_entries(&self) -> Result<Vec<CacheEntry>, CoreError> {
        let records = self.inner.client.cache().await?;
        Ok(aggregate::sort_cache(records))
    }

    pub async fn resolver_stats(&self) -> Result<Vec<ResolverStat>, CoreError> {
        let samples = self.inner.client.instrumentation().await?;
        aggregate::aggregate_instrumentation(&samples)
    }

    pub async fn allowed_domains(&self) -> Result<Vec<AllowedDomain>, CoreError> {
        Ok(self.inner.client.allowed_domains().await?)
    }

    // ── State observation ────────────────────────────────────────

    pub fn view_state(&self) -> ViewState {
        self.inner.view.borrow().clone()
    }

    /// Subscribe to view state transitions.
    pub fn subscribe_view(&self) -> watch::Receiver<ViewState> {
        self.inner.view.subscribe()
    }

    /// The last complete dashboard, if any cycle has ever succeeded.
    pub fn dashboard(&self) -> Option<Arc<Dashboard>> {
        self.inner.dashboard.borrow().clone()
    }

    /// Subscribe to newly published dashboards.
    pub fn subscribe_dashboard(&self) -> watch::Receiver<Option<Arc<Dashboard>>> {
        self.inner.dashboard.subscribe()
    }

    fn set_view(&self, state: ViewState) {
        debug!(?state, "view state");
        self.inner.view.send_replace(state);
    }
}

/// Trim and reject empty domain names.
fn validate_domain(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "domain name cannot be empty".into(),
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(CoreError::ValidationFailed {
            message: format!("domain name '{trimmed}' contains whitespace"),
        });
    }
    Ok(trimmed)
}
