// Management API HTTP client
//
// Single chokepoint for every call the operator client makes: URL
// construction under the API root, bearer header injection from the
// shared session, status interpretation (401 clears the session), and
// typed JSON decoding.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::{
    CacheRecord, CacheResponse, DomainRequest, FilterStatisticsResponse, InstrumentationResponse,
    InstrumentationSample,
};
use crate::session::Session;
use crate::transport::TransportConfig;

/// Path of the management API below the server root.
pub const API_ROOT_PATH: &str = "/api/1";

const BODY_PREVIEW_CHARS: usize = 200;

// ── Resources ────────────────────────────────────────────────────────

/// The resources exposed under the API root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    FilterStatistics,
    Cache,
    Instrumentation,
    AllowedDomains,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Self::FilterStatistics => "filter-statistics",
            Self::Cache => "cache",
            Self::Instrumentation => "instrumentation",
            Self::AllowedDomains => "allowed-domains",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the management API.
///
/// Every request carries `authorization: Bearer <credential>` where the
/// credential is read from the shared [`Session`] at send time, so a
/// login or a 401 elsewhere is seen by the very next call.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a server URL, the shared session, and transport settings.
    ///
    /// `base_url` may be the server root (`https://filter.lan`) or the
    /// API root itself (`https://filter.lan/api/1`).
    pub fn new(
        base_url: &str,
        session: Arc<Session>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http, session)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        base_url: &str,
        http: reqwest::Client,
        session: Arc<Session>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Build the API root with a trailing slash so resource names join
    /// underneath it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with(API_ROOT_PATH) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}{API_ROOT_PATH}/"));
        }

        Ok(url)
    }

    /// The normalized API root (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    fn url(&self, resource: Resource) -> Result<Url, Error> {
        Ok(self.base_url.join(resource.path())?)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Issue one authenticated call and decode the 200 body as `T`.
    ///
    /// - 200: body parsed as JSON into `T` (`MalformedResponse` on mismatch)
    /// - 401: stored credential cleared, then `Unauthorized`
    /// - anything else: `RequestFailed`, session untouched
    pub async fn call<T, B>(
        &self,
        resource: Resource,
        method: Method,
        body: Option<&B>,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + Sync + ?Sized,
    {
        let url = self.url(resource)?;
        debug!("{method} {url}");

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.bearer_header()?);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        self.handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, resource: Resource) -> Result<T, Error> {
        self.call::<T, ()>(resource, Method::GET, None).await
    }

    fn bearer_header(&self) -> Result<HeaderValue, Error> {
        let credential = self.session.credential();
        let token = credential.as_ref().map_or("", |s| s.expose_secret());
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::InvalidCredential(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let status_text = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_owned(), str::to_owned);

        if status == StatusCode::UNAUTHORIZED {
            warn!("credential rejected, clearing session");
            self.session.clear();
            return Err(Error::Unauthorized { status_text });
        }

        if status != StatusCode::OK {
            return Err(Error::RequestFailed {
                status: status.as_u16(),
                status_text,
            });
        }

        let body = resp.text().await?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            Error::MalformedResponse {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Per-rule filter hit counters, in server order.
    pub async fn filter_statistics(&self) -> Result<indexmap::IndexMap<String, u64>, Error> {
        let resp: FilterStatisticsResponse = self.get(Resource::FilterStatistics).await?;
        Ok(resp.into_counts())
    }

    /// Current DNS cache contents.
    pub async fn cache(&self) -> Result<Vec<CacheRecord>, Error> {
        let resp: CacheResponse = self.get(Resource::Cache).await?;
        Ok(resp.into_records())
    }

    /// Raw upstream request timing samples.
    pub async fn instrumentation(&self) -> Result<Vec<InstrumentationSample>, Error> {
        let resp: InstrumentationResponse = self.get(Resource::Instrumentation).await?;
        Ok(resp.into_samples())
    }

    /// The allow-list, in the order the server keeps it.
    pub async fn allowed_domains(&self) -> Result<Vec<String>, Error> {
        self.get(Resource::AllowedDomains).await
    }

    /// Add a domain to the allow-list. The acknowledgement body is
    /// implementation-defined and returned as-is.
    pub async fn add_allowed_domain(&self, name: &str) -> Result<serde_json::Value, Error> {
        let body = DomainRequest { name: name.into() };
        self.call(Resource::AllowedDomains, Method::POST, Some(&body))
            .await
    }

    /// Remove a domain from the allow-list.
    pub async fn delete_allowed_domain(&self, name: &str) -> Result<serde_json::Value, Error> {
        let body = DomainRequest { name: name.into() };
        self.call(Resource::AllowedDomains, Method::DELETE, Some(&body))
            .await
    }
}
