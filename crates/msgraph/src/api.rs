//! Microsoft Graph API client
//!
//! [`GraphApi`] owns the tenant identity, the OAuth2 client-credentials
//! configuration, the cached access token and the HTTP client. Both the token
//! and the client are created lazily on first use.
//!
//! ## Lifecycle
//!
//! 1. [`GraphApi::new`] derives the token and API endpoints from the tenant domain
//! 2. Setters supply the client ID, client secret and debug flags
//! 3. The first request validates the configuration, runs the
//!    client-credentials exchange and builds the HTTP client
//! 4. Later requests reuse the token until it nears expiry, then fetch a new one
//!
//! Token acquisition is serialized behind an async mutex and client
//! construction behind a once-cell, so a `GraphApi` can be shared across
//! tasks and concurrent first use still performs a single exchange.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{AsyncHttpClient, AuthType, ClientId, ClientSecret, RequestTokenError, TokenUrl};
use reqwest::{Client, Response};
use serde::de::{self, DeserializeOwned, Unexpected};
use tokio::sync::{Mutex, OnceCell};
use url::Url;

use crate::resource::{Resource, ResourceRegistry};
use crate::token::AccessToken;
use crate::transport::{DebugSink, DebugTransport, HttpTransport, Transport};
use crate::{GraphError, Result};

/// Default Microsoft identity platform host
pub const DEFAULT_LOGIN_PREFIX: &str = "https://login.microsoftonline.com";

/// Default Microsoft Graph host
pub const DEFAULT_GRAPH_PREFIX: &str = "https://graph.microsoft.com";

// ============================================================================
// Endpoints
// ============================================================================

/// Hosts the client talks to
///
/// Overridable so the client can be pointed at a national cloud or a stub
/// server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Identity platform prefix, e.g. `https://login.microsoftonline.com`
    pub login: String,
    /// Graph prefix, e.g. `https://graph.microsoft.com`
    pub graph: String,
}

impl Endpoints {
    pub fn new(login: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            graph: graph.into(),
        }
    }

    /// Token-issuing endpoint for `tenant`: `{login}/{tenant}/oauth2/token`
    pub fn auth_url(&self, tenant: &str) -> String {
        format!("{}/{}/oauth2/token", self.login.trim_end_matches('/'), tenant)
    }

    /// API root for `tenant`: `{graph}/{tenant}`
    pub fn token_url(&self, tenant: &str) -> String {
        format!("{}/{}", self.graph.trim_end_matches('/'), tenant)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PREFIX, DEFAULT_GRAPH_PREFIX)
    }
}

// ============================================================================
// OAuth2Config
// ============================================================================

/// Client-credentials configuration
#[derive(Clone, Default)]
struct OAuth2Config {
    /// Where the token is requested
    auth_url: String,
    /// API root the token is used against
    token_url: String,
    /// `resource` parameter sent with the exchange
    resource: String,
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("resource", &self.resource)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// GraphClient
// ============================================================================

/// Authenticated HTTP client produced by [`GraphApi::client`]
///
/// Holds the transport selected when it was built (with or without the
/// debug tee). Clones share the same transport.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    transport: Arc<dyn Transport>,
}

impl GraphClient {
    fn new(http: Client, transport: Arc<dyn Transport>) -> Self {
        Self { http, transport }
    }

    /// Issues a GET to `url` with `token` as the bearer credential
    ///
    /// Any response status is returned as-is; only failures to complete the
    /// exchange are errors.
    pub async fn get(&self, url: Url, token: &AccessToken) -> Result<Response> {
        let request = self
            .http
            .get(url.clone())
            .bearer_auth(token.secret())
            .build()
            .map_err(|e| GraphError::transport(&format!("Building GET {}", url), e))?;

        self.transport
            .execute(request)
            .await
            .map_err(|e| GraphError::transport(&format!("GET {}", url), e))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphClient").finish_non_exhaustive()
    }
}

// ============================================================================
// GraphApi
// ============================================================================

/// Entry point for the Microsoft Graph API
#[derive(Debug)]
pub struct GraphApi {
    tenant_domain: String,
    config: OAuth2Config,
    registry: Arc<ResourceRegistry>,
    http: Client,
    debug: bool,
    http_debug: bool,
    debug_sink: DebugSink,
    token: Mutex<Option<AccessToken>>,
    client: OnceCell<GraphClient>,
}

impl GraphApi {
    /// Creates a client for `tenant_domain` against the public Microsoft cloud
    pub fn new(tenant_domain: impl Into<String>) -> Self {
        Self::with_endpoints(tenant_domain, Endpoints::default())
    }

    /// Creates a client for `tenant_domain` against custom hosts
    pub fn with_endpoints(tenant_domain: impl Into<String>, endpoints: Endpoints) -> Self {
        let tenant_domain = tenant_domain.into();

        let config = OAuth2Config {
            auth_url: endpoints.auth_url(&tenant_domain),
            token_url: endpoints.token_url(&tenant_domain),
            resource: endpoints.graph.trim_end_matches('/').to_string(),
            ..OAuth2Config::default()
        };

        Self {
            tenant_domain,
            config,
            registry: Arc::new(ResourceRegistry::with_defaults()),
            http: Client::new(),
            debug: false,
            http_debug: false,
            debug_sink: DebugSink::stderr(),
            token: Mutex::new(None),
            client: OnceCell::new(),
        }
    }

    /// Replaces the resource registry
    pub fn with_registry(mut self, registry: Arc<ResourceRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the sink receiving HTTP debug output (stderr by default)
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug_sink = sink;
        self
    }

    pub fn tenant_domain(&self) -> &str {
        &self.tenant_domain
    }

    /// Endpoint the client-credentials exchange is sent to
    pub fn auth_url(&self) -> &str {
        &self.config.auth_url
    }

    /// API root resource endpoints are resolved against
    pub fn token_url(&self) -> &str {
        &self.config.token_url
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Enables verbose diagnostics for this client
    ///
    /// When off, the client emits no debug-level events.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        client_debug!(self, "Debug logging enabled");
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Installs the debug transport when the HTTP client is next built
    ///
    /// Has no effect once [`GraphApi::client`] has succeeded.
    pub fn set_http_debug(&mut self, http_debug: bool) {
        self.http_debug = http_debug;
        if http_debug {
            client_debug!(self, "HTTP client debug logging enabled");
        }
    }

    pub fn http_debug(&self) -> bool {
        self.http_debug
    }

    /// Sets the OAuth2 client ID
    pub fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.config.client_id = client_id.into();
        client_debug!(self, client_id = %self.config.client_id, "Setting client ID");
    }

    /// Sets the OAuth2 client secret
    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.config.client_secret = client_secret.into();
        client_debug!(self, "Setting client secret");
    }

    /// Checks that tenant domain, client ID and client secret are all set
    ///
    /// # Errors
    /// [`GraphError::Configuration`] naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        if self.tenant_domain.is_empty() {
            return Err(GraphError::Configuration(
                "Tenant domain must be set".to_string(),
            ));
        }
        if self.config.client_id.is_empty() {
            return Err(GraphError::Configuration("Client ID must be set".to_string()));
        }
        if self.config.client_secret.is_empty() {
            return Err(GraphError::Configuration(
                "Client secret must be set".to_string(),
            ));
        }
        client_debug!(self, "GraphApi validation successful");
        Ok(())
    }

    /// Returns a valid access token, fetching one if none is cached or the
    /// cached one has expired
    ///
    /// Validation runs before every exchange; an invalid configuration fails
    /// without touching the network.
    ///
    /// # Errors
    /// - [`GraphError::Configuration`] if a required setting is missing
    /// - [`GraphError::Token`] if the exchange fails
    pub async fn get_token(&self) -> Result<AccessToken> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.clone());
            }
            client_debug!(self, tenant = %self.tenant_domain, "Cached token expired");
        }

        self.validate()?;

        client_debug!(self, tenant = %self.tenant_domain, "Retrieving an OAuth2 token");
        let token = self.exchange_token(self.current_transport()).await?;
        client_debug!(
            self,
            tenant = %self.tenant_domain,
            expires_at = ?token.expires_at(),
            "OAuth2 token retrieved"
        );

        *cached = Some(token.clone());
        Ok(token)
    }

    /// Supplying an externally obtained token is not supported
    ///
    /// # Errors
    /// Always returns [`GraphError::Unsupported`].
    pub fn set_token(&self, _token: AccessToken) -> Result<()> {
        Err(GraphError::Unsupported("set_token"))
    }

    /// Returns the HTTP client, building it on first call
    ///
    /// Building selects the transport (wrapped in [`DebugTransport`] when HTTP
    /// debugging is on) and acquires the access token. A failed build leaves
    /// nothing cached, so the next call tries again.
    pub async fn client(&self) -> Result<&GraphClient> {
        self.client.get_or_try_init(|| self.build_client()).await
    }

    async fn build_client(&self) -> Result<GraphClient> {
        client_debug!(self, http_debug = self.http_debug, "Creating a new HTTP client");
        let client = GraphClient::new(self.http.clone(), self.build_transport());
        self.get_token().await?;
        Ok(client)
    }

    /// Resolves the absolute URL of a resource collection
    ///
    /// # Errors
    /// [`GraphError::Endpoint`] if the URL cannot be built.
    pub fn resource_endpoint(&self, resource: &Resource) -> Result<Url> {
        resource.endpoint(&self.config.token_url)
    }

    /// Looks up `name` in the registry and resolves its endpoint
    pub(crate) fn registered_endpoint(&self, name: &str) -> Result<Url> {
        let resource = self.registry.get(name).ok_or_else(|| {
            GraphError::Configuration(format!("Resource {} is not registered", name))
        })?;
        self.resource_endpoint(resource)
    }

    /// GETs `url` and decodes the JSON body into `T`
    ///
    /// # Errors
    /// - [`GraphError::Transport`] if the request fails or the status is not a success
    /// - [`GraphError::Decoding`] if the body is not the expected shape
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let client = self.client().await?;
        let token = self.get_token().await?;

        let response = client.get(url.clone(), &token).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GraphError::transport(&format!("Reading response from {}", url), e))?;

        client_debug!(self, url = %url, status = %status, bytes = body.len(), "Response received");

        if !status.is_success() {
            return Err(GraphError::Transport {
                message: format!(
                    "GET {} returned {}: {}",
                    url,
                    status,
                    String::from_utf8_lossy(&body)
                ),
                source: None,
            });
        }

        decode_object(&body)
    }

    fn build_transport(&self) -> Arc<dyn Transport> {
        let base = HttpTransport::new(self.http.clone());
        if self.http_debug {
            Arc::new(DebugTransport::new(base, self.debug_sink.clone()))
        } else {
            Arc::new(base)
        }
    }

    /// The built client's transport, or a fresh one if the client does not exist yet
    fn current_transport(&self) -> Arc<dyn Transport> {
        match self.client.get() {
            Some(client) => Arc::clone(client.transport()),
            None => self.build_transport(),
        }
    }

    /// Runs the client-credentials exchange through `transport`
    async fn exchange_token(&self, transport: Arc<dyn Transport>) -> Result<AccessToken> {
        let token_url =
            TokenUrl::new(self.config.auth_url.clone()).map_err(|source| GraphError::Endpoint {
                url: self.config.auth_url.clone(),
                source,
            })?;

        let oauth = BasicClient::new(ClientId::new(self.config.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.config.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url);

        let http_client = TransportHttpClient { transport };

        let response = oauth
            .exchange_client_credentials()
            .add_extra_param("resource", self.config.resource.clone())
            .request_async(&http_client)
            .await
            .map_err(|err| GraphError::Token {
                message: describe_token_error(&err),
                source: Box::new(err),
            })?;

        Ok(AccessToken::from_response(&response, Utc::now()))
    }
}

// ============================================================================
// OAuth2 HTTP client
// ============================================================================

/// Sends the oauth2 crate's token requests through a [`Transport`]
///
/// oauth2 requires a `Send + Sync` future. The transport's future is only
/// `Send`, so each request runs on its own task and the returned future
/// only holds the join handle.
struct TransportHttpClient {
    transport: Arc<dyn Transport>,
}

type OAuthFuture<'c> =
    Pin<Box<dyn Future<Output = Result<oauth2::HttpResponse>> + Send + Sync + 'c>>;

impl<'c> AsyncHttpClient<'c> for TransportHttpClient {
    type Error = GraphError;
    type Future = OAuthFuture<'c>;

    fn call(&'c self, request: oauth2::HttpRequest) -> Self::Future {
        let task = tokio::spawn(send_oauth_request(Arc::clone(&self.transport), request));
        Box::pin(async move {
            match task.await {
                Ok(result) => result,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => Err(GraphError::Transport {
                    message: format!("Token request aborted: {}", err),
                    source: None,
                }),
            }
        })
    }
}

async fn send_oauth_request(
    transport: Arc<dyn Transport>,
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse> {
    let url = request.uri().to_string();
    let request = reqwest::Request::try_from(request)
        .map_err(|e| GraphError::transport(&format!("Building POST {}", url), e))?;
    let response = transport
        .execute(request)
        .await
        .map_err(|e| GraphError::transport(&format!("POST {}", url), e))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| GraphError::transport(&format!("Reading response from {}", url), e))?;

    let mut http_response = oauth2::HttpResponse::new(body.to_vec());
    *http_response.status_mut() = status;
    *http_response.headers_mut() = headers;
    Ok(http_response)
}

/// Decodes a JSON body that must be an object
///
/// Resource records default every missing field, so without this check an
/// array or scalar payload would decode into an empty record.
pub(crate) fn decode_object<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    if value.is_object() {
        return Ok(serde_json::from_value(value)?);
    }

    let unexpected = match &value {
        serde_json::Value::Array(_) => Unexpected::Seq,
        serde_json::Value::String(s) => Unexpected::Str(s),
        serde_json::Value::Bool(b) => Unexpected::Bool(*b),
        serde_json::Value::Number(_) => Unexpected::Other("number"),
        serde_json::Value::Null | serde_json::Value::Object(_) => Unexpected::Unit,
    };
    Err(GraphError::Decoding(<serde_json::Error as de::Error>::invalid_type(
        unexpected,
        &"a JSON object",
    )))
}

fn describe_token_error(err: &RequestTokenError<GraphError, BasicErrorResponse>) -> String {
    match err {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
