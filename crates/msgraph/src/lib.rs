//! msgraph - Microsoft Graph API client engine
//!
//! Provides an async client for:
//! - OAuth2 authentication (client-credentials grant) with a cached token
//! - Versioned endpoint resolution through a resource registry
//! - Composable OData query options (`$select`, `$orderby`, `$top`, ...)
//! - Optional HTTP wire tracing of requests and responses
//!
//! ## Modules
//!
//! - [`api`] - [`GraphApi`], the configured entry point
//! - [`query`] - OData query option model
//! - [`resource`] - Resource descriptors and the [`ResourceRegistry`]
//! - [`token`] - Cached OAuth2 access tokens
//! - [`transport`] - HTTP transports, including the debug tee
//! - [`user`] - The `user` resource and [`GraphApi::get_user`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use msgraph::GraphApi;
//!
//! # async fn example() -> Result<(), msgraph::GraphError> {
//! let mut api = GraphApi::new("contoso.com");
//! api.set_client_id("client-id");
//! api.set_client_secret("client-secret");
//!
//! let user = api.get_user("jane@contoso.com", &["displayName"]).await?;
//! println!("{:?}", user.display_name);
//! # Ok(())
//! # }
//! ```

/// `tracing::debug!` that only fires while the client's debug flag is set
macro_rules! client_debug {
    ($api:expr, $($arg:tt)+) => {
        if $api.debug() {
            tracing::debug!($($arg)+);
        }
    };
}

pub mod api;
pub mod nullable;
pub mod query;
pub mod resource;
pub mod token;
pub mod transport;
pub mod user;

pub use api::{Endpoints, GraphApi, GraphClient};
pub use nullable::Nullable;
pub use query::{FilterExpression, LogicalFilter, LogicalOperator, OrderDirection, Query, QueryOption};
pub use resource::{ApiVersion, Resource, ResourceRegistry};
pub use token::AccessToken;
pub use transport::{DebugSink, DebugTransport, HttpTransport, Transport};
pub use user::User;

use thiserror::Error;

/// Boxed cause carried by errors that wrap a lower-level failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when communicating with the Microsoft Graph API
///
/// Every variant that wraps a lower-level failure exposes it through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum GraphError {
    /// A required setting (tenant domain, client ID, client secret) is missing,
    /// or the client is otherwise misconfigured
    #[error("{0}")]
    Configuration(String),

    /// The OAuth2 client-credentials exchange failed
    #[error("Retrieving token: {message}")]
    Token {
        /// Description of the failure
        message: String,
        /// The underlying OAuth2 or transport error
        #[source]
        source: BoxError,
    },

    /// A resource request could not be completed or returned a non-success status
    #[error("{message}")]
    Transport {
        /// Description of the failure, including status and body when available
        message: String,
        /// The underlying HTTP error, if the request failed before a response
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The response body did not match the expected shape
    #[error("Decoding response: {0}")]
    Decoding(#[from] serde_json::Error),

    /// The operation exists in the API surface but is not supported
    #[error("{0}: not implemented")]
    Unsupported(&'static str),

    /// An endpoint URL could not be built from the configured pieces
    #[error("Creating endpoint {url}: {source}")]
    Endpoint {
        /// The URL that failed to parse
        url: String,
        /// The parse failure
        #[source]
        source: url::ParseError,
    },
}

impl GraphError {
    /// Wraps a reqwest error raised while sending a resource request
    pub(crate) fn transport(context: &str, source: reqwest::Error) -> Self {
        GraphError::Transport {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }
}

/// Convenience alias for results returned by this crate
pub type Result<T> = std::result::Result<T, GraphError>;
