//! Panel error definitions.

use thiserror::Error;

/// Errors that can occur while fetching node information.
#[derive(Debug, Error)]
pub enum PanelError {
    /// `ApiHost` is not a usable base URL.
    #[error("invalid panel endpoint {host}: {source}")]
    InvalidEndpoint {
        host: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("build http client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connection, timeout or body read failure.
    #[error("request {path} failed: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The panel answered with a non-success status.
    #[error("request {path} returned status {status}: {body}")]
    Status {
        path: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body is not a valid node descriptor.
    #[error("decode node info: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// A block route carries a match field that is neither a string nor a list of strings.
    #[error("route {route_id}: unsupported match field {found}")]
    MalformedRule { route_id: i64, found: String },

    /// A block route pattern is not a valid regular expression.
    #[error("route {route_id}: invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        route_id: i64,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A base config interval is not a non-negative integer.
    #[error("invalid {field}: {value}")]
    InvalidInterval { field: &'static str, value: String },
}

impl PanelError {
    /// True for failures of the HTTP exchange itself.
    pub fn is_transport(&self) -> bool {
        matches!(self, PanelError::Transport { .. } | PanelError::Status { .. })
    }
}

/// Result type for panel operations.
pub type PanelResult<T> = Result<T, PanelError>;
