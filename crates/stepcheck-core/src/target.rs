//! Target capability: where requests go and how they are sent
//!
//! The runner only depends on this contract. Endpoint discovery and the
//! transport live behind it.

use std::time::Duration;

/// Service kind that test steps are sent to.
pub const QUERY_SERVICE: &str = "query";

/// A resolved service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Scheme, host and port, without a trailing slash
    pub base_url: String,
}

/// A fully built HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Absolute URL including the query string
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// A received HTTP response, body read in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A deployment that test requests can be sent to.
pub trait Target {
    /// Resolve the endpoint of service `kind` in `cluster`.
    ///
    /// `cluster` is `None` when neither the step nor the suite names one; the
    /// target decides whether that is unambiguous.
    ///
    /// # Errors
    ///
    /// Returns error if the service or cluster is unknown or ambiguous.
    fn service(&self, kind: &str, cluster: Option<&str>) -> Result<Service, TargetError>;

    /// Send `request`, waiting at most `timeout` for the full response.
    ///
    /// # Errors
    ///
    /// Returns error on connection failure, timeout, or an unreadable response.
    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TargetError>;
}

impl<T: Target + ?Sized> Target for &T {
    fn service(&self, kind: &str, cluster: Option<&str>) -> Result<Service, TargetError> {
        (**self).service(kind, cluster)
    }

    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TargetError> {
        (**self).send(request, timeout)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("no {0} service available")]
    UnknownService(String),
    #[error("no such cluster '{cluster}', known clusters: {known}")]
    UnknownCluster { cluster: String, known: String },
    #[error("multiple clusters, none of which are specified: {0}")]
    AmbiguousCluster(String),
    #[error("HTTP error: {0}")]
    Http(String),
}
