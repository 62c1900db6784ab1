//! HTTP target over blocking reqwest
//!
//! Endpoints come from [`Config`]: a single base URL for local deployments,
//! or one query endpoint per named cluster.

use std::collections::HashMap;
use std::time::Duration;

use stepcheck_core::target::QUERY_SERVICE;
use stepcheck_core::{
    Config, Endpoint, HttpRequest, HttpResponse, Service, Target, TargetError,
};

/// Sends test requests to a deployment described by [`Config`].
pub struct HttpTarget {
    client: reqwest::blocking::Client,
    base_url: String,
    endpoints: Vec<Endpoint>,
    headers: HashMap<String, String>,
}

impl HttpTarget {
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &Config) -> Result<Self, TargetError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TargetError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.target.clone(),
            endpoints: config.endpoints.clone(),
            headers: config.headers.clone(),
        })
    }
}

impl Target for HttpTarget {
    fn service(&self, kind: &str, cluster: Option<&str>) -> Result<Service, TargetError> {
        let service = resolve_service(&self.base_url, &self.endpoints, kind, cluster)?;
        tracing::debug!(kind, cluster = ?cluster, url = %service.base_url, "resolved service");
        Ok(service)
    }

    fn send(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, TargetError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TargetError::Http(format!("invalid HTTP method '{}'", request.method)))?;

        let mut req = self
            .client
            .request(method, request.url.as_str())
            .timeout(timeout);
        for (k, v) in &self.headers {
            // The request's own Content-Type always wins
            if !k.eq_ignore_ascii_case("content-type") {
                req = req.header(k, v);
            }
        }
        for (k, v) in &request.headers {
            req = req.header(k, v);
        }
        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let resp = req.send().map_err(|e| TargetError::Http(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| TargetError::Http(e.to_string()))?
            .to_vec();
        tracing::debug!(status, bytes = body.len(), "received response");

        Ok(HttpResponse { status, body })
    }
}

/// Pick the endpoint of `kind` for `cluster`.
///
/// - No endpoints configured → `base_url`, whatever the cluster
/// - Cluster named → that cluster's endpoint
/// - No cluster named → the only endpoint, if there is exactly one
fn resolve_service(
    base_url: &str,
    endpoints: &[Endpoint],
    kind: &str,
    cluster: Option<&str>,
) -> Result<Service, TargetError> {
    if kind != QUERY_SERVICE {
        return Err(TargetError::UnknownService(kind.to_string()));
    }

    let url = if endpoints.is_empty() {
        base_url
    } else {
        match cluster {
            Some(name) => endpoints
                .iter()
                .find(|e| e.cluster == name)
                .map(|e| e.url.as_str())
                .ok_or_else(|| TargetError::UnknownCluster {
                    cluster: name.to_string(),
                    known: cluster_names(endpoints),
                })?,
            None if endpoints.len() == 1 => endpoints[0].url.as_str(),
            None => return Err(TargetError::AmbiguousCluster(cluster_names(endpoints))),
        }
    };

    Ok(Service {
        base_url: url.trim_end_matches('/').to_string(),
    })
}

fn cluster_names(endpoints: &[Endpoint]) -> String {
    endpoints
        .iter()
        .map(|e| e.cluster.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn endpoint(cluster: &str, url: &str) -> Endpoint {
        Endpoint {
            cluster: cluster.into(),
            url: url.into(),
        }
    }

    // ── service resolution ──

    #[test]
    fn no_endpoints_uses_base_url_for_any_cluster() {
        let s = resolve_service("http://127.0.0.1:8080", &[], "query", Some("whatever")).unwrap();
        assert_eq!(s.base_url, "http://127.0.0.1:8080");
        let s = resolve_service("http://127.0.0.1:8080/", &[], "query", None).unwrap();
        assert_eq!(s.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn named_cluster_selects_endpoint() {
        let eps = [endpoint("a", "https://a.example.com"), endpoint("b", "https://b.example.com")];
        let s = resolve_service("unused", &eps, "query", Some("b")).unwrap();
        assert_eq!(s.base_url, "https://b.example.com");
    }

    #[test]
    fn single_endpoint_used_without_cluster() {
        let eps = [endpoint("only", "https://only.example.com")];
        let s = resolve_service("unused", &eps, "query", None).unwrap();
        assert_eq!(s.base_url, "https://only.example.com");
    }

    #[test]
    fn multiple_endpoints_without_cluster_is_ambiguous() {
        let eps = [endpoint("a", "https://a"), endpoint("b", "https://b")];
        let err = resolve_service("unused", &eps, "query", None).unwrap_err();
        assert!(matches!(err, TargetError::AmbiguousCluster(_)));
        assert_eq!(
            err.to_string(),
            "multiple clusters, none of which are specified: a, b"
        );
    }

    #[test]
    fn unknown_cluster_lists_known_ones() {
        let eps = [endpoint("a", "https://a")];
        let err = resolve_service("unused", &eps, "query", Some("c")).unwrap_err();
        assert_eq!(err.to_string(), "no such cluster 'c', known clusters: a");
    }

    #[test]
    fn only_query_service_is_known() {
        let err = resolve_service("http://h", &[], "document", None).unwrap_err();
        assert!(matches!(err, TargetError::UnknownService(_)));
    }

    // ── sending ──

    /// Serve one request on a local port, returning what the client sent.
    fn serve_once(response: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = stream.read(&mut buf).unwrap();
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if received.len() >= head_end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&received).to_string()
        });
        (addr, handle)
    }

    #[test]
    fn send_delivers_method_query_headers_and_body() {
        let (addr, server) = serve_once(
            "HTTP/1.1 201 Created\r\nContent-Length: 10\r\nConnection: close\r\n\r\n{\"hits\":1}",
        );
        let config = Config {
            target: addr.clone(),
            headers: HashMap::from([
                ("X-Token".to_string(), "secret".to_string()),
                ("Content-Type".to_string(), "text/plain".to_string()),
            ]),
            ..Config::default()
        };
        let target = HttpTarget::from_config(&config).unwrap();
        let request = HttpRequest {
            method: "POST".into(),
            url: format!("{addr}/search/?timeout=1s"),
            headers: vec![("Content-Type".into(), "application/json".into())],
            body: Some(br#"{"q":"a"}"#.to_vec()),
        };

        let response = target.send(&request, Duration::from_secs(10)).unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.text(), r#"{"hits":1}"#);

        let received = server.join().unwrap();
        assert!(received.starts_with("POST /search/?timeout=1s HTTP/1.1\r\n"));
        let lower = received.to_ascii_lowercase();
        assert!(lower.contains("content-type: application/json"));
        assert!(!lower.contains("text/plain"));
        assert!(lower.contains("x-token: secret"));
        assert!(received.ends_with(r#"{"q":"a"}"#));
    }

    #[test]
    fn connection_failure_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let target = HttpTarget::from_config(&Config::default()).unwrap();
        let request = HttpRequest {
            method: "GET".into(),
            url: format!("http://{addr}/search/"),
            headers: vec![],
            body: None,
        };
        let err = target.send(&request, Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, TargetError::Http(_)));
    }

    #[test]
    fn invalid_method_rejected_before_sending() {
        let target = HttpTarget::from_config(&Config::default()).unwrap();
        let request = HttpRequest {
            method: "BAD METHOD".into(),
            url: "http://127.0.0.1:1/".into(),
            headers: vec![],
            body: None,
        };
        let err = target.send(&request, Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("invalid HTTP method"));
    }
}
