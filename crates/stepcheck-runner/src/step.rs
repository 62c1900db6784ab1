//! Step execution: build one request, send it, check the response
//!
//! Outcomes are split in two:
//!
//! - `Ok(StepOutcome::Failed)`: the service answered, but not as expected
//! - `Err(StepError)`: the step could not be carried out (bad test files,
//!   unknown cluster, network failure, non-JSON response)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use stepcheck_core::reference::{resolve_body, resolve_parameters};
use stepcheck_core::suite::base_dir;
use stepcheck_core::target::QUERY_SERVICE;
use stepcheck_core::{
    Defaults, HttpRequest, HttpResponse, ResolveError, Step, Target, TargetError, TestSuite,
    compare,
};

/// How long a single request may take. The service enforces its own
/// query timeouts; this only guards against hangs.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Suite-level values shared by every step, resolved once per suite.
#[derive(Debug, Clone)]
pub struct SuiteContext {
    /// Directory referenced files are read from
    pub base_dir: PathBuf,
    pub defaults: Defaults,
    /// Default parameters, already read and validated
    pub parameters: BTreeMap<String, String>,
}

impl SuiteContext {
    /// Resolve the defaults of `suite`, loaded from `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the default parameters cannot be resolved.
    pub fn resolve(suite: &TestSuite, path: &Path) -> Result<Self, ResolveError> {
        let base_dir = base_dir(path);
        let parameters = resolve_parameters(suite.defaults.parameters.as_ref(), &base_dir)?;
        Ok(Self {
            base_dir,
            defaults: suite.defaults.clone(),
            parameters,
        })
    }
}

/// Result of a step the service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed(StepFailure),
}

/// An assertion failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    /// One line, used in the final tally
    pub short: String,
    /// Full diagnostic including the actual response
    pub long: String,
}

/// Run one step against `target`.
///
/// # Errors
///
/// Returns error if the request cannot be built or sent, or if a JSON body is
/// expected and the response is not JSON.
pub fn execute<T: Target + ?Sized>(
    step: &Step,
    ctx: &SuiteContext,
    target: &T,
) -> Result<StepOutcome, StepError> {
    let request = build_request(step, ctx, target)?;
    let response = target.send(&request, REQUEST_TIMEOUT)?;
    check_response(step, ctx, &response)
}

/// Build the request for `step`, merging in suite defaults.
///
/// # Errors
///
/// Returns error if referenced files cannot be resolved, the service cannot
/// be found, or the resulting URL is invalid.
pub fn build_request<T: Target + ?Sized>(
    step: &Step,
    ctx: &SuiteContext,
    target: &T,
) -> Result<HttpRequest, StepError> {
    let body = resolve_body(step.request.body.as_ref(), &ctx.base_dir)?;

    let mut parameters = resolve_parameters(step.request.parameters.as_ref(), &ctx.base_dir)?;
    for (name, value) in &ctx.parameters {
        parameters
            .entry(name.clone())
            .or_insert_with(|| value.clone());
    }

    let cluster = step.request.cluster(&ctx.defaults);
    let service = target.service(QUERY_SERVICE, cluster)?;

    let url = build_url(&service.base_url, step.request.uri(), &parameters)?;
    tracing::debug!(method = step.request.method(), %url, "built request");

    Ok(HttpRequest {
        method: step.request.method().to_string(),
        url,
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: body.map(|b| b.to_string().into_bytes()),
    })
}

/// Join base URL and URI, then append `parameters` to any existing query.
fn build_url(
    base_url: &str,
    uri: &str,
    parameters: &BTreeMap<String, String>,
) -> Result<String, StepError> {
    let raw = format!("{base_url}{uri}");
    let mut url =
        reqwest::Url::parse(&raw).map_err(|e| StepError::InvalidUrl(raw.clone(), e.to_string()))?;
    if !parameters.is_empty() {
        let mut query = url.query_pairs_mut();
        for (name, value) in parameters {
            query.append_pair(name, value);
        }
    }
    Ok(url.to_string())
}

/// Check status code, then body, of `response` against `step`.
///
/// # Errors
///
/// Returns error if the expected body cannot be resolved, or if the response
/// is not JSON while a body is expected.
pub fn check_response(
    step: &Step,
    ctx: &SuiteContext,
    response: &HttpResponse,
) -> Result<StepOutcome, StepError> {
    let expected_code = step.response.code();
    if response.status != expected_code {
        let short = format!("Unexpected status code: {}", response.status);
        let long = format!(
            "{short}\nExpected: {expected_code}\nActual response:\n{}",
            render_body(&response.body)
        );
        return Ok(StepOutcome::Failed(StepFailure { short, long }));
    }

    let Some(expected) = resolve_body(step.response.body.as_ref(), &ctx.base_dir)? else {
        return Ok(StepOutcome::Passed);
    };

    let actual: Value = serde_json::from_slice(&response.body)
        .map_err(|e| StepError::NonJsonResponse(e.to_string(), response.text()))?;

    match compare(&expected, &actual) {
        None => Ok(StepOutcome::Passed),
        Some(mismatch) => {
            let long = format!(
                "{}\nActual response:\n{}",
                mismatch.describe(),
                pretty(&actual)
            );
            Ok(StepOutcome::Failed(StepFailure {
                short: mismatch.message,
                long,
            }))
        }
    }
}

/// Pretty JSON if the body parses, raw text otherwise.
fn render_body(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => pretty(&value),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("invalid request URL '{0}': {1}")]
    InvalidUrl(String, String),
    #[error("got non-JSON response; {0}:\n{1}")]
    NonJsonResponse(String, String),
}
