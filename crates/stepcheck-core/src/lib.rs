//! stepcheck-core: test-suite model and response matching
//!
//! This crate provides the test-file model, resolution of fields that name
//! sibling files, the structural JSON comparison used to check responses,
//! and the contract a deployment must satisfy to receive test requests.

pub mod compare;
pub mod config;
pub mod reference;
pub mod schema;
pub mod suite;
pub mod summary;
pub mod target;

pub use compare::{Mismatch, MismatchKind, compare};
pub use config::{Config, ConfigError, Endpoint};
pub use reference::{RefOrInline, ResolveError};
pub use suite::{Defaults, ExpectedResponse, Request, Step, SuiteError, TestSuite};
pub use summary::RunSummary;
pub use target::{HttpRequest, HttpResponse, Service, Target, TargetError};
