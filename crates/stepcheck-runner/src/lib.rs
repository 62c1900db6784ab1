//! stepcheck-runner: test execution against a live deployment

pub mod events;
pub mod http;
pub mod runner;
pub mod step;

pub use events::{NoopObserver, RunObserver};
pub use http::HttpTarget;
pub use runner::{RunError, SuiteRunner, discover};
pub use step::{StepError, StepFailure, StepOutcome, SuiteContext};
