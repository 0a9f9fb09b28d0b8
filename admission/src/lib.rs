/*!

This library implements the admission engine for Machine objects: platform-dispatched validation
and defaulting, cross-platform policy, and verdict assembly. For each create or update the engine
decodes the machine's provider spec, runs the platform's handler bundle, layers on the policies
that hold everywhere (cluster-ID labeling, lifecycle-hook immutability under deletion), and
returns an allow/deny verdict with warnings and, when defaulting fired, a mutation patch.

The webhook HTTPS transport that feeds the engine is the host's concern; so are the manager
bootstrap and TLS.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use context::{AdmissionContext, EngineConfig, Operation};
pub use engine::{AdmissionEngine, AdmissionRequest, AdmissionResponse, AdmissionVerdict};
pub use error::{Error, Result};
pub use field::{join_errors, FieldError, FieldErrorKind, FieldPath};
pub use registry::Registry;
pub use rules::RuleReport;
pub use secrets::{InMemorySecretReader, KubeSecretReader, SecretReader};

mod context;
mod engine;
mod error;
mod field;
pub mod handlers;
mod policy;
mod registry;
mod rules;
mod secrets;
