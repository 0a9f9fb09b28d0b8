use snafu::Snafu;

/// The `Result` type returned by the admission engine's fallible internals.
pub type Result<T> = std::result::Result<T, Error>;

/// The public error type returned by the admission engine. These are internal faults, not
/// admission denials: a fault is translated to a denied response at the boundary.
#[derive(Debug, Snafu)]
pub struct Error(InnerError);

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum InnerError {
    #[snafu(display("Unable to get secret '{}/{}': {}", namespace, name, source))]
    SecretLookup {
        namespace: String,
        name: String,
        source: kube::Error,
    },

    #[snafu(display("Admission request was cancelled during secret lookup"))]
    Cancelled {},

    #[snafu(display("{}", source))]
    Codec { source: machine_model::Error },

    #[snafu(display("Unable to serialize machine for patch generation: {}", source))]
    PatchSerialization { source: serde_json::Error },
}
