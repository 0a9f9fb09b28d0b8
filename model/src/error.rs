use snafu::Snafu;

#[derive(Debug, Snafu)]
pub struct Error(InnerError);
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub(crate) enum InnerError {
    #[snafu(display("Unable to decode {} provider spec: {}", platform, source))]
    InvalidProviderSpec {
        platform: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to encode provider spec: {}", source))]
    EncodeProviderSpec { source: serde_json::Error },

    #[snafu(display("Expected provider spec to encode as a JSON object but got something else."))]
    EncodeWrongValueType {},

    #[snafu(display("No provider spec schema is registered for platform '{}'", platform))]
    UnknownPlatform { platform: String },
}
