use thiserror::Error;

/// Failures specific to resolving task parameters. I/O and parse failures
/// travel as `anyhow` errors with file context instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("Unknown temporal type: {0:?} (expected \"temporal\" or \"static\")")]
    UnknownTemporalType(String),

    #[error("component {entry:?} has no {field:?} value")]
    MissingField { entry: String, field: &'static str },

    #[error("component key {0:?} does not start with a word character")]
    InvalidComponentKey(String),

    #[error("optional config name must not be empty")]
    EmptyOptionalConfig,
}
