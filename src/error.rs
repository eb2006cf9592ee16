//! Error types for artifact loading, input validation, encoding and scoring

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load the model artifact bundle. Always fatal at startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent artifact: {0}")]
    Invalid(String),
}

/// Failure while building the feature vector for one prediction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("feature schema has no column `{column}` for a required numeric field")]
    SchemaMismatch { column: String },
}

/// Failure while scoring an encoded vector.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictError {
    #[error("classifier expects {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Rejected customer form values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} = `{value}` is not offered when {depends_on} = `{parent}`")]
    InconsistentOptions {
        field: &'static str,
        value: &'static str,
        depends_on: &'static str,
        parent: &'static str,
    },

    #[error("unknown value `{value}` for {field}, expected one of: {expected}")]
    UnknownValue {
        field: &'static str,
        value: String,
        expected: String,
    },
}
