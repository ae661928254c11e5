use thiserror::Error;

/// Failures of a single clustering or vector math call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClusterError {
    #[error("Vector {id:?} has {found} components, expected {expected}.")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("Cannot compare vectors of {left} and {right} components.")]
    LengthMismatch { left: usize, right: usize },
    #[error("Cannot compute the direction of a zero-magnitude vector.")]
    DegenerateVector,
    #[error("Cannot compute the direction of a vector with NaN or infinite components.")]
    NonFiniteVector,
    #[error("Vector {id:?} has a NaN or infinite component at index {index}.")]
    NonFiniteComponent { id: String, index: usize },
    #[error("Invalid clustering parameter. {0}")]
    InvalidParameter(String),
    #[error("Identifier {0:?} appears more than once in the input set.")]
    DuplicateIdentifier(String),
}

/// Convenience alias for results of the clustering core.
pub type ClassifyResult<T> = Result<T, ClusterError>;

/// Unified application error type for the command line front end.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Errored while handling a file. {0}")]
    Io(#[from] std::io::Error),
    #[error("Error serializing json. {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Error parsing the input vectors. {0}")]
    JsonPath(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("Error while clustering. {0}")]
    Cluster(#[from] ClusterError),
    #[error("No document with id {0:?} in the input set.")]
    UnknownDocument(String),
}

/// Convenience alias for results that bubble `AppError`.
pub type AppResult<T> = Result<T, AppError>;
