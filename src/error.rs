use thiserror::Error;

/// Crate-wide error type.
///
/// Every failure is raised at the point of detection and is not retried
/// internally; callers decide whether to restart a whole run. The one
/// deliberate non-error is metric evaluation over an empty dataset, which
/// yields `0.0` instead.
#[derive(Debug, Error)]
pub enum NnError {
    /// Vector/weight length mismatch at a boundary: forward-pass input arity,
    /// weight import shape, error-vector length.
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// Invalid layer configuration: zero node count, missing input layer,
    /// propagation error function invoked at the output layer.
    #[error("invalid topology: {0}")]
    Topology(String),

    /// A required pluggable component is not set (learning rate, labeler).
    #[error("missing configuration: {0}")]
    Configuration(String),

    /// Unregistered or wrong-prefix strategy name.
    #[error("cannot resolve strategy name: {0}")]
    NameResolution(String),

    /// Inserting an identifier that already exists in a collection.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Numeric parameter out of its valid range.
    #[error("invalid parameter: {0}")]
    Value(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NnError>;
