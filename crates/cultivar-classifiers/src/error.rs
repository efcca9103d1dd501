use std::error::Error as StdError;
use std::fmt;

/// Error taxonomy for the pipeline.
///
/// Fit-time errors (`Schema`, `DegenerateFeature`, `UnknownLabel`, `Shape`)
/// are fatal to a training run: no partial model is published. Inference-time
/// errors (`NotFitted`, `InvalidInput`) are per-request and must stay
/// distinguishable by the caller.
#[derive(Debug)]
pub enum Error {
    /// Wrong or missing columns/fields in the input table.
    Schema(String),
    /// A feature column had zero variance during scaler fit.
    DegenerateFeature { column: usize },
    /// A label outside the fitted vocabulary.
    UnknownLabel(String),
    /// Inference requested before a trained model was installed.
    NotFitted,
    /// Malformed, non-numeric or out-of-range request field.
    InvalidInput(String),
    /// Internal dimension or configuration mismatch: a caller-side
    /// programming error, never a bad serving request.
    Shape(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Schema(msg) => write!(f, "schema error: {}", msg),
            Error::DegenerateFeature { column } => write!(
                f,
                "feature column {} has zero variance; cannot standardize",
                column
            ),
            Error::UnknownLabel(label) => {
                write!(f, "label '{}' is not in the fitted vocabulary", label)
            }
            Error::NotFitted => write!(f, "model is not fitted yet"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Error::Shape(msg) => write!(f, "shape error: {}", msg),
        }
    }
}

impl StdError for Error {}

pub type Result<T> = std::result::Result<T, Error>;
