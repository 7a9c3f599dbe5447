//! Error types for constructing and applying transformations.

use thiserror::Error;

/// Errors raised while building or applying a transformation.
///
/// None of these are transient: they describe bad input and are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Malformed construction parameters.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A batch or a neighbouring transformation has the wrong number of dimensions.
    #[error("dimension mismatch ({context}): expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    /// An inverse was needed but the transformation has none.
    ///
    /// `element` is the position of the offending transformation
    /// when it was reached as part of a [Sequence](crate::Sequence).
    #[error("transformation '{name}'{} is not invertible", element_suffix(.element))]
    NonInvertible {
        name: String,
        element: Option<usize>,
    },
}

impl TransformError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn dimension(expected: usize, actual: usize, context: impl Into<String>) -> Self {
        Self::DimensionMismatch {
            expected,
            actual,
            context: context.into(),
        }
    }

    pub fn non_invertible(name: impl Into<String>) -> Self {
        Self::NonInvertible {
            name: name.into(),
            element: None,
        }
    }

    /// Attribute a failure to the sequence element at `idx`,
    /// unless it has already been attributed.
    pub(crate) fn in_element(self, idx: usize) -> Self {
        match self {
            Self::NonInvertible {
                name,
                element: None,
            } => Self::NonInvertible {
                name,
                element: Some(idx),
            },
            other => other,
        }
    }
}

fn element_suffix(element: &Option<usize>) -> String {
    element
        .map(|e| format!(" (element {e})"))
        .unwrap_or_default()
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
