use crate::{dtypes::DType, shapes::Shape};

/// Represents a number of different errors that can occur from creating tensors,
/// registering or looking up ops, and running the forward, backward and
/// batching passes.
///
/// Every variant that comes from an op invocation names the op.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Number of elements, or a shape the op requires, does not match.
    #[error("`{op}`: shape mismatch, {detail}")]
    ShapeMismatch { op: String, detail: String },

    /// Two operands cannot be broadcast together.
    #[error("`{op}`: shapes {lhs} and {rhs} are not broadcast-compatible")]
    Broadcast { op: String, lhs: Shape, rhs: Shape },

    /// An op with this name is already registered.
    #[error("op `{0}` is already registered")]
    DuplicateOp(String),

    /// No op with this name is registered.
    #[error("op `{0}` is not registered")]
    UnknownOp(String),

    /// A gradient was requested for an argument position the function does not have.
    #[error("cannot differentiate with respect to argument {position}, the function takes {num_inputs}")]
    InvalidGradInput { position: usize, num_inputs: usize },

    /// A batch axis that a batching rule or vmap cannot reconcile.
    #[error("`{op}`: unsupported batch axis, {detail}")]
    UnsupportedBatchAxis { op: String, detail: String },

    /// The op was called with the wrong number of inputs.
    #[error("`{op}` expects {expected} inputs, found {found}")]
    ArityMismatch {
        op: String,
        expected: String,
        found: usize,
    },

    /// The op does not accept this dtype.
    #[error("`{op}` does not support dtype {dtype}")]
    DTypeMismatch { op: String, dtype: DType },

    /// The op's parameters are malformed.
    #[error("`{op}`: invalid params, {detail}")]
    InvalidParams { op: String, detail: String },

    /// A [crate::trace::Var] that does not belong to this tracer, or that escaped
    /// the vmap level it was created in.
    #[error("value #{0} is not available at this point of the trace")]
    UnknownValue(usize),

    /// Writing to the device's output sink failed.
    #[error("writing to the output sink failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn shape_mismatch(op: &str, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn batch_axis(op: &str, detail: impl Into<String>) -> Self {
        Self::UnsupportedBatchAxis {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_params(op: &str, detail: impl Into<String>) -> Self {
        Self::InvalidParams {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn dtype(op: &str, dtype: DType) -> Self {
        Self::DTypeMismatch {
            op: op.to_string(),
            dtype,
        }
    }
}
