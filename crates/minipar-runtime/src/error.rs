//! Runtime error kind.

/// Error raised during execution: undefined variable, conversion failure
/// inside an intrinsic, socket failure. Terminates execution; the executor
/// performs no retries or partial-failure compensation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("runtime error: {message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
