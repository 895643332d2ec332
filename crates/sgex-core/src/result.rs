//! Result type alias for SGEX operations

use crate::error::SgexError;

/// Standard Result type for SGEX operations
pub type Result<T> = std::result::Result<T, SgexError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Log the error and continue with None
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn log_and_continue(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                if err.is_recoverable() {
                    tracing::warn!("Continuing after error: {}", err);
                } else {
                    tracing::error!("Fatal error: {}", err);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_continue() {
        let ok: Result<u32> = Ok(7);
        assert_eq!(ok.log_and_continue(), Some(7));
        let err: Result<u32> = Err(SgexError::internal_error("x"));
        assert_eq!(err.log_and_continue(), None);
        let remote: Result<u32> = Err(SgexError::remote_error(503, "x", "unavailable"));
        assert_eq!(remote.log_and_continue(), None);
    }
}
