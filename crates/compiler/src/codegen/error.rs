//! Lowering failure types.
//!
//! Semantic problems in the input (undefined names, duplicate
//! declarations, bad subscripts) are stderr diagnostics: the pass skips
//! the offending statement and keeps going, so they never surface here.
//! What remains are the two ways the engine itself refuses: lowering a
//! second unit without a reset, and a write failure on the in-memory IR
//! streams, wrapped so every emission site can use `?`.

use std::fmt;

#[derive(Debug)]
pub enum CodeGenError {
    /// The engine already lowered a unit; its name counters and scopes
    /// are stale until `reset`
    EngineConsumed,
    /// Writing into an IR stream failed
    Format(fmt::Error),
}

impl fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeGenError::EngineConsumed => write!(
                f,
                "lowering engine already used; reset() it before compiling another unit"
            ),
            CodeGenError::Format(e) => write!(f, "failed to write IR stream: {}", e),
        }
    }
}

impl std::error::Error for CodeGenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodeGenError::EngineConsumed => None,
            CodeGenError::Format(e) => Some(e),
        }
    }
}

impl From<fmt::Error> for CodeGenError {
    fn from(e: fmt::Error) -> Self {
        CodeGenError::Format(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumed_message_names_the_remedy() {
        assert!(CodeGenError::EngineConsumed.to_string().contains("reset()"));
    }

    #[test]
    fn test_format_error_keeps_its_source() {
        use std::error::Error as _;
        let err = CodeGenError::from(fmt::Error);
        assert!(err.source().is_some());
        assert!(CodeGenError::EngineConsumed.source().is_none());
    }
}
