//! Common error types.

use thiserror::Error;

/// Error type for building animation inputs.
///
/// The running engine never surfaces these: degenerate descriptors are
/// ignored at instantiation time. They are produced when a host builds
/// keyframe lists, timing functions or property lookups from raw values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid keyframes: {0}")]
    InvalidKeyframes(String),

    #[error("Invalid timing function: {0}")]
    InvalidTimingFunction(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn keyframes(msg: impl Into<String>) -> Self {
        Self::InvalidKeyframes(msg.into())
    }

    pub fn timing(msg: impl Into<String>) -> Self {
        Self::InvalidTimingFunction(msg.into())
    }

    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty(name.into())
    }

    pub fn descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::unknown_property("font-smooth");
        assert_eq!(err.to_string(), "Unknown property: font-smooth");

        let err = EngineError::keyframes("offset 1.5 out of range");
        assert!(err.to_string().starts_with("Invalid keyframes"));
    }
}
