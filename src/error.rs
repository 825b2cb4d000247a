//! Error type shared by the factory and subscription operations.
//!
//! Only construction-time contract violations are reported. Ticking has no
//! failure mode: it works on state that was validated when it was created.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MixerError {
    /// A construction or subscription parameter is missing or malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MixerError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        MixerError::InvalidArgument(msg.into())
    }
}
