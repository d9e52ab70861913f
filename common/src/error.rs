//! Error taxonomy for the scan engine.
//!
//! Only a malformed target specification is fatal; every per-probe failure
//! (timeout, refusal, failed lookup) is recovered locally and expressed as a
//! state in the data model rather than an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The network specification could not be turned into a target range.
    /// Raised before any probe is sent.
    #[error("invalid network range '{spec}': {reason}")]
    InvalidRange { spec: String, reason: String },
}

impl ScanError {
    pub fn invalid_range(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            spec: spec.into(),
            reason: reason.into(),
        }
    }
}
