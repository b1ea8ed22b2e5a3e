pub mod client;
pub mod dto;
pub mod retry;

pub use client::{CrazySupplierClient, SupplierOutcome, SupplierSettings};
pub use retry::RetryPolicy;

/// Why a single supplier attempt failed. Internal to this crate's retry loop;
/// never handed to callers of [`CrazySupplierClient`].
#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    #[error("supplier rejected the request: status {0}")]
    Client(reqwest::StatusCode),
    #[error("supplier server error: status {0}")]
    Server(reqwest::StatusCode),
    #[error("unexpected supplier status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("supplier request timed out: {0}")]
    Timeout(String),
    #[error("supplier transport failure: {0}")]
    Transport(String),
    #[error("invalid supplier payload: {0}")]
    Decode(String),
}

/// How the retry loop treats a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultClass {
    /// 4xx: the request itself is wrong, repeating it is pointless.
    ClientFault,
    /// 5xx or network trouble: worth another attempt.
    Retryable,
    /// Anything else: give up without retrying.
    Unexpected,
}

impl SupplierError {
    pub fn class(&self) -> FaultClass {
        match self {
            SupplierError::Client(_) => FaultClass::ClientFault,
            SupplierError::Server(_) | SupplierError::Timeout(_) | SupplierError::Transport(_) => {
                FaultClass::Retryable
            }
            SupplierError::UnexpectedStatus(_) | SupplierError::Decode(_) => FaultClass::Unexpected,
        }
    }
}
