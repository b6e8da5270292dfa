use thiserror::Error;

/// Request-level errors.
///
/// Any of these returned from an orchestration entry point means nothing was
/// attempted. Per-item failures during dispatch never surface here; they are
/// reported as [`crate::domain::transfer::TransferFailure`] inside the summary.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No recipients available for owner {0}")]
    NoRecipients(String),
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Transfer failed: {0}")]
    TransferFailed(String),
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TransferError>;
