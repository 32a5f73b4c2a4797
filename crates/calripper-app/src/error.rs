use thiserror::Error;

/// Application-level errors (binary edge)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] calripper_service::error::ServiceError),

    #[error(transparent)]
    RecurrenceError(#[from] calripper_service::error::RecurrenceError),

    #[error(transparent)]
    CoreError(#[from] calripper_core::error::CoreError),

    #[error("Output error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    ManifestError(#[from] serde_json::Error),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
