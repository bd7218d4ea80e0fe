use backend_domain::IdentityError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage failure during {operation}")]
    Storage {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Wraps a store failure for `operation`, logging it with that context.
    pub fn storage(operation: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| {
            error!(operation, error = %source, "storage operation failed");
            AppError::Storage { operation, source }
        }
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        AppError::Validation(value.to_string())
    }
}
