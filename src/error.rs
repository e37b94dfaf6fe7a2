use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

/// Returned when a guarded write finds the record already moved on.
pub const CHANGED_CONCURRENTLY: &str = "Leave request was changed by another request";

/// Failures of the leave store, kept distinct so the engine can tell a
/// missing record from a write whose pending-state guard no longer held.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("leave request {0} not found")]
    NotFound(u64),
    #[error("leave request {0} no longer matches the expected state")]
    GuardFailed(u64),
    #[error("stored leave request {0} is inconsistent: {1}")]
    Corrupt(u64, String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every way a leave request operation can be refused.
#[derive(Debug, thiserror::Error)]
pub enum LeaveError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authorization(&'static str),
    #[error("{0}")]
    InvalidState(&'static str),
    #[error("Leave request not found")]
    NotFound,
    #[error("{0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for LeaveError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => LeaveError::NotFound,
            StoreError::GuardFailed(_) => LeaveError::InvalidState(CHANGED_CONCURRENTLY),
            other => LeaveError::Store(other),
        }
    }
}

impl ResponseError for LeaveError {
    fn status_code(&self) -> StatusCode {
        match self {
            LeaveError::Validation(_) | LeaveError::InvalidState(_) => StatusCode::BAD_REQUEST,
            LeaveError::Authorization(_) => StatusCode::FORBIDDEN,
            LeaveError::NotFound => StatusCode::NOT_FOUND,
            LeaveError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            LeaveError::Store(e) => {
                tracing::error!(error = %e, "Leave store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
