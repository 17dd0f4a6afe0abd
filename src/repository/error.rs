//! Backend error conversions into [`DomainError`]

use rusqlite::ErrorCode;

use crate::domain::DomainError;

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                DomainError::Conflict(e.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => DomainError::NotFound(e.to_string()),
            _ => DomainError::Internal(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            DomainError::Internal(format!("Malformed response: {}", e))
        } else {
            DomainError::Remote(e.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(format!("Row decoding failed: {}", e))
    }
}
