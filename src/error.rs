//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A row of the source CSV could not be coerced into a transaction.
    ///
    /// `row` is the 1-based position of the data row in the file, not
    /// counting the header, or 0 when the header row itself is at fault.
    /// `field` names the canonical field that failed.
    #[error("row {row}: invalid {field}: {reason}")]
    Validation {
        /// The 1-based data row number, 0 for the header row.
        row: usize,
        /// The canonical name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The source CSV file is missing or could not be read.
    #[error("could not read the source file \"{path}\": {reason}")]
    SourceUnavailable {
        /// The path that was given for the source file.
        path: String,
        /// The underlying I/O error as a string.
        reason: String,
    },

    /// A pagination parameter was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A write to the store violated a table constraint, e.g. a duplicate ID.
    #[error("a database constraint was violated: {0}")]
    ConstraintViolation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: rusqlite::ErrorCode::ConstraintViolation,
                    ..
                },
                description,
            ) => Error::ConstraintViolation(
                description.unwrap_or_else(|| "constraint failed".to_owned()),
            ),
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidArgument(_) | Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::SourceUnavailable { .. }
            | Error::ConstraintViolation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status.is_server_error() {
            // Store internals are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
