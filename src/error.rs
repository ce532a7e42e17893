//! Defines the app level error type and conversions to rendered HTML pages, alerts and JSON.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    alert::Alert,
    error_page::{InternalServerErrorPage, NotFoundPage},
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The transaction type in a path or payload is not one of the four
    /// categories.
    #[error("invalid transaction type \"{0}\"")]
    InvalidCategory(String),

    /// A JSON payload could not be decoded or had a field with a bad value.
    ///
    /// The string describes the problem and is shown to API clients.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A form was submitted without its required fields.
    ///
    /// The string is the message to show to the user.
    #[error("{0}")]
    MissingFields(String),

    /// A date string was not in the `YYYY-MM-DD` format.
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID or position) are correct and that the record has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The CSV export could not be written.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// A database file could not be opened, moved aside or recreated.
    #[error("could not recover the database file: {0}")]
    DatabaseRecoveryError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundPage::default().into_response(),
            Error::InvalidCategory(category) => NotFoundPage {
                description: &format!("There is no \"{category}\" ledger."),
            }
            .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerErrorPage {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerErrorPage::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerErrorPage::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::MissingFields(message) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message,
                    details: String::new(),
                },
            ),
            Error::InvalidDate(date) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid date".to_owned(),
                    details: format!("\"{date}\" is not a date, use the format YYYY-MM-DD."),
                },
            ),
            Error::InvalidPayload(details) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid form data".to_owned(),
                    details,
                },
            ),
            Error::InvalidCategory(_) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid transaction type.".to_owned(),
                    details: String::new(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Transaction not found.".to_owned(),
                    details: "Try refreshing the page to see if the transaction has already \
                        been deleted."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Convert the error into a JSON response of the form `{"detail": "..."}`.
    pub fn into_json_response(self) -> Response {
        let (status_code, detail) = match self {
            Error::InvalidCategory(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid transaction type.".to_owned(),
            ),
            Error::NotFound => (StatusCode::NOT_FOUND, "Transaction not found.".to_owned()),
            Error::InvalidPayload(details) => (StatusCode::UNPROCESSABLE_ENTITY, details),
            Error::MissingFields(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            error @ Error::InvalidDate(_) => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_owned(),
                )
            }
        };

        (status_code, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{Error, test_utils::response_json};

    #[tokio::test]
    async fn invalid_category_is_bad_request_in_json() {
        let response = Error::InvalidCategory("refunds".to_owned()).into_json_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["detail"], "Invalid transaction type.");
    }

    #[tokio::test]
    async fn not_found_is_404_in_json() {
        let response = Error::NotFound.into_json_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["detail"], "Transaction not found.");
    }

    #[tokio::test]
    async fn sql_errors_are_not_leaked_to_clients() {
        let response =
            Error::SqlError(rusqlite::Error::InvalidQuery).into_json_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = response_json(response).await;
        assert_eq!(body["detail"], "Internal server error.");
    }

    #[test]
    fn missing_fields_alert_is_bad_request() {
        let response =
            Error::MissingFields("Please fill all required fields.".to_owned()).into_alert_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
