//! Full page responses for the 404 and 500 cases.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::Markup;

use crate::html::error_view;

/// The page shown when a route or record does not exist.
pub struct NotFoundPage<'a> {
    pub description: &'a str,
}

impl Default for NotFoundPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, we couldn't find that page.",
        }
    }
}

impl NotFoundPage<'_> {
    pub fn into_html(self) -> Markup {
        error_view(
            "Not Found",
            "404",
            self.description,
            "Check the address or go back to the ledgers.",
        )
    }
}

impl IntoResponse for NotFoundPage<'_> {
    fn into_response(self) -> Response {
        (StatusCode::NOT_FOUND, self.into_html()).into_response()
    }
}

/// The page shown when the server could not finish a request.
pub struct InternalServerErrorPage<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerErrorPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerErrorPage<'_> {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_view("Internal Server Error", "500", self.description, self.fix),
        )
            .into_response()
    }
}

/// Fallback handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    NotFoundPage::default().into_response()
}

/// The page htmx redirects to when a request fails without an alert.
pub async fn get_internal_server_error_page() -> Response {
    InternalServerErrorPage::default().into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        error_page::{InternalServerErrorPage, get_404_not_found},
        test_utils::{assert_valid_html, parse_html_document},
    };

    #[tokio::test]
    async fn fallback_renders_404_page() {
        let response = get_404_not_found().await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
    }

    #[tokio::test]
    async fn internal_error_page_shows_fix() {
        let response = InternalServerErrorPage {
            description: "Storage is unavailable",
            fix: "Restart the server",
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("Restart the server"), "got page text {text:?}");
    }
}
