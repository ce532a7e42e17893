//! Alerts for showing why an htmx request failed.
//!
//! Alerts are returned by htmx endpoints and swapped into the
//! `#alert-container` element that every page includes.

use maud::{Markup, html};

/// An alert message with optional details.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// The operation failed.
    Error {
        /// The headline.
        message: String,
        /// Extra text under the headline, may be empty.
        details: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Error { message, details } => (
                "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
                dark:bg-gray-800 dark:text-red-400 border border-red-300 \
                dark:border-red-800",
                message,
                details,
            ),
        };

        html! {
            div
                class=(container_style)
                role="alert"
                hx-on:click="this.remove()"
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p { (details) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn error_alert_renders_message_and_details() {
        let html = Alert::Error {
            message: "Could not save".to_owned(),
            details: "Try again.".to_owned(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let paragraphs = fragment
            .select(&Selector::parse("div[role=alert] p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(paragraphs, vec!["Could not save", "Try again."]);
    }

    #[test]
    fn empty_details_are_omitted() {
        let html = Alert::Error {
            message: "Please fill all required fields.".to_owned(),
            details: String::new(),
        }
        .into_html()
        .into_string();

        let fragment = Html::parse_fragment(&html);
        let count = fragment.select(&Selector::parse("p").unwrap()).count();
        assert_eq!(count, 1);
    }
}
