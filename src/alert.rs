//! Alert system for displaying success and error messages to users.
//!
//! Alerts are swapped out-of-band into the `#alert-container` element that
//! [base](crate::html::base) renders on every page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to show at the bottom of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with details explaining the problem.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::Success { message, details } => (false, message, details),
            Alert::SuccessSimple { message } => (false, message, String::new()),
            Alert::Error { message, details } => (true, message, details),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 rounded-lg border text-red-800 border-red-300 \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 rounded-lg border text-green-800 border-green-300 \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(container_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="font-medium" { (message) }

                        @if !details.is_empty() {
                            p class="mt-1 text-sm" { (details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-3 text-sm font-semibold"
                        aria-label="Close"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_fragment};

    use super::Alert;

    #[tokio::test]
    async fn renders_error_alert_for_out_of_band_swap() {
        let response = Alert::Error {
            message: "Could not delete fee".to_owned(),
            details: "The fee could not be found.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let container = html
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .expect("alert container missing");
        assert_eq!(container.value().attr("hx-swap-oob"), Some("true"));
        let text = container.text().collect::<String>();
        assert!(text.contains("Could not delete fee"));
        assert!(text.contains("The fee could not be found."));
    }

    #[tokio::test]
    async fn simple_success_alert_has_no_details() {
        let response = Alert::SuccessSimple {
            message: "Fee deleted successfully".to_owned(),
        }
        .into_response();

        let html = parse_html_fragment(response).await;
        let paragraphs = html.select(&Selector::parse("p").unwrap()).count();
        assert_eq!(paragraphs, 1);
    }
}
