//! EduFinX is a web app for managing student fees, expenses and budgets.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use time::Date;
use tokio::signal;

mod aggregation;
mod alert;
mod app_state;
mod auth;
mod budget;
mod cache;
mod category;
mod currency;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod expense;
mod export;
mod fee;
mod form;
mod html;
mod internal_server_error;
mod landing;
mod logging;
mod money;
mod navigation;
mod not_found;
mod payment_method;
mod profile;
mod routing;
mod settings;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, get_user_by_email, parse_email, update_password,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;

use crate::{
    alert::Alert,
    budget::BudgetId,
    internal_server_error::{InternalServerErrorPage, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// A required form field was left empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The string could not be parsed as a monetary amount.
    #[error("\"{0}\" is not a valid amount, enter a number with at most two decimal places")]
    InvalidAmount(String),

    /// Amounts and payments must be greater than zero.
    #[error("the amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amounts may not be greater than the largest amount the app accepts.
    #[error("the amount must be at most {max}, got {0}", max = money::MAX_AMOUNT)]
    AmountTooLarge(Decimal),

    /// A sum or ratio of amounts is too large to represent exactly.
    #[error("the total is too large to calculate")]
    AmountOverflow,

    /// The string could not be parsed as a calendar date.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The end date of a date range came before its start date.
    #[error("the end date {end} is before the start date {start}")]
    InvalidDateRange {
        /// The first day of the range.
        start: Date,
        /// The last day of the range.
        end: Date,
    },

    /// The category ID does not refer to a valid category.
    #[error("the category does not exist")]
    InvalidCategory,

    /// The string does not name a supported payment method.
    #[error("\"{0}\" is not a supported payment method")]
    InvalidPaymentMethod(String),

    /// The string does not name a supported budget period.
    #[error("\"{0}\" is not a supported budget period")]
    InvalidBudgetPeriod(String),

    /// A settings field was given a value that is not one of its options.
    #[error("\"{value}\" is not a valid {field}")]
    InvalidPreference {
        /// The name of the setting.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Fees were managed before the user created their student record.
    #[error("a student record is required to manage fees")]
    StudentRecordMissing,

    /// A stored budget has a limit of zero, so its consumption cannot be computed.
    #[error("budget {0} has a limit of zero")]
    ZeroBudgetAmount(BudgetId),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing a CSV export.
    #[error("could not write the CSV export: {0}")]
    ExportError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a fee that does not exist
    #[error("tried to update a fee that is not in the database")]
    UpdateMissingFee,

    /// Tried to delete a fee that does not exist
    #[error("tried to delete a fee that is not in the database")]
    DeleteMissingFee,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,
}

impl Error {
    /// Whether the error was caused by invalid user input that should be
    /// shown next to the form that caused it.
    pub(crate) fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_)
                | Error::InvalidAmount(_)
                | Error::NonPositiveAmount(_)
                | Error::AmountTooLarge(_)
                | Error::AmountOverflow
                | Error::InvalidDate(_)
                | Error::InvalidDateRange { .. }
                | Error::InvalidCategory
                | Error::InvalidPaymentMethod(_)
                | Error::InvalidBudgetPeriod(_)
                | Error::InvalidPreference { .. }
                | Error::InvalidEmail(_)
        )
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::InvalidCategory
            }
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
            Error::NotFound => get_404_not_found_response(),
            Error::InvalidTimezoneError(timezone) => {
                render_internal_server_error(InternalServerErrorPage {
                    description: "Invalid Timezone Settings",
                    fix: &format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                })
            }
            Error::DatabaseLockError => render_internal_server_error(Default::default()),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(Default::default())
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            )
                .into_response(),
            Error::StudentRecordMissing => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Student Record Required".to_owned(),
                    details: "Please complete your student profile before managing fees."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::UpdateMissingFee => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not record payment".to_owned(),
                    details: "The fee could not be found.".to_owned(),
                },
            )
                .into_response(),
            Error::DeleteMissingFee => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete fee".to_owned(),
                    details: "The fee could not be found. \
                    Try refreshing the page to see if the fee has already been deleted."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not update expense".to_owned(),
                    details: "The expense could not be found.".to_owned(),
                },
            )
                .into_response(),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete expense".to_owned(),
                    details: "The expense could not be found. \
                    Try refreshing the page to see if the expense has already been deleted."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not delete budget".to_owned(),
                    details: "The budget could not be found. \
                    Try refreshing the page to see if the budget has already been deleted."
                        .to_owned(),
                },
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Not found".to_owned(),
                    details: "The record could not be found. Try refreshing the page.".to_owned(),
                },
            )
                .into_response(),
            error if error.is_validation_error() => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid input".to_owned(),
                    details: capitalise_first_char(&error.to_string()),
                },
            )
                .into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details: "An unexpected error occurred, check the server logs for more details."
                        .to_owned(),
                },
            )
                .into_response(),
        }
    }
}

/// Capitalise the first character of `string` for display in messages.
pub(crate) fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
