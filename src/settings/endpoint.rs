//! Defines the endpoints for saving preferences and requesting account deletion.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use maud::html;

use crate::{
    Error, UserID,
    alert::Alert,
    capitalise_first_char,
    settings::{
        page::{SettingsForm, SettingsState, settings_form, theme_cookie},
        preferences::{Preferences, get_preferences, save_preferences},
    },
};

/// A route handler for saving the settings form.
///
/// On success the theme cookie is updated and the form is re-rendered with a success alert.
pub async fn save_settings_endpoint(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    jar: CookieJar,
    Form(form): Form<SettingsForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let preferences = match Preferences::from_form(&form) {
        Ok(preferences) => preferences,
        Err(error) => {
            let message = capitalise_first_char(&error.to_string());
            // Show the previously saved values next to the error.
            let saved = get_preferences(user_id, &connection).unwrap_or_default();
            return settings_form(&saved, Some(&message)).into_response();
        }
    };

    if let Err(error) = save_preferences(user_id, &preferences, &connection) {
        tracing::error!("could not save preferences for {user_id}: {error}");
        return error.into_alert_response();
    }

    let alert = Alert::Success {
        message: "Settings Saved".to_owned(),
        details: "Your preferences have been saved successfully.".to_owned(),
    };

    (
        jar.add(theme_cookie(preferences.theme)),
        html! {
            (settings_form(&preferences, None))
            (alert.into_html())
        },
    )
        .into_response()
}

/// A route handler for the delete account button.
///
/// Accounts are removed by the server operator, so this only explains how to
/// get the account deleted.
pub async fn delete_account_endpoint() -> Response {
    (
        StatusCode::OK,
        Alert::Error {
            message: "Account Deletion".to_owned(),
            details: "Ask the administrator of this server to delete your account.".to_owned(),
        },
    )
        .into_response()
}

#[cfg(test)]
mod save_settings_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::{StatusCode, header::SET_COOKIE}};
    use axum_extra::extract::CookieJar;
    use rusqlite::Connection;

    use crate::{
        currency::Currency,
        db::initialize,
        settings::preferences::{Preferences, Theme, get_preferences},
        test_utils::{assert_form_error_message, insert_test_user, must_get_form, parse_html_fragment},
    };

    use super::{SettingsForm, SettingsState, delete_account_endpoint, save_settings_endpoint};

    fn get_test_state() -> SettingsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SettingsState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    fn form(theme: &str, currency: &str) -> SettingsForm {
        SettingsForm {
            theme: theme.to_owned(),
            language: "en".to_owned(),
            currency: currency.to_owned(),
            profile_visibility: "public".to_owned(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn saves_preferences_and_sets_theme_cookie() {
        let state = get_test_state();
        let user_id = insert_test_user(&state.db_connection.lock().unwrap(), "asha@example.com");

        let response = save_settings_endpoint(
            State(state.clone()),
            Extension(user_id),
            CookieJar::new(),
            Form(form("dark", "GBP")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("want theme cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("theme=dark"), "got {set_cookie}");

        let saved = get_preferences(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(saved.theme, Theme::Dark);
        assert_eq!(saved.currency, Currency::Gbp);
        assert!(!saved.notifications.email);
    }

    #[tokio::test]
    async fn invalid_theme_is_not_saved() {
        let state = get_test_state();
        let user_id = insert_test_user(&state.db_connection.lock().unwrap(), "asha@example.com");

        let response = save_settings_endpoint(
            State(state.clone()),
            Extension(user_id),
            CookieJar::new(),
            Form(form("neon", "INR")),
        )
        .await;

        assert!(response.headers().get(SET_COOKIE).is_none());
        let html = parse_html_fragment(response).await;
        assert_form_error_message(&must_get_form(&html), "\"neon\" is not a valid theme");
        assert_eq!(
            get_preferences(user_id, &state.db_connection.lock().unwrap()),
            Ok(Preferences::default())
        );
    }

    #[tokio::test]
    async fn delete_account_explains_how_to_delete() {
        let response = delete_account_endpoint().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("administrator"), "got {text}");
    }
}
