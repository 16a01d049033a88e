//! The registration page for creating an account.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    app_state::create_cookie_key,
    auth::{DEFAULT_COOKIE_DURATION, create_user, parse_email, set_auth_cookie},
    endpoints,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, base, email_input,
        log_in_register, password_input, submit_button,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
pub(crate) const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

pub fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length);

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }

    }
}

/// Error messages to show next to each field of the registration form.
#[derive(Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, password: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationErrors::default());
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

const DUPLICATE_EMAIL_ERROR_MSG: &str =
    "An account with this email already exists, log in with your existing password.";

/// Create an account, log the new user in and send them to the profile page
/// to fill in their student record.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match parse_email(&user_data.email) {
        Ok(email) => email,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &user_data.email,
                &user_data.password,
                RegistrationErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return registration_form(
                &email,
                &user_data.password,
                RegistrationErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &email,
            &user_data.password,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("Could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        create_user(&email, password_hash, &connection)
    };

    match user {
        Ok(user) => match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
            Ok(jar) => (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
                jar,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("An error occurred while setting the auth cookie: {e}");

                get_internal_server_error_redirect()
            }
        },
        Err(Error::DuplicateEmail) => registration_form(
            &email,
            &user_data.password,
            RegistrationErrors {
                email: Some(DUPLICATE_EMAIL_ERROR_MSG),
                ..Default::default()
            },
        )
        .into_response(),
        Err(e) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {e}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let h1_selector = scraper::Selector::parse("h1").unwrap();
        let titles = document.select(&h1_selector).collect::<Vec<_>>();
        assert_eq!(titles.len(), 1, "want 1 h1, got {}", titles.len());
        let title_text = titles.first().unwrap().text().collect::<String>();
        assert_eq!(title_text.trim(), "Create Account");

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::USERS));

        for selector in [
            "input[type=email]#email",
            "input[type=password]#password",
            "input[type=password]#confirm-password",
        ] {
            let input_selector = scraper::Selector::parse(selector).unwrap();
            let count = form.select(&input_selector).count();
            assert_eq!(count, 1, "want 1 element matching {selector:?}, got {count}");
        }

        let log_in_link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&log_in_link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(
            links.first().unwrap().value().attr("href"),
            Some(endpoints::LOG_IN_VIEW)
        );
    }
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, Router, extract::State, http::StatusCode, routing::post};
    use axum_extra::extract::PrivateCookieJar;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        PasswordHash,
        auth::{COOKIE_TOKEN, create_user, create_user_table, get_user_by_email},
        endpoints,
        test_utils::{assert_hx_redirect, parse_html_fragment},
    };

    use super::{RegisterForm, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "iamtestingwhethericancreateanewuser";

    fn get_test_app_config() -> RegistrationState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegistrationState::new("42", "Etc/UTC", Arc::new(Mutex::new(connection)))
    }

    fn register_form(email: &str, password: &str, confirm_password: &str) -> RegisterForm {
        RegisterForm {
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm_password.to_owned(),
        }
    }

    async fn assert_error_message(response: axum::response::Response, want_text: &str) {
        assert_eq!(response.status(), StatusCode::OK);
        let fragment = parse_html_fragment(response).await;
        let p_selector = scraper::Selector::parse("p.text-red-500").unwrap();
        let paragraphs = fragment.select(&p_selector).collect::<Vec<_>>();
        assert_eq!(paragraphs.len(), 1, "want 1 p, got {}", paragraphs.len());
        let paragraph_text = paragraphs
            .first()
            .unwrap()
            .text()
            .collect::<String>()
            .to_lowercase();
        assert!(
            paragraph_text.contains(want_text),
            "'{paragraph_text}' does not contain the text '{want_text}'"
        );
    }

    #[tokio::test]
    async fn create_user_succeeds() {
        let state = get_test_app_config();
        let app = Router::new()
            .route(endpoints::USERS, post(register_user))
            .with_state(state.clone());
        let server = TestServer::new(app);

        let response = server
            .post(endpoints::USERS)
            .form(&register_form(
                "New.Student@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            ))
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("hx-redirect"), endpoints::PROFILE_VIEW);
        response.cookie(COOKIE_TOKEN);
        let connection = state.db_connection.lock().unwrap();
        assert!(get_user_by_email("new.student@example.com", &connection).is_ok());
    }

    #[tokio::test]
    async fn create_user_fails_with_duplicate_email() {
        let state = get_test_app_config();
        create_user(
            "student@example.com",
            PasswordHash::new_unchecked("foobarbazquxgobbledygook"),
            &state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user");

        let response = register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key),
            Form(register_form(
                "student@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_error_message(response, "already exists").await;
    }

    #[tokio::test]
    async fn create_user_fails_with_invalid_email() {
        let state = get_test_app_config();

        let response = register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key),
            Form(register_form("not-an-email", STRONG_PASSWORD, STRONG_PASSWORD)),
        )
        .await;

        assert_error_message(response, "not a valid email address").await;
    }

    #[tokio::test]
    async fn create_user_fails_when_password_is_weak() {
        let state = get_test_app_config();

        let response = register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key),
            Form(register_form("student@example.com", "foo", "foo")),
        )
        .await;

        assert_error_message(response, "password is too weak").await;
    }

    #[tokio::test]
    async fn create_user_fails_when_passwords_do_not_match() {
        let state = get_test_app_config();

        let response = register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key),
            Form(register_form(
                "student@example.com",
                STRONG_PASSWORD,
                "thisisadifferentpassword",
            )),
        )
        .await;

        assert_error_message(response, "passwords do not match").await;
    }

    #[tokio::test]
    async fn successful_registration_redirects_to_profile() {
        let state = get_test_app_config();

        let response = register_user(
            State(state.clone()),
            PrivateCookieJar::new(state.cookie_key),
            Form(register_form(
                "student@example.com",
                STRONG_PASSWORD,
                STRONG_PASSWORD,
            )),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PROFILE_VIEW);
    }
}
