//! The log-in page and the handler that checks a user's credentials and starts their session.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{User, get_user_by_email, invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{
        FORM_CHECKBOX_STYLE, LINK_STYLE, base, email_input, log_in_register, password_input,
        submit_button,
    },
    timezone::get_local_offset,
};

/// How long the session lasts when "remember me" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

const INVALID_CREDENTIALS_MESSAGE: &str = "Incorrect email or password.";
const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred. Please try again later.";

/// The state needed to log a user in.
#[derive(Debug, Clone)]
pub struct LoginState {
    pub cookie_key: Key,
    /// How long a session lasts without "remember me".
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The fields submitted by the log-in form.
#[derive(Clone, Deserialize)]
pub struct LogInForm {
    pub email: String,
    pub password: String,
    /// Set to any value when the checkbox is ticked, missing otherwise.
    pub remember_me: Option<String>,
    /// The page to go to after logging in.
    pub redirect_url: Option<String>,
}

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class=(FORM_CHECKBOX_STYLE);

                label for="remember_me" class="text-sm text-gray-900 dark:text-white"
                {
                    "Remember me for 7 days"
                }
            }

            (submit_button("Log in"))

            div class="flex justify-between text-sm text-gray-500 dark:text-gray-400"
            {
                a href=(endpoints::FORGOT_PASSWORD_VIEW) class=(LINK_STYLE) { "Forgot password?" }
                a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Create an account" }
            }
        }
    }
}

/// Drop redirect targets that point off-site or back at an auth page.
fn safe_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring unsafe redirect URL: {raw_url}");
    }

    redirect_url
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = safe_redirect_url(query.redirect_url.as_deref());
    let form = log_in_form("", None, redirect_url.as_deref());

    base("Log In", &[], &log_in_register("Log in to EduFinX", &form)).into_response()
}

/// Find the user registered with `email` and check their password.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] for an unknown email or a wrong password,
/// so callers cannot tell the two apart.
fn verify_credentials(email: &str, password: &str, connection: &Connection) -> Result<User, Error> {
    let user = match get_user_by_email(email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Err(Error::InvalidCredentials),
        Err(error) => return Err(error),
    };

    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => Err(Error::InvalidCredentials),
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}

/// Handler for log-in requests.
///
/// On success the auth cookie is set and the client is sent to the page they
/// originally asked for, or the dashboard. Otherwise the form is returned
/// with an error message.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let redirect_url = safe_redirect_url(form.redirect_url.as_deref());
    let render_error = |message: &str| {
        log_in_form(&form.email, Some(message), redirect_url.as_deref()).into_response()
    };

    let verified = match state.db_connection.lock() {
        Ok(connection) => verify_credentials(&form.email, &form.password, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    let user = match verified {
        Ok(user) => user,
        Err(Error::InvalidCredentials) => return render_error(INVALID_CREDENTIALS_MESSAGE),
        Err(error) => {
            tracing::error!("could not verify credentials for {}: {error}", form.email);
            return render_error(INTERNAL_ERROR_MESSAGE);
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };

    let cookie_duration = match form.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            let target = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

            (StatusCode::SEE_OTHER, HxRedirect(target), jar).into_response()
        }
        Err(error) => {
            tracing::error!("could not set auth cookie: {error}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod log_in_page_tests {
    use axum::extract::Query;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{RedirectQuery, get_log_in_page};

    #[tokio::test]
    async fn displays_form_and_links() {
        let response = get_log_in_page(Query(RedirectQuery { redirect_url: None })).await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_eq!(form.value().attr("hx-post"), Some(endpoints::LOG_IN_API));
        for selector in [
            "input[type=email]",
            "input[type=password]",
            "input[type=checkbox][name=remember_me]",
        ] {
            let count = form.select(&Selector::parse(selector).unwrap()).count();
            assert_eq!(count, 1, "want 1 element matching {selector}, got {count}");
        }
        let hrefs = form
            .select(&Selector::parse("a[href]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        assert_eq!(
            hrefs,
            [endpoints::FORGOT_PASSWORD_VIEW, endpoints::REGISTER_VIEW]
        );
    }

    #[tokio::test]
    async fn keeps_internal_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("/fees/3/pay".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let input = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .expect("missing redirect_url input");
        assert_eq!(input.value().attr("value"), Some("/fees/3/pay"));
    }

    #[tokio::test]
    async fn drops_external_redirect_url() {
        let response = get_log_in_page(Query(RedirectQuery {
            redirect_url: Some("https://example.com".to_owned()),
        }))
        .await;

        let document = parse_html_document(response).await;
        let selector = Selector::parse("input[name=redirect_url]").unwrap();
        assert_eq!(document.select(&selector).count(), 0);
    }
}


#[cfg(test)]
mod post_log_in_tests {
    use axum::{
        Form, Router,
        extract::{FromRef, State},
        http::StatusCode,
        response::Response,
        routing::post,
    };
    use axum_extra::extract::PrivateCookieJar;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        AppState, PasswordHash, ValidatedPassword,
        auth::{COOKIE_TOKEN, create_user},
        endpoints,
        test_utils::{assert_hx_redirect, parse_html_fragment},
    };

    use super::{
        INVALID_CREDENTIALS_MESSAGE, LogInForm, LoginState, REMEMBER_ME_COOKIE_DURATION,
        post_log_in,
    };

    const TEST_EMAIL: &str = "student@example.com";
    const TEST_PASSWORD: &str = "test";

    fn test_state() -> LoginState {
        let connection = Connection::open_in_memory().unwrap();
        let state = AppState::new(connection, "foobar", "Etc/UTC").unwrap();
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4).unwrap();
        create_user(TEST_EMAIL, hash, &state.db_connection.lock().unwrap()).unwrap();

        LoginState::from_ref(&state)
    }

    fn form(password: &str, redirect_url: Option<&str>) -> LogInForm {
        LogInForm {
            email: TEST_EMAIL.to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: redirect_url.map(str::to_owned),
        }
    }

    async fn log_in(state: LoginState, form: LogInForm) -> Response {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_log_in(State(state), jar, Form(form)).await
    }

    #[tokio::test]
    async fn redirects_to_dashboard_and_sets_cookie() {
        let response = log_in(test_state(), form(TEST_PASSWORD, None)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("missing set-cookie header")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with(COOKIE_TOKEN), "got {set_cookie}");
    }

    #[tokio::test]
    async fn redirects_to_requested_page() {
        let response = log_in(test_state(), form(TEST_PASSWORD, Some("/expenses"))).await;

        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
    }

    #[tokio::test]
    async fn ignores_redirect_to_auth_page() {
        let response = log_in(
            test_state(),
            form(TEST_PASSWORD, Some(endpoints::REGISTER_VIEW)),
        )
        .await;

        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn wrong_password_rerenders_form_with_message() {
        let response = log_in(test_state(), form("hunter2", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("set-cookie").is_none());
        let fragment = parse_html_fragment(response).await;
        let text = fragment.root_element().text().collect::<String>();
        assert!(text.contains(INVALID_CREDENTIALS_MESSAGE), "got {text}");
    }

    #[tokio::test]
    async fn remember_me_lasts_a_week() {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(test_state());
        let server = TestServer::new(app);

        let response = server
            .post(endpoints::LOG_IN_API)
            .form(&[
                ("email", TEST_EMAIL),
                ("password", TEST_PASSWORD),
                ("remember_me", "on"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let expires = response
            .cookie(COOKIE_TOKEN)
            .expires_datetime()
            .expect("cookie should have an expiry");
        let want = OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION;
        assert!((expires - want).abs() < Duration::seconds(2));
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = Router::new()
            .route(endpoints::LOG_IN_API, post(post_log_in))
            .with_state(test_state());
        let server = TestServer::new(app);

        server
            .post(endpoints::LOG_IN_API)
            .content_type("application/x-www-form-urlencoded")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }
}
