//! Middleware that guards pages and API routes behind a valid session.
//!
//! A request with a valid session cookie has its [UserID] inserted as a request
//! extension and the session is extended by the configured cookie duration.
//! Any other request is sent to the log-in page, which will return the user to
//! where they were once they log in.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState, Error,
    auth::{
        UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    pub cookie_key: Key,
    /// How long a session is extended by on each request.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How the client is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A regular 303 redirect for page loads.
    Page,
    /// An `HX-Redirect` header, since htmx does not follow redirects for its requests.
    Htmx,
}

impl LogInRedirect {
    fn to(self, url: &str) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(url).into_response(),
            LogInRedirect::Htmx => (HxRedirect(url.to_owned()), StatusCode::OK).into_response(),
        }
    }
}

/// The log-in URL for `request`, falling back to returning the user to the dashboard.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "No usable redirect target for {}, falling back to the dashboard.",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Read the session from the request's cookies.
async fn authenticate(
    state: &AuthState,
    parts: &mut Parts,
) -> Result<(UserID, PrivateCookieJar, UtcOffset), Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let jar = PrivateCookieJar::from_request_parts(parts, state)
        .await
        .map_err(|_| Error::CookieMissing)?;
    let token = get_token_from_cookies(&jar)?;

    Ok((token.user_id, jar, local_offset))
}

/// Copy the session cookie with its extended expiry onto `response`.
///
/// The response is left untouched if the session could not be extended.
fn with_extended_session(
    response: Response,
    jar: PrivateCookieJar,
    duration: Duration,
    local_offset: UtcOffset,
) -> Response {
    let jar = match extend_auth_cookie_duration_if_needed(jar, duration, local_offset) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("could not extend session: {error}");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    let jar_response = jar.into_response();

    for cookie in jar_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.to_owned());
    }

    Response::from_parts(parts, body)
}

async fn guard(state: AuthState, request: Request, next: Next, redirect: LogInRedirect) -> Response {
    let log_in_url = log_in_url_for(&request);
    let (mut parts, body) = request.into_parts();

    let (user_id, jar, local_offset) = match authenticate(&state, &mut parts).await {
        Ok(session) => session,
        Err(Error::InvalidTimezoneError(timezone)) => {
            tracing::error!("invalid timezone {timezone}, sending user to log in page");
            return redirect.to(&log_in_url);
        }
        Err(error) => {
            tracing::debug!("rejected session for {}: {error}", parts.uri);
            return redirect.to(&log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_extended_session(response, jar, state.cookie_duration, local_offset)
}

/// Guard for pages. Clients without a valid session get a 303 redirect to the log-in page.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Guard for routes called by htmx. Clients without a valid session get an
/// `HX-Redirect` to the log-in page that returns them to the page they were on.
///
/// Handlers behind this guard can take `Extension(user_id): Extension<UserID>`.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}
