//! Where to send a user after they log in.
//!
//! Redirect targets are always local paths, and never an auth page, so a
//! crafted link cannot bounce a user to another site or into a log-in loop.

use axum::{extract::Request, http::Uri};
use axum_htmx::{HX_CURRENT_URL, HX_REQUEST};

use crate::endpoints;

/// Pages that must never be the target of a post-log-in redirect.
const AUTH_PAGES: [&str; 3] = [
    endpoints::LOG_IN_VIEW,
    endpoints::REGISTER_VIEW,
    endpoints::LOG_OUT,
];

/// The path and query of `uri` if it is a local page other than an auth page.
fn local_target(uri: &Uri) -> Option<String> {
    let path_and_query = uri.path_and_query()?;

    let is_local_path = path_and_query.as_str().starts_with('/')
        && !path_and_query.as_str().starts_with("//");

    (is_local_path && !AUTH_PAGES.contains(&path_and_query.path()))
        .then(|| path_and_query.as_str().to_owned())
}

/// Check that a user supplied redirect URL is a relative URL for a local page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;

    if uri.scheme().is_some() || uri.authority().is_some() {
        return None;
    }

    local_target(&uri)
}

/// The log-in page URL that returns the user to where `request` came from.
///
/// Page loads return to the requested page. htmx requests to `/api` routes
/// return to the page in the `HX-Current-URL` header, since the API route
/// itself is not a page.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        current_page_of_htmx_request(request)?
    } else {
        local_target(request.uri())?
    };

    build_log_in_redirect_url_from_target(&target)
}

pub(super) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}

fn current_page_of_htmx_request(request: &Request) -> Option<String> {
    let headers = request.headers();

    let is_htmx = headers
        .get(HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));
    if !is_htmx {
        tracing::warn!("{} request is missing the HX-Request header", request.uri());
        return None;
    }

    let Some(current_url) = headers
        .get(HX_CURRENT_URL)
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("{} request is missing the HX-Current-URL header", request.uri());
        return None;
    };

    // HX-Current-URL is absolute, so only its path and query are kept.
    let target = current_url.parse::<Uri>().ok().and_then(|uri| local_target(&uri));
    if target.is_none() {
        tracing::warn!("unusable HX-Current-URL header: {current_url}");
    }

    target
}
