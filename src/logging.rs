//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{Method, header::CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

/// Form fields whose values are never written to the logs.
const REDACTED_FIELDS: [&str; 2] = ["password", "confirm_password"];

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in submitted forms are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = read_body_text(body).await;

    if is_form_submission(&parts) {
        log_request(&parts, &redact_form_fields(&body_text));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = read_body_text(body).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn is_form_submission(parts: &axum::http::request::Parts) -> bool {
    let is_write = matches!(parts.method, Method::POST | Method::PUT);
    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    is_write && is_form
}

async fn read_body_text(body: Body) -> String {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
        Err(error) => {
            tracing::error!("could not read body for logging: {error}");
            String::new()
        }
    }
}

/// Replace the value of every field in [REDACTED_FIELDS] with asterisks.
fn redact_form_fields(form_text: &str) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if REDACTED_FIELDS.contains(&name) => format!("{name}=********"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());

    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {} {}\nbody: {}...",
            parts.method,
            parts.uri,
            truncate(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!(
            "Received request: {} {}\nbody: {body:?}",
            parts.method,
            parts.uri
        );
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {} {:?}\nbody: {}...",
            parts.status,
            parts.headers,
            truncate(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!(
            "Sending response: {} {:?}\nbody: {body:?}",
            parts.status,
            parts.headers
        );
    }
}

#[cfg(test)]
mod logging_tests {
    use super::{redact_form_fields, truncate};

    #[test]
    fn redacts_password_fields() {
        let redacted = redact_form_fields(
            "email=a%40example.com&password=hunter2&confirm_password=hunter2&remember_me=on",
        );

        assert_eq!(
            redacted,
            "email=a%40example.com&password=********&confirm_password=********&remember_me=on"
        );
    }

    #[test]
    fn leaves_other_forms_unchanged() {
        let form = "title=Password+book&amount=12.50";

        assert_eq!(redact_form_fields(form), form);
    }

    #[test]
    fn truncates_on_char_boundary() {
        let body = "₹".repeat(30);

        let truncated = truncate(&body);

        assert!(truncated.len() <= 64);
        assert!(body.starts_with(truncated));
    }
}
