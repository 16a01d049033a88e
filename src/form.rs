//! Helpers for validating raw form fields before building typed commands.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, database_id::DatabaseId};

/// The format used by HTML date inputs, e.g. "2025-01-31".
pub(crate) const FORM_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day]");

/// Trim `raw` and reject it if it is empty.
pub(crate) fn required_text(field: &'static str, raw: &str) -> Result<String, Error> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        Err(Error::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Trim `raw` and map an empty string to `None`.
pub(crate) fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

/// Parse a required date from an HTML date input.
pub(crate) fn required_date(field: &'static str, raw: &str) -> Result<Date, Error> {
    let raw = required_text(field, raw)?;

    Date::parse(&raw, FORM_DATE_FORMAT).map_err(|_| Error::InvalidDate(raw))
}

/// Parse a required ID from a select input.
pub(crate) fn required_id(field: &'static str, raw: &str) -> Result<DatabaseId, Error> {
    required_text(field, raw)?
        .parse()
        .map_err(|_| Error::MissingField(field))
}
