//! Exact decimal amounts for fees, payments, expenses and budgets.
//!
//! Amounts are stored in SQLite as TEXT so that no value ever passes through
//! binary floating point.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The number of decimal places an entered amount may have.
const MINOR_UNIT_PLACES: u32 = 2;

/// The largest amount that may be entered, in major units.
pub(crate) const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// A monetary amount that is greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::NonPositiveAmount] if `value` is zero or negative.
    /// - [Error::AmountTooLarge] if `value` is greater than [MAX_AMOUNT].
    pub fn new(value: Decimal) -> Result<Self, Error> {
        if value <= Decimal::ZERO {
            Err(Error::NonPositiveAmount(value))
        } else if value > Decimal::from(MAX_AMOUNT) {
            Err(Error::AmountTooLarge(value))
        } else {
            Ok(Self(value))
        }
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `value` is greater than zero.
    pub fn new_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Parse an amount entered by a user, e.g. "1234.50".
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [Error::InvalidAmount] if `raw` is not a number or has more than two decimal places.
    /// - [Error::NonPositiveAmount] if `raw` is zero or negative.
    /// - [Error::AmountTooLarge] if `raw` is greater than [MAX_AMOUNT].
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        let value =
            Decimal::from_str(trimmed).map_err(|_| Error::InvalidAmount(trimmed.to_owned()))?;

        if value.normalize().scale() > MINOR_UNIT_PLACES {
            return Err(Error::InvalidAmount(trimmed.to_owned()));
        }

        Self::new(value)
    }

    /// The amount as a decimal.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Decimal::from_str(text)
            .map(Amount::new_unchecked)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Add up `values`.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the total does not fit in a [Decimal].
pub(crate) fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    values.into_iter().try_fold(Decimal::ZERO, |total, value| {
        total.checked_add(value).ok_or(Error::AmountOverflow)
    })
}

/// Read a decimal stored as TEXT from `row` at `index`.
pub(crate) fn get_decimal(row: &Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error))
    })
}
