//! Locale-aware currency formatting for decimal amounts.

use std::{fmt::Display, str::FromStr};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// How the digits of the integer part are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DigitGrouping {
    /// Groups of three, e.g. 1,234,567.
    Thousands,
    /// The last three digits, then groups of two, e.g. 12,34,567 (en-IN).
    Indian,
}

/// A currency the user can choose to display amounts in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian Rupee, formatted with the en-IN locale.
    #[default]
    Inr,
    /// US Dollar.
    Usd,
    /// Euro.
    Eur,
    /// British Pound.
    Gbp,
}

impl Currency {
    /// All supported currencies, in the order they are offered to users.
    pub const ALL: [Currency; 4] = [Currency::Inr, Currency::Usd, Currency::Eur, Currency::Gbp];

    /// The ISO 4217 code, e.g. "INR".
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// A human readable label, e.g. "INR (₹)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.code(), self.symbol())
    }

    fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    fn grouping(&self) -> DigitGrouping {
        match self {
            Currency::Inr => DigitGrouping::Indian,
            Currency::Usd | Currency::Eur | Currency::Gbp => DigitGrouping::Thousands,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported currency \"{s}\""))
    }
}

/// Format `amount` in `currency` with two decimal places, e.g. "₹12,34,567.50".
///
/// Amounts are rounded half away from zero to the currency's minor unit.
/// The output depends only on the inputs.
pub fn format_currency(amount: Decimal, currency: Currency) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let is_negative = rounded.is_sign_negative() && !rounded.is_zero();

    let digits = format!("{:.2}", rounded.abs());
    let (major_digits, fraction) = digits.split_once('.').unwrap_or((&digits, "00"));

    format!(
        "{}{}{}.{}",
        if is_negative { "-" } else { "" },
        currency.symbol(),
        group_digits(major_digits, currency.grouping()),
        fraction
    )
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let group_size = match grouping {
        DigitGrouping::Thousands => 3,
        DigitGrouping::Indian => 2,
    };

    let mut groups = Vec::new();
    let mut end = head.len();

    while end > 0 {
        let start = end.saturating_sub(group_size);
        groups.push(&head[start..end]);
        end = start;
    }

    groups.reverse();
    groups.push(last_three);
    groups.join(",")
}
