//! Per-user display, notification and privacy preferences.
//!
//! Preferences are stored as a single JSON document per user so that new
//! settings can be added without a migration. Missing fields take their
//! default values when the document is loaded.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::{Error, UserID, currency::Currency};

/// The colour scheme of the app.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the operating system.
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::System => "System",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| format!("unknown theme \"{s}\""))
    }
}

/// Who can see the user's profile.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
}

impl ProfileVisibility {
    pub const ALL: [ProfileVisibility; 2] = [ProfileVisibility::Public, ProfileVisibility::Private];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileVisibility::Public => "public",
            ProfileVisibility::Private => "private",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileVisibility::Public => "Public",
            ProfileVisibility::Private => "Private",
        }
    }
}

impl FromStr for ProfileVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileVisibility::ALL
            .into_iter()
            .find(|visibility| visibility.as_str() == s)
            .ok_or_else(|| format!("unknown profile visibility \"{s}\""))
    }
}

/// The languages offered on the settings page as (code, name) pairs.
pub const LANGUAGES: [(&str, &str); 4] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
    pub fee_reminders: bool,
    pub payment_confirmations: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
            fee_reminders: true,
            payment_confirmations: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyPreferences {
    pub profile_visibility: ProfileVisibility,
    pub show_email: bool,
    pub show_phone: bool,
}

/// Everything the user can change on the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub notifications: NotificationPreferences,
    pub privacy: PrivacyPreferences,
    /// A code from [LANGUAGES].
    pub language: String,
    /// The currency amounts are displayed in.
    pub currency: Currency,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            notifications: NotificationPreferences::default(),
            privacy: PrivacyPreferences::default(),
            language: "en".to_owned(),
            currency: Currency::default(),
        }
    }
}

/// Create the table that holds each user's preferences.
pub fn create_preferences_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences (
            user_id INTEGER PRIMARY KEY,
            preferences TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the preferences of `user_id`, or the defaults if they have never saved any.
///
/// # Errors
///
/// Returns [Error::JSONSerializationError] if the stored preferences could not be parsed.
pub fn get_preferences(user_id: UserID, connection: &Connection) -> Result<Preferences, Error> {
    let stored: Option<String> = connection
        .query_row(
            "SELECT preferences FROM user_preferences WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        Some(json) => serde_json::from_str(&json)
            .map_err(|error| Error::JSONSerializationError(error.to_string())),
        None => Ok(Preferences::default()),
    }
}

/// The currency `user_id` wants amounts displayed in.
pub fn get_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    get_preferences(user_id, connection).map(|preferences| preferences.currency)
}

/// Replace the preferences of `user_id`.
pub fn save_preferences(
    user_id: UserID,
    preferences: &Preferences,
    connection: &Connection,
) -> Result<(), Error> {
    let json = serde_json::to_string(preferences)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    connection.execute(
        "INSERT INTO user_preferences (user_id, preferences) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET preferences = excluded.preferences",
        (user_id.as_i64(), json),
    )?;

    Ok(())
}
