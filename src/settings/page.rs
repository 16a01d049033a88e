//! The settings page and the form that edits [Preferences].

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, UserID,
    currency::Currency,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, FORM_CHECKBOX_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        THEME_COOKIE, base, form_error, select_input, submit_button,
    },
    navigation::NavBar,
    settings::preferences::{
        LANGUAGES, NotificationPreferences, Preferences, PrivacyPreferences, ProfileVisibility,
        Theme, get_preferences,
    },
};

/// The state needed for the settings page and endpoints.
#[derive(Debug, Clone)]
pub struct SettingsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw settings form. Checkboxes are only submitted when checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub profile_visibility: String,
    pub email_notifications: Option<String>,
    pub push_notifications: Option<String>,
    pub sms_notifications: Option<String>,
    pub fee_reminders: Option<String>,
    pub payment_confirmations: Option<String>,
    pub show_email: Option<String>,
    pub show_phone: Option<String>,
}

impl Preferences {
    /// Validate the settings form.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPreference] if a select field holds a value that is not one of its options.
    pub fn from_form(form: &SettingsForm) -> Result<Self, Error> {
        let invalid = |field: &'static str, value: &str| Error::InvalidPreference {
            field,
            value: value.to_owned(),
        };

        let theme: Theme = form.theme.parse().map_err(|_| invalid("theme", &form.theme))?;
        let currency: Currency = form
            .currency
            .parse()
            .map_err(|_| invalid("currency", &form.currency))?;
        let profile_visibility: ProfileVisibility = form
            .profile_visibility
            .parse()
            .map_err(|_| invalid("profile visibility", &form.profile_visibility))?;
        let language = LANGUAGES
            .iter()
            .find(|(code, _)| *code == form.language)
            .map(|(code, _)| (*code).to_owned())
            .ok_or_else(|| invalid("language", &form.language))?;

        Ok(Self {
            theme,
            notifications: NotificationPreferences {
                email: form.email_notifications.is_some(),
                push: form.push_notifications.is_some(),
                sms: form.sms_notifications.is_some(),
                fee_reminders: form.fee_reminders.is_some(),
                payment_confirmations: form.payment_confirmations.is_some(),
            },
            privacy: PrivacyPreferences {
                profile_visibility,
                show_email: form.show_email.is_some(),
                show_phone: form.show_phone.is_some(),
            },
            language,
            currency,
        })
    }
}

/// Build the cookie that lets every page apply the theme before it is painted.
pub(super) fn theme_cookie(theme: Theme) -> Cookie<'static> {
    Cookie::build((THEME_COOKIE, theme.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(Duration::days(365))
        .build()
}

fn checkbox(name: &str, label: &str, description: &str, checked: bool) -> Markup {
    html! {
        div class="flex items-start justify-between gap-4"
        {
            div
            {
                label for=(name) class="text-sm font-medium" { (label) }
                p class="text-xs text-gray-500 dark:text-gray-400" { (description) }
            }

            input
                type="checkbox"
                name=(name)
                id=(name)
                checked[checked]
                class=(FORM_CHECKBOX_STYLE);
        }
    }
}

pub(super) fn settings_form(preferences: &Preferences, error_message: Option<&str>) -> Markup {
    let themes: Vec<(String, String)> = Theme::ALL
        .iter()
        .map(|theme| (theme.as_str().to_owned(), theme.label().to_owned()))
        .collect();
    let languages: Vec<(String, String)> = LANGUAGES
        .iter()
        .map(|(code, name)| ((*code).to_owned(), (*name).to_owned()))
        .collect();
    let currencies: Vec<(String, String)> = Currency::ALL
        .iter()
        .map(|currency| (currency.code().to_owned(), currency.label()))
        .collect();
    let visibilities: Vec<(String, String)> = ProfileVisibility::ALL
        .iter()
        .map(|visibility| (visibility.as_str().to_owned(), visibility.label().to_owned()))
        .collect();
    let notifications = &preferences.notifications;
    let privacy = &preferences.privacy;

    html! {
        form
            hx-put=(endpoints::SETTINGS_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-6"
        {
            (form_error(error_message))

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Appearance" }

                (select_input("Theme", "theme", &themes, preferences.theme.as_str(), None))
                (select_input("Language", "language", &languages, &preferences.language, None))
                (select_input("Currency", "currency", &currencies, preferences.currency.code(), None))
            }

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Notifications" }

                (checkbox("email_notifications", "Email Notifications", "Receive updates by email", notifications.email))
                (checkbox("push_notifications", "Push Notifications", "Receive notifications in the browser", notifications.push))
                (checkbox("sms_notifications", "SMS Notifications", "Receive text messages", notifications.sms))
                (checkbox("fee_reminders", "Fee Reminders", "Get reminded about upcoming due dates", notifications.fee_reminders))
                (checkbox("payment_confirmations", "Payment Confirmations", "Get a confirmation when a payment is recorded", notifications.payment_confirmations))
            }

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Privacy" }

                (select_input("Profile Visibility", "profile_visibility", &visibilities, privacy.profile_visibility.as_str(), None))
                (checkbox("show_email", "Show Email Address", "Display your email on your profile", privacy.show_email))
                (checkbox("show_phone", "Show Phone Number", "Display your phone number on your profile", privacy.show_phone))
            }

            (submit_button("Save Settings"))
        }
    }
}

fn settings_view(preferences: &Preferences) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl space-y-6"
            {
                h1 class="text-xl font-bold" { "Settings" }

                (settings_form(preferences, None))

                section class={ "space-y-4 " (CARD_STYLE) }
                {
                    h2 class="text-lg font-semibold" { "Your Data" }

                    p class="text-sm" { "Download your records as CSV files." }

                    div class="flex gap-4"
                    {
                        a href=(endpoints::EXPORT_FEES) class=(LINK_STYLE) download { "Export Fees" }
                        a href=(endpoints::EXPORT_EXPENSES) class=(LINK_STYLE) download { "Export Expenses" }
                    }

                    h2 class="text-lg font-semibold text-red-600 dark:text-red-500" { "Danger Zone" }

                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Irreversible and destructive actions."
                    }

                    button
                        type="button"
                        hx-post=(endpoints::DELETE_ACCOUNT)
                        hx-swap="none"
                        hx-target-error="#alert-container"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Delete Account"
                    }
                }
            }
        }
    };

    base("Settings", &[], &content)
}

/// Display the settings form filled with the user's preferences.
///
/// Also refreshes the theme cookie so that a new browser picks up the saved theme.
pub async fn get_settings_page(
    State(state): State<SettingsState>,
    Extension(user_id): Extension<UserID>,
    jar: CookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let preferences = get_preferences(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get preferences for {user_id}: {error}"))?;

    Ok((
        jar.add(theme_cookie(preferences.theme)),
        settings_view(&preferences),
    )
        .into_response())
}
