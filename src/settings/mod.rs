//! The user's preferences and the settings page that edits them.

mod endpoint;
mod page;
mod preferences;

pub use endpoint::{delete_account_endpoint, save_settings_endpoint};
pub use page::get_settings_page;
pub use preferences::{Preferences, create_preferences_table, get_currency};
