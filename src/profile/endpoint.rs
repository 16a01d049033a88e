//! Defines the endpoint for saving the user's profile and student record.

use axum::{
    Extension, Form,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    Error, UserID,
    alert::Alert,
    capitalise_first_char,
    profile::{
        core::{ProfileForm, SaveProfile, save_profile},
        page::{ProfileState, profile_form},
    },
};

/// A route handler for saving the profile form.
///
/// Invalid input re-renders the form with an error message. On success the
/// form is re-rendered with the saved values and a success alert.
pub async fn save_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let profile = match SaveProfile::from_form(&form) {
        Ok(profile) => profile,
        Err(error) => {
            let message = capitalise_first_char(&error.to_string());
            return profile_form(&form, Some(&message)).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = save_profile(user_id, &profile, &connection) {
        tracing::error!("could not save profile for user {user_id}: {error}");
        return error.into_alert_response();
    }

    let alert = Alert::SuccessSimple {
        message: "Profile updated successfully".to_owned(),
    };

    html! {
        (profile_form(&form, None))
        (alert.into_html())
    }
    .into_response()
}
