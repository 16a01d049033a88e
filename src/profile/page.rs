//! The page for viewing and editing the user's profile and student record.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    auth::get_user_by_id,
    endpoints,
    html::{
        CARD_STYLE, InputField, PAGE_CONTAINER_STYLE, base, form_error, submit_button,
    },
    navigation::NavBar,
    profile::core::{ProfileForm, get_profile, get_student_for_user},
};

/// The state needed for the profile page and endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The profile form, which replaces itself with the response of the save endpoint.
pub(super) fn profile_form(form: &ProfileForm, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-6"
        {
            (form_error(error_message))

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Personal Information" }

                (InputField::required("Full Name", "full_name", "text", &form.full_name).into_html())
                (InputField::required("Email", "email", "email", &form.email).into_html())
                (InputField::optional("Phone Number", "phone", &form.phone).into_html())
                (InputField::optional("Address", "address", &form.address).into_html())
            }

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Student Information" }

                (InputField::required("Student ID", "student_number", "text", &form.student_number).into_html())
                (InputField::required("Grade Level", "grade_level", "text", &form.grade_level).into_html())
                (InputField::optional("Class Section", "class_section", &form.class_section).into_html())
            }

            fieldset class={ "space-y-4 " (CARD_STYLE) }
            {
                legend class="px-1 text-lg font-semibold" { "Parent / Guardian" }

                (InputField::optional("Guardian Name", "parent_guardian_name", &form.parent_guardian_name).into_html())
                (InputField::optional("Guardian Phone", "parent_guardian_phone", &form.parent_guardian_phone).into_html())
            }

            (submit_button("Save Profile"))
        }
    }
}

fn profile_view(form: &ProfileForm, has_student_record: bool) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-2xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Profile" }

                @if !has_student_record {
                    p
                        id="student-record-notice"
                        class="p-4 rounded-lg border text-yellow-800 border-yellow-300 bg-yellow-50 \
                            dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800"
                    {
                        "Complete your student information to start tracking fees."
                    }
                }

                (profile_form(form, None))
            }
        }
    };

    base("Profile", &[], &content)
}

/// Display the profile form filled with the user's saved records.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get user {user_id}: {error}"))?;

    let profile = match get_profile(user_id, &connection) {
        Ok(profile) => Some(profile),
        Err(Error::NotFound) => None,
        Err(error) => {
            tracing::error!("could not get profile for user {user_id}: {error}");
            return Err(error);
        }
    };

    let student = match get_student_for_user(user_id, &connection) {
        Ok(student) => Some(student),
        Err(Error::StudentRecordMissing) => None,
        Err(error) => {
            tracing::error!("could not get student record for user {user_id}: {error}");
            return Err(error);
        }
    };

    let form = ProfileForm::from_records(profile.as_ref(), student.as_ref(), &user.email);

    Ok(profile_view(&form, student.is_some()).into_response())
}
