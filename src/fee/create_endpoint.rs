//! Defines the endpoint for creating a new fee.

use axum::{
    Extension, Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID, capitalise_first_char,
    category::get_fee_categories,
    endpoints,
    fee::{
        create_page::{CreateFeeState, fee_form},
        db::create_fee,
        domain::{CreateFee, FeeForm},
    },
    profile::get_student_for_user,
};

/// A route handler for creating a new fee, redirects to the fees view on success.
pub async fn create_fee_endpoint(
    State(state): State<CreateFeeState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<FeeForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let student = match get_student_for_user(user_id, &connection) {
        Ok(student) => student,
        Err(error) => {
            tracing::warn!("user {user_id} tried to create a fee: {error}");
            return error.into_alert_response();
        }
    };

    let command = match CreateFee::from_form(&form) {
        Ok(command) => command,
        Err(error) => {
            let categories = match get_fee_categories(&connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let message = capitalise_first_char(&error.to_string());

            return fee_form(&form, &categories, Some(&message)).into_response();
        }
    };

    if let Err(error) = create_fee(student.id, &command, &connection) {
        tracing::error!("could not create fee for student {}: {error}", student.id);
        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::FEES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
