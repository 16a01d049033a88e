//! Defines the endpoint for deleting a fee.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    cache::RecordCache,
    fee::{
        db::delete_fee,
        domain::{Fee, FeeId},
    },
    profile::get_student_for_user,
};

/// The state needed to delete a fee.
#[derive(Debug, Clone)]
pub struct DeleteFeeState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub fee_cache: RecordCache<FeeId, Fee>,
}

impl FromRef<AppState> for DeleteFeeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            fee_cache: state.fee_cache.clone(),
        }
    }
}

/// A route handler for deleting a fee, responds with an alert.
pub async fn delete_fee_endpoint(
    State(state): State<DeleteFeeState>,
    Extension(user_id): Extension<UserID>,
    Path(fee_id): Path<FeeId>,
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
        Err(error) => return error.into_alert_response(),
    };

    match delete_fee(fee_id, student.id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => {
            state.fee_cache.invalidate(fee_id);

            Alert::SuccessSimple {
                message: "Fee deleted successfully".to_owned(),
            }
            .into_response()
        }
        Err(error) => {
            tracing::error!("could not delete fee {fee_id}: {error}");
            error.into_alert_response()
        }
    }
}
