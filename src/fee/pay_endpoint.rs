//! Defines the endpoint for recording a payment against a fee.

use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    Error, UserID, capitalise_first_char, endpoints,
    fee::{
        db::save_payment,
        domain::{FeeId, PaymentForm, RecordPayment},
        pay_page::{PaymentState, load_student_fee, payment_form},
    },
    profile::get_student_for_user,
    timezone::local_today,
};

/// A route handler for recording a payment, redirects to the fees view on success.
///
/// The payment is added to the fee's running total and dated today in the
/// server's local timezone. Invalid input re-renders the payment form.
pub async fn record_payment_endpoint(
    State(state): State<PaymentState>,
    Extension(user_id): Extension<UserID>,
    Path(fee_id): Path<FeeId>,
    Form(form): Form<PaymentForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => {
            tracing::error!("could not get today's date: {error}");
            return error.into_alert_response();
        }
    };

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
            tracing::warn!("user {user_id} tried to pay fee {fee_id}: {error}");
            return error.into_alert_response();
        }
    };

    let fee = match load_student_fee(&state.fee_cache, fee_id, student.id, &connection) {
        Ok(fee) => fee,
        Err(error) => {
            tracing::error!("could not get fee {fee_id}: {error}");
            return error.into_alert_response();
        }
    };

    let payment = match RecordPayment::from_form(&form) {
        Ok(payment) => payment,
        Err(error) => {
            let message = capitalise_first_char(&error.to_string());
            return payment_form(&fee, &form, Some(&message)).into_response();
        }
    };

    let updated_fee = match fee.apply_payment(&payment, today) {
        Ok(updated_fee) => updated_fee,
        Err(error) => {
            tracing::warn!("rejected payment of {} for fee {fee_id}: {error}", payment.amount);
            let message = capitalise_first_char(&error.to_string());
            return payment_form(&fee, &form, Some(&message)).into_response();
        }
    };

    if let Err(error) = save_payment(&updated_fee, &connection) {
        tracing::error!("could not record payment for fee {fee_id}: {error}");
        return error.into_alert_response();
    }

    state.fee_cache.invalidate(fee_id);
    tracing::info!(
        "recorded payment of {} for fee {fee_id}, status is now {}",
        payment.amount,
        updated_fee.status
    );

    (
        HxRedirect(endpoints::FEES_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[cfg(test)]
mod record_payment_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use time::macros::date;

    use crate::{
        UserID,
        cache::RecordCache,
        db::initialize,
        endpoints,
        fee::{
            db::{create_fee, get_fee},
            domain::{CreateFee, FeeId, FeeStatus, PaymentForm},
            pay_page::PaymentState,
        },
        money::Amount,
        payment_method::PaymentMethod,
        profile::{StudentId, get_student_for_user, save_profile},
        test_utils::{
            assert_form_error_message, assert_hx_redirect, insert_test_user, must_get_form,
            parse_html_fragment, test_profile,
        },
        timezone::local_today,
    };

    use super::record_payment_endpoint;

    fn get_test_state() -> PaymentState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        PaymentState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
            fee_cache: RecordCache::default(),
        }
    }

    fn insert_fee(state: &PaymentState, amount: i64) -> (UserID, StudentId, FeeId) {
        let connection = state.db_connection.lock().unwrap();
        let user_id = insert_test_user(&connection, "a@example.com");
        save_profile(user_id, &test_profile("a@example.com"), &connection).unwrap();
        let student = get_student_for_user(user_id, &connection).unwrap();
        let fee = create_fee(
            student.id,
            &CreateFee {
                category_id: 1,
                amount: Amount::new_unchecked(Decimal::from(amount)),
                due_date: date!(2025 - 06 - 30),
                notes: Some("Term 1".to_owned()),
            },
            &connection,
        )
        .unwrap();

        (user_id, student.id, fee.id)
    }

    fn payment_form(amount: &str) -> PaymentForm {
        PaymentForm {
            amount: amount.to_owned(),
            payment_method: "bank_transfer".to_owned(),
            notes: String::new(),
        }
    }

    async fn pay(state: &PaymentState, user_id: UserID, fee_id: FeeId, amount: &str) -> StatusCode {
        let response = record_payment_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(fee_id),
            Form(payment_form(amount)),
        )
        .await;

        if response.status() == StatusCode::SEE_OTHER {
            assert_hx_redirect(&response, endpoints::FEES_VIEW);
        }

        response.status()
    }

    #[tokio::test]
    async fn payments_accumulate_until_fee_is_paid() {
        let state = get_test_state();
        let (user_id, student_id, fee_id) = insert_fee(&state, 1000);

        assert_eq!(pay(&state, user_id, fee_id, "400").await, StatusCode::SEE_OTHER);

        let fee = get_fee(fee_id, student_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(fee.paid_amount, Decimal::from(400));
        assert_eq!(fee.status, FeeStatus::Partial);
        assert_eq!(fee.payment_method, Some(PaymentMethod::BankTransfer));
        assert_eq!(fee.paid_date, Some(local_today("Etc/UTC").unwrap()));
        assert_eq!(fee.notes.as_deref(), Some("Term 1"));

        assert_eq!(pay(&state, user_id, fee_id, "600").await, StatusCode::SEE_OTHER);

        let fee = get_fee(fee_id, student_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(fee.paid_amount, Decimal::from(1000));
        assert_eq!(fee.status, FeeStatus::Paid);
    }

    #[tokio::test]
    async fn successful_payment_invalidates_cached_fee() {
        let state = get_test_state();
        let (user_id, _, fee_id) = insert_fee(&state, 1000);

        pay(&state, user_id, fee_id, "100").await;

        assert!(!state.fee_cache.contains(fee_id));
    }

    #[tokio::test]
    async fn non_positive_payment_is_rejected_without_changes() {
        let state = get_test_state();
        let (user_id, student_id, fee_id) = insert_fee(&state, 1000);

        let response = record_payment_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(fee_id),
            Form(payment_form("-50")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "The amount must be greater than zero, got -50");
        let fee = get_fee(fee_id, student_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(fee.paid_amount, Decimal::ZERO);
        assert_eq!(fee.status, FeeStatus::Pending);
    }

    #[tokio::test]
    async fn payment_above_largest_amount_is_rejected() {
        let state = get_test_state();
        let (user_id, student_id, fee_id) = insert_fee(&state, 1);

        let response = record_payment_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(fee_id),
            Form(payment_form("79228162514264337593543950335")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "The amount must be at most 1000000000000000, got 79228162514264337593543950335",
        );
        let fee = get_fee(fee_id, student_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(fee.paid_amount, Decimal::ZERO);
    }

    #[tokio::test]
    async fn overflowing_payment_is_rejected_and_database_stays_usable() {
        let state = get_test_state();
        let (user_id, student_id, fee_id) = insert_fee(&state, 1);
        state
            .db_connection
            .lock()
            .unwrap()
            .execute(
                "UPDATE fee SET paid_amount = ?1 WHERE id = ?2",
                (Decimal::MAX.to_string(), fee_id),
            )
            .unwrap();

        let response = record_payment_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(fee_id),
            Form(payment_form("1")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "The total is too large to calculate");
        assert!(!state.db_connection.is_poisoned());
        let fee = get_fee(fee_id, student_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(fee.paid_amount, Decimal::MAX);
        assert_eq!(pay(&state, user_id, fee_id + 100, "1").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_fee_is_not_found() {
        let state = get_test_state();
        let (user_id, _, fee_id) = insert_fee(&state, 1000);

        assert_eq!(
            pay(&state, user_id, fee_id + 100, "10").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn invalid_timezone_is_reported() {
        let mut state = get_test_state();
        let (user_id, _, fee_id) = insert_fee(&state, 1000);
        state.local_timezone = "Not/AZone".to_owned();

        assert_eq!(
            pay(&state, user_id, fee_id, "10").await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
