//! Defines the route handler for the page for recording a payment against a fee.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    cache::RecordCache,
    category::{fee_category_name, get_fee_categories},
    currency::{Currency, format_currency},
    endpoints::{self, format_endpoint},
    fee::{
        db::get_fee,
        domain::{Fee, FeeId, FeeStatus, PaymentForm},
        fees_page::status_badge,
    },
    html::{
        CARD_STYLE, FORM_CONTAINER_STYLE, InputField, base, form_error, link, select_input,
        submit_button,
    },
    navigation::NavBar,
    payment_method::PaymentMethod,
    profile::{StudentId, get_student_for_user},
    settings::get_currency,
};

/// The state needed to record a payment.
#[derive(Debug, Clone)]
pub struct PaymentState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,
    pub fee_cache: RecordCache<FeeId, Fee>,
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            fee_cache: state.fee_cache.clone(),
        }
    }
}

/// Get the fee `fee_id` owned by `student_id`, going through `cache`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the fee does not exist or belongs to another student.
pub(super) fn load_student_fee(
    cache: &RecordCache<FeeId, Fee>,
    fee_id: FeeId,
    student_id: StudentId,
    connection: &Connection,
) -> Result<Fee, Error> {
    let fee = cache.get_or_load(fee_id, || get_fee(fee_id, student_id, connection))?;

    if fee.student_id != student_id {
        return Err(Error::NotFound);
    }

    Ok(fee)
}

pub(super) fn payment_form(fee: &Fee, form: &PaymentForm, error_message: Option<&str>) -> Markup {
    let payment_methods: Vec<_> = PaymentMethod::ALL
        .iter()
        .map(|method| (method.as_str().to_owned(), method.label().to_owned()))
        .collect();

    html! {
        form
            hx-post=(format_endpoint(endpoints::FEE_PAYMENTS, fee.id))
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            (form_error(error_message))

            (InputField::required("Payment Amount", "amount", "number", &form.amount).into_html())
            (select_input("Payment Method", "payment_method", &payment_methods, &form.payment_method, Some("Select a payment method")))
            (InputField::optional("Notes", "notes", &form.notes).into_html())

            (submit_button("Record Payment"))
        }
    }
}

fn fee_summary(fee: &Fee, category: &str, currency: Currency) -> Markup {
    html! {
        dl id="fee-summary" class={ "grid grid-cols-2 gap-2 text-sm " (CARD_STYLE) }
        {
            dt class="text-gray-500 dark:text-gray-400" { "Category" }
            dd { (category) }
            dt class="text-gray-500 dark:text-gray-400" { "Amount" }
            dd class="tabular-nums" { (format_currency(fee.amount.value(), currency)) }
            dt class="text-gray-500 dark:text-gray-400" { "Paid" }
            dd class="tabular-nums" { (format_currency(fee.paid_amount, currency)) }
            dt class="text-gray-500 dark:text-gray-400" { "Remaining" }
            dd class="tabular-nums" { (format_currency(fee.remaining_balance(), currency)) }
            dt class="text-gray-500 dark:text-gray-400" { "Status" }
            dd { (status_badge(fee.status)) }
        }
    }
}

fn pay_fee_view(fee: &Fee, category: &str, currency: Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::FEES_VIEW).into_html();
    let form = PaymentForm {
        amount: fee.remaining_balance().to_string(),
        ..Default::default()
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full space-y-4"
            {
                h1 class="text-xl font-bold" { "Record Payment" }

                (fee_summary(fee, category, currency))

                @if fee.status == FeeStatus::Paid {
                    p id="fee-paid-notice" { "This fee has been paid in full." }
                } @else {
                    (payment_form(fee, &form, None))
                }

                p class="text-sm" { (link(endpoints::FEES_VIEW, "Back to fees")) }
            }
        }
    };

    base("Record Payment", &[], &content)
}

/// Renders the payment form for a fee, pre-filled with the remaining balance.
pub async fn get_pay_fee_page(
    State(state): State<PaymentState>,
    Extension(user_id): Extension<UserID>,
    Path(fee_id): Path<FeeId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // Without a student record there are no fees to pay.
    let student = get_student_for_user(user_id, &connection).map_err(|error| match error {
        Error::StudentRecordMissing => Error::NotFound,
        error => error,
    })?;

    let fee = load_student_fee(&state.fee_cache, fee_id, student.id, &connection)?;
    let categories = get_fee_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get fee categories: {error}"))?;
    let currency = get_currency(user_id, &connection)?;

    Ok(pay_fee_view(
        &fee,
        fee_category_name(&categories, fee.category_id),
        currency,
    )
    .into_response())
}
