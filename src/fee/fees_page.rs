//! The fee management page: ledger totals and the table of a student's fees.

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
    aggregation::{FeeLedgerTotals, fee_ledger_totals},
    category::{FeeCategory, fee_category_name, get_fee_categories},
    currency::{Currency, format_currency},
    endpoints::{self, format_endpoint},
    fee::{
        db::get_fees,
        domain::{Fee, FeeStatus},
    },
    html::{
        CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, delete_action_button,
    },
    navigation::NavBar,
    profile::get_student_for_user,
    settings::get_currency,
};

/// The state needed for the fee management page.
#[derive(Debug, Clone)]
pub struct FeesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for FeesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A coloured label for a fee status.
pub fn status_badge(status: FeeStatus) -> Markup {
    let (label, style) = match status {
        FeeStatus::Paid => (
            "Paid",
            "bg-green-100 text-green-800 dark:bg-green-900 dark:text-green-300",
        ),
        FeeStatus::Partial => (
            "Partial",
            "bg-yellow-100 text-yellow-800 dark:bg-yellow-900 dark:text-yellow-300",
        ),
        FeeStatus::Pending => (
            "Pending",
            "bg-red-100 text-red-800 dark:bg-red-900 dark:text-red-300",
        ),
    };

    html! {
        span
            class={ "text-xs font-medium px-2.5 py-0.5 rounded " (style) }
            data-status=(status.as_str())
        {
            (label)
        }
    }
}

/// Tells the user to fill in their student record before managing fees.
pub fn student_record_notice() -> Markup {
    html! {
        div
            id="student-record-required"
            role="alert"
            class="w-full p-4 rounded-lg border text-yellow-800 border-yellow-300 bg-yellow-50 \
                dark:bg-gray-800 dark:text-yellow-300 dark:border-yellow-800"
        {
            p class="font-medium" { "Student Record Required" }
            p class="mt-1 text-sm"
            {
                "Please complete your student profile before managing fees. "
                a href=(endpoints::PROFILE_VIEW) class=(LINK_STYLE) { "Go to your profile" }
                "."
            }
        }
    }
}

fn ledger_cards(totals: &FeeLedgerTotals, currency: Currency) -> Markup {
    let card = |title: &str, amount| {
        html! {
            div class=(CARD_STYLE)
            {
                h3 class="text-sm text-gray-500 dark:text-gray-400" { (title) }
                p class="text-2xl font-semibold tabular-nums" { (format_currency(amount, currency)) }
            }
        }
    };

    html! {
        div id="fee-totals" class="grid grid-cols-1 sm:grid-cols-3 gap-4 w-full"
        {
            (card("Total Fees", totals.total))
            (card("Total Paid", totals.total_paid))
            (card("Outstanding", totals.outstanding))
        }
    }
}

fn fee_row(fee: &Fee, categories: &[FeeCategory], currency: Currency) -> Markup {
    let category = fee_category_name(categories, fee.category_id);
    let delete_url = format_endpoint(endpoints::DELETE_FEE, fee.id);
    let pay_url = format_endpoint(endpoints::PAY_FEE_VIEW, fee.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-fee-id=(fee.id)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (category)
            }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(fee.amount.value(), currency)) }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(fee.paid_amount, currency)) }
            td class=(TABLE_CELL_STYLE) { time datetime=(fee.due_date) { (fee.due_date) } }
            td class=(TABLE_CELL_STYLE) { (status_badge(fee.status)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    @if fee.status != FeeStatus::Paid {
                        a href=(pay_url) class=(LINK_STYLE) { "Pay" }
                    }

                    (delete_action_button(
                        &delete_url,
                        &format!("Are you sure you want to delete the {category} fee? This cannot be undone."),
                        "closest tr",
                        "delete"
                    ))
                }
            }
        }
    }
}

fn fees_table(fees: &[Fee], categories: &[FeeCategory], currency: Currency) -> Markup {
    html! {
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class="px-6 py-3 text-right" { "Amount" }
                        th scope="col" class="px-6 py-3 text-right" { "Paid" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Due Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for fee in fees {
                        (fee_row(fee, categories, currency))
                    }

                    @if fees.is_empty() {
                        tr
                        {
                            td colspan="6" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No fees yet. "
                                a href=(endpoints::NEW_FEE_VIEW) class=(LINK_STYLE) { "Add a fee" }
                                "."
                            }
                        }
                    }
                }
            }
        }
    }
}

fn fees_view(
    fees: &[Fee],
    categories: &[FeeCategory],
    currency: Currency,
    has_student_record: bool,
) -> Result<Markup, Error> {
    let nav_bar = NavBar::new(endpoints::FEES_VIEW).into_html();
    let totals = fee_ledger_totals(fees)?;

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Fees" }

                    @if has_student_record {
                        a href=(endpoints::NEW_FEE_VIEW) class=(LINK_STYLE) { "Add Fee" }
                    }
                }

                @if has_student_record {
                    (ledger_cards(&totals, currency))
                    (fees_table(fees, categories, currency))
                } @else {
                    (student_record_notice())
                }
            }
        }
    };

    Ok(base("Fees", &[], &content))
}

/// Display the user's fees, or a notice if they have no student record yet.
pub async fn get_fees_page(
    State(state): State<FeesPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (currency, student_fees) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let currency = get_currency(user_id, &connection)?;

        let student_fees = match get_student_for_user(user_id, &connection) {
            Ok(student) => {
                let fees = get_fees(student.id, &connection).inspect_err(|error| {
                    tracing::error!("could not get fees for student {}: {error}", student.id)
                })?;
                let categories = get_fee_categories(&connection)
                    .inspect_err(|error| tracing::error!("could not get fee categories: {error}"))?;
                Some((fees, categories))
            }
            Err(Error::StudentRecordMissing) => None,
            Err(error) => {
                tracing::error!("could not get student record for user {user_id}: {error}");
                return Err(error);
            }
        };

        (currency, student_fees)
    };

    let page = match student_fees {
        Some((fees, categories)) => fees_view(&fees, &categories, currency, true),
        None => fees_view(&[], &[], currency, false),
    }
    .inspect_err(|error| tracing::error!("could not render fees for user {user_id}: {error}"))?;

    Ok(page.into_response())
}
