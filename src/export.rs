//! CSV downloads of a user's fees and expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, Error, UserID,
    category::{
        ExpenseCategory, FeeCategory, fee_category_name, find_expense_category,
        get_expense_categories, get_fee_categories,
    },
    expense::{Expense, get_expenses},
    fee::{Fee, get_fees},
    profile::get_student_for_user,
};

const FEE_COLUMNS: [&str; 9] = [
    "id",
    "category",
    "amount",
    "paid_amount",
    "status",
    "due_date",
    "paid_date",
    "payment_method",
    "notes",
];

const EXPENSE_COLUMNS: [&str; 7] = [
    "id",
    "title",
    "description",
    "category",
    "amount",
    "date",
    "payment_method",
];

/// The state needed to export a user's records.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Serialize)]
struct FeeRecord<'a> {
    id: i64,
    category: &'a str,
    amount: String,
    paid_amount: String,
    status: &'static str,
    due_date: String,
    paid_date: String,
    payment_method: &'static str,
    notes: &'a str,
}

#[derive(Serialize)]
struct ExpenseRecord<'a> {
    id: i64,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    amount: String,
    date: String,
    payment_method: &'static str,
}

fn write_csv<T: Serialize>(columns: &[&str], records: impl Iterator<Item = T>) -> Result<String, Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(columns)
        .map_err(|error| Error::ExportError(error.to_string()))?;

    for record in records {
        writer
            .serialize(record)
            .map_err(|error| Error::ExportError(error.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::ExportError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::ExportError(error.to_string()))
}

/// Write `fees` as CSV with one row per fee.
pub fn fees_to_csv(fees: &[Fee], categories: &[FeeCategory]) -> Result<String, Error> {
    let records = fees.iter().map(|fee| FeeRecord {
        id: fee.id,
        category: fee_category_name(categories, fee.category_id),
        amount: fee.amount.to_string(),
        paid_amount: fee.paid_amount.to_string(),
        status: fee.status.as_str(),
        due_date: fee.due_date.to_string(),
        paid_date: fee.paid_date.map(|date| date.to_string()).unwrap_or_default(),
        payment_method: fee
            .payment_method
            .map(|method| method.as_str())
            .unwrap_or_default(),
        notes: fee.notes.as_deref().unwrap_or_default(),
    });

    write_csv(&FEE_COLUMNS, records)
}

/// Write `expenses` as CSV with one row per expense.
pub fn expenses_to_csv(
    expenses: &[Expense],
    categories: &[ExpenseCategory],
) -> Result<String, Error> {
    let records = expenses.iter().map(|expense| ExpenseRecord {
        id: expense.id,
        title: &expense.title,
        description: expense.description.as_deref().unwrap_or_default(),
        category: find_expense_category(categories, expense.category_id)
            .map(|category| category.name.as_str())
            .unwrap_or("Unknown"),
        amount: expense.amount.to_string(),
        date: expense.date.to_string(),
        payment_method: expense.payment_method.as_str(),
    });

    write_csv(&EXPENSE_COLUMNS, records)
}

fn csv_attachment(file_name: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Download the user's fees as CSV.
///
/// A user without a student record gets a file with only the header row.
pub async fn export_fees(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let fees = match get_student_for_user(user_id, &connection) {
        Ok(student) => get_fees(student.id, &connection)?,
        Err(Error::StudentRecordMissing) => Vec::new(),
        Err(error) => return Err(error),
    };
    let categories = get_fee_categories(&connection)?;

    let body = fees_to_csv(&fees, &categories)
        .inspect_err(|error| tracing::error!("could not export fees for user {user_id}: {error}"))?;

    Ok(csv_attachment("fees.csv", body))
}

/// Download the user's expenses as CSV.
pub async fn export_expenses(
    State(state): State<ExportState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expenses = get_expenses(user_id, &connection)?;
    let categories = get_expense_categories(&connection)?;

    let body = expenses_to_csv(&expenses, &categories).inspect_err(|error| {
        tracing::error!("could not export expenses for user {user_id}: {error}")
    })?;

    Ok(csv_attachment("expenses.csv", body))
}
