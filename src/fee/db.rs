//! Database access for fees.

use rusqlite::{Connection, Row, params};
use rust_decimal::Decimal;

use crate::{
    Error,
    fee::domain::{CreateFee, Fee, FeeId, FeeStatus},
    money::get_decimal,
    profile::StudentId,
};

pub fn create_fee_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS fee (
            id INTEGER PRIMARY KEY,
            student_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount TEXT NOT NULL,
            paid_amount TEXT NOT NULL DEFAULT '0',
            due_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            paid_date TEXT,
            payment_method TEXT,
            notes TEXT,
            FOREIGN KEY(student_id) REFERENCES student(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES fee_category(id) ON UPDATE CASCADE ON DELETE RESTRICT
        );

        CREATE INDEX IF NOT EXISTS idx_fee_student_due_date ON fee(student_id, due_date);",
    )?;

    Ok(())
}

const SELECT_FEE: &str = "SELECT id, student_id, category_id, amount, paid_amount, due_date, \
    status, paid_date, payment_method, notes FROM fee";

fn map_fee_row(row: &Row) -> Result<Fee, rusqlite::Error> {
    Ok(Fee {
        id: row.get(0)?,
        student_id: row.get(1)?,
        category_id: row.get(2)?,
        amount: row.get(3)?,
        paid_amount: get_decimal(row, 4)?,
        due_date: row.get(5)?,
        status: row.get(6)?,
        paid_date: row.get(7)?,
        payment_method: row.get(8)?,
        notes: row.get(9)?,
    })
}

/// Create a new pending fee for `student_id`.
///
/// # Errors
///
/// Returns [Error::InvalidCategory] if the category does not exist, or
/// [Error::SqlError] for any other SQL error.
pub fn create_fee(
    student_id: StudentId,
    fee: &CreateFee,
    connection: &Connection,
) -> Result<Fee, Error> {
    let status = FeeStatus::Pending;
    let paid_amount = Decimal::ZERO;

    connection.execute(
        "INSERT INTO fee (student_id, category_id, amount, paid_amount, due_date, status, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            student_id,
            fee.category_id,
            fee.amount,
            paid_amount.to_string(),
            fee.due_date,
            status,
            fee.notes
        ],
    )?;

    Ok(Fee {
        id: connection.last_insert_rowid(),
        student_id,
        category_id: fee.category_id,
        amount: fee.amount,
        paid_amount,
        due_date: fee.due_date,
        status,
        paid_date: None,
        payment_method: None,
        notes: fee.notes.clone(),
    })
}

/// Retrieve the fee `id` owned by `student_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the fee does not exist or belongs to another student.
pub fn get_fee(id: FeeId, student_id: StudentId, connection: &Connection) -> Result<Fee, Error> {
    connection
        .prepare(&format!(
            "{SELECT_FEE} WHERE id = :id AND student_id = :student_id"
        ))?
        .query_one(
            &[(":id", &id), (":student_id", &student_id)],
            map_fee_row,
        )
        .map_err(Error::from)
}

/// Retrieve all fees owned by `student_id`, most recently due first.
pub fn get_fees(student_id: StudentId, connection: &Connection) -> Result<Vec<Fee>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_FEE} WHERE student_id = :student_id ORDER BY due_date DESC, id DESC"
        ))?
        .query_map(&[(":student_id", &student_id)], map_fee_row)?
        .map(|maybe_fee| maybe_fee.map_err(Error::from))
        .collect()
}

/// Write the payment fields of `fee` to the database.
///
/// # Errors
///
/// Returns [Error::UpdateMissingFee] if the fee does not exist.
pub fn save_payment(fee: &Fee, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE fee
        SET paid_amount = ?1, status = ?2, paid_date = ?3, payment_method = ?4, notes = ?5
        WHERE id = ?6 AND student_id = ?7",
        params![
            fee.paid_amount.to_string(),
            fee.status,
            fee.paid_date,
            fee.payment_method,
            fee.notes,
            fee.id,
            fee.student_id
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingFee);
    }

    Ok(())
}

/// Delete the fee `id` owned by `student_id`.
///
/// # Errors
///
/// Returns [Error::DeleteMissingFee] if the fee does not exist.
pub fn delete_fee(id: FeeId, student_id: StudentId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM fee WHERE id = ?1 AND student_id = ?2",
        params![id, student_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingFee);
    }

    Ok(())
}
