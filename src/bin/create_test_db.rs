use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, Transaction, params};

use edufinx::{PasswordHash, ValidatedPassword, initialize_db};

/// A utility for creating a demo database for the EduFinX server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const TEST_EMAIL: &str = "student@example.com";

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'edufinx.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'edufinx.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let transaction = conn.transaction()?;

    println!("Creating test user {TEST_EMAIL}...");
    let user_id = insert_user(&transaction)?;

    println!("Creating profile and student record...");
    let student_id = insert_student(user_id, &transaction)?;

    println!("Creating fees...");
    insert_fees(student_id, &transaction)?;

    println!("Creating expenses...");
    insert_expenses(user_id, &transaction)?;

    println!("Creating budgets...");
    insert_budgets(user_id, &transaction)?;

    transaction.commit()?;

    println!("Success! Log in with {TEST_EMAIL} and the password 'test'.");

    Ok(())
}

fn insert_user(transaction: &Transaction) -> Result<i64, Box<dyn Error>> {
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;

    transaction.execute(
        "INSERT INTO user (email, password) VALUES (?1, ?2)",
        (TEST_EMAIL, password_hash.as_ref()),
    )?;

    Ok(transaction.last_insert_rowid())
}

fn insert_student(user_id: i64, transaction: &Transaction) -> Result<i64, rusqlite::Error> {
    transaction.execute(
        "INSERT INTO profile (user_id, full_name, email, phone, address, role)
        VALUES (?1, 'Asha Verma', ?2, '+91 98765 43210', '12 MG Road, Pune', 'student')",
        params![user_id, TEST_EMAIL],
    )?;

    transaction.execute(
        "INSERT INTO student (user_id, student_number, grade_level, class_section,
            parent_guardian_name, parent_guardian_phone)
        VALUES (?1, 'STU-2025-001', '10', 'B', 'Rahul Verma', '+91 98765 00000')",
        params![user_id],
    )?;

    Ok(transaction.last_insert_rowid())
}

fn insert_fees(student_id: i64, transaction: &Transaction) -> Result<(), rusqlite::Error> {
    // (category_id, amount, paid_amount, due_date, status, paid_date, payment_method, notes)
    let fees = [
        (1, "25000.00", "25000.00", "2025-06-15", "paid", Some("2025-06-10"), Some("bank_transfer"), Some("Term 1")),
        (2, "1500.00", "0", "2025-07-01", "pending", None, None, None),
        (3, "4000.00", "1500.00", "2025-07-20", "partial", Some("2025-07-05"), Some("online"), None),
        (4, "6000.00", "0", "2025-08-01", "pending", None, None, Some("Bus route 7")),
        (5, "2000.00", "2000.00", "2025-09-10", "paid", Some("2025-09-01"), Some("cash"), None),
    ];

    let mut statement = transaction.prepare(
        "INSERT INTO fee (student_id, category_id, amount, paid_amount, due_date, status,
            paid_date, payment_method, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    for (category_id, amount, paid_amount, due_date, status, paid_date, payment_method, notes) in fees
    {
        statement.execute(params![
            student_id,
            category_id,
            amount,
            paid_amount,
            due_date,
            status,
            paid_date,
            payment_method,
            notes
        ])?;
    }

    Ok(())
}

fn insert_expenses(user_id: i64, transaction: &Transaction) -> Result<(), rusqlite::Error> {
    // (title, description, category_id, amount, date, payment_method)
    let expenses = [
        ("Maths textbook", Some("Class 10 NCERT"), 1, "450.00", "2025-07-02", "cash"),
        ("Canteen lunch", None, 2, "120.00", "2025-07-03", "online"),
        ("Auto rickshaw", None, 3, "80.00", "2025-07-03", "cash"),
        ("Geometry box", None, 4, "250.00", "2025-07-05", "card"),
        ("Science fair materials", Some("Poster board and glue"), 5, "300.00", "2025-07-08", "online"),
        ("Canteen lunch", None, 2, "150.00", "2025-07-10", "online"),
    ];

    let mut statement = transaction.prepare(
        "INSERT INTO expense (title, description, category_id, amount, date, payment_method, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;

    for (title, description, category_id, amount, date, payment_method) in expenses {
        statement.execute(params![
            title,
            description,
            category_id,
            amount,
            date,
            payment_method,
            user_id
        ])?;
    }

    Ok(())
}

fn insert_budgets(user_id: i64, transaction: &Transaction) -> Result<(), rusqlite::Error> {
    // (category_id, amount, period, start_date, end_date)
    let budgets = [
        (2, "2000.00", "monthly", "2025-07-01", "2025-07-31"),
        (1, "1500.00", "quarterly", "2025-07-01", "2025-09-30"),
    ];

    let mut statement = transaction.prepare(
        "INSERT INTO budget (category_id, amount, period, start_date, end_date, created_by)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for (category_id, amount, period, start_date, end_date) in budgets {
        statement.execute(params![
            category_id,
            amount,
            period,
            start_date,
            end_date,
            user_id
        ])?;
    }

    Ok(())
}
