//! Fees owed by a student, the payments made against them and the pages for managing them.

mod create_endpoint;
mod create_page;
mod db;
mod delete_endpoint;
mod domain;
mod fees_page;
mod pay_endpoint;
mod pay_page;

pub use create_endpoint::create_fee_endpoint;
pub use create_page::get_create_fee_page;
pub use db::{create_fee, create_fee_table, get_fees, save_payment};
pub use delete_endpoint::delete_fee_endpoint;
pub use domain::{CreateFee, Fee, FeeId, FeeStatus, RecordPayment};
pub use fees_page::{get_fees_page, status_badge, student_record_notice};
pub use pay_endpoint::record_payment_endpoint;
pub use pay_page::get_pay_fee_page;
