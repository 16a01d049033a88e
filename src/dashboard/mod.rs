//! Dashboard module
//!
//! Provides an overview page with fee and expense totals, budget usage and
//! the most recent records.

mod cards;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
