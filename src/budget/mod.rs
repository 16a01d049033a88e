//! Spending limits per expense category and the pages for managing them.

mod budgets_section;
mod create_endpoint;
mod create_page;
mod db;
mod delete_endpoint;
mod domain;

pub use budgets_section::budgets_section;
pub use create_endpoint::create_budget_endpoint;
pub use create_page::get_create_budget_page;
pub use db::{create_budget, create_budget_table, get_budgets};
pub use delete_endpoint::delete_budget_endpoint;
pub use domain::{Budget, BudgetId, BudgetPeriod, SetBudget};
