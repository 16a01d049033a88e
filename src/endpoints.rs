//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/fees/{fee_id}/pay', use [format_endpoint].

/// The landing page, which redirects logged in users to the dashboard.
pub const ROOT: &str = "/";
/// The home page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing a student's fees.
pub const FEES_VIEW: &str = "/fees";
/// The page for creating a new fee.
pub const NEW_FEE_VIEW: &str = "/fees/new";
/// The page for recording a payment against a fee.
pub const PAY_FEE_VIEW: &str = "/fees/{fee_id}/pay";
/// The page for listing expenses and budgets.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for creating a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page for creating a new budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page for editing the user's profile and student record.
pub const PROFILE_VIEW: &str = "/profile";
/// The page for editing the user's preferences.
pub const SETTINGS_VIEW: &str = "/settings";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create a fee.
pub const FEES_API: &str = "/api/fees";
/// The route to delete a fee.
pub const DELETE_FEE: &str = "/api/fees/{fee_id}";
/// The route to record a payment against a fee.
pub const FEE_PAYMENTS: &str = "/api/fees/{fee_id}/payments";
/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to update or delete an expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to create a budget.
pub const BUDGETS_API: &str = "/api/budgets";
/// The route to delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to save the user's profile and student record.
pub const PROFILE_API: &str = "/api/profile";
/// The route to save the user's preferences.
pub const SETTINGS_API: &str = "/api/settings";
/// The route to request the deletion of the user's account.
pub const DELETE_ACCOUNT: &str = "/api/settings/delete_account";
/// The route to download the user's fees as CSV.
pub const EXPORT_FEES: &str = "/api/export/fees";
/// The route to download the user's expenses as CSV.
pub const EXPORT_EXPENSES: &str = "/api/export/expenses";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/fees/{fee_id}/pay', '{fee_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
