//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_forgot_password_page, get_log_in_page, get_log_out,
        get_register_page, post_log_in, register_user,
    },
    budget::{create_budget_endpoint, delete_budget_endpoint, get_create_budget_page},
    dashboard::get_dashboard_page,
    endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, edit_expense_endpoint,
        get_create_expense_page, get_edit_expense_page, get_expenses_page,
    },
    export::{export_expenses, export_fees},
    fee::{
        create_fee_endpoint, delete_fee_endpoint, get_create_fee_page, get_fees_page,
        get_pay_fee_page, record_payment_endpoint,
    },
    internal_server_error::get_internal_server_error_page,
    landing::get_landing_page,
    not_found::get_404_not_found,
    profile::{get_profile_page, save_profile_endpoint},
    settings::{delete_account_endpoint, get_settings_page, save_settings_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_landing_page))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::FEES_VIEW, get(get_fees_page))
        .route(endpoints::NEW_FEE_VIEW, get(get_create_fee_page))
        .route(endpoints::PAY_FEE_VIEW, get(get_pay_fee_page))
        .route(endpoints::EXPENSES_VIEW, get(get_expenses_page))
        .route(endpoints::NEW_EXPENSE_VIEW, get(get_create_expense_page))
        .route(endpoints::EDIT_EXPENSE_VIEW, get(get_edit_expense_page))
        .route(endpoints::NEW_BUDGET_VIEW, get(get_create_budget_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::SETTINGS_VIEW, get(get_settings_page))
        .route(endpoints::EXPORT_FEES, get(export_fees))
        .route(endpoints::EXPORT_EXPENSES, get(export_expenses))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These routes are called by HTMX and need the HX-REDIRECT header for auth redirects to work.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::FEES_API, post(create_fee_endpoint))
            .route(endpoints::FEE_PAYMENTS, post(record_payment_endpoint))
            .route(endpoints::DELETE_FEE, delete(delete_fee_endpoint))
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .route(
                endpoints::EXPENSE,
                put(edit_expense_endpoint).delete(delete_expense_endpoint),
            )
            .route(endpoints::BUDGETS_API, post(create_budget_endpoint))
            .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint))
            .route(endpoints::PROFILE_API, put(save_profile_endpoint))
            .route(endpoints::SETTINGS_API, put(save_settings_endpoint))
            .route(endpoints::DELETE_ACCOUNT, post(delete_account_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints};

    use super::build_router;

    fn test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "42", "Etc/UTC").expect("Could not create state");

        TestServer::new(build_router(state))
    }

    #[tokio::test]
    async fn landing_page_is_public() {
        let server = test_server();

        server.get(endpoints::ROOT).await.assert_status_ok();
    }

    #[tokio::test]
    async fn pages_redirect_to_log_in_without_cookie() {
        let server = test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::FEES_VIEW,
            endpoints::EXPENSES_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            let response = server.get(page).await;

            response.assert_status(StatusCode::SEE_OTHER);
            let location = response.header("location");
            let location = location.to_str().unwrap();
            assert!(
                location.starts_with(endpoints::LOG_IN_VIEW),
                "{page} redirected to {location}"
            );
        }
    }

    #[tokio::test]
    async fn api_routes_use_hx_redirect_without_cookie() {
        let server = test_server();

        let response = server.post(endpoints::EXPENSES_API).await;

        response.assert_status_ok();
        let redirect = response.header("hx-redirect");
        assert!(
            redirect
                .to_str()
                .unwrap()
                .starts_with(endpoints::LOG_IN_VIEW)
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = test_server();

        server
            .get("/no/such/page")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
