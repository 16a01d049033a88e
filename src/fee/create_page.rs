//! Defines the route handler for the page for creating a fee.

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
    category::{FeeCategory, get_fee_categories},
    endpoints,
    fee::{domain::FeeForm, fees_page::student_record_notice},
    html::{FORM_CONTAINER_STYLE, InputField, base, form_error, link, select_input, submit_button},
    navigation::NavBar,
    profile::get_student_for_user,
};

/// The state needed to create a fee.
#[derive(Debug, Clone)]
pub struct CreateFeeState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateFeeState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub(super) fn fee_form(
    form: &FeeForm,
    categories: &[FeeCategory],
    error_message: Option<&str>,
) -> Markup {
    let category_options: Vec<_> = categories
        .iter()
        .map(|category| (category.id.to_string(), category.name.clone()))
        .collect();

    html! {
        form
            hx-post=(endpoints::FEES_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            (form_error(error_message))

            (select_input("Category", "category_id", &category_options, &form.category_id, Some("Select a category")))
            (InputField::required("Amount", "amount", "number", &form.amount).into_html())
            (InputField::required("Due Date", "due_date", "date", &form.due_date).into_html())
            (InputField::optional("Notes", "notes", &form.notes).into_html())

            (submit_button("Add Fee"))
        }
    }
}

fn create_fee_view(content: Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::FEES_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full space-y-4"
            {
                h1 class="text-xl font-bold" { "Add Fee" }

                (content)

                p class="text-sm" { (link(endpoints::FEES_VIEW, "Back to fees")) }
            }
        }
    };

    base("Add Fee", &[], &content)
}

/// Renders the page for creating a fee.
pub async fn get_create_fee_page(
    State(state): State<CreateFeeState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    match get_student_for_user(user_id, &connection) {
        Ok(_) => {}
        Err(Error::StudentRecordMissing) => {
            return Ok(create_fee_view(student_record_notice()).into_response());
        }
        Err(error) => {
            tracing::error!("could not get student record for user {user_id}: {error}");
            return Err(error);
        }
    }

    let categories = get_fee_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get fee categories: {error}"))?;

    Ok(create_fee_view(fee_form(&FeeForm::default(), &categories, None)).into_response())
}

#[cfg(test)]
mod create_fee_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        db::initialize,
        endpoints,
        profile::save_profile,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, insert_test_user, must_get_form, parse_html_document, test_profile,
        },
    };

    use super::{CreateFeeState, get_create_fee_page};

    fn get_test_state() -> CreateFeeState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateFeeState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn renders_fee_form() {
        let state = get_test_state();
        let user_id = {
            let connection = state.db_connection.lock().unwrap();
            let user_id = insert_test_user(&connection, "a@example.com");
            save_profile(user_id, &test_profile("a@example.com"), &connection).unwrap();
            user_id
        };

        let response = get_create_fee_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);
        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::FEES_API, "hx-post");
        assert_form_input(&form, "amount", "number");
        assert_form_input(&form, "due_date", "date");
        assert_form_submit_button_with_text(&form, "Add Fee");
        let options = form
            .select(&Selector::parse("select[name=category_id] option").unwrap())
            .count();
        // Five default categories plus the placeholder.
        assert_eq!(options, 6);
    }

    #[tokio::test]
    async fn user_without_student_record_gets_notice_instead_of_form() {
        let state = get_test_state();
        let user_id = insert_test_user(&state.db_connection.lock().unwrap(), "a@example.com");

        let response = get_create_fee_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_eq!(document.select(&Selector::parse("form").unwrap()).count(), 0);
        assert_eq!(
            document
                .select(&Selector::parse("#student-record-required").unwrap())
                .count(),
            1
        );
    }
}
