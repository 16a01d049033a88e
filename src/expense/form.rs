//! The form shared by the create and edit expense pages.

use maud::{Markup, html};

use crate::{
    category::ExpenseCategory,
    endpoints::{self, format_endpoint},
    expense::domain::{ExpenseForm, ExpenseId},
    html::{InputField, form_error, select_input, submit_button},
    payment_method::PaymentMethod,
};

/// Where the expense form is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ExpenseFormTarget {
    /// POST a new expense.
    Create,
    /// PUT over an existing expense.
    Edit(ExpenseId),
}

pub(super) fn expense_form(
    form: &ExpenseForm,
    categories: &[ExpenseCategory],
    target: ExpenseFormTarget,
    error_message: Option<&str>,
) -> Markup {
    let category_options: Vec<_> = categories
        .iter()
        .map(|category| (category.id.to_string(), category.name.clone()))
        .collect();
    let payment_methods: Vec<_> = PaymentMethod::ALL
        .iter()
        .map(|method| (method.as_str().to_owned(), method.label().to_owned()))
        .collect();

    let fields = html! {
        (form_error(error_message))

        (InputField::required("Title", "title", "text", &form.title).into_html())
        (InputField::optional("Description", "description", &form.description).into_html())
        (select_input("Category", "category_id", &category_options, &form.category_id, Some("Select a category")))
        (InputField::required("Amount", "amount", "number", &form.amount).into_html())
        (InputField::required("Date", "date", "date", &form.date).into_html())
        (select_input("Payment Method", "payment_method", &payment_methods, &form.payment_method, Some("Select a payment method")))
    };

    match target {
        ExpenseFormTarget::Create => html! {
            form
                hx-post=(endpoints::EXPENSES_API)
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
                (submit_button("Add Expense"))
            }
        },
        ExpenseFormTarget::Edit(expense_id) => html! {
            form
                hx-put=(format_endpoint(endpoints::EXPENSE, expense_id))
                hx-target="this"
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                (fields)
                (submit_button("Save Changes"))
            }
        },
    }
}
