//! The budgets section of the expenses page.

use maud::{Markup, html};

use crate::{
    Error,
    aggregation::{BudgetOverview, budget_overview},
    budget::domain::{Budget, consumption},
    category::{ExpenseCategory, find_expense_category},
    currency::{Currency, format_currency},
    endpoints::{self, format_endpoint},
    expense::Expense,
    html::{
        CARD_STYLE, LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        delete_action_button, format_percentage, progress_bar,
    },
};

fn overview_card(overview: &BudgetOverview, currency: Currency) -> Markup {
    html! {
        div id="budget-overview" class=(CARD_STYLE)
        {
            h3 class="text-sm text-gray-500 dark:text-gray-400" { "Budget Overview" }

            div class="flex justify-between mt-2 tabular-nums"
            {
                span { "Spent " (format_currency(overview.total_spent, currency)) }
                span { "of " (format_currency(overview.total_budget, currency)) }
            }

            div class="mt-2" { (progress_bar(overview.usage_or_zero())) }

            p class="mt-1 text-sm"
            {
                @match overview.usage {
                    Some(usage) => { (format_percentage(usage)) " used" }
                    None => { "No budgets set" }
                }
            }
        }
    }
}

fn budget_row(
    budget: &Budget,
    expenses: &[Expense],
    categories: &[ExpenseCategory],
    currency: Currency,
) -> Markup {
    let category_name = find_expense_category(categories, budget.category_id)
        .map(|category| category.name.as_str())
        .unwrap_or("Unknown");
    let delete_url = format_endpoint(endpoints::DELETE_BUDGET, budget.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-budget-id=(budget.id)
        {
            th
                scope="row"
                class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (category_name)
            }
            td class="px-6 py-4 text-right tabular-nums" { (format_currency(budget.amount.value(), currency)) }
            td class=(TABLE_CELL_STYLE) { (budget.period) }

            @match consumption(budget, expenses) {
                Ok(used) => {
                    td class="px-6 py-4 text-right tabular-nums" { (format_currency(used.spent, currency)) }
                    td class="px-6 py-4 min-w-32"
                    {
                        (progress_bar(used.bar_width()))
                        span class="text-xs" { (format_percentage(used.percentage)) " used" }
                    }
                }
                Err(error) => {
                    td colspan="2" class="px-6 py-4 text-red-500" data-budget-error
                    {
                        (error)
                    }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                time datetime=(budget.start_date) { (budget.start_date) }
                " to "
                time datetime=(budget.end_date) { (budget.end_date) }
            }
            td class=(TABLE_CELL_STYLE)
            {
                (delete_action_button(
                    &delete_url,
                    &format!("Are you sure you want to delete the {category_name} budget?"),
                    "closest tr",
                    "delete"
                ))
            }
        }
    }
}

/// The budget overview card followed by a table comparing each budget to
/// the expenses in its category.
///
/// # Errors
///
/// Returns [Error::AmountOverflow] if the overview totals do not fit in a decimal.
pub fn budgets_section(
    budgets: &[Budget],
    expenses: &[Expense],
    categories: &[ExpenseCategory],
    currency: Currency,
) -> Result<Markup, Error> {
    let overview = budget_overview(budgets, expenses)?;

    Ok(html! {
        section id="budgets" class="w-full space-y-4"
        {
            header class="flex justify-between flex-wrap items-end"
            {
                h2 class="text-lg font-bold" { "Budgets" }
                a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE) { "Set Budget" }
            }

            (overview_card(&overview, currency))

            div class="w-full overflow-x-auto dark:bg-gray-800"
            {
                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                            th scope="col" class="px-6 py-3 text-right" { "Limit" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Period" }
                            th scope="col" class="px-6 py-3 text-right" { "Spent (all time)" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Usage" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Dates" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for budget in budgets {
                            (budget_row(budget, expenses, categories, currency))
                        }

                        @if budgets.is_empty() {
                            tr
                            {
                                td colspan="7" class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                {
                                    "No budgets yet."
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod budgets_section_tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        Error, UserID,
        budget::domain::{Budget, BudgetPeriod},
        category::ExpenseCategory,
        currency::Currency,
        expense::Expense,
        money::Amount,
        payment_method::PaymentMethod,
    };

    use super::budgets_section;

    fn books() -> ExpenseCategory {
        ExpenseCategory {
            id: 1,
            name: "Books & Supplies".to_owned(),
            description: None,
            color: "#3b82f6".to_owned(),
        }
    }

    fn budget(id: i64, amount: i64) -> Budget {
        Budget {
            id,
            category_id: 1,
            amount: Amount::new_unchecked(Decimal::from(amount)),
            period: BudgetPeriod::Monthly,
            start_date: date!(2025 - 01 - 01),
            end_date: date!(2025 - 01 - 31),
            created_by: UserID::new(1),
        }
    }

    fn expense(amount: i64) -> Expense {
        Expense {
            id: 1,
            title: "Textbook".to_owned(),
            description: None,
            category_id: 1,
            amount: Amount::new_unchecked(Decimal::from(amount)),
            date: date!(2025 - 01 - 10),
            payment_method: PaymentMethod::Cash,
            created_by: UserID::new(1),
        }
    }

    fn render(budgets: &[Budget], expenses: &[Expense]) -> Html {
        Html::parse_fragment(
            &budgets_section(budgets, expenses, &[books()], Currency::Inr)
                .unwrap()
                .into_string(),
        )
    }

    #[test]
    fn overspent_budget_shows_full_bar_and_real_percentage() {
        let html = render(&[budget(1, 1000)], &[expense(1250)]);

        let row_text: String = html
            .select(&Selector::parse("tbody tr").unwrap())
            .flat_map(|row| row.text())
            .collect();
        assert!(row_text.contains("125.0% used"), "got {row_text}");

        let bar = html
            .select(&Selector::parse("tbody [role=progressbar]").unwrap())
            .next()
            .expect("no progress bar");
        assert_eq!(bar.value().attr("aria-valuenow"), Some("100"));
    }

    #[test]
    fn zero_budget_shows_error_instead_of_usage() {
        let html = render(&[budget(7, 0)], &[expense(10)]);

        let error = html
            .select(&Selector::parse("td[data-budget-error]").unwrap())
            .next()
            .expect("no error cell");
        let text: String = error.text().collect();
        assert_eq!(text, "budget 7 has a limit of zero");
    }

    #[test]
    fn no_budgets_shows_empty_overview() {
        let html = render(&[], &[expense(10)]);

        let overview: String = html
            .select(&Selector::parse("#budget-overview").unwrap())
            .flat_map(|card| card.text())
            .collect();
        assert!(overview.contains("No budgets set"), "got {overview}");
    }

    #[test]
    fn usage_too_large_to_calculate_is_an_error() {
        let tiny_budget = Budget {
            amount: Amount::new_unchecked(Decimal::new(1, 2)),
            ..budget(1, 1)
        };
        let huge_expense = Expense {
            amount: Amount::new_unchecked(Decimal::from_i128_with_scale(10_i128.pow(27), 0)),
            ..expense(1)
        };

        let result = budgets_section(&[tiny_budget], &[huge_expense], &[books()], Currency::Inr);

        assert_eq!(result.err(), Some(Error::AmountOverflow));
    }
}
