//! The public landing page.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};

use crate::{auth::get_token_from_cookies, endpoints, html::base};

const FEATURES: [(&str, &str); 3] = [
    (
        "Fee management",
        "Track tuition and other fees, record payments and see what is still outstanding.",
    ),
    (
        "Expense tracking",
        "Record what you spend on books, food and transport by category.",
    ),
    (
        "Budgets",
        "Set spending limits per category and see how much of each you have used.",
    ),
];

fn landing_view() -> Markup {
    let content = html! {
        main class="flex flex-col items-center px-6 py-16 mx-auto text-gray-900 dark:text-white"
        {
            section class="max-w-screen-md text-center space-y-6"
            {
                h1 class="text-4xl md:text-5xl font-extrabold tracking-tight" { "EduFinX" }

                p class="text-lg text-gray-500 dark:text-gray-400"
                {
                    "Keep on top of student fees, everyday expenses and budgets in one place."
                }

                div class="flex justify-center gap-4"
                {
                    a
                        href=(endpoints::REGISTER_VIEW)
                        class="px-5 py-2.5 rounded text-white bg-blue-600 hover:bg-blue-700"
                    {
                        "Get started"
                    }
                    a
                        href=(endpoints::LOG_IN_VIEW)
                        class="px-5 py-2.5 rounded border border-gray-300 dark:border-gray-600 hover:bg-gray-100 dark:hover:bg-gray-800"
                    {
                        "Log in"
                    }
                }
            }

            ul id="features" class="grid grid-cols-1 md:grid-cols-3 gap-6 mt-12 max-w-screen-lg"
            {
                @for (title, description) in FEATURES {
                    li class="rounded-lg border border-gray-200 bg-white p-6 dark:border-gray-700 dark:bg-gray-800"
                    {
                        h2 class="text-lg font-semibold" { (title) }
                        p class="mt-2 text-sm text-gray-500 dark:text-gray-400" { (description) }
                    }
                }
            }
        }
    };

    base("Welcome", &[], &content)
}

/// Show the landing page, or send users with a valid session to the dashboard.
pub async fn get_landing_page(jar: PrivateCookieJar) -> Response {
    if get_token_from_cookies(&jar).is_ok() {
        return Redirect::to(endpoints::DASHBOARD_VIEW).into_response();
    }

    landing_view().into_response()
}
