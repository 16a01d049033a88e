use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base, log_in_register},
};

fn forgot_password_content() -> Markup {
    html! {
        div class="space-y-4 text-gray-900 dark:text-white"
        {
            p class="text-justify"
            {
                "Passwords are reset by whoever runs this server. From the directory
                the server runs in, run the "
                code { "reset_password" }
                " program and point it at the database file and your email address:"
            }

            pre class="p-3 overflow-x-auto text-sm rounded bg-gray-100 dark:bg-gray-700"
            {
                code { "reset_password --db-path <file> --email <email>" }
            }

            p
            {
                "Once your password has been reset, "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "log in here" }
                "."
            }
        }
    }
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    let content = log_in_register("Forgot your password?", &forgot_password_content());

    base("Forgot Password", &[], &content).into_response()
}
