//! The navigation bar shown at the top of every page for logged in users.

use maud::{Markup, html};

use crate::endpoints;

/// A top-level area of the app with its own entry in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Dashboard,
    Fees,
    Expenses,
    Profile,
    Settings,
}

impl Section {
    const ALL: [Section; 5] = [
        Section::Dashboard,
        Section::Fees,
        Section::Expenses,
        Section::Profile,
        Section::Settings,
    ];

    fn url(self) -> &'static str {
        match self {
            Section::Dashboard => endpoints::DASHBOARD_VIEW,
            Section::Fees => endpoints::FEES_VIEW,
            Section::Expenses => endpoints::EXPENSES_VIEW,
            Section::Profile => endpoints::PROFILE_VIEW,
            Section::Settings => endpoints::SETTINGS_VIEW,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::Fees => "Fees",
            Section::Expenses => "Expenses",
            Section::Profile => "Profile",
            Section::Settings => "Settings",
        }
    }

    /// The section that the page at `endpoint` belongs to.
    ///
    /// Budgets are managed from the expenses page, so budget pages belong to it.
    fn containing(endpoint: &str) -> Option<Section> {
        if endpoint.starts_with("/budgets") {
            return Some(Section::Expenses);
        }

        Section::ALL.into_iter().find(|section| {
            let url = section.url();
            endpoint == url || endpoint.starts_with(&format!("{url}/"))
        })
    }
}

const DESKTOP_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 lg:dark:hover:bg-transparent";
const DESKTOP_CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 dark:text-white lg:dark:text-blue-500";
const MOBILE_LINK_STYLE: &str = "flex items-center justify-center rounded-lg px-2 py-2 \
    text-xs font-semibold text-gray-600 hover:bg-blue-50/70 hover:text-blue-700 \
    dark:text-gray-300 dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const MOBILE_CURRENT_LINK_STYLE: &str = "flex items-center justify-center rounded-lg px-2 py-2 \
    text-xs font-semibold bg-blue-50 text-blue-700 shadow-sm \
    dark:bg-blue-900/30 dark:text-blue-200";

/// The navigation bar, with the section of the current page highlighted.
pub struct NavBar {
    current: Option<Section>,
}

impl NavBar {
    /// Create the navigation bar for the page at `active_endpoint`.
    ///
    /// Sub-pages such as [endpoints::PAY_FEE_VIEW] highlight their section.
    pub fn new(active_endpoint: &str) -> NavBar {
        NavBar {
            current: Section::containing(active_endpoint),
        }
    }

    pub fn into_html(self) -> Markup {
        let is_current = |section: Section| self.current == Some(section);

        // Layout adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::DASHBOARD_VIEW) class="flex items-center"
                    {
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "EduFinX"
                        }
                    }

                    ul
                        class="hidden lg:flex font-medium flex-row space-x-8 items-center"
                        aria-label="Main"
                    {
                        @for section in Section::ALL {
                            li {
                                a
                                    href=(section.url())
                                    class=(if is_current(section) { DESKTOP_CURRENT_LINK_STYLE } else { DESKTOP_LINK_STYLE })
                                    aria-current=[is_current(section).then_some("page")]
                                {
                                    (section.title())
                                }
                            }
                        }

                        li {
                            a href=(endpoints::LOG_OUT) class=(DESKTOP_LINK_STYLE) { "Log out" }
                        }
                    }

                    a
                        href=(endpoints::LOG_OUT)
                        class="lg:hidden text-sm font-medium text-gray-600 dark:text-gray-300"
                    {
                        "Log out"
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden" aria-label="Sections"
            {
                ul
                    class="grid grid-cols-5 gap-1 mx-4 mb-4 p-2 rounded-xl border border-gray-200
                    bg-white/95 shadow-lg backdrop-blur dark:border-gray-700 dark:bg-gray-900/95"
                {
                    @for section in Section::ALL {
                        li {
                            a
                                href=(section.url())
                                class=(if is_current(section) { MOBILE_CURRENT_LINK_STYLE } else { MOBILE_LINK_STYLE })
                            {
                                span class="truncate" { (section.title()) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::{NavBar, Section};

    fn current_links(active_endpoint: &str) -> Vec<String> {
        let html = NavBar::new(active_endpoint).into_html().into_string();
        let fragment = Html::parse_fragment(&html);

        fragment
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn highlights_section_of_sub_pages() {
        let cases = [
            (endpoints::DASHBOARD_VIEW, Some(Section::Dashboard)),
            (endpoints::FEES_VIEW, Some(Section::Fees)),
            (endpoints::NEW_FEE_VIEW, Some(Section::Fees)),
            (endpoints::PAY_FEE_VIEW, Some(Section::Fees)),
            (endpoints::EDIT_EXPENSE_VIEW, Some(Section::Expenses)),
            (endpoints::NEW_BUDGET_VIEW, Some(Section::Expenses)),
            (endpoints::SETTINGS_VIEW, Some(Section::Settings)),
            (endpoints::ROOT, None),
            (endpoints::LOG_IN_VIEW, None),
            (endpoints::FEES_API, None),
        ];

        for (endpoint, want) in cases {
            assert_eq!(Section::containing(endpoint), want, "endpoint {endpoint}");
        }
    }

    #[test]
    fn marks_only_current_section() {
        assert_eq!(current_links(endpoints::NEW_EXPENSE_VIEW), [endpoints::EXPENSES_VIEW]);
        assert!(current_links(endpoints::INTERNAL_ERROR_VIEW).is_empty());
    }

    #[test]
    fn links_to_log_out() {
        let html = NavBar::new(endpoints::DASHBOARD_VIEW)
            .into_html()
            .into_string();
        let fragment = Html::parse_fragment(&html);
        let selector = Selector::parse(&format!("a[href=\"{}\"]", endpoints::LOG_OUT)).unwrap();

        assert!(fragment.select(&selector).next().is_some());
    }
}
