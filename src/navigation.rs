//! The tab bar that switches between the four ledgers.

use maud::{Markup, html};

use crate::{category::Category, endpoints};

/// A tab in the navigation bar.
///
/// Only one tab should be marked as current at any one time.
struct Tab {
    url: String,
    title: &'static str,
    is_current: bool,
}

impl Tab {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "inline-block px-4 py-3 text-white bg-blue-600 rounded-lg \
            dark:bg-blue-600"
        } else {
            "inline-block px-4 py-3 rounded-lg text-gray-600 hover:text-gray-900 \
            hover:bg-gray-100 dark:text-gray-300 dark:hover:bg-gray-800 \
            dark:hover:text-white"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

/// The header with one tab per [Category].
pub struct NavBar {
    tabs: Vec<Tab>,
}

impl NavBar {
    /// Get the navigation bar with the tab for `current` marked as active.
    pub fn new(current: Category) -> Self {
        let tabs = Category::ALL
            .into_iter()
            .map(|category| Tab {
                url: endpoints::ledger_view(category),
                title: category.label(),
                is_current: category == current,
            })
            .collect();

        NavBar { tabs }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/tabs/#pills-tabs
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4 gap-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                    {
                        "Bookkeeper"
                    }

                    ul
                        class="flex flex-wrap text-sm font-medium text-center gap-2"
                        aria-label="Ledgers"
                    {
                        @for tab in self.tabs {
                            li { (tab.into_html()) }
                        }
                    }
                }
            }
        )
    }
}
