//! Landing, about and category pages.

pub mod routes;

pub use routes::routes;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub title: &'static str,
    pub url_name: &'static str,
    pub url: &'static str,
}

/// Site-wide context every page is rendered with.
#[derive(Debug, Clone, Serialize)]
pub struct SiteInfo {
    pub title: String,
    pub menu: Vec<MenuItem>,
}

impl SiteInfo {
    pub fn new(title: String) -> Self {
        Self {
            title,
            menu: vec![
                MenuItem {
                    title: "Home",
                    url_name: "index",
                    url: "/",
                },
                MenuItem {
                    title: "About",
                    url_name: "about",
                    url: "/about/",
                },
                MenuItem {
                    title: "Catalog",
                    url_name: "catalog",
                    url: "/cards/",
                },
            ],
        }
    }
}
