//! Catalog logic for the flashcard service
//!
//! This crate holds the pieces of the catalog that do not touch the database:
//! turning user-supplied sort/order/search parameters into a safe query plan,
//! paginating a result set, and parsing the free-text tag list of the card form.

#![warn(missing_docs)]

pub mod display;
pub mod paginate;
pub mod query;
pub mod tags;

pub use paginate::{ADMIN_PAGE_SIZE, CATALOG_PAGE_SIZE, Page, Paginator};
pub use query::{CatalogQuery, SortField, SortOrder, search_pattern};
pub use tags::{MAX_TAG_LENGTH, parse_tag_names};
