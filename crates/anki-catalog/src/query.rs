//! Sorting and search parameters of the catalog listing.

use serde::Serialize;

/// Columns the catalog may be sorted by.
///
/// Anything outside this list falls back to [`SortField::UploadDate`], so raw
/// query-string input never reaches the `ORDER BY` clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// When the card was uploaded.
    #[default]
    UploadDate,
    /// Question text, alphabetically.
    Question,
}

impl SortField {
    /// Parse a `sort` parameter, falling back to the default on unknown input.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "question" => Self::Question,
            _ => Self::UploadDate,
        }
    }

    /// Parameter name as it appears in the query string.
    pub const fn key(self) -> &'static str {
        match self {
            Self::UploadDate => "upload_date",
            Self::Question => "question",
        }
    }

    /// Quoted SQL column for the `"Cards"` table aliased as `c`.
    pub const fn column(self) -> &'static str {
        match self {
            Self::UploadDate => r#"c."UploadDate""#,
            Self::Question => r#"c."Question""#,
        }
    }
}

/// Direction of the catalog ordering. Newest first unless asked otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Only the literal `asc` sorts ascending; every other value is descending.
    pub fn parse(raw: &str) -> Self {
        if raw == "asc" { Self::Asc } else { Self::Desc }
    }

    /// Parameter value as it appears in the query string.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// SQL keyword for `ORDER BY`.
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Parsed catalog listing parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    /// Column to sort by.
    pub sort: SortField,
    /// Sort direction.
    pub order: SortOrder,
    /// Trimmed search text, `None` when nothing was typed.
    pub search: Option<String>,
}

impl CatalogQuery {
    /// Parse the raw `sort`, `order` and `search_query` parameters. Never fails.
    pub fn new(sort: Option<&str>, order: Option<&str>, search: Option<&str>) -> Self {
        Self {
            sort: sort.map(SortField::parse).unwrap_or_default(),
            order: order.map(SortOrder::parse).unwrap_or_default(),
            search: search
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        }
    }

    /// Ordering key with a leading `-` for descending order, e.g. `-upload_date`.
    pub fn order_by_key(&self) -> String {
        match self.order {
            SortOrder::Asc => self.sort.key().to_owned(),
            SortOrder::Desc => format!("-{}", self.sort.key()),
        }
    }

    /// Inverse of [`CatalogQuery::order_by_key`].
    pub fn parse_order_by(raw: &str) -> (SortField, SortOrder) {
        match raw.strip_prefix('-') {
            Some(field) => (SortField::parse(field), SortOrder::Desc),
            None => (SortField::parse(raw), SortOrder::Asc),
        }
    }

    /// `ORDER BY` body. `"CardID"` breaks ties so pages stay stable.
    pub fn order_by_sql(&self) -> String {
        let dir = self.order.sql();
        format!(r#"{} {dir}, c."CardID" {dir}"#, self.sort.column())
    }

    /// `ILIKE` pattern for the search text, if any.
    pub fn pattern(&self) -> Option<String> {
        self.search.as_deref().map(search_pattern)
    }
}

/// Build a case-insensitive substring pattern for `ILIKE ... ESCAPE '\'`.
pub fn search_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.trim().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
