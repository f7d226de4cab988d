//! Parameterized query construction for filtered song lookups
//!
//! Filters are collected as an ordered list of (predicate, value) pairs and
//! placeholders are numbered from each pair's position only when the query is
//! rendered, so the n-th argument always binds the n-th `?N`. Pagination
//! placeholders continue the same run.

use serde::Serialize;
use std::fmt::Write;

use super::pagination::PageWindow;

/// A value bound to a numbered placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Null,
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// Rendered SQL plus the arguments for `?1..?n`, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

impl SqlQuery {
    /// A statement with positional arguments already matching its placeholders
    pub fn new(sql: impl Into<String>, args: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }
}

/// How a filter value is compared against its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// `column = value`
    Exact,
    /// Case-insensitive (ASCII) substring match via `LIKE`; wildcards in the
    /// value are escaped and match literally
    Contains,
}

#[derive(Debug, Clone)]
struct Predicate {
    column: &'static str,
    mode: MatchMode,
    value: String,
}

/// Builder for a single `SELECT` with ANDed filters and optional pagination
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    select: String,
    predicates: Vec<Predicate>,
    order_by: Option<&'static str>,
    window: Option<PageWindow>,
}

impl QueryBuilder {
    pub fn new(select: impl Into<String>) -> Self {
        Self {
            select: select.into(),
            predicates: Vec::new(),
            order_by: None,
            window: None,
        }
    }

    /// Append one predicate
    pub fn filter(mut self, column: &'static str, mode: MatchMode, value: &str) -> Self {
        self.predicates.push(Predicate {
            column,
            mode,
            value: value.to_string(),
        });
        self
    }

    /// Append a predicate only when `value` is present and not blank.
    /// Surrounding whitespace is dropped.
    pub fn filter_opt(self, column: &'static str, mode: MatchMode, value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => self.filter(column, mode, v),
            _ => self,
        }
    }

    pub fn order_by(mut self, expr: &'static str) -> Self {
        self.order_by = Some(expr);
        self
    }

    pub fn paginate(mut self, window: PageWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }

    /// Render the SQL text and its argument list
    pub fn build(&self) -> SqlQuery {
        let mut sql = self.select.trim_end().to_string();
        let mut args = Vec::with_capacity(self.predicates.len() + 2);

        for (i, predicate) in self.predicates.iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            let index = args.len() + 1;
            match predicate.mode {
                MatchMode::Exact => {
                    let _ = write!(sql, "{} = ?{}", predicate.column, index);
                    args.push(SqlValue::Text(predicate.value.clone()));
                }
                MatchMode::Contains => {
                    let _ = write!(sql, "{} LIKE ?{} ESCAPE '\\'", predicate.column, index);
                    args.push(SqlValue::Text(format!(
                        "%{}%",
                        escape_like(&predicate.value)
                    )));
                }
            }
        }

        if let Some(order) = self.order_by {
            let _ = write!(sql, " ORDER BY {}", order);
        }

        if let Some(window) = self.window {
            let limit_index = args.len() + 1;
            let _ = write!(sql, " LIMIT ?{} OFFSET ?{}", limit_index, limit_index + 1);
            args.push(SqlValue::Integer(i64::from(window.limit())));
            // offsets past i64::MAX still select nothing instead of wrapping
            let offset = i64::try_from(window.offset()).unwrap_or(i64::MAX);
            args.push(SqlValue::Integer(offset));
        }

        SqlQuery { sql, args }
    }
}

/// Escape `LIKE` wildcards so user input matches literally under `ESCAPE '\'`
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Column expressions for filterable song fields, relative to the
/// `song s JOIN artist g` select used by the song table
pub mod columns {
    pub const ARTIST: &str = "g.name";
    pub const TITLE: &str = "s.title";
    pub const RELEASE_DATE: &str = "s.release_date";
    pub const LINK: &str = "s.link";
    pub const LYRICS: &str = "s.lyrics";
}

/// Optional song filters; blank strings count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub link: Option<String>,
    pub text: Option<String>,
}

impl SongFilter {
    /// Filter on the unique (artist, title) pair
    pub fn by_pair(artist: &str, title: &str) -> Self {
        Self {
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        [
            &self.artist,
            &self.title,
            &self.release_date,
            &self.link,
            &self.text,
        ]
        .iter()
        .all(|v| v.as_deref().map_or(true, |v| v.trim().is_empty()))
    }

    /// Append the present filters in fixed order: artist, title, release
    /// date, link, text
    pub fn apply(&self, builder: QueryBuilder, policy: MatchPolicy) -> QueryBuilder {
        builder
            .filter_opt(columns::ARTIST, policy.artist, self.artist.as_deref())
            .filter_opt(columns::TITLE, policy.title, self.title.as_deref())
            .filter_opt(
                columns::RELEASE_DATE,
                policy.release_date,
                self.release_date.as_deref(),
            )
            .filter_opt(columns::LINK, policy.link, self.link.as_deref())
            .filter_opt(columns::LYRICS, policy.text, self.text.as_deref())
    }
}

/// Match mode per song field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    pub artist: MatchMode,
    pub title: MatchMode,
    pub release_date: MatchMode,
    pub link: MatchMode,
    pub text: MatchMode,
}

impl MatchPolicy {
    /// Used by the list endpoint: substring matching, except release dates
    /// which compare exactly
    pub const DISCOVERY: MatchPolicy = MatchPolicy {
        artist: MatchMode::Contains,
        title: MatchMode::Contains,
        release_date: MatchMode::Exact,
        link: MatchMode::Contains,
        text: MatchMode::Contains,
    };

    /// Used by single-song lookups
    pub const EXACT: MatchPolicy = MatchPolicy {
        artist: MatchMode::Exact,
        title: MatchMode::Exact,
        release_date: MatchMode::Exact,
        link: MatchMode::Exact,
        text: MatchMode::Exact,
    };
}
