//! Page/limit windows shared by list queries and verse pagination

use serde::Serialize;
use thiserror::Error;

/// Rejected page or limit value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid {name} parameter")]
    NotPositive { name: &'static str },
    #[error("Invalid {name} parameter")]
    Unparsable { name: &'static str, raw: String },
}

/// A 1-based page of `limit` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    page: u32,
    limit: u32,
}

impl PageWindow {
    /// Build a window, rejecting zero for either value
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::NotPositive { name: "page" });
        }
        if limit == 0 {
            return Err(ValidationError::NotPositive { name: "limit" });
        }
        Ok(Self { page, limit })
    }

    /// Parse optional raw query values, falling back to `default_limit`.
    ///
    /// Missing or empty strings take the default; anything else must be an
    /// integer >= 1.
    pub fn parse(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
    ) -> Result<Self, ValidationError> {
        let page = parse_positive("page", page, 1)?;
        let limit = parse_positive("limit", limit, default_limit)?;
        Self::new(page, limit)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Zero-based offset of the first item on this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

fn parse_positive(
    name: &'static str,
    raw: Option<&str>,
    default: u32,
) -> Result<u32, ValidationError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };

    let value: i64 = raw.parse().map_err(|_| ValidationError::Unparsable {
        name,
        raw: raw.to_string(),
    })?;

    if value < 1 {
        return Err(ValidationError::NotPositive { name });
    }

    u32::try_from(value).map_err(|_| ValidationError::Unparsable {
        name,
        raw: raw.to_string(),
    })
}
