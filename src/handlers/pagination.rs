use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::{Document, FindOptions};
use crate::error::ApiError;

/// `?limit=` / `?page=&size=` as sent by the client; numbers stay strings so
/// blank values read as absent instead of failing the whole extractor
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

/// Listing mode selected by the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Bare array of at most `n` newest items
    Limit(u64),
    /// `{count, result}` envelope holding one page
    Page(Page),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    /// No size means no paging at all
    pub size: Option<u64>,
}

impl Page {
    pub fn skip(&self) -> u64 {
        self.size
            .map(|size| self.page.saturating_mul(size))
            .unwrap_or(0)
    }

    /// Newest-first options covering this page
    pub fn find_options(&self) -> FindOptions {
        match self.size {
            Some(size) => FindOptions::newest_first().skip(self.skip()).limit(size),
            None => FindOptions::newest_first(),
        }
    }
}

impl PageQuery {
    /// A positive `limit` wins over page/size
    pub fn mode(&self) -> Result<ListMode, ApiError> {
        match parse_number("limit", self.limit.as_deref())? {
            Some(limit) if limit > 0 => Ok(ListMode::Limit(limit)),
            _ => Ok(ListMode::Page(self.page()?)),
        }
    }

    pub fn page(&self) -> Result<Page, ApiError> {
        Ok(Page {
            page: parse_number("page", self.page.as_deref())?.unwrap_or(0),
            size: parse_number("size", self.size.as_deref())?,
        })
    }
}

fn parse_number(name: &str, raw: Option<&str>) -> Result<Option<u64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("'{}' must be a non-negative integer", name))),
    }
}

/// Listing envelope used by page mode
#[derive(Debug, Serialize)]
pub struct Listing {
    pub count: u64,
    pub result: Vec<Document>,
}

/// Mean `user_rating` over `count` reviews; 0 when there are none.
/// Missing or non-numeric ratings count as 0.
pub fn average_rating(reviews: &[Document], count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = reviews
        .iter()
        .map(|review| review.get("user_rating").and_then(Value::as_f64).unwrap_or(0.0))
        .sum();
    let average = sum / count as f64;
    if average.is_finite() {
        average
    } else {
        0.0
    }
}
