//! ISBN lookup against the OpenLibrary books API

use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::{
    config::IsbnConfig,
    error::{AppError, AppResult},
    models::book::{BookLookup, BookLookupMetadata},
};

static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\d{9}[\dX]|\d{13})$").expect("valid isbn regex"));

/// Strip separators and upper-case a check digit `x`. `None` unless the
/// result looks like an ISBN-10 or ISBN-13.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    ISBN_RE.is_match(&cleaned).then_some(cleaned)
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Cover {
    small: Option<String>,
    medium: Option<String>,
    large: Option<String>,
}

/// The parts of an OpenLibrary `jscmd=data` record we use
#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<Named>,
    cover: Option<Cover>,
    #[serde(default)]
    publishers: Vec<Named>,
    publish_date: Option<String>,
    number_of_pages: Option<u32>,
    #[serde(default)]
    subjects: Vec<Named>,
}

impl OpenLibraryBook {
    fn into_lookup(self, isbn: &str) -> BookLookup {
        let cover = self.cover.unwrap_or_default();
        BookLookup {
            title: self.title.unwrap_or_default(),
            authors: self.authors.into_iter().map(|a| a.name).collect(),
            isbn: isbn.to_string(),
            cover_url: cover.large.or(cover.medium).or(cover.small),
            metadata: BookLookupMetadata {
                publisher: self.publishers.into_iter().next().map(|p| p.name),
                publish_date: self.publish_date,
                number_of_pages: self.number_of_pages,
                subjects: self.subjects.into_iter().map(|s| s.name).collect(),
            },
        }
    }
}

#[derive(Clone)]
pub struct IsbnService {
    client: reqwest::Client,
    base_url: String,
}

impl IsbnService {
    pub fn new(config: &IsbnConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("storyshelf-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up bibliographic data for an ISBN
    pub async fn lookup(&self, raw: &str) -> AppResult<BookLookup> {
        let isbn = normalize_isbn(raw)
            .ok_or_else(|| AppError::validation("isbn", "Not a valid ISBN-10 or ISBN-13"))?;
        let bibkey = format!("ISBN:{}", isbn);

        tracing::debug!("Looking up {} on {}", bibkey, self.base_url);
        let response = self
            .client
            .get(format!("{}/api/books", self.base_url))
            .query(&[("bibkeys", bibkey.as_str()), ("format", "json"), ("jscmd", "data")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("ISBN lookup for {} failed: {}", isbn, e);
                AppError::Upstream(format!("ISBN provider unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            tracing::warn!("ISBN provider answered {} for {}", response.status(), isbn);
            return Err(AppError::Upstream(format!(
                "ISBN provider returned {}",
                response.status()
            )));
        }

        let mut records: HashMap<String, OpenLibraryBook> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Unreadable ISBN provider response: {}", e)))?;

        records
            .remove(&bibkey)
            .map(|book| book.into_lookup(&isbn))
            .ok_or_else(|| AppError::NotFound(format!("No book found for ISBN {}", isbn)))
    }
}
