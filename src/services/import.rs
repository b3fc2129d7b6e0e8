//! Bulk catalogue import from CSV
//!
//! Expected header: `title,authors,isbn,copies` (column order free, only
//! `title` required). Authors are separated by `;`. Every row is imported on
//! its own; a bad row is reported and skipped.

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::NewBook,
        copy::{CopyStatus, NewCopy},
        import_report::{CsvImportRequest, ImportReport},
    },
    repository::RecordStore,
    tenant::TenantScope,
};

/// Upper bound on copies created from one row
pub const MAX_COPIES_PER_ROW: u32 = 100;

const UNKNOWN_AUTHOR: &str = "Unknown";

/// A parsed, not yet stored, CSV row
#[derive(Debug, Clone, PartialEq)]
struct ImportRow {
    title: String,
    authors: Vec<String>,
    isbn: Option<String>,
    copies: u32,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    title: usize,
    authors: Option<usize>,
    isbn: Option<usize>,
    copies: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> AppResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));
        Ok(Self {
            title: find("title").ok_or_else(|| AppError::validation("csv", "Missing 'title' column"))?,
            authors: find("authors"),
            isbn: find("isbn"),
            copies: find("copies"),
        })
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<ImportRow, String> {
        let field = |index: Option<usize>| {
            index
                .and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let title = field(Some(self.title)).ok_or("Missing title")?.to_string();

        let mut authors: Vec<String> = field(self.authors)
            .map(|a| {
                a.split(';')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if authors.is_empty() {
            authors.push(UNKNOWN_AUTHOR.to_string());
        }

        let copies = match field(self.copies) {
            None => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n <= MAX_COPIES_PER_ROW)
                .ok_or_else(|| format!("Invalid copies '{}' (expected 0 to {})", raw, MAX_COPIES_PER_ROW))?,
        };

        Ok(ImportRow {
            title,
            authors,
            isbn: field(self.isbn).map(String::from),
            copies,
        })
    }
}

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn RecordStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Import books and their copies. Only a malformed document fails the
    /// whole call; row problems end up in the report.
    pub async fn import_csv(&self, scope: &TenantScope, request: CsvImportRequest) -> AppResult<ImportReport> {
        request.validate()?;

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(request.csv.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::validation("csv", format!("Unreadable header: {}", e)))?
            .clone();
        let columns = Columns::from_headers(&headers)?;

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let line = record
                .as_ref()
                .ok()
                .and_then(|r| r.position())
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);
            let parsed = record
                .map_err(|e| format!("Unreadable row: {}", e))
                .and_then(|r| columns.parse(&r));
            rows.push((line, parsed));
        }
        if rows.is_empty() {
            return Err(AppError::validation("csv", "CSV must have a header and at least one data row"));
        }

        let mut report = ImportReport::default();
        for (line, parsed) in rows {
            let row = match parsed {
                Ok(row) => row,
                Err(message) => {
                    report.failed += 1;
                    report.errors.push(format!("Line {}: {}", line, message));
                    continue;
                }
            };

            match self.import_row(scope, &row).await {
                Ok(None) => report.success += 1,
                Ok(Some(copy_error)) => {
                    report.success += 1;
                    report
                        .errors
                        .push(format!("Line {}: Book created but copies failed: {}", line, copy_error));
                }
                Err(e) => {
                    report.failed += 1;
                    report.errors.push(format!("Line {}: {}", line, e));
                }
            }
        }

        tracing::info!(
            "CSV import (org {}): {} imported, {} failed",
            scope,
            report.success,
            report.failed
        );
        Ok(report)
    }

    /// Store the book, then its copies. A copy failure after the book was
    /// stored is returned as `Ok(Some(_))`.
    async fn import_row(&self, scope: &TenantScope, row: &ImportRow) -> AppResult<Option<AppError>> {
        let book = self
            .store
            .insert_book(
                scope,
                &NewBook {
                    title: row.title.clone(),
                    authors: row.authors.clone(),
                    isbn: row.isbn.clone(),
                    cover_url: None,
                    metadata: serde_json::json!({}),
                },
            )
            .await?;

        let copy = NewCopy {
            book_id: book.id,
            location_id: None,
            barcode: None,
            status: CopyStatus::Available,
            notes: None,
        };
        for _ in 0..row.copies {
            if let Err(e) = self.store.insert_copy(scope, &copy).await {
                return Ok(Some(e));
            }
        }
        Ok(None)
    }
}
