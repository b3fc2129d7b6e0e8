//! Business logic services

pub mod catalog;
pub mod children;
pub mod circulation;
pub mod import;
pub mod isbn;
pub mod journal;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::RecordStore};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub store: Arc<dyn RecordStore>,
    pub circulation: circulation::CirculationService,
    pub children: children::ChildrenService,
    pub catalog: catalog::CatalogService,
    pub journal: journal::JournalService,
    pub import: import::ImportService,
    pub isbn: isbn::IsbnService,
}

impl Services {
    /// Create all services over one shared record store
    pub fn new(store: Arc<dyn RecordStore>, config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            circulation: circulation::CirculationService::new(store.clone()),
            children: children::ChildrenService::new(store.clone(), &config.identity),
            catalog: catalog::CatalogService::new(store.clone()),
            journal: journal::JournalService::new(store.clone()),
            import: import::ImportService::new(store.clone()),
            isbn: isbn::IsbnService::new(&config.isbn)?,
            store,
        })
    }
}

/// Trimmed value, or `None` when absent or blank
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
