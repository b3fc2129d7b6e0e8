//! Storyshelf circulation server
//!
//! A multi-tenant classroom library tracker: organizations catalogue books
//! and copies, lend them to anonymous child readers identified by three
//! emoji, and keep each reader's journal of books read.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
pub mod services;
pub mod tenant;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use tenant::TenantScope;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build services over `store` and wrap them with the configuration
    pub fn new(config: AppConfig, store: Arc<dyn repository::RecordStore>) -> AppResult<Self> {
        let services = services::Services::new(store, &config)?;
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services),
        })
    }
}
