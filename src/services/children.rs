//! Child reader registration and identifier management

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::non_blank;
use crate::{
    config::IdentityConfig,
    error::{AppError, AppResult, FieldErrors},
    identity::IdentityAllocator,
    models::child::{Child, ChildChanges, CreateChild, NewChild, UpdateChild},
    repository::RecordStore,
    tenant::TenantScope,
};

#[derive(Clone)]
pub struct ChildrenService {
    store: Arc<dyn RecordStore>,
    allocator: IdentityAllocator,
    max_attempts: usize,
    registration_retries: u32,
}

impl ChildrenService {
    pub fn new(store: Arc<dyn RecordStore>, config: &IdentityConfig) -> Self {
        Self {
            store,
            allocator: IdentityAllocator::default(),
            max_attempts: config.max_attempts,
            registration_retries: config.registration_retries,
        }
    }

    /// Replace the symbol pool (tests use tiny pools to force collisions)
    pub fn with_allocator(mut self, allocator: IdentityAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub async fn list(&self, scope: &TenantScope) -> AppResult<Vec<Child>> {
        self.store.list_children(scope).await
    }

    pub async fn get(&self, scope: &TenantScope, id: Uuid) -> AppResult<Child> {
        self.store.get_child(scope, id).await
    }

    /// Register a child under a freshly allocated identifier.
    ///
    /// The snapshot used for allocation can go stale before the insert; a
    /// lost race comes back as `Conflict` and is retried against a fresh
    /// snapshot up to `registration_retries` times.
    pub async fn register(&self, scope: &TenantScope, request: CreateChild) -> AppResult<Child> {
        request.validate()?;
        let name = non_blank(request.name);
        let grade_or_class = non_blank(request.grade_or_class);

        let mut retries = 0;
        loop {
            let existing = self.store.active_emoji_ids(scope, None).await?;
            let emoji_id = self.allocator.generate_unique(&existing, self.max_attempts)?;
            let child = NewChild {
                emoji_id,
                name: name.clone(),
                grade_or_class: grade_or_class.clone(),
            };

            match self.store.insert_child(scope, &child).await {
                Ok(child) => {
                    tracing::info!("Registered reader {} (org {})", child.id, scope);
                    return Ok(child);
                }
                Err(AppError::Conflict(msg)) if retries < self.registration_retries => {
                    retries += 1;
                    tracing::debug!(
                        "Identifier taken concurrently, retry {}/{}: {}",
                        retries,
                        self.registration_retries,
                        msg
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Update a child's identifier and/or descriptive fields.
    ///
    /// `regenerate_emoji` draws a new identifier; `custom_emoji_id` installs a
    /// chosen one after format and uniqueness checks. The two are exclusive.
    pub async fn update(&self, scope: &TenantScope, id: Uuid, request: UpdateChild) -> AppResult<Child> {
        let regenerate = request.regenerate_emoji.unwrap_or(false);
        let custom = non_blank(request.custom_emoji_id.clone());
        let name = non_blank(request.name.clone());
        let grade_or_class = non_blank(request.grade_or_class.clone());

        let mut errors = FieldErrors::from_validation(request.validate());
        match (regenerate, &custom) {
            (true, Some(_)) => {
                errors.push("regenerate_emoji", "Choose either regenerate_emoji or custom_emoji_id");
                errors.push("custom_emoji_id", "Choose either regenerate_emoji or custom_emoji_id");
            }
            (false, None) if name.is_none() && grade_or_class.is_none() => {
                errors.push("regenerate_emoji", "Nothing to update");
                errors.push("custom_emoji_id", "Nothing to update");
            }
            (false, Some(candidate)) if !self.allocator.is_valid_format(candidate) => {
                errors.push(
                    "custom_emoji_id",
                    "Identifier must be exactly three symbols from the emoji pool",
                );
            }
            _ => {}
        }
        errors.into_result()?;

        let current = self.store.get_child(scope, id).await?;
        let changes = ChildChanges {
            emoji_id: None,
            name,
            grade_or_class,
        };

        if regenerate {
            return self.regenerate(scope, id, changes).await;
        }

        let emoji_id = match custom {
            Some(candidate) if candidate != current.emoji_id => {
                let existing = self.store.active_emoji_ids(scope, Some(id)).await?;
                if !self.allocator.is_unique(&candidate, &existing) {
                    return Err(AppError::Conflict("Identifier already in use".to_string()));
                }
                Some(candidate)
            }
            _ => None,
        };

        let child = self
            .store
            .update_child(scope, id, &ChildChanges { emoji_id, ..changes }, Utc::now())
            .await?;
        tracing::info!("Updated reader {} (org {})", child.id, scope);
        Ok(child)
    }

    async fn regenerate(&self, scope: &TenantScope, id: Uuid, changes: ChildChanges) -> AppResult<Child> {
        let mut retries = 0;
        loop {
            let existing = self.store.active_emoji_ids(scope, Some(id)).await?;
            let emoji_id = self.allocator.generate_unique(&existing, self.max_attempts)?;
            let attempt = ChildChanges {
                emoji_id: Some(emoji_id),
                ..changes.clone()
            };

            match self.store.update_child(scope, id, &attempt, Utc::now()).await {
                Ok(child) => {
                    tracing::info!("Regenerated identifier of reader {} (org {})", child.id, scope);
                    return Ok(child);
                }
                Err(AppError::Conflict(_)) if retries < self.registration_retries => retries += 1,
                Err(e) => return Err(e),
            }
        }
    }

    /// Soft delete; the identifier becomes free for reuse.
    pub async fn delete(&self, scope: &TenantScope, id: Uuid) -> AppResult<()> {
        self.store.soft_delete_child(scope, id, Utc::now()).await?;
        tracing::info!("Deleted reader {} (org {})", id, scope);
        Ok(())
    }
}
