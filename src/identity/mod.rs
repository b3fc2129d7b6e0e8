//! Anonymous reader identifiers
//!
//! A reader is recognized by three symbols drawn from a fixed pool, e.g.
//! "🐶🌈🎨". Identifiers are compared as whole strings, but validated symbol
//! by symbol using extended grapheme clusters: several pool symbols are more
//! than one code point long and must still count as one symbol.
//!
//! The allocator is pure. Uniqueness is only checked against the snapshot the
//! caller supplies; persisting the identifier must itself be a conditional
//! write that can fail with a conflict.

mod pool;

use std::collections::HashSet;

use rand::Rng;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, AppResult};

pub use pool::EMOJI_POOL;

/// Number of symbols in an identifier
pub const SYMBOLS_PER_ID: usize = 3;

/// Default number of draws for [`IdentityAllocator::generate_unique`]
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

/// Generates and validates reader identifiers over a fixed symbol pool
#[derive(Debug, Clone, Copy)]
pub struct IdentityAllocator {
    pool: &'static [&'static str],
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::with_pool(EMOJI_POOL)
    }
}

impl IdentityAllocator {
    /// Allocator over a custom pool. Each entry must be a single grapheme.
    ///
    /// # Panics
    /// If `pool` is empty.
    pub fn with_pool(pool: &'static [&'static str]) -> Self {
        assert!(!pool.is_empty(), "identifier pool must not be empty");
        Self { pool }
    }

    pub fn pool(&self) -> &'static [&'static str] {
        self.pool
    }

    /// Number of distinct identifiers the pool can express (`N^3`)
    pub fn space_size(&self) -> usize {
        self.pool.len().pow(SYMBOLS_PER_ID as u32)
    }

    /// Three independent uniform draws, with replacement, in draw order.
    /// Not guaranteed to be unique.
    pub fn generate(&self) -> String {
        self.generate_with(&mut rand::thread_rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..SYMBOLS_PER_ID)
            .map(|_| self.pool[rng.gen_range(0..self.pool.len())])
            .collect()
    }

    /// True iff `candidate` is exactly three symbols, all from the pool.
    pub fn is_valid_format(&self, candidate: &str) -> bool {
        let symbols = split_symbols(candidate);
        symbols.len() == SYMBOLS_PER_ID && symbols.iter().all(|s| self.pool.contains(s))
    }

    /// Pure set membership; does not consult storage.
    pub fn is_unique(&self, candidate: &str, existing: &HashSet<String>) -> bool {
        !existing.contains(candidate)
    }

    /// First generated identifier absent from `existing`, within `max_attempts` draws.
    pub fn generate_unique(&self, existing: &HashSet<String>, max_attempts: usize) -> AppResult<String> {
        self.generate_unique_with(&mut rand::thread_rng(), existing, max_attempts)
    }

    pub fn generate_unique_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        existing: &HashSet<String>,
        max_attempts: usize,
    ) -> AppResult<String> {
        for _ in 0..max_attempts {
            let candidate = self.generate_with(rng);
            if self.is_unique(&candidate, existing) {
                return Ok(candidate);
            }
        }

        tracing::warn!(
            "No free reader identifier after {} attempts ({} of {} in use)",
            max_attempts,
            existing.len(),
            self.space_size()
        );
        Err(AppError::CollisionExhausted { attempts: max_attempts })
    }
}

/// Decompose `s` into extended grapheme clusters.
pub fn split_symbols(s: &str) -> Vec<&str> {
    s.graphemes(true).collect()
}
