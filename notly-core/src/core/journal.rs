//! Daily journal entries and their store.
//!
//! Journal entries are keyed by calendar date (`YYYY-MM-DD`), one entry per
//! day. Saving to an existing date updates that entry in place, preserving
//! its creation timestamp; there is no way to end up with two entries for
//! the same day.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::card::{word_count, ContentKind};
use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "journal";

/// One day's journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Calendar date in `YYYY-MM-DD` form; doubles as the entry's key.
    pub date: String,
    /// Serialized rich-text document.
    pub content: String,
    pub word_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Date-ordered collection of journal entries.
pub struct JournalStore {
    gateway: Arc<Gateway>,
    entries: BTreeMap<String, JournalEntry>,
    loaded: bool,
}

impl JournalStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, entries: BTreeMap::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.entries = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates or updates the entry for `date`. Updates keep the original
    /// `created_at` and recompute the word count.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ValidationFailed`] if `date` is not a valid
    /// `YYYY-MM-DD` calendar date.
    pub fn save_entry(&mut self, date: &str, content: &str) -> Result<JournalEntry> {
        if NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
            return Err(NotlyError::ValidationFailed(format!(
                "'{date}' is not a valid YYYY-MM-DD date"
            )));
        }

        let now = chrono::Utc::now().timestamp_millis();
        let words = word_count(content, ContentKind::Rich);
        let entry = self
            .entries
            .entry(date.to_string())
            .and_modify(|e| {
                e.content = content.to_string();
                e.word_count = words;
                e.updated_at = now;
            })
            .or_insert_with(|| JournalEntry {
                date: date.to_string(),
                content: content.to_string(),
                word_count: words,
                created_at: now,
                updated_at: now,
            })
            .clone();

        self.gateway.persist(COLLECTION, &self.entries);
        Ok(entry)
    }

    /// Removes the entry for `date` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::JournalEntryNotFound`] if no entry exists for
    /// that date.
    pub fn delete_entry(&mut self, date: &str) -> Result<JournalEntry> {
        let removed = self
            .entries
            .remove(date)
            .ok_or_else(|| NotlyError::JournalEntryNotFound(date.to_string()))?;
        self.gateway.persist(COLLECTION, &self.entries);
        Ok(removed)
    }

    pub fn entry(&self, date: &str) -> Option<&JournalEntry> {
        self.entries.get(date)
    }

    pub fn contains(&self, date: &str) -> bool {
        self.entries.contains_key(date)
    }

    /// Entries in ascending date order.
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
