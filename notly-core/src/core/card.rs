//! Note card entities and their store.
//!
//! Cards are the unit of written content. A card may sit on a board (via
//! `board_id`) or float unplaced in the project library; the reference is
//! nullable by design and the store treats a dangling reference as "not on
//! any board" rather than an error.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::gateway::Gateway;
use crate::{NotlyError, Result};

const COLLECTION: &str = "cards";

/// How a card's `content` string is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Plain UTF-8 text.
    Text,
    /// Serialized rich-text document (JSON tree of nodes with `text` leaves).
    #[default]
    Rich,
}

/// A note card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    /// Board the card sits on, or `None` while unplaced.
    pub board_id: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub content_kind: ContentKind,
    pub color: Option<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Derived from `content`; recomputed on every content write.
    pub word_count: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Patch applied by [`CardStore::update`]; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCard {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
}

/// Counts the words in `content` according to its encoding.
///
/// Rich documents are walked for their `text` leaves so markup never inflates
/// the count; a rich payload that fails to parse falls back to counting the
/// raw string.
pub fn word_count(content: &str, kind: ContentKind) -> i32 {
    match kind {
        ContentKind::Text => content.split_whitespace().count() as i32,
        ContentKind::Rich => match serde_json::from_str::<serde_json::Value>(content) {
            Ok(doc) => {
                let mut text = String::new();
                collect_text(&doc, &mut text);
                text.split_whitespace().count() as i32
            }
            Err(_) => content.split_whitespace().count() as i32,
        },
    }
}

fn collect_text(node: &serde_json::Value, out: &mut String) {
    match node {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(text)) = map.get("text") {
                out.push_str(text);
                out.push(' ');
            }
            if let Some(serde_json::Value::Array(children)) = map.get("content") {
                for child in children {
                    collect_text(child, out);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        _ => {}
    }
}

/// In-memory collection of cards across all projects.
pub struct CardStore {
    gateway: Arc<Gateway>,
    cards: Vec<Card>,
    loaded: bool,
}

impl CardStore {
    pub(crate) fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway, cards: Vec::new(), loaded: false }
    }

    /// Hydrates the store from the backend. Idempotent.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.cards = self.gateway.load(COLLECTION).unwrap_or_default();
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Creates a card, deriving its word count from the content.
    pub fn create(
        &mut self,
        board_id: Option<&str>,
        title: Option<String>,
        content: &str,
        content_kind: ContentKind,
    ) -> Card {
        let now = chrono::Utc::now().timestamp_millis();
        let card = Card {
            id: Uuid::new_v4().to_string(),
            board_id: board_id.map(str::to_string),
            title,
            content: content.to_string(),
            content_kind,
            color: None,
            tag_ids: Vec::new(),
            word_count: word_count(content, content_kind),
            created_at: now,
            updated_at: now,
        };
        self.cards.push(card.clone());
        self.gateway.persist(COLLECTION, &self.cards);
        card
    }

    /// Applies `patch` to the card with `id`. A content change recomputes the
    /// word count.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn update(&mut self, id: &str, patch: UpdateCard) -> Result<Card> {
        let card = self.card_mut(id)?;
        if let Some(title) = patch.title {
            card.title = Some(title);
        }
        if let Some(content) = patch.content {
            card.word_count = word_count(&content, card.content_kind);
            card.content = content;
        }
        if let Some(color) = patch.color {
            card.color = Some(color);
        }
        card.updated_at = chrono::Utc::now().timestamp_millis();
        let updated = card.clone();
        self.gateway.persist(COLLECTION, &self.cards);
        Ok(updated)
    }

    /// Moves the card onto `board_id`, or back to the unplaced library when
    /// `None`. Board existence is validated by the application layer.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn move_to_board(&mut self, id: &str, board_id: Option<&str>) -> Result<Card> {
        let card = self.card_mut(id)?;
        card.board_id = board_id.map(str::to_string);
        card.updated_at = chrono::Utc::now().timestamp_millis();
        let moved = card.clone();
        self.gateway.persist(COLLECTION, &self.cards);
        Ok(moved)
    }

    /// Removes the card with `id` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::CardNotFound`] if no such card exists.
    pub fn delete(&mut self, id: &str) -> Result<Card> {
        let index = self
            .cards
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| NotlyError::CardNotFound(id.to_string()))?;
        let removed = self.cards.remove(index);
        self.gateway.persist(COLLECTION, &self.cards);
        Ok(removed)
    }

    /// Overwrites title and content from a version snapshot, recomputing the
    /// word count.
    pub(crate) fn restore_snapshot(
        &mut self,
        id: &str,
        title: Option<String>,
        content: &str,
    ) -> Result<Card> {
        let card = self.card_mut(id)?;
        card.title = title;
        card.word_count = word_count(content, card.content_kind);
        card.content = content.to_string();
        card.updated_at = chrono::Utc::now().timestamp_millis();
        let restored = card.clone();
        self.gateway.persist(COLLECTION, &self.cards);
        Ok(restored)
    }

    pub(crate) fn add_tag(&mut self, id: &str, tag_id: &str) -> Result<()> {
        let card = self.card_mut(id)?;
        if !card.tag_ids.iter().any(|t| t == tag_id) {
            card.tag_ids.push(tag_id.to_string());
            card.updated_at = chrono::Utc::now().timestamp_millis();
            self.gateway.persist(COLLECTION, &self.cards);
        }
        Ok(())
    }

    pub(crate) fn remove_tag(&mut self, id: &str, tag_id: &str) -> Result<()> {
        let card = self.card_mut(id)?;
        let before = card.tag_ids.len();
        card.tag_ids.retain(|t| t != tag_id);
        if card.tag_ids.len() != before {
            card.updated_at = chrono::Utc::now().timestamp_millis();
            self.gateway.persist(COLLECTION, &self.cards);
        }
        Ok(())
    }

    /// Clears `board_id` on every card sitting on one of `board_ids`.
    /// Returns how many cards were detached.
    pub(crate) fn detach_boards(&mut self, board_ids: &HashSet<String>) -> usize {
        let mut detached = 0;
        for card in &mut self.cards {
            if let Some(board_id) = &card.board_id {
                if board_ids.contains(board_id) {
                    card.board_id = None;
                    detached += 1;
                }
            }
        }
        if detached > 0 {
            self.gateway.persist(COLLECTION, &self.cards);
        }
        detached
    }

    /// Nulls board references pointing outside `board_ids` and strips tag ids
    /// missing from `tag_ids`. Returns `(detached, stripped)` counts; the
    /// collection is re-persisted only when something changed.
    pub(crate) fn repair_references(
        &mut self,
        board_ids: &HashSet<String>,
        tag_ids: &HashSet<String>,
    ) -> (usize, usize) {
        let mut detached = 0;
        let mut stripped = 0;
        for card in &mut self.cards {
            if let Some(board_id) = &card.board_id {
                if !board_ids.contains(board_id) {
                    card.board_id = None;
                    detached += 1;
                }
            }
            let before = card.tag_ids.len();
            card.tag_ids.retain(|t| tag_ids.contains(t));
            stripped += before - card.tag_ids.len();
        }
        if detached > 0 || stripped > 0 {
            self.gateway.persist(COLLECTION, &self.cards);
        }
        (detached, stripped)
    }

    /// Removes `tag_id` from every card carrying it. Returns how many cards
    /// changed.
    pub(crate) fn strip_tag(&mut self, tag_id: &str) -> usize {
        let mut changed = 0;
        for card in &mut self.cards {
            let before = card.tag_ids.len();
            card.tag_ids.retain(|t| t != tag_id);
            if card.tag_ids.len() != before {
                changed += 1;
            }
        }
        if changed > 0 {
            self.gateway.persist(COLLECTION, &self.cards);
        }
        changed
    }

    pub(crate) fn insert_all(&mut self, cards: Vec<Card>) {
        self.cards.extend(cards);
        self.gateway.persist(COLLECTION, &self.cards);
    }

    /// Cards placed on the given board.
    pub fn cards_for_board(&self, board_id: &str) -> Vec<&Card> {
        self.cards
            .iter()
            .filter(|c| c.board_id.as_deref() == Some(board_id))
            .collect()
    }

    /// Cards not placed on any board.
    pub fn unplaced(&self) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.board_id.is_none()).collect()
    }

    /// Case-insensitive substring search over titles and content. An empty
    /// query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&Card> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.cards
            .iter()
            .filter(|c| {
                c.title
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&needle))
                    || c.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    pub fn list(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn card_mut(&mut self, id: &str) -> Result<&mut Card> {
        self.cards
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| NotlyError::CardNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryBackend;

    fn store() -> CardStore {
        let gateway = Arc::new(Gateway::new(Arc::new(MemoryBackend::new())));
        let mut store = CardStore::new(gateway);
        store.load();
        store
    }

    #[test]
    fn test_word_count_plain_text() {
        assert_eq!(word_count("one  two\nthree", ContentKind::Text), 3);
        assert_eq!(word_count("   ", ContentKind::Text), 0);
    }

    #[test]
    fn test_word_count_rich_document_counts_text_leaves() {
        let doc = r#"{
            "type": "doc",
            "content": [
                {"type": "paragraph", "content": [{"type": "text", "text": "hello wide world"}]},
                {"type": "paragraph", "content": [{"type": "text", "text": "again"}]}
            ]
        }"#;
        assert_eq!(word_count(doc, ContentKind::Rich), 4);
    }

    #[test]
    fn test_word_count_unparseable_rich_falls_back_to_raw() {
        assert_eq!(word_count("not json at all", ContentKind::Rich), 4);
    }

    #[test]
    fn test_create_derives_word_count() {
        let mut store = store();
        let card = store.create(None, Some("Idea".to_string()), "a b c", ContentKind::Text);
        assert_eq!(card.word_count, 3);
        assert!(card.board_id.is_none());
    }

    #[test]
    fn test_update_content_recomputes_word_count() {
        let mut store = store();
        let card = store.create(None, None, "one", ContentKind::Text);

        let updated = store
            .update(
                &card.id,
                UpdateCard { content: Some("one two three four".to_string()), ..Default::default() },
            )
            .unwrap();
        assert_eq!(updated.word_count, 4);
    }

    #[test]
    fn test_board_queries_split_placed_and_unplaced() {
        let mut store = store();
        let on_board = store.create(Some("b-1"), None, "x", ContentKind::Text);
        let floating = store.create(None, None, "y", ContentKind::Text);

        let placed = store.cards_for_board("b-1");
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].id, on_board.id);

        let unplaced = store.unplaced();
        assert_eq!(unplaced.len(), 1);
        assert_eq!(unplaced[0].id, floating.id);
    }

    #[test]
    fn test_detach_boards_nulls_references() {
        let mut store = store();
        let card = store.create(Some("b-1"), None, "x", ContentKind::Text);
        let untouched = store.create(Some("b-2"), None, "y", ContentKind::Text);

        let mut gone = HashSet::new();
        gone.insert("b-1".to_string());
        assert_eq!(store.detach_boards(&gone), 1);
        assert!(store.get(&card.id).unwrap().board_id.is_none());
        assert_eq!(store.get(&untouched.id).unwrap().board_id.as_deref(), Some("b-2"));
    }

    #[test]
    fn test_repair_references_fixes_dangling_links() {
        let mut store = store();
        let card = store.create(Some("ghost-board"), None, "x", ContentKind::Text);
        store.add_tag(&card.id, "ghost-tag").unwrap();
        store.add_tag(&card.id, "real-tag").unwrap();

        let boards = HashSet::new();
        let mut tags = HashSet::new();
        tags.insert("real-tag".to_string());

        let (detached, stripped) = store.repair_references(&boards, &tags);
        assert_eq!((detached, stripped), (1, 1));

        let repaired = store.get(&card.id).unwrap();
        assert!(repaired.board_id.is_none());
        assert_eq!(repaired.tag_ids, vec!["real-tag".to_string()]);
    }

    #[test]
    fn test_add_tag_is_idempotent() {
        let mut store = store();
        let card = store.create(None, None, "x", ContentKind::Text);
        store.add_tag(&card.id, "t-1").unwrap();
        store.add_tag(&card.id, "t-1").unwrap();
        assert_eq!(store.get(&card.id).unwrap().tag_ids.len(), 1);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut store = store();
        store.create(None, Some("Meeting Notes".to_string()), "agenda", ContentKind::Text);
        store.create(None, None, "Quarterly REVIEW figures", ContentKind::Text);
        store.create(None, None, "unrelated", ContentKind::Text);

        assert_eq!(store.search("review").len(), 1);
        assert_eq!(store.search("MEETING").len(), 1);
        assert!(store.search("").is_empty());
        assert!(store.search("   ").is_empty());
    }
}
