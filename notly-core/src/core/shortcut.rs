//! Chorded keyboard shortcuts: parsing, registration, and dispatch.
//!
//! Shortcuts are registered as human-readable combo strings (`"mod+k"`,
//! `"ctrl+shift+p"`, `"escape"`) together with an arbitrary action payload.
//! [`ShortcutRegistry::handle`] walks the registrations in order and returns
//! the first one matching the event, so at most one action fires per
//! keystroke and registration order doubles as priority.

use serde::{Deserialize, Serialize};

use crate::{NotlyError, Result};

/// Where a shortcut is allowed to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutScope {
    /// Fires anywhere, including (for modified combos) inside text inputs.
    Global,
    /// Fires only while the whiteboard canvas owns focus.
    Canvas,
    /// Fires only while a document editor owns focus.
    Editor,
}

/// What kind of element owned keyboard focus when the event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Other,
    Canvas,
    /// A text field, textarea, or rich-text editing surface.
    TextInput,
}

/// A parsed key combination.
///
/// `ctrl_or_meta` folds Control and Command together so one registration
/// covers both platforms; the event side accepts either modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub ctrl_or_meta: bool,
    pub alt: bool,
    pub shift: bool,
    /// Normalized, lowercased key name (`"k"`, `"escape"`, `" "`).
    pub key: String,
}

impl KeyCombo {
    /// Parses a combo string such as `"mod+shift+k"`.
    ///
    /// Modifier tokens: `ctrl`/`control`/`cmd`/`meta`/`mod` (all equivalent),
    /// `alt`/`option`, and `shift`. Exactly one non-modifier key token is
    /// required; the plus key itself is written `"++"` (as in `"ctrl++"`) or
    /// as a bare `"+"`. Key aliases `esc`, `del`, `return`, and `space`
    /// normalize to `escape`, `delete`, `enter`, and `" "`.
    ///
    /// # Errors
    ///
    /// Returns [`NotlyError::ValidationFailed`] if the combo is empty, ends
    /// in a dangling separator, or names zero or more than one key.
    ///
    /// # Examples
    ///
    /// ```
    /// use notly_core::KeyCombo;
    ///
    /// let combo = KeyCombo::parse("mod+K").unwrap();
    /// assert!(combo.ctrl_or_meta);
    /// assert_eq!(combo.key, "k");
    /// ```
    pub fn parse(combo: &str) -> Result<Self> {
        if combo.trim().is_empty() {
            return Err(NotlyError::ValidationFailed(format!(
                "Shortcut '{combo}' has no key"
            )));
        }

        let mut ctrl_or_meta = false;
        let mut alt = false;
        let mut shift = false;
        let mut key: Option<String> = None;

        let mut tokens = combo.split('+').map(str::trim).peekable();
        while let Some(token) = tokens.next() {
            // The plus key arrives as two consecutive empty tokens, e.g.
            // "ctrl++" splits to ["ctrl", "", ""]. A lone empty token is a
            // dangling separator, not a key.
            let token = if token.is_empty() {
                if tokens.next_if(|next| next.is_empty()).is_none() {
                    return Err(NotlyError::ValidationFailed(format!(
                        "Shortcut '{combo}' has a dangling '+'"
                    )));
                }
                "+"
            } else {
                token
            };
            match token.to_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "meta" | "mod" => ctrl_or_meta = true,
                "alt" | "option" => alt = true,
                "shift" => shift = true,
                other => {
                    if key.replace(normalize_key(other)).is_some() {
                        return Err(NotlyError::ValidationFailed(format!(
                            "Shortcut '{combo}' names more than one key"
                        )));
                    }
                }
            }
        }

        let key = key.ok_or_else(|| {
            NotlyError::ValidationFailed(format!("Shortcut '{combo}' has no key"))
        })?;
        Ok(Self { ctrl_or_meta, alt, shift, key })
    }
}

/// Translates browser-style key names to the canonical form used in combos.
fn normalize_key(key: &str) -> String {
    let lower = key.to_lowercase();
    match lower.as_str() {
        "esc" => "escape".to_string(),
        "del" => "delete".to_string(),
        "return" => "enter".to_string(),
        "space" | "spacebar" => " ".to_string(),
        _ => lower,
    }
}

/// A keyboard event as reported by the host shell.
#[derive(Debug, Clone, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    pub target: FocusTarget,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), ..Self::default() }
    }
}

/// A registered shortcut binding a combo to an action payload.
#[derive(Debug, Clone)]
pub struct Shortcut<A> {
    pub id: String,
    pub combo: KeyCombo,
    pub scope: ShortcutScope,
    /// Whether the host should suppress the platform default for this key.
    pub prevent_default: bool,
    pub action: A,
}

/// The outcome of a successful dispatch.
#[derive(Debug)]
pub struct Match<'a, A> {
    pub shortcut_id: &'a str,
    pub action: &'a A,
    pub prevent_default: bool,
}

/// Ordered shortcut table generic over the action payload type.
pub struct ShortcutRegistry<A> {
    shortcuts: Vec<Shortcut<A>>,
}

impl<A> Default for ShortcutRegistry<A> {
    fn default() -> Self {
        Self { shortcuts: Vec::new() }
    }
}

impl<A> ShortcutRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `combo` and appends a shortcut with `prevent_default` on.
    ///
    /// # Errors
    ///
    /// Returns an error if the combo string does not parse.
    pub fn register(&mut self, id: &str, combo: &str, scope: ShortcutScope, action: A) -> Result<()> {
        self.shortcuts.push(Shortcut {
            id: id.to_string(),
            combo: KeyCombo::parse(combo)?,
            scope,
            prevent_default: true,
            action,
        });
        Ok(())
    }

    /// Appends a fully-specified shortcut.
    pub fn register_shortcut(&mut self, shortcut: Shortcut<A>) {
        self.shortcuts.push(shortcut);
    }

    /// Removes the shortcut registered under `id`, if any.
    pub fn unregister(&mut self, id: &str) {
        self.shortcuts.retain(|s| s.id != id);
    }

    /// Dispatches `event` against the table and returns the first match.
    ///
    /// While a text input owns focus, unmodified shortcuts are suppressed so
    /// plain typing never triggers actions. Two exceptions: Escape always
    /// dispatches (dismiss flows must work mid-edit), and combos carrying
    /// ctrl/meta or alt dispatch if their scope is [`ShortcutScope::Global`].
    /// Shift alone does not count as a modifier for this rule.
    pub fn handle(&self, event: &KeyEvent) -> Option<Match<'_, A>> {
        let key = normalize_key(&event.key);
        let typing = event.target == FocusTarget::TextInput;

        for shortcut in &self.shortcuts {
            if typing && key != "escape" {
                let modified = shortcut.combo.ctrl_or_meta || shortcut.combo.alt;
                if !modified || shortcut.scope != ShortcutScope::Global {
                    continue;
                }
            }
            if shortcut.combo.ctrl_or_meta != (event.ctrl || event.meta) {
                continue;
            }
            if shortcut.combo.alt != event.alt || shortcut.combo.shift != event.shift {
                continue;
            }
            if shortcut.combo.key != key {
                continue;
            }
            return Some(Match {
                shortcut_id: &shortcut.id,
                action: &shortcut.action,
                prevent_default: shortcut.prevent_default,
            });
        }
        None
    }

    pub fn len(&self) -> usize {
        self.shortcuts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shortcuts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Action {
        OpenSearch,
        NewCard,
        CloseOverlay,
        DeleteSelection,
    }

    fn registry() -> ShortcutRegistry<Action> {
        let mut reg = ShortcutRegistry::new();
        reg.register("search", "mod+k", ShortcutScope::Global, Action::OpenSearch).unwrap();
        reg.register("new-card", "n", ShortcutScope::Canvas, Action::NewCard).unwrap();
        reg.register("close", "escape", ShortcutScope::Global, Action::CloseOverlay).unwrap();
        reg.register("delete", "del", ShortcutScope::Canvas, Action::DeleteSelection).unwrap();
        reg
    }

    #[test]
    fn test_parse_folds_platform_modifiers() {
        for combo in ["ctrl+k", "control+k", "cmd+k", "meta+k", "mod+k"] {
            let parsed = KeyCombo::parse(combo).unwrap();
            assert!(parsed.ctrl_or_meta, "{combo}");
            assert_eq!(parsed.key, "k", "{combo}");
        }
    }

    #[test]
    fn test_parse_rejects_modifier_only_combo() {
        assert!(KeyCombo::parse("ctrl+shift").is_err());
        assert!(KeyCombo::parse("").is_err());
        assert!(KeyCombo::parse("ctrl+a+b").is_err());
    }

    #[test]
    fn test_parse_rejects_dangling_separator() {
        assert!(KeyCombo::parse("ctrl+").is_err());
        assert!(KeyCombo::parse("+k").is_err());
        assert!(KeyCombo::parse("   ").is_err());
    }

    #[test]
    fn test_parse_plus_key() {
        let combo = KeyCombo::parse("ctrl++").unwrap();
        assert!(combo.ctrl_or_meta);
        assert_eq!(combo.key, "+");
        assert_eq!(KeyCombo::parse("+").unwrap().key, "+");
    }

    #[test]
    fn test_parse_key_aliases() {
        assert_eq!(KeyCombo::parse("esc").unwrap().key, "escape");
        assert_eq!(KeyCombo::parse("return").unwrap().key, "enter");
        assert_eq!(KeyCombo::parse("mod+space").unwrap().key, " ");
    }

    #[test]
    fn test_ctrl_and_meta_both_satisfy_mod() {
        let reg = registry();

        let ctrl = KeyEvent { ctrl: true, ..KeyEvent::new("k") };
        let meta = KeyEvent { meta: true, ..KeyEvent::new("K") };
        assert_eq!(reg.handle(&ctrl).unwrap().action, &Action::OpenSearch);
        assert_eq!(reg.handle(&meta).unwrap().action, &Action::OpenSearch);
    }

    #[test]
    fn test_modifier_match_is_exact() {
        let reg = registry();

        // Extra shift on a bare "n" binding: no match.
        let shifted = KeyEvent { shift: true, ..KeyEvent::new("n") };
        assert!(reg.handle(&shifted).is_none());

        // Bare "k" without mod: no match.
        assert!(reg.handle(&KeyEvent::new("k")).is_none());
    }

    #[test]
    fn test_unmodified_shortcut_suppressed_while_typing() {
        let reg = registry();
        let event = KeyEvent { target: FocusTarget::TextInput, ..KeyEvent::new("n") };
        assert!(reg.handle(&event).is_none());
    }

    #[test]
    fn test_escape_fires_while_typing() {
        let reg = registry();
        let event = KeyEvent { target: FocusTarget::TextInput, ..KeyEvent::new("Escape") };
        assert_eq!(reg.handle(&event).unwrap().action, &Action::CloseOverlay);
    }

    #[test]
    fn test_global_modified_shortcut_fires_while_typing() {
        let reg = registry();
        let event = KeyEvent {
            ctrl: true,
            target: FocusTarget::TextInput,
            ..KeyEvent::new("k")
        };
        assert_eq!(reg.handle(&event).unwrap().action, &Action::OpenSearch);
    }

    #[test]
    fn test_non_global_modified_shortcut_suppressed_while_typing() {
        let mut reg = ShortcutRegistry::new();
        reg.register("dup", "mod+d", ShortcutScope::Canvas, Action::NewCard).unwrap();

        let event = KeyEvent {
            ctrl: true,
            target: FocusTarget::TextInput,
            ..KeyEvent::new("d")
        };
        assert!(reg.handle(&event).is_none());
    }

    #[test]
    fn test_shift_alone_is_not_a_typing_exemption() {
        let mut reg = ShortcutRegistry::new();
        reg.register("caps", "shift+x", ShortcutScope::Global, Action::NewCard).unwrap();

        let event = KeyEvent {
            shift: true,
            target: FocusTarget::TextInput,
            ..KeyEvent::new("x")
        };
        assert!(reg.handle(&event).is_none());
    }

    #[test]
    fn test_first_registration_wins() {
        let mut reg = ShortcutRegistry::new();
        reg.register("first", "mod+p", ShortcutScope::Global, Action::OpenSearch).unwrap();
        reg.register("second", "mod+p", ShortcutScope::Global, Action::NewCard).unwrap();

        let event = KeyEvent { meta: true, ..KeyEvent::new("p") };
        let matched = reg.handle(&event).unwrap();
        assert_eq!(matched.shortcut_id, "first");
        assert_eq!(matched.action, &Action::OpenSearch);
    }

    #[test]
    fn test_unregister() {
        let mut reg = registry();
        reg.unregister("close");
        let event = KeyEvent::new("Escape");
        assert!(reg.handle(&event).is_none());
    }

    #[test]
    fn test_delete_alias_matches_event_name() {
        let reg = registry();
        assert_eq!(
            reg.handle(&KeyEvent::new("Delete")).unwrap().action,
            &Action::DeleteSelection
        );
    }
}
