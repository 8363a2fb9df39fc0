//! Presentation mode: stepping through a project's boards full-screen.
//!
//! Purely in-memory session state. The session holds an ordered list of
//! board ids and a cursor; navigation clamps at the ends rather than
//! wrapping, so repeated "next" on the last board is a no-op.

use crate::core::error::{NotlyError, Result};

/// An active presentation over a fixed board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSession {
    pub project_id: String,
    board_ids: Vec<String>,
    index: usize,
}

impl PresentationSession {
    pub fn board_ids(&self) -> &[String] {
        &self.board_ids
    }
}

/// Holds at most one running [`PresentationSession`].
#[derive(Debug, Default)]
pub struct PresentationState {
    session: Option<PresentationSession>,
}

impl PresentationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts presenting `board_ids` in order, replacing any running
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an error when `board_ids` is empty; there is nothing to
    /// present.
    pub fn start(&mut self, project_id: &str, board_ids: Vec<String>) -> Result<()> {
        if board_ids.is_empty() {
            return Err(NotlyError::ValidationFailed(
                "Cannot start a presentation with no boards".to_string(),
            ));
        }
        self.session = Some(PresentationSession {
            project_id: project_id.to_string(),
            board_ids,
            index: 0,
        });
        Ok(())
    }

    /// Ends the session. Returns whether one was running.
    pub fn exit(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&PresentationSession> {
        self.session.as_ref()
    }

    /// The board currently shown, if presenting.
    pub fn current_board(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.board_ids[s.index].as_str())
    }

    /// Zero-based position and total count, e.g. `(0, 5)` on the first of
    /// five boards.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.session.as_ref().map(|s| (s.index, s.board_ids.len()))
    }

    /// Advances to the next board. Stays put on the last one. Returns the
    /// board now shown.
    pub fn next(&mut self) -> Option<&str> {
        let session = self.session.as_mut()?;
        if session.index + 1 < session.board_ids.len() {
            session.index += 1;
        }
        Some(session.board_ids[session.index].as_str())
    }

    /// Steps back to the previous board. Stays put on the first one.
    /// Returns the board now shown.
    pub fn previous(&mut self) -> Option<&str> {
        let session = self.session.as_mut()?;
        session.index = session.index.saturating_sub(1);
        Some(session.board_ids[session.index].as_str())
    }

    /// Jumps directly to the board at `index`. Returns `None` (without
    /// moving) when idle or out of bounds.
    pub fn go_to(&mut self, index: usize) -> Option<&str> {
        let session = self.session.as_mut()?;
        if index >= session.board_ids.len() {
            return None;
        }
        session.index = index;
        Some(session.board_ids[session.index].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boards(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("b-{i}")).collect()
    }

    #[test]
    fn test_start_requires_boards() {
        let mut state = PresentationState::new();
        assert!(state.start("p-1", Vec::new()).is_err());
        assert!(!state.is_active());
    }

    #[test]
    fn test_starts_on_first_board() {
        let mut state = PresentationState::new();
        state.start("p-1", boards(3)).unwrap();
        assert!(state.is_active());
        assert_eq!(state.current_board(), Some("b-1"));
        assert_eq!(state.position(), Some((0, 3)));
    }

    #[test]
    fn test_navigation_clamps_at_ends() {
        let mut state = PresentationState::new();
        state.start("p-1", boards(2)).unwrap();

        assert_eq!(state.previous(), Some("b-1"));
        assert_eq!(state.next(), Some("b-2"));
        assert_eq!(state.next(), Some("b-2"));
        assert_eq!(state.position(), Some((1, 2)));
    }

    #[test]
    fn test_go_to_rejects_out_of_bounds() {
        let mut state = PresentationState::new();
        state.start("p-1", boards(3)).unwrap();
        state.next();

        assert!(state.go_to(3).is_none());
        assert_eq!(state.current_board(), Some("b-2"));
        assert_eq!(state.go_to(2), Some("b-3"));
    }

    #[test]
    fn test_start_replaces_running_session() {
        let mut state = PresentationState::new();
        state.start("p-1", boards(3)).unwrap();
        state.next();

        state.start("p-2", vec!["x-1".to_string()]).unwrap();
        assert_eq!(state.current_board(), Some("x-1"));
        assert_eq!(state.position(), Some((0, 1)));
        assert_eq!(state.session().map(|s| s.project_id.as_str()), Some("p-2"));
    }

    #[test]
    fn test_exit_reports_whether_running() {
        let mut state = PresentationState::new();
        assert!(!state.exit());
        state.start("p-1", boards(1)).unwrap();
        assert!(state.exit());
        assert!(state.current_board().is_none());
        assert!(state.next().is_none());
    }
}
