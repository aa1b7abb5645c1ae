//! History window policy applied before a turn list is forwarded.

use super::turn::{ConversationTurn, Role};

/// How much prior conversation is forwarded to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryWindow {
    /// Forward every turn the caller sent.
    #[default]
    Unbounded,
    /// Forward only the most recent `n` turns.
    Last(usize),
}

impl HistoryWindow {
    /// `0` means unbounded.
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            HistoryWindow::Unbounded
        } else {
            HistoryWindow::Last(limit)
        }
    }

    /// Select the turns to forward, oldest first.
    ///
    /// A truncated window never starts with an assistant turn.
    pub fn apply<'a>(&self, history: &'a [ConversationTurn]) -> &'a [ConversationTurn] {
        match *self {
            HistoryWindow::Unbounded => history,
            HistoryWindow::Last(n) if history.len() <= n => history,
            HistoryWindow::Last(n) => {
                let tail = &history[history.len() - n..];
                let skip = tail
                    .iter()
                    .take_while(|t| t.role == Role::Assistant)
                    .count();
                &tail[skip..]
            }
        }
    }
}
