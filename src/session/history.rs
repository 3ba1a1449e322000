//! Bounded calculation history.

use std::collections::VecDeque;

/// Number of entries kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A finished calculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryItem {
    /// The expression as typed.
    pub expression: String,
    /// The displayed result (a number or `Error`).
    pub result: String,
}

impl HistoryItem {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
        }
    }

    /// The `expression = result` form sent to the explanation assistant.
    pub fn calculation(&self) -> String {
        format!("{} = {}", self.expression, self.result)
    }
}

/// Most-recent-first list of calculations, capped at `limit` entries.
#[derive(Clone, Debug)]
pub struct History {
    items: VecDeque<HistoryItem>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A limit of zero is raised to one.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            items: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        self.items.truncate(self.limit);
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    /// Entry `index`, counting from the newest (0).
    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }
}
