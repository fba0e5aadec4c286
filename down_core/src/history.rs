//! # Edit History
//!
//! Bounded two-stack undo/redo over whole-grid snapshots. Snapshots are
//! cheap (a few hundred small strings), so the history stores full copies
//! instead of deltas.

/// Maximum snapshots retained on each stack
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Undo/redo history over cloneable state snapshots.
///
/// Call [`record`](EditHistory::record) with the state *before* each
/// mutation. Recording a snapshot identical to the last one is a no-op;
/// recording anything clears the redo stack; the oldest snapshot is dropped
/// once the limit is reached.
#[derive(Debug, Clone)]
pub struct EditHistory<T: Clone + PartialEq> {
    undo: Vec<T>,
    redo: Vec<T>,
    limit: usize,
}

impl<T: Clone + PartialEq> Default for EditHistory<T> {
    fn default() -> Self {
        EditHistory::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T: Clone + PartialEq> EditHistory<T> {
    pub fn with_limit(limit: usize) -> Self {
        EditHistory {
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record the state before a mutation.
    pub fn record(&mut self, before: T) {
        if self.undo.last() == Some(&before) {
            return;
        }
        self.undo.push(before);
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
        self.redo.clear();
    }

    /// Step back, exchanging `current` for the previous snapshot.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let state = self.undo.pop()?;
        self.redo.push(current);
        if self.redo.len() > self.limit {
            self.redo.remove(0);
        }
        Some(state)
    }

    /// Step forward again, exchanging `current` for the undone snapshot.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let state = self.redo.pop()?;
        self.undo.push(current);
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
        Some(state)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history: EditHistory<i32> = EditHistory::default();
        let mut state = 1;

        history.record(state);
        state = 2;
        history.record(state);
        state = 3;

        state = history.undo(state).unwrap();
        assert_eq!(state, 2);
        state = history.undo(state).unwrap();
        assert_eq!(state, 1);
        assert!(!history.can_undo());

        state = history.redo(state).unwrap();
        assert_eq!(state, 2);
        state = history.redo(state).unwrap();
        assert_eq!(state, 3);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_empty_returns_none() {
        let mut history: EditHistory<i32> = EditHistory::default();
        assert_eq!(history.undo(1), None);
        assert_eq!(history.redo(1), None);
    }

    #[test]
    fn test_consecutive_duplicates_suppressed() {
        let mut history: EditHistory<i32> = EditHistory::default();
        history.record(1);
        history.record(1);
        history.record(1);

        assert_eq!(history.undo(2), Some(1));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history: EditHistory<i32> = EditHistory::default();
        history.record(1);
        let state = history.undo(2).unwrap();
        assert!(history.can_redo());

        history.record(state);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history: EditHistory<usize> = EditHistory::with_limit(3);
        for i in 0..5 {
            history.record(i);
        }

        let mut current = 5;
        let mut restored = Vec::new();
        while let Some(state) = history.undo(current) {
            restored.push(state);
            current = state;
        }
        assert_eq!(restored, vec![4, 3, 2]);
    }
}
