//! Bounded snapshot undo/redo.

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_DEPTH: usize = 20;

/// Snapshot-based undo/redo stacks.
///
/// Callers commit the state as it was *before* a gesture or edit, then
/// mutate. `undo` and `redo` take the current state so it can be parked on
/// the opposite stack.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_depth: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl<T> History<T> {
    /// Create empty history holding at most `max_depth` states per stack.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    fn trim(stack: &mut Vec<T>, max_depth: usize) {
        if stack.len() > max_depth {
            let excess = stack.len() - max_depth;
            stack.drain(..excess);
        }
    }

    /// Record a snapshot and forget anything that could be redone.
    pub fn commit(&mut self, snapshot: T) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        Self::trim(&mut self.undo_stack, self.max_depth);
        log::debug!("History commit (undo depth {})", self.undo_stack.len());
    }

    /// Step back. Returns the state to restore, or `None` when there is
    /// nothing to undo (in which case `current` is dropped).
    pub fn undo(&mut self, current: T) -> Option<T> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Self::trim(&mut self.redo_stack, self.max_depth);
        Some(snapshot)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: T) -> Option<T> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Self::trim(&mut self.undo_stack, self.max_depth);
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut history = History::default();
        let mut state = vec![1];

        history.commit(state.clone());
        state.push(2);

        let restored = history.undo(state.clone()).unwrap();
        assert_eq!(restored, vec![1]);
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again, vec![1, 2]);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_commit_clears_redo() {
        let mut history = History::default();
        history.commit(0);
        let back = history.undo(1).unwrap();
        assert!(history.can_redo());
        history.commit(back);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history: History<u32> = History::default();
        assert!(!history.can_undo());
        assert_eq!(history.undo(7), None);
        assert_eq!(history.redo(7), None);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut history = History::new(DEFAULT_HISTORY_DEPTH);
        for i in 0..25 {
            history.commit(i);
        }
        assert_eq!(history.undo_len(), 20);

        let mut current = 25;
        let mut seen = Vec::new();
        while let Some(previous) = history.undo(current) {
            seen.push(previous);
            current = previous;
        }
        assert_eq!(seen.first(), Some(&24));
        assert_eq!(seen.last(), Some(&5));
    }
}
