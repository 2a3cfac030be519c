use std::collections::VecDeque;

use log::debug;

/// A recorded state together with the label of the step that left it.
#[derive(Debug, Clone)]
struct Snapshot<T> {
    state: T,
    label: &'static str,
}

/// Snapshot-based undo/redo around any cloneable state.
///
/// Every recorded step stores a full copy of the state as it was before the
/// step. A batch (opened with [`History::begin_batch`]) lets any number of
/// dispatches collapse into a single undo step.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    current: T,
    past: Vec<Snapshot<T>>,
    future: VecDeque<Snapshot<T>>,
    batch_start: Option<Snapshot<T>>,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            current: initial,
            past: Vec::new(),
            future: VecDeque::new(),
            batch_start: None,
        }
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    /// Commit `updater(current)` as the new state.
    ///
    /// Outside a batch the previous state is pushed as its own undo step and
    /// the redo queue is cleared. Inside a batch nothing is recorded; the batch
    /// pushes its opening state once, on [`History::end_batch`].
    pub fn dispatch<F>(&mut self, label: &'static str, updater: F)
    where
        F: FnOnce(&T) -> T,
    {
        if self.batch_start.is_none() {
            self.past.push(Snapshot {
                state: self.current.clone(),
                label,
            });
            self.future.clear();
            debug!("history: recorded '{}' ({} undo steps)", label, self.past.len());
        }
        self.current = updater(&self.current);
    }

    /// [`History::dispatch`] with an in-place mutation of a copy of the state.
    pub fn update<F>(&mut self, label: &'static str, mutate: F)
    where
        F: FnOnce(&mut T),
    {
        self.dispatch(label, |prev| {
            let mut next = prev.clone();
            mutate(&mut next);
            next
        });
    }

    /// Open a batch. Nested calls before [`History::end_batch`] are no-ops.
    pub fn begin_batch(&mut self, label: &'static str) {
        if self.batch_start.is_some() {
            return;
        }
        self.batch_start = Some(Snapshot {
            state: self.current.clone(),
            label,
        });
        self.future.clear();
        debug!("history: batch '{}' opened", label);
    }

    /// Close the open batch, recording its opening state as one undo step.
    /// Without an open batch this is a no-op.
    pub fn end_batch(&mut self) {
        if let Some(start) = self.batch_start.take() {
            debug!("history: batch '{}' closed", start.label);
            self.past.push(start);
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch_start.is_some()
    }

    /// Step back one entry. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, prev.state);
        self.future.push_front(Snapshot {
            state: current,
            label: prev.label,
        });
        debug!("history: undo '{}'", prev.label);
        true
    }

    /// Step forward one entry. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next.state);
        self.past.push(Snapshot {
            state: current,
            label: next.label,
        });
        debug!("history: redo '{}'", next.label);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_label(&self) -> Option<&'static str> {
        self.past.last().map(|s| s.label)
    }

    pub fn redo_label(&self) -> Option<&'static str> {
        self.future.front().map(|s| s.label)
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Every state the history can still reach, the current one included.
    pub fn states(&self) -> impl Iterator<Item = &T> {
        std::iter::once(&self.current)
            .chain(self.past.iter().map(|s| &s.state))
            .chain(self.future.iter().map(|s| &s.state))
            .chain(self.batch_start.iter().map(|s| &s.state))
    }
}

impl<T: Clone + Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
