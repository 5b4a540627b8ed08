//! Optimistic pin toggling.
//!
//! A toggle flips the flag locally right away and is then reconciled with
//! the backend's answer: committed on success, restored on failure.

use crate::error::{AgendaError, AgendaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Committed,
    /// Flipped locally, waiting for the backend; `previous` is the value to restore
    Pending { previous: bool },
    RolledBack,
}

#[derive(Debug, Clone)]
pub struct PinEntry<T> {
    pub id: i64,
    pub item: T,
    pinned: bool,
    state: PinState,
}

impl<T> PinEntry<T> {
    pub fn pinned(&self) -> bool {
        self.pinned
    }

    pub fn state(&self) -> PinState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, PinState::Pending { .. })
    }
}

/// Items that can be pinned, e.g. notes or task lists.
#[derive(Debug, Clone, Default)]
pub struct PinBoard<T> {
    entries: Vec<PinEntry<T>>,
}

impl<T> PinBoard<T> {
    pub fn new(items: impl IntoIterator<Item = (i64, bool, T)>) -> Self {
        PinBoard {
            entries: items
                .into_iter()
                .map(|(id, pinned, item)| PinEntry {
                    id,
                    item,
                    pinned,
                    state: PinState::Committed,
                })
                .collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&PinEntry<T>> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Flip `id` locally and mark it pending. Returns the new pinned value,
    /// which is what should be sent to the backend.
    pub fn begin_toggle(&mut self, id: i64) -> AgendaResult<bool> {
        let entry = self.entry_mut(id)?;
        if entry.is_pending() {
            return Err(AgendaError::Pin(format!("Item {id} already has a toggle in flight")));
        }

        let previous = entry.pinned;
        entry.pinned = !previous;
        entry.state = PinState::Pending { previous };
        tracing::debug!(id, pinned = entry.pinned, "pin toggle pending");
        Ok(entry.pinned)
    }

    /// Reconcile a pending toggle with the backend's answer.
    pub fn resolve<E: std::fmt::Display>(&mut self, id: i64, outcome: Result<(), E>) -> AgendaResult<PinState> {
        let entry = self.entry_mut(id)?;
        let PinState::Pending { previous } = entry.state else {
            return Err(AgendaError::Pin(format!("Item {id} has no toggle in flight")));
        };

        entry.state = match outcome {
            Ok(()) => PinState::Committed,
            Err(err) => {
                tracing::warn!(id, "pin toggle failed, restoring: {err}");
                entry.pinned = previous;
                PinState::RolledBack
            }
        };
        Ok(entry.state)
    }

    /// Pinned first; otherwise insertion order.
    pub fn ordered(&self) -> Vec<&PinEntry<T>> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by_key(|e| !e.pinned);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, id: i64) -> AgendaResult<&mut PinEntry<T>> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| AgendaError::Pin(format!("Unknown item {id}")))
    }
}
