use crate::domain::card::CardId;
use serde::Serialize;
use std::collections::HashMap;

/// Cards with a persistence call in flight
///
/// A card may have more than one outstanding call (an edit issued while a
/// move is still saving), so each entry counts its calls. The entry
/// disappears once the last of them settles, whatever the outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingMap {
    in_flight: HashMap<CardId, usize>,
}

impl PendingMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a persistence call for `id`
    pub fn begin(&mut self, id: &CardId) {
        *self.in_flight.entry(id.clone()).or_insert(0) += 1;
        tracing::trace!(card_id = %id, "persistence call started");
    }

    /// Records that one persistence call for `id` settled
    pub fn settle(&mut self, id: &CardId) {
        let Some(count) = self.in_flight.get_mut(id) else {
            return;
        };
        *count -= 1;
        if *count == 0 {
            self.in_flight.remove(id);
        }
        tracing::trace!(card_id = %id, "persistence call settled");
    }

    pub fn is_pending(&self, id: &CardId) -> bool {
        self.in_flight.contains_key(id)
    }

    /// Number of calls in flight for `id`
    pub fn outstanding(&self, id: &CardId) -> usize {
        self.in_flight.get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_settle() {
        let mut pending = PendingMap::new();
        let id = CardId::new("c1");

        assert!(!pending.is_pending(&id));
        pending.begin(&id);
        assert!(pending.is_pending(&id));

        pending.settle(&id);
        assert!(!pending.is_pending(&id));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_overlapping_calls_keep_entry_until_last_settles() {
        let mut pending = PendingMap::new();
        let id = CardId::new("c1");

        pending.begin(&id);
        pending.begin(&id);
        assert_eq!(pending.outstanding(&id), 2);

        pending.settle(&id);
        assert!(pending.is_pending(&id));

        pending.settle(&id);
        assert!(!pending.is_pending(&id));
    }

    #[test]
    fn test_settle_unknown_id_is_noop() {
        let mut pending = PendingMap::new();
        pending.begin(&CardId::new("a"));
        pending.settle(&CardId::new("b"));

        assert_eq!(pending.len(), 1);
        assert_eq!(pending.outstanding(&CardId::new("b")), 0);
    }
}
