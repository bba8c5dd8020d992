//! Debounced persistence of element changes.
//!
//! Edits mark element ids dirty. A flush writes the current record of every
//! dirty element that is still registered, then applies pending deletions.
//! `maybe_flush` only flushes once the board has been quiet for the
//! configured interval, so a drag produces one write per element.

use crate::elements::{BoardId, Element, ElementId};
use crate::selection::{DeleteOutcome, GroupOutcome, SelectionManager};
use crate::storage::{RecordStore, StorageResult};
use std::collections::BTreeSet;
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default quiet period before pending changes are written.
pub const DEFAULT_SAVE_DELAY_MS: u64 = 500;

/// Counts of the writes performed by one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub cards_saved: usize,
    pub groups_saved: usize,
    pub cards_deleted: usize,
    pub groups_deleted: usize,
}

impl FlushReport {
    pub fn total(&self) -> usize {
        self.cards_saved + self.groups_saved + self.cards_deleted + self.groups_deleted
    }
}

/// Coalesces element changes and writes them to a store.
pub struct SaveQueue<S: RecordStore> {
    store: Arc<S>,
    interval: Duration,
    /// Time of the most recent change.
    last_change: Option<Instant>,
    dirty: BTreeSet<ElementId>,
    deleted_cards: BTreeSet<ElementId>,
    deleted_groups: BTreeSet<ElementId>,
}

impl<S: RecordStore> SaveQueue<S> {
    /// Create a queue writing to `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            interval: Duration::from_millis(DEFAULT_SAVE_DELAY_MS),
            last_change: None,
            dirty: BTreeSet::new(),
            deleted_cards: BTreeSet::new(),
            deleted_groups: BTreeSet::new(),
        }
    }

    /// Set the quiet period.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Record that an element's persisted fields changed.
    pub fn mark_dirty(&mut self, id: ElementId) {
        self.dirty.insert(id);
        self.touch();
    }

    pub fn mark_dirty_all(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.dirty.extend(ids);
        self.touch();
    }

    pub fn mark_card_deleted(&mut self, id: ElementId) {
        self.dirty.remove(&id);
        self.deleted_cards.insert(id);
        self.touch();
    }

    pub fn mark_group_deleted(&mut self, id: ElementId) {
        self.dirty.remove(&id);
        self.deleted_groups.insert(id);
        self.touch();
    }

    /// Queue everything a `delete_selection` call left to persist.
    pub fn mark_deletion(&mut self, outcome: &DeleteOutcome) {
        for id in &outcome.deleted_ids {
            if outcome.deleted_group_ids.contains(id) {
                self.mark_group_deleted(*id);
            } else {
                self.mark_card_deleted(*id);
            }
        }
        self.mark_dirty_all(outcome.orphaned_card_ids.iter().copied());
        self.mark_dirty_all(outcome.refitted_group_ids.iter().copied());
    }

    /// Queue the new group, its cards and every group it shrank.
    pub fn mark_grouping(&mut self, outcome: &GroupOutcome) {
        self.mark_dirty(outcome.group_id);
        self.mark_dirty_all(outcome.card_ids.iter().copied());
        self.mark_dirty_all(outcome.refitted_group_ids.iter().copied());
    }

    /// Whether anything is waiting to be written.
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty() || !self.deleted_cards.is_empty() || !self.deleted_groups.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.dirty.len() + self.deleted_cards.len() + self.deleted_groups.len()
    }

    /// Check if changes are pending and the board has been quiet long enough.
    pub fn should_flush(&self) -> bool {
        if !self.is_dirty() {
            return false;
        }
        match self.last_change {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Flush if `should_flush` allows it. Returns whether a flush ran.
    pub async fn maybe_flush(
        &mut self,
        manager: &SelectionManager,
        board_id: BoardId,
    ) -> StorageResult<bool> {
        if !self.should_flush() {
            return Ok(false);
        }
        self.flush(manager, board_id).await?;
        Ok(true)
    }

    /// Write every pending change now.
    ///
    /// Dirty ids that are no longer registered are dropped. On error the
    /// entries not yet written stay queued.
    pub async fn flush(
        &mut self,
        manager: &SelectionManager,
        board_id: BoardId,
    ) -> StorageResult<FlushReport> {
        let mut report = FlushReport::default();

        while let Some(id) = self.dirty.first().copied() {
            match manager.element(id) {
                Some(Element::Card(card)) => {
                    self.store.save_card(&card.to_reference_card()).await?;
                    report.cards_saved += 1;
                }
                Some(Element::Group(group)) => {
                    self.store.save_group(&group.to_record()).await?;
                    report.groups_saved += 1;
                }
                None => log::debug!("Skipping save of unregistered element {}", id),
            }
            self.dirty.remove(&id);
        }

        while let Some(id) = self.deleted_cards.first().copied() {
            self.store.delete_card(board_id, id).await?;
            self.deleted_cards.remove(&id);
            report.cards_deleted += 1;
        }

        while let Some(id) = self.deleted_groups.first().copied() {
            self.store.delete_group(board_id, id).await?;
            self.deleted_groups.remove(&id);
            report.groups_deleted += 1;
        }

        log::debug!("Flushed {} changes for board {}", report.total(), board_id);
        Ok(report)
    }

    fn touch(&mut self) {
        self.last_change = Some(Instant::now());
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::elements::{CanvasElement, CardElement, CardSource, CardType};
    use crate::storage::{MemoryStore, block_on};
    use uuid::Uuid;

    fn board_with_cards(board: BoardId, n: usize) -> (SelectionManager, Vec<ElementId>) {
        let mut manager = SelectionManager::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let card = CardElement::new(board, CardType::Image, CardSource::Upload, "c")
                .with_origin(i as f64 * 300.0, 0.0)
                .with_size(100.0, 100.0);
            ids.push(card.id());
            manager.register_element(card.into());
        }
        (manager, ids)
    }

    #[test]
    fn test_new_queue_is_clean() {
        let queue = SaveQueue::new(Arc::new(MemoryStore::new()));
        assert!(!queue.is_dirty());
        assert!(!queue.should_flush());
        assert_eq!(queue.interval(), Duration::from_millis(DEFAULT_SAVE_DELAY_MS));
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let mut queue = SaveQueue::new(Arc::new(MemoryStore::new()));
        queue.set_interval(Duration::from_secs(3600));
        queue.mark_dirty(Uuid::new_v4());
        assert!(queue.is_dirty());
        assert!(!queue.should_flush());

        queue.set_interval(Duration::ZERO);
        assert!(queue.should_flush());
    }

    #[test]
    fn test_repeated_marks_coalesce() {
        let board = Uuid::new_v4();
        let (mut manager, ids) = board_with_cards(board, 2);
        let store = Arc::new(MemoryStore::new());
        let mut queue = SaveQueue::new(store.clone());

        // a drag: many moves, same ids
        manager.select_multiple(ids.clone());
        for _ in 0..10 {
            let changed = manager.move_selection(1.0, 0.0);
            queue.mark_dirty_all(changed);
        }
        assert_eq!(queue.pending_count(), 2);

        let report = block_on(queue.flush(&manager, board)).unwrap();
        assert_eq!(report.cards_saved, 2);
        assert!(!queue.is_dirty());

        let snapshot = block_on(store.load_board(board)).unwrap();
        let first = snapshot.cards.iter().find(|c| c.id == ids[0]).unwrap();
        assert!((first.x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_maybe_flush_respects_interval() {
        let board = Uuid::new_v4();
        let (manager, ids) = board_with_cards(board, 1);
        let mut queue = SaveQueue::new(Arc::new(MemoryStore::new()));
        queue.set_interval(Duration::from_secs(3600));
        queue.mark_dirty(ids[0]);

        assert!(!block_on(queue.maybe_flush(&manager, board)).unwrap());
        queue.set_interval(Duration::ZERO);
        assert!(block_on(queue.maybe_flush(&manager, board)).unwrap());
        assert!(!queue.is_dirty());
    }

    #[test]
    fn test_deletion_flow() {
        let board = Uuid::new_v4();
        let (mut manager, ids) = board_with_cards(board, 3);
        let store = Arc::new(MemoryStore::new());
        let mut queue = SaveQueue::new(store.clone());

        manager.select_multiple([ids[0], ids[1]]);
        let group_id = manager.create_group_from_selection(board).unwrap();
        queue.mark_dirty_all(ids.iter().copied().chain([group_id]));
        block_on(queue.flush(&manager, board)).unwrap();

        manager.select_only(group_id);
        manager.select(ids[0]);
        let outcome = manager.delete_selection();
        queue.mark_deletion(&outcome);
        let report = block_on(queue.flush(&manager, board)).unwrap();

        assert_eq!(report.cards_deleted, 1);
        assert_eq!(report.groups_deleted, 1);
        assert_eq!(report.cards_saved, 1);

        let snapshot = block_on(store.load_board(board)).unwrap();
        assert!(snapshot.groups.is_empty());
        assert_eq!(snapshot.cards.len(), 2);
        let orphan = snapshot.cards.iter().find(|c| c.id == ids[1]).unwrap();
        assert!(orphan.group_id.is_none());
    }

    #[test]
    fn test_regrouping_persists_shrunk_group() {
        let board = Uuid::new_v4();
        let (mut manager, ids) = board_with_cards(board, 3);
        let store = Arc::new(MemoryStore::new());
        let mut queue = SaveQueue::new(store.clone());

        manager.select_multiple([ids[0], ids[1]]);
        let first = manager.group_selection(board).unwrap();
        queue.mark_grouping(&first);
        block_on(queue.flush(&manager, board)).unwrap();

        manager.select_only(ids[1]);
        manager.select(ids[2]);
        let second = manager.group_selection(board).unwrap();
        queue.mark_grouping(&second);
        let report = block_on(queue.flush(&manager, board)).unwrap();
        assert_eq!(report.groups_saved, 2);

        let reloaded = block_on(store.load_board(board)).unwrap().into_manager();
        let live = manager.group(first.group_id).unwrap().bounds();
        assert_eq!(reloaded.group(first.group_id).unwrap().bounds(), live);
        assert_eq!(reloaded.group(first.group_id).unwrap().child_ids(), [ids[0]]);
    }

    #[test]
    fn test_unregistered_dirty_ids_are_dropped() {
        let board = Uuid::new_v4();
        let (manager, _) = board_with_cards(board, 0);
        let mut queue = SaveQueue::new(Arc::new(MemoryStore::new()));
        queue.mark_dirty(Uuid::new_v4());
        let report = block_on(queue.flush(&manager, board)).unwrap();
        assert_eq!(report.total(), 0);
        assert!(!queue.is_dirty());
    }
}
