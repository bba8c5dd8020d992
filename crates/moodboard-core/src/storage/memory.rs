//! In-memory record store.

use super::{BoxFuture, RecordStore, StorageError, StorageResult};
use crate::elements::{BoardId, ElementId};
use crate::records::{BoardSnapshot, GroupRecord, ReferenceCard};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<BoardId, BoardSnapshot>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_error(e: impl std::fmt::Display) -> StorageError {
        StorageError::Other(format!("Lock error: {}", e))
    }
}

impl RecordStore for MemoryStore {
    fn save_card(&self, card: &ReferenceCard) -> BoxFuture<'_, StorageResult<()>> {
        let card = card.clone();
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(Self::lock_error)?;
            boards
                .entry(card.board_id)
                .or_insert_with(|| BoardSnapshot::new(card.board_id))
                .upsert_card(card);
            Ok(())
        })
    }

    fn save_group(&self, group: &GroupRecord) -> BoxFuture<'_, StorageResult<()>> {
        let group = group.clone();
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(Self::lock_error)?;
            boards
                .entry(group.board_id)
                .or_insert_with(|| BoardSnapshot::new(group.board_id))
                .upsert_group(group);
            Ok(())
        })
    }

    fn delete_card(&self, board_id: BoardId, id: ElementId) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(Self::lock_error)?;
            if let Some(board) = boards.get_mut(&board_id) {
                board.remove_card(id);
                if board.is_empty() {
                    boards.remove(&board_id);
                }
            }
            Ok(())
        })
    }

    fn delete_group(
        &self,
        board_id: BoardId,
        id: ElementId,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut boards = self.boards.write().map_err(Self::lock_error)?;
            if let Some(board) = boards.get_mut(&board_id) {
                board.remove_group(id);
                if board.is_empty() {
                    boards.remove(&board_id);
                }
            }
            Ok(())
        })
    }

    fn load_board(&self, board_id: BoardId) -> BoxFuture<'_, StorageResult<BoardSnapshot>> {
        Box::pin(async move {
            let boards = self.boards.read().map_err(Self::lock_error)?;
            boards
                .get(&board_id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(board_id.to_string()))
        })
    }

    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardId>>> {
        Box::pin(async move {
            let boards = self.boards.read().map_err(Self::lock_error)?;
            let mut ids: Vec<BoardId> = boards.keys().copied().collect();
            ids.sort();
            Ok(ids)
        })
    }
}
