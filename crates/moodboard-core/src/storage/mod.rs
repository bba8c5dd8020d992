//! Storage abstraction for board records.
//!
//! The engine never does I/O itself. A `RecordStore` persists the flat
//! records produced by the elements, and `SaveQueue` batches the writes that
//! follow a burst of edits such as a drag.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{DEFAULT_SAVE_DELAY_MS, FlushReport, SaveQueue};
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

use crate::elements::{BoardId, ElementId};
use crate::records::{BoardSnapshot, GroupRecord, RecordError, ReferenceCard};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Board not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<RecordError> for StorageError {
    fn from(err: RecordError) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Persistence backend for card and group records.
///
/// Records are keyed by element id within a board. Membership is carried by
/// the card's `group_id`, so deleting a group never touches card rows.
///
/// Note: On native platforms, implementations must be Send + Sync.
#[cfg(not(target_arch = "wasm32"))]
pub trait RecordStore: Send + Sync {
    /// Insert or replace a card row.
    fn save_card(&self, card: &ReferenceCard) -> BoxFuture<'_, StorageResult<()>>;

    /// Insert or replace a group row.
    fn save_group(&self, group: &GroupRecord) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove a card row. Missing rows are not an error.
    fn delete_card(&self, board_id: BoardId, id: ElementId) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove a group row. Missing rows are not an error.
    fn delete_group(&self, board_id: BoardId, id: ElementId)
    -> BoxFuture<'_, StorageResult<()>>;

    /// Every record of a board.
    fn load_board(&self, board_id: BoardId) -> BoxFuture<'_, StorageResult<BoardSnapshot>>;

    /// Ids of every board with stored records.
    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardId>>>;
}

/// Persistence backend for card and group records (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait RecordStore {
    fn save_card(&self, card: &ReferenceCard) -> BoxFuture<'_, StorageResult<()>>;

    fn save_group(&self, group: &GroupRecord) -> BoxFuture<'_, StorageResult<()>>;

    fn delete_card(&self, board_id: BoardId, id: ElementId) -> BoxFuture<'_, StorageResult<()>>;

    fn delete_group(&self, board_id: BoardId, id: ElementId)
    -> BoxFuture<'_, StorageResult<()>>;

    fn load_board(&self, board_id: BoardId) -> BoxFuture<'_, StorageResult<BoardSnapshot>>;

    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardId>>>;
}

/// Poll a future to completion on the current thread.
///
/// Store futures never wait on anything external, so a no-op waker suffices.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut cx = Context::from_waker(Waker::noop());
    let mut f = std::pin::pin!(f);
    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
