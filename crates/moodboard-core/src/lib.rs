//! Moodboard Core Library
//!
//! Scene graph, grouping and selection engine for the moodboard canvas:
//! cards and groups placed on an infinite surface, multi-selection with
//! group-aware moves, and the record shapes used to persist a board.

pub mod elements;
pub mod records;
pub mod selection;
pub mod storage;

pub use elements::{
    BoardId, Bounds, CanvasElement, CardElement, CardRole, CardSource, CardType, Element,
    ElementId, ElementKind, GroupColor, GroupElement,
};
pub use records::{BoardSnapshot, GroupRecord, RecordError, ReferenceCard};
pub use selection::{DeleteOutcome, GroupOutcome, SelectionManager, SerializedSelection};
pub use storage::{MemoryStore, RecordStore, SaveQueue, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
