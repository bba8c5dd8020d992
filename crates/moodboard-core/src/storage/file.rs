//! File-based record store for native platforms.

use super::{BoxFuture, RecordStore, StorageError, StorageResult};
use crate::elements::{BoardId, ElementId};
use crate::records::{BoardSnapshot, GroupRecord, ReferenceCard};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Stores each board as one `<board_id>.json` snapshot in a directory.
///
/// Every record write is a read-modify-write of the whole board file, so
/// writes are serialized through `lock` and land via rename.
pub struct FileStore {
    /// Base directory for board files.
    base_path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            lock: Mutex::new(()),
        })
    }

    /// Create a file store in the default location.
    ///
    /// On Unix: `~/.local/share/moodboard/boards/`
    /// On Windows: `%LOCALAPPDATA%\moodboard\boards\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("moodboard").join("boards"))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn board_path(&self, board_id: BoardId) -> PathBuf {
        self.base_path.join(format!("{}.json", board_id))
    }

    fn guard(&self) -> StorageResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn read_board(&self, board_id: BoardId) -> StorageResult<Option<BoardSnapshot>> {
        let path = self.board_path(board_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let snapshot = BoardSnapshot::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(snapshot))
    }

    fn write_board(&self, snapshot: &BoardSnapshot) -> StorageResult<()> {
        let path = self.board_path(snapshot.board_id);
        let staging = path.with_extension("json.tmp");
        let json = snapshot.to_json()?;
        fs::write(&staging, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", staging.display(), e))
        })?;
        // Readers see either the old file or the new one, never a partial write.
        fs::rename(&staging, &path)
            .map_err(|e| StorageError::Io(format!("Failed to replace {}: {}", path.display(), e)))
    }

    fn remove_board(&self, board_id: BoardId) -> StorageResult<()> {
        let path = self.board_path(board_id);
        fs::remove_file(&path)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
    }

    /// Read-modify-write one board file. `edit` returns whether anything changed.
    ///
    /// A board left without records is removed.
    fn update_board(
        &self,
        board_id: BoardId,
        create: bool,
        edit: impl FnOnce(&mut BoardSnapshot) -> bool,
    ) -> StorageResult<()> {
        let _guard = self.guard()?;
        let mut snapshot = match self.read_board(board_id)? {
            Some(snapshot) => snapshot,
            None if create => BoardSnapshot::new(board_id),
            None => return Ok(()),
        };
        if !edit(&mut snapshot) {
            return Ok(());
        }
        if snapshot.is_empty() {
            self.remove_board(board_id)
        } else {
            self.write_board(&snapshot)
        }
    }
}

impl RecordStore for FileStore {
    fn save_card(&self, card: &ReferenceCard) -> BoxFuture<'_, StorageResult<()>> {
        let card = card.clone();
        Box::pin(async move {
            self.update_board(card.board_id, true, |board| {
                board.upsert_card(card);
                true
            })
        })
    }

    fn save_group(&self, group: &GroupRecord) -> BoxFuture<'_, StorageResult<()>> {
        let group = group.clone();
        Box::pin(async move {
            self.update_board(group.board_id, true, |board| {
                board.upsert_group(group);
                true
            })
        })
    }

    fn delete_card(&self, board_id: BoardId, id: ElementId) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move { self.update_board(board_id, false, |board| board.remove_card(id)) })
    }

    fn delete_group(
        &self,
        board_id: BoardId,
        id: ElementId,
    ) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move { self.update_board(board_id, false, |board| board.remove_group(id)) })
    }

    fn load_board(&self, board_id: BoardId) -> BoxFuture<'_, StorageResult<BoardSnapshot>> {
        Box::pin(async move {
            let _guard = self.guard()?;
            self.read_board(board_id)?
                .ok_or_else(|| StorageError::NotFound(board_id.to_string()))
        })
    }

    fn list_boards(&self) -> BoxFuture<'_, StorageResult<Vec<BoardId>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                // Other files in the directory are not boards.
                if let Some(id) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| Uuid::parse_str(stem).ok())
                {
                    ids.push(id);
                }
            }
            ids.sort();
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{CanvasElement, CardElement, CardSource, CardType, GroupElement};
    use crate::storage::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_save_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let board = Uuid::new_v4();

        let group = GroupElement::new(board).with_title("Hair & makeup");
        let card = CardElement::new(board, CardType::Link, CardSource::Pinterest, "pin")
            .with_source_url("https://pinterest.com/pin/1")
            .with_group_id(group.id());

        block_on(store.save_group(&group.to_record())).unwrap();
        block_on(store.save_card(&card.to_reference_card())).unwrap();

        let loaded = block_on(store.load_board(board)).unwrap();
        assert_eq!(loaded.cards, vec![card.to_reference_card()]);
        assert_eq!(loaded.groups[0].title, "Hair & makeup");
        assert!(dir.path().join(format!("{}.json", board)).exists());
    }

    #[test]
    fn test_file_store_not_found() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(store.load_board(Uuid::new_v4()));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_store_delete() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let board = Uuid::new_v4();
        let group = GroupElement::new(board);

        let card = CardElement::new(board, CardType::Text, CardSource::Upload, "keep");

        block_on(store.save_group(&group.to_record())).unwrap();
        block_on(store.save_card(&card.to_reference_card())).unwrap();
        block_on(store.delete_group(board, group.id())).unwrap();
        block_on(store.delete_card(Uuid::new_v4(), Uuid::new_v4())).unwrap();

        let loaded = block_on(store.load_board(board)).unwrap();
        assert!(loaded.groups.is_empty());
        assert_eq!(loaded.cards.len(), 1);

        // last record gone, board gone
        block_on(store.delete_card(board, card.id())).unwrap();
        let result = block_on(store.load_board(board));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(block_on(store.list_boards()).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_saves_keep_every_card() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let board = Uuid::new_v4();

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..40 {
                        let card = CardElement::new(
                            board,
                            CardType::Text,
                            CardSource::Upload,
                            format!("{}-{}", worker, i),
                        );
                        block_on(store.save_card(&card.to_reference_card())).unwrap();
                    }
                });
            }
        });

        let loaded = block_on(store.load_board(board)).unwrap();
        assert_eq!(loaded.cards.len(), 320);
        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_file_store_list() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        block_on(store.save_group(&GroupElement::new(first).to_record())).unwrap();
        block_on(store.save_group(&GroupElement::new(second).to_record())).unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        let list = block_on(store.list_boards()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&first) && list.contains(&second));
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        let board = Uuid::new_v4();
        fs::write(dir.path().join(format!("{}.json", board)), "{ nope").unwrap();

        let result = block_on(store.load_board(board));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
