//! TOML-backed chat state: seed datasets and the persisted snapshot.
//!
//! The snapshot file is guarded by an exclusive advisory lock held for the
//! lifetime of `FileSnapshotStore`, so two running shells never interleave
//! writes.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use anyhow::Result;
use fs2::FileExt;

use crate::{
    domain::snapshot::Snapshot,
    infra::{contracts::SnapshotStore, error::AppError, storage_layout::StorageLayout},
};

const SNAPSHOT_SAVED: &str = "STORAGE_SNAPSHOT_SAVED";
const SNAPSHOT_LOADED: &str = "STORAGE_SNAPSHOT_LOADED";

const DEMO_DATASET: &str = include_str!("../../fixtures/demo.toml");

#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    lock: File,
}

impl FileSnapshotStore {
    pub fn open(layout: &StorageLayout) -> Result<Self, AppError> {
        let lock_path = layout.snapshot_lock_file();
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|source| AppError::SnapshotIo {
                path: lock_path.clone(),
                source,
            })?;

        if let Err(source) = lock.try_lock_exclusive() {
            if source.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(AppError::SnapshotBusy { path: lock_path });
            }
            return Err(AppError::SnapshotIo {
                path: lock_path,
                source,
            });
        }

        Ok(Self {
            path: layout.snapshot_file(),
            lock,
        })
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileSnapshotStore {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.lock);
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let snapshot = read_snapshot(&self.path)?;
        tracing::info!(
            code = SNAPSHOT_LOADED,
            path = %self.path.display(),
            conversations = snapshot.conversations.len(),
            "snapshot loaded"
        );
        Ok(Some(snapshot))
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let encoded = toml::to_string_pretty(snapshot).map_err(AppError::SnapshotEncode)?;
        let tmp_path = self.path.with_extension("toml.tmp");

        fs::write(&tmp_path, encoded).map_err(|source| AppError::SnapshotIo {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| AppError::SnapshotIo {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            code = SNAPSHOT_SAVED,
            path = %self.path.display(),
            messages = snapshot.message_count(),
            "snapshot saved"
        );
        Ok(())
    }
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::SnapshotIo {
        path: path.to_path_buf(),
        source,
    })?;

    parse_snapshot(&raw, path)
}

/// Built-in sample conversations used when no dataset is configured.
pub fn demo_dataset() -> Result<Snapshot, AppError> {
    parse_snapshot(DEMO_DATASET, Path::new("<built-in demo>"))
}

fn parse_snapshot(raw: &str, path: &Path) -> Result<Snapshot, AppError> {
    toml::from_str(raw).map_err(|source| AppError::SnapshotParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::domain::{
        message::{MediaKind, Message, ReactionKind},
        snapshot::ConversationRecord,
    };

    fn layout(temp: &tempfile::TempDir) -> StorageLayout {
        let layout = StorageLayout::under(temp.path().join("chatline"));
        layout.ensure_dirs().expect("dirs");
        layout
    }

    fn sample_snapshot() -> Snapshot {
        let mut reactions = BTreeMap::new();
        reactions.insert("me".to_owned(), ReactionKind::Love);

        Snapshot {
            conversations: vec![ConversationRecord {
                id: "c1".into(),
                participant_id: "u2".to_owned(),
                participant_name: "Emma Wilson".to_owned(),
                read_up_to: Some("m1".into()),
                messages: vec![
                    Message {
                        id: "m1".into(),
                        conversation_id: "c1".into(),
                        sender_id: "u2".to_owned(),
                        text: "Look at this".to_owned(),
                        media_ref: Some("sunset.jpg".to_owned()),
                        media_kind: MediaKind::Image,
                        created_at_ms: 1_700_000_000_000,
                        edited_at_ms: None,
                        is_deleted: false,
                        reactions,
                        reply_to: None,
                    },
                    Message {
                        id: "m2".into(),
                        conversation_id: "c1".into(),
                        sender_id: "me".to_owned(),
                        text: String::new(),
                        media_ref: None,
                        media_kind: MediaKind::None,
                        created_at_ms: 1_700_000_060_000,
                        edited_at_ms: Some(1_700_000_070_000),
                        is_deleted: true,
                        reactions: BTreeMap::new(),
                        reply_to: Some("m1".into()),
                    },
                ],
            }],
        }
    }

    #[test]
    fn load_returns_none_before_first_save() {
        let temp = tempfile::tempdir().expect("temp dir");
        let store = FileSnapshotStore::open(&layout(&temp)).expect("open");

        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn save_then_load_restores_snapshot() {
        let temp = tempfile::tempdir().expect("temp dir");
        let mut store = FileSnapshotStore::open(&layout(&temp)).expect("open");
        let snapshot = sample_snapshot();

        store.save(&snapshot).expect("save");
        let loaded = store.load().expect("load").expect("snapshot present");

        assert_eq!(loaded, snapshot);
        assert!(!store.path().with_extension("toml.tmp").exists());
    }

    #[test]
    fn second_open_is_rejected_while_locked() {
        let temp = tempfile::tempdir().expect("temp dir");
        let layout = layout(&temp);
        let _first = FileSnapshotStore::open(&layout).expect("first open");

        let err = FileSnapshotStore::open(&layout).expect_err("lock must be exclusive");

        assert!(matches!(err, AppError::SnapshotBusy { .. }));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let temp = tempfile::tempdir().expect("temp dir");
        let layout = layout(&temp);
        drop(FileSnapshotStore::open(&layout).expect("first open"));

        FileSnapshotStore::open(&layout).expect("reopen after drop");
    }

    #[test]
    fn corrupt_snapshot_reports_parse_error() {
        let temp = tempfile::tempdir().expect("temp dir");
        let layout = layout(&temp);
        fs::write(layout.snapshot_file(), "conversations = 7").expect("write");
        let store = FileSnapshotStore::open(&layout).expect("open");

        let err = store.load().expect_err("corrupt file");

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::SnapshotParse { .. })
        ));
    }

    #[test]
    fn demo_dataset_parses() {
        let demo = demo_dataset().expect("demo dataset must parse");

        assert!(demo.conversations.len() >= 3);
        assert!(demo.message_count() > 0);
    }
}
