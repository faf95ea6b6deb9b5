use std::path::PathBuf;

use thiserror::Error;

use crate::domain::error::ChatError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to initialize logging: {0}")]
    LoggingInit(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("failed to resolve storage path: {details}")]
    StoragePathResolution { details: String },
    #[error("failed to create storage directory at {path}: {source}")]
    StorageDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot store at {path} is locked by another process")]
    SnapshotBusy { path: PathBuf },
    #[error("failed to access snapshot file at {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse chat data at {path}: {source}")]
    SnapshotParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    SnapshotEncode(#[source] toml::ser::Error),
    #[error("chat data rejected: {0}")]
    ChatState(#[from] ChatError),
    #[error(transparent)]
    Other(anyhow::Error),
}
