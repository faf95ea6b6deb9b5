use anyhow::Result;

use crate::{domain::snapshot::Snapshot, infra::config::AppConfig};

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Durable home of the chat state between runs.
pub trait SnapshotStore {
    /// Returns None when nothing has been saved yet.
    fn load(&self) -> Result<Option<Snapshot>>;
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;
}
