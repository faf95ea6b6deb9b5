use anyhow::Result;

use crate::{domain::snapshot::Snapshot, infra::contracts::SnapshotStore};

#[cfg(test)]
use crate::infra::{config::AppConfig, contracts::ConfigAdapter};

#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

#[cfg(test)]
impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Keeps the snapshot in memory; used when persistence is disabled.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    pub saved: Option<Snapshot>,
    pub save_count: usize,
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.saved.clone())
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.saved = Some(snapshot.clone());
        self.save_count += 1;
        Ok(())
    }
}
