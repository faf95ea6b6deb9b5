use std::path::Path;

use crate::{
    domain::{clock::SystemClock, snapshot::Snapshot},
    infra::{
        self,
        config::{AppConfig, FileConfigAdapter},
        contracts::{ConfigAdapter, SnapshotStore},
        error::AppError,
        snapshot_store::{demo_dataset, read_snapshot, FileSnapshotStore},
        storage_layout::StorageLayout,
        stubs::MemorySnapshotStore,
    },
    usecases::{
        chat_service::{ChatPolicy, ChatService},
        context::AppContext,
        reply_simulator::ReplySimulator,
    },
};

const SEED_SOURCE_SELECTED: &str = "BOOTSTRAP_SEED_SOURCE_SELECTED";

/// Where the initial chat state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Snapshot,
    Dataset,
    Demo,
}

impl SeedSource {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Dataset => "dataset",
            Self::Demo => "demo",
        }
    }
}

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let mut context = build_context(config_path)?;
    if context.config.logging.file || context.config.storage.persist {
        context.layout.ensure_dirs()?;
    }
    context.log_guard = infra::logging::init(&context.config.logging, &context.layout)?;

    Ok(context)
}

fn build_context(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let config_adapter = FileConfigAdapter::new(config_path);
    let config = config_adapter.load().map_err(AppError::Other)?;
    let layout = StorageLayout::resolve()?;

    Ok(AppContext::new(config, layout))
}

/// Picks the snapshot store: a locked file in the data dir when persistence
/// is on, memory otherwise.
pub fn open_snapshot_store(context: &AppContext) -> Result<Box<dyn SnapshotStore>, AppError> {
    if context.config.storage.persist {
        Ok(Box::new(FileSnapshotStore::open(&context.layout)?))
    } else {
        Ok(Box::new(MemorySnapshotStore::default()))
    }
}

pub fn chat_policy(config: &AppConfig) -> ChatPolicy {
    ChatPolicy {
        current_user_id: config.profile.current_user_id.clone(),
        typing_duration_ms: config.chat.typing_duration_ms,
        enforce_sender_only: config.chat.enforce_sender_only,
    }
}

/// Builds the chat service and seeds it from the first available source:
/// persisted snapshot, configured dataset, then the built-in demo.
pub fn compose_service(
    config: &AppConfig,
    store: &dyn SnapshotStore,
) -> Result<(ChatService, SeedSource), AppError> {
    let (snapshot, source) = select_seed(config, store)?;

    let mut service = ChatService::new(chat_policy(config), Box::new(SystemClock));
    if config.simulation.auto_reply {
        service = service.with_simulator(ReplySimulator::new(
            config.simulation.reply_delay_ms,
            config.simulation.replies.clone(),
        ));
    }
    service.restore(snapshot)?;

    tracing::info!(
        code = SEED_SOURCE_SELECTED,
        source = source.as_label(),
        "chat state seeded"
    );
    Ok((service, source))
}

fn select_seed(
    config: &AppConfig,
    store: &dyn SnapshotStore,
) -> Result<(Snapshot, SeedSource), AppError> {
    if let Some(snapshot) = store.load().map_err(AppError::Other)? {
        return Ok((snapshot, SeedSource::Snapshot));
    }

    if let Some(path) = config.storage.dataset_path.as_deref() {
        return Ok((read_snapshot(path)?, SeedSource::Dataset));
    }

    Ok((demo_dataset()?, SeedSource::Demo))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::domain::conversation::ConversationId;

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let context = build_context(Some(Path::new("./missing-config.toml")))
            .expect("context should build from defaults");

        assert_eq!(context.config, AppConfig::default());
    }

    #[test]
    fn seeds_from_demo_when_nothing_else_exists() {
        let store = MemorySnapshotStore::default();

        let (service, source) =
            compose_service(&AppConfig::default(), &store).expect("service should compose");

        assert_eq!(source, SeedSource::Demo);
        assert!(!service.conversations().expect("list").is_empty());
    }

    #[test]
    fn prefers_persisted_snapshot_over_dataset() {
        let mut config = AppConfig::default();
        config.storage.dataset_path = Some("./does-not-exist.toml".into());
        let store = MemorySnapshotStore {
            saved: Some(Snapshot::default()),
            save_count: 0,
        };

        let (service, source) = compose_service(&config, &store).expect("compose");

        assert_eq!(source, SeedSource::Snapshot);
        assert!(service.conversations().expect("list").is_empty());
    }

    #[test]
    fn loads_configured_dataset() {
        let temp = tempfile::tempdir().expect("temp dir");
        let dataset = temp.path().join("dataset.toml");
        fs::write(
            &dataset,
            r#"[[conversations]]
id = "solo"
participant_id = "u-ava"
participant_name = "Ava Brooks"

[[conversations.messages]]
id = "solo-1"
sender_id = "u-ava"
text = "Welcome!"
created_at_ms = 1000
"#,
        )
        .expect("write dataset");
        let mut config = AppConfig::default();
        config.storage.dataset_path = Some(dataset);

        let (service, source) =
            compose_service(&config, &MemorySnapshotStore::default()).expect("compose");

        assert_eq!(source, SeedSource::Dataset);
        let solo = ConversationId::from("solo");
        assert_eq!(service.unread_count(&solo), Ok(1));
        assert_eq!(service.get_messages(&solo).expect("exists")[0].text, "Welcome!");
    }

    #[test]
    fn missing_dataset_is_reported() {
        let mut config = AppConfig::default();
        config.storage.dataset_path = Some("./no-such-dataset.toml".into());

        let err = compose_service(&config, &MemorySnapshotStore::default())
            .expect_err("missing dataset");

        assert!(matches!(err, AppError::SnapshotIo { .. }));
    }

    #[test]
    fn policy_follows_config() {
        let mut config = AppConfig::default();
        config.profile.current_user_id = "alex".to_owned();
        config.chat.enforce_sender_only = false;

        let policy = chat_policy(&config);

        assert_eq!(policy.current_user_id, "alex");
        assert!(!policy.enforce_sender_only);
    }
}
