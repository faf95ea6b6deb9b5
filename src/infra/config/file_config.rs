use std::path::PathBuf;

use serde::Deserialize;

use crate::infra::config::{
    AppConfig, ChatConfig, LogConfig, ProfileConfig, SimulationConfig, StorageConfig, UiConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub profile: Option<FileProfileConfig>,
    pub chat: Option<FileChatConfig>,
    pub storage: Option<FileStorageConfig>,
    pub simulation: Option<FileSimulationConfig>,
    pub ui: Option<FileUiConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(profile) = self.profile {
            profile.merge_into(&mut config.profile);
        }

        if let Some(chat) = self.chat {
            chat.merge_into(&mut config.chat);
        }

        if let Some(storage) = self.storage {
            storage.merge_into(&mut config.storage);
        }

        if let Some(simulation) = self.simulation {
            simulation.merge_into(&mut config.simulation);
        }

        if let Some(ui) = self.ui {
            ui.merge_into(&mut config.ui);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<bool>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = file;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileProfileConfig {
    pub current_user_id: Option<String>,
}

impl FileProfileConfig {
    fn merge_into(self, config: &mut ProfileConfig) {
        if let Some(current_user_id) = self.current_user_id {
            config.current_user_id = current_user_id;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileChatConfig {
    pub typing_duration_ms: Option<u64>,
    pub enforce_sender_only: Option<bool>,
}

impl FileChatConfig {
    fn merge_into(self, config: &mut ChatConfig) {
        if let Some(duration_ms) = self.typing_duration_ms {
            config.typing_duration_ms = duration_ms;
        }

        if let Some(enforce) = self.enforce_sender_only {
            config.enforce_sender_only = enforce;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileStorageConfig {
    pub dataset_path: Option<PathBuf>,
    pub persist: Option<bool>,
}

impl FileStorageConfig {
    fn merge_into(self, config: &mut StorageConfig) {
        if let Some(dataset_path) = self.dataset_path {
            config.dataset_path = Some(dataset_path);
        }

        if let Some(persist) = self.persist {
            config.persist = persist;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSimulationConfig {
    pub auto_reply: Option<bool>,
    pub reply_delay_ms: Option<u64>,
    pub replies: Option<Vec<String>>,
}

impl FileSimulationConfig {
    fn merge_into(self, config: &mut SimulationConfig) {
        if let Some(auto_reply) = self.auto_reply {
            config.auto_reply = auto_reply;
        }

        if let Some(delay_ms) = self.reply_delay_ms {
            config.reply_delay_ms = delay_ms;
        }

        if let Some(replies) = self.replies {
            config.replies = replies;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileUiConfig {
    pub color: Option<bool>,
    pub page_size: Option<usize>,
}

impl FileUiConfig {
    fn merge_into(self, config: &mut UiConfig) {
        if let Some(color) = self.color {
            config.color = color;
        }

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
    }
}
