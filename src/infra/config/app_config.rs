use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub profile: ProfileConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
    pub simulation: SimulationConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Write logs to a file in the data dir instead of stderr.
    pub file: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileConfig {
    pub current_user_id: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            current_user_id: "me".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatConfig {
    pub typing_duration_ms: u64,
    pub enforce_sender_only: bool,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_duration_ms: 3_000,
            enforce_sender_only: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub dataset_path: Option<PathBuf>,
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            persist: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationConfig {
    pub auto_reply: bool,
    pub reply_delay_ms: u64,
    pub replies: Vec<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            auto_reply: true,
            reply_delay_ms: 1_500,
            replies: vec![
                "Sounds good!".to_owned(),
                "Haha, love that".to_owned(),
                "Tell me more".to_owned(),
                "On my way 🚀".to_owned(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub color: bool,
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            page_size: 50,
        }
    }
}
