use super::defaults;
use super::models::{LogLevel, WidgetConfig, WidgetPosition};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    api: ApiConfig,
    #[serde(default)]
    widget: WidgetTable,
    #[serde(default)]
    media: MediaConfig,
    #[serde(default)]
    storage: StorageConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for WidgetConfig {
    fn from(tables: ConfigTables) -> Self {
        WidgetConfig {
            website_id: tables.widget.website_id,
            api_base_url: tables.api.base_url,
            sections_path: tables.api.sections_path,
            position: tables.widget.position,
            notice_duration_ms: tables.widget.notice_duration_ms,
            instruction_video_url: tables.media.instruction_video_url,
            instruction_audio_url: tables.media.instruction_audio_url,
            preferences_key: tables.storage.preferences_key,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&WidgetConfig> for ConfigTables {
    fn from(config: &WidgetConfig) -> Self {
        ConfigTables {
            api: ApiConfig {
                base_url: config.api_base_url.clone(),
                sections_path: config.sections_path.clone(),
            },
            widget: WidgetTable {
                website_id: config.website_id.clone(),
                position: config.position,
                notice_duration_ms: config.notice_duration_ms,
            },
            media: MediaConfig {
                instruction_video_url: config.instruction_video_url.clone(),
                instruction_audio_url: config.instruction_audio_url.clone(),
            },
            storage: StorageConfig {
                preferences_key: config.preferences_key.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ApiConfig {
    #[serde(default)]
    base_url: String,
    #[serde(default = "defaults::default_sections_path")]
    sections_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            sections_path: defaults::default_sections_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct WidgetTable {
    #[serde(default)]
    website_id: String,
    #[serde(default = "defaults::default_position")]
    position: WidgetPosition,
    #[serde(default = "defaults::default_notice_duration_ms")]
    notice_duration_ms: u32,
}

impl Default for WidgetTable {
    fn default() -> Self {
        Self {
            website_id: String::new(),
            position: defaults::default_position(),
            notice_duration_ms: defaults::default_notice_duration_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct MediaConfig {
    #[serde(default = "defaults::default_instruction_video_url")]
    instruction_video_url: String,
    #[serde(default = "defaults::default_instruction_audio_url")]
    instruction_audio_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            instruction_video_url: defaults::default_instruction_video_url(),
            instruction_audio_url: defaults::default_instruction_audio_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_preferences_key")]
    preferences_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            preferences_key: defaults::default_preferences_key(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::default_log_level(),
        }
    }
}
