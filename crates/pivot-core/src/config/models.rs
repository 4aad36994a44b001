use anyhow::{Result, bail};
use serde::Deserialize;

/// Flattened widget configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct WidgetConfig {
    /// Tenant identifier, normally supplied by the embed tag.
    #[serde(default)]
    pub website_id: String,
    /// Backend origin. Empty means "same origin as the host page".
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default = "crate::config::defaults::default_sections_path")]
    pub sections_path: String,
    #[serde(default = "crate::config::defaults::default_position")]
    pub position: WidgetPosition,
    #[serde(default = "crate::config::defaults::default_notice_duration_ms")]
    pub notice_duration_ms: u32,
    #[serde(default = "crate::config::defaults::default_instruction_video_url")]
    pub instruction_video_url: String,
    #[serde(default = "crate::config::defaults::default_instruction_audio_url")]
    pub instruction_audio_url: String,
    #[serde(default = "crate::config::defaults::default_preferences_key")]
    pub preferences_key: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            website_id: String::new(),
            api_base_url: String::new(),
            sections_path: crate::config::defaults::default_sections_path(),
            position: crate::config::defaults::default_position(),
            notice_duration_ms: crate::config::defaults::default_notice_duration_ms(),
            instruction_video_url: crate::config::defaults::default_instruction_video_url(),
            instruction_audio_url: crate::config::defaults::default_instruction_audio_url(),
            preferences_key: crate::config::defaults::default_preferences_key(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl WidgetConfig {
    /// Overlay the attributes found on the embedding script tag.
    pub fn apply_embed(&mut self, embed: &EmbedAttributes) {
        if let Some(id) = non_blank(embed.website_id.as_deref()) {
            self.website_id = id.to_string();
        }
        if let Some(base) = non_blank(embed.api_base.as_deref()) {
            self.api_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(position) = non_blank(embed.position.as_deref()) {
            match WidgetPosition::parse(position) {
                Some(position) => self.position = position,
                None => tracing::warn!(position, "Unknown widget position; keeping default"),
            }
        }
        if let Some(level) = non_blank(embed.log_level.as_deref()) {
            match LogLevel::parse(level) {
                Some(level) => self.log_level = level,
                None => tracing::warn!(level, "Unknown log level; keeping default"),
            }
        }
    }

    pub fn has_website_id(&self) -> bool {
        !self.website_id.trim().is_empty()
    }

    /// Absolute sections endpoint for the given host page origin.
    pub fn sections_url(&self, page_origin: &str) -> String {
        let base = if self.api_base_url.is_empty() {
            page_origin.trim_end_matches('/')
        } else {
            self.api_base_url.trim_end_matches('/')
        };
        if self.sections_path.starts_with('/') {
            format!("{base}{}", self.sections_path)
        } else {
            format!("{base}/{}", self.sections_path)
        }
    }

    /// Ensure the config can actually reach the backend.
    pub fn validate(&self) -> Result<()> {
        if !self.has_website_id() {
            bail!("Widget configuration error: Missing website ID.");
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Raw `data-*` attributes read from the embedding `<script>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedAttributes {
    pub website_id: Option<String>,
    pub position: Option<String>,
    pub api_base: Option<String>,
    pub log_level: Option<String>,
}

/// Corner of the viewport the widget docks to.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Default for WidgetPosition {
    fn default() -> Self {
        WidgetPosition::BottomRight
    }
}

impl WidgetPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bottom-right" => Some(WidgetPosition::BottomRight),
            "bottom-left" => Some(WidgetPosition::BottomLeft),
            "top-right" => Some(WidgetPosition::TopRight),
            "top-left" => Some(WidgetPosition::TopLeft),
            _ => None,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            WidgetPosition::BottomRight => "pivot-dock-bottom-right",
            WidgetPosition::BottomLeft => "pivot-dock-bottom-left",
            WidgetPosition::TopRight => "pivot-dock-top-right",
            WidgetPosition::TopLeft => "pivot-dock-top-left",
        }
    }
}

impl std::fmt::Display for WidgetPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            WidgetPosition::BottomRight => "bottom-right",
            WidgetPosition::BottomLeft => "bottom-left",
            WidgetPosition::TopRight => "top-right",
            WidgetPosition::TopLeft => "top-left",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}
