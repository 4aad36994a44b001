use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Modality {
    Video,
    Audio,
    Text,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Video, Modality::Audio, Modality::Text];

    /// Accepts the names used by embed markup as well as the short button
    /// labels ("asl", "cc").
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" | "asl" | "sign" => Some(Modality::Video),
            "audio" => Some(Modality::Audio),
            "text" | "captions" | "cc" | "transcript" => Some(Modality::Text),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Modality::Video => "video",
            Modality::Audio => "audio",
            Modality::Text => "text",
        }
    }

    /// Message shown in the container when the modality is on but the
    /// current section has nothing for it.
    pub fn placeholder(self) -> &'static str {
        match self {
            Modality::Video => "NO ASL VIDEO FOUND",
            Modality::Audio => "NO AUDIO FOUND",
            Modality::Text => "NO CAPTIONS FOUND",
        }
    }
}

impl std::fmt::Display for Modality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Independently toggleable set of active modalities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(default)]
#[ts(export)]
pub struct ModalitySet {
    pub video: bool,
    pub audio: bool,
    pub text: bool,
}

impl ModalitySet {
    pub fn all() -> Self {
        Self {
            video: true,
            audio: true,
            text: true,
        }
    }

    pub fn contains(&self, modality: Modality) -> bool {
        match modality {
            Modality::Video => self.video,
            Modality::Audio => self.audio,
            Modality::Text => self.text,
        }
    }

    pub fn set(&mut self, modality: Modality, enabled: bool) {
        match modality {
            Modality::Video => self.video = enabled,
            Modality::Audio => self.audio = enabled,
            Modality::Text => self.text = enabled,
        }
    }

    /// Flip one modality and return its new state.
    pub fn toggle(&mut self, modality: Modality) -> bool {
        let enabled = !self.contains(modality);
        self.set(modality, enabled);
        enabled
    }

    pub fn any(&self) -> bool {
        self.video || self.audio || self.text
    }
}

/// Selected language code per modality. An empty code means "whatever the
/// section offers first".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(default)]
#[ts(export)]
pub struct LanguageSelection {
    pub video: String,
    pub audio: String,
    pub text: String,
}

impl LanguageSelection {
    pub fn get(&self, modality: Modality) -> &str {
        match modality {
            Modality::Video => &self.video,
            Modality::Audio => &self.audio,
            Modality::Text => &self.text,
        }
    }

    pub fn set(&mut self, modality: Modality, code: &str) {
        let code = code.trim().to_string();
        match modality {
            Modality::Video => self.video = code,
            Modality::Audio => self.audio = code,
            Modality::Text => self.text = code,
        }
    }
}
