use crate::modality::Modality;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct VideoEntry {
    #[serde(default)]
    pub video_language: String,
    #[serde(alias = "video")]
    pub video_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct AudioEntry {
    #[serde(default)]
    pub audio_language: String,
    #[serde(alias = "audio")]
    pub audio_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct CaptionEntry {
    #[serde(default)]
    pub caption_language: String,
    #[serde(default)]
    pub captions: String,
}

/// One paired unit of accessible content for a page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[ts(export)]
pub struct Section {
    #[serde(default)]
    pub text: String,
    // Older feeds name these `video`/`audio` with a `video`/`audio` URL.
    #[serde(default, alias = "video")]
    pub videos: Vec<VideoEntry>,
    #[serde(default, alias = "audio")]
    pub audios: Vec<AudioEntry>,
    #[serde(default)]
    pub captions: Vec<CaptionEntry>,
}

/// Anything tagged with a language code.
pub trait LanguageTagged {
    fn language(&self) -> &str;
}

impl LanguageTagged for VideoEntry {
    fn language(&self) -> &str {
        &self.video_language
    }
}

impl LanguageTagged for AudioEntry {
    fn language(&self) -> &str {
        &self.audio_language
    }
}

impl LanguageTagged for CaptionEntry {
    fn language(&self) -> &str {
        &self.caption_language
    }
}

/// Exact language match, otherwise the first available entry.
pub fn pick_language<'a, T: LanguageTagged>(entries: &'a [T], requested: &str) -> Option<&'a T> {
    let requested = requested.trim();
    if !requested.is_empty() {
        if let Some(entry) = entries.iter().find(|entry| entry.language() == requested) {
            return Some(entry);
        }
    }
    entries.first()
}

impl Section {
    pub fn video_for(&self, language: &str) -> Option<&VideoEntry> {
        pick_language(&self.videos, language)
    }

    pub fn audio_for(&self, language: &str) -> Option<&AudioEntry> {
        pick_language(&self.audios, language)
    }

    pub fn caption_for(&self, language: &str) -> Option<&CaptionEntry> {
        pick_language(&self.captions, language)
    }

    /// Language codes offered for a modality, in server order, deduplicated.
    pub fn languages(&self, modality: Modality) -> Vec<String> {
        let codes: Vec<&str> = match modality {
            Modality::Video => self.videos.iter().map(LanguageTagged::language).collect(),
            Modality::Audio => self.audios.iter().map(LanguageTagged::language).collect(),
            Modality::Text => self.captions.iter().map(LanguageTagged::language).collect(),
        };
        let mut out: Vec<String> = Vec::with_capacity(codes.len());
        for code in codes {
            if !code.is_empty() && !out.iter().any(|existing| existing == code) {
                out.push(code.to_string());
            }
        }
        out
    }
}

/// Decode the endpoint's JSON body.
pub fn parse_sections(body: &str) -> Result<Vec<Section>> {
    serde_json::from_str(body).context("Failed to parse sections payload")
}

/// Resolve a media URL that the backend may have sent as a path.
pub fn resolve_media_url(base: &str, url: &str) -> String {
    let url = url.trim();
    if url.is_empty()
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("data:")
        || url.starts_with("blob:")
    {
        return url.to_string();
    }
    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_wire_layouts() {
        let legacy = r#"[{
            "text": "Welcome",
            "video": [{"video_language": "ASL", "video": "https://cdn/asl.mp4"}],
            "audio": [{"audio_language": "EN", "audio": "https://cdn/en.mp3"}],
            "captions": [{"caption_language": "EN", "captions": "Welcome!"}]
        }]"#;
        let current = r#"[{
            "text": "Welcome",
            "videos": [{"video_language": "ASL", "video_url": "https://cdn/asl.mp4"}],
            "audios": [{"audio_language": "EN", "audio_url": "https://cdn/en.mp3"}],
            "captions": [{"caption_language": "EN", "captions": "Welcome!"}]
        }]"#;

        let a = parse_sections(legacy).expect("legacy");
        let b = parse_sections(current).expect("current");
        assert_eq!(a, b);
        assert_eq!(a[0].videos[0].video_url, "https://cdn/asl.mp4");
    }

    #[test]
    fn missing_modality_lists_default_to_empty() {
        let sections = parse_sections(r#"[{"text": "Contact us"}]"#).expect("parse");
        assert!(sections[0].videos.is_empty());
        assert!(sections[0].audios.is_empty());
        assert!(sections[0].captions.is_empty());
        assert!(sections[0].video_for("ASL").is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_sections("{\"detail\": \"not found\"}").is_err());
        assert!(parse_sections("<html>").is_err());
    }

    #[test]
    fn language_fallback_picks_first_available_entry() {
        let section = Section {
            text: "x".to_string(),
            videos: vec![
                VideoEntry {
                    video_language: "ASL".to_string(),
                    video_url: "asl.mp4".to_string(),
                },
                VideoEntry {
                    video_language: "BSL".to_string(),
                    video_url: "bsl.mp4".to_string(),
                },
                VideoEntry {
                    video_language: "LSF".to_string(),
                    video_url: "lsf.mp4".to_string(),
                },
            ],
            ..Section::default()
        };

        assert_eq!(section.video_for("BSL").map(|v| v.video_url.as_str()), Some("bsl.mp4"));
        assert_eq!(section.video_for("JSL").map(|v| v.video_url.as_str()), Some("asl.mp4"));
        assert_eq!(section.video_for("").map(|v| v.video_url.as_str()), Some("asl.mp4"));
        assert_eq!(section.languages(Modality::Video), vec!["ASL", "BSL", "LSF"]);
    }

    #[test]
    fn relative_media_urls_resolve_against_base() {
        assert_eq!(
            resolve_media_url("https://api.example.com/", "/media/a.mp4"),
            "https://api.example.com/media/a.mp4"
        );
        assert_eq!(
            resolve_media_url("https://api.example.com", "media/a.mp4"),
            "https://api.example.com/media/a.mp4"
        );
        assert_eq!(
            resolve_media_url("https://api.example.com", "https://cdn/a.mp4"),
            "https://cdn/a.mp4"
        );
    }
}
