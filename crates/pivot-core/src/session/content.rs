use serde::Serialize;
use ts_rs::TS;

use crate::modality::{LanguageSelection, Modality, ModalitySet};
use crate::sections::{Section, resolve_media_url};

/// What a media container should show.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum SlotView {
    Inactive,
    Placeholder { message: String },
    Media { src: String, language: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum TextView {
    Inactive,
    Placeholder { message: String },
    Text { body: String, language: String },
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct ContentView {
    pub index: usize,
    pub video: SlotView,
    pub audio: SlotView,
    pub text: TextView,
}

/// Media source for an active modality, after language fallback.
pub fn media_source(
    section: &Section,
    modality: Modality,
    languages: &LanguageSelection,
    media_base: &str,
) -> Option<(String, String)> {
    let requested = languages.get(modality);
    let source = match modality {
        Modality::Video => section.video_for(requested).map(|entry| {
            (
                resolve_media_url(media_base, &entry.video_url),
                entry.video_language.clone(),
            )
        }),
        Modality::Audio => section.audio_for(requested).map(|entry| {
            (
                resolve_media_url(media_base, &entry.audio_url),
                entry.audio_language.clone(),
            )
        }),
        Modality::Text => None,
    };
    source.filter(|(src, _)| !src.is_empty())
}

fn slot_view(
    section: &Section,
    modality: Modality,
    active: &ModalitySet,
    languages: &LanguageSelection,
    media_base: &str,
) -> SlotView {
    if !active.contains(modality) {
        return SlotView::Inactive;
    }
    match media_source(section, modality, languages, media_base) {
        Some((src, language)) => SlotView::Media { src, language },
        None => SlotView::Placeholder {
            message: modality.placeholder().to_string(),
        },
    }
}

fn text_view(section: &Section, active: &ModalitySet, languages: &LanguageSelection) -> TextView {
    if !active.text {
        return TextView::Inactive;
    }
    if let Some(caption) = section
        .caption_for(languages.get(Modality::Text))
        .filter(|caption| !caption.captions.trim().is_empty())
    {
        return TextView::Text {
            body: caption.captions.clone(),
            language: caption.caption_language.clone(),
        };
    }
    if !section.text.trim().is_empty() {
        return TextView::Text {
            body: section.text.clone(),
            language: String::new(),
        };
    }
    TextView::Placeholder {
        message: Modality::Text.placeholder().to_string(),
    }
}

pub fn project(
    index: usize,
    section: &Section,
    active: &ModalitySet,
    languages: &LanguageSelection,
    media_base: &str,
) -> ContentView {
    ContentView {
        index,
        video: slot_view(section, Modality::Video, active, languages, media_base),
        audio: slot_view(section, Modality::Audio, active, languages, media_base),
        text: text_view(section, active, languages),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct LanguageOption {
    pub code: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default, TS)]
#[ts(export)]
pub struct LanguageOptions {
    pub video: Vec<LanguageOption>,
    pub audio: Vec<LanguageOption>,
    pub text: Vec<LanguageOption>,
}

impl LanguageOptions {
    pub fn get(&self, modality: Modality) -> &[LanguageOption] {
        match modality {
            Modality::Video => &self.video,
            Modality::Audio => &self.audio,
            Modality::Text => &self.text,
        }
    }
}

/// Languages on offer for the given sections, marking the one that the
/// fallback rule would actually play.
pub fn language_options(sections: &[&Section], languages: &LanguageSelection) -> LanguageOptions {
    let options_for = |modality: Modality| {
        let mut codes: Vec<String> = Vec::new();
        for section in sections {
            for code in section.languages(modality) {
                if !codes.contains(&code) {
                    codes.push(code);
                }
            }
        }
        let requested = languages.get(modality);
        let effective = if codes.iter().any(|code| code == requested) {
            requested.to_string()
        } else {
            codes.first().cloned().unwrap_or_default()
        };
        codes
            .into_iter()
            .map(|code| LanguageOption {
                selected: code == effective,
                code,
            })
            .collect::<Vec<_>>()
    };

    LanguageOptions {
        video: options_for(Modality::Video),
        audio: options_for(Modality::Audio),
        text: options_for(Modality::Text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::{AudioEntry, CaptionEntry, VideoEntry};

    fn sample_section() -> Section {
        Section {
            text: "Welcome to our site".to_string(),
            videos: vec![
                VideoEntry {
                    video_language: "ASL".to_string(),
                    video_url: "/media/asl.mp4".to_string(),
                },
                VideoEntry {
                    video_language: "BSL".to_string(),
                    video_url: "/media/bsl.mp4".to_string(),
                },
            ],
            audios: Vec::new(),
            captions: vec![CaptionEntry {
                caption_language: "EN".to_string(),
                captions: "Welcome to our site!".to_string(),
            }],
        }
    }

    #[test]
    fn inactive_modalities_render_nothing() {
        let view = project(
            0,
            &sample_section(),
            &ModalitySet::default(),
            &LanguageSelection::default(),
            "https://api.example.com",
        );
        assert_eq!(view.video, SlotView::Inactive);
        assert_eq!(view.audio, SlotView::Inactive);
        assert_eq!(view.text, TextView::Inactive);
    }

    #[test]
    fn active_modalities_fall_back_and_show_placeholders() {
        let mut languages = LanguageSelection::default();
        languages.set(Modality::Video, "JSL");
        languages.set(Modality::Text, "FR");
        let view = project(
            3,
            &sample_section(),
            &ModalitySet::all(),
            &languages,
            "https://api.example.com",
        );

        assert_eq!(
            view.video,
            SlotView::Media {
                src: "https://api.example.com/media/asl.mp4".to_string(),
                language: "ASL".to_string(),
            }
        );
        assert_eq!(
            view.audio,
            SlotView::Placeholder {
                message: "NO AUDIO FOUND".to_string()
            }
        );
        assert_eq!(
            view.text,
            TextView::Text {
                body: "Welcome to our site!".to_string(),
                language: "EN".to_string(),
            }
        );
    }

    #[test]
    fn text_panel_uses_section_text_without_captions() {
        let mut section = sample_section();
        section.captions.clear();
        let view = project(0, &section, &ModalitySet::all(), &LanguageSelection::default(), "");
        assert_eq!(
            view.text,
            TextView::Text {
                body: "Welcome to our site".to_string(),
                language: String::new(),
            }
        );

        section.text.clear();
        let view = project(0, &section, &ModalitySet::all(), &LanguageSelection::default(), "");
        assert_eq!(
            view.text,
            TextView::Placeholder {
                message: "NO CAPTIONS FOUND".to_string()
            }
        );
    }

    #[test]
    fn language_options_mark_the_effective_choice() {
        let first = sample_section();
        let mut second = sample_section();
        second.audios.push(AudioEntry {
            audio_language: "ES".to_string(),
            audio_url: "es.mp3".to_string(),
        });
        let mut languages = LanguageSelection::default();
        languages.set(Modality::Video, "BSL");

        let options = language_options(&[&first, &second], &languages);
        let video: Vec<(&str, bool)> = options
            .video
            .iter()
            .map(|option| (option.code.as_str(), option.selected))
            .collect();
        assert_eq!(video, vec![("ASL", false), ("BSL", true)]);
        assert_eq!(options.audio.len(), 1);
        assert!(options.audio[0].selected);
        assert!(language_options(&[], &languages).video.is_empty());
    }
}
