//! Coordination between the independently playing video and audio elements.
//!
//! The browser reports lifecycle signals per element; this board keeps the
//! last known status of each mounted element and decides when a signal should
//! pause the partner or advance to the next section.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::modality::Modality;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MediaSlot {
    Video,
    Audio,
}

impl MediaSlot {
    pub const ALL: [MediaSlot; 2] = [MediaSlot::Video, MediaSlot::Audio];

    pub fn partner(self) -> Self {
        match self {
            MediaSlot::Video => MediaSlot::Audio,
            MediaSlot::Audio => MediaSlot::Video,
        }
    }

    pub fn modality(self) -> Modality {
        match self {
            MediaSlot::Video => Modality::Video,
            MediaSlot::Audio => Modality::Audio,
        }
    }

    pub fn from_modality(modality: Modality) -> Option<Self> {
        match modality {
            Modality::Video => Some(MediaSlot::Video),
            Modality::Audio => Some(MediaSlot::Audio),
            Modality::Text => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.modality().as_str()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MediaStatus {
    /// Mounted but not started (autoplay off or blocked).
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
    Errored,
}

impl MediaStatus {
    pub fn is_playing(self) -> bool {
        matches!(self, MediaStatus::Playing)
    }
}

/// Lifecycle signal reported by a media element.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaSignal {
    Playing,
    /// A pause that is not the natural end of playback.
    Paused,
    Ended,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedMedia {
    pub mount_id: u64,
    pub src: String,
    pub status: MediaStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDecision {
    None,
    /// The signal came from an element that is no longer mounted.
    Stale,
    PausePartner(MediaSlot),
    Advance,
}

#[derive(Debug, Clone, Default)]
pub struct MediaBoard {
    video: Option<MountedMedia>,
    audio: Option<MountedMedia>,
    next_mount_id: u64,
}

impl MediaBoard {
    pub fn get(&self, slot: MediaSlot) -> Option<&MountedMedia> {
        match slot {
            MediaSlot::Video => self.video.as_ref(),
            MediaSlot::Audio => self.audio.as_ref(),
        }
    }

    fn get_mut(&mut self, slot: MediaSlot) -> &mut Option<MountedMedia> {
        match slot {
            MediaSlot::Video => &mut self.video,
            MediaSlot::Audio => &mut self.audio,
        }
    }

    pub fn is_mounted(&self, slot: MediaSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn status(&self, slot: MediaSlot) -> Option<MediaStatus> {
        self.get(slot).map(|media| media.status)
    }

    /// Register a fresh element for `slot` and return its mount id.
    pub fn mount(&mut self, slot: MediaSlot, src: String) -> u64 {
        self.next_mount_id = self.next_mount_id.wrapping_add(1);
        let mount_id = self.next_mount_id;
        *self.get_mut(slot) = Some(MountedMedia {
            mount_id,
            src,
            status: MediaStatus::Idle,
        });
        mount_id
    }

    /// Forget the element for `slot`; returns whether one was mounted.
    pub fn unmount(&mut self, slot: MediaSlot) -> bool {
        self.get_mut(slot).take().is_some()
    }

    /// Slots whose element is currently playing.
    pub fn playing(&self) -> Vec<MediaSlot> {
        MediaSlot::ALL
            .into_iter()
            .filter(|slot| self.status(*slot).is_some_and(MediaStatus::is_playing))
            .collect()
    }

    /// Record that the runtime asked `slot` to pause.
    pub fn mark_paused(&mut self, slot: MediaSlot) {
        if let Some(media) = self.get_mut(slot) {
            if media.status.is_playing() {
                media.status = MediaStatus::Paused;
            }
        }
    }

    /// Apply a lifecycle signal and decide what the session should do next.
    ///
    /// Only one element mounted: its end advances. Both mounted: an end
    /// while the partner is still playing pauses the partner, and the
    /// partner's pause then completes the pair and advances. An end with the
    /// partner already stopped advances at once. Any other pause never
    /// advances but pauses a playing partner. Errors count as not playing.
    pub fn on_signal(&mut self, slot: MediaSlot, mount_id: u64, signal: MediaSignal) -> PlaybackDecision {
        let partner_status = self.status(slot.partner());
        let Some(media) = self.get_mut(slot).as_mut() else {
            debug!(slot = slot.as_str(), mount_id, "Ignoring media signal for an empty slot");
            return PlaybackDecision::Stale;
        };
        if media.mount_id != mount_id {
            debug!(
                slot = slot.as_str(),
                mount_id,
                current = media.mount_id,
                "Ignoring media signal from a replaced element"
            );
            return PlaybackDecision::Stale;
        }

        match signal {
            MediaSignal::Playing => {
                media.status = MediaStatus::Playing;
                PlaybackDecision::None
            }
            MediaSignal::Paused => {
                media.status = MediaStatus::Paused;
                match partner_status {
                    Some(MediaStatus::Ended) => PlaybackDecision::Advance,
                    Some(status) if status.is_playing() => {
                        PlaybackDecision::PausePartner(slot.partner())
                    }
                    _ => PlaybackDecision::None,
                }
            }
            MediaSignal::Ended => {
                media.status = MediaStatus::Ended;
                match partner_status {
                    Some(status) if status.is_playing() => {
                        PlaybackDecision::PausePartner(slot.partner())
                    }
                    _ => PlaybackDecision::Advance,
                }
            }
            MediaSignal::Errored => {
                media.status = MediaStatus::Errored;
                match partner_status {
                    Some(MediaStatus::Ended) => PlaybackDecision::Advance,
                    _ => PlaybackDecision::None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(slots: &[MediaSlot]) -> (MediaBoard, u64, u64) {
        let mut board = MediaBoard::default();
        let mut video = 0;
        let mut audio = 0;
        for slot in slots {
            let id = board.mount(*slot, format!("{}.src", slot.as_str()));
            match slot {
                MediaSlot::Video => video = id,
                MediaSlot::Audio => audio = id,
            }
        }
        (board, video, audio)
    }

    #[test]
    fn single_active_medium_advances_on_its_own_end() {
        let (mut board, video, _) = board_with(&[MediaSlot::Video]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Ended),
            PlaybackDecision::Advance
        );
    }

    #[test]
    fn ending_one_medium_pauses_the_playing_partner_then_advances() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        board.on_signal(MediaSlot::Audio, audio, MediaSignal::Playing);

        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Ended),
            PlaybackDecision::PausePartner(MediaSlot::Audio)
        );
        assert_eq!(
            board.on_signal(MediaSlot::Audio, audio, MediaSignal::Paused),
            PlaybackDecision::Advance
        );
        assert!(board.playing().is_empty());
    }

    #[test]
    fn partner_ending_on_its_own_also_completes_the_pair() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        board.on_signal(MediaSlot::Audio, audio, MediaSignal::Playing);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Ended);

        assert_eq!(
            board.on_signal(MediaSlot::Audio, audio, MediaSignal::Ended),
            PlaybackDecision::Advance
        );
    }

    #[test]
    fn manual_pause_propagates_but_never_advances() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        board.on_signal(MediaSlot::Audio, audio, MediaSignal::Playing);

        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Paused),
            PlaybackDecision::PausePartner(MediaSlot::Audio)
        );
        assert_eq!(
            board.on_signal(MediaSlot::Audio, audio, MediaSignal::Paused),
            PlaybackDecision::None
        );
        assert!(board.playing().is_empty());
    }

    #[test]
    fn ending_after_partner_was_paused_advances() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        board.on_signal(MediaSlot::Audio, audio, MediaSignal::Paused);

        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Ended),
            PlaybackDecision::Advance
        );
    }

    #[test]
    fn errored_partner_does_not_wedge_advance() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        assert_eq!(
            board.on_signal(MediaSlot::Audio, audio, MediaSignal::Errored),
            PlaybackDecision::None
        );
        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Ended),
            PlaybackDecision::Advance
        );
    }

    #[test]
    fn error_after_partner_ended_releases_the_wait() {
        let (mut board, video, audio) = board_with(&[MediaSlot::Video, MediaSlot::Audio]);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Playing);
        board.on_signal(MediaSlot::Audio, audio, MediaSignal::Playing);
        board.on_signal(MediaSlot::Video, video, MediaSignal::Ended);

        assert_eq!(
            board.on_signal(MediaSlot::Audio, audio, MediaSignal::Errored),
            PlaybackDecision::Advance
        );
    }

    #[test]
    fn signals_from_replaced_or_removed_elements_are_stale() {
        let (mut board, video, _) = board_with(&[MediaSlot::Video]);
        let replacement = board.mount(MediaSlot::Video, "next.mp4".to_string());
        assert_ne!(video, replacement);

        assert_eq!(
            board.on_signal(MediaSlot::Video, video, MediaSignal::Ended),
            PlaybackDecision::Stale
        );
        assert_eq!(board.status(MediaSlot::Video), Some(MediaStatus::Idle));

        assert!(board.unmount(MediaSlot::Video));
        assert_eq!(
            board.on_signal(MediaSlot::Video, replacement, MediaSignal::Ended),
            PlaybackDecision::Stale
        );
        assert!(!board.unmount(MediaSlot::Video));
    }
}
