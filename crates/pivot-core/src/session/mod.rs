//! Widget session state machine.
//!
//! `WidgetSession` owns every piece of mutable widget state. Commands come in
//! from DOM listeners, media elements, network completions and the global
//! script surface; each command mutates the session synchronously and returns
//! the side effects the browser layer must perform plus a fresh snapshot to
//! project onto the isolated DOM.

mod commands;
pub mod content;
pub mod playback;

pub use commands::{Effect, SessionCommand, Setting, parse_action};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use ts_rs::TS;

use crate::config::{WidgetConfig, WidgetPosition};
use crate::layout::{PanelRect, Viewport};
use crate::modality::{Modality, ModalitySet};
use crate::preferences::{Preferences, TextSize};
use crate::sections::Section;
use crate::text_match::{MatchEngine, RepeatCursor};
use content::{ContentView, LanguageOptions};
use playback::{MediaBoard, MediaSignal, MediaSlot, PlaybackDecision};

pub const LOADING_MESSAGE: &str = "Loading accessibility content...";
pub const EMPTY_MESSAGE: &str = "No content found for this page.";
pub const FAILED_MESSAGE: &str = "Unable to load accessibility content. Please try again later.";
pub const MISCONFIGURED_MESSAGE: &str = "Widget configuration error: Missing website ID.";
pub const SELECT_PROMPT: &str = "Click any text on the page to view it in sign language, audio or text.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum View {
    #[default]
    Content,
    Settings,
    Languages,
    Help,
    Instructional,
    GettingStarted,
}

impl View {
    /// Panels the visitor opens and closes explicitly.
    pub fn is_panel(self) -> bool {
        matches!(self, View::Settings | View::Languages | View::Help)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Content => "content",
            View::Settings => "settings",
            View::Languages => "languages",
            View::Help => "help",
            View::Instructional => "instructional",
            View::GettingStarted => "getting-started",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FeedStatus {
    Idle,
    Loading,
    Ready,
    Empty,
    Failed,
    Misconfigured,
}

#[derive(Debug, Clone)]
enum Feed {
    Idle,
    Loading { request_id: u64, requested_in: View },
    Ready(Vec<Section>),
    Failed(String),
    Misconfigured,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NoticeKind {
    NoMatch,
}

impl NoticeKind {
    pub fn message(self) -> &'static str {
        match self {
            NoticeKind::NoMatch => "No content found for this page.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Notice {
    id: u64,
    kind: NoticeKind,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct NoticeView {
    #[ts(type = "number")]
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct RepeatView {
    pub position: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct WidgetSnapshot {
    pub open: bool,
    pub view: View,
    pub feed: FeedStatus,
    pub status_message: Option<String>,
    pub section_count: usize,
    pub current_index: Option<usize>,
    pub can_prev: bool,
    pub can_next: bool,
    pub content: Option<ContentView>,
    pub modalities: ModalitySet,
    pub languages: LanguageOptions,
    pub text_size: u8,
    pub text_size_class: String,
    pub dark_mode: bool,
    pub high_contrast: bool,
    pub notice: Option<NoticeView>,
    pub repeats: Option<RepeatView>,
    pub panel: PanelRect,
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub effects: Vec<Effect>,
    pub snapshot: WidgetSnapshot,
}

/// Settings the session needs from the resolved widget config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub notice_duration_ms: u32,
    /// Base used to resolve relative media URLs.
    pub media_base: String,
    pub website_configured: bool,
    /// Corner the panel docks to until the visitor moves or resizes it.
    pub position: WidgetPosition,
}

impl SessionOptions {
    pub fn from_config(config: &WidgetConfig, page_origin: &str) -> Self {
        let media_base = if config.api_base_url.is_empty() {
            page_origin.trim_end_matches('/').to_string()
        } else {
            config.api_base_url.clone()
        };
        Self {
            notice_duration_ms: config.notice_duration_ms,
            media_base,
            website_configured: config.has_website_id(),
            position: config.position,
        }
    }
}

#[derive(Clone, Copy)]
enum HighlightSource {
    Clicked,
    Located,
}

#[derive(Debug, Clone)]
pub struct WidgetSession {
    options: SessionOptions,
    preferences: Preferences,
    feed: Feed,
    engine: MatchEngine,
    current_index: Option<usize>,
    view: View,
    open: bool,
    first_open: bool,
    instructions_shown: bool,
    content_activated: bool,
    media: MediaBoard,
    notice: Option<Notice>,
    next_notice_id: u64,
    next_request_id: u64,
    pending_click: Option<String>,
    repeats: Option<RepeatCursor>,
    viewport: Viewport,
    /// Set once the visitor drags, resizes or steps the panel size.
    panel: Option<PanelRect>,
}

impl WidgetSession {
    pub fn new(options: SessionOptions, preferences: Preferences) -> Self {
        Self {
            options,
            preferences,
            feed: Feed::Idle,
            engine: MatchEngine::default(),
            current_index: None,
            view: View::Content,
            open: false,
            first_open: true,
            instructions_shown: false,
            content_activated: false,
            media: MediaBoard::default(),
            notice: None,
            next_notice_id: 0,
            next_request_id: 0,
            pending_click: None,
            repeats: None,
            viewport: Viewport::default(),
            panel: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn media(&self) -> &MediaBoard {
        &self.media
    }

    pub fn panel(&self) -> PanelRect {
        self.panel
            .unwrap_or_else(|| PanelRect::docked(self.options.position, self.viewport))
    }

    pub fn sections(&self) -> &[Section] {
        match &self.feed {
            Feed::Ready(sections) => sections,
            _ => &[],
        }
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.current_index
            .and_then(|index| self.sections().get(index))
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        let mut effects = Vec::new();
        match command {
            SessionCommand::Open => self.open(&mut effects),
            SessionCommand::Close => self.close(&mut effects),
            SessionCommand::NextSection => {
                self.step_section(true, &mut effects);
            }
            SessionCommand::PrevSection => {
                self.step_section(false, &mut effects);
            }
            SessionCommand::ToggleModality { modality } => {
                self.toggle_modality(modality, &mut effects)
            }
            SessionCommand::SelectLanguage { modality, code } => {
                self.select_language(modality, &code, &mut effects)
            }
            SessionCommand::ToggleSetting { setting } => self.toggle_setting(setting, &mut effects),
            SessionCommand::SetTextSize { size } => self.set_text_size(size, &mut effects),
            SessionCommand::OpenPanel { view } => self.open_panel(view, &mut effects),
            SessionCommand::ClosePanel => self.close_panel(&mut effects),
            SessionCommand::SkipInstructions | SessionCommand::InstructionsEnded => {
                self.finish_instructions(&mut effects)
            }
            SessionCommand::ReplayInstructions => self.set_view(View::Instructional, &mut effects),
            SessionCommand::HostClick { text } => self.host_click(text, &mut effects),
            SessionCommand::SectionsLoaded { request_id, result } => {
                self.sections_loaded(request_id, result, &mut effects)
            }
            SessionCommand::Reload => self.reload(&mut effects),
            SessionCommand::Media {
                slot,
                mount_id,
                signal,
            } => self.media_signal(slot, mount_id, signal, &mut effects),
            SessionCommand::TargetsLocated { count, position } => {
                self.repeats = RepeatCursor::new(count, position);
            }
            SessionCommand::CycleRepeat { forward } => self.cycle_repeat(forward, &mut effects),
            SessionCommand::ViewportChanged { width, height } => {
                self.viewport_changed(width, height)
            }
            SessionCommand::StepPanelSize { grow } => {
                let panel = self.panel().stepped(grow, self.viewport);
                debug!(grow, width = panel.width, height = panel.height, "Panel size stepped");
                self.panel = Some(panel);
            }
            SessionCommand::DragPanel { dx, dy } => {
                self.panel = Some(self.panel().dragged(dx, dy, self.viewport));
                trace!(dx, dy, "Panel dragged");
            }
            SessionCommand::ResizePanel { dx, dy } => {
                self.panel = Some(self.panel().resized_from_top_left(dx, dy, self.viewport));
                trace!(dx, dy, "Panel resized");
            }
            SessionCommand::DismissNotice { notice_id } => {
                if self.notice.is_some_and(|notice| notice.id == notice_id) {
                    self.notice = None;
                }
            }
        }
        SessionEvent {
            action,
            effects,
            snapshot: self.snapshot(),
        }
    }

    fn viewport_changed(&mut self, width: i32, height: i32) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        debug!(width = viewport.width, height = viewport.height, "Viewport changed");
        self.viewport = viewport;
        if let Some(panel) = self.panel {
            self.panel = Some(panel.fit(viewport));
        }
    }

    fn resting_view(&self) -> View {
        if self.preferences.enabled_modalities.any() {
            View::Content
        } else {
            View::GettingStarted
        }
    }

    fn set_view(&mut self, view: View, effects: &mut Vec<Effect>) {
        if self.view == view {
            return;
        }
        if self.view == View::Instructional {
            effects.push(Effect::PauseInstructions);
        }
        if view == View::Instructional {
            self.instructions_shown = true;
            effects.push(Effect::PlayInstructions);
        }
        debug!(from = self.view.as_str(), to = view.as_str(), "View changed");
        self.view = view;
    }

    fn open(&mut self, effects: &mut Vec<Effect>) {
        if self.open {
            return;
        }
        self.open = true;
        info!(first_open = self.first_open, "Widget opened");

        if !self.instructions_shown {
            self.set_view(View::Instructional, effects);
        } else if matches!(self.view, View::Content | View::GettingStarted) {
            let resting = self.resting_view();
            self.set_view(resting, effects);
        }

        if self.first_open {
            self.first_open = false;
            self.request_sections(effects);
        }

        if let Some(section) = self.current_section() {
            effects.push(Effect::HighlightSection {
                text: section.text.clone(),
            });
        }
    }

    fn close(&mut self, effects: &mut Vec<Effect>) {
        if !self.open {
            return;
        }
        self.open = false;
        info!("Widget closed");

        for slot in MediaSlot::ALL {
            if self.media.is_mounted(slot) {
                self.media.mark_paused(slot);
                effects.push(Effect::PauseMedia { slot });
            }
        }
        effects.push(Effect::PauseInstructions);
        effects.push(Effect::ClearHighlight);
        self.repeats = None;
    }

    fn request_sections(&mut self, effects: &mut Vec<Effect>) {
        if !self.options.website_configured {
            warn!("{MISCONFIGURED_MESSAGE}");
            self.feed = Feed::Misconfigured;
            return;
        }
        self.next_request_id = self.next_request_id.wrapping_add(1);
        let request_id = self.next_request_id;
        self.feed = Feed::Loading {
            request_id,
            requested_in: self.view,
        };
        debug!(request_id, "Requesting sections");
        effects.push(Effect::FetchSections { request_id });
    }

    fn sections_loaded(
        &mut self,
        request_id: u64,
        result: Result<Vec<Section>, String>,
        effects: &mut Vec<Effect>,
    ) {
        let (current, requested_in) = match self.feed {
            Feed::Loading {
                request_id: current,
                requested_in,
            } => (current, requested_in),
            _ => {
                debug!(request_id, "Ignoring section response with no request in flight");
                return;
            }
        };
        if current != request_id {
            debug!(request_id, current, "Ignoring stale section response");
            return;
        }

        let pending = self.pending_click.take();
        match result {
            Ok(sections) => {
                info!(count = sections.len(), "Loaded sections");
                self.engine = MatchEngine::new(&sections);
                self.feed = Feed::Ready(sections);
            }
            Err(err) => {
                warn!(request_id, "Section fetch failed: {err}");
                self.feed = Feed::Failed(err);
                return;
            }
        }

        if let Some(text) = pending {
            if self.open && self.view == requested_in {
                self.resolve_click(&text, effects);
            } else {
                debug!(
                    requested = requested_in.as_str(),
                    current = self.view.as_str(),
                    "Dropping click queued for a view that is no longer showing"
                );
            }
        }
    }

    fn reload(&mut self, effects: &mut Vec<Effect>) {
        info!("Reloading sections");
        self.pending_click = None;
        self.current_index = None;
        self.repeats = None;
        self.engine = MatchEngine::default();
        self.feed = Feed::Idle;
        for slot in MediaSlot::ALL {
            if self.media.unmount(slot) {
                effects.push(Effect::UnmountMedia { slot });
            }
        }
        effects.push(Effect::ClearHighlight);
        self.first_open = false;
        self.request_sections(effects);
    }

    fn host_click(&mut self, text: String, effects: &mut Vec<Effect>) {
        if !self.open {
            debug!("Ignoring host click while the widget is closed");
            return;
        }
        if matches!(self.feed, Feed::Loading { .. }) {
            debug!("Queueing host click until sections arrive");
            self.pending_click = Some(text);
        } else if !self.sections().is_empty() {
            self.resolve_click(&text, effects);
        } else {
            debug!("Ignoring host click without section data");
        }
    }

    fn resolve_click(&mut self, text: &str, effects: &mut Vec<Effect>) {
        let Some(found) = self.engine.find(text) else {
            info!("No section matched the clicked text");
            self.show_notice(NoticeKind::NoMatch, effects);
            return;
        };
        debug!(index = found.index, kind = ?found.kind, "Matched clicked text");

        if !self.content_activated {
            self.content_activated = true;
            if !self.preferences.enabled_modalities.any() {
                info!("Activating all modalities on first match");
                self.preferences.enabled_modalities = ModalitySet::all();
                effects.push(Effect::SavePreferences(self.preferences.clone()));
            }
        }
        if matches!(
            self.view,
            View::Instructional | View::Help | View::GettingStarted
        ) {
            let resting = self.resting_view();
            self.set_view(resting, effects);
        }
        self.select_section(found.index, HighlightSource::Clicked, effects);
    }

    fn select_section(&mut self, index: usize, source: HighlightSource, effects: &mut Vec<Effect>) {
        let Some(text) = self.sections().get(index).map(|section| section.text.clone()) else {
            return;
        };
        self.current_index = Some(index);
        self.repeats = None;
        info!(index, "Selected section");

        effects.push(match source {
            HighlightSource::Clicked => Effect::HighlightClicked { text },
            HighlightSource::Located => Effect::HighlightSection { text },
        });
        for slot in MediaSlot::ALL {
            self.sync_slot(slot, true, true, effects);
        }
    }

    /// Returns whether the index moved.
    fn step_section(&mut self, forward: bool, effects: &mut Vec<Effect>) -> bool {
        let Some(current) = self.current_index else {
            debug!("No current section to navigate from");
            return false;
        };
        let len = self.sections().len();
        let target = if forward {
            if current + 1 >= len {
                debug!(current, len, "Already at the last section");
                return false;
            }
            current + 1
        } else {
            if current == 0 {
                debug!("Already at the first section");
                return false;
            }
            current - 1
        };
        self.select_section(target, HighlightSource::Located, effects);
        true
    }

    /// Bring the element for `slot` in line with modality, language and
    /// section. `force` remounts even when the source is unchanged.
    fn sync_slot(&mut self, slot: MediaSlot, autoplay: bool, force: bool, effects: &mut Vec<Effect>) {
        let modality = slot.modality();
        let wanted = if self.preferences.enabled_modalities.contains(modality) {
            self.current_section().and_then(|section| {
                content::media_source(
                    section,
                    modality,
                    &self.preferences.selected_languages,
                    &self.options.media_base,
                )
                .map(|(src, _)| src)
            })
        } else {
            None
        };

        match wanted {
            Some(src) => {
                if !force && self.media.get(slot).is_some_and(|media| media.src == src) {
                    return;
                }
                let mount_id = self.media.mount(slot, src.clone());
                effects.push(Effect::MountMedia {
                    slot,
                    mount_id,
                    src,
                    autoplay,
                });
            }
            None => {
                if self.media.unmount(slot) {
                    effects.push(Effect::UnmountMedia { slot });
                }
            }
        }
    }

    fn save_preferences(&self, effects: &mut Vec<Effect>) {
        effects.push(Effect::SavePreferences(self.preferences.clone()));
    }

    fn toggle_modality(&mut self, modality: Modality, effects: &mut Vec<Effect>) {
        let enabled = self.preferences.enabled_modalities.toggle(modality);
        info!(modality = modality.as_str(), enabled, "Toggled modality");
        self.content_activated = true;
        self.save_preferences(effects);

        if let Some(slot) = MediaSlot::from_modality(modality) {
            self.sync_slot(slot, false, false, effects);
        }
        if matches!(self.view, View::Content | View::GettingStarted) {
            let resting = self.resting_view();
            self.set_view(resting, effects);
        }
    }

    fn select_language(&mut self, modality: Modality, code: &str, effects: &mut Vec<Effect>) {
        if self.preferences.selected_languages.get(modality) == code.trim() {
            return;
        }
        self.preferences.selected_languages.set(modality, code);
        info!(modality = modality.as_str(), code, "Selected language");
        self.save_preferences(effects);

        if let Some(slot) = MediaSlot::from_modality(modality) {
            let was_playing = self
                .media
                .status(slot)
                .is_some_and(playback::MediaStatus::is_playing);
            self.sync_slot(slot, was_playing, false, effects);
        }
    }

    fn toggle_setting(&mut self, setting: Setting, effects: &mut Vec<Effect>) {
        match setting {
            Setting::DarkMode => self.preferences.dark_mode = !self.preferences.dark_mode,
            Setting::HighContrast => {
                self.preferences.high_contrast = !self.preferences.high_contrast
            }
            Setting::TextSize => self.preferences.text_size = self.preferences.text_size.cycled(),
        }
        debug!(?setting, "Toggled setting");
        self.save_preferences(effects);
    }

    fn set_text_size(&mut self, size: TextSize, effects: &mut Vec<Effect>) {
        if self.preferences.text_size == size {
            return;
        }
        self.preferences.text_size = size;
        self.save_preferences(effects);
    }

    fn open_panel(&mut self, view: View, effects: &mut Vec<Effect>) {
        if !view.is_panel() {
            warn!(view = view.as_str(), "Refusing to open a non-panel view");
            return;
        }
        if self.view == view {
            self.close_panel(effects);
            return;
        }
        self.set_view(view, effects);
    }

    fn close_panel(&mut self, effects: &mut Vec<Effect>) {
        if self.view == View::Instructional {
            self.finish_instructions(effects);
            return;
        }
        let resting = self.resting_view();
        self.set_view(resting, effects);
    }

    fn finish_instructions(&mut self, effects: &mut Vec<Effect>) {
        if self.view != View::Instructional {
            return;
        }
        self.set_view(View::GettingStarted, effects);
    }

    fn media_signal(
        &mut self,
        slot: MediaSlot,
        mount_id: u64,
        signal: MediaSignal,
        effects: &mut Vec<Effect>,
    ) {
        match self.media.on_signal(slot, mount_id, signal) {
            PlaybackDecision::None | PlaybackDecision::Stale => {}
            PlaybackDecision::PausePartner(partner) => {
                self.media.mark_paused(partner);
                effects.push(Effect::PauseMedia { slot: partner });
            }
            PlaybackDecision::Advance => {
                if !self.step_section(true, effects) {
                    debug!("Playback finished on the last section");
                }
            }
        }
    }

    fn cycle_repeat(&mut self, forward: bool, effects: &mut Vec<Effect>) {
        let Some(cursor) = self.repeats.as_mut() else {
            return;
        };
        let position = if forward { cursor.next() } else { cursor.prev() };
        effects.push(Effect::FocusRepeat { position });
    }

    fn show_notice(&mut self, kind: NoticeKind, effects: &mut Vec<Effect>) {
        self.next_notice_id = self.next_notice_id.wrapping_add(1);
        let notice_id = self.next_notice_id;
        self.notice = Some(Notice {
            id: notice_id,
            kind,
        });
        effects.push(Effect::ScheduleNoticeDismiss {
            notice_id,
            after_ms: self.options.notice_duration_ms,
        });
    }

    fn feed_status(&self) -> FeedStatus {
        match &self.feed {
            Feed::Idle => FeedStatus::Idle,
            Feed::Loading { .. } => FeedStatus::Loading,
            Feed::Ready(sections) if sections.is_empty() => FeedStatus::Empty,
            Feed::Ready(_) => FeedStatus::Ready,
            Feed::Failed(_) => FeedStatus::Failed,
            Feed::Misconfigured => FeedStatus::Misconfigured,
        }
    }

    fn status_message(&self, feed: FeedStatus) -> Option<&'static str> {
        match feed {
            FeedStatus::Idle => None,
            FeedStatus::Loading => Some(LOADING_MESSAGE),
            FeedStatus::Empty => Some(EMPTY_MESSAGE),
            FeedStatus::Failed => Some(FAILED_MESSAGE),
            FeedStatus::Misconfigured => Some(MISCONFIGURED_MESSAGE),
            FeedStatus::Ready if self.current_index.is_none() => Some(SELECT_PROMPT),
            FeedStatus::Ready => None,
        }
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        let feed = self.feed_status();
        let len = self.sections().len();
        let content = self.current_index.and_then(|index| {
            self.sections().get(index).map(|section| {
                content::project(
                    index,
                    section,
                    &self.preferences.enabled_modalities,
                    &self.preferences.selected_languages,
                    &self.options.media_base,
                )
            })
        });
        let language_scope: Vec<&Section> = match self.current_section() {
            Some(section) => vec![section],
            None => self.sections().iter().collect(),
        };

        WidgetSnapshot {
            open: self.open,
            view: self.view,
            feed,
            status_message: self.status_message(feed).map(str::to_string),
            section_count: len,
            current_index: self.current_index,
            can_prev: self.current_index.is_some_and(|index| index > 0),
            can_next: self.current_index.is_some_and(|index| index + 1 < len),
            content,
            modalities: self.preferences.enabled_modalities,
            languages: content::language_options(
                &language_scope,
                &self.preferences.selected_languages,
            ),
            text_size: self.preferences.text_size.step(),
            text_size_class: self.preferences.text_size.css_class().to_string(),
            dark_mode: self.preferences.dark_mode,
            high_contrast: self.preferences.high_contrast,
            notice: self.notice.map(|notice| NoticeView {
                id: notice.id,
                kind: notice.kind,
                message: notice.kind.message().to_string(),
            }),
            repeats: self.repeats.map(|cursor| RepeatView {
                position: cursor.position(),
                count: cursor.count(),
            }),
            panel: self.panel(),
        }
    }
}
