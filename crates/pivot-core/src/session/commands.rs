use crate::modality::Modality;
use crate::preferences::{Preferences, TextSize};
use crate::sections::Section;

use super::View;
use super::playback::{MediaSignal, MediaSlot};

/// Toggleable display setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    DarkMode,
    HighContrast,
    /// Cycles through the four size steps.
    TextSize,
}

impl Setting {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark-mode" | "dark_mode" | "dark" => Some(Setting::DarkMode),
            "high-contrast" | "high_contrast" | "contrast" => Some(Setting::HighContrast),
            "text-size" | "text_size" | "font-size" => Some(Setting::TextSize),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Open,
    Close,
    NextSection,
    PrevSection,
    ToggleModality { modality: Modality },
    SelectLanguage { modality: Modality, code: String },
    ToggleSetting { setting: Setting },
    SetTextSize { size: TextSize },
    OpenPanel { view: View },
    ClosePanel,
    SkipInstructions,
    InstructionsEnded,
    ReplayInstructions,
    HostClick { text: String },
    SectionsLoaded {
        request_id: u64,
        result: Result<Vec<Section>, String>,
    },
    Reload,
    Media {
        slot: MediaSlot,
        mount_id: u64,
        signal: MediaSignal,
    },
    TargetsLocated { count: usize, position: usize },
    CycleRepeat { forward: bool },
    DismissNotice { notice_id: u64 },
    ViewportChanged { width: i32, height: i32 },
    StepPanelSize { grow: bool },
    /// Pointer movement while the panel header is held.
    DragPanel { dx: i32, dy: i32 },
    /// Pointer movement while the top-left resize handle is held.
    ResizePanel { dx: i32, dy: i32 },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Open => "widget_open",
            Self::Close => "widget_close",
            Self::NextSection => "widget_next_section",
            Self::PrevSection => "widget_previous_section",
            Self::ToggleModality { .. } => "widget_toggle_modality",
            Self::SelectLanguage { .. } => "widget_select_language",
            Self::ToggleSetting { .. } => "widget_toggle_setting",
            Self::SetTextSize { .. } => "widget_set_text_size",
            Self::OpenPanel { .. } => "widget_open_panel",
            Self::ClosePanel => "widget_close_panel",
            Self::SkipInstructions => "widget_skip_instructions",
            Self::InstructionsEnded => "widget_instructions_ended",
            Self::ReplayInstructions => "widget_replay_instructions",
            Self::HostClick { .. } => "widget_host_click",
            Self::SectionsLoaded { .. } => "widget_sections_loaded",
            Self::Reload => "widget_reload",
            Self::Media { .. } => "widget_media_signal",
            Self::TargetsLocated { .. } => "widget_targets_located",
            Self::CycleRepeat { .. } => "widget_cycle_repeat",
            Self::DismissNotice { .. } => "widget_dismiss_notice",
            Self::ViewportChanged { .. } => "widget_viewport_changed",
            Self::StepPanelSize { .. } => "widget_step_panel_size",
            Self::DragPanel { .. } => "widget_drag_panel",
            Self::ResizePanel { .. } => "widget_resize_panel",
        }
    }
}

/// Map a named action from markup (`data-action`) or the global surface onto
/// a command. Unknown names or missing arguments yield `None`.
pub fn parse_action(action: &str, args: &[&str]) -> Option<SessionCommand> {
    let arg = |idx: usize| args.get(idx).map(|value| value.trim()).filter(|v| !v.is_empty());
    let command = match action.trim() {
        "open" => SessionCommand::Open,
        "close" => SessionCommand::Close,
        "next-section" | "nextSection" => SessionCommand::NextSection,
        "previous-section" | "previousSection" => SessionCommand::PrevSection,
        "toggle-modality" | "toggleModality" => SessionCommand::ToggleModality {
            modality: Modality::parse(arg(0)?)?,
        },
        "select-language" | "selectLanguage" => SessionCommand::SelectLanguage {
            modality: Modality::parse(arg(0)?)?,
            code: arg(1)?.to_string(),
        },
        "toggle-setting" | "toggleSetting" => SessionCommand::ToggleSetting {
            setting: Setting::parse(arg(0)?)?,
        },
        "set-text-size" => SessionCommand::SetTextSize {
            size: TextSize::from_step(arg(0)?.parse().ok()?)?,
        },
        "open-settings" => SessionCommand::OpenPanel {
            view: View::Settings,
        },
        "open-languages" => SessionCommand::OpenPanel {
            view: View::Languages,
        },
        "open-help" => SessionCommand::OpenPanel { view: View::Help },
        "close-panel" => SessionCommand::ClosePanel,
        "skip-instructions" => SessionCommand::SkipInstructions,
        "replay-instructions" => SessionCommand::ReplayInstructions,
        "next-repeat" => SessionCommand::CycleRepeat { forward: true },
        "previous-repeat" => SessionCommand::CycleRepeat { forward: false },
        "grow-panel" | "growWidget" => SessionCommand::StepPanelSize { grow: true },
        "shrink-panel" | "shrinkWidget" => SessionCommand::StepPanelSize { grow: false },
        "reload" => SessionCommand::Reload,
        _ => return None,
    };
    Some(command)
}

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSections { request_id: u64 },
    SavePreferences(Preferences),
    MountMedia {
        slot: MediaSlot,
        mount_id: u64,
        src: String,
        autoplay: bool,
    },
    UnmountMedia { slot: MediaSlot },
    PauseMedia { slot: MediaSlot },
    PlayInstructions,
    PauseInstructions,
    /// Highlight the host element the visitor clicked, checking for repeats
    /// of the section text elsewhere on the page.
    HighlightClicked { text: String },
    /// Find the section text on the host page and highlight it.
    HighlightSection { text: String },
    FocusRepeat { position: usize },
    ClearHighlight,
    ScheduleNoticeDismiss { notice_id: u64, after_ms: u32 },
}
