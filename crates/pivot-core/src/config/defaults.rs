pub(crate) fn default_sections_path() -> String {
    "/api/v1/widget-sections/".to_string()
}

pub(crate) fn default_position() -> crate::config::WidgetPosition {
    crate::config::WidgetPosition::BottomRight
}

pub(crate) fn default_notice_duration_ms() -> u32 {
    3000
}

pub(crate) fn default_instruction_video_url() -> String {
    "https://d37zces2ff5ck2.cloudfront.net/media/video/welcome_to_pivot_video_instruction.mp4"
        .to_string()
}

pub(crate) fn default_instruction_audio_url() -> String {
    "https://d37zces2ff5ck2.cloudfront.net/media/audio/welcome_to_pivot_audio_instruction.mp3"
        .to_string()
}

pub(crate) fn default_preferences_key() -> String {
    "pivot-widget.preferences.v1".to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
