//! Static widget markup and stylesheet injected into the shadow root.
//!
//! Controls carry `data-action` (plus an optional `data-arg`) and are routed
//! through [`pivot_core::session::parse_action`]. Controls marked
//! `data-event="change"` report on `change` instead of `click`. Each view is
//! a `[data-view]` block; the renderer shows the one matching the snapshot.

use pivot_core::config::WidgetConfig;

pub const PANEL_ID: &str = "pivot-panel";
pub const DRAG_HANDLE_ID: &str = "pivot-header";
pub const RESIZE_HANDLE_ID: &str = "pivot-resize-nw";

pub const STYLES: &str = r#"
:host { all: initial; }
.pivot-root {
  position: fixed;
  z-index: 2147483000;
  font-family: system-ui, -apple-system, "Segoe UI", Roboto, sans-serif;
  color: #111827;
  line-height: 1.4;
}
.pivot-dock-bottom-right { right: 20px; bottom: 20px; }
.pivot-dock-bottom-left { left: 20px; bottom: 20px; }
.pivot-dock-top-right { right: 20px; top: 20px; }
.pivot-dock-top-left { left: 20px; top: 20px; }
[hidden] { display: none !important; }
button { font: inherit; cursor: pointer; }
.pivot-launcher {
  width: 56px; height: 56px; border-radius: 50%;
  border: none; background: #1f2937; color: #ddf84d;
  font-weight: 700; box-shadow: 0 4px 14px rgba(0, 0, 0, 0.25);
}
.pivot-panel {
  position: fixed; box-sizing: border-box; overflow-y: auto;
  background: #ffffff; border-radius: 12px;
  box-shadow: 0 8px 30px rgba(0, 0, 0, 0.25);
  padding: 12px;
}
.pivot-header, .pivot-toolbar, .pivot-nav, .pivot-repeats {
  display: flex; align-items: center; gap: 6px;
}
.pivot-header { justify-content: space-between; margin-bottom: 8px; cursor: move; user-select: none; }
.pivot-resizable-handle { position: absolute; width: 14px; height: 14px; }
.pivot-resizable-handle.pivot-nw { top: 0; left: 0; cursor: nwse-resize; }
.pivot-title { font-weight: 700; }
.pivot-toolbar button, .pivot-nav button, .pivot-repeats button, .pivot-header button {
  border: 1px solid #d1d5db; border-radius: 6px; background: #f9fafb; padding: 4px 8px;
}
.pivot-toolbar button[aria-pressed="true"] { background: #ddf84d; border-color: #1f2937; }
button:disabled { opacity: 0.4; cursor: default; }
.pivot-status, .pivot-notice, .pivot-placeholder {
  margin: 8px 0; padding: 8px; border-radius: 6px; background: #f3f4f6;
}
.pivot-notice { background: #fef3c7; }
.pivot-media video, .pivot-media audio { width: 100%; margin-top: 8px; }
.pivot-text { margin-top: 8px; white-space: pre-wrap; }
.text-sm { font-size: 0.875rem; }
.text-lg { font-size: 1.125rem; }
.text-xl { font-size: 1.25rem; }
.text-2xl { font-size: 1.5rem; }
.pivot-field { display: flex; justify-content: space-between; align-items: center; margin: 8px 0; }
.pivot-dark { color: #f9fafb; }
.pivot-dark .pivot-panel { background: #111827; }
.pivot-dark .pivot-status, .pivot-dark .pivot-placeholder { background: #1f2937; }
.pivot-dark button { background: #1f2937; color: #f9fafb; border-color: #374151; }
.pivot-contrast .pivot-panel { background: #000000; color: #ffffff; border: 2px solid #ffff00; }
.pivot-contrast button { background: #000000; color: #ffff00; border-color: #ffff00; }
.pivot-contrast .pivot-toolbar button[aria-pressed="true"] { background: #ffff00; color: #000000; }
"#;

/// Escape a value for use inside a double-quoted attribute.
fn attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn render_markup(config: &WidgetConfig) -> String {
    let video_url = attr(&config.instruction_video_url);
    let audio_url = attr(&config.instruction_audio_url);
    let dock = config.position.css_class();
    format!(
        r#"<style>{STYLES}</style>
<div id="pivot-root" class="pivot-root {dock}">
  <button id="pivot-launcher" class="pivot-launcher" data-action="open" aria-label="Open PIVOT accessibility widget">PIVOT</button>
  <section id="pivot-panel" class="pivot-panel" role="dialog" aria-label="PIVOT accessibility widget" hidden>
    <div id="pivot-resize-nw" class="pivot-resizable-handle pivot-nw" aria-hidden="true"></div>
    <div id="pivot-header" class="pivot-header">
      <span class="pivot-title">PIVOT</span>
      <div>
        <button data-action="shrink-panel" aria-label="Shrink widget">&minus;</button>
        <button data-action="grow-panel" aria-label="Grow widget">+</button>
        <button data-action="open-languages" aria-label="Languages">Languages</button>
        <button data-action="open-settings" aria-label="Settings">Settings</button>
        <button data-action="open-help" aria-label="Help">?</button>
        <button data-action="close" aria-label="Close widget">&times;</button>
      </div>
    </div>
    <div id="pivot-toolbar" class="pivot-toolbar">
      <button data-action="toggle-modality" data-arg="video" aria-pressed="false">ASL</button>
      <button data-action="toggle-modality" data-arg="audio" aria-pressed="false">Audio</button>
      <button data-action="toggle-modality" data-arg="text" aria-pressed="false">Text</button>
    </div>
    <p id="pivot-notice" class="pivot-notice" role="status" hidden></p>

    <div data-view="instructional" hidden>
      <video id="pivot-instruction-video" src="{video_url}" controls playsinline preload="metadata"></video>
      <audio id="pivot-instruction-audio" src="{audio_url}" controls preload="none"></audio>
      <button data-action="skip-instructions">Skip</button>
    </div>

    <div data-view="getting-started" hidden>
      <p>Choose ASL, Audio or Text above, then click any text on the page.</p>
      <button data-action="close-panel">Got it</button>
    </div>

    <div data-view="content">
      <p id="pivot-status" class="pivot-status" role="status" hidden></p>
      <div id="pivot-content" hidden>
        <div id="pivot-video" class="pivot-media" hidden>
          <p id="pivot-video-placeholder" class="pivot-placeholder" hidden></p>
          <div id="pivot-video-media"></div>
        </div>
        <div id="pivot-audio" class="pivot-media" hidden>
          <p id="pivot-audio-placeholder" class="pivot-placeholder" hidden></p>
          <div id="pivot-audio-media"></div>
        </div>
        <div id="pivot-text" class="pivot-text" hidden></div>
      </div>
      <div class="pivot-nav">
        <button id="pivot-prev" data-action="previous-section" aria-label="Previous section">&lsaquo; Prev</button>
        <span id="pivot-position"></span>
        <button id="pivot-next" data-action="next-section" aria-label="Next section">Next &rsaquo;</button>
      </div>
      <div id="pivot-repeats" class="pivot-repeats" hidden>
        <button data-action="previous-repeat" aria-label="Previous occurrence">&lsaquo;</button>
        <span id="pivot-repeats-label"></span>
        <button data-action="next-repeat" aria-label="Next occurrence">&rsaquo;</button>
      </div>
    </div>

    <div data-view="settings" hidden>
      <label class="pivot-field">Text size
        <input id="pivot-text-size" type="range" min="1" max="4" step="1" data-action="set-text-size" data-event="change">
      </label>
      <label class="pivot-field">Dark mode
        <input id="pivot-dark-mode" type="checkbox" data-action="toggle-setting" data-arg="dark-mode" data-event="change">
      </label>
      <label class="pivot-field">High contrast
        <input id="pivot-high-contrast" type="checkbox" data-action="toggle-setting" data-arg="high-contrast" data-event="change">
      </label>
      <button data-action="close-panel">Done</button>
    </div>

    <div data-view="languages" hidden>
      <label class="pivot-field">ASL video
        <select id="pivot-language-video" data-action="select-language" data-arg="video" data-event="change"></select>
      </label>
      <label class="pivot-field">Audio
        <select id="pivot-language-audio" data-action="select-language" data-arg="audio" data-event="change"></select>
      </label>
      <label class="pivot-field">Text
        <select id="pivot-language-text" data-action="select-language" data-arg="text" data-event="change"></select>
      </label>
      <button data-action="close-panel">Done</button>
    </div>

    <div data-view="help" hidden>
      <p>Click any text on the page to see it in sign language, hear it or read it. Use Prev and Next to move between sections.</p>
      <button data-action="replay-instructions">Watch instructions again</button>
      <button data-action="close-panel">Done</button>
    </div>
  </section>
</div>"#
    )
}
