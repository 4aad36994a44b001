mod api;
mod embed;
mod fetch;
mod highlight;
mod host;
mod logging;
mod media;
mod render;
mod storage;

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Context, Result, anyhow};
use gloo_timers::callback::Timeout;
use pivot_core::config::WidgetConfig;
use pivot_core::preferences::{PreferenceStore, Preferences};
use pivot_core::session::{Effect, SessionCommand, SessionOptions, WidgetSession};
use tracing::{debug, error, info, trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Window};

use highlight::HostHighlighter;
use host::IsolationHost;
use media::MediaDeck;
use storage::LocalStorage;

#[cfg(test)]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    static QUEUE: RefCell<VecDeque<SessionCommand>> = const { RefCell::new(VecDeque::new()) };
    static LAST_CLICK: RefCell<Option<Element>> = const { RefCell::new(None) };
}

struct Runtime {
    config: WidgetConfig,
    page_url: String,
    page_origin: String,
    session: WidgetSession,
    store: PreferenceStore<LocalStorage>,
    host: IsolationHost,
    media: MediaDeck,
    highlighter: HostHighlighter,
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    if document.ready_state() == "loading" {
        let boot_later = Closure::once_into_js(move || {
            if let Err(err) = boot() {
                error!("Widget failed to start: {err:#}");
            }
        });
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", boot_later.unchecked_ref());
        return;
    }
    if let Err(err) = boot() {
        error!("Widget failed to start: {err:#}");
    }
}

fn boot() -> Result<()> {
    let window = web_sys::window().context("window is unavailable")?;
    let document = window.document().context("document is unavailable")?;

    let mut config = crate::bundled_config();
    config.apply_embed(&embed::read_embed_attributes(&document));
    logging::init_tracing(config.log_level);

    if host::already_mounted(&document) || RUNTIME.with(|slot| slot.borrow().is_some()) {
        info!("Widget already mounted on this page; skipping");
        return Ok(());
    }
    if let Err(err) = config.validate() {
        error!("{err:#}");
    }

    let location = window.location();
    let page_url = location.href().map_err(js_error)?;
    let page_origin = location.origin().map_err(js_error)?;

    let store = PreferenceStore::new(
        LocalStorage::from_window(&window),
        config.preferences_key.clone(),
    );
    let preferences = store.load_or(Preferences {
        dark_mode: prefers_dark_scheme(&window),
        ..Preferences::default()
    });
    let session = WidgetSession::new(SessionOptions::from_config(&config, &page_origin), preferences);

    let host = IsolationHost::mount(&document, &config)?;
    let runtime = Runtime {
        config,
        page_url,
        page_origin,
        session,
        store,
        host,
        media: MediaDeck::default(),
        highlighter: HostHighlighter::default(),
    };
    info!(
        website_id = %runtime.config.website_id,
        position = %runtime.config.position,
        "Widget mounted"
    );
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(runtime));

    api::install(&window)?;
    dispatch(viewport_command(&window));
    Ok(())
}

/// Current inner window size as a session command.
fn viewport_command(window: &Window) -> SessionCommand {
    let size = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or_default() as i32
    };
    SessionCommand::ViewportChanged {
        width: size(window.inner_width()),
        height: size(window.inner_height()),
    }
}

fn prefers_dark_scheme(window: &Window) -> bool {
    window
        .match_media("(prefers-color-scheme: dark)")
        .ok()
        .flatten()
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Queue a command and, unless a dispatch is already running further up the
/// stack, drain the queue through the session.
pub(crate) fn dispatch(command: SessionCommand) {
    enqueue(command);
    RUNTIME.with(|slot| {
        let Ok(mut guard) = slot.try_borrow_mut() else {
            return;
        };
        let Some(runtime) = guard.as_mut() else {
            QUEUE.with(|queue| queue.borrow_mut().clear());
            return;
        };
        while let Some(command) = QUEUE.with(|queue| queue.borrow_mut().pop_front()) {
            runtime.handle(command);
        }
    });
}

fn enqueue(command: SessionCommand) {
    QUEUE.with(|queue| queue.borrow_mut().push_back(command));
}

/// Remember the host element behind the latest content click.
pub(crate) fn remember_click(element: Element) {
    LAST_CLICK.with(|slot| *slot.borrow_mut() = Some(element));
}

/// Read-only access to the live session, if the widget is mounted and not
/// mid-dispatch.
pub(crate) fn with_session<T>(read: impl FnOnce(&WidgetSession) -> T) -> Option<T> {
    RUNTIME.with(|slot| {
        let guard = slot.try_borrow().ok()?;
        guard.as_ref().map(|runtime| read(&runtime.session))
    })
}

pub(crate) fn js_error(value: JsValue) -> anyhow::Error {
    match value.as_string() {
        Some(message) => anyhow!(message),
        None => anyhow!("{value:?}"),
    }
}

impl Runtime {
    fn handle(&mut self, command: SessionCommand) {
        let event = self.session.apply_command(command);
        trace!(
            action = event.action,
            effects = event.effects.len(),
            "Applied widget command"
        );
        for effect in event.effects {
            if let Err(err) = self.perform(effect) {
                warn!("Widget effect failed: {err:#}");
            }
        }
        render::render(&self.host, &event.snapshot);
    }

    fn perform(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::FetchSections { request_id } => {
                let url = self.config.sections_url(&self.page_origin);
                debug!(request_id, %url, "Requesting sections");
                fetch::spawn_section_fetch(
                    url,
                    self.page_url.clone(),
                    self.config.website_id.clone(),
                    request_id,
                );
            }
            Effect::SavePreferences(preferences) => self.store.save(&preferences),
            Effect::MountMedia {
                slot,
                mount_id,
                src,
                autoplay,
            } => self.media.mount(&self.host, slot, mount_id, &src, autoplay)?,
            Effect::UnmountMedia { slot } => self.media.unmount(slot),
            Effect::PauseMedia { slot } => self.media.pause(slot),
            Effect::PlayInstructions => self.host.play_instructions(),
            Effect::PauseInstructions => self.host.pause_instructions(),
            Effect::HighlightClicked { text } => {
                let clicked = LAST_CLICK.with(|slot| slot.borrow_mut().take());
                let located = match clicked {
                    Some(clicked) => Some(self.highlighter.highlight_clicked(
                        self.host.document(),
                        self.host.element(),
                        &clicked,
                        &text,
                    )?),
                    None => self.highlighter.highlight_text(
                        self.host.document(),
                        self.host.element(),
                        &text,
                    )?,
                };
                if let Some((count, position)) = located {
                    enqueue(SessionCommand::TargetsLocated { count, position });
                }
            }
            Effect::HighlightSection { text } => {
                let located = self.highlighter.highlight_text(
                    self.host.document(),
                    self.host.element(),
                    &text,
                )?;
                if let Some((count, position)) = located {
                    enqueue(SessionCommand::TargetsLocated { count, position });
                }
            }
            Effect::FocusRepeat { position } => {
                self.highlighter.focus(self.host.document(), position)?
            }
            Effect::ClearHighlight => self.highlighter.clear(self.host.document()),
            Effect::ScheduleNoticeDismiss {
                notice_id,
                after_ms,
            } => {
                Timeout::new(after_ms, move || {
                    dispatch(SessionCommand::DismissNotice { notice_id });
                })
                .forget();
            }
        }
        Ok(())
    }
}
