use anyhow::{Context, Result};
use pivot_core::session::SessionCommand;
use pivot_core::session::playback::{MediaSignal, MediaSlot};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Event, HtmlMediaElement};

use super::host::IsolationHost;
use super::{dispatch, js_error};

const SIGNALS: [(&str, MediaSignal); 4] = [
    ("playing", MediaSignal::Playing),
    ("pause", MediaSignal::Paused),
    ("ended", MediaSignal::Ended),
    ("error", MediaSignal::Errored),
];

struct MountedElement {
    element: HtmlMediaElement,
    listeners: Vec<(&'static str, Closure<dyn FnMut(Event)>)>,
}

impl MountedElement {
    fn teardown(self) {
        for (name, callback) in &self.listeners {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        let _ = self.element.pause();
        let _ = self.element.remove_attribute("src");
        self.element.load();
        self.element.remove();
    }
}

/// Each mount builds a fresh element tagged with the session's mount id, so
/// events from a torn-down element arrive stale.
#[derive(Default)]
pub struct MediaDeck {
    video: Option<MountedElement>,
    audio: Option<MountedElement>,
}

impl MediaDeck {
    fn slot_mut(&mut self, slot: MediaSlot) -> &mut Option<MountedElement> {
        match slot {
            MediaSlot::Video => &mut self.video,
            MediaSlot::Audio => &mut self.audio,
        }
    }

    pub fn mount(
        &mut self,
        host: &IsolationHost,
        slot: MediaSlot,
        mount_id: u64,
        src: &str,
        autoplay: bool,
    ) -> Result<()> {
        self.unmount(slot);

        let container_id = format!("pivot-{}-media", slot.as_str());
        let container = host
            .find(&container_id)
            .with_context(|| format!("Missing media container #{container_id}"))?;
        let tag = match slot {
            MediaSlot::Video => "video",
            MediaSlot::Audio => "audio",
        };
        let element = host
            .document()
            .create_element(tag)
            .map_err(js_error)?
            .dyn_into::<HtmlMediaElement>()
            .map_err(|_| anyhow::anyhow!("<{tag}> is not a media element"))?;
        element.set_controls(true);
        element.set_preload("auto");
        element.set_attribute("playsinline", "").map_err(js_error)?;
        element.set_src(src);

        let mut listeners = Vec::with_capacity(SIGNALS.len());
        for (name, signal) in SIGNALS {
            let source = element.clone();
            let callback = Closure::<dyn FnMut(Event)>::wrap(Box::new(move |_event: Event| {
                // A natural end fires `pause` before `ended`; only report the end.
                if signal == MediaSignal::Paused && source.ended() {
                    return;
                }
                dispatch(SessionCommand::Media {
                    slot,
                    mount_id,
                    signal,
                });
            }));
            element
                .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
                .map_err(js_error)?;
            listeners.push((name, callback));
        }

        container.append_child(&element).map_err(js_error)?;
        if autoplay {
            play(&element);
        }
        debug!(slot = slot.as_str(), mount_id, src, autoplay, "Mounted media element");
        *self.slot_mut(slot) = Some(MountedElement { element, listeners });
        Ok(())
    }

    pub fn unmount(&mut self, slot: MediaSlot) {
        if let Some(mounted) = self.slot_mut(slot).take() {
            debug!(slot = slot.as_str(), "Tearing down media element");
            mounted.teardown();
        }
    }

    pub fn pause(&mut self, slot: MediaSlot) {
        if let Some(mounted) = self.slot_mut(slot).as_ref() {
            let _ = mounted.element.pause();
        }
    }
}

/// Start playback. Browsers may refuse autoplay; the rejection is logged and
/// the element simply stays paused with its controls visible.
pub fn play(element: &HtmlMediaElement) {
    match element.play() {
        Ok(promise) => spawn_local(async move {
            if let Err(err) = JsFuture::from(promise).await {
                debug!(?err, "Playback was not started");
            }
        }),
        Err(err) => debug!(?err, "Playback was not started"),
    }
}
