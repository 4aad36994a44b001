use std::cell::Cell;
use std::rc::Rc;

use anyhow::{Context, Result};
use pivot_core::config::WidgetConfig;
use pivot_core::session::{SessionCommand, parse_action};
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlInputElement, HtmlMediaElement,
    HtmlSelectElement, MouseEvent, ShadowRoot, ShadowRootInit, ShadowRootMode,
};

use super::highlight::MARKER_ID;
use super::{dispatch, js_error, remember_click, viewport_command};
use crate::markup;

pub const HOST_ID: &str = "pivot-shadow-host";
pub const ROOT_ID: &str = "pivot-root";
const INSTRUCTION_VIDEO_ID: &str = "pivot-instruction-video";
const INSTRUCTION_AUDIO_ID: &str = "pivot-instruction-audio";

type Listener = Closure<dyn FnMut(Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrabKind {
    Move,
    Resize,
}

/// A held mouse button on the drag or resize handle, with the last pointer
/// position seen.
#[derive(Debug, Clone, Copy)]
struct PointerGrab {
    kind: GrabKind,
    x: i32,
    y: i32,
}

pub fn already_mounted(document: &Document) -> bool {
    document.get_element_by_id(HOST_ID).is_some()
}

/// The widget's host element plus its open shadow root. Everything the
/// widget renders lives under the shadow root so host page styles cannot
/// reach it.
pub struct IsolationHost {
    document: Document,
    element: Element,
    shadow: ShadowRoot,
    listeners: Vec<(EventTarget, &'static str, Listener)>,
}

impl IsolationHost {
    pub fn mount(document: &Document, config: &WidgetConfig) -> Result<Self> {
        let body = document.body().context("document has no body")?;
        let element = document.create_element("div").map_err(js_error)?;
        element.set_id(HOST_ID);
        element
            .set_attribute("style", "all: initial;")
            .map_err(js_error)?;

        let shadow = element
            .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
            .map_err(js_error)?;
        shadow.set_inner_html(&markup::render_markup(config));
        body.append_child(&element).map_err(js_error)?;

        let mut host = Self {
            document: document.clone(),
            element,
            shadow,
            listeners: Vec::new(),
        };
        host.install_listeners()?;
        debug!("Isolation host attached");
        Ok(host)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The host element in the page's light DOM.
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Look up a widget element by id inside the shadow root.
    pub fn find(&self, id: &str) -> Option<Element> {
        self.shadow.get_element_by_id(id)
    }

    pub fn find_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.shadow.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|idx| list.item(idx))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    pub fn play_instructions(&self) {
        if let Some(video) = self.media_element(INSTRUCTION_VIDEO_ID) {
            video.set_current_time(0.0);
            super::media::play(&video);
        }
    }

    pub fn pause_instructions(&self) {
        for id in [INSTRUCTION_VIDEO_ID, INSTRUCTION_AUDIO_ID] {
            if let Some(media) = self.media_element(id) {
                let _ = media.pause();
            }
        }
    }

    fn media_element(&self, id: &str) -> Option<HtmlMediaElement> {
        self.find(id)?.dyn_into::<HtmlMediaElement>().ok()
    }

    fn install_listeners(&mut self) -> Result<()> {
        let shadow_target: EventTarget = self.shadow.clone().into();
        self.listen(&shadow_target, "click", Box::new(on_widget_click))?;
        self.listen(&shadow_target, "change", Box::new(on_widget_change))?;

        let host_element = self.element.clone();
        let document_target: EventTarget = self.document.clone().into();
        self.listen(
            &document_target,
            "click",
            Box::new(move |event: Event| on_host_click(&host_element, event)),
        )?;

        self.install_pointer_listeners()?;
        if let Some(window) = web_sys::window() {
            let window_target: EventTarget = window.clone().into();
            self.listen(
                &window_target,
                "resize",
                Box::new(move |_event: Event| dispatch(viewport_command(&window))),
            )?;
        }

        if let Some(video) = self.find(INSTRUCTION_VIDEO_ID) {
            let video_target: EventTarget = video.into();
            self.listen(
                &video_target,
                "ended",
                Box::new(|_event: Event| dispatch(SessionCommand::InstructionsEnded)),
            )?;
        }
        Ok(())
    }

    fn install_pointer_listeners(&mut self) -> Result<()> {
        let grab = Rc::new(Cell::new(None::<PointerGrab>));
        for (id, kind) in [
            (markup::DRAG_HANDLE_ID, GrabKind::Move),
            (markup::RESIZE_HANDLE_ID, GrabKind::Resize),
        ] {
            let Some(handle) = self.find(id) else {
                warn!(id, "Missing panel handle");
                continue;
            };
            let grab = Rc::clone(&grab);
            let handle_target: EventTarget = handle.into();
            self.listen(
                &handle_target,
                "mousedown",
                Box::new(move |event: Event| start_grab(&grab, kind, &event)),
            )?;
        }

        // Moves and releases are tracked page-wide so a fast pointer that
        // leaves the handle keeps the grab.
        let document_target: EventTarget = self.document.clone().into();
        let moving = Rc::clone(&grab);
        self.listen(
            &document_target,
            "mousemove",
            Box::new(move |event: Event| follow_grab(&moving, &event)),
        )?;
        self.listen(
            &document_target,
            "mouseup",
            Box::new(move |_event: Event| grab.set(None)),
        )?;
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        name: &'static str,
        handler: Box<dyn FnMut(Event)>,
    ) -> Result<()> {
        let callback = Closure::<dyn FnMut(Event)>::wrap(handler);
        target
            .add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())
            .map_err(js_error)?;
        self.listeners.push((target.clone(), name, callback));
        Ok(())
    }
}

impl Drop for IsolationHost {
    fn drop(&mut self) {
        for (target, name, callback) in self.listeners.drain(..) {
            let _ = target.remove_event_listener_with_callback(name, callback.as_ref().unchecked_ref());
        }
        self.element.remove();
    }
}

fn start_grab(grab: &Cell<Option<PointerGrab>>, kind: GrabKind, event: &Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    if mouse.button() != 0 {
        return;
    }
    // Header buttons keep their clicks.
    let on_button = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|element| element.closest("button").ok().flatten())
        .is_some();
    if kind == GrabKind::Move && on_button {
        return;
    }
    event.prevent_default();
    event.stop_propagation();
    grab.set(Some(PointerGrab {
        kind,
        x: mouse.client_x(),
        y: mouse.client_y(),
    }));
}

fn follow_grab(grab: &Cell<Option<PointerGrab>>, event: &Event) {
    let (Some(current), Some(mouse)) = (grab.get(), event.dyn_ref::<MouseEvent>()) else {
        return;
    };
    // The button was released outside the window.
    if mouse.buttons() == 0 {
        grab.set(None);
        return;
    }
    let (x, y) = (mouse.client_x(), mouse.client_y());
    let (dx, dy) = (x - current.x, y - current.y);
    if dx == 0 && dy == 0 {
        return;
    }
    grab.set(Some(PointerGrab { x, y, ..current }));
    dispatch(match current.kind {
        GrabKind::Move => SessionCommand::DragPanel { dx, dy },
        GrabKind::Resize => SessionCommand::ResizePanel { dx, dy },
    });
}

fn action_element(event: &Event) -> Option<Element> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    target.closest("[data-action]").ok().flatten()
}

fn dispatch_action(action: &str, args: &[&str]) {
    match parse_action(action, args) {
        Some(command) => dispatch(command),
        None => warn!(action, ?args, "Ignoring unknown widget action"),
    }
}

fn on_widget_click(event: Event) {
    let Some(element) = action_element(&event) else {
        return;
    };
    // Form controls report through `change`.
    if element.get_attribute("data-event").as_deref() == Some("change") {
        return;
    }
    let action = element.get_attribute("data-action").unwrap_or_default();
    let arg = element.get_attribute("data-arg");
    let args: Vec<&str> = arg.as_deref().into_iter().collect();
    dispatch_action(&action, &args);
}

fn on_widget_change(event: Event) {
    let Some(element) = action_element(&event) else {
        return;
    };
    let action = element.get_attribute("data-action").unwrap_or_default();
    let arg = element.get_attribute("data-arg").unwrap_or_default();
    let value = if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else {
        String::new()
    };
    match action.as_str() {
        "select-language" => dispatch_action(&action, &[&arg, &value]),
        "set-text-size" => dispatch_action(&action, &[&value]),
        _ => dispatch_action(&action, &[&arg]),
    }
}

fn on_host_click(host_element: &Element, event: Event) {
    let Some(target) = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
    else {
        return;
    };
    // Clicks inside the shadow root surface here retargeted to the host.
    if &target == host_element || host_element.contains(Some(&target)) {
        return;
    }
    let element = if target.id() == MARKER_ID || target.tag_name().eq_ignore_ascii_case("a") {
        target.parent_element().unwrap_or(target)
    } else {
        target
    };
    let text = element.text_content().unwrap_or_default();
    if text.trim().is_empty() {
        return;
    }
    remember_click(element);
    dispatch(SessionCommand::HostClick { text });
}
