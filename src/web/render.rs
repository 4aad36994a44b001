use pivot_core::layout::PanelRect;
use pivot_core::modality::Modality;
use pivot_core::session::WidgetSnapshot;
use pivot_core::session::content::{LanguageOption, SlotView, TextView};
use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, HtmlInputElement, HtmlOptionElement, HtmlSelectElement};

use super::host::{IsolationHost, ROOT_ID};
use crate::markup::PANEL_ID;

pub fn render(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    render_root(host, snapshot);
    render_panel(host, &snapshot.panel);
    render_views(host, snapshot);
    render_status(host, snapshot);
    render_content(host, snapshot);
    render_navigation(host, snapshot);
    render_settings(host, snapshot);
    for modality in Modality::ALL {
        render_languages(host, modality, snapshot.languages.get(modality));
    }
}

fn set_hidden(element: &Element, hidden: bool) {
    let result = if hidden {
        element.set_attribute("hidden", "")
    } else {
        element.remove_attribute("hidden")
    };
    if let Err(err) = result {
        warn!(id = %element.id(), ?err, "Failed to toggle visibility");
    }
}

fn show(host: &IsolationHost, id: &str, visible: bool) {
    if let Some(element) = host.find(id) {
        set_hidden(&element, !visible);
    }
}

fn set_text(host: &IsolationHost, id: &str, text: &str) {
    if let Some(element) = host.find(id) {
        element.set_text_content(Some(text));
    }
}

fn render_root(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    let Some(root) = host.find(ROOT_ID) else {
        return;
    };
    let dock = root
        .class_name()
        .split_whitespace()
        .find(|class| class.starts_with("pivot-dock-"))
        .unwrap_or("pivot-dock-bottom-right")
        .to_string();
    let mut classes = vec!["pivot-root", dock.as_str()];
    if snapshot.dark_mode {
        classes.push("pivot-dark");
    }
    if snapshot.high_contrast {
        classes.push("pivot-contrast");
    }
    root.set_class_name(&classes.join(" "));

    show(host, "pivot-launcher", !snapshot.open);
    show(host, PANEL_ID, snapshot.open);
}

fn render_panel(host: &IsolationHost, panel: &PanelRect) {
    let Some(element) = host.find(PANEL_ID) else {
        return;
    };
    let style = format!(
        "left: {}px; top: {}px; width: {}px; height: {}px;",
        panel.left, panel.top, panel.width, panel.height
    );
    if element.get_attribute("style").as_deref() == Some(style.as_str()) {
        return;
    }
    if let Err(err) = element.set_attribute("style", &style) {
        warn!(?err, "Failed to place panel");
    }
}

fn render_views(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    let active = snapshot.view.as_str();
    for view in host.find_all("[data-view]") {
        let name = view.get_attribute("data-view").unwrap_or_default();
        set_hidden(&view, name != active);
    }
    for toggle in host.find_all("[data-action=\"toggle-modality\"]") {
        let pressed = toggle
            .get_attribute("data-arg")
            .and_then(|arg| Modality::parse(&arg))
            .map(|modality| snapshot.modalities.contains(modality))
            .unwrap_or(false);
        let _ = toggle.set_attribute("aria-pressed", if pressed { "true" } else { "false" });
    }
}

fn render_status(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    match &snapshot.status_message {
        Some(message) => {
            set_text(host, "pivot-status", message);
            show(host, "pivot-status", true);
        }
        None => show(host, "pivot-status", false),
    }
    match &snapshot.notice {
        Some(notice) => {
            set_text(host, "pivot-notice", &notice.message);
            show(host, "pivot-notice", true);
        }
        None => show(host, "pivot-notice", false),
    }
}

fn render_slot(host: &IsolationHost, name: &str, view: &SlotView) {
    let container = format!("pivot-{name}");
    let placeholder = format!("pivot-{name}-placeholder");
    let media = format!("pivot-{name}-media");
    match view {
        SlotView::Inactive => show(host, &container, false),
        SlotView::Placeholder { message } => {
            show(host, &container, true);
            set_text(host, &placeholder, message);
            show(host, &placeholder, true);
            show(host, &media, false);
        }
        SlotView::Media { .. } => {
            show(host, &container, true);
            show(host, &placeholder, false);
            show(host, &media, true);
        }
    }
}

fn render_content(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    let Some(content) = &snapshot.content else {
        show(host, "pivot-content", false);
        return;
    };
    show(host, "pivot-content", true);
    render_slot(host, "video", &content.video);
    render_slot(host, "audio", &content.audio);

    let Some(text) = host.find("pivot-text") else {
        return;
    };
    match &content.text {
        TextView::Inactive => set_hidden(&text, true),
        TextView::Placeholder { message } => {
            text.set_text_content(Some(message));
            text.set_class_name("pivot-text pivot-placeholder");
            let _ = text.remove_attribute("lang");
            set_hidden(&text, false);
        }
        TextView::Text { body, language } => {
            text.set_text_content(Some(body));
            text.set_class_name(&format!("pivot-text {}", snapshot.text_size_class));
            if language.is_empty() {
                let _ = text.remove_attribute("lang");
            } else {
                let _ = text.set_attribute("lang", &language.to_ascii_lowercase());
            }
            set_hidden(&text, false);
        }
    }
}

fn render_navigation(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    set_disabled(host, "pivot-prev", !snapshot.can_prev);
    set_disabled(host, "pivot-next", !snapshot.can_next);
    let position = match snapshot.current_index {
        Some(index) if snapshot.section_count > 0 => {
            format!("{} / {}", index + 1, snapshot.section_count)
        }
        _ => String::new(),
    };
    set_text(host, "pivot-position", &position);

    match snapshot.repeats {
        Some(repeats) => {
            set_text(
                host,
                "pivot-repeats-label",
                &format!("{} of {}", repeats.position + 1, repeats.count),
            );
            show(host, "pivot-repeats", true);
        }
        None => show(host, "pivot-repeats", false),
    }
}

fn set_disabled(host: &IsolationHost, id: &str, disabled: bool) {
    if let Some(button) = host
        .find(id)
        .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
    {
        button.set_disabled(disabled);
    }
}

fn input(host: &IsolationHost, id: &str) -> Option<HtmlInputElement> {
    host.find(id)?.dyn_into::<HtmlInputElement>().ok()
}

fn render_settings(host: &IsolationHost, snapshot: &WidgetSnapshot) {
    if let Some(size) = input(host, "pivot-text-size") {
        size.set_value(&snapshot.text_size.to_string());
    }
    if let Some(dark) = input(host, "pivot-dark-mode") {
        dark.set_checked(snapshot.dark_mode);
    }
    if let Some(contrast) = input(host, "pivot-high-contrast") {
        contrast.set_checked(snapshot.high_contrast);
    }
}

fn render_languages(host: &IsolationHost, modality: Modality, options: &[LanguageOption]) {
    let Some(select) = host
        .find(&format!("pivot-language-{}", modality.as_str()))
        .and_then(|element| element.dyn_into::<HtmlSelectElement>().ok())
    else {
        return;
    };
    // Rebuilding resets an open dropdown, so only do it when the list changed.
    let signature = options
        .iter()
        .map(|option| {
            if option.selected {
                format!("*{}", option.code)
            } else {
                option.code.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    if select.get_attribute("data-options").as_deref() == Some(signature.as_str()) {
        return;
    }
    select.set_inner_html("");
    for option in options {
        match HtmlOptionElement::new_with_text_and_value(&option.code, &option.code) {
            Ok(element) => {
                element.set_selected(option.selected);
                if let Err(err) = select.append_child(&element) {
                    warn!(?err, "Failed to add language option");
                }
            }
            Err(err) => warn!(?err, "Failed to create language option"),
        }
    }
    select.set_disabled(options.is_empty());
    let _ = select.set_attribute("data-options", &signature);
}
