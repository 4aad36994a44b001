use anyhow::Result;
use js_sys::{Object, Reflect};
use pivot_core::session::{SessionCommand, parse_action};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::{dispatch, js_error, with_session};

const GLOBAL_NAME: &str = "PIVOTWidget";

/// Script arguments by position. Anything that is not a string becomes an
/// empty argument so later arguments keep their place.
fn string_args(args: &[JsValue]) -> Vec<String> {
    args.iter()
        .map(|value| value.as_string().unwrap_or_default())
        .collect()
}

fn run_action(action: &str, args: &[JsValue]) {
    let args = string_args(args);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match parse_action(action, &args) {
        Some(command) => dispatch(command),
        None => warn!(action, ?args, "Ignoring invalid widget call"),
    }
}

#[wasm_bindgen]
pub fn open() {
    dispatch(SessionCommand::Open);
}

#[wasm_bindgen]
pub fn close() {
    dispatch(SessionCommand::Close);
}

#[wasm_bindgen(js_name = nextSection)]
pub fn next_section() {
    dispatch(SessionCommand::NextSection);
}

#[wasm_bindgen(js_name = previousSection)]
pub fn previous_section() {
    dispatch(SessionCommand::PrevSection);
}

#[wasm_bindgen(js_name = toggleModality)]
pub fn toggle_modality(modality: JsValue) {
    run_action("toggleModality", &[modality]);
}

#[wasm_bindgen(js_name = selectLanguage)]
pub fn select_language(modality: JsValue, code: JsValue) {
    run_action("selectLanguage", &[modality, code]);
}

#[wasm_bindgen(js_name = toggleSetting)]
pub fn toggle_setting(setting: JsValue) {
    run_action("toggleSetting", &[setting]);
}

#[wasm_bindgen(js_name = growWidget)]
pub fn grow_widget() {
    dispatch(SessionCommand::StepPanelSize { grow: true });
}

#[wasm_bindgen(js_name = shrinkWidget)]
pub fn shrink_widget() {
    dispatch(SessionCommand::StepPanelSize { grow: false });
}

#[wasm_bindgen]
pub fn reload() {
    dispatch(SessionCommand::Reload);
}

/// Current widget state as JSON, or `undefined` before the widget mounts.
#[wasm_bindgen]
pub fn snapshot() -> Option<String> {
    with_session(|session| serde_json::to_string(&session.snapshot()))?
        .map_err(|err| warn!("Failed to serialize snapshot: {err}"))
        .ok()
}

fn set_method(target: &Object, name: &str, method: JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(name), &method).map_err(js_error)?;
    Ok(())
}

/// Publish `window.PIVOTWidget` unless something already claimed the name.
pub fn install(window: &Window) -> Result<()> {
    let name = JsValue::from_str(GLOBAL_NAME);
    if Reflect::has(window, &name).unwrap_or(false) {
        debug!("window.{GLOBAL_NAME} already defined; leaving it alone");
        return Ok(());
    }

    let global = Object::new();
    for (method, action) in [
        ("open", "open"),
        ("close", "close"),
        ("nextSection", "nextSection"),
        ("previousSection", "previousSection"),
        ("reload", "reload"),
        ("growWidget", "growWidget"),
        ("shrinkWidget", "shrinkWidget"),
    ] {
        let callback = Closure::<dyn Fn()>::new(move || run_action(action, &[]));
        set_method(&global, method, callback.into_js_value())?;
    }
    for action in ["toggleModality", "toggleSetting"] {
        let callback = Closure::<dyn Fn(JsValue)>::new(move |arg: JsValue| run_action(action, &[arg]));
        set_method(&global, action, callback.into_js_value())?;
    }
    let select = Closure::<dyn Fn(JsValue, JsValue)>::new(|modality: JsValue, code: JsValue| {
        run_action("selectLanguage", &[modality, code])
    });
    set_method(&global, "selectLanguage", select.into_js_value())?;
    let get_snapshot = Closure::<dyn Fn() -> JsValue>::new(|| match snapshot() {
        Some(json) => JsValue::from_str(&json),
        None => JsValue::UNDEFINED,
    });
    set_method(&global, "getSnapshot", get_snapshot.into_js_value())?;

    Reflect::set(window, &name, &global).map_err(js_error)?;
    debug!("Installed window.{GLOBAL_NAME}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_core::modality::Modality;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn non_string_arguments_keep_their_position() {
        let args = string_args(&[JsValue::from_f64(3.0), JsValue::from_str("fr")]);
        assert_eq!(args, vec![String::new(), "fr".to_string()]);

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(parse_action("selectLanguage", &args), None);
    }

    #[wasm_bindgen_test]
    fn string_arguments_pass_through() {
        let args = string_args(&[JsValue::from_str("audio"), JsValue::from_str("fr")]);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        assert_eq!(
            parse_action("selectLanguage", &args),
            Some(SessionCommand::SelectLanguage {
                modality: Modality::Audio,
                code: "fr".to_string(),
            })
        );
    }
}
