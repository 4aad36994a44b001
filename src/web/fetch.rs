use anyhow::{Context, Result, bail};
use gloo_net::http::Request;
use pivot_core::sections::{Section, parse_sections};
use pivot_core::session::SessionCommand;
use tracing::{debug, warn};
use wasm_bindgen_futures::spawn_local;
use web_sys::FormData;

use super::{dispatch, js_error};

/// Fetch the page's sections in the background and report back with the
/// request id the session issued.
pub fn spawn_section_fetch(url: String, page_url: String, website_id: String, request_id: u64) {
    spawn_local(async move {
        let result = fetch_sections(&url, &page_url, &website_id).await;
        let result = match result {
            Ok(sections) => {
                debug!(request_id, count = sections.len(), "Sections received");
                Ok(sections)
            }
            Err(err) => {
                warn!(request_id, "Failed to fetch sections: {err:#}");
                Err(format!("{err:#}"))
            }
        };
        dispatch(SessionCommand::SectionsLoaded { request_id, result });
    });
}

async fn fetch_sections(url: &str, page_url: &str, website_id: &str) -> Result<Vec<Section>> {
    let form = FormData::new().map_err(js_error)?;
    form.append_with_str("page_url", page_url)
        .map_err(js_error)?;
    form.append_with_str("website_id", website_id)
        .map_err(js_error)?;

    let response = Request::post(url)
        .body(form)
        .context("Failed to build sections request")?
        .send()
        .await
        .with_context(|| format!("Sections request to {url} failed"))?;
    if !response.ok() {
        bail!("Sections endpoint returned HTTP {}", response.status());
    }
    let body = response
        .text()
        .await
        .context("Failed to read sections response")?;
    parse_sections(&body)
}
