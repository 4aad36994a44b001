use pivot_core::config::EmbedAttributes;
use web_sys::Document;

const EMBED_SELECTOR: &str = "script[data-website-id]";

/// Read `data-*` overrides from the script tag that embedded the widget.
pub fn read_embed_attributes(document: &Document) -> EmbedAttributes {
    let script = document
        .current_script()
        .filter(|script| script.has_attribute("data-website-id"))
        .or_else(|| document.query_selector(EMBED_SELECTOR).ok().flatten());
    let Some(script) = script else {
        return EmbedAttributes::default();
    };
    let read = |name: &str| script.get_attribute(name);
    EmbedAttributes {
        website_id: read("data-website-id"),
        position: read("data-position"),
        api_base: read("data-api-base"),
        log_level: read("data-log-level"),
    }
}
