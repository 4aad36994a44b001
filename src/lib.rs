//! Embeddable PIVOT accessibility widget.
//!
//! On `wasm32` this crate mounts an isolated shadow root into the host page,
//! listens for clicks on host content and drives
//! [`pivot_core::session::WidgetSession`] from DOM, media and network events.
//! On other targets only the bundled configuration helpers are compiled, so
//! the workspace still builds and tests natively.

use pivot_core::config::{WidgetConfig, load_config};

/// Baseline settings compiled into the bundle.
pub const BUNDLED_CONFIG: &str = include_str!("../conf/widget.toml");

/// Parse [`BUNDLED_CONFIG`], falling back to defaults if it is broken.
pub fn bundled_config() -> WidgetConfig {
    load_config(Some(BUNDLED_CONFIG))
}

pub mod markup;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(test)]
mod tests {
    use super::*;
    use pivot_core::config::{EmbedAttributes, WidgetPosition, parse_config};

    #[test]
    fn bundled_config_is_valid_toml() {
        assert!(parse_config(BUNDLED_CONFIG).is_ok());
        assert_eq!(bundled_config().position, WidgetPosition::BottomRight);
    }

    #[test]
    fn embed_tag_supplies_the_tenant() {
        let mut config = bundled_config();
        assert!(config.validate().is_err());
        config.apply_embed(&EmbedAttributes {
            website_id: Some("fe05622a-8043-41c7-958c-5c657a701fc1".to_string()),
            ..EmbedAttributes::default()
        });
        assert!(config.validate().is_ok());
    }
}
