use super::models::WidgetConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Parse the sectioned TOML layout into a flat config.
pub fn parse_config(contents: &str) -> Result<WidgetConfig> {
    let tables: ConfigTables =
        toml::from_str(contents).context("Failed to parse widget config TOML")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &WidgetConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Failed to serialize widget config")
}

/// Load configuration from an optional TOML document, falling back to
/// defaults on error.
pub fn load_config(contents: Option<&str>) -> WidgetConfig {
    let Some(contents) = contents else {
        debug!("No bundled config; using defaults");
        return WidgetConfig::default();
    };

    match parse_config(contents) {
        Ok(config) => {
            debug!("Parsed bundled widget configuration");
            config
        }
        Err(err) => {
            warn!("Falling back to default config: {err:#}");
            WidgetConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbedAttributes, LogLevel, WidgetPosition};

    #[test]
    fn tables_round_trip_through_toml() {
        let mut config = WidgetConfig::default();
        config.website_id = "site-42".to_string();
        config.position = WidgetPosition::TopLeft;
        config.log_level = LogLevel::Debug;

        let text = serialize_config(&config).expect("serialize");
        let parsed = parse_config(&text).expect("parse");

        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_tables_fill_missing_fields_with_defaults() {
        let parsed = parse_config(
            r#"
            [widget]
            position = "bottom-left"

            [logging]
            log_level = "warn"
            "#,
        )
        .expect("parse");

        assert_eq!(parsed.position, WidgetPosition::BottomLeft);
        assert_eq!(parsed.log_level, LogLevel::Warn);
        assert_eq!(parsed.sections_path, "/api/v1/widget-sections/");
        assert_eq!(parsed.notice_duration_ms, 3000);
    }

    #[test]
    fn invalid_toml_falls_back_to_defaults() {
        let config = load_config(Some("[widget\nposition = 3"));
        assert_eq!(config, WidgetConfig::default());
        assert_eq!(load_config(None), WidgetConfig::default());
    }

    #[test]
    fn bundled_config_parses() {
        let config = parse_config(include_str!("../../../../conf/widget.toml")).expect("parse");
        assert_eq!(config.preferences_key, "pivot-widget.preferences.v1");
    }

    #[test]
    fn embed_attributes_override_and_ignore_unknown_values() {
        let mut config = WidgetConfig::default();
        config.apply_embed(&EmbedAttributes {
            website_id: Some("  abc-123 ".to_string()),
            position: Some("middle".to_string()),
            api_base: Some("https://api.example.com/".to_string()),
            log_level: Some("DEBUG".to_string()),
        });

        assert_eq!(config.website_id, "abc-123");
        assert_eq!(config.position, WidgetPosition::BottomRight);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.sections_url("https://host.example"),
            "https://api.example.com/api/v1/widget-sections/"
        );
    }

    #[test]
    fn missing_website_id_fails_validation() {
        let config = WidgetConfig::default();
        let err = config.validate().expect_err("should fail");
        assert_eq!(
            err.to_string(),
            "Widget configuration error: Missing website ID."
        );
        assert_eq!(
            config.sections_url("https://host.example/"),
            "https://host.example/api/v1/widget-sections/"
        );
    }
}
