//! Configuration for the embeddable widget.
//!
//! Baseline settings ship as a TOML document compiled into the widget bundle;
//! the embedding `<script>` tag may then override a handful of them through
//! `data-*` attributes. Missing or invalid entries fall back to defaults so
//! the widget can always mount.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{EmbedAttributes, LogLevel, WidgetConfig, WidgetPosition};
