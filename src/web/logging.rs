use std::io::{self, Write};

use pivot_core::config::LogLevel;
use tracing::{Level, Metadata, debug};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Buffers one formatted event and hands it to the matching `console.*`
/// method when dropped.
pub struct ConsoleWriter {
    level: Level,
    buffer: Vec<u8>,
}

impl Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buffer);
        let message = wasm_bindgen::JsValue::from_str(line.trim_end());
        match self.level {
            Level::ERROR => web_sys::console::error_1(&message),
            Level::WARN => web_sys::console::warn_1(&message),
            Level::INFO => web_sys::console::info_1(&message),
            _ => web_sys::console::debug_1(&message),
        }
        self.buffer.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter {
            level: Level::INFO,
            buffer: Vec::new(),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter {
            level: *meta.level(),
            buffer: Vec::new(),
        }
    }
}

pub fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::new(format!(
        "warn,pivot_widget={level},pivot_core={level}",
        level = level.as_filter_str()
    ));
    let layer = fmt::layer()
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(true)
        .with_file(true)
        .with_line_number(true);
    // An earlier boot may already own the global subscriber.
    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_ok()
    {
        debug!(%level, "Logging initialized");
    }
}
