//! Forwards `log` records from the core to the browser console.

use log::{Level, LevelFilter, Log, Metadata, Record};

/// `log` backend writing to `console.*`.
pub(crate) struct ConsoleLogger {
    level: Level,
}

pub(crate) static LOGGER: ConsoleLogger = ConsoleLogger {
    level: if cfg!(debug_assertions) {
        Level::Debug
    } else {
        Level::Info
    },
};

/// Install the console logger. Later calls are no-ops.
pub(crate) fn install() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LOGGER.level_filter());
    }
}

impl ConsoleLogger {
    fn level_filter(&self) -> LevelFilter {
        self.level.to_level_filter()
    }
}

/// The console method a record of this level goes to.
fn console_method(level: Level) -> &'static str {
    match level {
        Level::Error => "error",
        Level::Warn => "warn",
        Level::Info => "info",
        Level::Debug | Level::Trace => "debug",
    }
}

fn format_record(record: &Record<'_>) -> String {
    format!("[{}] {}", record.target(), record.args())
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = wasm_bindgen::JsValue::from_str(&format_record(record));
        match console_method(record.level()) {
            "error" => web_sys::console::error_1(&line),
            "warn" => web_sys::console::warn_1(&line),
            "info" => web_sys::console::info_1(&line),
            _ => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}
