//! Subscriber setup for `rk`.
//!
//! Rendered output owns stdout, so the console layer writes to stderr. A file
//! layer is added when `[logging] file` is set and may use its own level.

use replykit_core::config::types::LoggingConfig;
use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// Dropping the guard flushes the file writer, so it lives until exit.
static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

pub fn init(cfg: &LoggingConfig) {
    let console_level = parse_level(&cfg.level).unwrap_or(LevelFilter::INFO);
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter_for(console_level));

    let file_layer = cfg.file.as_deref().and_then(|path| {
        let level = cfg
            .file_level
            .as_deref()
            .and_then(parse_level)
            .unwrap_or(console_level.max(LevelFilter::DEBUG));
        open_log_file(path).map(|file| {
            let (writer, guard) = tracing_appender::non_blocking(file);
            if let Ok(mut slot) = FILE_GUARD.lock() {
                *slot = Some(guard);
            }
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_for(level))
        })
    });

    // `try_init` so a second call (tests, embedding) leaves the first in place
    let _ = tracing_subscriber::registry().with(console).with(file_layer).try_init();
}

fn filter_for(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {e}", path.display());
            None
        }
    }
}

/// Level names as written in config: `off`, `error` ... `trace`, any case.
fn parse_level(s: &str) -> Option<LevelFilter> {
    let s = s.trim();
    if s.is_empty() || s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
