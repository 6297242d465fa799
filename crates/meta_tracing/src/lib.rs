use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, prelude::*};

pub struct TraceConfig {
    pub file_name_prefix: String,
    pub dir: String,
    pub level: Level,
    pub console: bool,
}

/// Installs the global subscriber: a daily rolling log file, mirrored to stdout when `console`
/// is set. Keep the returned guards alive until exit or buffered lines are lost.
pub fn init_tracing(config: TraceConfig) -> Vec<WorkerGuard> {
    let TraceConfig { file_name_prefix, dir, level, console } = config;

    let mut guards = vec![];
    let (fmt_writer, fmt_guard) =
        tracing_appender::non_blocking(rolling::daily(&dir, &file_name_prefix));
    guards.push(fmt_guard);

    let layered = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(fmt_writer)
        .with_ansi(false)
        .finish();

    if console {
        layered.with(fmt::Layer::default()).init();
    } else {
        layered.init();
    }

    guards
}
