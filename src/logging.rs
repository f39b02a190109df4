use std::io::Write;

use env_logger::Builder;
use log::LevelFilter;

/// Maps a level name to a filter.
///
/// Accepts TRACE, DEBUG, INFO, WARN, ERROR, FATAL and PANIC in any case.
/// FATAL and PANIC collapse to ERROR; anything unknown falls back to INFO.
pub fn parse_level(value: &str) -> LevelFilter {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" => LevelFilter::Trace,
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" | "FATAL" | "PANIC" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Installs the process logger. `RUST_LOG` directives are applied on top of `level`.
pub fn init(level: &str) {
    let filter = parse_level(level);

    Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format(|buf, record| {
            let file = record
                .file()
                .and_then(|path| path.rsplit('/').next())
                .unwrap_or("?");
            writeln!(
                buf,
                "{} {:<5} {}:{}\t{}",
                buf.timestamp_seconds(),
                record.level(),
                file,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    log::debug!("Log level set at {filter}");
}
