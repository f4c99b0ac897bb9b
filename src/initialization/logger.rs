//! Logger initialization.
//!
//! Logs go to stderr so they never mix with the report on stdout.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting: colored plain text or one
/// JSON object per line. `RUST_LOG` is read first and the provided `level`
/// overrides it, so `RUST_LOG=rustls=trace` still works for TLS debugging.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
///
/// # Examples
///
/// ```bash
/// # Connection attempts and proxy decisions
/// certinfo example.com --log-level debug
///
/// # Machine-readable logs, report as JSON
/// certinfo example.com -o json --log-format json 2>certinfo.log
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    // rustls logs every alert at warn; a failed handshake is already reported once.
    builder.filter_module("rustls", LevelFilter::Error);
    builder.filter_module("tokio_rustls", LevelFilter::Error);
    builder.filter_module("tokio_socks", LevelFilter::Warn);
    builder.filter_module("certinfo", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(std::io::IsTerminal::is_terminal(&std::io::stderr()));
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    record.target().cyan(),
                    colored_level(record.level()),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

fn colored_level(level: Level) -> ColoredString {
    let label = level.to_string();
    match level {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.purple(),
    }
}

fn json_line(ts_millis: i64, level: Level, target: &str, msg: &str) -> String {
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":{},\"msg\":{}}}",
        ts_millis,
        level,
        serde_json::to_string(target).unwrap_or_else(|_| "\"\"".into()),
        serde_json::to_string(msg).unwrap_or_else(|_| "\"\"".into())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_is_valid_json() {
        let line = json_line(
            1_700_000_000_000,
            Level::Warn,
            "certinfo::fetch",
            "Connect attempt 1/2 to \"example.com:443\" failed",
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["ts"], 1_700_000_000_000i64);
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "certinfo::fetch");
        assert_eq!(
            value["msg"],
            "Connect attempt 1/2 to \"example.com:443\" failed"
        );
    }

    #[test]
    fn test_init_logger_twice_fails_gracefully() {
        // env_logger can only be initialized once per process
        let _ = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let result = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(matches!(result, Err(InitializationError::LoggerError(_))));
    }
}
