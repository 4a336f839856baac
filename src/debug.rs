//! Log bridge for gridpaint.
//!
//! Every `log::info!()`, `log::debug!()` etc. in the workspace ends up in
//! `gridpaint_debug.log` inside the system temp directory
//! (`/tmp/gridpaint_debug.log` on most Unix systems,
//! `%TEMP%\gridpaint_debug.log` on Windows). Writing to a file keeps the
//! replay tool's stdout clean for piping.
//!
//! When `RUST_LOG` is set, lines are mirrored to stderr as well.
//!
//! Level precedence: the `--log-level` flag, then `RUST_LOG`, then the
//! config file's `log_level` (applied later through [`set_level`]).

use gridpaint_config::LogLevel;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

struct LogBridge {
    file: Mutex<Option<File>>,
    mirror_stderr: bool,
}

static BRIDGE: OnceLock<LogBridge> = OnceLock::new();

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    std::env::temp_dir().join("gridpaint_debug.log")
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

fn open_log_file() -> Option<File> {
    let path = log_path();
    match OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(&path)
    {
        Ok(mut f) => {
            let _ = writeln!(
                f,
                "{}\ngridpaint debug session started at {}\n{}",
                "=".repeat(80),
                get_timestamp(),
                "=".repeat(80)
            );
            Some(f)
        }
        // Logging must never take the tool down.
        Err(_) => None,
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "[{}] [{:<5}] [{}] {}\n",
            get_timestamp(),
            record.level(),
            record.target(),
            record.args()
        );
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.write_all(line.as_bytes());
        }
        if self.mirror_stderr {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = self.file.lock().as_mut() {
            let _ = file.flush();
        }
    }
}

fn level_from_env() -> Option<log::LevelFilter> {
    let value = std::env::var("RUST_LOG").ok()?;
    // Accept plain levels and `target=level` lists; the most verbose wins.
    value
        .split(',')
        .filter_map(|part| part.rsplit('=').next())
        .filter_map(|level| LogLevel::parse(level).map(LogLevel::to_level_filter))
        .max()
}

/// Install the bridge as the global logger.
///
/// `cli_level` is the `--log-level` flag. Without it `RUST_LOG` decides, and
/// without either logging stays off until [`set_level`] applies the config.
/// Calling this more than once keeps the first logger.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let env_level = level_from_env();
    let level = cli_level
        .map(LogLevel::to_level_filter)
        .or(env_level)
        .unwrap_or(log::LevelFilter::Off);

    let bridge = BRIDGE.get_or_init(|| LogBridge {
        file: Mutex::new(open_log_file()),
        mirror_stderr: std::env::var_os("RUST_LOG").is_some(),
    });
    if log::set_logger(bridge).is_ok() {
        log::set_max_level(level);
    }
}

/// Apply the config file's level unless the command line or `RUST_LOG`
/// already chose one.
pub fn set_level(config_level: LogLevel, cli_level: Option<LogLevel>) {
    if cli_level.is_some() || level_from_env().is_some() {
        return;
    }
    log::set_max_level(config_level.to_level_filter());
}
