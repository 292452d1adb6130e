//! Rolling file logs for the zoo core.
//!
//! # Responsibility
//! - Start the process-wide `flexi_logger` backend from a `LogTarget`.
//! - Route panics through the log before the default hook runs.
//!
//! # Invariants
//! - Events are `event=... module=... status=...` lines carrying ids, kinds,
//!   counts and durations. Record names, notes and phone numbers are never
//!   logged.
//! - The first successful init wins; later calls must ask for the same target.
//! - Initialization never panics.

use crate::config::ZooConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::panic::PanicHookInfo;
use std::path::PathBuf;
use std::sync::Once;

const LOG_BASENAME: &str = "zoo";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Level and directory of the file log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub level: LevelFilter,
    /// Absolute directory holding the `zoo*.log` files.
    pub dir: PathBuf,
}

impl LogTarget {
    /// Parses `level` (`warning` is accepted for `warn`, `off` is not) and
    /// requires an absolute `dir`.
    pub fn new(level: &str, dir: impl Into<PathBuf>) -> Result<Self, String> {
        let name = level.trim().to_ascii_lowercase();
        let name = if name == "warning" { "warn" } else { name.as_str() };
        let level = match name.parse::<LevelFilter>() {
            Ok(LevelFilter::Off) | Err(_) => {
                return Err(format!(
                    "unsupported log level `{}`; expected trace|debug|info|warn|error",
                    level.trim()
                ))
            }
            Ok(level) => level,
        };

        let dir = dir.into();
        if dir.as_os_str().is_empty() {
            return Err("log directory cannot be empty".to_string());
        }
        if !dir.is_absolute() {
            return Err(format!(
                "log directory must be an absolute path, got `{}`",
                dir.display()
            ));
        }
        Ok(Self { level, dir })
    }
}

/// Starts file logging for `target`.
///
/// Repeating the call with an equal target is a no-op; a different level or
/// directory is rejected with a message naming both.
pub fn init_logging(target: &LogTarget) -> Result<(), String> {
    let active = ACTIVE.get_or_try_init(|| start_logger(target))?;
    if active.target != *target {
        return Err(format!(
            "logging already active at {} in `{}`; refusing to switch to {} in `{}`",
            active.target.level,
            active.target.dir.display(),
            target.level,
            target.dir.display()
        ));
    }
    Ok(())
}

/// Starts file logging when `config.log_dir` is set.
///
/// Returns `Ok(false)` without touching the logger when it is not.
pub fn init_logging_from_config(config: &ZooConfig) -> Result<bool, String> {
    let Some(dir) = &config.log_dir else {
        return Ok(false);
    };
    init_logging(&LogTarget::new(&config.log_level, dir.clone())?)?;
    Ok(true)
}

/// Target of the running logger, if any.
pub fn logging_status() -> Option<LogTarget> {
    ACTIVE.get().map(|active| active.target.clone())
}

/// `debug` in debug builds, `info` in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(target: &LogTarget) -> Result<ActiveLogger, String> {
    std::fs::create_dir_all(&target.dir).map_err(|err| {
        format!(
            "failed to create log directory `{}`: {err}",
            target.dir.display()
        )
    })?;

    let spec = LogSpecification::builder().default(target.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(target.dir.as_path())
                .basename(LOG_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    PANIC_HOOK.call_once(install_panic_hook);

    info!(
        "event=logging_start module=core status=ok level={} os={} debug_build={} version={}",
        target.level,
        std::env::consts::OS,
        cfg!(debug_assertions),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        target: target.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(
            "event=panic module=core status=error location={} payload={}",
            panic_location(info),
            panic_payload(info)
        );
        previous(info);
    }));
}

fn panic_location(info: &PanicHookInfo<'_>) -> String {
    info.location().map_or_else(
        || "unknown".to_string(),
        |location| format!("{}:{}", location.file(), location.line()),
    )
}

fn panic_payload(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let text = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<non-string payload>".to_string());
    one_line(&text, PANIC_PAYLOAD_LIMIT)
}

/// Joins lines and caps the length, marking cut text with `...`.
fn one_line(text: &str, limit: usize) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
