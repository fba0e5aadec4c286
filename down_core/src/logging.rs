//! # Logging Bootstrap
//!
//! Rolling file logs under the application config directory, initialized
//! exactly once per process. The library itself only uses the `log` facade;
//! front ends call [`init_logging`] at startup.
//!
//! Initialization is idempotent for the same level and directory; a second
//! call with a different configuration is rejected.
//!
//! ## Example
//!
//! ```rust,no_run
//! use down_core::logging::{default_log_dir, default_log_level, init_logging};
//!
//! let dir = default_log_dir()?;
//! init_logging(default_log_level(), &dir)?;
//! log::info!("started");
//! # Ok::<(), down_core::errors::AllocError>(())
//! ```

use std::path::{Path, PathBuf};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use once_cell::sync::OnceCell;

use crate::errors::{AllocError, AllocResult};
use crate::settings::ORGANIZATION;

const LOG_FILE_BASENAME: &str = "downalloc";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Initialize file logging with the given level and directory.
///
/// # Errors
///
/// * `InvalidInput` - unsupported level string
/// * `FileError` - the log directory cannot be created
/// * `Internal` - already initialized with a different configuration, or the
///   logger backend failed to start
pub fn init_logging(level: &str, log_dir: &Path) -> AllocResult<()> {
    let level = normalize_level(level)?;
    let log_dir = log_dir.to_path_buf();

    let state = LOGGING_STATE.get_or_try_init(|| -> AllocResult<LoggingState> {
        std::fs::create_dir_all(&log_dir).map_err(|e| {
            AllocError::file_error(
                "create log directory",
                log_dir.display().to_string(),
                e.to_string(),
            )
        })?;

        let logger = Logger::try_with_str(level)
            .map_err(|e| AllocError::Internal {
                message: format!("invalid log level '{}': {}", level, e),
            })?
            .log_to_file(
                FileSpec::default()
                    .directory(log_dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                Naming::Numbers,
                Cleanup::KeepLogFiles(MAX_LOG_FILES),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|e| AllocError::Internal {
                message: format!("failed to start logger: {}", e),
            })?;

        log::info!(
            "Logging initialized: level={}, dir={}, version={}",
            level,
            log_dir.display(),
            env!("CARGO_PKG_VERSION")
        );

        Ok(LoggingState {
            level,
            log_dir: log_dir.clone(),
            _logger: logger,
        })
    })?;

    if state.log_dir != log_dir {
        return Err(AllocError::Internal {
            message: format!(
                "logging already initialized at '{}'; refusing to switch to '{}'",
                state.log_dir.display(),
                log_dir.display()
            ),
        });
    }
    if state.level != level {
        return Err(AllocError::Internal {
            message: format!(
                "logging already initialized with level '{}'; refusing to switch to '{}'",
                state.level, level
            ),
        });
    }

    Ok(())
}

/// Default log level for the current build mode.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Default log directory: `<config_dir>/DownAllocation/logs`.
pub fn default_log_dir() -> AllocResult<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        AllocError::file_error(
            "locate config directory",
            ORGANIZATION,
            "No platform config directory available",
        )
    })?;
    Ok(config_dir.join(ORGANIZATION).join("logs"))
}

fn normalize_level(level: &str) -> AllocResult<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(AllocError::invalid_input(
            "log_level",
            other,
            "Expected trace|debug|info|warn|error",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_level() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert_eq!(
            normalize_level("verbose").unwrap_err().error_code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_default_log_level_matches_build_mode() {
        if cfg!(debug_assertions) {
            assert_eq!(default_log_level(), "debug");
        } else {
            assert_eq!(default_log_level(), "info");
        }
    }

    // Logger state is process-global, so idempotency and conflicts share one test
    #[test]
    fn test_init_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();

        init_logging("info", dir.path()).unwrap();
        // Any spelling of the recorded level is a no-op
        init_logging(" INFO ", dir.path()).unwrap();

        let err = init_logging("debug", dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(err.to_string().contains("refusing to switch"));

        let err = init_logging("info", other_dir.path()).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert!(err.to_string().contains("refusing to switch"));
    }
}
