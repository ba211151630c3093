use crate::error::LlamasumError;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_FILE_NAME: &str = "llamasum.log";

/// Initialize logging system
///
/// Always logs to stderr so stdout stays reserved for the generated result.
/// When `log_dir` is set, a plain-text copy is appended to `llamasum.log`
/// inside it. `RUST_LOG` takes precedence over `log_level`.
pub fn init_logging(log_dir: Option<&Path>, log_level: &str) -> Result<(), LlamasumError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());

    let log_file = log_dir.map(open_log_file).transpose()?;
    let log_path = log_file.as_ref().map(|(_, path)| path.clone());

    let file_layer = log_file.map(|(file, _)| {
        fmt::layer()
            .with_writer(file)
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_span_events(FmtSpan::FULL)
            .with_filter(env_filter)
    });

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LlamasumError::config(format!("Failed to install logger: {}", e)))?;

    match log_path {
        Some(path) => tracing::info!("Logging initialized: level={}, log_file={}", log_level, path.display()),
        None => tracing::debug!("Console logging initialized: level={}", log_level),
    }

    Ok(())
}

/// Create the log directory if needed and open the log file for appending
fn open_log_file(log_dir: &Path) -> Result<(File, PathBuf), LlamasumError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        LlamasumError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            LlamasumError::config(format!("Failed to open log file {}: {}", path.display(), e))
        })?;

    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("llamasum-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_open_log_file_creates_nested_dir_and_appends() {
        let root = scratch_dir("logs");
        let dir = root.join("nested").join("deeper");

        let (mut file, path) = open_log_file(&dir).unwrap();
        assert_eq!(path, dir.join("llamasum.log"));
        writeln!(file, "first").unwrap();

        let (mut file, _) = open_log_file(&dir).unwrap();
        writeln!(file, "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_open_log_file_rejects_file_as_dir() {
        let root = scratch_dir("blocked");
        std::fs::create_dir_all(&root).unwrap();
        let blocker = root.join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = open_log_file(&blocker).unwrap_err();
        assert!(matches!(err, LlamasumError::Config(_)));

        std::fs::remove_dir_all(&root).unwrap();
    }
}
