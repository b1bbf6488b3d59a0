//! Log setup: env_logger records duplicated to stderr and an append-mode
//! log file.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Stderr, Write};

/// Writer that duplicates every record to stderr and the log file.
struct TeeWriter {
    console: Stderr,
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

/// Initialize the global logger. RUST_LOG overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("Failed to open log file: {}", config.file.display()))?;

    let tee = TeeWriter {
        console: io::stderr(),
        file,
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.level.as_str()),
    )
    .target(env_logger::Target::Pipe(Box::new(tee)))
    .try_init()
    .context("Logger already initialized")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_init_appends_to_log_file() {
        let tmp = TempDir::new().unwrap();
        let log_path = tmp.path().join("run.log");
        std::fs::write(&log_path, "previous run\n").unwrap();

        let config = LoggingConfig {
            level: "info".to_string(),
            file: PathBuf::from(&log_path),
        };
        init(&config).unwrap();
        log::info!("tee writer check");
        log::logger().flush();

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.starts_with("previous run"), "append mode must keep prior content");
        assert!(contents.contains("tee writer check"));
    }
}
