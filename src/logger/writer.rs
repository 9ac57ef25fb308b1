//! Log writer module
//!
//! Provides thread-safe access log writing to a file or stdout, and the
//! file opening shared with the diagnostic log.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Global access log writer instance
static ACCESS_LOG: OnceLock<LogTarget> = OnceLock::new();

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to file
    File(Mutex<File>),
}

impl LogTarget {
    fn new(path: Option<&str>) -> io::Result<Self> {
        Ok(match path {
            Some(p) => Self::File(Mutex::new(open_log_file(p)?)),
            None => Self::Stdout,
        })
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{message}");
            }
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// Open or create a log file for appending
pub fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global access log writer
///
/// Returns error if the log file cannot be opened or the writer was
/// already initialized.
pub fn init(access_log_file: Option<&str>) -> io::Result<()> {
    let target = LogTarget::new(access_log_file)?;
    ACCESS_LOG.set(target).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Access log writer already initialized",
        )
    })
}

/// Write one access log line; a no-op before `init()`
pub fn write_access(message: &str) {
    if let Some(target) = ACCESS_LOG.get() {
        target.write_line(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_log_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/access.log");
        let path = path.to_str().unwrap();

        let mut file = open_log_file(path).unwrap();
        writeln!(file, "first").unwrap();
        drop(file);

        let mut file = open_log_file(path).unwrap();
        writeln!(file, "second").unwrap();
        drop(file);

        assert_eq!(fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");

        let target = LogTarget::new(path.to_str()).unwrap();
        target.write_line("GET / 404");
        target.write_line("GET / 503");

        assert_eq!(fs::read_to_string(&path).unwrap(), "GET / 404\nGET / 503\n");
    }
}
