//! Rolling File Logger
//!
//! Installs a `tracing` subscriber (which also receives `log` records) that writes to
//! `{dir}/{app}.log`, rotating the file once it grows past a size limit, and keeps the
//! most recent lines in a circular buffer for in-app diagnostics.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Rotate once the active file reaches this size
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept next to the active one (`app.1.log` .. `app.N.log`)
pub const DEFAULT_MAX_FILES: usize = 3;
/// Lines kept in memory
pub const DEFAULT_RING_CAPACITY: usize = 500;

static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

struct LoggerHandle {
    ring: Arc<Mutex<LineRing>>,
    log_path: PathBuf,
}

/// Initialize the global logger with an explicit level.
///
/// Fails if a global subscriber is already installed.
pub fn init_logger_with_level(
    log_dir: PathBuf,
    app_name: &str,
    level: log::LevelFilter,
) -> Result<(), String> {
    if LOGGER.get().is_some() {
        return Err("Logger already initialized".to_string());
    }

    fs::create_dir_all(&log_dir)
        .map_err(|e| format!("Failed to create log dir {}: {}", log_dir.display(), e))?;

    let ring = Arc::new(Mutex::new(LineRing::new(DEFAULT_RING_CAPACITY)));
    let writer = RollingWriter::open(&log_dir, app_name, DEFAULT_MAX_BYTES, DEFAULT_MAX_FILES)
        .map_err(|e| format!("Failed to open log file: {}", e))?
        .with_ring(ring.clone());
    let log_path = writer.path().to_path_buf();

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(writer))
        .with_ansi(false)
        .with_timer(LocalTimer)
        .with_max_level(to_tracing_level(level))
        .try_init()
        .map_err(|e| format!("Failed to install subscriber: {}", e))?;

    LOGGER
        .set(LoggerHandle { ring, log_path })
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing::info!("Logger initialized for {}", app_name);
    Ok(())
}

/// Log an info line through the global logger
pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

/// Log an error line through the global logger
pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Most recent log lines, oldest first. Empty before initialization.
pub fn recent_lines() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|handle| handle.ring.lock().ok().map(|ring| ring.lines()))
        .unwrap_or_default()
}

/// Path of the active log file, if initialized
pub fn log_file_path() -> Option<PathBuf> {
    LOGGER.get().map(|handle| handle.log_path.clone())
}

fn ensure_initialized() -> Result<(), String> {
    if LOGGER.get().is_none() {
        return Err("Logger not initialized".to_string());
    }
    Ok(())
}

fn to_tracing_level(level: log::LevelFilter) -> tracing::level_filters::LevelFilter {
    use tracing::level_filters::LevelFilter;
    match level {
        log::LevelFilter::Off => LevelFilter::OFF,
        log::LevelFilter::Error => LevelFilter::ERROR,
        log::LevelFilter::Warn => LevelFilter::WARN,
        log::LevelFilter::Info => LevelFilter::INFO,
        log::LevelFilter::Debug => LevelFilter::DEBUG,
        log::LevelFilter::Trace => LevelFilter::TRACE,
    }
}

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Fixed-capacity buffer of complete log lines
#[derive(Debug)]
pub struct LineRing {
    lines: VecDeque<String>,
    capacity: usize,
    partial: String,
}

impl LineRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            partial: String::new(),
        }
    }

    /// Feed raw output; only newline-terminated lines are kept
    pub fn push_bytes(&mut self, buf: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            self.push_line(line.trim_end().to_string());
        }
    }

    fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// Size-rotated log file writer
pub struct RollingWriter {
    dir: PathBuf,
    app_name: String,
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
    ring: Option<Arc<Mutex<LineRing>>>,
}

impl RollingWriter {
    pub fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            path,
            file,
            written,
            max_bytes,
            max_files,
            ring: None,
        })
    }

    /// Mirror every written line into `ring`
    pub fn with_ring(mut self, ring: Arc<Mutex<LineRing>>) -> Self {
        self.ring = Some(ring);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.log", self.app_name, n))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for n in (1..self.max_files).rev() {
            let from = self.rotated_path(n);
            if from.exists() {
                fs::rename(&from, self.rotated_path(n + 1))?;
            }
        }
        fs::rename(&self.path, self.rotated_path(1))?;

        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        if let Some(ring) = &self.ring {
            if let Ok(mut ring) = ring.lock() {
                ring.push_bytes(&buf[..n]);
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_keeps_last_lines() {
        let mut ring = LineRing::new(2);
        ring.push_bytes(b"one\ntwo\nthr");
        ring.push_bytes(b"ee\n");
        assert_eq!(ring.lines(), vec!["two".to_string(), "three".to_string()]);
    }

    #[test]
    fn test_ring_ignores_partial_line() {
        let mut ring = LineRing::new(4);
        ring.push_bytes(b"no newline yet");
        assert!(ring.lines().is_empty());
    }

    #[test]
    fn test_writer_rotates_past_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "app", 10, 2).unwrap();

        writer.write_all(b"0123456789").unwrap();
        writer.write_all(b"abcdef").unwrap();
        writer.write_all(b"ghijklmnop").unwrap();
        writer.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.log")).unwrap(), "ghijklmnop");
        assert_eq!(fs::read_to_string(dir.path().join("app.1.log")).unwrap(), "abcdef");
        assert_eq!(fs::read_to_string(dir.path().join("app.2.log")).unwrap(), "0123456789");
    }

    #[test]
    fn test_writer_drops_oldest_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = RollingWriter::open(dir.path(), "app", 4, 1).unwrap();

        writer.write_all(b"aaaa").unwrap();
        writer.write_all(b"bbbb").unwrap();
        writer.write_all(b"cccc").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.1.log")).unwrap(), "bbbb");
        assert!(!dir.path().join("app.2.log").exists());
    }

    #[test]
    fn test_writer_feeds_ring() {
        let dir = tempfile::tempdir().unwrap();
        let ring = Arc::new(Mutex::new(LineRing::new(8)));
        let mut writer = RollingWriter::open(dir.path(), "app", 1024, 1)
            .unwrap()
            .with_ring(ring.clone());

        writer.write_all(b"hello\nworld\n").unwrap();
        assert_eq!(ring.lock().unwrap().lines(), vec!["hello", "world"]);
    }

    #[test]
    fn test_helpers_fail_before_init() {
        if LOGGER.get().is_none() {
            assert!(info("x").is_err());
            assert!(recent_lines().is_empty());
        }
    }
}
