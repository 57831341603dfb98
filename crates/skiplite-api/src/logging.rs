//! Logging configuration for SkipLite
//!
//! Store operations emit `tracing` events: `info` for successful searches,
//! inserts and deletes, `error` for misses and rejected duplicates. This
//! module installs a subscriber for them. Besides stdout and rolling files,
//! log lines can be routed through a bounded [`BlockingQueue`] to a
//! background writer thread so the emitting thread never touches the disk.

use skiplite_core::{Error, Result};
use skiplite_queue::{BlockingQueue, PushError};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default capacity of the queued writer, in log lines
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a file with daily rotation
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
    /// Output to a file through a bounded queue drained by a writer thread
    Queued {
        /// Log file path (appended to)
        path: PathBuf,
        /// Maximum number of buffered lines
        capacity: usize,
    },
}

/// Log format style
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

/// Keeps background log writers alive.
///
/// Dropping the guard flushes buffered lines and stops the writer thread.
pub enum LogGuard {
    /// Guard of a `tracing-appender` non-blocking writer
    Appender(WorkerGuard),
    /// Guard of a queued writer
    Queue(QueueGuard),
}

impl LogConfig {
    /// Create config with info level and stdout output
    pub fn info() -> Self {
        Self {
            level: "info".to_string(),
            ..Default::default()
        }
    }

    /// Create config with debug level
    pub fn debug() -> Self {
        Self {
            level: "debug".to_string(),
            ..Default::default()
        }
    }

    /// Create config with error level; only misses and rejections are shown
    pub fn error() -> Self {
        Self {
            level: "error".to_string(),
            ..Default::default()
        }
    }

    /// Set log output to file with rotation
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log output to a file fed through a bounded queue
    pub fn with_queue<P: Into<PathBuf>>(mut self, path: P, capacity: usize) -> Self {
        self.output = LogOutput::Queued {
            path: path.into(),
            capacity,
        };
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// Initialize global logging with this configuration
    ///
    /// Returns a guard that must be kept alive for file logging to work.
    /// Fails if the level filter is invalid, the log file cannot be opened,
    /// or a global subscriber is already installed.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use skiplite::logging::LogConfig;
    ///
    /// // Keep the guard alive for the lifetime of your application
    /// let _guard = LogConfig::info().init()?;
    /// # Ok::<(), skiplite::Error>(())
    /// ```
    pub fn init(self) -> Result<Option<LogGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .map_err(|e| Error::InvalidOperation(format!("Invalid log level: {}", e)))?;
        let installed = |e: tracing_subscriber::util::TryInitError| {
            Error::InvalidOperation(format!("Logging already initialized: {}", e))
        };

        match self.output {
            LogOutput::Stdout => {
                match self.format {
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().pretty())
                        .try_init()
                        .map_err(installed)?,
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().compact())
                        .try_init()
                        .map_err(installed)?,
                }
                Ok(None)
            }
            LogOutput::File(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(rolling_file(&path));

                match self.format {
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).pretty())
                        .try_init()
                        .map_err(installed)?,
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(non_blocking).compact())
                        .try_init()
                        .map_err(installed)?,
                }
                Ok(Some(LogGuard::Appender(guard)))
            }
            LogOutput::Both(path) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(rolling_file(&path));

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer())
                    .with(fmt::layer().with_writer(non_blocking))
                    .try_init()
                    .map_err(installed)?;

                Ok(Some(LogGuard::Appender(guard)))
            }
            LogOutput::Queued { path, capacity } => {
                let (writer, guard) = queued_writer(&path, capacity)?;

                // Files get no ANSI colors
                match self.format {
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(writer).with_ansi(false).pretty())
                        .try_init()
                        .map_err(installed)?,
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(writer).with_ansi(false).compact())
                        .try_init()
                        .map_err(installed)?,
                }
                Ok(Some(LogGuard::Queue(guard)))
            }
        }
    }
}

fn rolling_file(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::daily(
        path.parent().unwrap_or_else(|| Path::new(".")),
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("skiplite.log"),
    )
}

/// Starts a writer thread appending to `path` and returns the
/// [`MakeWriter`] that feeds it.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn queued_writer(path: &Path, capacity: usize) -> Result<(QueuedMakeWriter, QueueGuard)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let queue = Arc::new(BlockingQueue::new(capacity));
    let dropped = Arc::new(AtomicU64::new(0));

    let worker = {
        let queue = Arc::clone(&queue);
        thread::Builder::new()
            .name("skiplite-log".to_string())
            .spawn(move || drain_to_file(&queue, BufWriter::new(file)))?
    };

    let make_writer = QueuedMakeWriter {
        queue: Arc::clone(&queue),
        dropped: Arc::clone(&dropped),
    };
    let guard = QueueGuard {
        queue,
        dropped,
        worker: Some(worker),
    };
    Ok((make_writer, guard))
}

/// Writes queued lines until the queue closes, then hands the file back
fn drain_to_file(queue: &BlockingQueue<Vec<u8>>, mut file: BufWriter<File>) -> BufWriter<File> {
    while let Some(line) = queue.pop() {
        // Nowhere to report a failed log write; drop the line
        let _ = file.write_all(&line);
        if queue.is_empty() {
            let _ = file.flush();
        }
    }
    file
}

/// [`MakeWriter`] that pushes each formatted event onto the log queue.
///
/// Pushes never block: when the queue is full the line is dropped and
/// counted instead.
#[derive(Clone)]
pub struct QueuedMakeWriter {
    queue: Arc<BlockingQueue<Vec<u8>>>,
    dropped: Arc<AtomicU64>,
}

impl<'a> MakeWriter<'a> for QueuedMakeWriter {
    type Writer = QueuedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        QueuedWriter {
            queue: Arc::clone(&self.queue),
            dropped: Arc::clone(&self.dropped),
            buf: Vec::new(),
        }
    }
}

/// Buffers one event and enqueues it when dropped
pub struct QueuedWriter {
    queue: Arc<BlockingQueue<Vec<u8>>>,
    dropped: Arc<AtomicU64>,
    buf: Vec<u8>,
}

impl Write for QueuedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let line = std::mem::take(&mut self.buf);
        match self.queue.try_push_back(line) {
            Ok(()) => {}
            Err(PushError::Full(_)) | Err(PushError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

impl Drop for QueuedWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Owns the queued writer's background thread
pub struct QueueGuard {
    queue: Arc<BlockingQueue<Vec<u8>>>,
    dropped: Arc<AtomicU64>,
    worker: Option<JoinHandle<BufWriter<File>>>,
}

impl QueueGuard {
    /// Lines discarded because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for QueueGuard {
    fn drop(&mut self) {
        let rest = self.queue.close();
        if let Some(worker) = self.worker.take() {
            if let Ok(mut file) = worker.join() {
                for line in rest {
                    let _ = file.write_all(&line);
                }
                let _ = file.flush();
            }
        }
    }
}
