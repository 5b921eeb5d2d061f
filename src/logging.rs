//! Logging configuration for Mundane applications.
//!
//! Log records go to a per-invocation file whose name should be unique
//! across a cluster:
//!
//! ```text
//! prog.log -> prog.log.$HOST.$USER.$YYYYmmdd-HHMMSS.$PID
//! ```
//!
//! The file is opened on the first write, so the output directory may still
//! be changed (for example by `--log-dir`) after the manager is created. A
//! convenience symlink `prog.log` points at the newest file when the
//! directory allows it.
//!
//! The level threshold lives behind a `reload` layer and can be changed at
//! any time through [`LogManager::set_level`], which is what `-L/--log-level`
//! does while the command line is parsed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{reload, Registry};

use crate::app::App;
use crate::commands::{Flag, FlagAction};
use crate::error::{MundaneError, Result};
use crate::module::Module;

/// Level names accepted by `--log-level`, most verbose first.
pub const LEVEL_NAMES: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Threshold used until something changes it.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Parses a level name, ignoring case. `WARNING` and `CRITICAL` are
/// accepted as aliases of `WARN` and `ERROR`.
pub fn parse_level(name: &str) -> Result<LevelFilter> {
    match name.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(LevelFilter::TRACE),
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "CRITICAL" => Ok(LevelFilter::ERROR),
        "OFF" => Ok(LevelFilter::OFF),
        _ => Err(MundaneError::logging(format!(
            "Unknown log level '{name}' (expected one of {})",
            LEVEL_NAMES.join(", ")
        ))),
    }
}

/// Upper-case name of a level threshold.
pub fn level_name(level: LevelFilter) -> &'static str {
    if level == LevelFilter::TRACE {
        "TRACE"
    } else if level == LevelFilter::DEBUG {
        "DEBUG"
    } else if level == LevelFilter::INFO {
        "INFO"
    } else if level == LevelFilter::WARN {
        "WARN"
    } else if level == LevelFilter::ERROR {
        "ERROR"
    } else {
        "OFF"
    }
}

#[derive(Debug)]
struct HandlerState {
    short_filename: String,
    long_filename: String,
    output_dir: PathBuf,
    file: Option<File>,
}

impl HandlerState {
    fn path(&self) -> PathBuf {
        absolute(&self.output_dir.join(&self.long_filename))
    }

    fn symlink_path(&self) -> PathBuf {
        absolute(&self.output_dir.join(&self.short_filename))
    }

    fn open(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() {
            let path = self.path();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            link_latest(&self.symlink_path(), &path);
            self.file = Some(file);
        }
        match self.file.as_mut() {
            Some(file) => Ok(file),
            None => Err(io::Error::other("log file unavailable")),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

// Best effort; a shared directory with the sticky bit set may forbid it.
#[cfg(unix)]
fn link_latest(link: &Path, target: &Path) {
    let _ = fs::remove_file(link);
    let _ = std::os::unix::fs::symlink(target, link);
}

#[cfg(not(unix))]
fn link_latest(_link: &Path, _target: &Path) {}

fn host_name() -> String {
    hostname::get()
        .ok()
        .map(|h| h.to_string_lossy().into_owned())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Writer that opens its log file on first use.
///
/// Clones share one file.
#[derive(Debug, Clone)]
pub struct LogHandler {
    state: Arc<Mutex<HandlerState>>,
}

impl LogHandler {
    pub fn new(prog: &str, output_dir: impl Into<PathBuf>) -> Self {
        let now = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let short_filename = format!("{prog}.log");
        let long_filename = format!(
            "{short_filename}.{}.{}.{now}.{}",
            host_name(),
            user_name(),
            std::process::id()
        );
        Self {
            state: Arc::new(Mutex::new(HandlerState {
                short_filename,
                long_filename,
                output_dir: output_dir.into(),
                file: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HandlerState> {
        // A panic while holding the lock cannot leave the state half written.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.lock().output_dir.clone()
    }

    /// Changes where the file will be created. Returns `false`, leaving
    /// everything as is, once the file has been opened.
    pub fn set_output_dir(&self, dir: impl Into<PathBuf>) -> bool {
        let mut state = self.lock();
        if state.file.is_some() {
            return false;
        }
        state.output_dir = dir.into();
        true
    }

    /// Full path of the log file, whether or not it exists yet.
    pub fn path(&self) -> PathBuf {
        self.lock().path()
    }

    /// Path of the `prog.log` convenience symlink.
    pub fn symlink_path(&self) -> PathBuf {
        self.lock().symlink_path()
    }

    pub fn is_open(&self) -> bool {
        self.lock().file.is_some()
    }
}

impl Write for LogHandler {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().open()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogHandler {
    type Writer = LogHandler;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Handle on the logging configuration of one application.
///
/// Cheap to clone; clones control the same subscriber.
#[derive(Debug, Clone)]
pub struct LogManager {
    handler: LogHandler,
    level: reload::Handle<LevelFilter, Registry>,
}

impl LogManager {
    /// Builds a manager and the subscriber it controls. The subscriber is not
    /// installed; use it with `tracing::subscriber::with_default` or call
    /// [`LogManager::activate`] instead.
    pub fn new(
        prog: &str,
        output_dir: impl Into<PathBuf>,
    ) -> (Self, impl tracing::Subscriber + Send + Sync + 'static) {
        let handler = LogHandler::new(prog, output_dir);
        let (filter, level) = reload::Layer::new(DEFAULT_LEVEL);

        let subscriber = tracing_subscriber::registry().with(filter).with(
            tracing_subscriber::fmt::layer()
                .with_writer(handler.clone())
                .with_ansi(false) // No ANSI colors in file output
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        );

        (Self { handler, level }, subscriber)
    }

    /// Builds a manager and installs its subscriber as the global default.
    pub fn activate(prog: &str, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let (manager, subscriber) = Self::new(prog, output_dir);
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| MundaneError::logging(format!("Could not install logger: {e}")))?;
        Ok(manager)
    }

    /// Sets the threshold by name, effective immediately.
    pub fn set_level(&self, name: &str) -> Result<()> {
        let level = parse_level(name)?;
        self.level
            .reload(level)
            .map_err(|e| MundaneError::logging(format!("Could not set log level: {e}")))
    }

    /// The current threshold, or `None` once the subscriber holding the
    /// level layer has been dropped.
    pub fn level(&self) -> Option<LevelFilter> {
        self.level.clone_current()
    }

    /// Redirects the log file. Only effective before the first record is
    /// written.
    pub fn set_log_dir(&self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        let applied = self.handler.set_output_dir(&dir);
        if !applied {
            tracing::warn!(
                "log file already open at {}; ignoring new directory {}",
                self.handler.path().display(),
                dir.display()
            );
        }
        applied
    }

    pub fn log_dir(&self) -> PathBuf {
        self.handler.output_dir()
    }

    pub fn handler(&self) -> &LogHandler {
        &self.handler
    }
}

impl Module for LogManager {
    fn global_flags(&self, app: &mut App) -> Result<()> {
        app.global_flags()
            .add(
                Flag::action("log_level", LogLevel::new(self.clone()))
                    .short('L')
                    .value_name("LEVEL")
                    .help("Minimal log level"),
            )
            .add(
                Flag::action("log_dir", LogDir::new(self.clone()))
                    .value_name("DIR")
                    .help("Logging directory"),
            );
        Ok(())
    }
}

/// `--log-level` callback: changes the threshold as soon as it is parsed.
#[derive(Debug, Clone)]
pub struct LogLevel {
    manager: LogManager,
}

impl LogLevel {
    pub fn new(manager: LogManager) -> Self {
        Self { manager }
    }
}

impl FlagAction for LogLevel {
    fn apply(&self, value: &str) -> Result<()> {
        self.manager.set_level(value)
    }

    fn choices(&self) -> Vec<String> {
        LEVEL_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn current(&self) -> Option<String> {
        self.manager.level().map(|level| level_name(level).to_string())
    }
}

/// `--log-dir` callback: redirects the pending log file.
#[derive(Debug, Clone)]
pub struct LogDir {
    manager: LogManager,
}

impl LogDir {
    pub fn new(manager: LogManager) -> Self {
        Self { manager }
    }
}

impl FlagAction for LogDir {
    fn apply(&self, value: &str) -> Result<()> {
        self.manager.set_log_dir(value);
        Ok(())
    }

    fn current(&self) -> Option<String> {
        Some(self.manager.log_dir().display().to_string())
    }
}
