//! Thin wrappers over the operating system: terminal size, per-user
//! directories and process memory.

use std::path::{Path, PathBuf};

/// Width used when nothing else is known.
pub const DEFAULT_WIDTH: usize = 80;

/// Current terminal width in columns.
///
/// `COLUMNS` wins when set to a positive number, then the size reported by
/// the terminal, then [`DEFAULT_WIDTH`].
pub fn terminal_width() -> usize {
    if let Some(columns) = std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse::<usize>().ok())
        .filter(|c| *c > 0)
    {
        return columns;
    }

    match crossterm::terminal::size() {
        Ok((columns, _)) if columns > 0 => usize::from(columns),
        _ => DEFAULT_WIDTH,
    }
}

/// Per-user directories of one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    user_data_dir: PathBuf,
    user_config_dir: PathBuf,
    user_log_dir: PathBuf,
}

impl AppDirs {
    /// Resolves the directories for `app`. Nothing is created on disk.
    pub fn new(app: &str) -> Self {
        let fallback = || std::env::temp_dir().join(app);
        Self {
            user_data_dir: dirs::data_dir()
                .map(|d| d.join(app))
                .unwrap_or_else(fallback),
            user_config_dir: dirs::config_dir()
                .map(|d| d.join(app))
                .unwrap_or_else(fallback),
            user_log_dir: dirs::state_dir()
                .or_else(dirs::cache_dir)
                .map(|d| d.join(app).join("log"))
                .unwrap_or_else(|| fallback().join("log")),
        }
    }

    pub fn user_data_dir(&self) -> &Path {
        &self.user_data_dir
    }

    pub fn user_config_dir(&self) -> &Path {
        &self.user_config_dir
    }

    pub fn user_log_dir(&self) -> &Path {
        &self.user_log_dir
    }
}

/// Resident memory of the current process in bytes, if it can be read.
pub fn memory_used() -> Option<u64> {
    use sysinfo::{ProcessesToUpdate, System};

    let pid = sysinfo::get_current_pid().ok()?;
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid).map(|p| p.memory())
}

/// Formats a byte count with a binary unit, e.g. `1.5 MiB`.
pub fn natural_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["bytes", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{bytes} bytes");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
