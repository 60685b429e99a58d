use colored::Colorize;
use indicatif::ProgressBar;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the per-session log file
pub const LOG_FILE_NAME: &str = "modplan.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static QUIET: Mutex<bool> = Mutex::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Current verbosity: 0 = default, 1 = -v, 2+ = -vv
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map_or(0, |v| *v)
}

/// Whether non-error console output is suppressed
pub fn get_quiet() -> bool {
    QUIET.lock().ok().is_some_and(|v| *v)
}

pub fn set_quiet(quiet: bool) {
    if let Ok(mut v) = QUIET.lock() {
        *v = quiet;
    }
}

/// `tracing` filter directive matching a verbosity level
///
/// 0 = warn, 1 = debug (-v), 2 = trace (-vv). Quiet wins over verbosity.
pub fn filter_directive(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Set verbosity and start a fresh session log
///
/// The log goes to `log_dir` when given, otherwise to the default config
/// directory. The file is truncated on each run.
pub fn init_with_verbosity(verbosity: u8, quiet: bool, log_dir: Option<&Path>) -> Result<(), String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
    set_quiet(quiet);

    let dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_config_dir()?,
    };
    init(&dir)
}

fn init(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let log_file = dir.join(LOG_FILE_NAME);
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file lock poisoned".to_string())?;
    *guard = Some(log_file);
    Ok(())
}

fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("modplan");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("modplan");

    Ok(config_dir)
}

fn write_to_log(level: &str, message: &str) {
    if let Ok(guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
                let _ = writeln!(file, "[{}] {} {}", timestamp, level, message);
            }
        }
    }
}

/// Informational message; console only with -v
pub fn info(message: &str) {
    write_to_log("INFO", message);
    if get_verbosity() >= 1 && !get_quiet() {
        eprintln!("{}", message);
    }
}

pub fn debug(message: &str) {
    write_to_log("DEBUG", message);
    if get_verbosity() >= 1 && !get_quiet() {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

pub fn warn(message: &str) {
    write_to_log("WARN", message);
    if !get_quiet() {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

/// Errors reach the console even in quiet mode
pub fn error(message: &str) {
    write_to_log("ERROR", message);
    eprintln!("{} {}", "error:".red().bold(), message);
}

pub fn success(message: &str) {
    write_to_log("SUCCESS", message);
    if !get_quiet() {
        eprintln!("{} {}", "\u{2714}".green().bold(), message);
    }
}

/// Pipeline milestone; console only with -vv
pub fn step(message: &str) {
    write_to_log("STEP", message);
    if get_verbosity() >= 2 && !get_quiet() {
        eprintln!("{} {}", "TRACE:".dimmed(), message);
    }
}

pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(dir) = get_config_dir() {
        eprintln!("Log file: {}", dir.join(LOG_FILE_NAME).display());
    } else {
        eprintln!("Log file location not available");
    }
}

/// Start a spinner; skipped when verbose or quiet so it never interleaves with log lines
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 || get_quiet() {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut guard) = SPINNER.lock() {
        *guard = Some(spinner);
    }
}

pub fn spinner_success(message: &str) {
    spinner_stop();
    success(message);
}

pub fn spinner_error(message: &str) {
    spinner_stop();
    write_to_log("ERROR", message);
    eprintln!("  {} {}", "\u{2717}".red().bold(), message);
}

pub fn spinner_stop() {
    if let Ok(mut guard) = SPINNER.lock() {
        if let Some(spinner) = guard.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_levels() {
        assert_eq!(filter_directive(0, false), "warn");
        assert_eq!(filter_directive(1, false), "debug");
        assert_eq!(filter_directive(5, false), "trace");
        assert_eq!(filter_directive(2, true), "error");
    }

    #[test]
    fn test_session_log_truncated_and_written() {
        let Ok(dir) = tempfile::TempDir::new() else {
            return;
        };
        let log_path = dir.path().join(LOG_FILE_NAME);
        let _ = fs::write(&log_path, "stale contents\n");

        assert!(init(dir.path()).is_ok());
        assert!(!log_path.exists());

        error("graph has a cycle");
        let contents = fs::read_to_string(&log_path).unwrap_or_default();
        assert!(contents.contains("ERROR graph has a cycle"));
        assert!(!contents.contains("stale"));
    }
}
