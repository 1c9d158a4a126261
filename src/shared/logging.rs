use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSink {
    path: Option<PathBuf>,
    echo_stderr: bool,
}

impl LogSink {
    pub fn to_file(path: impl Into<PathBuf>, echo_stderr: bool) -> Self {
        Self {
            path: Some(path.into()),
            echo_stderr,
        }
    }

    pub fn for_state_root(state_root: &Path, echo_stderr: bool) -> Self {
        Self::to_file(assistant_log_path(state_root), echo_stderr)
    }

    pub fn stderr_only(echo_stderr: bool) -> Self {
        Self {
            path: None,
            echo_stderr,
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            echo_stderr: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append(LogLevel::Error, event, message);
    }

    pub fn debug(&self, event: &str, message: &str) {
        self.append(LogLevel::Debug, event, message);
    }

    pub fn append(&self, level: LogLevel, event: &str, message: &str) {
        let payload = serde_json::json!({
            "timestamp": chrono::Utc::now().timestamp(),
            "level": level.as_str(),
            "event": event,
            "message": message,
        });

        let Ok(line) = serde_json::to_string(&payload) else {
            return;
        };

        if self.echo_stderr {
            eprintln!("{line}");
        }

        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
            return;
        };
        let _ = writeln!(file, "{line}");
    }
}

pub fn assistant_log_path(state_root: &Path) -> PathBuf {
    state_root.join("logs/assistant.log")
}
