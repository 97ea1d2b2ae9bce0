//! File logging
//!
//! The terminal belongs to the TUI, so tracing output goes to
//! `<data_dir>/certdeck.log`. `CERTDECK_LOG` takes precedence over
//! `RUST_LOG`; both accept the usual `EnvFilter` directives.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "certdeck=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("CERTDECK_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn open_log(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber; returns false when logging stays disabled
pub fn init(path: Option<&Path>) -> bool {
    let Some(path) = path else {
        return false;
    };
    let file = match open_log(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_creates_parent() {
        let dir = std::env::temp_dir().join(format!("certdeck-log-{}", std::process::id()));
        let path = dir.join("nested").join("certdeck.log");
        assert!(open_log(&path).is_ok());
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_init_without_path_is_disabled() {
        assert!(!init(None));
    }
}
