//! Export Module
//!
//! Writes the currently visible certificates to disk.
//!
//! - 'e' / `:export csv` → CSV
//! - 'E' / `:export json` → JSON
//! - Files saved to <data dir>/exports/

mod csv_export;
mod json_export;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config;
use crate::core::{Action, ExportFormat};
use crate::domain::{Certificate, FilterEngine};

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S%3f");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// Pick a path in `dir` that no earlier export has taken
fn unused_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let filename = generate_filename(prefix, extension);
    let path = dir.join(&filename);
    if !path.exists() {
        return path;
    }
    let stem = filename.trim_end_matches(&format!(".{}", extension)).to_string();
    (1u32..)
        .map(|n| dir.join(format!("{}-{}.{}", stem, n, extension)))
        .find(|candidate| !candidate.exists())
        .unwrap_or(path)
}

/// Export the engine's visible certificates to the default export directory
pub fn export_visible(engine: &FilterEngine, format: ExportFormat) -> Action {
    let visible: Vec<&Certificate> = engine.visible().collect();
    export_to(&config::exports_dir(), &visible, format)
}

/// Export certificates into `dir`, creating it if needed
pub fn export_to(dir: &Path, certificates: &[&Certificate], format: ExportFormat) -> Action {
    if certificates.is_empty() {
        return Action::warn("No certificates to export");
    }

    if let Err(e) = fs::create_dir_all(dir) {
        return Action::error(format!("Failed to create export directory: {}", e));
    }

    let extension = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    let path = unused_path(dir, "certificates", extension);

    let result = match format {
        ExportFormat::Csv => csv_export::write_certificates(&path, certificates),
        ExportFormat::Json => json_export::write_certificates(&path, certificates),
    };

    match result {
        Ok(count) => {
            tracing::info!(count, path = %path.display(), "exported certificates");
            Action::info(format!(
                "Exported {} certificates to {}",
                count,
                path.display()
            ))
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "export failed");
            Action::error(format!("Export failed: {}", e))
        }
    }
}
