//! Rendering and writing combined documents.

use crate::document::node::Value;
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialization used for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact single-line JSON
    #[default]
    Json,
    /// Indented JSON
    Pretty,
    /// YAML
    Yaml,
}

/// Serializes `value` in the requested output format.
///
/// The result always ends with a newline.
///
/// # Examples
///
/// ```
/// use unifio::document::node::Value;
/// use unifio::file::saver::{render, OutputFormat};
///
/// let value: Value = serde_json::from_str(r#"{"a":[1,2]}"#).unwrap();
/// assert_eq!(render(&value, OutputFormat::Json).unwrap(), "{\"a\":[1,2]}\n");
/// ```
pub fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Json => serde_json::to_string(value).context("Failed to serialize JSON")?,
        OutputFormat::Pretty => {
            serde_json::to_string_pretty(value).context("Failed to serialize JSON")?
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to serialize YAML")?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Writes `contents` to `path` atomically, gzip-compressing when the path ends in `.gz`.
///
/// The data goes to `<file name>.tmp` next to the target and is renamed into
/// place, so the target is either the old file or the complete new one. The
/// temporary file is removed if any step fails.
pub fn save_to_file<P: AsRef<Path>>(path: P, contents: &str) -> Result<()> {
    let path = path.as_ref();
    let data = if path.to_string_lossy().ends_with(".gz") {
        gzip(contents.as_bytes())?
    } else {
        contents.as_bytes().to_vec()
    };

    let temp_path = temp_path_for(path);
    let written = fs::write(&temp_path, &data)
        .with_context(|| format!("Failed to write {}", temp_path.display()))
        .and_then(|()| {
            fs::rename(&temp_path, path)
                .with_context(|| format!("Failed to move {} into place", temp_path.display()))
        });
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

/// Sibling path with `.tmp` appended to the full file name (`out.json` → `out.json.tmp`).
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).context("Failed to compress output")?;
    encoder.finish().context("Failed to compress output")
}
