//! Loading inputs, templates and requests from disk or stdin.
//!
//! Files ending in `.gz` are decompressed transparently; the format of an
//! input is taken from the extension in front of `.gz` unless given
//! explicitly.

use crate::combine::{CombineRequest, Input};
use crate::converters::Format;
use crate::document::node::Value;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Splits an optional `FORMAT:` prefix off a command-line input argument.
///
/// `xml:feed.txt` yields `(Some(Format::Xml), "feed.txt")`; an argument whose
/// prefix is not a known format is returned whole.
///
/// # Examples
///
/// ```
/// use unifio::converters::Format;
/// use unifio::file::loader::split_format_prefix;
///
/// assert_eq!(split_format_prefix("yaml:-"), (Some(Format::Yaml), "-"));
/// assert_eq!(split_format_prefix("data.csv"), (None, "data.csv"));
/// ```
pub fn split_format_prefix(arg: &str) -> (Option<Format>, &str) {
    if let Some((prefix, rest)) = arg.split_once(':') {
        if let Ok(format) = prefix.parse::<Format>() {
            return (Some(format), rest);
        }
    }
    (None, arg)
}

/// Infers the input format from a file name, ignoring a trailing `.gz`.
///
/// - `data.json` → JSON
/// - `feed.xml.gz` → XML
/// - `notes.txt` → none
pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<Format> {
    let path_str = path.as_ref().to_string_lossy();
    let base = path_str.strip_suffix(".gz").unwrap_or(&path_str);
    let ext = Path::new(base).extension()?.to_str()?;
    Format::from_extension(ext)
}

/// Reads one input file, decompressing it if needed.
///
/// # Errors
///
/// This function will return an error if:
/// - The file cannot be read or decompressed
/// - No format was given and none can be inferred from the file name
pub fn load_input<P: AsRef<Path>>(path: P, format: Option<Format>) -> Result<Input> {
    let path = path.as_ref();
    let format = match format.or_else(|| detect_format(path)) {
        Some(format) => format,
        None => anyhow::bail!(
            "Cannot determine the format of {}; prefix it with json:, xml:, yaml: or csv:",
            path.display()
        ),
    };
    let data = read_text_file(path)?;
    tracing::debug!(path = %path.display(), format = %format, bytes = data.len(), "loaded input");
    Ok(Input::new(format, data))
}

/// Reads a projection template from a JSON or YAML file.
///
/// Files ending in `.yaml` or `.yml` are read as YAML, everything else as JSON.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    let content = read_text_file(path)?;
    if matches!(detect_format(path), Some(Format::Yaml)) {
        serde_yaml::from_str(&content).context("Failed to parse YAML template")
    } else {
        serde_json::from_str(&content).context("Failed to parse JSON template")
    }
}

/// Reads a complete combine request (`{"inputs": [...], "output_format": {...}}`).
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<CombineRequest> {
    let content = read_text_file(path.as_ref())?;
    serde_json::from_str(&content).context("Failed to parse combine request")
}

/// Reads standard input to a string, decompressing gzip data.
pub fn read_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    bytes_to_text(buffer)
}

fn read_text_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    bytes_to_text(bytes).with_context(|| format!("Failed to decode {}", path.display()))
}

/// Converts raw bytes to text, gunzipping when the gzip magic bytes are present.
fn bytes_to_text(bytes: Vec<u8>) -> Result<String> {
    if bytes.starts_with(&[0x1f, 0x8b]) {
        decompress_gzip_bytes(&bytes)
    } else {
        String::from_utf8(bytes).context("Input is not valid UTF-8")
    }
}

/// Decompresses gzip-encoded bytes to a UTF-8 string.
///
/// # Errors
///
/// Returns an error if:
/// - The bytes are not valid gzip format
/// - The decompressed content is not valid UTF-8
fn decompress_gzip_bytes(bytes: &[u8]) -> Result<String> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(bytes);
    let mut content = String::new();
    decoder
        .read_to_string(&mut content)
        .context("Failed to decompress gzip data - input may be corrupted")?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("a.json"), Some(Format::Json));
        assert_eq!(detect_format("dir/a.YML"), Some(Format::Yaml));
        assert_eq!(detect_format("a.xml.gz"), Some(Format::Xml));
        assert_eq!(detect_format("a.gz"), None);
        assert_eq!(detect_format("README"), None);
    }

    #[test]
    fn test_split_format_prefix_keeps_unknown_prefixes() {
        assert_eq!(split_format_prefix("CSV:rows.txt"), (Some(Format::Csv), "rows.txt"));
        assert_eq!(split_format_prefix("C:data.json"), (None, "C:data.json"));
    }

    #[test]
    fn test_load_gzipped_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.yaml.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"a: 1\n").unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let input = load_input(&path, None).unwrap();
        assert_eq!(input.format, Format::Yaml);
        assert_eq!(input.data, "a: 1\n");
    }

    #[test]
    fn test_corrupted_gzip_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json.gz");
        fs::write(&path, [0x1f_u8, 0x8b, 0x00, 0x01, 0x02]).unwrap();
        assert!(load_input(&path, None).is_err());
    }

    #[test]
    fn test_unknown_extension_requires_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.txt");
        fs::write(&path, "<a/>").unwrap();

        assert!(load_input(&path, None).is_err());
        assert_eq!(load_input(&path, Some(Format::Xml)).unwrap().format, Format::Xml);
    }

    #[test]
    fn test_load_yaml_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shape.yml");
        fs::write(&path, "name: $.user.name\nlimits:\n  first: $.items[0]\n").unwrap();

        let template = load_template(&path).unwrap();
        assert_eq!(
            template,
            serde_json::from_str::<Value>(r#"{"name":"$.user.name","limits":{"first":"$.items[0]"}}"#).unwrap()
        );
    }
}
