//! Serializing the value tree to disk.
//!
//! Files are written to a sibling temp file first and renamed into place, so
//! a failed write never leaves a truncated config behind.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};
use thiserror::Error;

/// On-disk format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml`/`.tml` select TOML, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
            "toml" | "tml" => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to serialize config as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize config as TOML: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("invalid config path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("{source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Render `value` as indented text in the given format.
pub fn render(value: &Value, format: ConfigFormat) -> Result<String, WriteError> {
    match format {
        ConfigFormat::Json => {
            let mut buf = Vec::new();
            let mut ser =
                serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
            value.serialize(&mut ser)?;
            buf.push(b'\n');
            // serde_json only emits valid UTF-8
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        ConfigFormat::Toml => Ok(toml::to_string_pretty(value)?),
    }
}

/// Write `value` to `path`, replacing any existing file atomically.
pub fn write_config(value: &Value, path: &Path) -> Result<(), WriteError> {
    let content = render(value, ConfigFormat::from_path(path))?;

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| WriteError::InvalidPath(path.to_path_buf()))?;
    let tmp_path = path.with_file_name(format!(".{file_name}.tmp.{}", std::process::id()));

    if let Err(source) = write_then_rename(&tmp_path, path, content.as_bytes()) {
        let _ = fs::remove_file(&tmp_path);
        return Err(WriteError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    info!("wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

fn write_then_rename(tmp_path: &Path, path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = File::create(tmp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);
    fs::rename(tmp_path, path)
}
