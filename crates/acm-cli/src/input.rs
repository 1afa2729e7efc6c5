//! # Input Files
//!
//! Every subcommand reads one file holding a list, either bare or wrapped
//! in an object under a named key:
//!
//! ```yaml
//! machines:
//!   - category: B3
//!   - category: C
//!     isActive: false
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;

/// Serialization format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Yaml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Parse a document in the given format.
pub fn parse<T: DeserializeOwned>(text: &str, format: InputFormat) -> Result<T> {
    Ok(match format {
        InputFormat::Json => serde_json::from_str(text)?,
        InputFormat::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Read and parse a file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text, InputFormat::from_path(path))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Read a list that is either the whole document or the value under `key`.
pub fn load_list<T: DeserializeOwned>(path: &Path, key: &str) -> Result<Vec<T>> {
    let list = match load::<serde_json::Value>(path)? {
        list @ serde_json::Value::Array(_) => list,
        serde_json::Value::Object(mut object) => match object.remove(key) {
            Some(value) => value,
            None => bail!("{} has no `{key}` list", path.display()),
        },
        _ => bail!("{} must hold a list or an object with a `{key}` list", path.display()),
    };
    serde_json::from_value(list).with_context(|| format!("invalid `{key}` in {}", path.display()))
}
