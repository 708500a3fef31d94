//! Recipe manifest handling
//!
//! Every recipe directory carries a `manifest.json` describing the
//! configurators to run when the package is installed. The manifest is
//! kept as raw JSON (key order preserved) and copied verbatim into the
//! generated package document, with two synthetic keys added for the
//! special files `post-install.txt` and `Makefile`.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// File name that marks a directory as a recipe.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Parsed `manifest.json` contents.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Manifest(Map<String, Value>);

impl Manifest {
    /// Parse a manifest from raw JSON text. The document must be a JSON
    /// object.
    pub fn from_json(data: &str) -> Result<Self> {
        Self::parse(data).map(Self).map_err(Error::Manifest)
    }

    /// Load a manifest from disk. Errors carry the offending path.
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| Error::Manifest(format!("{}: {}", path.display(), e)))?;
        Self::parse(&data)
            .map(Self)
            .map_err(|msg| Error::Manifest(format!("{}: {}", path.display(), msg)))
    }

    fn parse(data: &str) -> std::result::Result<Map<String, Value>, String> {
        let value: Value = serde_json::from_str(data).map_err(|e| e.to_string())?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err("not a JSON object".to_string()),
        }
    }

    /// Alias names declared by the manifest, in declaration order.
    /// Non-string entries are ignored.
    pub fn aliases(&self) -> impl Iterator<Item = &str> + '_ {
        self.0
            .get("aliases")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Record the contents of `post-install.txt` under the
    /// `post-install-output` key.
    pub fn set_post_install_output(&mut self, lines: Vec<String>) {
        self.insert_lines("post-install-output", lines);
    }

    /// Record the contents of `Makefile` under the `makefile` key.
    pub fn set_makefile(&mut self, lines: Vec<String>) {
        self.insert_lines("makefile", lines);
    }

    fn insert_lines(&mut self, key: &str, lines: Vec<String>) {
        self.0.insert(
            key.to_string(),
            Value::Array(lines.into_iter().map(Value::String).collect()),
        );
    }
}
