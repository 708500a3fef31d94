//! Recipe discovery
//!
//! A listing entry points at a directory `<vendor>/<package>/<version>`
//! inside the recipes repository. The directory is a recipe only when
//! it carries a `manifest.json`; everything else in the listing is
//! ignored.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;
use crate::listing::TreeEntry;
use crate::manifest::{Manifest, MANIFEST_FILE};

/// One recipe resolved from the tree listing.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Package name, e.g. `symfony/console`.
    pub package: String,
    /// Recipe version, the last path segment, e.g. `5.4`.
    pub version: String,
    /// Git tree hash of the recipe directory.
    pub tree_hash: String,
    /// Parsed manifest.
    pub manifest: Manifest,
    /// Recipe directory on disk.
    pub dir: PathBuf,
}

impl Recipe {
    /// Resolve a listing entry against the recipes checkout rooted at
    /// `root`. Returns `Ok(None)` for entries that are not recipes:
    /// directories without a manifest, or paths without a version
    /// segment.
    pub fn locate(entry: &TreeEntry, root: &Path) -> Result<Option<Self>> {
        let dir = root.join(&entry.path);
        if !dir.join(MANIFEST_FILE).is_file() {
            return Ok(None);
        }

        let Some((package, version)) = entry.path.rsplit_once('/') else {
            warn!("Skipping {}: no version segment in path", entry.path);
            return Ok(None);
        };

        let manifest = Manifest::from_path(&dir.join(MANIFEST_FILE))?;

        Ok(Some(Self {
            package: package.to_string(),
            version: version.to_string(),
            tree_hash: entry.tree_hash.clone(),
            manifest,
            dir,
        }))
    }
}
