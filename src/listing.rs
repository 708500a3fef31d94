//! Git tree listing parser
//!
//! The generator is fed the output of `git ls-tree HEAD */*` on stdin.
//! Each line looks like:
//!
//! ```text
//! 040000 tree d1a2b3c4... <TAB> symfony/console/5.4
//! ```
//!
//! Only the tree hash and the path are kept. Malformed lines are logged
//! and skipped so one bad line cannot abort a whole endpoint build.

use std::io::BufRead;

use tracing::warn;

use crate::error::Result;

/// One parsed line of the tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Git tree object hash of the recipe directory.
    pub tree_hash: String,
    /// Path of the recipe directory relative to the repository root,
    /// e.g. `symfony/console/5.4`.
    pub path: String,
}

impl TreeEntry {
    /// Parse a single `git ls-tree` line. Returns `None` when the line
    /// does not carry both a tree hash and a path.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut fields = line.split('\t');
        let meta = fields.next()?;
        let path = fields.next()?;

        // The metadata column is "<mode> <type> <hash>".
        let tree_hash = meta.split(' ').nth(2)?;
        if tree_hash.is_empty() || path.is_empty() {
            return None;
        }

        Some(Self {
            tree_hash: tree_hash.to_string(),
            path: path.to_string(),
        })
    }
}

/// Read a whole tree listing, skipping blank and malformed lines.
pub fn read_listing<R: BufRead>(reader: R) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match TreeEntry::parse(&line) {
            Some(entry) => entries.push(entry),
            None => warn!("Skipping malformed listing line: {:?}", line),
        }
    }
    Ok(entries)
}
