//! Endpoint generation pipeline
//!
//! Ties the other modules together: parse the tree listing, write one
//! package document per recipe, accumulate the index, and finish with
//! `index.json`. The caller supplies the listing as any `BufRead`, so
//! the pipeline runs the same from stdin or from a test fixture.

use std::fs;
use std::io::BufRead;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::document::RecipeDocument;
use crate::error::Result;
use crate::index::{EndpointIndex, IndexDocument, Links};
use crate::listing::read_listing;
use crate::recipe::Recipe;
use crate::versions::{fetch_versions, VERSIONS_URL};

/// Everything one generation run needs to know.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub repository the recipes come from, e.g. `symfony/recipes`.
    pub repository: String,
    /// Branch holding the recipe sources.
    pub source_branch: String,
    /// Branch the generated endpoint is published to.
    pub flex_branch: String,
    /// Directory the JSON files are written into.
    pub output_directory: PathBuf,
    /// Contrib endpoints embed an empty version matrix instead of
    /// downloading one.
    pub contrib: bool,
    /// Root of the recipes checkout the listing paths resolve against.
    pub recipes_root: PathBuf,
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    /// Listing entries read.
    pub entries: usize,
    /// Package documents written.
    pub recipes_written: usize,
    /// Distinct packages in the index.
    pub packages: usize,
    /// Aliases in the index.
    pub aliases: usize,
}

/// Run the whole pipeline and return what it did.
pub fn generate<R: BufRead>(config: &Config, listing: R) -> Result<Summary> {
    fs::create_dir_all(&config.output_directory)?;

    let entries = read_listing(listing)?;
    let mut index = EndpointIndex::new();
    let mut summary = Summary {
        entries: entries.len(),
        ..Summary::default()
    };

    for entry in &entries {
        let recipe = match Recipe::locate(entry, &config.recipes_root)? {
            Some(recipe) => recipe,
            None => {
                debug!("Skipping {}: not a recipe", entry.path);
                continue;
            }
        };

        let path = RecipeDocument::build(&recipe)?.write(&config.output_directory)?;
        debug!("Wrote {}", path.display());

        index.add(&recipe);
        summary.recipes_written += 1;
    }

    summary.packages = index.recipes().len();
    summary.aliases = index.aliases().len();

    let versions = if config.contrib {
        Value::Array(Vec::new())
    } else {
        info!("Fetching {}", VERSIONS_URL);
        fetch_versions()?
    };

    let links = Links::new(&config.repository, &config.source_branch, &config.flex_branch);
    let index_doc = IndexDocument::assemble(
        index,
        versions,
        &config.source_branch,
        config.contrib,
        links,
    );
    let path = index_doc.write(&config.output_directory)?;
    debug!("Wrote {}", path.display());

    Ok(summary)
}
