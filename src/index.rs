//! Endpoint index
//!
//! `index.json` is the entry point the installer downloads first. It
//! maps aliases to package names, lists every recipe version, and
//! carries the URL templates used to fetch individual package
//! documents. Aliases and recipe keys are kept in natural order so the
//! file is stable across runs.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::natsort::natural_cmp;
use crate::recipe::Recipe;

/// File name of the endpoint index.
pub const INDEX_FILE: &str = "index.json";

/// Packages under this prefix get their bare name as an alias.
pub const SHORTHAND_PREFIX: &str = "symfony/";

/// Packs bundle other packages and never get a shorthand alias.
pub const SHORTHAND_EXCLUDED_SUFFIX: &str = "-pack";

/// Accumulates aliases and recipe versions while recipes stream in.
#[derive(Debug, Default)]
pub struct EndpointIndex {
    aliases: IndexMap<String, String>,
    recipes: IndexMap<String, Vec<String>>,
}

impl EndpointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one recipe into the index: its manifest aliases, the
    /// shorthand alias where it applies, and its version.
    pub fn add(&mut self, recipe: &Recipe) {
        for alias in recipe.manifest.aliases() {
            self.register_alias(alias, &recipe.package);
        }

        if let Some(shorthand) = recipe.package.strip_prefix(SHORTHAND_PREFIX) {
            if !recipe.package.ends_with(SHORTHAND_EXCLUDED_SUFFIX) {
                self.register_alias(shorthand, &recipe.package);
            }
        }

        let versions = self.recipes.entry(recipe.package.clone()).or_default();
        versions.push(recipe.version.clone());
        versions.sort_by(|a, b| natural_cmp(a, b));
    }

    /// Register an alias together with its hyphen-free form. Later
    /// recipes silently overwrite earlier claims to the same alias.
    fn register_alias(&mut self, alias: &str, package: &str) {
        self.aliases.insert(alias.to_string(), package.to_string());
        self.aliases
            .insert(alias.replace('-', ""), package.to_string());
    }

    /// Put both maps into natural key order.
    pub fn sort_keys(&mut self) {
        self.aliases.sort_by(|a, _, b, _| natural_cmp(a, b));
        self.recipes.sort_by(|a, _, b, _| natural_cmp(a, b));
    }

    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }

    pub fn recipes(&self) -> &IndexMap<String, Vec<String>> {
        &self.recipes
    }
}

/// URL templates the installer expands to reach the endpoint.
#[derive(Debug, Serialize)]
pub struct Links {
    pub repository: String,
    pub origin_template: String,
    pub recipe_template: String,
}

impl Links {
    pub fn new(repository: &str, source_branch: &str, flex_branch: &str) -> Self {
        Self {
            repository: format!("github.com/{}", repository),
            origin_template: format!(
                "{{package}}:{{version}}@github.com/{}:{}",
                repository, source_branch
            ),
            recipe_template: format!(
                "https://api.github.com/repos/{}/contents/{{package_dotted}}.{{version}}.json?ref={}",
                repository, flex_branch
            ),
        }
    }
}

/// The finished `index.json` payload.
#[derive(Debug, Serialize)]
pub struct IndexDocument {
    aliases: IndexMap<String, String>,
    recipes: IndexMap<String, Vec<String>>,
    versions: Value,
    branch: String,
    is_contrib: bool,
    #[serde(rename = "_links")]
    links: Links,
}

impl IndexDocument {
    /// Combine the sorted accumulator with the remaining index fields.
    pub fn assemble(
        mut index: EndpointIndex,
        versions: Value,
        branch: &str,
        is_contrib: bool,
        links: Links,
    ) -> Self {
        index.sort_keys();
        Self {
            aliases: index.aliases,
            recipes: index.recipes,
            versions,
            branch: branch.to_string(),
            is_contrib,
            links,
        }
    }

    /// Write the pretty-printed index into `output_dir` and return its
    /// path.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(INDEX_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}
