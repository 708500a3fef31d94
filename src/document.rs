//! Per-recipe package documents
//!
//! For every recipe one JSON document is generated, named
//! `<vendor>.<package>.<version>.json`. It bundles everything the
//! installer needs to apply the recipe without talking to git:
//!
//! - the manifest, with `post-install.txt` and `Makefile` folded in
//! - every other file in the recipe directory, text as lines and
//!   binary as base64
//! - the git tree hash of the recipe under `ref`
//!
//! Files are keyed by their path relative to the recipe directory and
//! collected in sorted order so a rebuild of an unchanged recipe is
//! byte-identical.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use base64::prelude::{Engine as _, BASE64_STANDARD};
use indexmap::IndexMap;
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};
use crate::recipe::Recipe;

/// Special file folded into the manifest as `post-install-output`.
pub const POST_INSTALL_FILE: &str = "post-install.txt";

/// Special file folded into the manifest as `makefile`.
pub const MAKEFILE_FILE: &str = "Makefile";

/// Contents of one recipe file. Valid UTF-8 is shipped as lines,
/// anything else as base64.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileContents {
    Text(Vec<String>),
    Binary(String),
}

/// One file of the recipe tree.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub contents: FileContents,
    pub executable: bool,
}

/// Payload stored under the package name inside the document.
#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub manifest: Manifest,
    pub files: IndexMap<String, FileEntry>,
    #[serde(rename = "ref")]
    pub tree_ref: String,
}

/// The full per-version document written to the endpoint.
#[derive(Debug, Serialize)]
pub struct RecipeDocument {
    manifests: IndexMap<String, ManifestEntry>,
    #[serde(skip)]
    package: String,
    #[serde(skip)]
    version: String,
}

impl RecipeDocument {
    /// Serialize a recipe directory into its package document.
    pub fn build(recipe: &Recipe) -> Result<Self> {
        let mut manifest = recipe.manifest.clone();
        let mut files = IndexMap::new();
        let walk_context = || recipe.dir.display().to_string();

        let walker = WalkDir::new(&recipe.dir)
            .follow_links(true)
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk(walk_context(), e))?;
            if entry.file_type().is_dir() {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&recipe.dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();

            // The special names only count at the top of the recipe;
            // nested ones are ordinary files.
            if rel == MANIFEST_FILE {
                continue;
            }
            if rel == POST_INSTALL_FILE {
                manifest.set_post_install_output(special_lines(&fs::read(entry.path())?));
                continue;
            }
            if rel == MAKEFILE_FILE {
                manifest.set_makefile(special_lines(&fs::read(entry.path())?));
                continue;
            }

            let metadata = entry
                .metadata()
                .map_err(|e| Error::Walk(walk_context(), e))?;
            files.insert(
                rel,
                FileEntry {
                    contents: classify(fs::read(entry.path())?),
                    executable: metadata.permissions().mode() & 0o111 != 0,
                },
            );
        }

        let mut manifests = IndexMap::new();
        manifests.insert(
            recipe.package.clone(),
            ManifestEntry {
                manifest,
                files,
                tree_ref: recipe.tree_hash.clone(),
            },
        );

        Ok(Self {
            manifests,
            package: recipe.package.clone(),
            version: recipe.version.clone(),
        })
    }

    /// Document file name: `<package-with-dots>.<version>.json`.
    pub fn file_name(&self) -> String {
        format!("{}.{}.json", self.package.replace('/', "."), self.version)
    }

    /// Write the pretty-printed document into `output_dir` and return
    /// its path.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(self.file_name());
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }
}

/// Line-fold a special file: drop every `\r`, strip one trailing
/// newline, split on `\n`. Non-UTF-8 bytes are replaced rather than
/// rejected.
fn special_lines(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw).replace('\r', "");
    let text = text.strip_suffix('\n').unwrap_or(&text);
    text.split('\n').map(str::to_string).collect()
}

/// UTF-8 contents become lines (kept verbatim, so a trailing newline
/// yields a final empty line), everything else base64.
fn classify(raw: Vec<u8>) -> FileContents {
    match String::from_utf8(raw) {
        Ok(text) => FileContents::Text(text.split('\n').map(str::to_string).collect()),
        Err(err) => FileContents::Binary(BASE64_STANDARD.encode(err.into_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_recipe(root: &Path, package: &str, version: &str, manifest_json: &str) -> Recipe {
        let dir = root.join(package).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest_json).unwrap();
        Recipe {
            package: package.to_string(),
            version: version.to_string(),
            tree_hash: "abc123".to_string(),
            manifest: Manifest::from_json(manifest_json).unwrap(),
            dir,
        }
    }

    fn entry_for<'a>(doc: &'a RecipeDocument, package: &str) -> &'a ManifestEntry {
        doc.manifests.get(package).unwrap()
    }

    #[test]
    fn test_files_collected_in_sorted_order() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join("b.txt"), "b\n").unwrap();
        fs::write(recipe.dir.join("a.txt"), "a\n").unwrap();
        fs::create_dir(recipe.dir.join("c")).unwrap();
        fs::write(recipe.dir.join("c/d.txt"), "d\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let keys: Vec<&String> = entry_for(&doc, "vendor/pkg").files.keys().collect();
        assert_eq!(keys, vec!["a.txt", "b.txt", "c/d.txt"]);
    }

    #[test]
    fn test_manifest_json_not_listed_as_file() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", r#"{"aliases": ["p"]}"#);

        let doc = RecipeDocument::build(&recipe).unwrap();
        assert!(entry_for(&doc, "vendor/pkg").files.is_empty());
    }

    #[test]
    fn test_text_files_keep_trailing_empty_line() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join("config.yaml"), "a: 1\nb: 2\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let file = &entry_for(&doc, "vendor/pkg").files["config.yaml"];
        assert_eq!(
            file.contents,
            FileContents::Text(vec!["a: 1".to_string(), "b: 2".to_string(), String::new()])
        );
        assert!(!file.executable);
    }

    #[test]
    fn test_post_install_folded_into_manifest() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join(POST_INSTALL_FILE), "line1\r\nline2\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let entry = entry_for(&doc, "vendor/pkg");
        assert!(entry.files.is_empty());

        let manifest = serde_json::to_value(&entry.manifest).unwrap();
        assert_eq!(
            manifest["post-install-output"],
            serde_json::json!(["line1", "line2"])
        );
    }

    #[test]
    fn test_makefile_folded_into_manifest() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join(MAKEFILE_FILE), "cache-clear:\n\trm -rf var\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let entry = entry_for(&doc, "vendor/pkg");
        assert!(entry.files.is_empty());

        let manifest = serde_json::to_value(&entry.manifest).unwrap();
        assert_eq!(
            manifest["makefile"],
            serde_json::json!(["cache-clear:", "\trm -rf var"])
        );
    }

    #[test]
    fn test_nested_special_names_stay_files() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::create_dir(recipe.dir.join("sub")).unwrap();
        fs::write(recipe.dir.join("sub").join(POST_INSTALL_FILE), "hi\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let entry = entry_for(&doc, "vendor/pkg");
        assert!(entry.files.contains_key("sub/post-install.txt"));

        let manifest = serde_json::to_value(&entry.manifest).unwrap();
        assert!(manifest.get("post-install-output").is_none());
    }

    #[test]
    fn test_binary_files_base64_encoded() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join("logo.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let file = &entry_for(&doc, "vendor/pkg").files["logo.jpg"];
        assert_eq!(file.contents, FileContents::Binary("/9j/4A==".to_string()));
    }

    #[test]
    fn test_multibyte_utf8_is_text() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join("notes.txt"), "héllo wörld 🦀").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let file = &entry_for(&doc, "vendor/pkg").files["notes.txt"];
        assert_eq!(
            file.contents,
            FileContents::Text(vec!["héllo wörld 🦀".to_string()])
        );
    }

    #[test]
    fn test_executable_bit_detected() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        let script = recipe.dir.join("setup.sh");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        fs::write(recipe.dir.join("plain.txt"), "x\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let files = &entry_for(&doc, "vendor/pkg").files;
        assert!(files["setup.sh"].executable);
        assert!(!files["plain.txt"].executable);
    }

    #[test]
    fn test_hidden_files_included() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        fs::write(recipe.dir.join(".env.dist"), "APP_ENV=dev\n").unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        assert!(entry_for(&doc, "vendor/pkg").files.contains_key(".env.dist"));
    }

    #[test]
    fn test_symlinked_directories_followed() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", "{}");
        let shared = root.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("common.txt"), "shared\n").unwrap();
        std::os::unix::fs::symlink(&shared, recipe.dir.join("linked")).unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        assert!(entry_for(&doc, "vendor/pkg")
            .files
            .contains_key("linked/common.txt"));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let recipe = Recipe {
            package: "vendor/pkg".to_string(),
            version: "1.0".to_string(),
            tree_hash: "abc".to_string(),
            manifest: Manifest::default(),
            dir: PathBuf::from("/nonexistent/vendor/pkg/1.0"),
        };
        assert!(matches!(
            RecipeDocument::build(&recipe),
            Err(Error::Walk(_, _))
        ));
    }

    #[test]
    fn test_write_names_and_formats_document() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", r#"{"aliases": ["p"]}"#);
        fs::write(recipe.dir.join("logo.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();
        let out = tempfile::tempdir().unwrap();

        let doc = RecipeDocument::build(&recipe).unwrap();
        let path = doc.write(out.path()).unwrap();
        assert_eq!(path, out.path().join("vendor.pkg.1.0.json"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"manifests\""));
        assert!(written.contains("\"vendor/pkg\""));
        assert!(written.contains("\"/9j/4A==\""));
        assert!(!written.ends_with('\n'));
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let root = tempfile::tempdir().unwrap();
        let recipe = make_recipe(root.path(), "vendor/pkg", "1.0", r#"{"bundles": {}}"#);
        fs::write(recipe.dir.join("b.txt"), "b\n").unwrap();
        fs::write(recipe.dir.join("a.txt"), "a\n").unwrap();

        let out_a = tempfile::tempdir().unwrap();
        let out_b = tempfile::tempdir().unwrap();
        let path_a = RecipeDocument::build(&recipe).unwrap().write(out_a.path()).unwrap();
        let path_b = RecipeDocument::build(&recipe).unwrap().write(out_b.path()).unwrap();

        assert_eq!(
            fs::read(path_a).unwrap(),
            fs::read(path_b).unwrap()
        );
    }
}
