//! flex-endpoint: Static endpoint generator for Flex package recipes
//!
//! This crate turns a recipes repository into the set of JSON files the
//! installer consumes:
//! - One document per recipe version with the manifest, the recipe
//!   files, and the git tree hash
//! - An `index.json` with aliases, the version list per package, the
//!   Symfony version matrix, and URL templates
//!
//! The recipe list is read as a git tree listing (the output of
//! `git ls-tree HEAD */*`) so generation runs straight off a checkout.

pub mod document;
pub mod endpoint;
pub mod error;
pub mod index;
pub mod listing;
pub mod manifest;
pub mod natsort;
pub mod recipe;
pub mod versions;

pub use document::RecipeDocument;
pub use endpoint::{generate, Config, Summary};
pub use error::{Error, Result};
pub use index::{EndpointIndex, IndexDocument, Links};
pub use listing::TreeEntry;
pub use manifest::Manifest;
pub use natsort::natural_cmp;
pub use recipe::Recipe;
