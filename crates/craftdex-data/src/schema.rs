//! Serde structs for repository files that are not raw records themselves.
//!
//! Item and recipe records use the lenient raw types from
//! `craftdex_core::raw`; this module only adds the file-level wrappers.

use serde::Deserialize;

/// Header of a recipe group in a standalone `recipes` file. The group's
/// `recipes` list is taken out and decoded record by record.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeGroupData {
    pub id: String,
}
