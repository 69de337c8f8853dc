//! Raw, unvalidated records as published by the upstream item repository.
//!
//! Every field is optional so that one malformed record deserializes
//! cleanly and is rejected later by the item builder or recipe classifier,
//! instead of failing the whole data file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The id → recipe-set relation maintained by the upstream recipe cache.
pub type RecipeRelation = BTreeMap<String, Vec<RawRecipe>>;

/// One upstream item record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Base material the item is rendered as (e.g. `IRON_INGOT`).
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    /// Reference links, typically wiki pages.
    #[serde(default)]
    pub info: Vec<String>,
    /// Recipes embedded in the item record.
    #[serde(default)]
    pub recipes: Vec<RawRecipe>,
}

/// One upstream recipe record, tagged with a source-defined kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecipe {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Crafting grid, row-major, up to nine `"ID:count"` slots.
    /// Empty strings are empty slots.
    #[serde(default)]
    pub grid: Option<Vec<String>>,
    /// Forge inputs as `"ID:count"` references.
    #[serde(default)]
    pub inputs: Option<Vec<String>>,
    #[serde(default)]
    pub output: Option<String>,
    /// Output count when `output` carries no `:count` suffix.
    #[serde(default)]
    pub count: Option<u32>,
    /// Forge time in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub mob: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    /// Drop chance as displayed upstream, e.g. `"5%"`.
    #[serde(default)]
    pub chance: Option<String>,
}

/// Which kind of record a [`RejectedRecord`] was meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Item,
    Recipe,
}

/// A record the store could not decode at all, e.g. a field of the wrong
/// type. It is skipped on its own and counted by the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub kind: RecordKind,
    /// Owning item id if one could be read, else the record's position.
    pub key: String,
    pub reason: String,
}

/// A complete, read-only view of the upstream data at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub items: Vec<RawItem>,
    #[serde(default)]
    pub recipes: RecipeRelation,
    #[serde(default)]
    pub rejected: Vec<RejectedRecord>,
}

impl RawSnapshot {
    pub fn new(items: Vec<RawItem>, recipes: RecipeRelation) -> Self {
        Self {
            items,
            recipes,
            rejected: Vec::new(),
        }
    }

    /// Build a snapshot whose recipe relation is derived from the recipes
    /// embedded in each item record, keyed by the owning item's id.
    /// Records without an id file their recipes under the empty key.
    pub fn from_items(items: Vec<RawItem>) -> Self {
        let mut recipes = RecipeRelation::new();
        for item in &items {
            if item.recipes.is_empty() {
                continue;
            }
            let key = item.id.clone().unwrap_or_default();
            recipes
                .entry(key)
                .or_default()
                .extend(item.recipes.iter().cloned());
        }
        Self::new(items, recipes)
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.values().map(Vec::len).sum()
    }
}
