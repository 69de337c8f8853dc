//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::ItemId;
use crate::item::{Item, ItemDisplay};
use crate::raw::{RawItem, RawRecipe, RawSnapshot, RecipeRelation};

// ===========================================================================
// Items
// ===========================================================================

/// A validated item with a generated display payload.
pub fn item(id: &str) -> Item {
    Item::new(
        ItemId::from(id),
        ItemDisplay {
            name: format!("Item {id}"),
            material: "STONE".to_string(),
            lore: Vec::new(),
            info: Vec::new(),
        },
    )
}

/// A well-formed raw item record.
pub fn raw_item(id: &str) -> RawItem {
    RawItem {
        id: Some(id.to_string()),
        display_name: Some(format!("Item {id}")),
        material: Some("STONE".to_string()),
        ..RawItem::default()
    }
}

/// A raw item record the item builder rejects (no material).
pub fn malformed_raw_item(id: &str) -> RawItem {
    RawItem {
        material: None,
        ..raw_item(id)
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

pub fn crafting(grid: &[&str], output: &str) -> RawRecipe {
    RawRecipe {
        kind: Some("crafting".to_string()),
        grid: Some(grid.iter().map(|s| s.to_string()).collect()),
        output: Some(output.to_string()),
        ..RawRecipe::default()
    }
}

pub fn forge(inputs: &[&str], duration_secs: u64, output: &str) -> RawRecipe {
    RawRecipe {
        kind: Some("forge".to_string()),
        inputs: Some(inputs.iter().map(|s| s.to_string()).collect()),
        duration: Some(duration_secs),
        output: Some(output.to_string()),
        ..RawRecipe::default()
    }
}

pub fn mob_drop(mob: &str, drop: &str) -> RawRecipe {
    RawRecipe {
        kind: Some("drops".to_string()),
        mob: Some(mob.to_string()),
        output: Some(drop.to_string()),
        ..RawRecipe::default()
    }
}

// ===========================================================================
// Snapshots
// ===========================================================================

/// IRON + STICK -> SWORD, with the recipe filed under the sword.
pub fn sword_snapshot() -> RawSnapshot {
    let mut recipes = RecipeRelation::new();
    recipes.insert(
        "SWORD".to_string(),
        vec![crafting(&["", "IRON:1", "", "", "IRON:1", "", "", "STICK:1", ""], "SWORD")],
    );
    RawSnapshot::new(
        vec![raw_item("IRON"), raw_item("STICK"), raw_item("SWORD")],
        recipes,
    )
}

/// A synthetic repository of `families` base items, each with `variants`
/// numbered variants (`BASE_1`..`BASE_n`) crafted from the previous tier.
pub fn tiered_snapshot(families: usize, variants: usize) -> RawSnapshot {
    let mut items = Vec::with_capacity(families * (variants + 1));
    let mut recipes = RecipeRelation::new();
    for f in 0..families {
        let base = format!("MATERIAL_{f:05}_TIER");
        items.push(raw_item(&base));
        let mut previous = base.clone();
        for v in 1..=variants {
            let id = format!("{base}_{v}");
            items.push(raw_item(&id));
            let input = format!("{previous}:4");
            recipes
                .entry(id.clone())
                .or_default()
                .push(crafting(&[input.as_str()], &id));
            previous = id;
        }
    }
    RawSnapshot::new(items, recipes)
}
