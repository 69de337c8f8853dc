//! Craftdex Core -- an in-memory index over a game item repository.
//!
//! Raw item and recipe records published by an upstream repository are
//! turned into a canonically ordered item listing, an id lookup map and
//! two reverse recipe indices ("what produces X", "what consumes X").
//!
//! # Import Pipeline
//!
//! 1. **Wait** -- [`import::ImportCoordinator`] waits for the
//!    [`store::RawRecordStore`] to publish a [`raw::RawSnapshot`].
//! 2. **Build items** -- every raw item goes through [`item::build_item`];
//!    bad records are logged and skipped.
//! 3. **Classify recipes** -- every raw recipe goes through
//!    [`recipe::classify`]; unknown kinds are dropped, malformed records
//!    are logged and skipped.
//! 4. **Publish** -- the recipe index and then the item index are swapped
//!    in atomically, which raises the readiness latch.
//!
//! # Key Types
//!
//! - [`catalog::Catalog`] -- Read-side handle: `ready`, `get`, `all`,
//!   `recipes_producing`, `recipes_using`.
//! - [`item_index::ItemIndex`] -- Canonical listing, id map and latch.
//! - [`recipe_index::RecipeIndex`] -- Produced-by and used-by maps.
//! - [`recipe::RecipeVariant`] -- Crafting, Forge and MobDrop recipes.
//! - [`id::ItemId`] -- Item identifier; [`id::family_key`] and
//!   [`id::canonical_cmp`] define the listing order.

pub mod catalog;
pub mod config;
pub mod id;
pub mod import;
pub mod item;
pub mod item_index;
pub mod raw;
pub mod recipe;
pub mod recipe_index;
pub mod store;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::Catalog;
pub use import::{ImportCoordinator, ImportReport, ImportState};
