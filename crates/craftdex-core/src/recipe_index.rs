//! Reverse recipe indices: what produces an item, and what consumes it.
//!
//! Rebuilt wholesale from the upstream recipe relation and published with
//! one pointer swap, so readers never see a half-built pair of maps.

use crate::id::ItemId;
use crate::raw::RecipeRelation;
use crate::recipe::{Classified, RecipeError, RecipeVariant, classify};
use arc_swap::ArcSwap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A malformed recipe record found during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFailure {
    /// Relation key the record was filed under.
    pub key: String,
    pub error: RecipeError,
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Distinct recipes now indexed.
    pub indexed: usize,
    /// Records of a kind the catalog does not model.
    pub unrecognized: usize,
    pub failures: Vec<RecipeFailure>,
}

/// One published generation of the recipe index.
#[derive(Debug, Default)]
pub struct RecipeSnapshot {
    recipes: Arc<[Arc<RecipeVariant>]>,
    produced_by: HashMap<ItemId, Vec<Arc<RecipeVariant>>>,
    used_by: HashMap<ItemId, Vec<Arc<RecipeVariant>>>,
}

impl RecipeSnapshot {
    /// Classify every record in `relation` into a new generation.
    /// Malformed and unrecognized records are skipped and reported.
    pub(crate) fn build(relation: &RecipeRelation) -> (Self, RebuildReport) {
        let mut report = RebuildReport::default();
        let mut seen: HashSet<Arc<RecipeVariant>> = HashSet::new();
        let mut recipes = Vec::new();
        let mut produced_by: HashMap<ItemId, Vec<Arc<RecipeVariant>>> = HashMap::new();
        let mut used_by: HashMap<ItemId, Vec<Arc<RecipeVariant>>> = HashMap::new();

        for (key, records) in relation {
            for raw in records {
                let recipe = match classify(raw) {
                    Ok(Classified::Recipe(recipe)) => Arc::new(recipe),
                    Ok(Classified::Unrecognized) => {
                        report.unrecognized += 1;
                        continue;
                    }
                    Err(error) => {
                        report.failures.push(RecipeFailure {
                            key: key.clone(),
                            error,
                        });
                        continue;
                    }
                };
                // The upstream relation files a recipe under every item it
                // touches; index each distinct recipe once.
                if !seen.insert(Arc::clone(&recipe)) {
                    continue;
                }

                produced_by
                    .entry(recipe.output().item.clone())
                    .or_default()
                    .push(Arc::clone(&recipe));
                for input in recipe.input_ids() {
                    used_by
                        .entry(input.clone())
                        .or_default()
                        .push(Arc::clone(&recipe));
                }
                recipes.push(recipe);
            }
        }

        report.indexed = recipes.len();
        tracing::debug!(
            indexed = report.indexed,
            unrecognized = report.unrecognized,
            failed = report.failures.len(),
            "recipe index built"
        );
        let snapshot = Self {
            recipes: recipes.into(),
            produced_by,
            used_by,
        };
        (snapshot, report)
    }

    pub fn producing(&self, id: &str) -> &[Arc<RecipeVariant>] {
        self.produced_by.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn using(&self, id: &str) -> &[Arc<RecipeVariant>] {
        self.used_by.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn recipes(&self) -> &Arc<[Arc<RecipeVariant>]> {
        &self.recipes
    }
}

/// Single-writer, multi-reader reverse recipe index.
pub struct RecipeIndex {
    snap: ArcSwap<RecipeSnapshot>,
}

impl Default for RecipeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RecipeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeIndex").field("len", &self.len()).finish()
    }
}

impl RecipeIndex {
    pub fn new() -> Self {
        Self {
            snap: ArcSwap::from_pointee(RecipeSnapshot::default()),
        }
    }

    /// Replace both reverse maps. Only the import coordinator publishes.
    pub(crate) fn publish(&self, snapshot: RecipeSnapshot) {
        self.snap.store(Arc::new(snapshot));
    }

    pub(crate) fn clear(&self) {
        self.snap.store(Arc::new(RecipeSnapshot::default()));
    }

    /// Recipes whose output is `id`. Empty when nothing produces it.
    pub fn recipes_producing(&self, id: &str) -> Vec<Arc<RecipeVariant>> {
        self.snap.load().producing(id).to_vec()
    }

    /// Recipes that consume `id`. Empty when nothing uses it.
    pub fn recipes_using(&self, id: &str) -> Vec<Arc<RecipeVariant>> {
        self.snap.load().using(id).to_vec()
    }

    /// Every indexed recipe, in relation order.
    pub fn all(&self) -> Arc<[Arc<RecipeVariant>]> {
        Arc::clone(&self.snap.load().recipes)
    }

    pub fn snapshot(&self) -> Arc<RecipeSnapshot> {
        self.snap.load_full()
    }

    pub fn len(&self) -> usize {
        self.snap.load().recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
