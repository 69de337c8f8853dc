use crate::config::WikiConfig;
use crate::item::Item;
use crate::item_index::ItemIndex;
use crate::recipe::RecipeVariant;
use crate::recipe_index::RecipeIndex;
use std::sync::Arc;

/// Read-side handle over the item and recipe indices. Cheap to clone;
/// every clone observes the same published generations. Only the
/// [`ImportCoordinator`](crate::import::ImportCoordinator) writes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Arc<ItemIndex>,
    recipes: Arc<RecipeIndex>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &ItemIndex {
        &self.items
    }

    pub fn recipes(&self) -> &RecipeIndex {
        &self.recipes
    }

    /// Whether an import has completed. Results read before this is true
    /// are provisional.
    pub fn ready(&self) -> bool {
        self.items.ready()
    }

    pub async fn wait_ready(&self) {
        self.items.wait_ready().await
    }

    pub fn get(&self, id: &str) -> Option<Arc<Item>> {
        self.items.get(id)
    }

    pub fn all(&self) -> Arc<[Arc<Item>]> {
        self.items.all()
    }

    pub fn recipes_producing(&self, id: &str) -> Vec<Arc<RecipeVariant>> {
        self.recipes.recipes_producing(id)
    }

    pub fn recipes_using(&self, id: &str) -> Vec<Arc<RecipeVariant>> {
        self.recipes.recipes_using(id)
    }

    pub fn all_recipes(&self) -> Arc<[Arc<RecipeVariant>]> {
        self.recipes.all()
    }

    /// Wiki page for `id` on the configured wiki.
    pub fn wiki_link(&self, id: &str, wiki: &WikiConfig) -> Option<String> {
        self.get(id)?.wiki_link(wiki).map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportCoordinator;
    use crate::store::MemoryStore;
    use crate::test_utils::sword_snapshot;

    #[test]
    fn clones_share_indices() {
        let coordinator = ImportCoordinator::new(Arc::new(MemoryStore::new()), Catalog::new());
        let reader = coordinator.catalog().clone();
        assert!(!reader.ready());

        coordinator.import_snapshot(&sword_snapshot());

        assert!(reader.ready());
        assert_eq!(reader.all().len(), 3);
        assert_eq!(reader.items().len(), 3);
        assert_eq!(reader.recipes_producing("SWORD").len(), 1);
        assert_eq!(reader.recipes_using("IRON").len(), 1);
        assert_eq!(reader.all_recipes().len(), 1);
        assert_eq!(reader.recipes().len(), 1);
    }

    #[test]
    fn wiki_link_of_unknown_item_is_none() {
        let catalog = Catalog::new();
        assert_eq!(catalog.wiki_link("UNKNOWN_ID", &WikiConfig::default()), None);
    }
}
