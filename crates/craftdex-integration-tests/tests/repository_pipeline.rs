//! End-to-end tests: repository files on disk are loaded into a store,
//! imported by a background coordinator and queried through the catalog.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use craftdex_core::catalog::Catalog;
use craftdex_core::config::WikiSource;
use craftdex_core::import::{ImportCoordinator, ImportReport, ImportState};
use craftdex_core::recipe::{RecipeKind, RecipeVariant};
use craftdex_core::store::MemoryStore;
use craftdex_data::{find_config, load_snapshot, load_store, reload_store};
use tokio::sync::watch;

const ITEMS_JSON: &str = r#"[
    {"id": "IRON_INGOT", "display_name": "Iron Ingot", "material": "IRON_INGOT"},
    {"id": "STICK", "display_name": "Stick", "material": "STICK"},
    {"id": "ENCHANTED_IRON", "display_name": "Enchanted Iron", "material": "IRON_INGOT"},
    {"id": "IRON_SWORD", "display_name": "Iron Sword", "material": "IRON_SWORD",
     "info": ["https://wiki.hypixel.net/Iron_Sword",
              "https://hypixel-skyblock.fandom.com/wiki/Iron_Sword"],
     "recipes": [{"type": "crafting",
                  "grid": ["", "IRON_INGOT:1", "", "", "IRON_INGOT:1", "", "", "STICK:1", ""],
                  "output": "IRON_SWORD"}]},
    {"id": "PET_SKIN_1", "display_name": "Skin", "material": "PLAYER_HEAD"},
    {"id": "PET_SKIN", "display_name": "Skin", "material": "PLAYER_HEAD"},
    {"display_name": "Nameless", "material": "STONE"},
    {"id": "NO_MATERIAL", "display_name": "Broken"}
]"#;

const RECIPES_JSON: &str = r#"[
    {"id": "ENCHANTED_IRON", "recipes": [
        {"type": "forge", "inputs": ["IRON_INGOT:160"], "duration": 3600, "output": "ENCHANTED_IRON"},
        {"type": "npc_shop", "cost": ["COINS:5"], "output": "ENCHANTED_IRON"}
    ]},
    {"id": "IRON_INGOT", "recipes": [
        {"type": "drops", "mob": "Iron Golem", "level": 10, "output": "IRON_INGOT:3", "chance": "100%"}
    ]}
]"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn repository() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("items.json"), ITEMS_JSON).unwrap();
    fs::write(dir.path().join("recipes.json"), RECIPES_JSON).unwrap();
    dir
}

fn listing(catalog: &Catalog) -> Vec<String> {
    catalog.all().iter().map(|i| i.id().to_string()).collect()
}

async fn wait_for_report(
    rx: &mut watch::Receiver<ImportState>,
    accept: impl Fn(&ImportReport) -> bool,
) -> ImportReport {
    let state = rx
        .wait_for(|s| matches!(s, ImportState::Ready(r) if accept(r)))
        .await
        .unwrap()
        .clone();
    match state {
        ImportState::Ready(report) => report,
        other => panic!("unexpected state {other:?}"),
    }
}

// ===========================================================================
// Direct import
// ===========================================================================

#[tokio::test]
async fn files_to_catalog() {
    init_tracing();
    let dir = repository();
    let store = Arc::new(load_store(dir.path()).unwrap());
    let coordinator = ImportCoordinator::new(store, Catalog::new());

    let report = coordinator.import_when_ready().await.unwrap();
    assert_eq!(report.items_loaded, 6);
    assert_eq!(report.item_failures, 2);
    assert_eq!(report.recipes_indexed, 3);
    assert_eq!(report.recipes_unrecognized, 1);
    assert_eq!(report.recipe_failures, 0);

    let catalog = coordinator.catalog();
    assert!(catalog.ready());
    assert_eq!(
        listing(catalog),
        vec![
            "ENCHANTED_IRON",
            "IRON_INGOT",
            "IRON_SWORD",
            "PET_SKIN",
            "PET_SKIN_1",
            "STICK",
        ]
    );
    assert!(catalog.get("NO_MATERIAL").is_none());
}

#[tokio::test]
async fn reverse_lookups_cover_every_kind() {
    let dir = repository();
    let coordinator = ImportCoordinator::new(Arc::new(load_store(dir.path()).unwrap()), Catalog::new());
    coordinator.import_when_ready().await.unwrap();
    let catalog = coordinator.catalog();

    let sword = catalog.recipes_producing("IRON_SWORD");
    assert_eq!(sword.len(), 1);
    assert_eq!(sword[0].kind(), RecipeKind::Crafting);

    let mut using_iron: Vec<RecipeKind> = catalog
        .recipes_using("IRON_INGOT")
        .iter()
        .map(|r| r.kind())
        .collect();
    using_iron.sort_by_key(|k| format!("{k:?}"));
    assert_eq!(using_iron, vec![RecipeKind::Crafting, RecipeKind::Forge]);

    let enchanted = catalog.recipes_producing("ENCHANTED_IRON");
    assert_eq!(enchanted.len(), 1);
    match enchanted[0].as_ref() {
        RecipeVariant::Forge(forge) => {
            assert_eq!(forge.duration_secs, 3600);
            assert_eq!(forge.inputs[0].count, 160);
        }
        other => panic!("expected forge, got {other:?}"),
    }

    let drops = catalog.recipes_producing("IRON_INGOT");
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].output().count, 3);

    assert!(catalog.recipes_using("COINS").is_empty());
    assert!(catalog.recipes_producing("UNKNOWN_ID").is_empty());
}

#[tokio::test]
async fn wiki_link_follows_configuration() {
    let dir = repository();
    fs::write(
        dir.path().join("craftdex.toml"),
        "[wiki]\nsource = \"community\"\n",
    )
    .unwrap();
    let config = find_config(dir.path()).unwrap();
    assert_eq!(config.wiki.source, WikiSource::Community);

    let coordinator = ImportCoordinator::with_config(
        Arc::new(load_store(dir.path()).unwrap()),
        Catalog::new(),
        config.import.clone(),
    );
    coordinator.import_when_ready().await.unwrap();

    assert_eq!(
        coordinator.catalog().wiki_link("IRON_SWORD", &config.wiki).as_deref(),
        Some("https://hypixel-skyblock.fandom.com/wiki/Iron_Sword")
    );
    assert_eq!(coordinator.catalog().wiki_link("STICK", &config.wiki), None);
}

#[tokio::test]
async fn wrong_typed_records_are_skipped_not_fatal() {
    init_tracing();
    let dir = repository();
    fs::write(
        dir.path().join("items.json"),
        r#"[
            {"id": "IRON_INGOT", "display_name": "Iron Ingot", "material": "IRON_INGOT"},
            {"id": "BAD", "display_name": 42, "material": "STONE"},
            {"id": "IRON_SWORD", "display_name": "Iron Sword", "material": "IRON_SWORD",
             "recipes": [
                {"type": "crafting", "grid": ["IRON_INGOT"], "output": "IRON_SWORD", "count": -1},
                {"type": "crafting", "grid": ["IRON_INGOT:2"], "output": "IRON_SWORD"}
             ]}
        ]"#,
    )
    .unwrap();
    fs::remove_file(dir.path().join("recipes.json")).unwrap();

    let store = Arc::new(load_store(dir.path()).unwrap());
    let coordinator = ImportCoordinator::new(store, Catalog::new());
    let report = coordinator.import_when_ready().await.unwrap();

    assert_eq!(report.items_loaded, 2);
    assert_eq!(report.item_failures, 1);
    assert_eq!(report.recipes_indexed, 1);
    assert_eq!(report.recipe_failures, 1);
    assert_eq!(listing(coordinator.catalog()), vec!["IRON_INGOT", "IRON_SWORD"]);
    assert_eq!(coordinator.catalog().recipes_using("IRON_INGOT").len(), 1);
}

// ===========================================================================
// Background coordinator
// ===========================================================================

#[tokio::test]
async fn readers_wait_for_first_import() {
    init_tracing();
    let dir = repository();
    let store = Arc::new(MemoryStore::new());
    let coordinator = Arc::new(ImportCoordinator::new(store.clone(), Catalog::new()));
    let catalog = coordinator.catalog().clone();
    let mut state = coordinator.subscribe();
    let task = coordinator.spawn();

    assert!(!catalog.ready());
    assert!(catalog.all().is_empty());
    assert!(catalog.get("IRON_SWORD").is_none());

    reload_store(&store, dir.path()).unwrap();
    catalog.wait_ready().await;
    wait_for_report(&mut state, |r| r.items_loaded == 6).await;

    assert_eq!(catalog.all().len(), 6);
    assert_eq!(catalog.recipes_producing("IRON_SWORD").len(), 1);
    task.abort();
}

#[tokio::test]
async fn reload_replaces_catalog_wholesale() {
    init_tracing();
    let dir = repository();
    let store = Arc::new(load_store(dir.path()).unwrap());
    let coordinator = Arc::new(ImportCoordinator::new(store.clone(), Catalog::new()));
    let catalog = coordinator.catalog().clone();
    let mut state = coordinator.subscribe();
    let task = coordinator.spawn();

    let first = wait_for_report(&mut state, |r| r.items_loaded == 6).await;
    let before = catalog.all();

    fs::write(
        dir.path().join("items.json"),
        r#"[{"id": "GOLD_INGOT", "display_name": "Gold Ingot", "material": "GOLD_INGOT"}]"#,
    )
    .unwrap();
    fs::remove_file(dir.path().join("recipes.json")).unwrap();
    reload_store(&store, dir.path()).unwrap();

    let second = wait_for_report(&mut state, |r| r.items_loaded == 1).await;
    assert!(second.generation > first.generation);
    assert!(catalog.ready());
    assert_eq!(listing(&catalog), vec!["GOLD_INGOT"]);
    assert!(catalog.get("IRON_SWORD").is_none());
    assert!(catalog.all_recipes().is_empty());

    // Readers holding the old listing keep a consistent view.
    assert_eq!(before.len(), 6);
    task.abort();
}

#[tokio::test]
async fn failed_reload_keeps_published_catalog() {
    let dir = repository();
    let store = Arc::new(load_store(dir.path()).unwrap());
    let coordinator = ImportCoordinator::new(store.clone(), Catalog::new());
    coordinator.import_when_ready().await.unwrap();

    fs::write(dir.path().join("items.json"), "{ not json").unwrap();
    assert!(reload_store(&store, dir.path()).is_err());

    let snapshot = store.current().unwrap();
    coordinator.import_snapshot(&snapshot);
    assert_eq!(coordinator.catalog().all().len(), 6);
}

#[test]
fn snapshot_files_with_no_recipes_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("items.json"), ITEMS_JSON).unwrap();
    let snapshot = load_snapshot(Path::new(dir.path())).unwrap();
    assert_eq!(snapshot.items.len(), 8);
    assert_eq!(snapshot.recipe_count(), 1);
}
