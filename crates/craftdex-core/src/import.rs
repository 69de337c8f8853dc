//! Import coordinator: the only writer into a [`Catalog`].
//!
//! # Lifecycle
//!
//! ```text
//! Idle --(store publishes)--> Loading --(both indices loaded)--> Ready
//!                               |                                  |
//!                               +--(store closed)--> Failed        |
//!                                                                   |
//! Ready --(store publishes again)--> Loading --> Ready   (re-import)
//! ```
//!
//! A pass builds every item and classifies every recipe without holding
//! any lock, then publishes the recipe index and the item index together
//! under the coordinator's writer lock. Publishing the item index raises
//! the readiness latch, so a reader that sees `ready()` also sees the
//! recipes of the same pass. Bad records are logged and counted, never
//! fatal.
//!
//! Overlapping passes are not cancelled. The last pass to finish wins, and
//! it replaces both indices whole. Passes numbered before a
//! [`ImportCoordinator::reset`] are discarded when they finish.

use crate::catalog::Catalog;
use crate::config::ImportConfig;
use crate::id::ItemId;
use crate::item::{Item, ItemBuildError, build_item};
use crate::item_index::ItemSnapshot;
use crate::raw::{RawItem, RawSnapshot, RecordKind, RejectedRecord};
use crate::recipe_index::{RecipeFailure, RecipeSnapshot};
use crate::store::RawRecordStore;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Counters for one completed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub generation: u64,
    pub items_loaded: usize,
    pub item_failures: usize,
    pub recipes_indexed: usize,
    pub recipe_failures: usize,
    pub recipes_unrecognized: usize,
}

/// Coordinator state, observable through [`ImportCoordinator::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportState {
    Idle,
    Loading { generation: u64 },
    Ready(ImportReport),
    /// The pass could not run. Whatever was published before stays usable.
    Failed { generation: u64, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("upstream store closed before publishing any data")]
    UpstreamClosed,
}

/// Drives raw records from a [`RawRecordStore`] into a [`Catalog`].
pub struct ImportCoordinator {
    store: Arc<dyn RawRecordStore>,
    catalog: Catalog,
    config: ImportConfig,
    state: watch::Sender<ImportState>,
    generation: AtomicU64,
    /// Writer lock over both indices. Holds the highest generation that
    /// was numbered before the last reset; such passes never publish.
    fence: Mutex<u64>,
}

impl std::fmt::Debug for ImportCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportCoordinator")
            .field("catalog", &self.catalog)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl ImportCoordinator {
    pub fn new(store: Arc<dyn RawRecordStore>, catalog: Catalog) -> Self {
        Self::with_config(store, catalog, ImportConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn RawRecordStore>,
        catalog: Catalog,
        config: ImportConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            config,
            state: watch::Sender::new(ImportState::Idle),
            generation: AtomicU64::new(0),
            fence: Mutex::new(0),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> ImportState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.state.subscribe()
    }

    /// Wait for the store's first publication, then run one pass over it.
    pub async fn import_when_ready(&self) -> Result<ImportReport, ImportError> {
        let mut rx = self.store.subscribe();
        let published = rx.wait_for(Option::is_some).await.map(|s| s.clone());
        match published {
            Ok(Some(snapshot)) => Ok(self.import_snapshot(&snapshot)),
            _ => {
                self.fail(ImportError::UpstreamClosed);
                Err(ImportError::UpstreamClosed)
            }
        }
    }

    /// Run one full pass over `snapshot` and publish the result. The report
    /// describes the pass even when a reset discarded it;
    /// [`ImportCoordinator::state`] only ever shows published passes.
    pub fn import_snapshot(&self, snapshot: &RawSnapshot) -> ImportReport {
        let generation = self.begin();
        tracing::debug!(
            generation,
            raw_items = snapshot.items.len(),
            raw_recipes = snapshot.recipe_count(),
            rejected = snapshot.rejected.len(),
            "import pass started"
        );

        let mut failures = FailureLog::new(generation, self.config.max_logged_failures);
        for record in &snapshot.rejected {
            failures.rejected(record);
        }
        let items = ItemSnapshot::build(build_items(&snapshot.items, &mut failures));
        let (recipes, rebuilt) = RecipeSnapshot::build(&snapshot.recipes);
        for failure in &rebuilt.failures {
            failures.recipe(failure);
        }
        failures.finish();

        let report = ImportReport {
            generation,
            items_loaded: items.len(),
            item_failures: failures.items,
            recipes_indexed: rebuilt.indexed,
            recipe_failures: failures.recipes,
            recipes_unrecognized: rebuilt.unrecognized,
        };

        let fence = self.fence.lock();
        if generation <= *fence {
            tracing::debug!(generation, "discarding import pass started before a reset");
            return report;
        }
        self.catalog.recipes().publish(recipes);
        self.catalog.items().publish(items);
        self.state.send_replace(ImportState::Ready(report.clone()));
        drop(fence);

        tracing::info!(
            generation,
            items = report.items_loaded,
            item_failures = report.item_failures,
            recipes = report.recipes_indexed,
            recipe_failures = report.recipe_failures,
            unrecognized = report.recipes_unrecognized,
            "item repository imported"
        );
        report
    }

    /// Start a background task that imports the store's current snapshot
    /// and re-imports on every later publication. The task ends when the
    /// store closes its channel.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut rx = self.store.subscribe();
            loop {
                let published = rx.borrow_and_update().clone();
                if let Some(snapshot) = published {
                    let this = Arc::clone(&self);
                    let pass =
                        tokio::task::spawn_blocking(move || this.import_snapshot(&snapshot));
                    if let Err(err) = pass.await {
                        tracing::error!(error = %err, "import pass panicked");
                    }
                }
                if rx.changed().await.is_err() {
                    if matches!(self.state(), ImportState::Idle) {
                        self.fail(ImportError::UpstreamClosed);
                    }
                    tracing::debug!("upstream store closed; import task exiting");
                    break;
                }
            }
        })
    }

    /// Drop everything published so far and lower the readiness latch.
    /// The next pass starts from an empty catalog.
    /// Passes already running when this is called are discarded.
    pub fn reset(&self) {
        let mut fence = self.fence.lock();
        *fence = self.generation.load(Ordering::Relaxed);
        self.catalog.recipes().clear();
        self.catalog.items().clear();
        self.state.send_replace(ImportState::Idle);
        drop(fence);
        tracing::debug!("catalog reset");
    }

    /// Number a new pass and announce it. Runs under the writer lock, so
    /// state updates follow generation order.
    fn begin(&self) -> u64 {
        let _fence = self.fence.lock();
        let generation = self.next_generation();
        self.state.send_replace(ImportState::Loading { generation });
        generation
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn fail(&self, err: ImportError) {
        let _fence = self.fence.lock();
        let generation = self.next_generation();
        tracing::warn!(generation, error = %err, "import pass did not run");
        self.state.send_replace(ImportState::Failed {
            generation,
            reason: err.to_string(),
        });
    }
}

/// Build every raw item in input order. Failures and repeated ids are
/// recorded in `failures` and skipped.
fn build_items(raw: &[RawItem], failures: &mut FailureLog) -> Vec<Item> {
    #[cfg(feature = "parallel")]
    let built: Vec<Result<Item, ItemBuildError>> = {
        use rayon::prelude::*;
        raw.par_iter().map(build_item).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let built: Vec<Result<Item, ItemBuildError>> = raw.iter().map(build_item).collect();

    let mut seen: HashSet<ItemId> = HashSet::with_capacity(built.len());
    let mut items = Vec::with_capacity(built.len());
    for result in built {
        match result {
            Ok(item) => {
                if seen.insert(item.id().clone()) {
                    items.push(item);
                } else {
                    failures.item(&ItemBuildError::Duplicate {
                        id: item.id().to_string(),
                    });
                }
            }
            Err(err) => failures.item(&err),
        }
    }
    items
}

/// Logs record failures up to a cap, then only counts them.
struct FailureLog {
    generation: u64,
    cap: usize,
    items: usize,
    recipes: usize,
}

impl FailureLog {
    fn new(generation: u64, cap: usize) -> Self {
        Self {
            generation,
            cap,
            items: 0,
            recipes: 0,
        }
    }

    fn logged(&self) -> usize {
        self.items + self.recipes
    }

    fn item(&mut self, err: &ItemBuildError) {
        if self.logged() < self.cap {
            tracing::warn!(
                generation = self.generation,
                item_id = err.id().unwrap_or("<none>"),
                reason = %err,
                "skipping malformed item record"
            );
        }
        self.items += 1;
    }

    fn rejected(&mut self, record: &RejectedRecord) {
        if self.logged() < self.cap {
            tracing::warn!(
                generation = self.generation,
                item_id = %record.key,
                kind = ?record.kind,
                reason = %record.reason,
                "skipping undecodable record"
            );
        }
        match record.kind {
            RecordKind::Item => self.items += 1,
            RecordKind::Recipe => self.recipes += 1,
        }
    }

    fn recipe(&mut self, failure: &RecipeFailure) {
        if self.logged() < self.cap {
            tracing::warn!(
                generation = self.generation,
                item_id = %failure.key,
                reason = %failure.error,
                "skipping malformed recipe record"
            );
        }
        self.recipes += 1;
    }

    fn finish(&self) {
        let suppressed = self.logged().saturating_sub(self.cap);
        if suppressed > 0 {
            tracing::warn!(
                generation = self.generation,
                suppressed,
                "further malformed records were skipped without logging"
            );
        }
    }
}
