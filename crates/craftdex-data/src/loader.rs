//! Reading an item repository from disk.
//!
//! A repository directory holds a required `items` file and an optional
//! `recipes` file. Each may be RON, TOML or JSON, but only one format per
//! base name.

use craftdex_core::raw::{
    RawItem, RawRecipe, RawSnapshot, RecipeRelation, RecordKind, RejectedRecord,
};
use craftdex_core::store::MemoryStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::schema::RecipeGroupData;

/// Why a repository or configuration file could not be read.
///
/// These are file-level failures. A single record that does not decode is
/// not an error here; it travels in [`RawSnapshot::rejected`].
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required file (by base name) is absent from the directory.
    #[error("no '{file}' file in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The extension is not one of `ron`, `toml` or `json`.
    #[error("{file}: expected a .ron, .toml or .json extension")]
    UnsupportedFormat { file: PathBuf },

    /// Both `items.ron` and `items.json` (say) exist; neither is preferred.
    #[error("ambiguous data file: both {a} and {b} exist")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file is not well-formed, or is not a list of records.
    #[error("{file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// Reading the file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataLoadError {
    fn parse(file: &Path, detail: impl std::fmt::Display) -> Self {
        DataLoadError::Parse {
            file: file.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

/// Serialization format of a data file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Probe order when searching a directory.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Format::ALL
            .into_iter()
            .find(|f| Some(f.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn decode<T: DeserializeOwned>(self, text: &str, path: &Path) -> Result<T, DataLoadError> {
        match self {
            Format::Ron => ron::from_str(text).map_err(|e| DataLoadError::parse(path, e)),
            Format::Toml => toml::from_str(text).map_err(|e| DataLoadError::parse(path, e)),
            Format::Json => serde_json::from_str(text).map_err(|e| DataLoadError::parse(path, e)),
        }
    }
}

/// Path of `{base}.{ron,toml,json}` in `dir`, if exactly one exists.
pub fn locate(dir: &Path, base: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{base}.{}", f.extension())))
        .filter(|p| p.is_file());

    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

pub fn locate_required(dir: &Path, base: &str) -> Result<PathBuf, DataLoadError> {
    locate(dir, base)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// Read and decode a whole file.
pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    format.decode(&std::fs::read_to_string(path)?, path)
}

/// Read a record list as one untyped tree per record, so each record can
/// be decoded on its own. TOML has no top-level arrays, so there the list
/// is the array of tables under `key`; RON and JSON files are the list
/// itself.
pub fn read_records(path: &Path, key: &str) -> Result<Vec<Value>, DataLoadError> {
    if Format::of(path)? != Format::Toml {
        return read_file(path);
    }

    let mut table: toml::Table = read_file(path)?;
    let records = table
        .remove(key)
        .ok_or_else(|| DataLoadError::parse(path, format!("no [[{key}]] tables")))?;
    records
        .try_into()
        .map_err(|e: toml::de::Error| DataLoadError::parse(path, e))
}

/// Key under which a record that failed to decode is reported: its `id`
/// if that is a string, else its position in the file.
fn record_key(value: &Value, index: usize) -> String {
    match value.get("id") {
        Some(Value::String(id)) => id.clone(),
        _ => format!("#{index}"),
    }
}

/// Take the `recipes` array out of a record before decoding the rest, so a
/// bad recipe only costs itself.
fn take_recipes(record: &mut Value) -> Option<Value> {
    record.as_object_mut()?.remove("recipes")
}

fn decode_recipes(
    owner: &str,
    recipes: Option<Value>,
    rejected: &mut Vec<RejectedRecord>,
) -> Vec<RawRecipe> {
    let reject = |reason: String| RejectedRecord {
        kind: RecordKind::Recipe,
        key: owner.to_string(),
        reason,
    };
    let list = match recipes {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(list)) => list,
        Some(other) => {
            rejected.push(reject(format!("recipes is not a list: {other}")));
            return Vec::new();
        }
    };

    let mut decoded = Vec::with_capacity(list.len());
    for value in list {
        match serde_json::from_value::<RawRecipe>(value) {
            Ok(recipe) => decoded.push(recipe),
            Err(e) => rejected.push(reject(e.to_string())),
        }
    }
    decoded
}

fn decode_items(records: Vec<Value>, rejected: &mut Vec<RejectedRecord>) -> Vec<RawItem> {
    let mut items = Vec::with_capacity(records.len());
    for (index, mut record) in records.into_iter().enumerate() {
        let key = record_key(&record, index);
        let recipes = take_recipes(&mut record);
        match serde_json::from_value::<RawItem>(record) {
            Ok(mut item) => {
                item.recipes = decode_recipes(&key, recipes, rejected);
                items.push(item);
            }
            Err(e) => rejected.push(RejectedRecord {
                kind: RecordKind::Item,
                key,
                reason: e.to_string(),
            }),
        }
    }
    items
}

fn decode_groups(
    records: Vec<Value>,
    relation: &mut RecipeRelation,
    rejected: &mut Vec<RejectedRecord>,
) {
    for (index, mut record) in records.into_iter().enumerate() {
        let key = record_key(&record, index);
        let recipes = take_recipes(&mut record);
        match serde_json::from_value::<RecipeGroupData>(record) {
            Ok(group) => {
                let decoded = decode_recipes(&group.id, recipes, rejected);
                relation.entry(group.id).or_default().extend(decoded);
            }
            Err(e) => rejected.push(RejectedRecord {
                kind: RecordKind::Recipe,
                key,
                reason: e.to_string(),
            }),
        }
    }
}

/// Read a repository directory into a [`RawSnapshot`].
///
/// Recipes embedded in item records are filed under their owning item;
/// groups from an optional `recipes` file are appended under their ids.
/// Records that do not decode are listed in [`RawSnapshot::rejected`]
/// and everything else is kept.
pub fn load_snapshot(dir: &Path) -> Result<RawSnapshot, DataLoadError> {
    let mut rejected = Vec::new();

    let items_path = locate_required(dir, "items")?;
    let items = decode_items(read_records(&items_path, "items")?, &mut rejected);
    let mut snapshot = RawSnapshot::from_items(items);

    if let Some(recipes_path) = locate(dir, "recipes")? {
        let groups = read_records(&recipes_path, "recipes")?;
        decode_groups(groups, &mut snapshot.recipes, &mut rejected);
    }

    tracing::debug!(
        dir = %dir.display(),
        items = snapshot.items.len(),
        recipes = snapshot.recipe_count(),
        rejected = rejected.len(),
        "repository files read"
    );
    snapshot.rejected = rejected;
    Ok(snapshot)
}

/// Read a repository directory and publish it into a fresh store.
pub fn load_store(dir: &Path) -> Result<MemoryStore, DataLoadError> {
    Ok(MemoryStore::with_snapshot(load_snapshot(dir)?))
}

/// Re-read a repository directory and publish it into `store`, triggering
/// a re-import in any coordinator following the store. On error the store
/// keeps its previous snapshot.
pub fn reload_store(store: &MemoryStore, dir: &Path) -> Result<(), DataLoadError> {
    store.publish(load_snapshot(dir)?);
    Ok(())
}
