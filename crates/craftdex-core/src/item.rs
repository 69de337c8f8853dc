use crate::config::WikiConfig;
use crate::id::ItemId;
use crate::raw::RawItem;
use serde::{Deserialize, Serialize};

/// Display payload carried by an item. Opaque to the index; immutable once
/// the item is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDisplay {
    pub name: String,
    pub material: String,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
}

/// A validated catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    display: ItemDisplay,
}

impl Item {
    pub fn new(id: ItemId, display: ItemDisplay) -> Self {
        Self { id, display }
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Family key derived from the identifier.
    pub fn family(&self) -> &str {
        self.id.family()
    }

    pub fn display(&self) -> &ItemDisplay {
        &self.display
    }

    /// The item's page on the configured wiki, if one of its first two
    /// info links points there.
    pub fn wiki_link(&self, wiki: &WikiConfig) -> Option<&str> {
        let domain = wiki.domain();
        self.display
            .info
            .iter()
            .take(2)
            .map(String::as_str)
            .find(|link| link.starts_with(domain))
    }
}

/// Why a raw item record could not be turned into an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemBuildError {
    #[error("record has no identifier")]
    MissingId,
    #[error("invalid identifier '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },
    #[error("item '{id}' has no display name")]
    MissingDisplayName { id: String },
    #[error("item '{id}' has no material")]
    MissingMaterial { id: String },
    #[error("duplicate identifier '{id}'")]
    Duplicate { id: String },
}

impl ItemBuildError {
    /// The offending identifier, when the record had one.
    pub fn id(&self) -> Option<&str> {
        match self {
            ItemBuildError::MissingId => None,
            ItemBuildError::InvalidId { id, .. }
            | ItemBuildError::MissingDisplayName { id }
            | ItemBuildError::MissingMaterial { id }
            | ItemBuildError::Duplicate { id } => Some(id),
        }
    }
}

/// Build an [`Item`] from one raw record. Pure; never panics.
pub fn build_item(raw: &RawItem) -> Result<Item, ItemBuildError> {
    let id = raw.id.as_deref().map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(ItemBuildError::MissingId);
    }
    if let Some(reason) = invalid_id_reason(id) {
        return Err(ItemBuildError::InvalidId {
            id: id.to_string(),
            reason,
        });
    }

    let name = match raw.display_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            return Err(ItemBuildError::MissingDisplayName { id: id.to_string() });
        }
    };
    let material = match raw.material.as_deref() {
        Some(material) if !material.trim().is_empty() => material.to_string(),
        _ => return Err(ItemBuildError::MissingMaterial { id: id.to_string() }),
    };

    Ok(Item::new(
        ItemId::new(id),
        ItemDisplay {
            name,
            material,
            lore: raw.lore.clone(),
            info: raw.info.clone(),
        },
    ))
}

fn invalid_id_reason(id: &str) -> Option<&'static str> {
    if id.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if id.chars().any(char::is_control) {
        Some("contains control characters")
    } else {
        None
    }
}
