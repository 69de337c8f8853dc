use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Identifies an item in the catalog. Cheap to clone and compare.
///
/// Upstream identifiers look like `ENCHANTED_IRON`, `APPLE_1` or `PET;4`.
/// Lookups by `&str` work directly against maps keyed by `ItemId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Arc<str>);

impl ItemId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The family this identifier belongs to. See [`family_key`].
    pub fn family(&self) -> &str {
        family_key(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Strip a numbered-variant suffix from an identifier.
///
/// Removes the trailing run of ASCII digits together with the single
/// character in front of it, so `APPLE_1` and `PET;4` collapse onto
/// `APPLE` and `PET`. An identifier made only of digits collapses to the
/// empty string when it has at least two of them; a lone digit has no
/// preceding character to consume and is returned unchanged.
pub fn family_key(id: &str) -> &str {
    let stem = id.trim_end_matches(|c: char| c.is_ascii_digit());
    if stem.len() == id.len() {
        return id;
    }
    match stem.char_indices().next_back() {
        Some((idx, _)) => &id[..idx],
        // All digits: the first digit plays the part of the separator.
        None if id.len() >= 2 => "",
        None => id,
    }
}

/// Canonical listing order: family key, then identifier length, then the
/// identifier itself. Total over distinct identifiers.
pub fn canonical_cmp(lhs: &str, rhs: &str) -> Ordering {
    family_key(lhs)
        .cmp(family_key(rhs))
        .then_with(|| lhs.len().cmp(&rhs.len()))
        .then_with(|| lhs.cmp(rhs))
}
