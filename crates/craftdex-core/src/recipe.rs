//! Recipe variants and classification of raw recipe records.
//!
//! The upstream repository tags each recipe with a free-form kind. Only a
//! closed set of kinds is modelled; [`classify`] maps everything else to
//! [`Classified::Unrecognized`], which callers drop without complaint.

use crate::id::ItemId;
use crate::raw::RawRecipe;
use serde::Serialize;

/// Slots in a crafting grid.
pub const GRID_SLOTS: usize = 9;

/// An item reference with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ingredient {
    pub item: ItemId,
    pub count: u32,
}

impl Ingredient {
    pub fn new(item: impl Into<ItemId>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
        }
    }
}

/// 3x3 grid of ingredient references producing one output stack.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CraftingRecipe {
    /// Row-major; `None` is an empty slot.
    pub grid: [Option<Ingredient>; GRID_SLOTS],
    pub output: Ingredient,
}

/// Timed forge process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ForgeRecipe {
    pub inputs: Vec<Ingredient>,
    pub duration_secs: u64,
    pub output: Ingredient,
}

/// An item dropped by a mob.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MobDropRecipe {
    pub mob: String,
    pub level: Option<u32>,
    pub drop: Ingredient,
    pub chance: Option<String>,
}

/// The closed set of recipe shapes the catalog understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RecipeVariant {
    Crafting(CraftingRecipe),
    Forge(ForgeRecipe),
    MobDrop(MobDropRecipe),
}

impl RecipeVariant {
    pub fn kind(&self) -> RecipeKind {
        match self {
            RecipeVariant::Crafting(_) => RecipeKind::Crafting,
            RecipeVariant::Forge(_) => RecipeKind::Forge,
            RecipeVariant::MobDrop(_) => RecipeKind::MobDrop,
        }
    }

    /// What the recipe produces.
    pub fn output(&self) -> &Ingredient {
        match self {
            RecipeVariant::Crafting(r) => &r.output,
            RecipeVariant::Forge(r) => &r.output,
            RecipeVariant::MobDrop(r) => &r.drop,
        }
    }

    /// Distinct consumed item ids, in first-appearance order.
    pub fn input_ids(&self) -> Vec<&ItemId> {
        let mut ids: Vec<&ItemId> = Vec::new();
        let inputs: Box<dyn Iterator<Item = &Ingredient> + '_> = match self {
            RecipeVariant::Crafting(r) => Box::new(r.grid.iter().flatten()),
            RecipeVariant::Forge(r) => Box::new(r.inputs.iter()),
            RecipeVariant::MobDrop(_) => Box::new(std::iter::empty()),
        };
        for ingredient in inputs {
            if !ids.contains(&&ingredient.item) {
                ids.push(&ingredient.item);
            }
        }
        ids
    }
}

/// Recipe kinds recognised in the upstream `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeKind {
    Crafting,
    Forge,
    MobDrop,
}

impl RecipeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "crafting" => Some(RecipeKind::Crafting),
            "forge" => Some(RecipeKind::Forge),
            "drops" | "mob_drop" => Some(RecipeKind::MobDrop),
            _ => None,
        }
    }
}

/// Result of classifying one raw recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Recipe(RecipeVariant),
    /// A kind this catalog does not model. Not an error.
    Unrecognized,
}

/// A recipe record of a known kind that is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    #[error("{kind:?} recipe has no output")]
    MissingOutput { kind: RecipeKind },
    #[error("invalid ingredient reference '{reference}': {reason}")]
    InvalidIngredient {
        reference: String,
        reason: &'static str,
    },
    #[error("crafting grid has {slots} slots, at most 9 allowed")]
    GridTooLarge { slots: usize },
    #[error("crafting grid has no ingredients")]
    EmptyGrid,
    #[error("forge recipe has no inputs")]
    MissingInputs,
    #[error("forge recipe has no duration")]
    MissingDuration,
    #[error("mob drop recipe names no mob")]
    MissingMob,
}

/// Parse an upstream `"ID"` or `"ID:count"` reference.
pub fn parse_ingredient(reference: &str) -> Result<Ingredient, RecipeError> {
    let invalid = |reason| RecipeError::InvalidIngredient {
        reference: reference.to_string(),
        reason,
    };
    let (id, count) = match reference.rsplit_once(':') {
        Some((id, count)) => {
            let count: u32 = count.trim().parse().map_err(|_| invalid("count is not a number"))?;
            (id, count)
        }
        None => (reference, 1),
    };
    let id = id.trim();
    if id.is_empty() {
        return Err(invalid("empty item id"));
    }
    if count == 0 {
        return Err(invalid("count is zero"));
    }
    Ok(Ingredient::new(id, count))
}

/// Classify one raw recipe record.
pub fn classify(raw: &RawRecipe) -> Result<Classified, RecipeError> {
    let Some(kind) = raw.kind.as_deref().and_then(RecipeKind::from_tag) else {
        return Ok(Classified::Unrecognized);
    };
    let variant = match kind {
        RecipeKind::Crafting => RecipeVariant::Crafting(crafting(raw)?),
        RecipeKind::Forge => RecipeVariant::Forge(forge(raw)?),
        RecipeKind::MobDrop => RecipeVariant::MobDrop(mob_drop(raw)?),
    };
    Ok(Classified::Recipe(variant))
}

fn output(raw: &RawRecipe, kind: RecipeKind) -> Result<Ingredient, RecipeError> {
    let reference = raw
        .output
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(RecipeError::MissingOutput { kind })?;
    let mut ingredient = parse_ingredient(reference)?;
    if !reference.contains(':') {
        if let Some(count) = raw.count.filter(|&c| c > 0) {
            ingredient.count = count;
        }
    }
    Ok(ingredient)
}

fn crafting(raw: &RawRecipe) -> Result<CraftingRecipe, RecipeError> {
    let slots = raw.grid.as_deref().unwrap_or_default();
    if slots.len() > GRID_SLOTS {
        return Err(RecipeError::GridTooLarge { slots: slots.len() });
    }
    let mut grid: [Option<Ingredient>; GRID_SLOTS] = Default::default();
    for (cell, slot) in grid.iter_mut().zip(slots) {
        if !slot.trim().is_empty() {
            *cell = Some(parse_ingredient(slot)?);
        }
    }
    if grid.iter().all(Option::is_none) {
        return Err(RecipeError::EmptyGrid);
    }
    Ok(CraftingRecipe {
        grid,
        output: output(raw, RecipeKind::Crafting)?,
    })
}

fn forge(raw: &RawRecipe) -> Result<ForgeRecipe, RecipeError> {
    let inputs = raw
        .inputs
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|s| parse_ingredient(s))
        .collect::<Result<Vec<_>, _>>()?;
    if inputs.is_empty() {
        return Err(RecipeError::MissingInputs);
    }
    Ok(ForgeRecipe {
        inputs,
        duration_secs: raw.duration.ok_or(RecipeError::MissingDuration)?,
        output: output(raw, RecipeKind::Forge)?,
    })
}

fn mob_drop(raw: &RawRecipe) -> Result<MobDropRecipe, RecipeError> {
    let mob = raw
        .mob
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(RecipeError::MissingMob)?;
    Ok(MobDropRecipe {
        mob: mob.to_string(),
        level: raw.level,
        drop: output(raw, RecipeKind::MobDrop)?,
        chance: raw.chance.clone(),
    })
}
