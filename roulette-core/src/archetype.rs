use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use crate::catalog::Item;
use crate::items::{is_boots, ItemPools};
use crate::sampler::{pick_distinct, pick_one};

pub const MAX_ITEMS: usize = 6;
pub const MAIN_ITEM_COUNT: usize = 5;

/// Requested build category.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Ap,
    Ad,
    Tank,
    Bruiser,
    Random,
    Chaos,
}

pub const CONCRETE_ARCHETYPES: [Archetype; 4] =
    [Archetype::Ap, Archetype::Ad, Archetype::Tank, Archetype::Bruiser];

impl Archetype {
    /// Parse a build-type token. Unknown tokens behave like `chaos`.
    pub fn from_token(token: &str) -> Archetype {
        match token.trim().to_ascii_lowercase().as_str() {
            "ap" => Archetype::Ap,
            "ad" => Archetype::Ad,
            "tank" => Archetype::Tank,
            "bruiser" => Archetype::Bruiser,
            "random" => Archetype::Random,
            _ => Archetype::Chaos,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Archetype::Ap => "ap",
            Archetype::Ad => "ad",
            Archetype::Tank => "tank",
            Archetype::Bruiser => "bruiser",
            Archetype::Random => "random",
            Archetype::Chaos => "chaos",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Turn a `random` request into one of the four role archetypes.
///
/// This is the only place `random` is expanded, and it happens exactly
/// once; every other archetype passes through untouched.
pub fn resolve_archetype<R: Rng + ?Sized>(requested: Archetype, rng: &mut R) -> Archetype {
    match requested {
        Archetype::Random => {
            let picked = pick_one(rng, &CONCRETE_ARCHETYPES)
                .copied()
                .unwrap_or(Archetype::Chaos);
            debug!(archetype = %picked, "resolved random archetype");
            picked
        }
        other => other,
    }
}

/// Item pool for an already resolved archetype, falling back to `any`
/// when the role pool is empty.
pub fn pool_for(pools: &ItemPools, archetype: Archetype) -> &[Item] {
    let role_pool = match archetype {
        Archetype::Ap => &pools.ap,
        Archetype::Ad => &pools.ad,
        Archetype::Tank => &pools.tank,
        Archetype::Bruiser => &pools.bruiser,
        Archetype::Random | Archetype::Chaos => return &pools.any,
    };

    if role_pool.is_empty() {
        debug!(archetype = %archetype, "role pool empty, falling back to any");
        &pools.any
    } else {
        role_pool
    }
}

fn dedup_by_id(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// One standard boots (when any exist) plus up to five distinct items from
/// the archetype's pool.
pub fn pick_items<R: Rng + ?Sized>(pools: &ItemPools, archetype: Archetype, rng: &mut R) -> Vec<Item> {
    let mut items = pick_distinct(rng, &pools.boots, 1);

    let main_pool: Vec<Item> = pool_for(pools, archetype)
        .iter()
        .filter(|item| !is_boots(item))
        .cloned()
        .collect();
    items.extend(pick_distinct(rng, &main_pool, MAIN_ITEM_COUNT));

    dedup_by_id(items)
}

/// Swap one support item into an assembled list.
///
/// A full list loses its last slot to the support item; a shorter list gets
/// it appended. The boots slot is never replaced. Lists that already carry
/// the chosen item come back unchanged.
pub fn apply_support_override<R: Rng + ?Sized>(
    mut items: Vec<Item>,
    support_pool: &[Item],
    rng: &mut R,
) -> Vec<Item> {
    let Some(support) = pick_one(rng, support_pool) else {
        return items;
    };
    if items.iter().any(|item| item.id == support.id) {
        return items;
    }

    if items.len() >= MAX_ITEMS {
        items.truncate(MAX_ITEMS);
        if let Some(last) = items.last_mut() {
            *last = support.clone();
        }
    } else {
        items.push(support.clone());
    }

    dedup_by_id(items)
}
