use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Rune, RuneStyle};
use crate::sampler::{pick_distinct, pick_one};

pub const SECONDARY_RUNE_COUNT: usize = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShardCategory {
    Offense,
    Flex,
    Defense,
}

struct ShardDef {
    id: &'static str,
    icon: &'static str,
    key: &'static str,
    fallback: &'static str,
}

const OFFENSE_SHARDS: [ShardDef; 3] = [
    ShardDef {
        id: "5008",
        icon: "perk-images/StatMods/StatModsAdaptiveForceIcon.png",
        key: "shard_adaptive_force",
        fallback: "Adaptive Force",
    },
    ShardDef {
        id: "5005",
        icon: "perk-images/StatMods/StatModsAttackSpeedIcon.png",
        key: "shard_attack_speed",
        fallback: "Attack Speed",
    },
    ShardDef {
        id: "5007",
        icon: "perk-images/StatMods/StatModsCDRScalingIcon.png",
        key: "shard_ability_haste",
        fallback: "Ability Haste",
    },
];

const FLEX_SHARDS: [ShardDef; 3] = [
    ShardDef {
        id: "5008",
        icon: "perk-images/StatMods/StatModsAdaptiveForceIcon.png",
        key: "shard_adaptive_force",
        fallback: "Adaptive Force",
    },
    ShardDef {
        id: "5010",
        icon: "perk-images/StatMods/StatModsMovementSpeedIcon.png",
        key: "shard_move_speed",
        fallback: "Move Speed",
    },
    ShardDef {
        id: "5001",
        icon: "perk-images/StatMods/StatModsHealthScalingIcon.png",
        key: "shard_health_scaling",
        fallback: "Health Scaling",
    },
];

const DEFENSE_SHARDS: [ShardDef; 3] = [
    ShardDef {
        id: "5011",
        icon: "perk-images/StatMods/StatModsHealthPlusIcon.png",
        key: "shard_health",
        fallback: "Health",
    },
    ShardDef {
        id: "5013",
        icon: "perk-images/StatMods/StatModsTenacityIcon.png",
        key: "shard_tenacity",
        fallback: "Tenacity and Slow Resist",
    },
    ShardDef {
        id: "5001",
        icon: "perk-images/StatMods/StatModsHealthScalingIcon.png",
        key: "shard_health_scaling",
        fallback: "Health Scaling",
    },
];

impl ShardCategory {
    pub const ALL: [ShardCategory; 3] =
        [ShardCategory::Offense, ShardCategory::Flex, ShardCategory::Defense];

    fn table(&self) -> &'static [ShardDef; 3] {
        match self {
            ShardCategory::Offense => &OFFENSE_SHARDS,
            ShardCategory::Flex => &FLEX_SHARDS,
            ShardCategory::Defense => &DEFENSE_SHARDS,
        }
    }

    /// The fixed three-entry table for this category.
    pub fn shards(&self) -> Vec<StatShard> {
        self.table().iter().map(StatShard::from_def).collect()
    }

    pub fn shard(&self, id: &str) -> Option<StatShard> {
        self.table()
            .iter()
            .find(|def| def.id == id)
            .map(StatShard::from_def)
    }

    fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> StatShard {
        let idx = rng.gen_range(0..self.table().len());
        StatShard::from_def(&self.table()[idx])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatShard {
    pub id: String,
    pub icon_ref: String,
    pub display_name_key: String,
    pub fallback_name: String,
}

impl StatShard {
    fn from_def(def: &ShardDef) -> Self {
        Self {
            id: def.id.to_string(),
            icon_ref: def.icon.to_string(),
            display_name_key: def.key.to_string(),
            fallback_name: def.fallback.to_string(),
        }
    }

    /// Localized label, or the English fallback when `translate` has no
    /// entry for the key.
    pub fn label<F>(&self, translate: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        translate(&self.display_name_key).unwrap_or_else(|| self.fallback_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunePage {
    pub primary_style: RuneStyle,
    pub secondary_style: RuneStyle,
    pub keystone: Rune,
    pub primary_minor_runes: Vec<Rune>,
    pub secondary_runes: Vec<Rune>,
    pub offense_shard: StatShard,
    pub flex_shard: StatShard,
    pub defense_shard: StatShard,
}

impl RunePage {
    pub fn shards(&self) -> [&StatShard; 3] {
        [&self.offense_shard, &self.flex_shard, &self.defense_shard]
    }
}

/// Style and keystone ids carried by a share string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunePins {
    pub primary_style: String,
    pub secondary_style: String,
    pub keystone: String,
}

impl From<&RunePage> for RunePins {
    fn from(page: &RunePage) -> Self {
        Self {
            primary_style: page.primary_style.id.clone(),
            secondary_style: page.secondary_style.id.clone(),
            keystone: page.keystone.id.clone(),
        }
    }
}

fn fill_page<R: Rng + ?Sized>(
    primary: &RuneStyle,
    keystone: &Rune,
    secondary: &RuneStyle,
    rng: &mut R,
) -> RunePage {
    // Empty minor slots are skipped rather than padded.
    let primary_minor_runes: Vec<Rune> = primary
        .minor_slots()
        .iter()
        .filter_map(|slot| pick_one(rng, &slot.runes).cloned())
        .collect();

    // The secondary keystone slot is never eligible.
    let candidates: Vec<Rune> = secondary
        .minor_slots()
        .iter()
        .flat_map(|slot| slot.runes.iter().cloned())
        .collect();
    let secondary_runes = pick_distinct(rng, &candidates, SECONDARY_RUNE_COUNT);

    RunePage {
        primary_style: primary.clone(),
        secondary_style: secondary.clone(),
        keystone: keystone.clone(),
        primary_minor_runes,
        secondary_runes,
        offense_shard: ShardCategory::Offense.pick(rng),
        flex_shard: ShardCategory::Flex.pick(rng),
        defense_shard: ShardCategory::Defense.pick(rng),
    }
}

/// Build a random two-style rune page.
///
/// Returns `None` when there is no style with keystones or no second style
/// to pair it with; callers skip rune output in that case.
pub fn generate_rune_page<R: Rng + ?Sized>(styles: &[RuneStyle], rng: &mut R) -> Option<RunePage> {
    let primaries: Vec<&RuneStyle> = styles.iter().filter(|s| !s.keystones().is_empty()).collect();
    let primary = *pick_one(rng, &primaries)?;
    let keystone = pick_one(rng, primary.keystones())?;

    let secondaries: Vec<&RuneStyle> = styles.iter().filter(|s| s.id != primary.id).collect();
    let Some(secondary) = pick_one(rng, &secondaries).copied() else {
        debug!(primary = %primary.id, "no secondary style available");
        return None;
    };

    Some(fill_page(primary, keystone, secondary, rng))
}

/// Rebuild a page around shared style and keystone ids.
///
/// Minor runes and shards are drawn fresh. If the pins no longer describe
/// a valid page in `styles` the whole page is regenerated.
pub fn restore_rune_page<R: Rng + ?Sized>(
    styles: &[RuneStyle],
    pins: &RunePins,
    rng: &mut R,
) -> Option<RunePage> {
    let pinned = styles
        .iter()
        .find(|s| s.id == pins.primary_style)
        .and_then(|primary| {
            let keystone = primary.keystones().iter().find(|r| r.id == pins.keystone)?;
            let secondary = styles
                .iter()
                .find(|s| s.id == pins.secondary_style && s.id != primary.id)?;
            Some((primary, keystone, secondary))
        });

    match pinned {
        Some((primary, keystone, secondary)) => Some(fill_page(primary, keystone, secondary, rng)),
        None => {
            debug!(
                primary = %pins.primary_style,
                secondary = %pins.secondary_style,
                keystone = %pins.keystone,
                "shared rune ids do not resolve, regenerating page"
            );
            generate_rune_page(styles, rng)
        }
    }
}
