use tracing::debug;

use crate::catalog::{Catalog, Item};
use crate::GeneratorSettings;

pub const TAG_BOOTS: &str = "Boots";

const AP_TAGS: &[&str] = &["SpellDamage"];
const AD_TAGS: &[&str] = &["Damage", "AttackDamage"];
const TANK_TAGS: &[&str] = &["Health", "Armor", "SpellBlock"];

// Consumables, trinkets and wards never count as build items.
const NON_BUILD_TAGS: &[&str] = &["Consumable", "Trinket", "Vision"];

/// Tier-two boots. Symbiotic Soles and other specialty boots are left out.
pub const STANDARD_BOOTS: &[&str] = &[
    "3006", // Berserker's Greaves
    "3009", // Boots of Swiftness
    "3020", // Sorcerer's Shoes
    "3047", // Plated Steelcaps
    "3111", // Mercury's Treads
    "3158", // Ionian Boots of Lucidity
];

/// Completed support quest items.
pub const SUPPORT_ITEMS: &[&str] = &[
    "3869", // Celestial Opposition
    "3870", // Dream Maker
    "3871", // Zaz'Zak's Realmspike
    "3876", // Solstice Sleigh
    "3877", // Bloodsong
];

/// Event and mode-only items that the catalog flags do not filter out.
pub const EXCLUDED_NAME_KEYWORDS: &[&str] = &["Anvil", "Guardian's", "Prototype", "Placeholder"];

fn has_any_tag(item: &Item, tags: &[&str]) -> bool {
    tags.iter().any(|tag| item.has_tag(tag))
}

pub fn is_boots(item: &Item) -> bool {
    item.has_tag(TAG_BOOTS)
}

pub fn is_standard_boots(item: &Item, settings: &GeneratorSettings) -> bool {
    is_boots(item)
        && settings.standard_boots.iter().any(|id| *id == item.id)
        && item.is_available_on_map(&settings.map_id)
        && item.is_buyable()
}

fn name_is_excluded(item: &Item, settings: &GeneratorSettings) -> bool {
    let name = item.display_name.to_lowercase();
    settings
        .excluded_name_keywords
        .iter()
        .filter(|kw| !kw.is_empty())
        .any(|kw| name.contains(&kw.to_lowercase()))
}

/// Whether a non-boots item is a finished, generally buyable build item.
pub fn is_completed_item(item: &Item, settings: &GeneratorSettings) -> bool {
    if !item.is_available_on_map(&settings.map_id) || !item.is_available_in_mode(&settings.game_mode)
    {
        return false;
    }
    if !item.is_buyable() || item.hide_from_all {
        return false;
    }
    if item.is_consumed_on_use || has_any_tag(item, NON_BUILD_TAGS) {
        return false;
    }
    // Components still upgrade into something.
    if !item.builds_into.is_empty() {
        return false;
    }
    if item.required_champion.is_some()
        || item.required_ally.is_some()
        || item.special_recipe.is_some()
    {
        return false;
    }
    !name_is_excluded(item, settings)
}

/// Item catalog partitioned into overlapping role pools.
///
/// Boots live only in `boots`. Every other pool is a subset of `any`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPools {
    pub boots: Vec<Item>,
    pub ap: Vec<Item>,
    pub ad: Vec<Item>,
    pub tank: Vec<Item>,
    pub bruiser: Vec<Item>,
    pub any: Vec<Item>,
    /// Support items present in the catalog, used by the support override.
    pub support: Vec<Item>,
}

impl ItemPools {
    pub fn classify(catalog: &Catalog, settings: &GeneratorSettings) -> Self {
        let mut pools = Self::from_items(catalog.items(), settings);
        pools.support = settings
            .support_items
            .iter()
            .filter_map(|id| catalog.item(id))
            .cloned()
            .collect();
        pools
    }

    pub fn from_items<'a>(
        items: impl IntoIterator<Item = &'a Item>,
        settings: &GeneratorSettings,
    ) -> Self {
        let mut pools = Self::default();

        for item in items {
            if is_boots(item) {
                if is_standard_boots(item, settings) {
                    pools.boots.push(item.clone());
                }
                continue;
            }

            if !is_completed_item(item, settings) {
                continue;
            }

            let has_ap = has_any_tag(item, AP_TAGS);
            let has_ad = has_any_tag(item, AD_TAGS);
            let has_tank = has_any_tag(item, TANK_TAGS);

            if has_ap {
                pools.ap.push(item.clone());
            }
            if has_ad {
                pools.ad.push(item.clone());
            }
            if has_tank {
                pools.tank.push(item.clone());
            }
            if (has_ap || has_ad) && has_tank {
                pools.bruiser.push(item.clone());
            }
            pools.any.push(item.clone());
        }

        debug!(
            boots = pools.boots.len(),
            ap = pools.ap.len(),
            ad = pools.ad.len(),
            tank = pools.tank.len(),
            bruiser = pools.bruiser.len(),
            any = pools.any.len(),
            "classified item pools"
        );

        pools
    }
}
