use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::ddragon::Locale;
use crate::{Result, RouletteError};

pub const CHAMPION_FILE: &str = "champion.json";
pub const ITEM_FILE: &str = "item.json";
pub const RUNE_FILE: &str = "runesReforged.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Champion {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
    pub tags: BTreeSet<String>,
    pub map_availability: BTreeMap<String, bool>,
    /// `None` when the catalog does not restrict the item by game mode.
    pub mode_availability: Option<BTreeSet<String>>,
    pub purchasable: bool,
    pub in_store: bool,
    pub is_consumed_on_use: bool,
    pub builds_into: Vec<String>,
    pub cost_total: i64,
    pub description: String,
    pub required_champion: Option<String>,
    pub required_ally: Option<String>,
    pub special_recipe: Option<i64>,
    pub hide_from_all: bool,
}

impl Item {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Items without an entry for the map are treated as available.
    pub fn is_available_on_map(&self, map_id: &str) -> bool {
        self.map_availability.get(map_id).copied().unwrap_or(true)
    }

    pub fn is_available_in_mode(&self, mode: &str) -> bool {
        match &self.mode_availability {
            Some(modes) => modes.contains(mode),
            None => true,
        }
    }

    pub fn is_buyable(&self) -> bool {
        self.in_store && self.purchasable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rune {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuneSlot {
    pub runes: Vec<Rune>,
}

/// A rune path. Slot 0 holds the keystones, the rest are minor slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuneStyle {
    pub id: String,
    pub display_name: String,
    pub icon_ref: String,
    pub slots: Vec<RuneSlot>,
}

impl RuneStyle {
    pub fn keystones(&self) -> &[Rune] {
        self.slots
            .first()
            .map(|slot| slot.runes.as_slice())
            .unwrap_or(&[])
    }

    pub fn minor_slots(&self) -> &[RuneSlot] {
        self.slots.get(1..).unwrap_or(&[])
    }
}

// Data Dragon schemas. Only the fields the engine reads are declared.

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Num(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Deserialize, Default)]
struct RawImage {
    #[serde(default)]
    full: String,
}

#[derive(Deserialize)]
struct RawChampionFile {
    #[serde(default)]
    data: BTreeMap<String, RawChampion>,
}

#[derive(Deserialize)]
struct RawChampion {
    id: String,
    name: String,
    #[serde(default)]
    image: RawImage,
}

#[derive(Deserialize)]
struct RawItemFile {
    #[serde(default)]
    data: BTreeMap<String, RawItem>,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize)]
struct RawGold {
    #[serde(default)]
    total: i64,
    #[serde(default = "default_true")]
    purchasable: bool,
}

impl Default for RawGold {
    fn default() -> Self {
        Self {
            total: 0,
            purchasable: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: RawImage,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    maps: BTreeMap<String, bool>,
    #[serde(default)]
    modes: Option<Vec<String>>,
    #[serde(default)]
    gold: RawGold,
    #[serde(default)]
    into: Vec<String>,
    #[serde(default)]
    consumed: bool,
    #[serde(default = "default_true")]
    in_store: bool,
    #[serde(default)]
    required_ally: Option<String>,
    #[serde(default)]
    required_champion: Option<String>,
    #[serde(default)]
    special_recipe: Option<i64>,
    #[serde(default)]
    hide_from_all: bool,
}

#[derive(Deserialize)]
struct RawRuneStyle {
    id: RawId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    slots: Vec<RawRuneSlot>,
}

#[derive(Deserialize)]
struct RawRuneSlot {
    #[serde(default)]
    runes: Vec<RawRune>,
}

#[derive(Deserialize)]
struct RawRune {
    id: RawId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    icon: String,
}

fn normalize_item(id: String, raw: RawItem) -> Item {
    Item {
        id,
        display_name: raw.name,
        icon_ref: raw.image.full,
        tags: raw.tags.into_iter().collect(),
        map_availability: raw.maps,
        mode_availability: raw.modes.map(|modes| modes.into_iter().collect()),
        purchasable: raw.gold.purchasable,
        in_store: raw.in_store,
        is_consumed_on_use: raw.consumed,
        builds_into: raw.into,
        cost_total: raw.gold.total,
        description: raw.description,
        required_champion: raw.required_champion.filter(|c| !c.is_empty()),
        required_ally: raw.required_ally.filter(|a| !a.is_empty()),
        special_recipe: raw.special_recipe.filter(|r| *r != 0),
        hide_from_all: raw.hide_from_all,
    }
}

fn normalize_rune_style(raw: RawRuneStyle) -> RuneStyle {
    RuneStyle {
        id: raw.id.into(),
        display_name: raw.name,
        icon_ref: raw.icon,
        slots: raw
            .slots
            .into_iter()
            .map(|slot| RuneSlot {
                runes: slot
                    .runes
                    .into_iter()
                    .map(|rune| Rune {
                        id: rune.id.into(),
                        display_name: rune.name,
                        icon_ref: rune.icon,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Read-only snapshot of champions, items and rune styles.
///
/// A catalog is only ever replaced wholesale; nothing mutates one after it
/// has been built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    champions: Vec<Champion>,
    items: BTreeMap<String, Item>,
    rune_styles: Vec<RuneStyle>,
}

impl Catalog {
    pub fn new(
        mut champions: Vec<Champion>,
        items: impl IntoIterator<Item = Item>,
        rune_styles: Vec<RuneStyle>,
    ) -> Self {
        champions.sort_by(|a, b| {
            roster_key(&a.display_name)
                .cmp(&roster_key(&b.display_name))
                .then_with(|| a.display_name.cmp(&b.display_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Self {
            champions,
            items: items.into_iter().map(|item| (item.id.clone(), item)).collect(),
            rune_styles,
        }
    }

    pub fn from_json_strs(champions: &str, items: &str, runes: &str) -> Result<Self> {
        let champion_file: RawChampionFile = serde_json::from_str(champions)?;
        let item_file: RawItemFile = serde_json::from_str(items)?;
        let rune_file: Vec<RawRuneStyle> = serde_json::from_str(runes)?;

        let champions = champion_file
            .data
            .into_values()
            .map(|raw| Champion {
                id: raw.id,
                display_name: raw.name,
                icon_ref: raw.image.full,
            })
            .collect();
        let items = item_file
            .data
            .into_iter()
            .map(|(id, raw)| normalize_item(id, raw));
        let rune_styles = rune_file.into_iter().map(normalize_rune_style).collect();

        Ok(Self::new(champions, items, rune_styles))
    }

    /// Load a Data Dragon dump from `dir`.
    ///
    /// Each file is looked up directly in `dir` first, then under the
    /// locale subfolders Data Dragon tarballs use.
    pub fn load_dir(dir: &Path, locale: Locale) -> Result<Self> {
        if !dir.exists() {
            return Err(RouletteError::Catalog(format!(
                "Catalog directory does not exist: {}",
                dir.display()
            )));
        }

        let code = locale.ddragon_code();
        let locate = |file: &str| -> Result<PathBuf> {
            let candidates = [
                file.to_string(),
                format!("{code}/{file}"),
                format!("data/{code}/{file}"),
            ];
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            find_first_existing(dir, &refs).ok_or_else(|| {
                RouletteError::Catalog(format!(
                    "Could not find {file} under {}",
                    dir.display()
                ))
            })
        };

        let champion_path = locate(CHAMPION_FILE)?;
        let item_path = locate(ITEM_FILE)?;
        let rune_path = locate(RUNE_FILE)?;

        let catalog = Self::from_json_strs(
            &fs::read_to_string(&champion_path)?,
            &fs::read_to_string(&item_path)?,
            &fs::read_to_string(&rune_path)?,
        )?;

        info!(
            dir = %dir.display(),
            locale = code,
            champions = catalog.champions.len(),
            items = catalog.items.len(),
            rune_styles = catalog.rune_styles.len(),
            "loaded catalog"
        );

        Ok(catalog)
    }

    /// Champions sorted by display name, ignoring case and punctuation.
    pub fn champions(&self) -> &[Champion] {
        &self.champions
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn rune_styles(&self) -> &[RuneStyle] {
        &self.rune_styles
    }

    pub fn champion(&self, id: &str) -> Option<&Champion> {
        self.champions.iter().find(|c| c.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn rune_style(&self, id: &str) -> Option<&RuneStyle> {
        self.rune_styles.iter().find(|s| s.id == id)
    }

    /// True once all three collections hold data.
    pub fn is_complete(&self) -> bool {
        !self.champions.is_empty() && !self.items.is_empty() && !self.rune_styles.is_empty()
    }
}

fn join_candidate(base: &Path, candidate: &str) -> PathBuf {
    let mut path = base.to_path_buf();
    for part in candidate.split(['/', '\\']) {
        if !part.is_empty() {
            path.push(part);
        }
    }
    path
}

/// Roster ordering ignores case and punctuation, so `Kai'Sa` sits next to
/// `Kaisa` and `veigar` between `Varus` and `Vel'Koz`.
fn roster_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn find_first_existing(base: &Path, candidates: &[&str]) -> Option<PathBuf> {
    for candidate in candidates {
        let path = join_candidate(base, candidate);
        if path.exists() {
            return Some(path);
        }
    }
    None
}
