use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

pub mod archetype;
pub mod build;
pub mod catalog;
pub mod ddragon;
pub mod history;
pub mod items;
pub mod runes;
pub mod sampler;
pub mod session;
pub mod share;

#[cfg(test)]
pub(crate) mod test_support;

pub use archetype::Archetype;
pub use build::{generate_build, BuildContext, BuildRequest, BuildResult};
pub use catalog::{Catalog, Champion, Item, Rune, RuneSlot, RuneStyle};
pub use ddragon::Locale;
pub use history::{HistoryEntry, HistoryStore, KeyValueStore, MemoryStore};
pub use items::ItemPools;
pub use runes::{generate_rune_page, RunePage, ShardCategory, StatShard};
pub use session::{CatalogLoader, DirLoader, Session, Status, Ticket};
pub use share::ShareToken;

#[derive(Debug, Error)]
pub enum RouletteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("share string error: {0}")]
    Share(String),
}

pub type Result<T> = std::result::Result<T, RouletteError>;

/// Knobs for item classification and build assembly.
///
/// Every field has a default, so a settings file only needs to name the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Map items and boots must be available on. `11` is Summoner's Rift.
    pub map_id: String,
    pub game_mode: String,
    pub ddragon_version: String,
    /// Tier-two boots eligible for the boots slot.
    pub standard_boots: Vec<String>,
    /// Case-insensitive substrings that hide an item by display name.
    pub excluded_name_keywords: Vec<String>,
    pub support_items: Vec<String>,
    pub support_item_mode: bool,
    pub random_champion: bool,
    pub history_capacity: usize,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            map_id: "11".to_string(),
            game_mode: "CLASSIC".to_string(),
            ddragon_version: ddragon::DEFAULT_DDRAGON_VERSION.to_string(),
            standard_boots: items::STANDARD_BOOTS.iter().map(|id| id.to_string()).collect(),
            excluded_name_keywords: items::EXCLUDED_NAME_KEYWORDS
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
            support_items: items::SUPPORT_ITEMS.iter().map(|id| id.to_string()).collect(),
            support_item_mode: false,
            random_champion: false,
            history_capacity: history::DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl GeneratorSettings {
    pub fn from_json_str(data: &str) -> Result<Self> {
        let settings: GeneratorSettings = serde_json::from_str(data)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RouletteError::Config(format!(
                "Settings file does not exist: {}",
                path.display()
            )));
        }
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.map_id.trim().is_empty() {
            return Err(RouletteError::Config("map_id must not be empty".to_string()));
        }
        if self.history_capacity == 0 {
            return Err(RouletteError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_file_keeps_defaults() {
        let settings =
            GeneratorSettings::from_json_str(r#"{ "support_item_mode": true }"#).unwrap();
        assert!(settings.support_item_mode);
        assert_eq!(settings.map_id, "11");
        assert_eq!(settings.history_capacity, 10);
        assert!(settings.standard_boots.contains(&"3020".to_string()));
    }

    #[test]
    fn zero_history_capacity_is_rejected() {
        let err = GeneratorSettings::from_json_str(r#"{ "history_capacity": 0 }"#).unwrap_err();
        assert!(matches!(err, RouletteError::Config(_)));
    }

    #[test]
    fn missing_settings_file_is_a_config_error() {
        let err = GeneratorSettings::from_json_file(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(matches!(err, RouletteError::Config(_)));
    }
}
