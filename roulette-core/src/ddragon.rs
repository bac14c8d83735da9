//! Data Dragon addressing: locales, data file URLs and icon URLs.
//!
//! Nothing here performs network I/O. The URLs are handed to whatever
//! fetches the catalog and renders icons.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_DDRAGON_VERSION: &str = "15.23.1";

const DDRAGON_CDN: &str = "https://ddragon.leagueoflegends.com/cdn";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
    Ko,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Ja, Locale::Ko];

    /// Map a UI language tag such as `ko-KR` or `ja` to a supported locale.
    /// Anything unrecognised falls back to English.
    pub fn from_language_tag(tag: &str) -> Locale {
        let short: String = tag.chars().take(2).collect::<String>().to_ascii_lowercase();
        match short.as_str() {
            "ja" => Locale::Ja,
            "ko" => Locale::Ko,
            _ => Locale::En,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ja => "ja",
            Locale::Ko => "ko",
        }
    }

    pub fn ddragon_code(&self) -> &'static str {
        match self {
            Locale::En => "en_US",
            Locale::Ja => "ja_JP",
            Locale::Ko => "ko_KR",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub fn data_url(version: &str, locale: Locale, file: &str) -> String {
    format!("{DDRAGON_CDN}/{version}/data/{}/{file}", locale.ddragon_code())
}

pub fn champion_icon_url(version: &str, icon_ref: &str) -> String {
    format!("{DDRAGON_CDN}/{version}/img/champion/{icon_ref}")
}

pub fn item_icon_url(version: &str, icon_ref: &str) -> String {
    format!("{DDRAGON_CDN}/{version}/img/item/{icon_ref}")
}

/// Rune and stat shard icons are not versioned.
pub fn rune_icon_url(icon_ref: &str) -> String {
    format!("{DDRAGON_CDN}/img/{icon_ref}")
}
