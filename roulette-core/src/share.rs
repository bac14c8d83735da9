//! Share strings: `c=<champion>&t=<archetype>&i=<item,...>&r=<primary,secondary,keystone>`.
//!
//! Only the two styles and the keystone are carried for runes. Decoding
//! draws minor runes and shards again, so a restored page can differ from
//! the shared one below the keystone.

use rand::Rng;
use std::collections::HashSet;
use tracing::warn;
use url::form_urlencoded;

use crate::archetype::{resolve_archetype, Archetype, MAX_ITEMS};
use crate::build::{BuildContext, BuildResult};
use crate::catalog::{Catalog, Item};
use crate::items::{is_boots, is_standard_boots};
use crate::runes::{generate_rune_page, restore_rune_page, RunePins};
use crate::{GeneratorSettings, Result, RouletteError};

const KEY_CHAMPION: &str = "c";
const KEY_ARCHETYPE: &str = "t";
const KEY_ITEMS: &str = "i";
const KEY_RUNES: &str = "r";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareToken {
    pub champion_id: String,
    pub archetype: String,
    pub item_ids: Vec<String>,
    pub runes: Option<RunePins>,
}

fn escape(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

impl ShareToken {
    pub fn from_build(build: &BuildResult) -> Self {
        Self {
            champion_id: build.champion.id.clone(),
            archetype: build.archetype.token().to_string(),
            item_ids: build.items.iter().map(|item| item.id.clone()).collect(),
            runes: build.runes.as_ref().map(RunePins::from),
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = vec![
            format!("{KEY_CHAMPION}={}", escape(&self.champion_id)),
            format!("{KEY_ARCHETYPE}={}", escape(&self.archetype)),
        ];

        let items: Vec<String> = self.item_ids.iter().map(|id| escape(id)).collect();
        parts.push(format!("{KEY_ITEMS}={}", items.join(",")));

        if let Some(pins) = &self.runes {
            parts.push(format!(
                "{KEY_RUNES}={},{},{}",
                escape(&pins.primary_style),
                escape(&pins.secondary_style),
                escape(&pins.keystone)
            ));
        }

        parts.join("&")
    }

    /// Parse a query string. A leading `?` or a full URL is accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let query = match input.split_once('?') {
            Some((_, query)) => query,
            None => input,
        };
        let query = query.split('#').next().unwrap_or_default();

        let mut champion_id = None;
        let mut archetype = None;
        let mut item_ids = Vec::new();
        let mut runes = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                KEY_CHAMPION => champion_id = Some(value.trim().to_string()),
                KEY_ARCHETYPE => archetype = Some(value.trim().to_string()),
                KEY_ITEMS => item_ids = split_list(&value),
                KEY_RUNES => {
                    let ids = split_list(&value);
                    runes = match ids.as_slice() {
                        [primary, secondary, keystone] => Some(RunePins {
                            primary_style: primary.clone(),
                            secondary_style: secondary.clone(),
                            keystone: keystone.clone(),
                        }),
                        _ => {
                            warn!(runes = %value, "ignoring malformed rune ids");
                            None
                        }
                    };
                }
                _ => {}
            }
        }

        let champion_id = champion_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RouletteError::Share("missing champion id".to_string()))?;

        Ok(Self {
            champion_id,
            archetype: archetype.unwrap_or_else(|| Archetype::Random.token().to_string()),
            item_ids,
            runes,
        })
    }
}

/// Resolve shared item ids into a list that a generated build could hold:
/// known ids only, no repeats, at most one standard boots item and no more
/// than `MAX_ITEMS` entries.
fn shared_items(ids: &[String], catalog: &Catalog, settings: &GeneratorSettings) -> Vec<Item> {
    let mut seen = HashSet::new();
    let mut has_boots = false;
    let mut items = Vec::new();

    for id in ids {
        let Some(item) = catalog.item(id) else {
            warn!(item = %id, "dropping unknown shared item");
            continue;
        };
        if !seen.insert(item.id.as_str()) {
            continue;
        }
        if is_boots(item) {
            if has_boots || !is_standard_boots(item, settings) {
                warn!(item = %id, "dropping extra or non-standard shared boots");
                continue;
            }
            has_boots = true;
        }
        if items.len() == MAX_ITEMS {
            warn!(item = %id, "shared build has too many items, truncating");
            break;
        }
        items.push(item.clone());
    }

    items
}

pub fn encode(build: &BuildResult) -> String {
    ShareToken::from_build(build).to_query_string()
}

/// Rebuild a shared build against the live catalog.
///
/// Items are filtered by `shared_items`. An unknown champion gives `None`.
pub fn decode<R: Rng + ?Sized>(token: &ShareToken, ctx: &mut BuildContext<'_, R>) -> Option<BuildResult> {
    let Some(champion) = ctx.catalog.champion(&token.champion_id).cloned() else {
        warn!(champion = %token.champion_id, "shared champion not in catalog");
        return None;
    };

    let archetype = resolve_archetype(Archetype::from_token(&token.archetype), &mut *ctx.rng);

    let items = shared_items(&token.item_ids, ctx.catalog, ctx.settings);

    let styles = ctx.catalog.rune_styles();
    let runes = match &token.runes {
        Some(pins) => restore_rune_page(styles, pins, &mut *ctx.rng),
        None => generate_rune_page(styles, &mut *ctx.rng),
    };

    Some(BuildResult {
        champion,
        archetype,
        items,
        runes,
        created_at: chrono::Utc::now(),
    })
}

pub fn decode_str<R: Rng + ?Sized>(input: &str, ctx: &mut BuildContext<'_, R>) -> Result<Option<BuildResult>> {
    let token = ShareToken::parse(input)?;
    Ok(decode(&token, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{generate_build, BuildRequest};
    use crate::items::ItemPools;
    use crate::test_support::{rng, sample_catalog};
    use std::collections::BTreeSet;

    #[test]
    fn encodes_in_documented_order() {
        let catalog = sample_catalog();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(5);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);
        let mut build = generate_build(&mut ctx, &BuildRequest::new(Archetype::Ap).with_champion("Ahri")).unwrap();
        build.items = ["3020", "3089"].iter().map(|id| catalog.item(id).unwrap().clone()).collect();

        let encoded = encode(&build);
        let pins = RunePins::from(build.runes.as_ref().unwrap());
        assert_eq!(
            encoded,
            format!(
                "c=Ahri&t=ap&i=3020,3089&r={},{},{}",
                pins.primary_style, pins.secondary_style, pins.keystone
            )
        );
    }

    fn boots_count(build: &BuildResult) -> usize {
        build.items.iter().filter(|item| is_boots(item)).count()
    }

    #[test]
    fn round_trip_keeps_champion_archetype_and_items() {
        let catalog = sample_catalog();
        for support_item_mode in [false, true] {
            let settings = GeneratorSettings {
                support_item_mode,
                ..GeneratorSettings::default()
            };
            round_trip(&catalog, &settings);
        }
    }

    fn round_trip(catalog: &Catalog, settings: &GeneratorSettings) {
        let pools = ItemPools::classify(catalog, settings);

        for seed in 0..25 {
            let mut rng = rng(seed);
            let mut ctx = BuildContext::new(catalog, &pools, settings, &mut rng);
            let build = generate_build(&mut ctx, &BuildRequest::new(Archetype::Random)).unwrap();

            let decoded = decode_str(&encode(&build), &mut ctx).unwrap().unwrap();
            assert_eq!(decoded.champion.id, build.champion.id);
            assert_eq!(decoded.archetype, build.archetype);
            let original: BTreeSet<_> = build.item_ids().into_iter().collect();
            let restored: BTreeSet<_> = decoded.item_ids().into_iter().collect();
            assert_eq!(original, restored);
            assert!(decoded.items.len() <= MAX_ITEMS);
            assert_eq!(boots_count(&decoded), 1);
            if settings.support_item_mode {
                assert!(decoded
                    .items
                    .iter()
                    .any(|item| settings.support_items.contains(&item.id)));
            }

            let (before, after) = (build.runes.unwrap(), decoded.runes.unwrap());
            assert_eq!(RunePins::from(&before), RunePins::from(&after));
        }
    }

    #[test]
    fn parse_accepts_urls_and_escapes() {
        let token = ShareToken::parse(
            "https://example.com/?c=Kog%27Maw&t=tank&i=3068,%20,9999&r=8000,8100,8005#top",
        )
        .unwrap();
        assert_eq!(token.champion_id, "Kog'Maw");
        assert_eq!(token.archetype, "tank");
        assert_eq!(token.item_ids, vec!["3068", "9999"]);
        assert_eq!(token.runes.unwrap().keystone, "8005");

        let encoded = ShareToken {
            champion_id: "Kog'Maw".to_string(),
            archetype: "ad".to_string(),
            item_ids: vec!["3031".to_string()],
            runes: None,
        }
        .to_query_string();
        assert_eq!(encoded, "c=Kog%27Maw&t=ad&i=3031");
        assert_eq!(ShareToken::parse(&encoded).unwrap().champion_id, "Kog'Maw");
    }

    #[test]
    fn missing_champion_is_an_error() {
        assert!(matches!(ShareToken::parse("t=ap&i=3020"), Err(RouletteError::Share(_))));
        assert!(matches!(ShareToken::parse("?c=&t=ap"), Err(RouletteError::Share(_))));
    }

    #[test]
    fn decode_drops_unknown_items_and_aborts_on_unknown_champion() {
        let catalog = sample_catalog();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(1);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);

        let build = decode_str("c=Garen&t=tank&i=3047,424242,3068,3068&r=1,2,3", &mut ctx)
            .unwrap()
            .unwrap();
        assert_eq!(build.item_ids(), vec!["3047", "3068"]);
        assert_eq!(build.archetype, Archetype::Tank);
        // Unresolvable rune ids still produce a fresh page.
        assert!(build.runes.is_some());

        assert!(decode_str("c=Teemo&t=ap&i=3020", &mut ctx).unwrap().is_none());
    }

    #[test]
    fn decode_keeps_decoded_items_within_build_limits() {
        let catalog = sample_catalog();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(2);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);

        let build = decode_str(
            "c=Ahri&t=ap&i=1001,3013,3020,3047,3089,3157,3031,6672,3068,2003",
            &mut ctx,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            build.item_ids(),
            vec!["3020", "3089", "3157", "3031", "6672", "3068"]
        );
        assert_eq!(boots_count(&build), 1);
    }

    #[test]
    fn decode_drops_boots_outside_the_whitelist() {
        let catalog = sample_catalog();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(4);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);

        let build = decode_str("c=Garen&t=tank&i=3013,3068,1001", &mut ctx).unwrap().unwrap();
        assert_eq!(build.item_ids(), vec!["3068"]);
    }

    #[test]
    fn random_token_is_resolved_on_decode() {
        let catalog = sample_catalog();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(3);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);

        let build = decode_str("c=Jinx&t=random&i=", &mut ctx).unwrap().unwrap();
        assert_ne!(build.archetype, Archetype::Random);
        assert!(build.items.is_empty());
    }
}
