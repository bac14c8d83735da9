use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::archetype::{apply_support_override, pick_items, resolve_archetype, Archetype};
use crate::catalog::{Catalog, Champion, Item};
use crate::items::ItemPools;
use crate::runes::{generate_rune_page, RunePage};
use crate::sampler::pick_one;
use crate::GeneratorSettings;

/// One generated build. Never contains the `random` archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildResult {
    pub champion: Champion,
    pub archetype: Archetype,
    pub items: Vec<Item>,
    /// `None` when the catalog had no usable rune data.
    pub runes: Option<RunePage>,
    pub created_at: DateTime<Utc>,
}

impl BuildResult {
    pub fn item_ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Pinned champion. Ignored when `random_champion` is set in the
    /// settings or when the id is not in the catalog.
    pub champion_id: Option<String>,
    pub archetype: Archetype,
}

impl BuildRequest {
    pub fn new(archetype: Archetype) -> Self {
        Self {
            champion_id: None,
            archetype,
        }
    }

    pub fn with_champion(mut self, champion_id: impl Into<String>) -> Self {
        self.champion_id = Some(champion_id.into());
        self
    }
}

/// Everything one generation call reads: a catalog snapshot, its
/// pre-classified pools, the settings and the random source.
pub struct BuildContext<'a, R: Rng + ?Sized> {
    pub catalog: &'a Catalog,
    pub pools: &'a ItemPools,
    pub settings: &'a GeneratorSettings,
    pub rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> BuildContext<'a, R> {
    pub fn new(
        catalog: &'a Catalog,
        pools: &'a ItemPools,
        settings: &'a GeneratorSettings,
        rng: &'a mut R,
    ) -> Self {
        Self {
            catalog,
            pools,
            settings,
            rng,
        }
    }

    pub fn random_champion(&mut self) -> Option<Champion> {
        pick_one(&mut *self.rng, self.catalog.champions()).cloned()
    }

    fn choose_champion(&mut self, pinned: Option<&str>) -> Option<Champion> {
        if !self.settings.random_champion {
            if let Some(id) = pinned {
                match self.catalog.champion(id) {
                    Some(champion) => return Some(champion.clone()),
                    None => warn!(champion = id, "pinned champion not in catalog, picking at random"),
                }
            }
        }
        self.random_champion()
    }

    /// Items for an already resolved archetype, with the support override
    /// applied when enabled.
    pub fn items_for(&mut self, archetype: Archetype) -> Vec<Item> {
        let items = pick_items(self.pools, archetype, &mut *self.rng);
        if self.settings.support_item_mode {
            apply_support_override(items, &self.pools.support, &mut *self.rng)
        } else {
            items
        }
    }

    pub fn rune_page(&mut self) -> Option<RunePage> {
        generate_rune_page(self.catalog.rune_styles(), &mut *self.rng)
    }
}

/// Assemble a full build for `request`.
///
/// Returns `None` only when the catalog has no champions at all.
pub fn generate_build<R: Rng + ?Sized>(
    ctx: &mut BuildContext<'_, R>,
    request: &BuildRequest,
) -> Option<BuildResult> {
    generate_build_at(ctx, request, Utc::now())
}

pub fn generate_build_at<R: Rng + ?Sized>(
    ctx: &mut BuildContext<'_, R>,
    request: &BuildRequest,
    now: DateTime<Utc>,
) -> Option<BuildResult> {
    let champion = ctx.choose_champion(request.champion_id.as_deref())?;
    let archetype = resolve_archetype(request.archetype, &mut *ctx.rng);
    let items = ctx.items_for(archetype);
    let runes = ctx.rune_page();

    debug!(
        champion = %champion.id,
        archetype = %archetype,
        items = items.len(),
        runes = runes.is_some(),
        "generated build"
    );

    Some(BuildResult {
        champion,
        archetype,
        items,
        runes,
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::{CONCRETE_ARCHETYPES, MAX_ITEMS};
    use crate::items::is_boots;
    use crate::test_support::{rng, sample_catalog};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn generate(settings: &GeneratorSettings, request: &BuildRequest, seed: u64) -> Option<BuildResult> {
        let catalog = sample_catalog();
        let pools = ItemPools::classify(&catalog, settings);
        let mut rng = rng(seed);
        let mut ctx = BuildContext::new(&catalog, &pools, settings, &mut rng);
        generate_build(&mut ctx, request)
    }

    proptest! {
        #[test]
        fn builds_hold_their_invariants(seed in any::<u64>(), token in "ap|ad|tank|bruiser|random|chaos|bogus") {
            let settings = GeneratorSettings::default();
            let request = BuildRequest::new(Archetype::from_token(&token));
            let build = generate(&settings, &request, seed).unwrap();

            prop_assert!(build.items.len() <= MAX_ITEMS);
            let ids: HashSet<_> = build.items.iter().map(|i| i.id.as_str()).collect();
            prop_assert_eq!(ids.len(), build.items.len());
            prop_assert_ne!(build.archetype, Archetype::Random);
            if request.archetype == Archetype::Random {
                prop_assert!(CONCRETE_ARCHETYPES.contains(&build.archetype));
            }
            let boots = build.items.iter().filter(|i| is_boots(i)).count();
            prop_assert_eq!(boots, 1);
            prop_assert!(build.runes.is_some());
        }
    }

    #[test]
    fn pinned_champion_is_used() {
        let request = BuildRequest::new(Archetype::Ap).with_champion("Ahri");
        for seed in 0..10 {
            let build = generate(&GeneratorSettings::default(), &request, seed).unwrap();
            assert_eq!(build.champion.id, "Ahri");
            assert_eq!(build.archetype, Archetype::Ap);
        }
    }

    #[test]
    fn random_champion_mode_ignores_the_pin() {
        let settings = GeneratorSettings {
            random_champion: true,
            ..GeneratorSettings::default()
        };
        let request = BuildRequest::new(Archetype::Chaos).with_champion("Ahri");
        let champions: HashSet<String> = (0..40)
            .map(|seed| generate(&settings, &request, seed).unwrap().champion.id)
            .collect();
        assert!(champions.len() > 1);
    }

    #[test]
    fn unknown_pin_falls_back_to_the_roster() {
        let request = BuildRequest::new(Archetype::Tank).with_champion("Teemo");
        let build = generate(&GeneratorSettings::default(), &request, 1).unwrap();
        assert!(["Ahri", "Garen", "Jinx", "MonkeyKing"].contains(&build.champion.id.as_str()));
    }

    #[test]
    fn support_mode_places_a_support_item() {
        let settings = GeneratorSettings {
            support_item_mode: true,
            ..GeneratorSettings::default()
        };
        for seed in 0..20 {
            let build = generate(&settings, &BuildRequest::new(Archetype::Ad), seed).unwrap();
            assert!(build.item_ids().iter().any(|id| *id == "3869" || *id == "3870"));
        }
    }

    #[test]
    fn empty_catalog_has_nothing_to_build() {
        let catalog = Catalog::default();
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(0);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);
        assert!(generate_build(&mut ctx, &BuildRequest::new(Archetype::Random)).is_none());
    }

    #[test]
    fn catalog_without_runes_still_builds() {
        let full = sample_catalog();
        let catalog = Catalog::new(full.champions().to_vec(), full.items().cloned(), Vec::new());
        let settings = GeneratorSettings::default();
        let pools = ItemPools::classify(&catalog, &settings);
        let mut rng = rng(2);
        let mut ctx = BuildContext::new(&catalog, &pools, &settings, &mut rng);
        let build = generate_build(&mut ctx, &BuildRequest::new(Archetype::Bruiser)).unwrap();
        assert!(build.runes.is_none());
        assert!(!build.items.is_empty());
    }
}
