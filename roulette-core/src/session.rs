use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::archetype::Archetype;
use crate::build::{generate_build, BuildContext, BuildRequest, BuildResult};
use crate::catalog::{Catalog, Champion};
use crate::ddragon::Locale;
use crate::history::HistoryStore;
use crate::items::ItemPools;
use crate::share::ShareToken;
use crate::{share, GeneratorSettings, Result};

/// Where the catalog comes from. Implementations own all I/O.
pub trait CatalogLoader {
    fn load(&self, locale: Locale) -> Result<Catalog>;
}

/// Loads a Data Dragon dump from a local directory.
#[derive(Debug, Clone)]
pub struct DirLoader {
    root: PathBuf,
}

impl DirLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CatalogLoader for DirLoader {
    fn load(&self, locale: Locale) -> Result<Catalog> {
        Catalog::load_dir(&self.root, locale)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Status {
    Idle,
    Loading,
    Ready,
    Generating,
    Error,
}

impl Status {
    /// Translation key for the status line.
    pub fn i18n_key(&self) -> Option<&'static str> {
        match self {
            Status::Idle => None,
            Status::Loading => Some("msg_loading"),
            Status::Ready => Some("msg_ready"),
            Status::Generating => Some("msg_generating"),
            Status::Error => Some("msg_error"),
        }
    }
}

/// Sequence stamp for one generation request.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Ticket(u64);

struct LoadedCatalog {
    catalog: Arc<Catalog>,
    pools: ItemPools,
}

/// Owns the state one user session works against: the catalog snapshot,
/// the pinned champion, the current build and the history.
///
/// Only the result of the most recently issued request may become the
/// current build. Late completions of older requests are dropped.
pub struct Session {
    settings: GeneratorSettings,
    locale: Locale,
    loaded: Option<LoadedCatalog>,
    selected_champion: Option<String>,
    current: Option<BuildResult>,
    history: HistoryStore,
    status: Status,
    last_ticket: u64,
}

impl Session {
    pub fn new(settings: GeneratorSettings) -> Self {
        let history = HistoryStore::with_capacity(settings.history_capacity);
        Self::with_history(settings, history)
    }

    pub fn with_history(settings: GeneratorSettings, history: HistoryStore) -> Self {
        Self {
            settings,
            locale: Locale::default(),
            loaded: None,
            selected_champion: None,
            current: None,
            history,
            status: Status::Idle,
            last_ticket: 0,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.loaded.as_ref().map(|loaded| Arc::clone(&loaded.catalog))
    }

    pub fn current(&self) -> Option<&BuildResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn selected_champion(&self) -> Option<&str> {
        self.selected_champion.as_deref()
    }

    /// Switching language invalidates the catalog, since names come
    /// localized from the data files.
    pub fn set_locale(&mut self, locale: Locale) {
        if locale != self.locale {
            self.locale = locale;
            self.loaded = None;
            self.status = Status::Idle;
        }
    }

    /// Replace the catalog wholesale and reclassify its items.
    pub fn install_catalog(&mut self, catalog: Catalog) {
        let pools = ItemPools::classify(&catalog, &self.settings);
        self.loaded = Some(LoadedCatalog {
            catalog: Arc::new(catalog),
            pools,
        });
        if let Some(id) = self.selected_champion.clone() {
            if !self.select_champion(&id) {
                self.selected_champion = None;
            }
        }
        self.status = Status::Ready;
    }

    /// Load the catalog unless one is already installed. A failed load is
    /// not retried.
    pub fn ensure_loaded(&mut self, loader: &dyn CatalogLoader) -> Result<()> {
        if self.loaded.is_some() {
            return Ok(());
        }

        self.status = Status::Loading;
        match loader.load(self.locale) {
            Ok(catalog) => {
                info!(locale = %self.locale, "catalog ready");
                self.install_catalog(catalog);
                Ok(())
            }
            Err(err) => {
                self.status = Status::Error;
                Err(err)
            }
        }
    }

    /// Pin a champion for later builds. Returns false if the id is unknown
    /// or no catalog is loaded.
    pub fn select_champion(&mut self, id: &str) -> bool {
        let known = self
            .loaded
            .as_ref()
            .is_some_and(|loaded| loaded.catalog.champion(id).is_some());
        if known {
            self.selected_champion = Some(id.to_string());
        }
        known
    }

    pub fn pick_random_champion<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Champion> {
        let loaded = self.loaded.as_ref()?;
        let mut ctx = BuildContext::new(&loaded.catalog, &loaded.pools, &self.settings, rng);
        let champion = ctx.random_champion()?;
        self.selected_champion = Some(champion.id.clone());
        Some(champion)
    }

    pub fn begin_request(&mut self) -> Ticket {
        self.last_ticket += 1;
        Ticket(self.last_ticket)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.last_ticket
    }

    /// Publish a finished build. Builds from superseded requests are
    /// discarded and `false` is returned.
    pub fn complete(&mut self, ticket: Ticket, build: BuildResult) -> bool {
        if !self.is_latest(ticket) {
            warn!(
                ticket = ticket.0,
                latest = self.last_ticket,
                "discarding stale build"
            );
            return false;
        }

        self.history.record(build.clone());
        self.current = Some(build);
        self.status = Status::Ready;
        true
    }

    /// Build against the installed catalog without loading. `None` when no
    /// catalog is installed or it has no champions.
    pub fn build_now<R: Rng + ?Sized>(&mut self, archetype: Archetype, rng: &mut R) -> Option<BuildResult> {
        let loaded = self.loaded.as_ref()?;
        self.status = Status::Generating;

        let mut request = BuildRequest::new(archetype);
        request.champion_id = self.selected_champion.clone();

        let mut ctx = BuildContext::new(&loaded.catalog, &loaded.pools, &self.settings, rng);
        let build = generate_build(&mut ctx, &request);

        // An unpinned build pins its champion, unless every build rolls one.
        if let Some(build) = &build {
            if self.selected_champion.is_none() && !self.settings.random_champion {
                self.selected_champion = Some(build.champion.id.clone());
            }
        }
        self.status = Status::Ready;
        build
    }

    /// Generate a build, loading the catalog first if needed, and make it
    /// current.
    pub fn generate<R: Rng + ?Sized>(
        &mut self,
        loader: &dyn CatalogLoader,
        archetype: Archetype,
        rng: &mut R,
    ) -> Result<Option<BuildResult>> {
        let ticket = self.begin_request();
        self.ensure_loaded(loader)?;

        let Some(build) = self.build_now(archetype, rng) else {
            return Ok(None);
        };
        if self.complete(ticket, build.clone()) {
            Ok(Some(build))
        } else {
            Ok(None)
        }
    }

    /// Restore a shared build and make it current.
    pub fn open_share<R: Rng + ?Sized>(
        &mut self,
        loader: &dyn CatalogLoader,
        input: &str,
        rng: &mut R,
    ) -> Result<Option<BuildResult>> {
        let token = ShareToken::parse(input)?;
        let ticket = self.begin_request();
        self.ensure_loaded(loader)?;

        let Some(loaded) = self.loaded.as_ref() else {
            return Ok(None);
        };
        let mut ctx = BuildContext::new(&loaded.catalog, &loaded.pools, &self.settings, rng);
        let Some(build) = share::decode(&token, &mut ctx) else {
            return Ok(None);
        };

        self.selected_champion = Some(build.champion.id.clone());
        if self.complete(ticket, build.clone()) {
            Ok(Some(build))
        } else {
            Ok(None)
        }
    }
}
