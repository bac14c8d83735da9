use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roulette_core::{
    ddragon, share, Archetype, BuildResult, DirLoader, GeneratorSettings, HistoryStore, Locale,
    Result, RouletteError, Session,
};

mod store;

use store::FileStore;

#[derive(Debug, Parser)]
#[command(name = "rift-roulette", version, about = "Random champion, item and rune build generator")]
struct Args {
    /// Directory holding champion.json, item.json and runesReforged.json
    /// (directly or under data/<locale>/).
    #[arg(long, required_unless_present_any = ["show_history", "clear_history"])]
    data_dir: Option<PathBuf>,

    /// UI language: en, ja or ko. Region tags such as ko-KR are accepted.
    #[arg(long, default_value = "en", value_parser = parse_locale)]
    lang: Locale,

    #[arg(long)]
    seed: Option<u64>,

    /// ap, ad, tank, bruiser, random or chaos.
    #[arg(long, default_value = "random")]
    build_type: String,

    /// Champion id to build for, e.g. Ahri or MonkeyKing.
    #[arg(long)]
    champion: Option<String>,

    #[arg(long, default_value_t = false)]
    random_champion: bool,

    #[arg(long, default_value_t = false)]
    support_items: bool,

    #[arg(long, default_value_t = 1)]
    count: usize,

    /// JSON settings file; flags above override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON translation table used for stat shard labels.
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Restore a shared build from its query string or URL.
    #[arg(long, value_name = "QUERY")]
    share: Option<String>,

    #[arg(long, default_value_t = false)]
    show_history: bool,

    #[arg(long, default_value_t = false, conflicts_with = "no_history")]
    clear_history: bool,

    #[arg(long)]
    history_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    no_history: bool,

    /// Print Data Dragon icon URLs next to each entry.
    #[arg(long, default_value_t = false)]
    icons: bool,

    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn parse_locale(tag: &str) -> std::result::Result<Locale, String> {
    let locale = Locale::from_language_tag(tag);
    if tag.to_ascii_lowercase().starts_with(locale.code()) {
        return Ok(locale);
    }
    let supported: Vec<&str> = Locale::ALL.iter().map(Locale::code).collect();
    Err(format!(
        "unsupported language `{tag}`, expected one of: {}",
        supported.join(", ")
    ))
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "roulette_core=debug,roulette_cli=debug"
    } else {
        "roulette_core=info,roulette_cli=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(args: &Args) -> Result<GeneratorSettings> {
    let mut settings = match &args.config {
        Some(path) => GeneratorSettings::from_json_file(path)?,
        None => GeneratorSettings::default(),
    };
    if args.support_items {
        settings.support_item_mode = true;
    }
    if args.random_champion {
        settings.random_champion = true;
    }
    settings.validate()?;
    Ok(settings)
}

fn load_translations(path: Option<&PathBuf>) -> Result<HashMap<String, String>> {
    match path {
        Some(path) => {
            let data = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&data)?)
        }
        None => Ok(HashMap::new()),
    }
}

fn print_build(
    build: &BuildResult,
    settings: &GeneratorSettings,
    translations: &HashMap<String, String>,
    icons: bool,
) {
    let version = settings.ddragon_version.as_str();

    println!(
        "Champion: {} ({})",
        build.champion.display_name, build.champion.id
    );
    if icons {
        println!("  {}", ddragon::champion_icon_url(version, &build.champion.icon_ref));
    }
    println!("Build type: {}", build.archetype);

    println!("Items:");
    if build.items.is_empty() {
        println!("  (none)");
    }
    for (idx, item) in build.items.iter().enumerate() {
        println!("  {}. {} [{}]", idx + 1, item.display_name, item.id);
        if icons {
            println!("     {}", ddragon::item_icon_url(version, &item.icon_ref));
        }
    }

    match &build.runes {
        Some(page) => {
            println!(
                "Runes: {} / {}",
                page.primary_style.display_name, page.secondary_style.display_name
            );
            println!("  Keystone: {}", page.keystone.display_name);
            if icons {
                println!("    {}", ddragon::rune_icon_url(&page.keystone.icon_ref));
            }
            for rune in &page.primary_minor_runes {
                println!("  Primary: {}", rune.display_name);
            }
            for rune in &page.secondary_runes {
                println!("  Secondary: {}", rune.display_name);
            }
            let shards: Vec<String> = page
                .shards()
                .iter()
                .map(|shard| shard.label(|key| translations.get(key).cloned()))
                .collect();
            println!("  Shards: {}", shards.join(", "));
        }
        None => println!("Runes: (unavailable)"),
    }

    println!("Share: ?{}", share::encode(build));
}

fn print_history(history: &HistoryStore) {
    if history.is_empty() {
        println!("No builds in history.");
        return;
    }
    println!("History ({}/{}):", history.len(), history.capacity());
    for (idx, entry) in history.list().enumerate() {
        println!(
            "{:>2}. {}  {} ({})  ?{}",
            idx + 1,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.build.champion.display_name,
            entry.build.archetype,
            share::encode(&entry.build),
        );
    }
}

fn run(args: Args) -> Result<()> {
    let settings = load_settings(&args)?;
    let translations = load_translations(args.translations.as_ref())?;

    let mut store = if args.no_history {
        None
    } else {
        let dir = args
            .history_dir
            .clone()
            .or_else(FileStore::default_dir)
            .ok_or_else(|| {
                RouletteError::Config("Could not determine a history directory".to_string())
            })?;
        Some(FileStore::new(dir))
    };

    let history = match &store {
        Some(store) => HistoryStore::load(store, settings.history_capacity),
        None => HistoryStore::with_capacity(settings.history_capacity),
    };

    if args.clear_history {
        let mut history = history;
        history.clear();
        if let Some(store) = store.as_mut() {
            history.save(store)?;
        }
        println!("History cleared.");
        return Ok(());
    }

    if args.show_history {
        print_history(&history);
        return Ok(());
    }

    let data_dir = args.data_dir.clone().ok_or_else(|| {
        RouletteError::Config("--data-dir is required to generate builds".to_string())
    })?;
    let loader = DirLoader::new(data_dir);

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen::<u64>());
    info!(seed, "starting generator");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut session = Session::with_history(settings.clone(), history);
    session.set_locale(args.lang);

    if let Some(query) = &args.share {
        match session.open_share(&loader, query, &mut rng)? {
            Some(build) => print_build(&build, &settings, &translations, args.icons),
            None => {
                return Err(RouletteError::Share(
                    "shared champion is not in the catalog".to_string(),
                ))
            }
        }
    } else {
        session.ensure_loaded(&loader)?;
        if let Some(champion) = &args.champion {
            if !session.select_champion(champion) {
                return Err(RouletteError::Config(format!(
                    "Unknown champion id: {champion}"
                )));
            }
        }

        let archetype = Archetype::from_token(&args.build_type);
        for idx in 0..args.count.max(1) {
            if idx > 0 {
                println!();
            }
            match session.generate(&loader, archetype, &mut rng)? {
                Some(build) => print_build(&build, &settings, &translations, args.icons),
                None => {
                    return Err(RouletteError::Catalog(
                        "catalog has no champions to build for".to_string(),
                    ))
                }
            }
        }
    }

    if let Some(store) = store.as_mut() {
        session.history().save(store)?;
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.debug);

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
