//! Small Data Dragon shaped fixtures shared by the unit tests.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::items::ItemPools;
use crate::GeneratorSettings;

pub(crate) fn champion_json() -> Value {
    json!({
        "type": "champion",
        "data": {
            "Ahri": { "id": "Ahri", "name": "Ahri", "image": { "full": "Ahri.png" } },
            "Garen": { "id": "Garen", "name": "Garen", "image": { "full": "Garen.png" } },
            "Jinx": { "id": "Jinx", "name": "Jinx", "image": { "full": "Jinx.png" } },
            "MonkeyKing": { "id": "MonkeyKing", "name": "Wukong", "image": { "full": "MonkeyKing.png" } }
        }
    })
}

fn item(name: &str, tags: &[&str], total: i64) -> Value {
    json!({
        "name": name,
        "description": format!("<mainText>{name}</mainText>"),
        "image": { "full": format!("{name}.png") },
        "tags": tags,
        "maps": { "11": true, "12": true },
        "gold": { "base": 0, "total": total, "sell": 0, "purchasable": true }
    })
}

fn with(mut value: Value, key: &str, extra: Value) -> Value {
    value[key] = extra;
    value
}

pub(crate) fn item_json() -> Value {
    json!({
        "type": "item",
        "data": {
            "3020": item("Sorcerer's Shoes", &["Boots", "MagicPenetration"], 1100),
            "3047": item("Plated Steelcaps", &["Boots", "Armor"], 1200),
            "3013": item("Symbiotic Soles", &["Boots"], 900),
            "1001": with(item("Boots", &["Boots"], 300), "into", json!(["3020", "3047"])),
            "3089": item("Rabadon's Deathcap", &["SpellDamage"], 3600),
            "3157": item("Zhonya's Hourglass", &["SpellDamage", "Armor"], 3250),
            "3031": item("Infinity Edge", &["Damage", "CriticalStrike"], 3450),
            "6672": item("Kraken Slayer", &["Damage", "AttackSpeed"], 3100),
            "3068": item("Sunfire Aegis", &["Health", "Armor"], 2700),
            "3065": item("Spirit Visage", &["Health", "SpellBlock"], 2700),
            "3071": item("Black Cleaver", &["Damage", "Health"], 3000),
            "3869": item("Celestial Opposition", &["Health", "GoldPer"], 400),
            "3870": item("Dream Maker", &["Health", "GoldPer"], 400),
            "1052": with(item("Amplifying Tome", &["SpellDamage"], 400), "into", json!(["3089"])),
            "2003": with(item("Health Potion", &["Consumable", "Health"], 50), "consumed", json!(true)),
            "3340": item("Stealth Ward", &["Trinket", "Vision"], 0),
            "3599": with(item("Kalista's Black Spear", &[], 0), "requiredChampion", json!("Kalista")),
            "443000": with(item("Arena Blade", &["Damage"], 2800), "maps", json!({ "11": false, "30": true })),
            "447000": item("Stat Anvil", &["Health"], 0),
            "7050": with(item("Hidden Edge", &["Damage"], 2800), "inStore", json!(false))
        }
    })
}

fn style(id: i64, name: &str, slots: &[&[(i64, &str)]]) -> Value {
    let slots: Vec<Value> = slots
        .iter()
        .map(|runes| {
            let runes: Vec<Value> = runes
                .iter()
                .map(|(id, name)| json!({ "id": id, "key": name, "name": name, "icon": format!("perk-images/{name}.png") }))
                .collect();
            json!({ "runes": runes })
        })
        .collect();
    json!({ "id": id, "key": name, "icon": format!("perk-images/Styles/{name}.png"), "name": name, "slots": slots })
}

pub(crate) fn rune_json() -> Value {
    json!([
        style(8100, "Domination", &[
            &[(8112, "Electrocute"), (8128, "Dark Harvest")],
            &[(8126, "Cheap Shot"), (8139, "Taste of Blood")],
            &[(8136, "Zombie Ward"), (8120, "Ghost Poro")],
            &[(8135, "Treasure Hunter"), (8105, "Relentless Hunter")],
        ]),
        style(8000, "Precision", &[
            &[(8005, "Press the Attack"), (8021, "Fleet Footwork")],
            &[(9101, "Absorb Life"), (9111, "Triumph")],
            &[(9104, "Legend: Alacrity"), (9105, "Legend: Haste")],
            &[(8014, "Coup de Grace"), (8017, "Cut Down")],
        ]),
        style(8200, "Sorcery", &[
            &[(8214, "Summon Aery"), (8229, "Arcane Comet")],
            &[(8224, "Nullifying Orb"), (8226, "Manaflow Band")],
            &[(8210, "Transcendence"), (8234, "Celerity")],
            &[(8237, "Scorch"), (8232, "Waterwalking")],
        ]),
    ])
}

pub(crate) fn sample_catalog() -> Catalog {
    Catalog::from_json_strs(
        &champion_json().to_string(),
        &item_json().to_string(),
        &rune_json().to_string(),
    )
    .unwrap()
}

pub(crate) fn sample_pools(settings: &GeneratorSettings) -> ItemPools {
    ItemPools::classify(&sample_catalog(), settings)
}

pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
