//! Data layer: populates the item catalog and seed registry at startup and
//! applies the game configuration.
//!
//! This plugin runs in OnEnter(GameState::Loading), fills `ItemCatalog` and
//! `SeedRegistry` from the RON files embedded under `assets/data/`, sizes the
//! inventory and seeds the purse from `GameConfig`, then transitions the game
//! into GameState::Playing.
//!
//! No other domain needs to seed these resources. All domain plugins can
//! safely read them once GameState has advanced past Loading.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::*;

const ITEMS_RON: &str = include_str!("../../assets/data/items.ron");
const SEEDS_RON: &str = include_str!("../../assets/data/seeds.ron");
const CONFIG_RON: &str = include_str!("../../assets/data/config.ron");

/// Optional config file that overrides the embedded `config.ron`.
#[derive(Resource, Debug, Clone, Default)]
pub struct ConfigSource {
    pub path: Option<PathBuf>,
}

#[derive(Default)]
pub struct DataPlugin {
    pub config_path: Option<PathBuf>,
}

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ConfigSource {
            path: self.config_path.clone(),
        })
        .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parsing
// ─────────────────────────────────────────────────────────────────────────────

pub fn parse_items(src: &str) -> Result<Vec<CatalogEntry>, String> {
    ron::from_str(src).map_err(|e| format!("items: {}", e))
}

pub fn parse_seeds(src: &str) -> Result<Vec<SeedDef>, String> {
    ron::from_str(src).map_err(|e| format!("seeds: {}", e))
}

pub fn parse_config(src: &str) -> Result<GameConfig, String> {
    ron::from_str(src).map_err(|e| format!("config: {}", e))
}

pub fn read_config(path: &Path) -> Result<GameConfig, String> {
    let src = fs::read_to_string(path)
        .map_err(|e| format!("Read failed for {}: {}", path.display(), e))?;
    parse_config(&src)
}

/// File override if given and readable, else the embedded config, else defaults.
pub fn resolve_config(path: Option<&Path>) -> GameConfig {
    if let Some(path) = path {
        match read_config(path) {
            Ok(config) => return config,
            Err(e) => warn!("[Data] {}; using built-in config", e),
        }
    }
    parse_config(CONFIG_RON).unwrap_or_else(|e| {
        warn!("[Data] Embedded {}; using defaults", e);
        GameConfig::default()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Population
// ─────────────────────────────────────────────────────────────────────────────

/// Returns how many entries were accepted. Duplicates keep the first definition.
pub fn populate_catalog(catalog: &mut ItemCatalog, entries: Vec<CatalogEntry>) -> usize {
    let mut accepted = 0;
    for entry in entries {
        let id = entry.item_id.clone();
        if catalog.insert(entry) {
            accepted += 1;
        } else {
            warn!("[Data] Skipped catalog entry '{}' (blank or duplicate)", id);
        }
    }
    accepted
}

pub fn populate_seeds(seeds: &mut SeedRegistry, defs: Vec<SeedDef>) -> usize {
    let mut accepted = 0;
    for def in defs {
        let id = def.id.clone();
        if seeds.insert(def) {
            accepted += 1;
        } else {
            warn!("[Data] Skipped seed '{}' (blank or duplicate)", id);
        }
    }
    accepted
}

/// Sizes the inventory and hands out the starting money. With coin currency
/// the starting amount arrives as coins and the wallet stays empty.
pub fn apply_config(config: &GameConfig, inventory: &mut Inventory, wallet: &mut Wallet) {
    inventory.reconfigure(config.hotbar_size, config.backpack_size, config.max_stack_size);
    match config.currency.coin_item() {
        None => wallet.reset(config.starting_gold),
        Some(coin_id) => {
            wallet.reset(0);
            let left_over = inventory.try_add(coin_id, config.starting_gold);
            if left_over > 0 {
                warn!("[Data] {} starting coin(s) did not fit", left_over);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading system
// ─────────────────────────────────────────────────────────────────────────────

fn load_all_data(
    source: Res<ConfigSource>,
    mut config: ResMut<GameConfig>,
    mut catalog: ResMut<ItemCatalog>,
    mut seeds: ResMut<SeedRegistry>,
    mut inventory: ResMut<Inventory>,
    mut wallet: ResMut<Wallet>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("[Data] Populating registries…");

    match parse_items(ITEMS_RON) {
        Ok(entries) => {
            let n = populate_catalog(&mut catalog, entries);
            info!("[Data]   Items loaded: {}", n);
        }
        Err(e) => warn!("[Data] {}", e),
    }

    match parse_seeds(SEEDS_RON) {
        Ok(defs) => {
            let n = populate_seeds(&mut seeds, defs);
            info!("[Data]   Seeds loaded: {}", n);
        }
        Err(e) => warn!("[Data] {}", e),
    }

    *config = resolve_config(source.path.as_deref());
    apply_config(&config, &mut inventory, &mut wallet);
    info!(
        "[Data]   Inventory {}+{} slots, stacks of {}; currency {:?}",
        config.hotbar_size, config.backpack_size, config.max_stack_size, config.currency
    );

    info!("[Data] All registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_data_parses() {
        let items = parse_items(ITEMS_RON).unwrap();
        assert!(items.iter().any(|e| e.item_id == "produce_slime" && e.sell_price == 15));
        assert!(items.iter().any(|e| e.item_id == "seed_slime" && e.buy_price == 10));

        let seeds = parse_seeds(SEEDS_RON).unwrap();
        let slime = seeds.iter().find(|s| s.id == "seed_slime").unwrap();
        assert_eq!(slime.required_enemy_id, "Slime");
        assert_eq!(slime.stages, 3);
        assert_eq!(slime.kills_per_stage, 3);

        assert_eq!(parse_config(CONFIG_RON).unwrap(), GameConfig::default());
    }

    #[test]
    fn test_every_seed_harvest_is_in_catalog() {
        let mut catalog = ItemCatalog::default();
        populate_catalog(&mut catalog, parse_items(ITEMS_RON).unwrap());
        for seed in parse_seeds(SEEDS_RON).unwrap() {
            assert!(catalog.get(&seed.id).is_some(), "{} missing", seed.id);
            assert!(catalog.get(&seed.harvest_item_id).is_some(), "{} missing", seed.harvest_item_id);
        }
    }

    #[test]
    fn test_seed_fields_default_when_omitted() {
        let seeds = parse_seeds(r#"[(id: "seed_plain")]"#).unwrap();
        assert_eq!(seeds[0].required_enemy_id, "Slime");
        assert_eq!(seeds[0].harvest_item_id, "produce_slime");
        assert_eq!(seeds[0].harvest_yield, 1);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config(r#"(max_stack_size: 20, currency: CoinItem(item_id: "coin"))"#).unwrap();
        assert_eq!(config.max_stack_size, 20);
        assert_eq!(config.hotbar_size, DEFAULT_HOTBAR_SIZE);
        assert_eq!(config.currency.coin_item(), Some("coin"));
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(parse_config("(hotbar_size: \"nine\")").is_err());
        assert!(read_config(Path::new("/definitely/not/here.ron")).is_err());
        assert_eq!(resolve_config(Some(Path::new("/definitely/not/here.ron"))), GameConfig::default());
    }

    #[test]
    fn test_populate_skips_duplicates() {
        let mut catalog = ItemCatalog::default();
        let mut items = parse_items(ITEMS_RON).unwrap();
        let total = items.len();
        items.push(items[0].clone());
        assert_eq!(populate_catalog(&mut catalog, items), total);
    }

    #[test]
    fn test_apply_config_coin_mode_grants_coins() {
        let config = GameConfig {
            hotbar_size: 4,
            backpack_size: 8,
            max_stack_size: 50,
            starting_gold: 120,
            currency: CurrencyConfig::CoinItem {
                item_id: "coin".into(),
            },
        };
        let mut inventory = Inventory::default();
        let mut wallet = Wallet::default();
        apply_config(&config, &mut inventory, &mut wallet);

        assert_eq!(inventory.hotbar_len(), 4);
        assert_eq!(inventory.backpack_len(), 8);
        assert_eq!(inventory.count("coin"), 120);
        assert_eq!(wallet.balance(), 0);
    }

    #[test]
    fn test_apply_config_wallet_mode() {
        let config = GameConfig {
            starting_gold: 250,
            ..Default::default()
        };
        let mut inventory = Inventory::default();
        let mut wallet = Wallet::default();
        apply_config(&config, &mut inventory, &mut wallet);
        assert_eq!(wallet.balance(), 250);
        assert_eq!(inventory.count("coin"), 0);
    }
}
