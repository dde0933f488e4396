//! Headless Wizdew session: loads data, then plays one loop of
//! buy seeds → plant → kill slimes → harvest → sell, logging each step.
//!
//! Usage: `wizdew [config.ron]`

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use std::path::PathBuf;

use wizdew::combat::{CombatPlugin, EnemyKind, Health, Knockback, LootDrop, LootEntry};
use wizdew::data::DataPlugin;
use wizdew::economy::gold::{format_gold, EconomyStats};
use wizdew::economy::purse::current_funds;
use wizdew::economy::shop::{BuyRequestEvent, SellAllRequestEvent, ShopCloseEvent, ShopOpenEvent};
use wizdew::economy::EconomyPlugin;
use wizdew::farming::{FarmingPlugin, HarvestAttemptEvent, PlantField, PlantSeedEvent, TillSoilEvent};
use wizdew::inventory::InventoryPlugin;
use wizdew::kills::KillsPlugin;
use wizdew::save::SavePlugin;
use wizdew::shared::*;

const FARM: &str = "Farm";
const SLIMES: usize = 6;

fn main() {
    let config_path = std::env::args().nth(1).map(PathBuf::from);

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default(), StatesPlugin))
        // Shared contract first: state, resources, events, set ordering
        .add_plugins(SharedPlugin)
        // Domain plugins
        .add_plugins((
            DataPlugin { config_path },
            SavePlugin,
            CombatPlugin,
            KillsPlugin,
            FarmingPlugin,
            EconomyPlugin,
            InventoryPlugin,
        ));

    run_session(&mut app);
}

fn tick(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn run_session(app: &mut App) {
    // Loading → Playing
    tick(app, 2);
    if *app.world().resource::<State<GameState>>().get() != GameState::Playing {
        error!("[Session] Data did not finish loading");
        return;
    }

    app.world_mut().send_event(SceneLoadedEvent {
        scene: FARM.to_string(),
    });
    tick(app, 1);

    // Buy two seeds.
    app.world_mut().send_event(ShopOpenEvent);
    tick(app, 1);
    for _ in 0..2 {
        app.world_mut().send_event(BuyRequestEvent {
            item_id: "seed_slime".to_string(),
        });
    }
    app.world_mut().send_event(ShopCloseEvent);
    tick(app, 2);

    // Till and plant with the seed in the first hotbar slot.
    let cell = GridCell::new(2, 3);
    app.world_mut().send_event(SelectHotbarEvent { index: 0 });
    app.world_mut().send_event(TillSoilEvent { cell });
    tick(app, 1);
    app.world_mut().send_event(PlantSeedEvent { cell });
    tick(app, 1);

    // Slay slimes until the plant is ripe.
    for _ in 0..SLIMES {
        let slime = app
            .world_mut()
            .spawn((
                EnemyKind("Slime".to_string()),
                Health::new(10.0),
                Knockback::default(),
                LootDrop(vec![LootEntry {
                    item_id: "slime_jelly".to_string(),
                    min: 1,
                    max: 2,
                    chance: 0.5,
                }]),
            ))
            .id();
        app.world_mut().send_event(DamageEvent {
            target: slime,
            amount: 15.0,
            knockback: Vec2::new(4.0, 0.0),
        });
    }
    tick(app, 1);

    let stage = app
        .world()
        .resource::<PlantField>()
        .get(cell)
        .map(|p| p.stage());
    info!(
        "[Session] Slime kills: {}, plant stage: {:?}",
        app.world().resource::<KillLedger>().total("slime"),
        stage
    );

    app.world_mut().send_event(HarvestAttemptEvent { cell });
    tick(app, 1);

    // Sell the harvest and any loot.
    app.world_mut().send_event(ShopOpenEvent);
    tick(app, 1);
    for item_id in ["produce_slime", "slime_jelly"] {
        app.world_mut().send_event(SellAllRequestEvent {
            item_id: item_id.to_string(),
        });
    }
    app.world_mut().send_event(ShopCloseEvent);
    tick(app, 2);

    report(app);
}

fn report(app: &App) {
    let world = app.world();
    let inventory = world.resource::<Inventory>();
    let config = world.resource::<GameConfig>();
    let funds = current_funds(&config.currency, world.resource::<Wallet>(), inventory);
    let stats = world.resource::<EconomyStats>();

    info!("[Session] Funds: {}", format_gold(funds));
    info!(
        "[Session] Trades: {} (spent {}g, earned {}g)",
        stats.total_transactions, stats.total_gold_spent, stats.total_gold_earned
    );
    for (i, slot) in inventory.hotbar().iter().enumerate() {
        if let Some(stack) = slot {
            info!("[Session] Hotbar {}: {} × {}", i, stack.amount, stack.item_id);
        }
    }
    let mut kills: Vec<_> = world.resource::<KillLedger>().tracked_ids().collect();
    kills.sort();
    for (id, total) in kills {
        info!("[Session] Kills of '{}': {}", id, total);
    }
    info!(
        "[Session] Saved plants in '{}': {}",
        FARM,
        world.resource::<wizdew::save::PlantSaveIndex>().get_all(FARM).len()
    );
}
