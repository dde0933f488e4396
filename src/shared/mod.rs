//! Shared resources, events, states, and system sets for Wizdew.
//!
//! This is the type contract. Every domain plugin imports from here.
//! Domains talk to each other through these events and resources.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod inventory;
pub mod ledger;
pub mod observer;

pub use inventory::{Inventory, InventoryChange, InventorySnapshot, ItemStack, SlotContainer, SlotRef};
pub use ledger::{normalize_entity_id, KillLedger, KillNotice};
pub use observer::{ObserverRegistry, SubscriptionId};

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Shop,
}

/// Per-frame ordering of the core domains. Configured as a chain by
/// [`SharedPlugin`], so kills registered this frame advance plants this frame.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CoreSet {
    Combat,
    Ledger,
    Growth,
    Economy,
    Inventory,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const DEFAULT_HOTBAR_SIZE: usize = 9;
pub const DEFAULT_BACKPACK_SIZE: usize = 27;
pub const DEFAULT_MAX_STACK: u32 = 99;
pub const DEFAULT_STARTING_GOLD: u32 = 100;
pub const DEFAULT_COIN_ID: &str = "coin";
pub const DEFAULT_ICON: &str = "icons/unknown.png";

// ═══════════════════════════════════════════════════════════════════════
// IDS & GRID
// ═══════════════════════════════════════════════════════════════════════

/// Item ids are plain strings so data files can name them freely.
pub type ItemId = String;

/// Name of the scene a record belongs to.
pub type SceneKey = String;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(pub String);

impl IconRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Integer tile coordinate. `z` is the tilemap layer and is usually 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// How prices are paid: a dedicated balance, or coins carried as an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrencyConfig {
    Wallet,
    CoinItem { item_id: ItemId },
}

impl CurrencyConfig {
    pub fn coin_item(&self) -> Option<&str> {
        match self {
            CurrencyConfig::Wallet => None,
            CurrencyConfig::CoinItem { item_id } => Some(item_id),
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub hotbar_size: usize,
    pub backpack_size: usize,
    pub max_stack_size: u32,
    pub starting_gold: u32,
    pub currency: CurrencyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hotbar_size: DEFAULT_HOTBAR_SIZE,
            backpack_size: DEFAULT_BACKPACK_SIZE,
            max_stack_size: DEFAULT_MAX_STACK,
            starting_gold: DEFAULT_STARTING_GOLD,
            currency: CurrencyConfig::Wallet,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WALLET
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletChange {
    pub previous: u32,
    pub balance: u32,
}

#[derive(Resource, Debug)]
pub struct Wallet {
    gold: u32,
    pub observers: ObserverRegistry<WalletChange>,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(DEFAULT_STARTING_GOLD)
    }
}

impl Wallet {
    pub fn new(gold: u32) -> Self {
        Self {
            gold,
            observers: ObserverRegistry::default(),
        }
    }

    pub fn balance(&self) -> u32 {
        self.gold
    }

    /// Spending nothing always succeeds; spending more than the balance fails untouched.
    pub fn spend(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if self.gold < amount {
            return false;
        }
        self.set(self.gold - amount);
        true
    }

    /// Fails only if the balance would overflow.
    pub fn add(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        match self.gold.checked_add(amount) {
            Some(next) => {
                self.set(next);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self, gold: u32) {
        if gold != self.gold {
            self.set(gold);
        }
    }

    fn set(&mut self, gold: u32) {
        let previous = self.gold;
        self.gold = gold;
        self.observers.notify(&WalletChange {
            previous,
            balance: gold,
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ITEM CATALOG: loaded from data
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_id: ItemId,
    pub display_name: String,
    pub icon: IconRef,
    pub buy_price: u32,
    pub sell_price: u32,
}

#[derive(Resource, Debug, Clone)]
pub struct ItemCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<ItemId, usize>,
    pub default_icon: IconRef,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            default_icon: IconRef(DEFAULT_ICON.to_string()),
        }
    }
}

impl ItemCatalog {
    /// Returns false (and keeps the existing entry) when the id is blank or already present.
    pub fn insert(&mut self, entry: CatalogEntry) -> bool {
        if entry.item_id.is_empty() || self.index.contains_key(&entry.item_id) {
            return false;
        }
        self.index.insert(entry.item_id.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, item_id: &str) -> Option<&CatalogEntry> {
        self.index.get(item_id).map(|&i| &self.entries[i])
    }

    /// Icon for the item, or the default icon for unknown ids. Blank ids have no icon.
    pub fn icon(&self, item_id: &str) -> Option<&IconRef> {
        if item_id.is_empty() {
            return None;
        }
        Some(self.get(item_id).map_or(&self.default_icon, |e| &e.icon))
    }

    /// Entries in load order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SEEDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedDef {
    pub id: ItemId,
    pub display_name: String,
    /// Kills of this entity type make the plant grow.
    pub required_enemy_id: String,
    pub stages: u8,
    pub kills_per_stage: u32,
    pub harvest_item_id: ItemId,
    pub harvest_yield: u32,
}

impl Default for SeedDef {
    fn default() -> Self {
        Self {
            id: String::new(),
            display_name: "Seed".to_string(),
            required_enemy_id: "Slime".to_string(),
            stages: 3,
            kills_per_stage: 3,
            harvest_item_id: "produce_slime".to_string(),
            harvest_yield: 1,
        }
    }
}

impl SeedDef {
    pub fn stage_count(&self) -> u8 {
        self.stages.max(1)
    }

    pub fn mature_stage(&self) -> u8 {
        self.stage_count() - 1
    }

    pub fn kills_per_stage(&self) -> u32 {
        self.kills_per_stage.max(1)
    }

    pub fn harvest_yield(&self) -> u32 {
        self.harvest_yield.max(1)
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SeedRegistry {
    pub seeds: HashMap<ItemId, SeedDef>,
}

impl SeedRegistry {
    /// First definition for an id wins.
    pub fn insert(&mut self, seed: SeedDef) -> bool {
        if seed.id.is_empty() || self.seeds.contains_key(&seed.id) {
            return false;
        }
        self.seeds.insert(seed.id.clone(), seed);
        true
    }

    pub fn get(&self, id: &str) -> Option<&SeedDef> {
        self.seeds.get(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Loot or rewards entering the player's inventory.
#[derive(Event, Debug, Clone)]
pub struct ItemPickupEvent {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Fired after any add, remove, or move made by a system. UI re-reads slots.
#[derive(Event, Debug, Clone)]
pub struct InventoryChangedEvent;

#[derive(Event, Debug, Clone)]
pub struct MoveSlotRequestEvent {
    pub from: SlotRef,
    pub to: SlotRef,
}

#[derive(Event, Debug, Clone)]
pub struct SelectHotbarEvent {
    pub index: usize,
}

#[derive(Event, Debug, Clone)]
pub struct WalletChangedEvent {
    pub balance: u32,
}

/// Raised by combat when an entity of a given type dies.
#[derive(Event, Debug, Clone)]
pub struct EnemyKilledEvent {
    pub entity_id: String,
    pub amount: u32,
}

/// Raised by the ledger after each increment, carrying the normalized id.
#[derive(Event, Debug, Clone)]
pub struct KillRegisteredEvent {
    pub entity_id: String,
    pub total: u32,
}

/// `None` clears every counter.
#[derive(Event, Debug, Clone)]
pub struct ResetKillsEvent {
    pub entity_id: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct SceneLoadedEvent {
    pub scene: SceneKey,
}

#[derive(Event, Debug, Clone)]
pub struct ShopTransactionEvent {
    pub item_id: ItemId,
    pub quantity: u32,
    pub total: u32,
    pub is_purchase: bool,
}

#[derive(Event, Debug, Clone)]
pub struct TradeRejectedEvent {
    pub item_id: ItemId,
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    pub target: Entity,
    pub amount: f32,
    pub knockback: Vec2,
}

#[derive(Event, Debug, Clone)]
pub struct HealthChangedEvent {
    pub entity: Entity,
    pub current: f32,
    pub max: f32,
}

#[derive(Event, Debug, Clone)]
pub struct PlantStageAdvancedEvent {
    pub cell: GridCell,
    pub seed_id: ItemId,
    pub stage: u8,
}

#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub seed_id: ItemId,
    pub harvest_id: ItemId,
    pub quantity: u32,
    /// Units that actually fit in the inventory.
    pub added: u32,
    pub cell: GridCell,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

/// Registers the shared state, resources and events every domain relies on.
/// Requires `StatesPlugin` (part of `DefaultPlugins`, added by hand with
/// `MinimalPlugins`).
pub struct SharedPlugin;

impl Plugin for SharedPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<GameConfig>()
            .init_resource::<Inventory>()
            .init_resource::<Wallet>()
            .init_resource::<KillLedger>()
            .init_resource::<ItemCatalog>()
            .init_resource::<SeedRegistry>()
            .add_event::<ItemPickupEvent>()
            .add_event::<InventoryChangedEvent>()
            .add_event::<MoveSlotRequestEvent>()
            .add_event::<SelectHotbarEvent>()
            .add_event::<WalletChangedEvent>()
            .add_event::<EnemyKilledEvent>()
            .add_event::<KillRegisteredEvent>()
            .add_event::<ResetKillsEvent>()
            .add_event::<SceneLoadedEvent>()
            .add_event::<ShopTransactionEvent>()
            .add_event::<TradeRejectedEvent>()
            .add_event::<DamageEvent>()
            .add_event::<HealthChangedEvent>()
            .add_event::<PlantStageAdvancedEvent>()
            .add_event::<CropHarvestedEvent>()
            .configure_sets(
                Update,
                (
                    CoreSet::Combat,
                    CoreSet::Ledger,
                    CoreSet::Growth,
                    CoreSet::Economy,
                    CoreSet::Inventory,
                )
                    .chain(),
            );
    }
}
