use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use crate::shared::*;

use super::purse::{current_funds, with_purse};
use super::transactions::{buy_one, sell_all, sell_one, TradeError, TradeReceipt};

// ─────────────────────────────────────────────────────────────────────────────
// Resources
// ─────────────────────────────────────────────────────────────────────────────

/// Whether the shop screen is up, and what it is showing.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveShop {
    pub open: bool,
    pub listings: Vec<ActiveListing>,
}

/// One catalog entry as the shop UI displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveListing {
    pub item_id: ItemId,
    pub display_name: String,
    pub icon: IconRef,
    pub price: u32,
    pub sell_price: u32,
    pub held: u32,
    pub can_afford: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Events (driven by UI input)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Event, Debug, Clone)]
pub struct ShopOpenEvent;

#[derive(Event, Debug, Clone)]
pub struct ShopCloseEvent;

/// Buy one unit.
#[derive(Event, Debug, Clone)]
pub struct BuyRequestEvent {
    pub item_id: ItemId,
}

/// Sell one unit.
#[derive(Event, Debug, Clone)]
pub struct SellRequestEvent {
    pub item_id: ItemId,
}

/// Sell every held unit.
#[derive(Event, Debug, Clone)]
pub struct SellAllRequestEvent {
    pub item_id: ItemId,
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

pub fn on_open_shop(
    mut open_events: EventReader<ShopOpenEvent>,
    catalog: Res<ItemCatalog>,
    inventory: Res<Inventory>,
    config: Res<GameConfig>,
    wallet: Res<Wallet>,
    mut active_shop: ResMut<ActiveShop>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if open_events.read().last().is_none() {
        return;
    }
    let funds = current_funds(&config.currency, &wallet, &inventory);
    active_shop.open = true;
    active_shop.listings = build_listings(&catalog, &inventory, funds);
    next_state.set(GameState::Shop);
    info!(
        "[Economy] Shop opened with {} listing(s); {} on hand.",
        active_shop.listings.len(),
        super::gold::format_gold(funds)
    );
}

pub fn on_close_shop(
    mut close_events: EventReader<ShopCloseEvent>,
    mut active_shop: ResMut<ActiveShop>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if close_events.read().last().is_none() {
        return;
    }
    active_shop.open = false;
    active_shop.listings.clear();
    next_state.set(GameState::Playing);
    info!("[Economy] Left shop, returning to Playing state.");
}

/// Keeps `held` and `can_afford` current while the shop is open.
pub fn refresh_shop_listings(
    inventory: Res<Inventory>,
    config: Res<GameConfig>,
    wallet: Res<Wallet>,
    mut active_shop: ResMut<ActiveShop>,
) {
    if !active_shop.open {
        return;
    }
    let funds = current_funds(&config.currency, &wallet, &inventory);
    for listing in active_shop.listings.iter_mut() {
        listing.held = inventory.count(&listing.item_id);
        listing.can_afford = funds >= listing.price;
    }
}

/// The outputs every trade handler writes to.
#[derive(SystemParam)]
pub struct TradeOutputs<'w> {
    transactions: EventWriter<'w, ShopTransactionEvent>,
    rejections: EventWriter<'w, TradeRejectedEvent>,
    wallet_changed: EventWriter<'w, WalletChangedEvent>,
    inventory_changed: EventWriter<'w, InventoryChangedEvent>,
}

impl TradeOutputs<'_> {
    fn report(&mut self, item_id: &str, is_purchase: bool, result: Result<TradeReceipt, TradeError>) {
        match result {
            Ok(receipt) => {
                info!(
                    "[Economy] {} {} × '{}' for {}. Balance: {}",
                    if is_purchase { "Bought" } else { "Sold" },
                    receipt.quantity,
                    receipt.item_id,
                    super::gold::format_gold(receipt.total),
                    super::gold::format_gold(receipt.funds),
                );
                self.transactions.send(ShopTransactionEvent {
                    item_id: receipt.item_id,
                    quantity: receipt.quantity,
                    total: receipt.total,
                    is_purchase,
                });
                self.wallet_changed.send(WalletChangedEvent {
                    balance: receipt.funds,
                });
                self.inventory_changed.send(InventoryChangedEvent);
            }
            Err(err) => {
                info!(
                    "[Economy] {} '{}' refused: {}",
                    if is_purchase { "Buy" } else { "Sell" },
                    item_id,
                    err
                );
                self.rejections.send(TradeRejectedEvent {
                    item_id: item_id.to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
}

pub fn handle_buy(
    mut buy_events: EventReader<BuyRequestEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut inventory: ResMut<Inventory>,
    mut wallet: ResMut<Wallet>,
    mut out: TradeOutputs,
) {
    for ev in buy_events.read() {
        let result = with_purse(&config.currency, &mut wallet, |p| {
            buy_one(&catalog, &mut inventory, p, &ev.item_id)
        });
        out.report(&ev.item_id, true, result);
    }
}

pub fn handle_sell(
    mut sell_events: EventReader<SellRequestEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut inventory: ResMut<Inventory>,
    mut wallet: ResMut<Wallet>,
    mut out: TradeOutputs,
) {
    for ev in sell_events.read() {
        let result = with_purse(&config.currency, &mut wallet, |p| {
            sell_one(&catalog, &mut inventory, p, &ev.item_id)
        });
        out.report(&ev.item_id, false, result);
    }
}

pub fn handle_sell_all(
    mut sell_events: EventReader<SellAllRequestEvent>,
    catalog: Res<ItemCatalog>,
    config: Res<GameConfig>,
    mut inventory: ResMut<Inventory>,
    mut wallet: ResMut<Wallet>,
    mut out: TradeOutputs,
) {
    for ev in sell_events.read() {
        let result = with_purse(&config.currency, &mut wallet, |p| {
            sell_all(&catalog, &mut inventory, p, &ev.item_id)
        });
        out.report(&ev.item_id, false, result);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn build_listings(catalog: &ItemCatalog, inventory: &Inventory, funds: u32) -> Vec<ActiveListing> {
    catalog
        .entries()
        .iter()
        .map(|entry| ActiveListing {
            item_id: entry.item_id.clone(),
            display_name: entry.display_name.clone(),
            icon: entry.icon.clone(),
            price: entry.buy_price,
            sell_price: entry.sell_price,
            held: inventory.count(&entry.item_id),
            can_afford: funds >= entry.buy_price,
        })
        .collect()
}
