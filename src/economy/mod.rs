//! Economy domain: shop screen, buy/sell transactions, gold tracking.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.
//! No other domain module is imported here.

use bevy::prelude::*;
use crate::shared::*;

pub mod gold;
pub mod purse;
pub mod shop;
pub mod transactions;

use gold::{track_transactions, EconomyStats};
use shop::{
    ActiveShop, BuyRequestEvent, SellAllRequestEvent, SellRequestEvent, ShopCloseEvent,
    ShopOpenEvent,
    handle_buy, handle_sell, handle_sell_all, on_close_shop, on_open_shop, refresh_shop_listings,
};

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // ── Resources ──────────────────────────────────────────────────────
        app.init_resource::<EconomyStats>()
            .init_resource::<ActiveShop>();

        // ── Internal Events ────────────────────────────────────────────────
        app.add_event::<ShopOpenEvent>()
            .add_event::<ShopCloseEvent>()
            .add_event::<BuyRequestEvent>()
            .add_event::<SellRequestEvent>()
            .add_event::<SellAllRequestEvent>();

        // ── Systems: Playing state ─────────────────────────────────────────
        app.add_systems(
            Update,
            on_open_shop
                .in_set(CoreSet::Economy)
                .run_if(in_state(GameState::Playing)),
        );

        // ── Systems: Shop state ────────────────────────────────────────────
        app.add_systems(
            Update,
            (
                // Trades first, so the listings refresh sees their results.
                handle_buy,
                handle_sell,
                handle_sell_all,
                refresh_shop_listings,
                on_close_shop,
            )
                .chain()
                .in_set(CoreSet::Economy)
                .run_if(in_state(GameState::Shop)),
        );

        // Stats listen in every state; trades only ever happen in Shop.
        app.add_systems(Update, track_transactions.after(CoreSet::Economy));

        info!("[Economy] EconomyPlugin registered.");
    }
}
