//! Single-unit buy and sell against the catalog.
//!
//! Every trade either completes or leaves the inventory and purse exactly as
//! they were. When the second half of a trade fails, the first half is undone.

use std::fmt;

use crate::shared::*;

use super::purse::Purse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    EmptyItemId,
    NotInCatalog(ItemId),
    InsufficientFunds { price: u32, funds: u32 },
    InventoryFull,
    CurrencyNotSellable,
    NothingToSell,
    ChargeFailed,
    PayoutFailed,
}

impl fmt::Display for TradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeError::EmptyItemId => write!(f, "no item given"),
            TradeError::NotInCatalog(id) => write!(f, "'{id}' is not for trade"),
            TradeError::InsufficientFunds { price, funds } => {
                write!(f, "costs {price}g, only {funds}g on hand")
            }
            TradeError::InventoryFull => write!(f, "no room in the inventory"),
            TradeError::CurrencyNotSellable => write!(f, "money cannot be sold"),
            TradeError::NothingToSell => write!(f, "none held"),
            TradeError::ChargeFailed => write!(f, "payment was refused"),
            TradeError::PayoutFailed => write!(f, "payment could not be received"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReceipt {
    pub item_id: ItemId,
    pub quantity: u32,
    /// Gold paid (buy) or received (sell).
    pub total: u32,
    /// Funds left after the trade.
    pub funds: u32,
}

/// Buys one unit at the catalog's buy price.
pub fn buy_one<P: Purse + ?Sized>(
    catalog: &ItemCatalog,
    inventory: &mut Inventory,
    purse: &mut P,
    item_id: &str,
) -> Result<TradeReceipt, TradeError> {
    if item_id.is_empty() {
        return Err(TradeError::EmptyItemId);
    }
    let entry = catalog
        .get(item_id)
        .ok_or_else(|| TradeError::NotInCatalog(item_id.to_string()))?;
    let price = entry.buy_price;

    let funds = purse.funds(inventory);
    if funds < price {
        return Err(TradeError::InsufficientFunds { price, funds });
    }

    let before = inventory.snapshot();
    if !inventory.add(item_id, 1) {
        inventory.restore(before);
        return Err(TradeError::InventoryFull);
    }

    if !purse.debit(inventory, price) {
        inventory.restore(before);
        return Err(TradeError::ChargeFailed);
    }

    Ok(TradeReceipt {
        item_id: item_id.to_string(),
        quantity: 1,
        total: price,
        funds: purse.funds(inventory),
    })
}

/// Sells one held unit at the catalog's sell price.
pub fn sell_one<P: Purse + ?Sized>(
    catalog: &ItemCatalog,
    inventory: &mut Inventory,
    purse: &mut P,
    item_id: &str,
) -> Result<TradeReceipt, TradeError> {
    if item_id.is_empty() {
        return Err(TradeError::EmptyItemId);
    }
    if purse.currency_item() == Some(item_id) {
        return Err(TradeError::CurrencyNotSellable);
    }
    let entry = catalog
        .get(item_id)
        .ok_or_else(|| TradeError::NotInCatalog(item_id.to_string()))?;
    let price = entry.sell_price;

    if inventory.count(item_id) == 0 {
        return Err(TradeError::NothingToSell);
    }
    let before = inventory.snapshot();
    if inventory.try_remove(item_id, 1) != 1 {
        inventory.restore(before);
        return Err(TradeError::NothingToSell);
    }

    if !purse.credit(inventory, price) {
        inventory.restore(before);
        return Err(TradeError::PayoutFailed);
    }

    Ok(TradeReceipt {
        item_id: item_id.to_string(),
        quantity: 1,
        total: price,
        funds: purse.funds(inventory),
    })
}

/// Sells one unit at a time until none are held or a sale fails.
/// Errors only if not a single unit sold.
pub fn sell_all<P: Purse + ?Sized>(
    catalog: &ItemCatalog,
    inventory: &mut Inventory,
    purse: &mut P,
    item_id: &str,
) -> Result<TradeReceipt, TradeError> {
    let mut receipt = sell_one(catalog, inventory, purse, item_id)?;
    while inventory.count(item_id) > 0 {
        match sell_one(catalog, inventory, purse, item_id) {
            Ok(next) => {
                receipt.quantity += 1;
                receipt.total = receipt.total.saturating_add(next.total);
                receipt.funds = next.funds;
            }
            Err(_) => break,
        }
    }
    Ok(receipt)
}
