//! Where the money lives. Trades are written against [`Purse`] so the same
//! buy/sell code works for a gold balance and for coins carried in the bag.

use crate::shared::*;

pub trait Purse {
    /// Money available to spend right now.
    fn funds(&self, inventory: &Inventory) -> u32;

    /// Takes `amount` out. On false nothing changed.
    fn debit(&mut self, inventory: &mut Inventory, amount: u32) -> bool;

    /// Puts `amount` in. On false nothing changed.
    fn credit(&mut self, inventory: &mut Inventory, amount: u32) -> bool;

    /// The item id that doubles as money, if any. It can never be sold.
    fn currency_item(&self) -> Option<&str> {
        None
    }
}

impl Purse for Wallet {
    fn funds(&self, _inventory: &Inventory) -> u32 {
        self.balance()
    }

    fn debit(&mut self, _inventory: &mut Inventory, amount: u32) -> bool {
        self.spend(amount)
    }

    fn credit(&mut self, _inventory: &mut Inventory, amount: u32) -> bool {
        self.add(amount)
    }
}

/// Coins held as ordinary stacks of `coin_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinPurse {
    pub coin_id: ItemId,
}

impl CoinPurse {
    pub fn new(coin_id: impl Into<ItemId>) -> Self {
        Self {
            coin_id: coin_id.into(),
        }
    }
}

impl Default for CoinPurse {
    fn default() -> Self {
        Self::new(DEFAULT_COIN_ID)
    }
}

impl Purse for CoinPurse {
    fn funds(&self, inventory: &Inventory) -> u32 {
        inventory.count(&self.coin_id)
    }

    fn debit(&mut self, inventory: &mut Inventory, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        if !inventory.has(&self.coin_id, amount) {
            return false;
        }
        let before = inventory.snapshot();
        if inventory.try_remove(&self.coin_id, amount) == amount {
            return true;
        }
        inventory.restore(before);
        false
    }

    fn credit(&mut self, inventory: &mut Inventory, amount: u32) -> bool {
        if amount == 0 {
            return true;
        }
        let before = inventory.snapshot();
        if inventory.try_add(&self.coin_id, amount) == 0 {
            return true;
        }
        inventory.restore(before);
        false
    }

    fn currency_item(&self) -> Option<&str> {
        Some(&self.coin_id)
    }
}

/// Read-only view of the configured purse's funds.
pub fn current_funds(currency: &CurrencyConfig, wallet: &Wallet, inventory: &Inventory) -> u32 {
    match currency.coin_item() {
        Some(coin_id) => inventory.count(coin_id),
        None => wallet.balance(),
    }
}

/// Runs `f` against whichever purse the config selects.
pub fn with_purse<R>(
    currency: &CurrencyConfig,
    wallet: &mut Wallet,
    f: impl FnOnce(&mut dyn Purse) -> R,
) -> R {
    match currency.coin_item() {
        Some(coin_id) => f(&mut CoinPurse::new(coin_id)),
        None => f(wallet),
    }
}
