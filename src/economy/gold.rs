use bevy::prelude::*;
use crate::shared::*;

/// Running totals over every completed trade.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct EconomyStats {
    pub total_gold_earned: u64,
    pub total_gold_spent: u64,
    pub items_bought: u64,
    pub items_sold: u64,
    pub total_transactions: u64,
}

impl EconomyStats {
    pub fn record(&mut self, ev: &ShopTransactionEvent) {
        let gold = u64::from(ev.total);
        let units = u64::from(ev.quantity);
        if ev.is_purchase {
            self.total_gold_spent = self.total_gold_spent.saturating_add(gold);
            self.items_bought = self.items_bought.saturating_add(units);
        } else {
            self.total_gold_earned = self.total_gold_earned.saturating_add(gold);
            self.items_sold = self.items_sold.saturating_add(units);
        }
        self.total_transactions += 1;
    }

    pub fn net(&self) -> i64 {
        self.total_gold_earned as i64 - self.total_gold_spent as i64
    }
}

pub fn track_transactions(
    mut transactions: EventReader<ShopTransactionEvent>,
    mut stats: ResMut<EconomyStats>,
) {
    for ev in transactions.read() {
        stats.record(ev);
    }
}

/// "1234" → "1,234g".
pub fn format_gold(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('g');
    out
}
