//! Inventory domain: loot pickups and UI-driven slot moves / hotbar selection.
//!
//! The `Inventory` resource itself lives in `crate::shared`; this plugin only
//! turns events into calls on it.

use bevy::prelude::*;
use crate::shared::*;

pub struct InventoryPlugin;

impl Plugin for InventoryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (collect_item_pickups, handle_slot_move, handle_hotbar_select)
                .chain()
                .in_set(CoreSet::Inventory)
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Shop))),
        );
    }
}

/// Loot that doesn't fit is dropped.
pub fn collect_item_pickups(
    mut pickup_events: EventReader<ItemPickupEvent>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in pickup_events.read() {
        let left_over = inventory.try_add(&ev.item_id, ev.quantity);
        if left_over > 0 {
            warn!(
                "[Inventory] No room for {} of {} × '{}'",
                left_over, ev.quantity, ev.item_id
            );
        }
        if left_over < ev.quantity {
            changed.send(InventoryChangedEvent);
        }
    }
}

pub fn handle_slot_move(
    mut move_events: EventReader<MoveSlotRequestEvent>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in move_events.read() {
        if ev.from == ev.to {
            continue;
        }
        if inventory.move_or_merge(ev.from, ev.to) {
            changed.send(InventoryChangedEvent);
        } else {
            debug!("[Inventory] Move {:?} -> {:?} refused", ev.from, ev.to);
        }
    }
}

pub fn handle_hotbar_select(
    mut select_events: EventReader<SelectHotbarEvent>,
    mut inventory: ResMut<Inventory>,
    mut changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in select_events.read() {
        let before = inventory.selected_index();
        inventory.select_hotbar(ev.index);
        if inventory.selected_index() != before {
            changed.send(InventoryChangedEvent);
        }
    }
}
