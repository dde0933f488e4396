//! Harvest system: player interacts with mature plants.

use bevy::prelude::*;
use crate::save::PlantSaveIndex;
use crate::shared::*;
use super::{HarvestAttemptEvent, PlantField};

pub fn handle_harvest_attempt(
    mut harvest_events: EventReader<HarvestAttemptEvent>,
    mut field: ResMut<PlantField>,
    mut inventory: ResMut<Inventory>,
    mut save: ResMut<PlantSaveIndex>,
    mut harvested: EventWriter<CropHarvestedEvent>,
    mut inventory_changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in harvest_events.read() {
        let outcome = match field.harvest(ev.cell, &mut inventory, &mut save) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!("[Farming] Harvest at ({}, {}) failed: {}", ev.cell.x, ev.cell.y, err);
                continue;
            }
        };

        if outcome.added < outcome.quantity {
            warn!(
                "[Farming] Inventory full: {} of {} × '{}' lost",
                outcome.quantity - outcome.added,
                outcome.quantity,
                outcome.harvest_id
            );
        }
        info!(
            "[Farming] Harvested {} × '{}' from ({}, {})",
            outcome.added, outcome.harvest_id, ev.cell.x, ev.cell.y
        );

        if outcome.added > 0 {
            inventory_changed.send(InventoryChangedEvent);
        }
        harvested.send(CropHarvestedEvent {
            seed_id: outcome.seed_id,
            harvest_id: outcome.harvest_id,
            quantity: outcome.quantity,
            added: outcome.added,
            cell: ev.cell,
        });
    }
}
