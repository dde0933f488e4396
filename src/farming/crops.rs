//! Planting, kill-driven growth, and restoring plants when a scene loads.

use bevy::prelude::*;
use crate::save::PlantSaveIndex;
use crate::shared::*;
use super::{PlantField, PlantSeedEvent};

// ─────────────────────────────────────────────────────────────────────────────
// Scene load: rebuild the scene's plants from the save index
// ─────────────────────────────────────────────────────────────────────────────

pub fn restore_plants_on_scene_load(
    mut scene_events: EventReader<SceneLoadedEvent>,
    mut field: ResMut<PlantField>,
    save: Res<PlantSaveIndex>,
    seeds: Res<SeedRegistry>,
    ledger: Res<KillLedger>,
) {
    for ev in scene_events.read() {
        let restored = field.restore_scene(&ev.scene, &save, &seeds, &ledger);
        info!("[Farming] Restored {} plant(s) in '{}'", restored, ev.scene);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle plant seed event
// ─────────────────────────────────────────────────────────────────────────────

/// Plants the seed in the selected hotbar slot at the requested cell.
pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut field: ResMut<PlantField>,
    mut inventory: ResMut<Inventory>,
    mut save: ResMut<PlantSaveIndex>,
    seeds: Res<SeedRegistry>,
    ledger: Res<KillLedger>,
    mut inventory_changed: EventWriter<InventoryChangedEvent>,
) {
    for ev in plant_events.read() {
        match field.plant_from_hotbar(ev.cell, &mut inventory, &seeds, &ledger, &mut save) {
            Ok(seed_id) => {
                info!("[Farming] Planted '{}' at ({}, {})", seed_id, ev.cell.x, ev.cell.y);
                inventory_changed.send(InventoryChangedEvent);
            }
            Err(err) => {
                info!("[Farming] Cannot plant at ({}, {}): {}", ev.cell.x, ev.cell.y, err);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth: one pass per registered kill, in order
// ─────────────────────────────────────────────────────────────────────────────

pub fn advance_growth_on_kills(
    mut kill_events: EventReader<KillRegisteredEvent>,
    mut field: ResMut<PlantField>,
    mut save: ResMut<PlantSaveIndex>,
    mut stage_events: EventWriter<PlantStageAdvancedEvent>,
) {
    for ev in kill_events.read() {
        for advance in field.apply_kill(&ev.entity_id, ev.total, &mut save) {
            info!(
                "[Farming] '{}' at ({}, {}) grew to stage {}",
                advance.seed_id, advance.cell.x, advance.cell.y, advance.stage
            );
            stage_events.send(PlantStageAdvancedEvent {
                cell: advance.cell,
                seed_id: advance.seed_id,
                stage: advance.stage,
            });
        }
    }
}
