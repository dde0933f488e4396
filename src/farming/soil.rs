//! Soil tilling: a cell must be tilled before anything can be planted on it.

use bevy::prelude::*;
use super::{PlantField, TillSoilEvent};

pub fn handle_till_soil(
    mut till_events: EventReader<TillSoilEvent>,
    mut field: ResMut<PlantField>,
) {
    for ev in till_events.read() {
        let Some(scene) = field.scene().map(str::to_string) else {
            warn!("[Farming] Cannot till ({}, {}): no scene loaded", ev.cell.x, ev.cell.y);
            continue;
        };
        field.till(&scene, ev.cell);
        debug!("[Farming] Tilled ({}, {}) in '{}'", ev.cell.x, ev.cell.y, scene);
    }
}
