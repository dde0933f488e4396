//! Farming domain: soil tilling, planting, kill-driven growth, harvest.
//!
//! Communicates with other domains exclusively through crate::shared events/resources
//! and the shared `PlantSaveIndex`.

use bevy::prelude::*;
use crate::shared::*;

mod crops;
mod field;
mod growth;
mod harvest;
mod soil;

pub use field::{HarvestError, HarvestOutcome, PlantError, PlantField, StageAdvance};
pub use growth::GrowingPlant;

/// Till a cell in the current scene.
#[derive(Event, Debug, Clone)]
pub struct TillSoilEvent {
    pub cell: GridCell,
}

/// Plant whatever seed is in the selected hotbar slot.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub cell: GridCell,
}

#[derive(Event, Debug, Clone)]
pub struct HarvestAttemptEvent {
    pub cell: GridCell,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app
            // Internal resources
            .init_resource::<PlantField>()
            // Internal events
            .add_event::<TillSoilEvent>()
            .add_event::<PlantSeedEvent>()
            .add_event::<HarvestAttemptEvent>()
            // ------------------------------------------------------------------
            // Restore first so same-frame requests see the new scene; growth
            // before harvest so a maturing kill can be harvested this frame.
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    crops::restore_plants_on_scene_load,
                    soil::handle_till_soil,
                    crops::handle_plant_seed,
                    crops::advance_growth_on_kills,
                    harvest::handle_harvest_attempt,
                )
                    .chain()
                    .in_set(CoreSet::Growth)
                    .run_if(in_state(GameState::Playing).or(in_state(GameState::Shop))),
            );
    }
}
