//! Planted cells of the active scene: tilling, planting, harvest and restore.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::save::PlantSaveIndex;
use crate::shared::*;

use super::growth::GrowingPlant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantError {
    NoActiveScene,
    NoSeedSelected,
    UnknownSeed(ItemId),
    NotTilled(GridCell),
    Occupied(GridCell),
}

impl fmt::Display for PlantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantError::NoActiveScene => write!(f, "no scene is loaded"),
            PlantError::NoSeedSelected => write!(f, "selected hotbar slot is empty"),
            PlantError::UnknownSeed(id) => write!(f, "'{id}' is not a seed"),
            PlantError::NotTilled(c) => write!(f, "cell ({}, {}) is not tilled", c.x, c.y),
            PlantError::Occupied(c) => write!(f, "cell ({}, {}) already has a plant", c.x, c.y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarvestError {
    NoPlant(GridCell),
    NotMature { stage: u8, mature: u8 },
}

impl fmt::Display for HarvestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestError::NoPlant(c) => write!(f, "nothing planted at ({}, {})", c.x, c.y),
            HarvestError::NotMature { stage, mature } => {
                write!(f, "plant is at stage {stage} of {mature}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub seed_id: ItemId,
    pub harvest_id: ItemId,
    pub quantity: u32,
    pub added: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageAdvance {
    pub cell: GridCell,
    pub seed_id: ItemId,
    pub stage: u8,
}

/// Plants are kept in planting order, which is also the order they react to kills.
#[derive(Resource, Debug, Default)]
pub struct PlantField {
    scene: Option<SceneKey>,
    soil: HashMap<SceneKey, HashSet<GridCell>>,
    plants: Vec<GrowingPlant>,
}

impl PlantField {
    pub fn scene(&self) -> Option<&str> {
        self.scene.as_deref()
    }

    /// Switches to `scene`, dropping the previous scene's live plants.
    /// Their records stay in the save index.
    pub fn enter_scene(&mut self, scene: &str) {
        self.scene = Some(scene.to_string());
        self.plants.clear();
    }

    pub fn till(&mut self, scene: &str, cell: GridCell) {
        self.soil.entry(scene.to_string()).or_default().insert(cell);
    }

    pub fn is_tilled(&self, cell: GridCell) -> bool {
        self.scene
            .as_ref()
            .and_then(|s| self.soil.get(s))
            .is_some_and(|cells| cells.contains(&cell))
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.plants.iter().any(|p| p.cell() == cell)
    }

    pub fn get(&self, cell: GridCell) -> Option<&GrowingPlant> {
        self.plants.iter().find(|p| p.cell() == cell)
    }

    pub fn plants(&self) -> &[GrowingPlant] {
        &self.plants
    }

    fn check_plantable(&self, cell: GridCell) -> Result<&str, PlantError> {
        let scene = self.scene.as_deref().ok_or(PlantError::NoActiveScene)?;
        if !self.is_tilled(cell) {
            return Err(PlantError::NotTilled(cell));
        }
        if self.is_occupied(cell) {
            return Err(PlantError::Occupied(cell));
        }
        Ok(scene)
    }

    /// Plants `seed` at `cell` and records it at stage 0.
    pub fn plant(
        &mut self,
        seed: &SeedDef,
        cell: GridCell,
        ledger: &KillLedger,
        save: &mut PlantSaveIndex,
    ) -> Result<&GrowingPlant, PlantError> {
        let scene = self.check_plantable(cell)?.to_string();
        save.upsert(&scene, &seed.id, cell, 0);
        self.plants.push(GrowingPlant::plant(seed, cell, ledger));
        Ok(&self.plants[self.plants.len() - 1])
    }

    /// Plants whatever seed is in the selected hotbar slot and uses one up.
    pub fn plant_from_hotbar(
        &mut self,
        cell: GridCell,
        inventory: &mut Inventory,
        seeds: &SeedRegistry,
        ledger: &KillLedger,
        save: &mut PlantSaveIndex,
    ) -> Result<ItemId, PlantError> {
        let stack = inventory.selected_stack().ok_or(PlantError::NoSeedSelected)?;
        let seed = seeds
            .get(&stack.item_id)
            .ok_or_else(|| PlantError::UnknownSeed(stack.item_id.clone()))?;
        self.plant(seed, cell, ledger, save)?;
        inventory.consume_selected();
        Ok(seed.id.clone())
    }

    /// Feeds one ledger notification to every plant and records each advance.
    pub fn apply_kill(
        &mut self,
        entity_id: &str,
        total: u32,
        save: &mut PlantSaveIndex,
    ) -> Vec<StageAdvance> {
        let mut advanced = Vec::new();
        for plant in self.plants.iter_mut() {
            if let Some(stage) = plant.on_kill(entity_id, total) {
                if let Some(scene) = self.scene.as_deref() {
                    save.upsert(scene, &plant.seed().id, plant.cell(), stage);
                }
                advanced.push(StageAdvance {
                    cell: plant.cell(),
                    seed_id: plant.seed().id.clone(),
                    stage,
                });
            }
        }
        advanced
    }

    /// Harvests a mature plant into `inventory`. Overflow is dropped, not refunded.
    pub fn harvest(
        &mut self,
        cell: GridCell,
        inventory: &mut Inventory,
        save: &mut PlantSaveIndex,
    ) -> Result<HarvestOutcome, HarvestError> {
        let idx = self
            .plants
            .iter()
            .position(|p| p.cell() == cell)
            .ok_or(HarvestError::NoPlant(cell))?;

        let plant = &self.plants[idx];
        if !plant.is_mature() {
            return Err(HarvestError::NotMature {
                stage: plant.stage(),
                mature: plant.seed().mature_stage(),
            });
        }

        let plant = self.plants.remove(idx);
        let seed = plant.seed();
        let quantity = seed.harvest_yield();
        let left_over = inventory.try_add(&seed.harvest_item_id, quantity);

        if let Some(scene) = self.scene.as_deref() {
            save.remove(scene, cell);
        }

        Ok(HarvestOutcome {
            seed_id: seed.id.clone(),
            harvest_id: seed.harvest_item_id.clone(),
            quantity,
            added: quantity - left_over,
        })
    }

    /// Removes a live plant without touching its saved record.
    pub fn despawn(&mut self, cell: GridCell) -> Option<GrowingPlant> {
        let idx = self.plants.iter().position(|p| p.cell() == cell)?;
        Some(self.plants.remove(idx))
    }

    /// Enters `scene` and rebuilds its plants from the save index. Records with
    /// an unknown seed, an untilled cell, or a cell already taken are skipped.
    /// Returns how many plants came back.
    pub fn restore_scene(
        &mut self,
        scene: &str,
        save: &PlantSaveIndex,
        seeds: &SeedRegistry,
        ledger: &KillLedger,
    ) -> usize {
        self.enter_scene(scene);

        let mut restored = 0;
        for record in save.get_all(scene) {
            let Some(seed) = seeds.get(&record.seed_id) else {
                warn!(
                    "[Farming] Skipping saved plant at ({}, {}): unknown seed '{}'",
                    record.cell.x, record.cell.y, record.seed_id
                );
                continue;
            };
            if !self.is_tilled(record.cell) || self.is_occupied(record.cell) {
                continue;
            }
            self.plants
                .push(GrowingPlant::restore(seed, record.cell, record.stage, ledger));
            restored += 1;
        }
        restored
    }
}
