//! Kill-driven growth for a single planted seed.
//!
//! A plant never reads a clock. Its stage is derived from how many kills of
//! its required enemy the ledger has seen since the plant's baseline.

use crate::shared::*;

#[derive(Debug, Clone, PartialEq)]
pub struct GrowingPlant {
    seed: SeedDef,
    enemy_key: String,
    cell: GridCell,
    stage: u8,
    baseline: u32,
}

impl GrowingPlant {
    /// Fresh plant at stage 0; only kills from now on count.
    pub fn plant(seed: &SeedDef, cell: GridCell, ledger: &KillLedger) -> Self {
        Self {
            seed: seed.clone(),
            enemy_key: normalize_entity_id(&seed.required_enemy_id),
            cell,
            stage: 0,
            baseline: ledger.total(&seed.required_enemy_id),
        }
    }

    /// Rebuilds a plant from a saved stage. The baseline is pushed back so
    /// the saved stage is already "paid for" and later kills continue from it.
    pub fn restore(seed: &SeedDef, cell: GridCell, saved_stage: u8, ledger: &KillLedger) -> Self {
        let stage = saved_stage.min(seed.mature_stage());
        let paid = u32::from(stage).saturating_mul(seed.kills_per_stage());
        Self {
            seed: seed.clone(),
            enemy_key: normalize_entity_id(&seed.required_enemy_id),
            cell,
            stage,
            baseline: ledger.total(&seed.required_enemy_id).saturating_sub(paid),
        }
    }

    /// Feeds one ledger notification. Returns the new stage if the plant advanced.
    pub fn on_kill(&mut self, entity_id: &str, total: u32) -> Option<u8> {
        if normalize_entity_id(entity_id) != self.enemy_key {
            return None;
        }
        let gained = total.saturating_sub(self.baseline);
        let target = (gained / self.seed.kills_per_stage()).min(u32::from(self.seed.mature_stage()));
        let target = target as u8;
        if target > self.stage {
            self.stage = target;
            Some(target)
        } else {
            None
        }
    }

    pub fn is_mature(&self) -> bool {
        self.stage >= self.seed.mature_stage()
    }

    pub fn seed(&self) -> &SeedDef {
        &self.seed
    }

    pub fn cell(&self) -> GridCell {
        self.cell
    }

    pub fn stage(&self) -> u8 {
        self.stage
    }

    pub fn baseline(&self) -> u32 {
        self.baseline
    }
}
