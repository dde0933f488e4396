use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// PUBLIC TYPES
// ═══════════════════════════════════════════════════════════════════════

/// One planted cell, as remembered across scene reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub scene: SceneKey,
    pub seed_id: ItemId,
    pub cell: GridCell,
    pub stage: u8,
}

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

/// scene → (cell → record). Lives for the whole session; nothing is written to disk.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantSaveIndex {
    by_scene: HashMap<SceneKey, HashMap<GridCell, PlantRecord>>,
}

impl PlantSaveIndex {
    /// Inserts or overwrites the record for (scene, cell). Blank scene or seed ids are ignored.
    pub fn upsert(&mut self, scene: &str, seed_id: &str, cell: GridCell, stage: u8) {
        if scene.is_empty() || seed_id.is_empty() {
            return;
        }
        self.by_scene.entry(scene.to_string()).or_default().insert(
            cell,
            PlantRecord {
                scene: scene.to_string(),
                seed_id: seed_id.to_string(),
                cell,
                stage,
            },
        );
    }

    pub fn remove(&mut self, scene: &str, cell: GridCell) -> Option<PlantRecord> {
        self.by_scene.get_mut(scene)?.remove(&cell)
    }

    pub fn get(&self, scene: &str, cell: GridCell) -> Option<&PlantRecord> {
        self.by_scene.get(scene)?.get(&cell)
    }

    /// Owned snapshot of a scene's records, ordered by cell. Callers may keep
    /// mutating the index while walking it.
    pub fn get_all(&self, scene: &str) -> Vec<PlantRecord> {
        let mut records: Vec<PlantRecord> = self
            .by_scene
            .get(scene)
            .map(|cells| cells.values().cloned().collect())
            .unwrap_or_default();
        records.sort_by_key(|r| r.cell);
        records
    }

    pub fn len(&self) -> usize {
        self.by_scene.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        // The current scene is owned by farming's `PlantField`, which reads
        // this index when a scene loads.
        app.init_resource::<PlantSaveIndex>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_overwrites_by_scene_and_cell() {
        let mut index = PlantSaveIndex::default();
        index.upsert("Farm", "seed_slime", GridCell::new(1, 2), 0);
        index.upsert("Farm", "seed_slime", GridCell::new(1, 2), 2);
        index.upsert("Cave", "seed_slime", GridCell::new(1, 2), 1);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("Farm", GridCell::new(1, 2)).unwrap().stage, 2);
        assert_eq!(index.get("Cave", GridCell::new(1, 2)).unwrap().stage, 1);
    }

    #[test]
    fn test_blank_scene_or_seed_ignored() {
        let mut index = PlantSaveIndex::default();
        index.upsert("", "seed_slime", GridCell::new(0, 0), 0);
        index.upsert("Farm", "", GridCell::new(0, 0), 0);
        assert!(index.is_empty());
    }

    #[test]
    fn test_remove_and_missing_scene() {
        let mut index = PlantSaveIndex::default();
        index.upsert("Farm", "seed_slime", GridCell::new(3, 3), 1);
        assert!(index.remove("Farm", GridCell::new(3, 3)).is_some());
        assert!(index.remove("Farm", GridCell::new(3, 3)).is_none());
        assert!(index.remove("Nowhere", GridCell::new(3, 3)).is_none());
        assert!(index.get_all("Nowhere").is_empty());
    }

    #[test]
    fn test_snapshot_survives_mutation_during_iteration() {
        let mut index = PlantSaveIndex::default();
        for x in 0..3 {
            index.upsert("Farm", "seed_slime", GridCell::new(x, 0), 0);
        }

        let snapshot = index.get_all("Farm");
        for record in &snapshot {
            index.remove(&record.scene, record.cell);
            index.upsert(&record.scene, &record.seed_id, record.cell, record.stage + 1);
        }

        assert_eq!(snapshot.len(), 3);
        assert!(index.get_all("Farm").iter().all(|r| r.stage == 1));
    }
}
