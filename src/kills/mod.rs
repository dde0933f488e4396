//! Kills domain: feeds combat deaths into the global `KillLedger`.
//!
//! Every accepted kill is re-broadcast as a `KillRegisteredEvent` carrying the
//! normalized id and new total; farming listens to that, not to combat.

use bevy::prelude::*;
use crate::shared::*;

pub struct KillsPlugin;

impl Plugin for KillsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_kill_resets, register_enemy_kills)
                .chain()
                .in_set(CoreSet::Ledger)
                .run_if(in_state(GameState::Playing).or(in_state(GameState::Shop))),
        );
    }
}

/// One `KillRegisteredEvent` per accepted kill, in arrival order.
pub fn register_enemy_kills(
    mut kill_events: EventReader<EnemyKilledEvent>,
    mut ledger: ResMut<KillLedger>,
    mut registered: EventWriter<KillRegisteredEvent>,
) {
    for ev in kill_events.read() {
        match ledger.register_kill(&ev.entity_id, ev.amount) {
            Some(notice) => {
                debug!("[Kills] '{}' total now {}", notice.entity_id, notice.total);
                registered.send(KillRegisteredEvent {
                    entity_id: notice.entity_id,
                    total: notice.total,
                });
            }
            None => {
                warn!(
                    "[Kills] Ignored kill of '{}' × {}",
                    ev.entity_id, ev.amount
                );
            }
        }
    }
}

pub fn handle_kill_resets(
    mut reset_events: EventReader<ResetKillsEvent>,
    mut ledger: ResMut<KillLedger>,
) {
    for ev in reset_events.read() {
        match &ev.entity_id {
            Some(id) => {
                if ledger.reset_enemy(id) {
                    info!("[Kills] Reset kill count for '{}'", normalize_entity_id(id));
                }
            }
            None => {
                ledger.reset_all();
                info!("[Kills] Reset all kill counts");
            }
        }
    }
}
