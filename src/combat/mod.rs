//! Combat domain: health, knockback, and what happens when an enemy dies.
//!
//! Damage is delivered as a `DamageEvent` naming the target entity. The
//! target only reacts through the capabilities it carries: `Health` takes
//! the damage, `Knockback` takes the push. A dead `EnemyKind` is reported to
//! the kill ledger and its `LootDrop` becomes inventory pickups.

use bevy::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// CAPABILITIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Non-positive damage, already dead, or inside the invulnerability window.
    Ignored,
    Hurt { current: f32 },
    Killed,
}

pub trait Damageable {
    fn take_damage(&mut self, amount: f32, now: f32) -> DamageOutcome;
    fn is_dead(&self) -> bool;
}

pub trait Knockbackable {
    fn apply_knockback(&mut self, impulse: Vec2);
}

// ═══════════════════════════════════════════════════════════════════════
// COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
    /// Seconds of invulnerability after each hit that doesn't kill.
    invulnerable_secs: f32,
    invulnerable_until: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        let max = max.max(1.0);
        Self {
            current: max,
            max,
            invulnerable_secs: 0.0,
            invulnerable_until: f32::NEG_INFINITY,
        }
    }

    pub fn with_invulnerability(mut self, secs: f32) -> Self {
        self.invulnerable_secs = secs.max(0.0);
        self
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    /// Returns how much was actually restored. The dead stay dead.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 || self.is_dead() {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.max);
        self.current - before
    }

    /// Changes the maximum; current health is clamped to it, or refilled.
    pub fn set_max(&mut self, max: f32, refill: bool) {
        self.max = max.max(1.0);
        self.current = if refill { self.max } else { self.current.min(self.max) };
    }
}

impl Damageable for Health {
    fn take_damage(&mut self, amount: f32, now: f32) -> DamageOutcome {
        if amount <= 0.0 || self.is_dead() || self.is_invulnerable(now) {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0.0);
        if self.current <= 0.0 {
            return DamageOutcome::Killed;
        }
        self.invulnerable_until = now + self.invulnerable_secs;
        DamageOutcome::Hurt {
            current: self.current,
        }
    }

    fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

/// Velocity from hits, bled off by friction every frame.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Knockback {
    pub velocity: Vec2,
    pub mass: f32,
    /// Fraction of velocity lost per second.
    pub friction: f32,
}

impl Default for Knockback {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            mass: 1.0,
            friction: 8.0,
        }
    }
}

impl Knockback {
    pub fn decay(&mut self, dt: f32) {
        self.velocity *= (1.0 - self.friction * dt).max(0.0);
        if self.velocity.length_squared() < 1e-4 {
            self.velocity = Vec2::ZERO;
        }
    }
}

impl Knockbackable for Knockback {
    fn apply_knockback(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass.max(0.01);
    }
}

/// The ledger id this entity counts as when it dies, e.g. "Slime".
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct EnemyKind(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub item_id: ItemId,
    pub min: u32,
    pub max: u32,
    /// 0.0..=1.0
    pub chance: f32,
}

impl LootEntry {
    pub fn always(item_id: impl Into<ItemId>, amount: u32) -> Self {
        Self {
            item_id: item_id.into(),
            min: amount,
            max: amount,
            chance: 1.0,
        }
    }

    /// Units dropped this time; 0 when the chance roll misses.
    pub fn roll(&self, rng: &mut impl Rng) -> u32 {
        if self.chance < 1.0 && rng.gen::<f32>() >= self.chance {
            return 0;
        }
        let lo = self.min.min(self.max);
        let hi = self.min.max(self.max);
        rng.gen_range(lo..=hi)
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct LootDrop(pub Vec<LootEntry>);

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource)]
pub struct LootRng(pub StdRng);

impl Default for LootRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LootRng>().add_systems(
            Update,
            (apply_damage, decay_knockback)
                .chain()
                .in_set(CoreSet::Combat)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn apply_damage(
    mut commands: Commands,
    time: Res<Time>,
    mut damage_events: EventReader<DamageEvent>,
    mut targets: Query<(
        &mut Health,
        Option<&mut Knockback>,
        Option<&EnemyKind>,
        Option<&LootDrop>,
    )>,
    mut rng: ResMut<LootRng>,
    mut health_changed: EventWriter<HealthChangedEvent>,
    mut killed: EventWriter<EnemyKilledEvent>,
    mut pickups: EventWriter<ItemPickupEvent>,
) {
    let now = time.elapsed_secs();
    for ev in damage_events.read() {
        // Entities without Health simply aren't damageable.
        let Ok((mut health, knockback, kind, loot)) = targets.get_mut(ev.target) else {
            continue;
        };

        let outcome = health.take_damage(ev.amount, now);
        if outcome == DamageOutcome::Ignored {
            continue;
        }
        health_changed.send(HealthChangedEvent {
            entity: ev.target,
            current: health.current(),
            max: health.max(),
        });

        if let DamageOutcome::Hurt { .. } = outcome {
            if let Some(mut knockback) = knockback {
                knockback.apply_knockback(ev.knockback);
            }
            continue;
        }

        let Some(kind) = kind else {
            info!("[Combat] {:?} died", ev.target);
            continue;
        };
        info!("[Combat] {} {:?} killed", kind.0, ev.target);
        killed.send(EnemyKilledEvent {
            entity_id: kind.0.clone(),
            amount: 1,
        });
        for entry in loot.map(|l| l.0.as_slice()).unwrap_or_default() {
            let quantity = entry.roll(&mut rng.0);
            if quantity > 0 {
                pickups.send(ItemPickupEvent {
                    item_id: entry.item_id.clone(),
                    quantity,
                });
            }
        }
        commands.entity(ev.target).despawn();
    }
}

pub fn decay_knockback(time: Res<Time>, mut bodies: Query<&mut Knockback>) {
    let dt = time.delta_secs();
    for mut knockback in bodies.iter_mut() {
        if knockback.velocity != Vec2::ZERO {
            knockback.decay(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_kills_at_zero() {
        let mut hp = Health::new(10.0);
        assert_eq!(hp.take_damage(4.0, 0.0), DamageOutcome::Hurt { current: 6.0 });
        assert_eq!(hp.take_damage(100.0, 1.0), DamageOutcome::Killed);
        assert!(hp.is_dead());
        assert_eq!(hp.current(), 0.0);
        assert_eq!(hp.take_damage(1.0, 2.0), DamageOutcome::Ignored);
    }

    #[test]
    fn test_invulnerability_window() {
        let mut hp = Health::new(10.0).with_invulnerability(0.5);
        assert!(matches!(hp.take_damage(1.0, 1.0), DamageOutcome::Hurt { .. }));
        assert_eq!(hp.take_damage(1.0, 1.2), DamageOutcome::Ignored);
        assert!(matches!(hp.take_damage(1.0, 1.5), DamageOutcome::Hurt { .. }));
        assert_eq!(hp.current(), 8.0);
    }

    #[test]
    fn test_non_positive_damage_ignored() {
        let mut hp = Health::new(10.0);
        assert_eq!(hp.take_damage(0.0, 0.0), DamageOutcome::Ignored);
        assert_eq!(hp.take_damage(-5.0, 0.0), DamageOutcome::Ignored);
        assert_eq!(hp.current(), 10.0);
    }

    #[test]
    fn test_heal_and_set_max() {
        let mut hp = Health::new(10.0);
        hp.take_damage(6.0, 0.0);
        assert_eq!(hp.heal(10.0), 6.0);
        hp.set_max(5.0, false);
        assert_eq!(hp.current(), 5.0);
        hp.set_max(20.0, true);
        assert_eq!(hp.current(), 20.0);

        hp.take_damage(50.0, 0.0);
        assert_eq!(hp.heal(5.0), 0.0);
    }

    #[test]
    fn test_knockback_scales_by_mass_and_decays() {
        let mut kb = Knockback {
            mass: 2.0,
            friction: 5.0,
            ..Default::default()
        };
        kb.apply_knockback(Vec2::new(10.0, 0.0));
        assert_eq!(kb.velocity, Vec2::new(5.0, 0.0));

        kb.decay(0.1);
        assert!((kb.velocity.x - 2.5).abs() < 1e-5);
        kb.decay(1.0);
        assert_eq!(kb.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_loot_roll_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let entry = LootEntry {
            item_id: "slime_jelly".into(),
            min: 3,
            max: 1,
            chance: 1.0,
        };
        for _ in 0..50 {
            let n = entry.roll(&mut rng);
            assert!((1..=3).contains(&n));
        }

        let never = LootEntry {
            chance: 0.0,
            ..LootEntry::always("gem", 1)
        };
        assert!((0..50).all(|_| never.roll(&mut rng) == 0));
        assert_eq!(LootEntry::always("coin", 4).roll(&mut rng), 4);
    }
}
