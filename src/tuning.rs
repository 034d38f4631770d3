//! Data-driven game balance
//!
//! Every number a designer would reach for lives here, grouped by the
//! subsystem it drives. Defaults are the shipped balance; a `tuning.json`
//! next to the binary overrides them without a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Player movement, combat and transition balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Horizontal run speed on the surface (pixels/s)
    pub run_speed: f32,
    /// Soul swim speed as a fraction of run speed
    pub swim_factor: f32,
    /// Jump impulse while grounded on the surface (negative = up)
    pub jump_impulse: f32,
    /// Geyser impulse applied at resurrection (negative = up)
    pub burst_impulse: f32,
    pub max_health: f32,
    pub max_soul_energy: f32,
    /// Soul energy granted when the player shatters into the under-realm
    pub shatter_soul_energy: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    pub projectile_damage: f32,
    /// Factor applied to a projectile's velocity once, when it crosses the divide
    pub projectile_cross_factor: f32,
    pub melee_damage: f32,
    /// Horizontal offset of the melee hitbox center, in facing direction
    pub melee_reach: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_speed: 400.0,
            swim_factor: 0.8,
            jump_impulse: -700.0,
            burst_impulse: -1200.0,
            max_health: 100.0,
            max_soul_energy: 100.0,
            shatter_soul_energy: 50.0,
            dash_speed: 2500.0,
            dash_duration: 0.15,
            dash_cooldown: 1.0,
            projectile_speed: 800.0,
            projectile_lifetime: 2.0,
            projectile_damage: 10.0,
            projectile_cross_factor: 0.4,
            melee_damage: 10.0,
            melee_reach: 40.0,
        }
    }
}

/// Surface enemy balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub walk_speed: f32,
    pub max_health: f32,
    /// Grounded hop probability per tick, normalized to a 60 Hz frame
    pub hop_chance: f32,
    /// Hop impulse (negative = up, away from the divide)
    pub hop_impulse: f32,
    /// Damage dealt to the player on contact (the enemy dies doing it)
    pub contact_damage: f32,
    /// Horizontal distance from the player past which a receding enemy despawns
    pub despawn_range: f32,
    /// Extra off-screen margin added to spawn placement
    pub spawn_lead: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            walk_speed: 150.0,
            max_health: 20.0,
            hop_chance: 0.01,
            hop_impulse: -400.0,
            contact_damage: 15.0,
            despawn_range: 2000.0,
            spawn_lead: 50.0,
        }
    }
}

/// Echo balance (the under-realm population)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoTuning {
    pub chase_speed: f32,
    pub max_health: f32,
    /// Ceiling hop probability per tick, normalized to a 60 Hz frame
    pub hop_chance: f32,
    /// Hop impulse (positive = down, away from the divide underside)
    pub hop_impulse: f32,
    /// Soul energy granted when a projectile finishes an echo
    pub harvest_energy: f32,
    /// Soul energy lost when an echo reaches the player
    pub contact_drain: f32,
    /// Horizontal separation past which an echo teleports back to the player
    pub teleport_range: f32,
    /// Magnitude of the random horizontal offset used by the teleport
    pub teleport_offset: f32,
    /// Pending records only materialize while live echoes are below this
    pub drain_cap: usize,
    /// Guard spawning pauses while live echoes are at or above this
    pub guard_cap: usize,
    /// Seconds between guard spawn attempts near portals
    pub guard_interval: f32,
    /// Horizontal scatter of guard spawns around their portal
    pub guard_scatter: f32,
    /// Horizontal scatter around the player when a pending record materializes
    pub materialize_scatter: f32,
}

impl Default for EchoTuning {
    fn default() -> Self {
        Self {
            chase_speed: 100.0,
            max_health: 20.0,
            hop_chance: 0.01,
            hop_impulse: 400.0,
            harvest_energy: 10.0,
            contact_drain: 10.0,
            teleport_range: 1200.0,
            teleport_offset: 500.0,
            drain_cap: 5,
            guard_cap: 8,
            guard_interval: 2.5,
            guard_scatter: 150.0,
            materialize_scatter: 600.0,
        }
    }
}

/// Survival-time difficulty scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Seconds of (alive) survival per level
    pub level_seconds: f32,
    pub base_spawn_interval: f32,
    /// Spawn interval reduction per level
    pub spawn_interval_step: f32,
    /// Floor on the spawn interval
    pub min_spawn_interval: f32,
    pub base_fire_interval: f32,
    /// Fire interval growth per level
    pub fire_interval_step: f32,
    /// Ceiling on the fire interval
    pub max_fire_interval: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            level_seconds: 10.0,
            base_spawn_interval: 2.0,
            spawn_interval_step: 0.15,
            min_spawn_interval: 0.4,
            base_fire_interval: 0.25,
            fire_interval_step: 0.025,
            max_fire_interval: 0.5,
        }
    }
}

impl DifficultyTuning {
    /// Enemy spawn interval at a given level, clamped at the floor
    pub fn spawn_interval_for(&self, level: u32) -> f32 {
        (self.base_spawn_interval - self.spawn_interval_step * level as f32)
            .max(self.min_spawn_interval)
    }

    /// Player fire interval at a given level, clamped at the ceiling
    pub fn fire_interval_for(&self, level: u32) -> f32 {
        (self.base_fire_interval + self.fire_interval_step * level as f32)
            .min(self.max_fire_interval)
    }
}

/// Health-gated slow motion on the surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTimeTuning {
    /// Bullet time engages while alive below this health
    pub health_threshold: f32,
    /// Gameplay time scale while engaged
    pub time_scale: f32,
    /// Whether cooldowns and projectile lifetimes slow down too.
    /// When false they tick in real time, so bullet time stretches the
    /// world but not the player's own cadence.
    pub scales_timers: bool,
}

impl Default for BulletTimeTuning {
    fn default() -> Self {
        Self {
            health_threshold: 25.0,
            time_scale: 0.3,
            scales_timers: true,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub echo: EchoTuning,
    pub difficulty: DifficultyTuning,
    pub bullet_time: BulletTimeTuning,
}

impl Tuning {
    /// Load a tuning file, falling back to defaults on any failure.
    ///
    /// A missing or malformed file is never fatal; the session just runs
    /// on shipped balance and says so in the log.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning overrides from {}", path.display());
                    tuning
                }
                Err(err) => {
                    log::warn!(
                        "Ignoring malformed tuning file {}: {}",
                        path.display(),
                        err
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No tuning file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaling_clamps_at_limits() {
        let difficulty = DifficultyTuning::default();
        // Early levels move toward the limits...
        assert!(difficulty.spawn_interval_for(2) > difficulty.min_spawn_interval);
        assert!(difficulty.fire_interval_for(2) < difficulty.max_fire_interval);
        // ...late levels sit exactly on them.
        assert_eq!(
            difficulty.spawn_interval_for(100),
            difficulty.min_spawn_interval
        );
        assert_eq!(
            difficulty.fire_interval_for(100),
            difficulty.max_fire_interval
        );
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let tuning: Tuning =
            serde_json::from_str(r#"{"enemy": {"walk_speed": 210.0}}"#).unwrap();
        assert_eq!(tuning.enemy.walk_speed, 210.0);
        assert_eq!(tuning.enemy.max_health, EnemyTuning::default().max_health);
        assert_eq!(tuning.player.run_speed, PlayerTuning::default().run_speed);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default(Path::new("/nonexistent/tuning.json"));
        assert_eq!(tuning.echo.drain_cap, EchoTuning::default().drain_cap);
    }
}
