//! Game state and entity types
//!
//! Everything the director mutates per tick lives here: both realms'
//! populations, the pending-echo queue that bridges them, and the seeded
//! RNG that makes a session reproducible.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::consts::DIVIDE_Y;
use crate::tuning::Tuning;

use super::body::{Body, Regime};
use super::player::{Player, PLAYER_SIZE};
use super::timer::Cooldown;

/// Session phase; `GameOver` means the soul was extinguished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Running,
    GameOver,
}

/// Surface enemy variants. One kind today; the tag still travels through
/// the pending-echo queue so echoes remember what they condensed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
}

/// What an echo condensed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EchoOrigin {
    /// Materialized from a fallen surface enemy
    Fallen(EnemyKind),
    /// Spawned by portal-guard logic
    Guard,
}

/// Projectile palette identity; flips exactly once, on crossing the divide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileTint {
    /// Surface palette (warm)
    Ember,
    /// Under-realm palette (spectral blue)
    Spectral,
}

/// A patrolling surface enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub body: Body,
    pub health: f32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, vel_x: f32, tuning: &Tuning) -> Self {
        let mut body = Body::new(pos, Vec2::new(40.0, 40.0));
        body.vel.x = vel_x;
        Self {
            id,
            kind,
            body,
            health: tuning.enemy.max_health,
        }
    }

    /// Patrol: constant walk, occasional grounded hop, surface physics.
    pub fn update(&mut self, rng: &mut Pcg32, tuning: &Tuning, dt: f32) {
        let hop_roll = rng.random::<f32>();
        if hop_roll < tuning.enemy.hop_chance * dt * 60.0 && self.body.is_supported(Regime::Surface)
        {
            self.body.vel.y = tuning.enemy.hop_impulse;
        }
        self.body.apply_gravity(Regime::Surface, dt);
        self.body.step(Regime::Surface, dt);
    }
}

/// A spectral echo walking the underside of the divide
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub id: u32,
    pub origin: EchoOrigin,
    pub body: Body,
    pub health: f32,
}

impl Echo {
    pub fn new(id: u32, origin: EchoOrigin, pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            id,
            origin,
            body: Body::new(pos, Vec2::new(40.0, 40.0)),
            health: tuning.echo.max_health,
        }
    }

    /// Pursuit: horizontal chase re-aimed every tick, a teleport when the
    /// player kites too far, occasional ceiling hop, inverted physics.
    pub fn update(&mut self, player_x: f32, rng: &mut Pcg32, tuning: &Tuning, dt: f32) {
        self.body.vel.x = if player_x < self.body.pos.x {
            -tuning.echo.chase_speed
        } else {
            tuning.echo.chase_speed
        };

        // Escape is not an option: relocate next to a fleeing player.
        if (self.body.pos.x - player_x).abs() > tuning.echo.teleport_range {
            let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            self.body.pos.x = player_x + side * tuning.echo.teleport_offset;
        }

        let hop_roll = rng.random::<f32>();
        if hop_roll < tuning.echo.hop_chance * dt * 60.0 && self.body.is_supported(Regime::Under) {
            self.body.vel.y = tuning.echo.hop_impulse;
        }
        self.body.apply_gravity(Regime::Under, dt);
        self.body.step(Regime::Under, dt);
    }
}

/// A fired shot. Flight is linear; gravity never applies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub body: Body,
    pub tint: ProjectileTint,
    /// One-way: set on the tick the shot first crosses into the under-realm
    pub crossed: bool,
    pub lifetime: Cooldown,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, lifetime: f32) -> Self {
        // A shot born below the divide is already in the denser medium.
        let crossed = pos.y > DIVIDE_Y;
        let mut body = Body::new(pos, Vec2::new(12.0, 12.0));
        body.vel = vel;
        Self {
            id,
            body,
            tint: if crossed {
                ProjectileTint::Spectral
            } else {
                ProjectileTint::Ember
            },
            crossed,
            lifetime: Cooldown::armed(lifetime),
        }
    }

    /// Advance one tick. `timer_dt` drives the lifetime so bullet time can
    /// be configured to stretch (or not stretch) shot longevity.
    pub fn update(&mut self, dt: f32, timer_dt: f32, cross_factor: f32) {
        self.body.pos += self.body.vel * dt;

        if !self.crossed && self.body.pos.y > DIVIDE_Y {
            self.crossed = true;
            self.body.vel *= cross_factor;
            self.tint = ProjectileTint::Spectral;
        }

        self.lifetime.tick(timer_dt);
    }

    pub fn expired(&self) -> bool {
        self.lifetime.is_ready()
    }
}

/// A transient under-realm exit zone; contact triggers Resurrection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapePortal {
    pub pos: Vec2,
    pub radius: f32,
}

/// A fallen surface enemy awaiting materialization as an echo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingEcho {
    pub kind: EnemyKind,
    pub spawn: Vec2,
}

/// One-tick pulses for downstream juice systems (sound, shake, particles).
/// Cleared at the start of every tick; nothing in the sim reads them back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    EnemyDied { pos: Vec2, kind: EnemyKind },
    EchoDied { pos: Vec2, origin: EchoOrigin, harvested: bool },
    MeleeHit { pos: Vec2 },
    PlayerHurt { pos: Vec2, damage: f32 },
    SoulDrained { pos: Vec2, amount: f32 },
    Shattered { pos: Vec2 },
    Resurrected { pos: Vec2 },
    SessionEnded,
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds survived while Alive; drives difficulty
    pub time_survived: f32,
    pub level: u32,
    /// Latch: a Shatter has fired and no Resurrection has cleared it yet
    pub shattered: bool,
    pub player: Player,
    /// Surface population (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Under-realm population (sorted by id for determinism)
    pub echoes: Vec<Echo>,
    pub projectiles: Vec<Projectile>,
    pub portals: Vec<EscapePortal>,
    /// FIFO bridge between the realms, drained under the echo cap
    pub pending_echoes: VecDeque<PendingEcho>,
    /// Current enemy spawn interval; shrinks with difficulty
    pub spawn_interval: f32,
    pub spawn_timer: Cooldown,
    pub guard_timer: Cooldown,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session with default balance
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let player_start = Vec2::new(400.0, DIVIDE_Y - PLAYER_SIZE.y / 2.0);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Running,
            time_ticks: 0,
            time_survived: 0.0,
            level: 1,
            shattered: false,
            player: Player::new(player_start, &tuning),
            enemies: Vec::new(),
            echoes: Vec::new(),
            projectiles: Vec::new(),
            portals: Vec::new(),
            pending_echoes: VecDeque::new(),
            spawn_interval: tuning.difficulty.base_spawn_interval,
            spawn_timer: Cooldown::armed(tuning.difficulty.base_spawn_interval),
            guard_timer: Cooldown::armed(tuning.echo.guard_interval),
            events: Vec::new(),
            next_id: 1,
            tuning,
        };

        // Opening patrol ahead of the player.
        for i in 0..3 {
            state.spawn_enemy_at(800.0 + i as f32 * 150.0, -1.0);
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a grunt slightly above the divide, walking in `walk_dir`
    pub fn spawn_enemy_at(&mut self, x: f32, walk_dir: f32) {
        let id = self.next_entity_id();
        let vel_x = walk_dir * self.tuning.enemy.walk_speed;
        let enemy = Enemy::new(
            id,
            EnemyKind::Grunt,
            Vec2::new(x, DIVIDE_Y - 50.0),
            vel_x,
            &self.tuning,
        );
        self.enemies.push(enemy);
    }

    /// Ensure entity sets stay sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.echoes.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_projectile_crosses_exactly_once() {
        let tuning = Tuning::default();
        let mut shot = Projectile::new(
            1,
            Vec2::new(0.0, DIVIDE_Y - 10.0),
            Vec2::new(0.0, 800.0),
            tuning.player.projectile_lifetime,
        );
        assert!(!shot.crossed);
        assert_eq!(shot.tint, ProjectileTint::Ember);

        // Carry it through the divide.
        for _ in 0..10 {
            shot.update(SIM_DT, SIM_DT, tuning.player.projectile_cross_factor);
        }
        assert!(shot.crossed);
        assert_eq!(shot.tint, ProjectileTint::Spectral);
        let speed_after_cross = shot.body.vel.length();
        assert!((speed_after_cross - 800.0 * 0.4).abs() < 1e-3);

        // Further ticks never re-apply the factor.
        for _ in 0..10 {
            shot.update(SIM_DT, SIM_DT, tuning.player.projectile_cross_factor);
        }
        assert!((shot.body.vel.length() - speed_after_cross).abs() < 1e-3);
    }

    #[test]
    fn test_projectile_born_below_is_already_spectral() {
        let shot = Projectile::new(1, Vec2::new(0.0, DIVIDE_Y + 60.0), Vec2::new(800.0, 0.0), 2.0);
        assert!(shot.crossed);
        assert_eq!(shot.tint, ProjectileTint::Spectral);
    }

    #[test]
    fn test_projectile_expires_by_lifetime() {
        let mut shot = Projectile::new(1, Vec2::new(0.0, 100.0), Vec2::new(800.0, 0.0), 0.05);
        assert!(!shot.expired());
        for _ in 0..12 {
            shot.update(SIM_DT, SIM_DT, 0.4);
        }
        assert!(shot.expired());
    }

    #[test]
    fn test_enemy_settles_on_divide() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = Enemy::new(1, EnemyKind::Grunt, Vec2::new(0.0, 300.0), 0.0, &tuning);
        for _ in 0..240 {
            enemy.update(&mut rng, &tuning, SIM_DT);
        }
        // Hops may lift it briefly, but it always returns to the floor band.
        assert!(enemy.body.bottom() <= DIVIDE_Y + 1e-3);
    }

    #[test]
    fn test_echo_chases_player_along_ceiling() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut echo = Echo::new(1, EchoOrigin::Guard, Vec2::new(900.0, DIVIDE_Y + 60.0), &tuning);
        let start_x = echo.body.pos.x;
        for _ in 0..120 {
            echo.update(100.0, &mut rng, &tuning, SIM_DT);
        }
        assert!(echo.body.pos.x < start_x, "echo closes toward the player");
        assert!(echo.body.top() >= DIVIDE_Y - 1e-3, "echo stays below the divide");
    }

    #[test]
    fn test_echo_teleports_when_kited() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut echo = Echo::new(1, EchoOrigin::Guard, Vec2::new(5000.0, DIVIDE_Y + 60.0), &tuning);
        echo.update(0.0, &mut rng, &tuning, SIM_DT);
        assert!(
            (echo.body.pos.x.abs() - tuning.echo.teleport_offset).abs() < 1.0,
            "echo relocated to player x ± offset, got {}",
            echo.body.pos.x
        );
    }

    #[test]
    fn test_pending_queue_is_fifo() {
        let mut state = GameState::new(1);
        state.pending_echoes.push_back(PendingEcho {
            kind: EnemyKind::Grunt,
            spawn: Vec2::new(1.0, DIVIDE_Y + 50.0),
        });
        state.pending_echoes.push_back(PendingEcho {
            kind: EnemyKind::Grunt,
            spawn: Vec2::new(2.0, DIVIDE_Y + 50.0),
        });
        assert_eq!(state.pending_echoes.pop_front().unwrap().spawn.x, 1.0);
        assert_eq!(state.pending_echoes.pop_front().unwrap().spawn.x, 2.0);
        assert!(state.pending_echoes.pop_front().is_none());
    }

    #[test]
    fn test_entity_ids_are_unique_and_ordered() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
        // The opening patrol already consumed ids 1..=3.
        assert_eq!(state.enemies.len(), 3);
        assert!(state.enemies.windows(2).all(|w| w[0].id < w[1].id));
    }
}
