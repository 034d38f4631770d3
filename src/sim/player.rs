//! Player entity and the Alive/Soul state machine
//!
//! The player is the only entity that changes physics regime at runtime.
//! While Alive it runs and jumps on top of the divide; after a Shatter it
//! becomes a Soul stuck to the underside, swimming with inverted gravity
//! until a Resurrection launches it back up. Both transitions are driven
//! by the director in `tick`; the methods here only mutate player state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::aim_direction;
use crate::consts::DIVIDE_Y;
use crate::tuning::Tuning;

use super::body::{Body, Regime};
use super::collision::within_radius;
use super::state::{EscapePortal, Projectile};
use super::tick::TickInput;
use super::timer::Cooldown;

/// Player collision box
pub const PLAYER_SIZE: Vec2 = Vec2::new(50.0, 70.0);

/// The two mutually exclusive player realms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Realm {
    /// On the surface, with health as the vital resource
    Alive,
    /// In the under-realm, with soul energy as the vital resource
    Soul,
}

impl Realm {
    /// The physics regime bodies follow in this realm
    pub fn regime(self) -> Regime {
        match self {
            Realm::Alive => Regime::Surface,
            Realm::Soul => Regime::Under,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub realm: Realm,
    /// Meaningful while Alive; untouched while Soul
    pub health: f32,
    /// Meaningful while Soul; untouched while Alive
    pub soul_energy: f32,
    pub facing: Facing,
    /// Current fire interval; the director retunes this on level-up
    pub fire_interval: f32,
    pub fire_cooldown: Cooldown,
    pub dash_cooldown: Cooldown,
    /// While active, the dash is in flight and directional input is ignored
    pub dash_window: Cooldown,
    /// Set when the player brushes an escape portal; consumed at Resurrection
    pub escaped_through_portal: bool,
    /// Divide contact from the last physics step
    pub grounded: bool,
}

impl Player {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: Body::new(pos, PLAYER_SIZE),
            realm: Realm::Alive,
            health: tuning.player.max_health,
            soul_energy: tuning.player.max_soul_energy,
            facing: Facing::Right,
            fire_interval: tuning.difficulty.base_fire_interval,
            fire_cooldown: Cooldown::ready(),
            dash_cooldown: Cooldown::ready(),
            dash_window: Cooldown::ready(),
            escaped_through_portal: false,
            grounded: false,
        }
    }

    pub fn tick_cooldowns(&mut self, dt: f32) {
        self.fire_cooldown.tick(dt);
        self.dash_cooldown.tick(dt);
        self.dash_window.tick(dt);
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_window.is_active()
    }

    /// Translate held directional input into velocity for the current realm.
    ///
    /// Ground movement is horizontal only; the under-realm allows a full
    /// omnidirectional swim at reduced speed. A dash in flight overrides
    /// everything.
    pub fn apply_move_input(&mut self, input: &TickInput, tuning: &Tuning) {
        if self.is_dashing() {
            return;
        }

        match self.realm {
            Realm::Alive => {
                if input.move_left {
                    self.body.vel.x = -tuning.player.run_speed;
                    self.facing = Facing::Left;
                }
                if input.move_right {
                    self.body.vel.x = tuning.player.run_speed;
                    self.facing = Facing::Right;
                }
            }
            Realm::Soul => {
                let swim = tuning.player.run_speed * tuning.player.swim_factor;
                if input.move_left {
                    self.body.vel.x = -swim;
                    self.facing = Facing::Left;
                }
                if input.move_right {
                    self.body.vel.x = swim;
                    self.facing = Facing::Right;
                }
                if input.move_up {
                    self.body.vel.y = -swim;
                }
                if input.move_down {
                    self.body.vel.y = swim;
                }
            }
        }
    }

    /// Start a dash if the cooldown allows it. Purely horizontal burst in
    /// the facing direction; returns whether it fired.
    pub fn try_dash(&mut self, tuning: &Tuning) -> bool {
        if self.dash_cooldown.is_active() {
            return false;
        }
        self.body.vel.x = self.facing.sign() * tuning.player.dash_speed;
        self.body.vel.y = 0.0;
        self.dash_window.arm(tuning.player.dash_duration);
        self.dash_cooldown.arm(tuning.player.dash_cooldown);
        true
    }

    /// Fire a projectile toward a world-space target, respecting the fire
    /// cooldown. Facing follows the horizontal sign of the shot.
    pub fn shoot(&mut self, id: u32, target: Vec2, tuning: &Tuning) -> Option<Projectile> {
        if self.fire_cooldown.is_active() {
            return None;
        }
        let dir = aim_direction(self.body.pos, target);
        self.facing = if dir.x >= 0.0 {
            Facing::Right
        } else {
            Facing::Left
        };
        self.fire_cooldown.arm(self.fire_interval);
        Some(Projectile::new(
            id,
            self.body.pos,
            dir * tuning.player.projectile_speed,
            tuning.player.projectile_lifetime,
        ))
    }

    /// Melee hitbox (center, half extents), offset in the facing direction.
    /// Stateless; the director tests it against enemies and discards it.
    pub fn melee_hitbox(&self, tuning: &Tuning) -> (Vec2, Vec2) {
        let center = self.body.pos + Vec2::new(self.facing.sign() * tuning.player.melee_reach, 0.0);
        (center, Vec2::new(25.0, 25.0))
    }

    /// Apply damage while Alive; ignored in Soul form.
    pub fn take_damage(&mut self, amount: f32, tuning: &Tuning) {
        if self.realm != Realm::Alive {
            return;
        }
        self.health = (self.health - amount).clamp(0.0, tuning.player.max_health);
    }

    /// Gain soul energy from a harvested echo; ignored while Alive.
    pub fn harvest(&mut self, amount: f32, tuning: &Tuning) {
        if self.realm != Realm::Soul {
            return;
        }
        self.soul_energy = (self.soul_energy + amount).min(tuning.player.max_soul_energy);
    }

    /// Lose soul energy to an echo's touch; ignored while Alive.
    pub fn drain_soul(&mut self, amount: f32) {
        if self.realm != Realm::Soul {
            return;
        }
        self.soul_energy = (self.soul_energy - amount).max(0.0);
    }

    /// The Shatter transition: drop into the under-realm just past the
    /// divide with a partial soul reserve. The director owns the latch that
    /// keeps this edge-triggered.
    pub fn shatter(&mut self, tuning: &Tuning) {
        self.realm = Realm::Soul;
        self.soul_energy = tuning.player.shatter_soul_energy;
        self.body.pos.y = DIVIDE_Y + self.body.half.y + 5.0;
    }

    /// The Resurrection transition: full vitals and a geyser launch back
    /// through the divide.
    pub fn resurrect(&mut self, tuning: &Tuning) {
        self.realm = Realm::Alive;
        self.health = tuning.player.max_health;
        self.soul_energy = tuning.player.max_soul_energy;
        self.escaped_through_portal = false;
        self.body.vel.y = tuning.player.burst_impulse;
    }

    /// One physics step for the current realm: drag, gravity, predictive
    /// divide resolution, jump-off-the-divide, portal contact, clamps.
    pub fn integrate(&mut self, jump: bool, portals: &[EscapePortal], dt: f32, tuning: &Tuning) {
        let regime = self.realm.regime();

        if self.realm == Realm::Soul {
            for portal in portals {
                if within_radius(
                    portal.pos,
                    portal.radius + self.body.half.y,
                    self.body.pos,
                ) {
                    self.escaped_through_portal = true;
                    break;
                }
            }
        }

        self.body.apply_drag(regime);
        self.body.apply_gravity(regime, dt);
        self.grounded = self.body.step(regime, dt);

        if self.grounded && jump {
            // Jump impulse points away from the divide: up on the surface,
            // down off the underside.
            self.body.vel.y = match self.realm {
                Realm::Alive => tuning.player.jump_impulse,
                Realm::Soul => -tuning.player.jump_impulse,
            };
        }

        self.body
            .clamp_vertical(regime, self.escaped_through_portal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn grounded_player(tuning: &Tuning) -> Player {
        let mut player = Player::new(
            Vec2::new(400.0, DIVIDE_Y - PLAYER_SIZE.y / 2.0),
            tuning,
        );
        player.integrate(false, &[], SIM_DT, tuning);
        player
    }

    #[test]
    fn test_new_player_is_alive_and_full() {
        let tuning = Tuning::default();
        let player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        assert_eq!(player.realm, Realm::Alive);
        assert_eq!(player.health, tuning.player.max_health);
    }

    #[test]
    fn test_damage_only_lands_while_alive() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        player.take_damage(30.0, &tuning);
        assert_eq!(player.health, 70.0);

        player.shatter(&tuning);
        player.take_damage(30.0, &tuning);
        assert_eq!(player.health, 70.0, "soul form ignores health damage");

        player.drain_soul(10.0);
        assert_eq!(player.soul_energy, 40.0);
    }

    #[test]
    fn test_soul_gains_ignored_while_alive() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        let before = player.soul_energy;
        player.harvest(10.0, &tuning);
        player.drain_soul(10.0);
        assert_eq!(player.soul_energy, before);
    }

    #[test]
    fn test_shatter_drops_player_below_divide() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        player.shatter(&tuning);
        assert_eq!(player.realm, Realm::Soul);
        assert_eq!(player.soul_energy, tuning.player.shatter_soul_energy);
        assert!(player.body.pos.y > DIVIDE_Y);
    }

    #[test]
    fn test_resurrect_restores_and_launches() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        player.shatter(&tuning);
        player.resurrect(&tuning);
        assert_eq!(player.realm, Realm::Alive);
        assert_eq!(player.health, tuning.player.max_health);
        assert_eq!(player.soul_energy, tuning.player.max_soul_energy);
        assert_eq!(player.body.vel.y, tuning.player.burst_impulse);
    }

    #[test]
    fn test_dash_locks_out_movement_input() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        assert!(player.try_dash(&tuning));
        assert!(player.is_dashing());
        assert_eq!(player.body.vel.x, tuning.player.dash_speed);

        let input = TickInput {
            move_left: true,
            ..Default::default()
        };
        player.apply_move_input(&input, &tuning);
        assert_eq!(
            player.body.vel.x, tuning.player.dash_speed,
            "directional input is ignored mid-dash"
        );

        // A second dash is gated by its cooldown.
        assert!(!player.try_dash(&tuning));
    }

    #[test]
    fn test_fire_cooldown_gates_shots() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        let target = Vec2::new(800.0, 300.0);
        assert!(player.shoot(1, target, &tuning).is_some());
        assert!(player.shoot(2, target, &tuning).is_none());

        player.tick_cooldowns(player.fire_interval + 0.01);
        assert!(player.shoot(3, target, &tuning).is_some());
    }

    #[test]
    fn test_shot_updates_facing() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        player.shoot(1, Vec2::new(0.0, 395.0), &tuning);
        assert_eq!(player.facing, Facing::Left);
        let (hitbox_center, _) = player.melee_hitbox(&tuning);
        assert!(hitbox_center.x < player.body.pos.x);
    }

    #[test]
    fn test_grounded_jump_leaves_the_divide() {
        let tuning = Tuning::default();
        let mut player = grounded_player(&tuning);
        assert!(player.grounded);
        player.integrate(true, &[], SIM_DT, &tuning);
        assert_eq!(player.body.vel.y, tuning.player.jump_impulse);
    }

    #[test]
    fn test_soul_jump_pushes_down_off_the_ceiling() {
        let tuning = Tuning::default();
        let mut player = grounded_player(&tuning);
        player.shatter(&tuning);
        // Let the soul drift up and stick to the underside first.
        for _ in 0..600 {
            player.integrate(false, &[], SIM_DT, &tuning);
        }
        assert!(player.grounded, "soul should be stuck to the divide");
        player.integrate(true, &[], SIM_DT, &tuning);
        assert_eq!(player.body.vel.y, -tuning.player.jump_impulse);
        assert!(player.body.vel.y > 0.0);
    }

    #[test]
    fn test_portal_contact_sets_escape_flag() {
        let tuning = Tuning::default();
        let mut player = Player::new(Vec2::new(400.0, 395.0), &tuning);
        player.shatter(&tuning);
        let portal = EscapePortal {
            pos: player.body.pos + Vec2::new(20.0, 30.0),
            radius: 40.0,
        };
        player.integrate(false, &[portal], SIM_DT, &tuning);
        assert!(player.escaped_through_portal);
    }
}
