//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod player;
pub mod state;
pub mod tick;
pub mod timer;

pub use body::{Body, Regime};
pub use collision::{aabb_overlap, bodies_overlap, hitbox_overlaps, within_radius};
pub use player::{Facing, Player, Realm, PLAYER_SIZE};
pub use state::{
    Echo, EchoOrigin, Enemy, EnemyKind, EscapePortal, GameEvent, GamePhase, GameState,
    PendingEcho, Projectile, ProjectileTint,
};
pub use tick::{tick, TickInput};
pub use timer::Cooldown;
