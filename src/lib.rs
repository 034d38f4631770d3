//! Souls of the Beneath - a dual-realm action simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player state machine, realm physics, spawning)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio and UI are external consumers: they read entity positions,
//! vitals and the per-tick event pulses out of `sim::GameState` and feed
//! nothing back except `sim::TickInput`.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Nominal view dimensions; the world scrolls infinitely on X,
    /// so the width only matters for off-screen spawn placement
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// The divide: floor of the surface world, ceiling of the under-realm.
    /// Fixed for the whole session; every collision references it.
    pub const DIVIDE_Y: f32 = 480.0;

    /// Surface gravity (pixels/s², downward)
    pub const GRAVITY_SURFACE: f32 = 1600.0;
    /// Under-realm gravity (pixels/s², upward toward the divide)
    pub const GRAVITY_UNDER: f32 = 600.0;
    /// Per-tick horizontal velocity decay on the surface
    pub const DRAG_SURFACE: f32 = 0.85;
    /// Per-tick horizontal velocity decay in the heavy under-realm water
    pub const DRAG_UNDER: f32 = 0.90;
}

/// Normalized direction from `from` to `to`.
///
/// Degenerate targets (on top of `from`) resolve to zero instead of NaN by
/// flooring the distance at one pixel.
#[inline]
pub fn aim_direction(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    delta / delta.length().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_direction_is_normalized() {
        let dir = aim_direction(Vec2::new(10.0, 20.0), Vec2::new(310.0, 420.0));
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.y > 0.0);
    }

    #[test]
    fn test_aim_direction_degenerate_target() {
        let p = Vec2::new(5.0, 5.0);
        let dir = aim_direction(p, p);
        assert!(dir.x.is_finite() && dir.y.is_finite());
        assert_eq!(dir, Vec2::ZERO);
    }
}
