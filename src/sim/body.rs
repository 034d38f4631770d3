//! Physics bodies and the divide plane
//!
//! One coordinate space, two regimes: the divide at `DIVIDE_Y` is a floor
//! for surface bodies and a ceiling for under-realm bodies, with gravity
//! pointing at it from both sides. Divide resolution is predictive: the
//! crossing test runs against the body's *next* position, before the move
//! is applied, so a fast body snaps to the plane instead of tunneling
//! through it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DIVIDE_Y, DRAG_SURFACE, DRAG_UNDER, GRAVITY_SURFACE, GRAVITY_UNDER, SCREEN_HEIGHT,
};

/// Slack used when deciding whether a body counts as resting on the divide
const SUPPORT_SLACK: f32 = 5.0;

/// Which side of the divide a body's physics follow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Above the divide: gravity down, the divide is a floor
    Surface,
    /// Below the divide: gravity up, the divide is a ceiling
    Under,
}

/// An axis-aligned physics body (center position + half extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            half: size / 2.0,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half.y
    }

    /// Accelerate toward the divide at the regime's gravity
    pub fn apply_gravity(&mut self, regime: Regime, dt: f32) {
        match regime {
            Regime::Surface => self.vel.y += GRAVITY_SURFACE * dt,
            Regime::Under => self.vel.y -= GRAVITY_UNDER * dt,
        }
    }

    /// Per-tick horizontal decay; the under-realm water is thicker
    pub fn apply_drag(&mut self, regime: Regime) {
        match regime {
            Regime::Surface => self.vel.x *= DRAG_SURFACE,
            Regime::Under => self.vel.x *= DRAG_UNDER,
        }
    }

    /// Advance one tick, resolving the divide plane predictively.
    ///
    /// Returns true when the body ends the tick in contact with the divide
    /// (grounded on it from above, or stuck to its underside from below).
    pub fn step(&mut self, regime: Regime, dt: f32) -> bool {
        let contact = match regime {
            Regime::Surface => {
                let next_bottom = self.bottom() + self.vel.y * dt;
                if next_bottom >= DIVIDE_Y {
                    self.vel.y = 0.0;
                    self.pos.y = DIVIDE_Y - self.half.y;
                    true
                } else {
                    self.pos.y += self.vel.y * dt;
                    false
                }
            }
            Regime::Under => {
                let next_top = self.top() + self.vel.y * dt;
                if next_top <= DIVIDE_Y {
                    self.vel.y = 0.0;
                    self.pos.y = DIVIDE_Y + self.half.y;
                    true
                } else {
                    self.pos.y += self.vel.y * dt;
                    false
                }
            }
        };

        self.pos.x += self.vel.x * dt;
        contact
    }

    /// Whether the body is close enough to the divide to hop off it
    pub fn is_supported(&self, regime: Regime) -> bool {
        match regime {
            Regime::Surface => self.bottom() >= DIVIDE_Y - SUPPORT_SLACK,
            Regime::Under => self.top() <= DIVIDE_Y + SUPPORT_SLACK,
        }
    }

    /// Clamp vertical position to the visible band.
    ///
    /// X is never clamped (infinite scroll). Surface bodies may not leave
    /// the top of the screen; under-realm bodies may not poke above the
    /// divide unless `allow_above_divide` is set (the one-tick window where
    /// a portal escape is being resolved). The underside clamp also kills
    /// upward velocity so a body bonks instead of grinding on the glass.
    pub fn clamp_vertical(&mut self, regime: Regime, allow_above_divide: bool) {
        if self.bottom() > SCREEN_HEIGHT {
            self.pos.y = SCREEN_HEIGHT - self.half.y;
        }
        match regime {
            Regime::Surface => {
                if self.top() < 0.0 {
                    self.pos.y = self.half.y;
                }
            }
            Regime::Under => {
                if self.top() < DIVIDE_Y && !allow_above_divide {
                    self.pos.y = DIVIDE_Y + self.half.y;
                    self.vel.y = self.vel.y.max(0.0);
                }
            }
        }
    }
}
