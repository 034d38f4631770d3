//! Overlap tests between bodies, hitboxes and portals
//!
//! Everything in the sim is an axis-aligned box except portals, which are
//! circles; the tests here are the whole collision vocabulary the director
//! needs. Resolution (damage, removal, harvest) stays in the tick.

use glam::Vec2;

use super::body::Body;

/// Axis-aligned overlap between two center/half-extent boxes
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    (a_pos.x - b_pos.x).abs() < a_half.x + b_half.x
        && (a_pos.y - b_pos.y).abs() < a_half.y + b_half.y
}

/// Overlap between two physics bodies
#[inline]
pub fn bodies_overlap(a: &Body, b: &Body) -> bool {
    aabb_overlap(a.pos, a.half, b.pos, b.half)
}

/// Overlap between a transient hitbox (melee swing) and a body
#[inline]
pub fn hitbox_overlaps(center: Vec2, half: Vec2, body: &Body) -> bool {
    aabb_overlap(center, half, body.pos, body.half)
}

/// Whether `point` sits within `radius` of `center`.
///
/// Portal contact uses this with the portal radius padded by the player's
/// half height, so brushing a portal counts as entering it.
#[inline]
pub fn within_radius(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance_squared(point) < radius * radius
}
