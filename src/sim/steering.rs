//! Seek-with-arrival steering for the pet
//!
//! The pet walks along the floor toward the cursor until it is
//! `ARRIVAL_RADIUS` away, and backs off when the cursor comes closer than
//! that. Only `x` is integrated; the vertical offset to the target still
//! tilts the approach angle, so a cursor high above the pet slows it down.

use glam::Vec2;

use super::state::PetState;
use crate::consts::{ARRIVAL_RADIUS, MAX_SPEED};

/// Signed horizontal speed the pet wants for a displacement to its target
#[inline]
pub fn desired_speed(diff: Vec2) -> f32 {
    let distance = diff.length();
    let angle = diff.y.atan2(diff.x);
    angle.cos() * (distance - ARRIVAL_RADIUS)
}

/// Displacement from the pet's center to its target.
///
/// The sprite is anchored at its bottom edge, so the center sits half a
/// sprite height above `pos.y`.
#[inline]
pub fn displacement(pet: &PetState, sprite_height: f32) -> Vec2 {
    let center = Vec2::new(pet.pos.x, pet.pos.y + 0.5 * sprite_height);
    pet.target_pos - center
}

/// Advance the pet by `delta` seconds
pub fn update(pet: &mut PetState, delta: f32, sprite_height: f32) {
    let diff = displacement(pet, sprite_height);
    let speed = desired_speed(diff).clamp(-MAX_SPEED, MAX_SPEED);

    pet.pos.x += speed * delta;
    pet.flipped = diff.x > 0.0;
}
