//! Apples dropped onto the page
//!
//! An apple is appended wherever a drag is released and falls to the
//! viewport floor (`y = 0` in page space, y up). Grounded apples are removed
//! after lying still for `APPLE_REST_SECONDS`, and each frame trims the
//! collection back to `MAX_APPLES`.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::state::serialize_point;
use crate::consts::{APPLE_REST_SECONDS, APPLE_SPIN, FALL_SPEED, MAX_APPLES};

/// A single apple
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Apple {
    #[serde(serialize_with = "serialize_point")]
    pub pos: Vec2,
    /// Spin direction and strength in [-1, 1]
    #[serde(rename = "rol")]
    pub rotation_velocity: f32,
    /// Current rotation (radians)
    pub rotation: f32,
    /// Seconds spent lying on the floor
    pub rest: f32,
}

impl Apple {
    pub fn new(pos: Vec2, rotation_velocity: f32) -> Self {
        Self {
            pos,
            rotation_velocity: rotation_velocity.clamp(-1.0, 1.0),
            rotation: 0.0,
            rest: 0.0,
        }
    }

    /// Whether the apple has reached the floor
    pub fn grounded(&self) -> bool {
        self.pos.y <= 0.0
    }
}

/// Append a new apple at `pos` with a random spin.
///
/// Existing apples are never touched; the cap is enforced by `update`.
pub fn add_apple<R: Rng>(apples: &mut Vec<Apple>, pos: Vec2, rng: &mut R) {
    let pos = if pos.is_finite() { pos } else { Vec2::ZERO };
    let spin = rng.random_range(-1.0..=1.0);
    apples.push(Apple::new(pos, spin));
}

/// Advance every apple by `delta` seconds.
///
/// Returns how many apples were removed, either after resting on the floor
/// or because the collection was over `MAX_APPLES` (oldest first).
pub fn update(apples: &mut Vec<Apple>, delta: f32, viewport_height: f32) -> usize {
    let ceiling = if viewport_height.is_finite() {
        viewport_height.max(0.0)
    } else {
        0.0
    };

    for apple in apples.iter_mut() {
        apple.pos.y = (apple.pos.y - delta * FALL_SPEED).clamp(0.0, ceiling);

        if apple.grounded() {
            apple.rest += delta;
        } else {
            apple.rest = 0.0;
            apple.rotation = (apple.rotation + apple.rotation_velocity * APPLE_SPIN * delta)
                .rem_euclid(std::f32::consts::TAU);
        }
    }

    let before = apples.len();
    apples.retain(|a| a.rest <= APPLE_REST_SECONDS);
    if apples.len() > MAX_APPLES {
        let excess = apples.len() - MAX_APPLES;
        apples.drain(..excess);
        log::debug!("Apple cap reached, evicted {} oldest", excess);
    }
    before - apples.len()
}
