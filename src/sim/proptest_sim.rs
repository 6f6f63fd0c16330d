//! Property-based tests for the pet simulation using proptest.

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::apples::{self, Apple, add_apple};
use super::clock::clamp_delta;
use super::state::{PetState, RootModel};
use super::steering;
use crate::consts::{ARRIVAL_RADIUS, MAX_APPLES, MAX_DELTA, MAX_SPEED};

fn arb_point() -> impl Strategy<Value = Vec2> {
    (-5000.0f32..5000.0, -5000.0f32..5000.0).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_apple() -> impl Strategy<Value = Apple> {
    (arb_point(), -1.0f32..=1.0, 0.0f32..std::f32::consts::TAU, 0.0f32..10.0).prop_map(
        |(pos, rotation_velocity, rotation, rest)| Apple {
            pos,
            rotation_velocity,
            rotation,
            rest,
        },
    )
}

fn arb_model() -> impl Strategy<Value = RootModel> {
    (
        arb_point(),
        arb_point(),
        any::<bool>(),
        prop::collection::vec(arb_apple(), 0..8),
    )
        .prop_map(|(pos, target_pos, flipped, apples)| RootModel {
            yippee: PetState {
                pos,
                target_pos,
                flipped,
            },
            apples,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Clamped delta always lies in [0, MAX_DELTA].
    #[test]
    fn prop_delta_is_clamped(raw in prop::num::f32::ANY) {
        let delta = clamp_delta(raw);
        prop_assert!((0.0..=MAX_DELTA).contains(&delta));
    }

    /// A pet sitting exactly at the arrival radius does not move.
    #[test]
    fn prop_equilibrium_is_idempotent(x in -2000i32..2000, delta in 0.0f32..=MAX_DELTA) {
        // Whole pixels keep `target - pos` exactly equal to the radius
        let x = x as f32;
        let mut pet = PetState {
            pos: Vec2::new(x, 0.0),
            target_pos: Vec2::new(x + ARRIVAL_RADIUS, 0.0),
            flipped: false,
        };
        steering::update(&mut pet, delta, 0.0);
        prop_assert_eq!(pet.pos.x, x);
    }

    /// `flipped` tracks which side of the pet the target is on, and the
    /// step is never large enough to cross over it.
    #[test]
    fn prop_flipped_matches_target_side(
        pos in arb_point(),
        target in arb_point(),
        delta in 0.0f32..=MAX_DELTA,
    ) {
        prop_assume!((target.x - pos.x).abs() > 1.0);
        let mut pet = PetState { pos, target_pos: target, flipped: false };
        steering::update(&mut pet, delta, 0.0);
        prop_assert_eq!(pet.flipped, target.x - pet.pos.x > 0.0);
    }

    /// Steering output stays finite and bounded by the speed limit.
    #[test]
    fn prop_step_is_bounded(
        pos in arb_point(),
        target in arb_point(),
        sprite_height in 0.0f32..400.0,
        delta in 0.0f32..=MAX_DELTA,
    ) {
        let mut pet = PetState { pos, target_pos: target, flipped: true };
        steering::update(&mut pet, delta, sprite_height);
        prop_assert!(pet.pos.is_finite());
        prop_assert!((pet.pos.x - pos.x).abs() <= MAX_SPEED * delta + 1e-3);
        prop_assert_eq!(pet.pos.y, pos.y);
    }

    /// However many apples were added, a frame brings the list back under the cap.
    #[test]
    fn prop_update_respects_cap(
        existing in prop::collection::vec(arb_apple(), 0..MAX_APPLES * 2),
        delta in 0.0f32..=MAX_DELTA,
    ) {
        let mut list = existing.clone();
        apples::update(&mut list, delta, 1000.0);
        prop_assert!(list.len() <= MAX_APPLES);
    }

    /// Apples always end up inside [0, viewport height].
    #[test]
    fn prop_apple_y_is_clamped(
        y in -10_000.0f32..10_000.0,
        delta in 0.0f32..=MAX_DELTA,
        height in 0.0f32..4000.0,
    ) {
        let mut list = vec![Apple::new(Vec2::new(0.0, y), 0.0)];
        apples::update(&mut list, delta, height);
        for apple in &list {
            prop_assert!(apple.pos.y >= 0.0 && apple.pos.y <= height);
        }
    }

    /// Adding an apple grows the list by one and leaves the rest alone.
    #[test]
    fn prop_add_apple_is_append_only(
        existing in prop::collection::vec(arb_apple(), 0..MAX_APPLES * 2),
        pos in arb_point(),
        seed in any::<u64>(),
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut list = existing.clone();
        add_apple(&mut list, pos, &mut rng);
        prop_assert_eq!(list.len(), existing.len() + 1);
        prop_assert_eq!(&list[..existing.len()], &existing[..]);
        prop_assert_eq!(list[existing.len()].pos, pos);
    }

    /// Saved models load back unchanged.
    #[test]
    fn prop_save_load_roundtrip(model in arb_model()) {
        let json = model.to_json().unwrap();
        let loaded = RootModel::validate(&json).unwrap();
        prop_assert_eq!(loaded, model);
    }
}

/// Starting 500px from the cursor, the pet approaches the 300px standoff
/// point without ever stepping past it.
#[test]
fn test_steering_converges_without_overshoot() {
    let mut pet = PetState {
        pos: Vec2::ZERO,
        target_pos: Vec2::new(500.0, 0.0),
        flipped: false,
    };
    let equilibrium = 500.0 - ARRIVAL_RADIUS;
    let delta = 0.1;

    let mut prev_gap = equilibrium - pet.pos.x;
    for _ in 0..200 {
        steering::update(&mut pet, delta, 0.0);
        let gap = equilibrium - pet.pos.x;
        assert!(gap >= -1e-3, "overshot equilibrium: x = {}", pet.pos.x);
        assert!(gap <= prev_gap + 1e-4, "moved away: {} -> {}", prev_gap, gap);
        assert!(prev_gap - gap <= MAX_SPEED * delta + 1e-3);
        prev_gap = gap;
    }
    assert!(prev_gap < 1.0, "did not settle: x = {}", pet.pos.x);
}
