//! Model update
//!
//! Every input reaching the model goes through `update` as an `Event`.

use glam::Vec2;
use rand::Rng;

use super::apples;
use super::clock::FrameTick;
use super::state::RootModel;
use super::steering;

/// Render-dependent measurements supplied by the view each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Viewport height (px); apples are pinned to `[0, height]`
    pub height: f32,
    /// Rendered pet sprite height (px)
    pub sprite_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            height: 720.0,
            sprite_height: 0.0,
        }
    }
}

/// Inputs to the model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// One animation frame elapsed
    Frame(FrameTick),
    /// Pointer moved (page space, y up)
    PointerMoved(Vec2),
    /// A drag was released (page space, y up)
    AppleDropped(Vec2),
}

/// Apply one event to the model
pub fn update<R: Rng>(model: &mut RootModel, event: Event, viewport: Viewport, rng: &mut R) {
    match event {
        Event::Frame(tick) => {
            steering::update(&mut model.yippee, tick.delta, viewport.sprite_height);
            let removed = apples::update(&mut model.apples, tick.delta, viewport.height);
            if removed > 0 {
                log::debug!("Removed {} resting apples", removed);
            }
        }
        Event::PointerMoved(pos) => {
            if pos.is_finite() {
                model.yippee.target_pos = pos;
            }
        }
        Event::AppleDropped(pos) => {
            apples::add_apple(&mut model.apples, pos, rng);
        }
    }
}
