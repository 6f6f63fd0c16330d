//! Yippee - a desktop pet that follows the cursor around the page
//!
//! Core modules:
//! - `sim`: Pure simulation (delta timer, steering, apples, model)
//! - `scheduler`: Frame loop state machine, visibility gating, save policy
//! - `persistence`: Load/save of the model with external change notification
//! - `platform`: Input mapping and cross-context control messages
//! - `settings`: Enable/disable and volume preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod persistence;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use scheduler::{CancelToken, FrameScheduler, SchedulerState, TickOutcome, Visibility};
pub use settings::Settings;

/// Tuning constants
pub mod consts {
    /// Upper bound for a single physics step (seconds)
    pub const MAX_DELTA: f32 = 0.5;

    /// Distance the pet tries to keep from the cursor (px)
    pub const ARRIVAL_RADIUS: f32 = 200.0;
    /// Maximum horizontal pet speed (px/s)
    pub const MAX_SPEED: f32 = 100.0;
    /// Where a pet with no saved position starts (just off-screen left)
    pub const DEFAULT_PET_X: f32 = -20.0;
    pub const DEFAULT_PET_Y: f32 = 0.0;

    /// Apple fall speed (px/s)
    pub const FALL_SPEED: f32 = 1000.0;
    /// Apple spin rate at rotation_velocity = 1 (radians/s)
    pub const APPLE_SPIN: f32 = 6.0;
    /// Seconds an apple lies on the floor before it is removed
    pub const APPLE_REST_SECONDS: f32 = 10.0;
    /// Maximum apples on the page; oldest are evicted first
    pub const MAX_APPLES: usize = 64;
}
