//! Pet simulation module
//!
//! All model/update logic lives here. This module must stay pure:
//! - Time only enters through `FrameTick`
//! - Randomness only through a caller-supplied RNG
//! - No DOM, storage or audio dependencies

pub mod apples;
pub mod clock;
pub mod state;
pub mod steering;
pub mod tick;

#[cfg(test)]
mod proptest_sim;

pub use apples::{Apple, add_apple};
pub use clock::{DeltaTimer, FrameTick, clamp_delta};
pub use state::{PetState, RootModel, SchemaError};
pub use tick::{Event, Viewport, update};
