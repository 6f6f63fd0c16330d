//! Platform abstraction layer
//!
//! Handles browser-facing conventions that the simulation must not know about:
//! - Pointer coordinates (client space, y down) to page space (y up)
//! - Control messages sent by the popup and other contexts

pub mod input;
pub mod messages;

pub use input::{DragTracker, page_point};
pub use messages::Message;
