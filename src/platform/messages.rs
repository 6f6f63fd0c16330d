//! Control messages from the popup and other contexts
//!
//! Messages arrive as JSON objects tagged by `type`, e.g.
//! `{"type":"set-volume","volume":0.4}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Message {
    /// Toggle the pet, or force a state when `enable` is present
    EnableDisable {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enable: Option<bool>,
    },
    /// Set the audio gain (0.0 - 1.0)
    SetVolume { volume: f32 },
    /// Debug hook: drop an apple above the pet
    Cheat,
}

impl Message {
    /// Decode a message, returning `None` for unknown or malformed payloads
    pub fn parse(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(msg) => Some(msg),
            Err(e) => {
                log::warn!("Ignoring message {}: {}", json, e);
                None
            }
        }
    }
}
