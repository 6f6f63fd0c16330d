//! Pet preferences
//!
//! Persisted separately from the model so that the popup can change them
//! without touching simulation state.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError};
use crate::platform::Message;

/// What the driver has to do after a message was applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Nothing changed
    None,
    /// Pet was switched on or off
    EnabledChanged(bool),
    /// Audio gain changed
    VolumeChanged(f32),
    /// Drop a debug apple above the pet
    DropApple,
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pet is shown and simulated
    pub enabled: bool,
    /// Audio gain (0.0 - 1.0)
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "yippeeSettings";

    /// Apply a control message
    pub fn apply(&mut self, message: &Message) -> Effect {
        match *message {
            Message::EnableDisable { enable } => {
                let enabled = enable.unwrap_or(!self.enabled);
                if enabled == self.enabled {
                    return Effect::None;
                }
                self.enabled = enabled;
                Effect::EnabledChanged(enabled)
            }
            Message::SetVolume { volume } => {
                let volume = if volume.is_finite() {
                    volume.clamp(0.0, 1.0)
                } else {
                    self.volume
                };
                if volume == self.volume {
                    return Effect::None;
                }
                self.volume = volume;
                Effect::VolumeChanged(volume)
            }
            Message::Cheat => Effect::DropApple,
        }
    }

    /// Load settings, falling back to defaults
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Discarding saved settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Failed to read settings: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings
    pub fn save<S: Storage>(&self, storage: &S) -> Result<(), StorageError> {
        let json = serde_json::to_string(self)?;
        storage.set_item(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
