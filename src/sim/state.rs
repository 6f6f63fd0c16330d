//! Pet model and its persisted schema
//!
//! The model is stored as a single JSON object. Loading is lenient: every
//! missing, `null` or non-finite sub-field falls back to its own default while
//! present fields are kept, so older and newer extension versions can share a
//! save. Values of the wrong type are a `SchemaError`, and the caller decides
//! to start over from `RootModel::default()`.

use glam::Vec2;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use super::apples::Apple;
use crate::consts::{DEFAULT_PET_X, DEFAULT_PET_Y};

/// Why a stored model could not be used
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("stored model is not valid JSON: {0}")]
    Syntax(serde_json::Error),
    #[error("stored model has an incompatible shape: {0}")]
    Shape(serde_json::Error),
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => SchemaError::Shape(err),
            _ => SchemaError::Syntax(err),
        }
    }
}

/// The cursor-following sprite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PetState {
    /// Current sprite position
    #[serde(serialize_with = "serialize_point")]
    pub pos: Vec2,
    /// Last pointer position (page space, y up)
    #[serde(rename = "targetPos", serialize_with = "serialize_point")]
    pub target_pos: Vec2,
    /// Facing right
    pub flipped: bool,
}

impl Default for PetState {
    fn default() -> Self {
        Self {
            pos: Vec2::new(DEFAULT_PET_X, DEFAULT_PET_Y),
            target_pos: Vec2::ZERO,
            flipped: true,
        }
    }
}

/// Everything that survives a page reload
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "StoredModel")]
pub struct RootModel {
    pub yippee: PetState,
    pub apples: Vec<Apple>,
}

impl RootModel {
    /// Parse a stored model, defaulting missing fields one by one
    pub fn validate(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub(crate) fn serialize_point<S: Serializer>(v: &Vec2, s: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Point {
        x: f32,
        y: f32,
    }
    Point { x: v.x, y: v.y }.serialize(s)
}

#[inline]
fn finite_or(value: Option<f32>, fallback: f32) -> f32 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

// Lenient mirrors of the persisted shape. Every field is optional so that
// `null` and absent values both default instead of failing.

#[derive(Debug, Default, Deserialize)]
struct StoredPoint {
    x: Option<f32>,
    y: Option<f32>,
}

impl StoredPoint {
    fn resolve(point: Option<StoredPoint>, fallback: Vec2) -> Vec2 {
        let point = point.unwrap_or_default();
        Vec2::new(finite_or(point.x, fallback.x), finite_or(point.y, fallback.y))
    }
}

#[derive(Debug, Default, Deserialize)]
struct StoredPet {
    pos: Option<StoredPoint>,
    #[serde(rename = "targetPos")]
    target_pos: Option<StoredPoint>,
    flipped: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct StoredApple {
    pos: Option<StoredPoint>,
    rol: Option<f32>,
    rotation: Option<f32>,
    rest: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct StoredModel {
    yippee: Option<StoredPet>,
    apples: Option<Vec<StoredApple>>,
}

impl From<StoredPet> for PetState {
    fn from(stored: StoredPet) -> Self {
        let default = PetState::default();
        Self {
            pos: StoredPoint::resolve(stored.pos, default.pos),
            target_pos: StoredPoint::resolve(stored.target_pos, default.target_pos),
            flipped: stored.flipped.unwrap_or(default.flipped),
        }
    }
}

impl From<StoredApple> for Apple {
    fn from(stored: StoredApple) -> Self {
        Self {
            pos: StoredPoint::resolve(stored.pos, Vec2::ZERO),
            rotation_velocity: finite_or(stored.rol, 0.0).clamp(-1.0, 1.0),
            rotation: finite_or(stored.rotation, 0.0),
            rest: finite_or(stored.rest, 0.0).max(0.0),
        }
    }
}

impl From<StoredModel> for RootModel {
    fn from(stored: StoredModel) -> Self {
        Self {
            yippee: stored.yippee.unwrap_or_default().into(),
            apples: stored
                .apples
                .unwrap_or_default()
                .into_iter()
                .map(Apple::from)
                .collect(),
        }
    }
}
