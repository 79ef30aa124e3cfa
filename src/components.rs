//! Built-in component payloads consumed by the display system

use serde::{Deserialize, Serialize};

use crate::ecs::Component;

/// Kind name for [`WorldLocationData`].
pub const WORLD_LOCATION: &str = "worldLocation";
/// Kind name for [`DrawableData`].
pub const DRAWABLE: &str = "drawable";

/// Position in world/display units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldLocationData {
    pub x: f32,
    pub y: f32,
}

impl WorldLocationData {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Component for WorldLocationData {}

/// Something the display system can paint.
///
/// A rect with neither `color` nor `stroke_color` is allowed; it simply
/// draws nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum DrawableData {
    Text {
        content: String,
        color: String,
    },
    #[serde(rename_all = "camelCase")]
    Rect {
        width: f32,
        height: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stroke_width: Option<f32>,
    },
}

impl DrawableData {
    pub fn text(content: impl Into<String>, color: impl Into<String>) -> Self {
        DrawableData::Text {
            content: content.into(),
            color: color.into(),
        }
    }

    pub fn filled_rect(width: f32, height: f32, color: impl Into<String>) -> Self {
        DrawableData::Rect {
            width,
            height,
            color: Some(color.into()),
            stroke_color: None,
            stroke_width: None,
        }
    }

    pub fn stroked_rect(
        width: f32,
        height: f32,
        stroke_color: impl Into<String>,
        stroke_width: f32,
    ) -> Self {
        DrawableData::Rect {
            width,
            height,
            color: None,
            stroke_color: Some(stroke_color.into()),
            stroke_width: Some(stroke_width),
        }
    }
}

impl Component for DrawableData {}
