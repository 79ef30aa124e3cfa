//! Display system - owns surface configuration and builds a frame per tick
//!
//! Actual pixel output belongs to a [`RenderBackend`]. The display system
//! only turns `worldLocation` + `drawable` entities into [`DrawCommand`]s and
//! hands the resulting [`Frame`] over.

mod backend;
mod writer;

use std::any::Any;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use backend::{FrameRecorder, RenderBackend};
pub use writer::{FrameDump, FrameMetadata, FrameWriter};

use crate::components::{DrawableData, WorldLocationData, DRAWABLE, WORLD_LOCATION};
use crate::ecs::{System, SystemContext};

/// Name the engine registers the display system under.
pub const DISPLAY_SYSTEM: &str = "display";

const DEFAULT_STROKE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// One paint operation, already positioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Text {
        x: f32,
        y: f32,
        content: String,
        color: String,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: String,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: String,
        line_width: f32,
    },
}

impl DrawCommand {
    /// `None` for a rect with neither fill nor stroke color.
    pub fn from_drawable(location: &WorldLocationData, drawable: &DrawableData) -> Option<Self> {
        let WorldLocationData { x, y } = *location;
        match drawable {
            DrawableData::Text { content, color } => Some(DrawCommand::Text {
                x,
                y,
                content: content.clone(),
                color: color.clone(),
            }),
            DrawableData::Rect {
                width,
                height,
                color: Some(color),
                ..
            } => Some(DrawCommand::FillRect {
                x,
                y,
                width: *width,
                height: *height,
                color: color.clone(),
            }),
            DrawableData::Rect {
                width,
                height,
                color: None,
                stroke_color: Some(stroke_color),
                stroke_width,
            } => Some(DrawCommand::StrokeRect {
                x,
                y,
                width: *width,
                height: *height,
                color: stroke_color.clone(),
                line_width: stroke_width.unwrap_or(DEFAULT_STROKE_WIDTH),
            }),
            DrawableData::Rect { .. } => None,
        }
    }
}

/// Everything a backend needs to paint one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: u64,
    pub width: u32,
    pub height: u32,
    pub smoothing: bool,
    pub commands: Vec<DrawCommand>,
}

pub struct DisplaySystem {
    size: Size,
    smoothing: bool,
    last_frame: Option<Frame>,
    backend: Option<Box<dyn RenderBackend>>,
}

impl DisplaySystem {
    /// Smoothing starts enabled.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size { width, height },
            smoothing: true,
            last_frame: None,
            backend: None,
        }
    }

    pub fn with_backend(mut self, backend: Box<dyn RenderBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn set_backend(&mut self, backend: Box<dyn RenderBackend>) {
        self.backend = Some(backend);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = Size { width, height };
    }

    pub fn disable_smoothing(&mut self) {
        self.smoothing = false;
    }

    pub fn enable_smoothing(&mut self) {
        self.smoothing = true;
    }

    pub fn smoothing_enabled(&self) -> bool {
        self.smoothing
    }

    /// Attached backend, if it is a `T`.
    pub fn backend_as<T: RenderBackend + 'static>(&self) -> Option<&T> {
        self.backend.as_deref()?.as_any().downcast_ref::<T>()
    }

    pub fn backend_as_mut<T: RenderBackend + 'static>(&mut self) -> Option<&mut T> {
        self.backend.as_deref_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Frame built on the most recent tick.
    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    fn build_frame(&self, ctx: &SystemContext<'_>) -> Result<Frame> {
        let drawn = ctx.query(&[WORLD_LOCATION, DRAWABLE])?;
        let mut commands = Vec::with_capacity(drawn.len());
        for entity in &drawn {
            let location = ctx.get_component::<WorldLocationData>(entity, WORLD_LOCATION)?;
            let drawable = ctx.get_component::<DrawableData>(entity, DRAWABLE)?;
            if let (Some(location), Some(drawable)) = (location, drawable) {
                commands.extend(DrawCommand::from_drawable(location, drawable));
            }
        }
        Ok(Frame {
            tick: ctx.tick,
            width: self.size.width,
            height: self.size.height,
            smoothing: self.smoothing,
            commands,
        })
    }
}

impl System for DisplaySystem {
    fn required_components(&self) -> &[&'static str] {
        &[WORLD_LOCATION, DRAWABLE]
    }

    fn on_tick(&mut self, ctx: &mut SystemContext<'_>) -> Result<()> {
        let frame = self.build_frame(ctx)?;
        if let Some(backend) = self.backend.as_mut() {
            backend.present(&frame)?;
        }
        self.last_frame = Some(frame);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_toggle_is_idempotent() {
        let mut display = DisplaySystem::new(800, 600);
        assert!(display.smoothing_enabled());

        display.disable_smoothing();
        display.disable_smoothing();
        assert!(!display.smoothing_enabled());
        assert_eq!(display.size(), Size { width: 800, height: 600 });

        display.enable_smoothing();
        assert!(display.smoothing_enabled());
    }

    #[test]
    fn test_resize() {
        let mut display = DisplaySystem::new(800, 600);
        display.resize(320, 240);
        assert_eq!(display.size(), Size { width: 320, height: 240 });
    }

    #[test]
    fn test_draw_command_per_variant() {
        let at = WorldLocationData::new(3.0, 4.0);

        assert_eq!(
            DrawCommand::from_drawable(&at, &DrawableData::text("hi", "#111")),
            Some(DrawCommand::Text {
                x: 3.0,
                y: 4.0,
                content: "hi".into(),
                color: "#111".into(),
            })
        );
        assert_eq!(
            DrawCommand::from_drawable(&at, &DrawableData::filled_rect(2.0, 5.0, "#222")),
            Some(DrawCommand::FillRect {
                x: 3.0,
                y: 4.0,
                width: 2.0,
                height: 5.0,
                color: "#222".into(),
            })
        );
        assert_eq!(
            DrawCommand::from_drawable(&at, &DrawableData::stroked_rect(2.0, 5.0, "#333", 2.5)),
            Some(DrawCommand::StrokeRect {
                x: 3.0,
                y: 4.0,
                width: 2.0,
                height: 5.0,
                color: "#333".into(),
                line_width: 2.5,
            })
        );
    }

    #[test]
    fn test_fill_wins_over_stroke_and_empty_rect_draws_nothing() {
        let at = WorldLocationData::default();
        let both = DrawableData::Rect {
            width: 1.0,
            height: 1.0,
            color: Some("#fff".into()),
            stroke_color: Some("#000".into()),
            stroke_width: None,
        };
        assert!(matches!(
            DrawCommand::from_drawable(&at, &both),
            Some(DrawCommand::FillRect { .. })
        ));

        let stroke_only = DrawableData::Rect {
            width: 1.0,
            height: 1.0,
            color: None,
            stroke_color: Some("#000".into()),
            stroke_width: None,
        };
        assert!(matches!(
            DrawCommand::from_drawable(&at, &stroke_only),
            Some(DrawCommand::StrokeRect { line_width, .. }) if line_width == 1.0
        ));

        let invisible = DrawableData::Rect {
            width: 1.0,
            height: 1.0,
            color: None,
            stroke_color: None,
            stroke_width: Some(3.0),
        };
        assert_eq!(DrawCommand::from_drawable(&at, &invisible), None);
    }

    #[test]
    fn test_backend_is_reachable_by_type() {
        let mut display = DisplaySystem::new(10, 10);
        assert!(display.backend_as::<FrameRecorder>().is_none());

        display.set_backend(Box::new(FrameRecorder::new(4)));
        assert!(display.backend_as::<FrameWriter>().is_none());
        assert!(display
            .backend_as::<FrameRecorder>()
            .is_some_and(|recorder| recorder.frames().is_empty()));
        assert!(display.backend_as_mut::<FrameRecorder>().is_some());
    }
}
