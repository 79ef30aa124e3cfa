//! Stress workload - fills the world with random drawables
//!
//! Positions are bounded by the display size. Most entities are rects, half
//! of them outlined and half filled; the rest are short text labels.

use rand::Rng;

use crate::components::{DrawableData, WorldLocationData, DRAWABLE, WORLD_LOCATION};
use crate::config::StressConfig;
use crate::display::Size;
use crate::ecs::Entity;
use crate::error::Result;
use crate::manager::Manager;

const MAX_RECT_SIDE: f32 = 15.0;
const MAX_STROKE_WIDTH: f32 = 3.0;

/// Create `config.entities` entities with a location and a drawable.
pub fn populate<R: Rng + ?Sized>(
    manager: &mut Manager,
    rng: &mut R,
    config: &StressConfig,
    bounds: Size,
) -> Result<Vec<Entity>> {
    let mut created = Vec::with_capacity(config.entities);
    for _ in 0..config.entities {
        let entity = manager.create_entity();
        let location = WorldLocationData::new(
            rng.gen::<f32>() * bounds.width as f32,
            rng.gen::<f32>() * bounds.height as f32,
        );
        manager.set_component(entity, WORLD_LOCATION, location)?;
        manager.set_component(entity, DRAWABLE, random_drawable(rng, config.text_ratio))?;
        created.push(entity);
    }
    Ok(created)
}

fn random_drawable<R: Rng + ?Sized>(rng: &mut R, text_ratio: f64) -> DrawableData {
    // NaN survives `clamp`; treat it as "no text".
    let text_ratio = if text_ratio.is_nan() {
        0.0
    } else {
        text_ratio.clamp(0.0, 1.0)
    };
    if rng.gen_bool(text_ratio) {
        return DrawableData::text("Text", random_color(rng));
    }
    let width = rng.gen::<f32>() * MAX_RECT_SIDE;
    let height = rng.gen::<f32>() * MAX_RECT_SIDE;
    let stroke_width = rng.gen::<f32>() * MAX_STROKE_WIDTH;
    if rng.gen_bool(0.5) {
        DrawableData::Rect {
            width,
            height,
            color: None,
            stroke_color: Some(random_color(rng)),
            stroke_width: Some(stroke_width),
        }
    } else {
        DrawableData::Rect {
            width,
            height,
            color: Some(random_color(rng)),
            stroke_color: None,
            stroke_width: Some(stroke_width),
        }
    }
}

/// Short hex color with each channel in `0..=9`, e.g. `#307`.
fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "#{}{}{}",
        rng.gen_range(0..=9),
        rng.gen_range(0..=9),
        rng.gen_range(0..=9)
    )
}
