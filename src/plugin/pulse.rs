//! Bundled `pulse` plugin: clears the surface to a slowly rotating hue.
//!
//! Arguments: `pulse [frames]`. With a frame count the plugin reports completion after that many
//! rendered frames.

use crate::backend::RenderContext;
use crate::plugin::abi::PluginState;
use crate::plugin::registry::StaticLibrary;

const HUE_STEP_DEG: f32 = 7.5;

struct Pulse {
    width: u32,
    height: u32,
    frames: u64,
    limit: Option<u64>,
}

/// Fully saturated HSV to RGB for `h` in degrees.
fn hue_rgb(h: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    match h as u32 {
        0 => [1.0, x, 0.0],
        1 => [x, 1.0, 0.0],
        2 => [0.0, 1.0, x],
        3 => [0.0, x, 1.0],
        4 => [x, 0.0, 1.0],
        _ => [1.0, 0.0, x],
    }
}

fn create(width: u32, height: u32, args: &[String]) -> Result<PluginState, i32> {
    let limit = match args.first() {
        None => None,
        Some(a) => Some(a.parse::<u64>().map_err(|_| -22)?),
    };
    Ok(Box::new(Pulse {
        width,
        height,
        frames: 0,
        limit,
    }))
}

fn render(state: &mut PluginState, ctx: &mut dyn RenderContext) -> i32 {
    let Some(p) = state.downcast_mut::<Pulse>() else {
        return -1;
    };
    if p.limit.is_some_and(|l| p.frames >= l) {
        return 2;
    }
    let [r, g, b] = hue_rgb(p.frames as f32 * HUE_STEP_DEG);
    if ctx.clear([r, g, b, 1.0]).is_err() {
        return -5;
    }
    p.frames += 1;
    0
}

fn size_changed(state: &mut PluginState, width: u32, height: u32) -> i32 {
    match state.downcast_mut::<Pulse>() {
        Some(p) => {
            tracing::debug!(
                from = ?(p.width, p.height),
                to = ?(width, height),
                "pulse resized"
            );
            p.width = width;
            p.height = height;
            0
        }
        None => -1,
    }
}

pub fn library() -> StaticLibrary {
    StaticLibrary::new("pulse")
        .create(create)
        .init(|_| 0)
        .render(render)
        .size_changed(size_changed)
        .destroy(drop)
}
