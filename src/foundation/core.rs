use crate::foundation::error::{StrobeError, StrobeResult};

/// Integer rectangle stored as left/top/right/bottom edges (right and bottom exclusive).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl Rect {
    /// Build a rectangle from an origin and a size.
    pub fn from_xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            left: x,
            top: y,
            right: x.saturating_add(w),
            bottom: y.saturating_add(h),
        }
    }

    /// Horizontal extent. Negative for inverted rectangles.
    pub fn width(self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    /// Vertical extent. Negative for inverted rectangles.
    pub fn height(self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Return `true` when either extent is zero or negative.
    pub fn is_empty(self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

/// Opaque compositor-assigned surface identity.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SurfaceId(pub u64);

/// Surface flag requesting that the surface is created hidden.
pub const SURFACE_HIDDEN: u32 = 0x0000_0004;

/// Pixel formats understood by the compositor, using the platform's integer codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum PixelFormat {
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "CUSTOM")]
    Custom,
    #[serde(rename = "TRANSLUCENT")]
    Translucent,
    #[serde(rename = "TRANSPARENT")]
    Transparent,
    #[serde(rename = "OPAQUE")]
    Opaque,
    #[default]
    #[serde(rename = "RGBA_8888")]
    Rgba8888,
    #[serde(rename = "RGBX_8888")]
    Rgbx8888,
    #[serde(rename = "RGB_888")]
    Rgb888,
    #[serde(rename = "RGB_565")]
    Rgb565,
    #[serde(rename = "BGRA_8888")]
    Bgra8888,
    #[serde(rename = "RGBA_5551")]
    Rgba5551,
    #[serde(rename = "RGBA_4444")]
    Rgba4444,
    #[serde(rename = "A_8")]
    A8,
    #[serde(rename = "L_8")]
    L8,
    #[serde(rename = "LA_88")]
    La88,
    #[serde(rename = "RGB_332")]
    Rgb332,
}

const NAMED_FORMATS: &[(&str, PixelFormat)] = &[
    ("UNKNOWN", PixelFormat::Unknown),
    ("NONE", PixelFormat::None),
    ("CUSTOM", PixelFormat::Custom),
    ("TRANSLUCENT", PixelFormat::Translucent),
    ("TRANSPARENT", PixelFormat::Transparent),
    ("OPAQUE", PixelFormat::Opaque),
    ("RGBA_8888", PixelFormat::Rgba8888),
    ("RGBX_8888", PixelFormat::Rgbx8888),
    ("RGB_888", PixelFormat::Rgb888),
    ("RGB_565", PixelFormat::Rgb565),
    ("BGRA_8888", PixelFormat::Bgra8888),
    ("RGBA_5551", PixelFormat::Rgba5551),
    ("RGBA_4444", PixelFormat::Rgba4444),
    ("A_8", PixelFormat::A8),
    ("L_8", PixelFormat::L8),
    ("LA_88", PixelFormat::La88),
    ("RGB_332", PixelFormat::Rgb332),
];

impl PixelFormat {
    /// Map a platform integer code to a format.
    pub fn from_code(code: i32) -> StrobeResult<Self> {
        let f = match code {
            0 => Self::None,
            -4 => Self::Custom,
            -3 => Self::Translucent,
            -2 => Self::Transparent,
            -1 => Self::Opaque,
            1 => Self::Rgba8888,
            2 => Self::Rgbx8888,
            3 => Self::Rgb888,
            4 => Self::Rgb565,
            5 => Self::Bgra8888,
            6 => Self::Rgba5551,
            7 => Self::Rgba4444,
            8 => Self::A8,
            9 => Self::L8,
            0xA => Self::La88,
            0xB => Self::Rgb332,
            other => {
                return Err(StrobeError::validation(format!(
                    "unknown pixel format code {other}"
                )));
            }
        };
        Ok(f)
    }

    /// Platform integer code for this format.
    pub fn code(self) -> i32 {
        match self {
            Self::Unknown | Self::None => 0,
            Self::Custom => -4,
            Self::Translucent => -3,
            Self::Transparent => -2,
            Self::Opaque => -1,
            Self::Rgba8888 => 1,
            Self::Rgbx8888 => 2,
            Self::Rgb888 => 3,
            Self::Rgb565 => 4,
            Self::Bgra8888 => 5,
            Self::Rgba5551 => 6,
            Self::Rgba4444 => 7,
            Self::A8 => 8,
            Self::L8 => 9,
            Self::La88 => 0xA,
            Self::Rgb332 => 0xB,
        }
    }

    /// Parse `PIXEL_FORMAT_RGBA_8888`, `RGBA_8888` or an integer code.
    pub fn parse(s: &str) -> StrobeResult<Self> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Self::from_code(code);
        }
        let name = s.strip_prefix("PIXEL_FORMAT_").unwrap_or(s);
        NAMED_FORMATS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| *f)
            .ok_or_else(|| StrobeError::validation(format!("unknown pixel format '{s}'")))
    }

    /// Canonical name without the `PIXEL_FORMAT_` prefix.
    pub fn name(self) -> &'static str {
        NAMED_FORMATS
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(n, _)| *n)
            .unwrap_or("UNKNOWN")
    }

    /// Bytes per pixel of a locked buffer in this format. Zero for formats without a layout.
    ///
    /// The symbolic formats resolve to 32-bit layouts the way the compositor allocates them.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Unknown | Self::None | Self::Custom => 0,
            Self::Translucent
            | Self::Transparent
            | Self::Opaque
            | Self::Rgba8888
            | Self::Rgbx8888
            | Self::Bgra8888 => 4,
            Self::Rgb888 => 3,
            Self::Rgb565 | Self::Rgba5551 | Self::Rgba4444 | Self::La88 => 2,
            Self::A8 | Self::L8 | Self::Rgb332 => 1,
        }
    }

    /// Render-context colour channel sizes for this format, if the format can back a context.
    pub fn channel_config(self) -> Option<ChannelConfig> {
        let (red, green, blue, alpha) = match self {
            Self::Translucent | Self::Transparent | Self::Rgba8888 | Self::Bgra8888 => (8, 8, 8, 8),
            Self::Opaque | Self::Rgbx8888 | Self::Rgb888 => (8, 8, 8, 0),
            Self::Rgb565 => (5, 6, 5, 0),
            Self::Rgba5551 => (5, 5, 5, 1),
            Self::Rgba4444 => (4, 4, 4, 4),
            _ => return None,
        };
        Some(ChannelConfig {
            red,
            green,
            blue,
            alpha,
        })
    }
}

/// Colour channel bit sizes requested for a render context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelConfig {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
