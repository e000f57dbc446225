use crate::error::{FlipbookError, FlipbookResult};

/// Smallest delay step the container format can represent, in milliseconds.
pub const MIN_DELAY_MS: i64 = 10;
/// Smallest delay most players actually honor on screen.
pub const DISPLAY_DELAY_MS: i64 = 2 * MIN_DELAY_MS;
/// Delay assigned when a frame carries none, or a caller asks for the fallback.
pub const DEFAULT_DELAY_MS: i64 = 100;
/// Milliseconds per external delay unit (the container stores delays coarser
/// than the engine does).
pub const DELAY_UNIT_SCALE: i64 = 10;
/// Disposal method assumed when the decoded source does not name one.
pub const DEFAULT_DISPOSAL_METHOD: &str = "none";

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn new(x: i32, y: i32) -> FlipbookResult<Self> {
        if x < 0 || y < 0 {
            return Err(FlipbookError::geometry(format!(
                "offset components must be >= 0, got ({x}, {y})"
            )));
        }
        Ok(Self { x, y })
    }

    /// Lenient constructor for decode-time input: any negative component
    /// collapses the whole offset to the default `(0, 0)`.
    pub fn clamped(x: i32, y: i32) -> Self {
        Self::new(x, y).unwrap_or_default()
    }

    /// Scales both components by `ratio`, truncating toward zero.
    pub fn scaled(self, ratio: f32) -> Self {
        Self {
            x: (self.x as f32 * ratio) as i32,
            y: (self.y as f32 * ratio) as i32,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub fn new(width: i32, height: i32) -> FlipbookResult<Self> {
        if width < 0 || height < 0 {
            return Err(FlipbookError::geometry(format!(
                "dimensions must be >= 0, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Lenient constructor for decode-time input: any negative component
    /// collapses the dimensions to the default `0x0`.
    pub fn clamped(width: i32, height: i32) -> Self {
        Self::new(width, height).unwrap_or_default()
    }

    /// Scales both components by `ratio`, rounding up.
    pub fn scaled_ceil(self, ratio: f32) -> Self {
        Self {
            width: (f64::from(self.width) * f64::from(ratio)).ceil() as i32,
            height: (f64::from(self.height) * f64::from(ratio)).ceil() as i32,
        }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rounds a delay to the nearest representable unit, floored at the smallest
/// delay that displays properly. Total: any input maps to a value
/// `>= DISPLAY_DELAY_MS` that is a multiple of `MIN_DELAY_MS`.
pub fn round_delay_ms(delay_ms: i64) -> i64 {
    let time = ((delay_ms + MIN_DELAY_MS / 2) / MIN_DELAY_MS) * MIN_DELAY_MS;
    if time < DISPLAY_DELAY_MS {
        DISPLAY_DELAY_MS
    } else {
        time
    }
}
