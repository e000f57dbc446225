use image::{Rgba, RgbaImage, imageops};

/// A pixel filter recorded by an edit action. Closed set: every variant's
/// payload is typed at construction, so applying one can never fail on a
/// payload mismatch.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FrameFilter {
    /// Per-channel linear rescale: `out = in * scale + offset`, clamped to u8.
    Rescale { scales: [f32; 4], offsets: [f32; 4] },
    /// 3x3 convolution, kernel in row-major order.
    Convolve3x3 { kernel: [f32; 9] },
}

impl FrameFilter {
    /// Contrast/brightness adjustment: scales RGB uniformly, leaves alpha as is.
    pub fn contrast(factor: f32) -> Self {
        Self::Rescale {
            scales: [factor, factor, factor, 1.0],
            offsets: [0.0; 4],
        }
    }

    /// Focus adjustment (sharpen or soften) through an arbitrary 3x3 kernel.
    pub fn focus(kernel: [f32; 9]) -> Self {
        Self::Convolve3x3 { kernel }
    }

    pub fn sharpen() -> Self {
        Self::focus([0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0])
    }

    pub fn soften() -> Self {
        let w = 1.0 / 9.0;
        Self::focus([w; 9])
    }

    /// Evaluates the filter over a copy of `img`. The input is never mutated.
    pub fn apply(&self, img: &RgbaImage) -> RgbaImage {
        match self {
            Self::Rescale { scales, offsets } => {
                let mut out = img.clone();
                for px in out.pixels_mut() {
                    *px = rescale_px(*px, scales, offsets);
                }
                out
            }
            Self::Convolve3x3 { kernel } => imageops::filter3x3(img, kernel),
        }
    }
}

fn rescale_px(px: Rgba<u8>, scales: &[f32; 4], offsets: &[f32; 4]) -> Rgba<u8> {
    let mut out = [0u8; 4];
    for c in 0..4 {
        let v = f32::from(px.0[c]) * scales[c] + offsets[c];
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}
