use image::{RgbaImage, imageops};

use crate::core::Offset;

/// Allocates a transparent canvas with the same extent as `img`.
pub fn blank_like(img: &RgbaImage) -> RgbaImage {
    RgbaImage::new(img.width(), img.height())
}

pub fn blank(width: u32, height: u32) -> RgbaImage {
    RgbaImage::new(width, height)
}

/// Draws `src` onto `canvas` at `offset` with source-over alpha blending.
/// Pixels falling outside the canvas are clipped.
pub fn draw_over(canvas: &mut RgbaImage, src: &RgbaImage, offset: Offset) {
    imageops::overlay(canvas, src, i64::from(offset.x), i64::from(offset.y));
}

/// Resets every pixel of `canvas` to fully transparent.
pub fn clear(canvas: &mut RgbaImage) {
    for px in canvas.pixels_mut() {
        *px = image::Rgba([0, 0, 0, 0]);
    }
}

/// Smooth (triangle-filtered) resampling to a new extent.
pub fn resize_smooth(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(src, width, height, imageops::FilterType::Triangle)
}
