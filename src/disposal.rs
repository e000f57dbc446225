use image::RgbaImage;

use crate::{
    core::{Dimensions, Offset},
    error::{FlipbookError, FlipbookResult},
    frame::Frame,
    raster,
};

/// How successive frames of the animation relate on the canvas. Derived
/// from the document's disposal-method identifier, never stored per frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisposalPolicy {
    /// Each frame is self-contained; the canvas is cleared before it draws.
    Overwrite,
    /// Frames draw cumulatively, each lying atop the previous ones.
    IndependentComposite,
}

impl DisposalPolicy {
    /// Total, pure classification of a disposal-method identifier.
    pub fn classify(disposal_method: &str) -> Self {
        match disposal_method {
            "none" | "doNotDispose" => Self::IndependentComposite,
            _ => Self::Overwrite,
        }
    }

    /// Composites the visible content of frame `n` as a standalone buffer,
    /// sized to frame 0's pixel extent. Under `IndependentComposite` frames
    /// `0..=n` draw in order at their own offsets with no clearing between
    /// draws; under `Overwrite` only frame `n` draws onto a cleared canvas.
    pub fn synthesize_independent_frame(
        self,
        frames: &[Frame],
        n: usize,
    ) -> FlipbookResult<RgbaImage> {
        let first = frames.first().ok_or_else(|| {
            FlipbookError::out_of_range("cannot synthesize a frame from an empty sequence")
        })?;
        if n >= frames.len() {
            return Err(FlipbookError::out_of_range(format!(
                "frame index {n} exceeds sequence length {}",
                frames.len()
            )));
        }

        let mut canvas = raster::blank_like(first.image());
        match self {
            Self::IndependentComposite => {
                for frame in &frames[..=n] {
                    raster::draw_over(&mut canvas, frame.image(), frame.offset());
                }
            }
            Self::Overwrite => {
                raster::clear(&mut canvas);
                raster::draw_over(&mut canvas, frames[n].image(), frames[n].offset());
            }
        }
        Ok(canvas)
    }

    /// Detaches `base` from its neighbors before per-frame edits replay:
    /// under `IndependentComposite` the pixel buffer becomes the frame's
    /// full visible composite; under `Overwrite` this is the identity.
    pub fn decouple(self, frames: &[Frame], n: usize, base: &mut Frame) -> FlipbookResult<()> {
        match self {
            Self::Overwrite => Ok(()),
            Self::IndependentComposite => {
                base.set_image(self.synthesize_independent_frame(frames, n)?);
                Ok(())
            }
        }
    }

    /// Normalizes an edited frame back to the canvas frame of reference:
    /// under `IndependentComposite` dimensions reset to `canonical` and the
    /// offset to the origin; under `Overwrite` this is the identity.
    /// Geometry failures are logged and leave the frame unchanged.
    pub fn renormalize(self, frame: &mut Frame, canonical: Dimensions) {
        if self == Self::Overwrite {
            return;
        }
        if let Err(err) = frame.set_dimensions(canonical) {
            tracing::warn!(%err, "renormalize kept the frame's prior dimensions");
        }
        if let Err(err) = frame.set_offset(Offset::default()) {
            tracing::warn!(%err, "renormalize kept the frame's prior offset");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(px: [u8; 4], x: i32, y: i32, extent: u32) -> Frame {
        Frame::new(
            RgbaImage::from_pixel(extent, extent, image::Rgba(px)),
            Offset { x, y },
            Dimensions {
                width: extent as i32,
                height: extent as i32,
            },
            100,
        )
    }

    #[test]
    fn classify_is_total_over_known_and_unknown_identifiers() {
        assert_eq!(
            DisposalPolicy::classify("none"),
            DisposalPolicy::IndependentComposite
        );
        assert_eq!(
            DisposalPolicy::classify("doNotDispose"),
            DisposalPolicy::IndependentComposite
        );
        assert_eq!(
            DisposalPolicy::classify("restoreToBackground"),
            DisposalPolicy::Overwrite
        );
        assert_eq!(
            DisposalPolicy::classify("restoreToPrevious"),
            DisposalPolicy::Overwrite
        );
        assert_eq!(DisposalPolicy::classify(""), DisposalPolicy::Overwrite);
    }

    #[test]
    fn independent_composite_stacks_frames_at_their_offsets() {
        let frames = vec![
            frame_at([255, 0, 0, 255], 0, 0, 8),
            frame_at([0, 255, 0, 255], 2, 2, 4),
            frame_at([0, 0, 255, 255], 4, 4, 2),
        ];
        let policy = DisposalPolicy::IndependentComposite;
        let composite = policy.synthesize_independent_frame(&frames, 2).unwrap();

        // canvas is sized to frame 0
        assert_eq!((composite.width(), composite.height()), (8, 8));
        // later frames draw on top, earlier ones show through elsewhere
        assert_eq!(composite.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(composite.get_pixel(2, 2).0, [0, 255, 0, 255]);
        assert_eq!(composite.get_pixel(4, 4).0, [0, 0, 255, 255]);
        assert_eq!(composite.get_pixel(7, 7).0, [255, 0, 0, 255]);
    }

    #[test]
    fn overwrite_draws_only_the_requested_frame() {
        let frames = vec![
            frame_at([255, 0, 0, 255], 0, 0, 8),
            frame_at([0, 255, 0, 255], 2, 2, 4),
        ];
        let policy = DisposalPolicy::Overwrite;
        let composite = policy.synthesize_independent_frame(&frames, 1).unwrap();

        assert_eq!(composite.get_pixel(2, 2).0, [0, 255, 0, 255]);
        // frame 0 contributed nothing
        assert_eq!(composite.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_index_is_a_typed_error() {
        let frames = vec![frame_at([1, 1, 1, 255], 0, 0, 2)];
        let err = DisposalPolicy::IndependentComposite
            .synthesize_independent_frame(&frames, 1)
            .unwrap_err();
        assert!(matches!(err, FlipbookError::OutOfRange(_)));
    }

    #[test]
    fn renormalize_is_identity_for_overwrite() {
        let mut frame = frame_at([1, 1, 1, 255], 3, 3, 4);
        DisposalPolicy::Overwrite.renormalize(
            &mut frame,
            Dimensions {
                width: 99,
                height: 99,
            },
        );
        assert_eq!(frame.offset(), Offset { x: 3, y: 3 });
        assert_eq!(
            frame.dimensions(),
            Dimensions {
                width: 4,
                height: 4
            }
        );
    }

    #[test]
    fn renormalize_resets_composite_frames_to_the_canvas() {
        let mut frame = frame_at([1, 1, 1, 255], 3, 3, 4);
        DisposalPolicy::IndependentComposite.renormalize(
            &mut frame,
            Dimensions {
                width: 16,
                height: 16,
            },
        );
        assert_eq!(frame.offset(), Offset::default());
        assert_eq!(
            frame.dimensions(),
            Dimensions {
                width: 16,
                height: 16
            }
        );
    }
}
