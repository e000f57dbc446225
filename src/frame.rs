use image::RgbaImage;

use crate::{
    core::{DEFAULT_DELAY_MS, Dimensions, Offset, round_delay_ms},
    error::{FlipbookError, FlipbookResult},
    history::{Change, History},
};

/// One editable animation frame: an owned pixel buffer, its placement
/// metadata, and the frame's own undo chain.
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbaImage,
    offset: Offset,
    dimensions: Dimensions,
    delay_ms: i64,
    history: History,
}

impl Frame {
    /// Decode-boundary constructor: invalid offset/dimensions collapse to
    /// their defaults, a non-positive delay falls back to the default.
    pub fn new(image: RgbaImage, offset: Offset, dimensions: Dimensions, delay_ms: i64) -> Self {
        Self {
            image,
            offset: Offset::clamped(offset.x, offset.y),
            dimensions: Dimensions::clamped(dimensions.width, dimensions.height),
            delay_ms: if delay_ms > 0 {
                delay_ms
            } else {
                DEFAULT_DELAY_MS
            },
            history: History::new(),
        }
    }

    pub fn with_dimensions(image: RgbaImage, dimensions: Dimensions) -> Self {
        Self::new(image, Offset::default(), dimensions, DEFAULT_DELAY_MS)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn set_image(&mut self, image: RgbaImage) {
        self.image = image;
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Offset) -> FlipbookResult<()> {
        if offset.x < 0 || offset.y < 0 {
            return Err(FlipbookError::geometry(format!(
                "frame offset must be non-negative, got ({}, {})",
                offset.x, offset.y
            )));
        }
        self.offset = offset;
        Ok(())
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn set_dimensions(&mut self, dimensions: Dimensions) -> FlipbookResult<()> {
        if dimensions.width < 0 || dimensions.height < 0 {
            return Err(FlipbookError::geometry(format!(
                "frame dimensions must be non-negative, got {}x{}",
                dimensions.width, dimensions.height
            )));
        }
        self.dimensions = dimensions;
        Ok(())
    }

    pub fn delay_ms(&self) -> i64 {
        self.delay_ms
    }

    /// Sets the on-screen delay, rounded to the shared delay policy. A
    /// non-positive `delay_ms` is an error unless `fallback` asks for the
    /// silent default instead.
    pub fn set_delay(&mut self, delay_ms: i64, fallback: bool) -> FlipbookResult<()> {
        if delay_ms > 0 {
            self.delay_ms = round_delay_ms(delay_ms);
            Ok(())
        } else if fallback {
            self.delay_ms = DEFAULT_DELAY_MS;
            Ok(())
        } else {
            Err(FlipbookError::geometry(format!(
                "frame delay must be positive, got {delay_ms}"
            )))
        }
    }

    /// History-stripped deep copy: fresh pixel buffer, same metadata, empty
    /// chain.
    pub fn detached(&self) -> Frame {
        Frame {
            image: self.image.clone(),
            offset: self.offset,
            dimensions: self.dimensions,
            delay_ms: self.delay_ms,
            history: History::new(),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Records `change` as the frame's most recent edit. `None` records a
    /// `Blank` placeholder.
    pub fn add_change(&mut self, change: Option<Change>) {
        self.history.append(change);
    }

    /// Removes the most recent edit, if any non-sentinel record exists.
    pub fn undo_change(&mut self) {
        self.history.undo();
    }

    pub fn has_change(&self) -> bool {
        self.history.has_change()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FrameFilter;

    fn frame() -> Frame {
        Frame::new(
            RgbaImage::from_pixel(4, 4, image::Rgba([7, 7, 7, 255])),
            Offset { x: 1, y: 2 },
            Dimensions {
                width: 4,
                height: 4,
            },
            100,
        )
    }

    #[test]
    fn constructor_clamps_invalid_metadata() {
        let f = Frame::new(
            RgbaImage::new(2, 2),
            Offset { x: -5, y: 3 },
            Dimensions {
                width: -1,
                height: -1,
            },
            0,
        );
        assert_eq!(f.offset(), Offset::default());
        assert_eq!(f.dimensions(), Dimensions::default());
        assert_eq!(f.delay_ms(), DEFAULT_DELAY_MS);
    }

    #[test]
    fn set_offset_rejects_negative_and_keeps_prior_value() {
        let mut f = frame();
        let before = f.offset();
        assert!(f.set_offset(Offset { x: -1, y: 0 }).is_err());
        assert_eq!(f.offset(), before);
        assert!(f.set_offset(Offset { x: 9, y: 9 }).is_ok());
        assert_eq!(f.offset(), Offset { x: 9, y: 9 });
    }

    #[test]
    fn set_dimensions_rejects_negative_and_keeps_prior_value() {
        let mut f = frame();
        let before = f.dimensions();
        assert!(
            f.set_dimensions(Dimensions {
                width: 3,
                height: -3
            })
            .is_err()
        );
        assert_eq!(f.dimensions(), before);
    }

    #[test]
    fn set_delay_rounds_and_enforces_positivity() {
        let mut f = frame();
        f.set_delay(26, false).unwrap();
        assert_eq!(f.delay_ms(), 30);
        f.set_delay(15, false).unwrap();
        assert_eq!(f.delay_ms(), 20);

        assert!(f.set_delay(0, false).is_err());
        assert_eq!(f.delay_ms(), 20);

        f.set_delay(-10, true).unwrap();
        assert_eq!(f.delay_ms(), DEFAULT_DELAY_MS);
    }

    #[test]
    fn detached_copies_pixels_without_aliasing_or_history() {
        let mut f = frame();
        f.add_change(Some(Change::Filter(FrameFilter::contrast(2.0))));

        let mut copy = f.detached();
        assert!(!copy.has_change());
        assert_eq!(copy.image(), f.image());
        assert_eq!(copy.offset(), f.offset());
        assert_eq!(copy.delay_ms(), f.delay_ms());

        copy.set_image(RgbaImage::new(1, 1));
        assert_eq!((f.image().width(), f.image().height()), (4, 4));
    }

    #[test]
    fn blank_apply_is_a_content_preserving_copy() {
        let f = frame();
        let copied = Change::Blank.apply(&f);
        assert_eq!(copied.image(), f.image());
        assert_eq!(copied.offset(), f.offset());
        assert_eq!(copied.dimensions(), f.dimensions());
        assert_eq!(copied.delay_ms(), f.delay_ms());
        assert!(!copied.has_change());
    }

    #[test]
    fn replace_draws_the_payload_over_a_copy_at_the_origin() {
        let f = frame();
        let payload = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let replaced = Change::Replace(payload).apply(&f);

        assert_eq!(replaced.image().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(replaced.image().get_pixel(1, 1).0, [255, 0, 0, 255]);
        // pixels outside the payload keep the frame's prior content
        assert_eq!(replaced.image().get_pixel(2, 2).0, [7, 7, 7, 255]);
        assert_eq!(replaced.image().get_pixel(3, 3).0, [7, 7, 7, 255]);
        assert_eq!(replaced.offset(), f.offset());
        assert_eq!(replaced.delay_ms(), f.delay_ms());
        assert!(!replaced.has_change());
        // the source frame is never mutated
        assert_eq!(f.image().get_pixel(0, 0).0, [7, 7, 7, 255]);
    }

    #[test]
    fn undo_tracks_chain_state_through_two_adds_and_one_undo() {
        let mut f = frame();
        f.add_change(Some(Change::Filter(FrameFilter::contrast(1.1))));
        let first = f.history().current_id();
        f.add_change(Some(Change::Filter(FrameFilter::contrast(0.9))));
        assert_eq!(f.history().len(), 2);

        f.undo_change();
        assert_eq!(f.history().len(), 1);
        assert_eq!(f.history().current_id(), first);

        f.undo_change();
        assert!(!f.has_change());
        f.undo_change(); // sentinel guard: stays a no-op
        assert!(!f.has_change());
    }
}
