use std::ops::Range;

use image::RgbaImage;

use crate::{
    core::{DEFAULT_DISPOSAL_METHOD, DELAY_UNIT_SCALE, Dimensions, Offset},
    error::{FlipbookError, FlipbookResult},
    flatten::flatten,
    frame::Frame,
    history::Change,
    metadata,
};

/// One decoded source frame, as handed over by the codec collaborator.
/// Delay is in engine units (milliseconds); the decode boundary already
/// multiplied the container's coarser unit out.
///
/// The container stores a disposal identifier per frame, but the editor
/// treats the whole animation as having one document-wide method: the
/// decode collaborator picks which frame's value to pass to
/// [`FrameSequence::from_decoded`] (conventionally the first frame's),
/// and flattening reads only that sequence-level method. The per-frame
/// value is still surfaced here so a codec that needs to round-trip it
/// on encode does not lose it.
#[derive(Clone, Debug)]
pub struct DecodedFrame {
    pub image: RgbaImage,
    pub offset: Offset,
    pub dimensions: Dimensions,
    pub delay_ms: i64,
    pub disposal_method: Option<String>,
}

/// Encode-side boundary. Receives each flattened frame in order; `delay`
/// is already converted to the container's unit (1 unit = 10 ms).
pub trait SequenceSink {
    fn write_frame(&mut self, image: &RgbaImage, offset: Offset, delay: i64)
    -> FlipbookResult<()>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChangeMode {
    Addition,
    Undo,
}

/// Result value of a recompute, consumed synchronously by whichever
/// collaborator needs to react. There is no listener registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlattenChangeset {
    pub mode: ChangeMode,
    pub frame_count: usize,
    pub canvas: Dimensions,
}

/// Owns the authoritative (`original`) and displayable (`flattened`) frame
/// sequences and coordinates re-flattening after edits. The two sequences
/// have equal length at all times; length changes only on a full reload,
/// which also resets the disposal method.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    original: Vec<Frame>,
    flattened: Vec<Frame>,
    disposal_method: String,
}

impl FrameSequence {
    /// Builds a sequence from decoded source frames. Zero frames is an
    /// io-kind error; the document is left for the caller unchanged.
    pub fn from_decoded(
        frames: Vec<DecodedFrame>,
        disposal_method: impl Into<String>,
    ) -> FlipbookResult<Self> {
        if frames.is_empty() {
            return Err(FlipbookError::io("decoded sequence has no frames"));
        }
        let original: Vec<Frame> = frames
            .into_iter()
            .map(|f| Frame::new(f.image, f.offset, f.dimensions, f.delay_ms))
            .collect();
        let disposal_method = disposal_method.into();
        // Initial flatten is a full replay; chains are still empty.
        let flattened = flatten(&original, &original, &disposal_method, false)?;
        Ok(Self {
            original,
            flattened,
            disposal_method,
        })
    }

    /// A single-frame document with a transparent canvas and default
    /// disposal, for editors that start without a source file.
    pub fn blank(width: u32, height: u32) -> FlipbookResult<Self> {
        let dims = Dimensions::clamped(width as i32, height as i32);
        Self::from_decoded(
            vec![DecodedFrame {
                image: RgbaImage::new(width, height),
                offset: Offset::default(),
                dimensions: dims,
                delay_ms: 0,
                disposal_method: None,
            }],
            DEFAULT_DISPOSAL_METHOD,
        )
    }

    /// Replaces both sequences together from freshly decoded frames and
    /// resets the disposal method.
    pub fn reload(
        &mut self,
        frames: Vec<DecodedFrame>,
        disposal_method: impl Into<String>,
    ) -> FlipbookResult<()> {
        *self = Self::from_decoded(frames, disposal_method)?;
        Ok(())
    }

    pub fn disposal_method(&self) -> &str {
        &self.disposal_method
    }

    /// Read-only view of the displayable frames.
    pub fn flattened(&self) -> &[Frame] {
        &self.flattened
    }

    /// Read-only view of the authoritative frames and their histories.
    pub fn original(&self) -> &[Frame] {
        &self.original
    }

    pub fn frame_count(&self) -> usize {
        self.flattened.len()
    }

    /// Dimensions the display collaborator should size itself to.
    pub fn first_frame_dimensions(&self) -> Dimensions {
        self.flattened
            .first()
            .map(Frame::dimensions)
            .unwrap_or_default()
    }

    /// Records `change` as frame `index`'s most recent edit; `None`
    /// records a `Blank` placeholder.
    pub fn add_change(&mut self, index: usize, change: Option<Change>) -> FlipbookResult<()> {
        let frame = self.frame_mut(index)?;
        frame.add_change(change);
        Ok(())
    }

    /// Bulk range edit: every frame whose index falls in `range` records
    /// `make_change()`, every other frame records a `Blank`. Chains stay in
    /// lockstep, so one undo step later retracts this edit everywhere.
    /// Indices beyond the sequence are simply never visited.
    pub fn add_change_range(
        &mut self,
        range: Range<usize>,
        mut make_change: impl FnMut() -> Change,
    ) -> FlipbookResult<()> {
        if range.start > range.end {
            return Err(FlipbookError::validation(format!(
                "invalid frame range {}..{}",
                range.start, range.end
            )));
        }
        for (i, frame) in self.original.iter_mut().enumerate() {
            if range.contains(&i) {
                frame.add_change(Some(make_change()));
            } else {
                frame.add_change(None);
            }
        }
        Ok(())
    }

    /// Removes frame `index`'s most recent edit, if it has one.
    pub fn undo_change(&mut self, index: usize) -> FlipbookResult<()> {
        let frame = self.frame_mut(index)?;
        frame.undo_change();
        Ok(())
    }

    /// Retracts the latest edit cycle from every frame at once. Returns
    /// false (and touches nothing) when there is nothing left to undo.
    pub fn undo_step(&mut self) -> bool {
        if !self.any_change() {
            return false;
        }
        for frame in &mut self.original {
            frame.undo_change();
        }
        true
    }

    pub fn has_change(&self, index: usize) -> FlipbookResult<bool> {
        Ok(self.frame(index)?.has_change())
    }

    pub fn any_change(&self) -> bool {
        self.original.iter().any(Frame::has_change)
    }

    /// Re-runs the flatten engine and atomically swaps in the new
    /// displayable set. Returns a changeset describing what happened.
    pub fn recompute(&mut self, is_addition: bool) -> FlipbookResult<FlattenChangeset> {
        let flattened = flatten(
            &self.original,
            &self.flattened,
            &self.disposal_method,
            is_addition,
        )?;
        self.flattened = flattened;
        Ok(FlattenChangeset {
            mode: if is_addition {
                ChangeMode::Addition
            } else {
                ChangeMode::Undo
            },
            frame_count: self.flattened.len(),
            canvas: metadata::actual_dimensions(&self.original[0]),
        })
    }

    /// Streams the flattened sequence to the encode collaborator, pairing
    /// each frame's placement and delay with its pixels. Delays cross the
    /// boundary in the container's coarser unit.
    pub fn write_sequence(&self, sink: &mut dyn SequenceSink) -> FlipbookResult<()> {
        for frame in &self.flattened {
            sink.write_frame(
                frame.image(),
                frame.offset(),
                frame.delay_ms() / DELAY_UNIT_SCALE,
            )?;
        }
        Ok(())
    }

    fn frame(&self, index: usize) -> FlipbookResult<&Frame> {
        let len = self.original.len();
        self.original.get(index).ok_or_else(|| {
            FlipbookError::out_of_range(format!("frame index {index} exceeds sequence length {len}"))
        })
    }

    fn frame_mut(&mut self, index: usize) -> FlipbookResult<&mut Frame> {
        let len = self.original.len();
        self.original.get_mut(index).ok_or_else(|| {
            FlipbookError::out_of_range(format!("frame index {index} exceeds sequence length {len}"))
        })
    }
}
