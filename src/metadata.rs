use crate::{core::Dimensions, frame::Frame, history::Change, raster};

/// Which metadata values a recorded transform scales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MetadataKind {
    /// Scales dimensions (ceiling), offset (truncation) and resamples pixels.
    Resize,
    /// Scales the frame delay, then rounds via the shared delay policy.
    Retime,
}

impl MetadataKind {
    /// Applies the transform in place. Geometry failures are logged and
    /// leave the frame's prior values untouched; the flatten pass carries on.
    pub(crate) fn operate(self, frame: &mut Frame, ratio: f32) {
        match self {
            Self::Resize => {
                let dims = frame.dimensions().scaled_ceil(ratio);
                let offset = frame.offset().scaled(ratio);
                if let Err(err) = frame.set_dimensions(dims) {
                    tracing::warn!(%err, "resize skipped, keeping prior dimensions");
                    return;
                }
                if let Err(err) = frame.set_offset(offset) {
                    tracing::warn!(%err, "resize skipped, keeping prior offset");
                    return;
                }
                if dims.is_empty() {
                    tracing::warn!(?dims, "resample skipped for empty target extent");
                    return;
                }
                frame.set_image(raster::resize_smooth(
                    frame.image(),
                    dims.width as u32,
                    dims.height as u32,
                ));
            }
            Self::Retime => {
                let delay = (frame.delay_ms() as f32 * ratio) as i64;
                if let Err(err) = frame.set_delay(delay, true) {
                    tracing::warn!(%err, "retime skipped, keeping prior delay");
                }
            }
        }
    }
}

/// Replays only the frame's metadata records, in chain order, against a
/// history-stripped copy. Pure: the input frame and its chain are read-only,
/// and replaying twice yields the same result.
pub fn collapse_metadata(frame: &Frame) -> Frame {
    let mut out = frame.detached();
    for change in frame.history().replay() {
        if let Change::Metadata { .. } = change {
            if !change.is_empty() {
                out = change.apply(&out);
            }
        }
    }
    out
}

/// The frame's authoritative delay once all recorded retimes are applied.
pub fn actual_delay_ms(frame: &Frame) -> i64 {
    collapse_metadata(frame).delay_ms()
}

/// The frame's authoritative dimensions once all recorded resizes are applied.
pub fn actual_dimensions(frame: &Frame) -> Dimensions {
    collapse_metadata(frame).dimensions()
}
