use crate::{
    disposal::DisposalPolicy,
    error::{FlipbookError, FlipbookResult},
    frame::Frame,
    metadata,
};

/// Replays every frame's recorded edits against its disposal semantics and
/// returns the new displayable frame set.
///
/// `is_addition` selects the render source: an addition only needs the one
/// new record applied incrementally on top of `previously_flattened`, while
/// an undo rebuilds each frame from `original` because any record in the
/// chain may have been removed.
///
/// Under `IndependentComposite` each frame is decoupled from its neighbors
/// (its buffer becomes the full visible composite) before edits replay, and
/// renormalized to the first frame's dimensions at the origin afterwards.
#[tracing::instrument(
    skip(original, previously_flattened),
    fields(frames = original.len())
)]
pub fn flatten(
    original: &[Frame],
    previously_flattened: &[Frame],
    disposal_method: &str,
    is_addition: bool,
) -> FlipbookResult<Vec<Frame>> {
    if original.is_empty() {
        return Err(FlipbookError::validation(
            "flatten requires at least one frame",
        ));
    }
    if previously_flattened.len() != original.len() {
        return Err(FlipbookError::validation(format!(
            "original ({}) and flattened ({}) sequences must have equal length",
            original.len(),
            previously_flattened.len()
        )));
    }

    let policy = DisposalPolicy::classify(disposal_method);
    let render_source = if is_addition {
        previously_flattened
    } else {
        original
    };
    let canonical = metadata::actual_dimensions(&original[0]);

    let mut flattened = Vec::with_capacity(original.len());
    for (i, source) in render_source.iter().enumerate() {
        let mut base = source.detached();
        policy.decouple(render_source, i, &mut base)?;

        if is_addition {
            // The just-recorded edit, then anything still pending after it.
            base = original[i].history().current_change().apply(&base);
            for change in original[i].history().after_current() {
                if !change.is_empty() {
                    base = change.apply(&base);
                }
            }
        } else {
            // Full rebuild: the removed record must not contribute anymore.
            for change in original[i].history().replay() {
                if !change.is_empty() {
                    base = change.apply(&base);
                }
            }
        }

        policy.renormalize(&mut base, canonical);
        flattened.push(base);
    }
    Ok(flattened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dimensions, Offset};
    use image::RgbaImage;

    fn frame(px: [u8; 4]) -> Frame {
        Frame::new(
            RgbaImage::from_pixel(4, 4, image::Rgba(px)),
            Offset::default(),
            Dimensions {
                width: 4,
                height: 4,
            },
            100,
        )
    }

    #[test]
    fn empty_input_is_a_validation_error() {
        let err = flatten(&[], &[], "none", false).unwrap_err();
        assert!(matches!(err, FlipbookError::Validation(_)));
    }

    #[test]
    fn mismatched_sequence_lengths_are_rejected() {
        let original = vec![frame([1, 1, 1, 255])];
        let err = flatten(&original, &[], "none", true).unwrap_err();
        assert!(matches!(err, FlipbookError::Validation(_)));
    }

    #[test]
    fn no_history_flatten_copies_frames() {
        let original = vec![frame([10, 20, 30, 255]), frame([40, 50, 60, 255])];
        let out = flatten(&original, &original, "restoreToBackground", false).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].image(), original[0].image());
        assert_eq!(out[1].image(), original[1].image());
        assert!(!out[0].has_change());
    }
}
