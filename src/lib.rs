//! Flipbook is the frame history and flattening engine of an animated
//! image editor.
//!
//! Every decoded frame owns an undoable chain of edit records (pixel
//! filters, frame replacements, metadata transforms). After any edit the
//! engine *flattens*: it replays each frame's chain against the document's
//! disposal semantics to produce the displayable/exportable frame set.
//!
//! # Pipeline overview
//!
//! 1. **Record**: an edit action appends a [`Change`] to one or more
//!    frames' histories ([`FrameSequence::add_change`]).
//! 2. **Flatten**: [`FrameSequence::recompute`] replays histories per
//!    frame (incrementally for additions, from scratch for undos), with
//!    [`DisposalPolicy`] deciding how neighboring frames composite.
//! 3. **Publish**: the flattened set is swapped in atomically and handed
//!    to display/encode collaborators as read-only views.
//!
//! Key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Single-threaded, synchronous**: edits and flattening run to
//!   completion before control returns to any collaborator.
//! - **No aliasing across snapshots**: pixel buffers are deep-copied
//!   whenever they cross into a new frame snapshot, so replay never
//!   mutates a previously published frame.
//! - **No IO**: decode/encode stay behind [`DecodedFrame`] and
//!   [`SequenceSink`]; the engine never touches the container format.
#![forbid(unsafe_code)]

pub mod core;
pub mod disposal;
pub mod error;
pub mod filters;
pub mod flatten;
pub mod frame;
pub mod history;
pub mod metadata;
pub mod raster;
pub mod sequence;

pub use crate::core::{
    DEFAULT_DELAY_MS, DEFAULT_DISPOSAL_METHOD, DELAY_UNIT_SCALE, DISPLAY_DELAY_MS, Dimensions,
    MIN_DELAY_MS, Offset, round_delay_ms,
};
pub use disposal::DisposalPolicy;
pub use error::{FlipbookError, FlipbookResult};
pub use filters::FrameFilter;
pub use flatten::flatten;
pub use frame::Frame;
pub use history::{Change, History, NodeId};
pub use metadata::{MetadataKind, actual_delay_ms, actual_dimensions, collapse_metadata};
pub use sequence::{ChangeMode, DecodedFrame, FlattenChangeset, FrameSequence, SequenceSink};
