//! Timeline module
//!
//! The pure frame-state evaluator, the block timeline and the bridge that
//! keeps scrubbing and live playback in step.

pub mod blocks;
pub mod evaluator;
pub mod playback;

pub use blocks::{SpinPlan, Timeline, TimelineBlock, TimelineTrack};
pub use evaluator::{evaluate, ElementTransform, FrameState};
pub use playback::{ClockTick, PlaybackBridge, PlaybackMode};
