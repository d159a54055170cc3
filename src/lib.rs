//! SlotForge reel engine
//!
//! Reel-spin motion for slot-machine previews: speed presets, a four-phase
//! reel controller, a staggered multi-reel sequencer, a pure time-to-frame
//! evaluator and a timeline bridge that keeps scrubbing and live playback
//! consistent.

pub mod animation;
pub mod config;
pub mod error;
pub mod render;
pub mod timeline;

pub use error::{ConfigError, EditError, TimelineError};
