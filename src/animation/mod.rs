//! Animation module
//!
//! Reel motion: easing curves, the single-reel controller, the multi-reel
//! sequencer and a closed-form sampler of the same model.

pub mod easing;
pub mod events;
pub mod motion;
pub mod reel;
pub mod sequencer;
pub mod trajectory;

pub use events::{ChannelObserver, PhaseObserver, PhaseTransition, TransitionRecorder};
pub use reel::{ReelCompletion, ReelConfig, ReelController, ReelMotionState, ReelStatus};
pub use sequencer::{ReelSequencer, SequencerEvent};
pub use trajectory::sample_reel;
