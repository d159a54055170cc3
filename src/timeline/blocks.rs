//! Timeline tracks and blocks
//!
//! The inspector view of a spin: one block per preset phase on the reels
//! track. Blocks on a track never overlap; resizing a block shifts everything
//! after it.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::manifest::StopPattern;
use crate::config::speed_preset::{PresetPhase, SpeedMode, SpeedPreset};
use crate::error::TimelineError;

/// Smallest view range
pub const DEFAULT_VIEW_MS: f64 = 5000.0;

/// Room left after the last block
pub const VIEW_PADDING_MS: f64 = 1000.0;

pub const GLOBAL_TRACK: &str = "global";
pub const REELS_TRACK: &str = "reels";
pub const WIN_TRACK: &str = "win";
pub const AUDIO_TRACK: &str = "audio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineTrack {
    pub id: String,
    pub label: String,
}

impl TimelineTrack {
    fn new(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineBlock {
    pub id: String,
    pub track_id: String,
    /// ms
    pub start: f64,
    /// ms
    pub duration: f64,
    pub label: String,
    pub color: String,
    /// Preset field this block edits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<PresetPhase>,
}

impl TimelineBlock {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn contains(&self, time_ms: f64) -> bool {
        time_ms >= self.start && time_ms < self.end()
    }
}

/// Phase boundaries of one reel, known up front from the preset
///
/// This is the phase-by-phase view shown on the reels track. The live motion
/// has no separate decelerate leg: a stop runs straight into the align leg,
/// so `decelerate_duration` only shapes this view. When a live run lands
/// comes from [`live_landing`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    pub start: f64,
    pub spin_end: f64,
    pub decelerate_end: f64,
    pub align_end: f64,
    pub settle_end: f64,
}

impl SpinPlan {
    pub fn for_reel(preset: &SpeedPreset, reel_id: usize) -> Self {
        let start = preset.reel_delay(reel_id);
        let spin_end = start + preset.spin_duration;
        let decelerate_end = spin_end + preset.decelerate_duration;
        let align_end = decelerate_end + preset.align_duration;
        let settle_end = if preset.has_settle_phase() {
            align_end + preset.settle_duration
        } else {
            align_end
        };

        Self {
            start,
            spin_end,
            decelerate_end,
            align_end,
            settle_end,
        }
    }

    /// `(start, end)` of a phase
    pub fn phase_range(&self, phase: PresetPhase) -> (f64, f64) {
        match phase {
            PresetPhase::Interval => (0.0, self.start),
            PresetPhase::Spin => (self.start, self.spin_end),
            PresetPhase::Decelerate => (self.spin_end, self.decelerate_end),
            PresetPhase::Align => (self.decelerate_end, self.align_end),
            PresetPhase::Settle => (self.align_end, self.settle_end),
        }
    }

    /// Phase running at `time_ms`, if any
    pub fn phase_at(&self, time_ms: f64) -> Option<PresetPhase> {
        PresetPhase::SEQUENCE.into_iter().find(|&phase| {
            let (start, end) = self.phase_range(phase);
            time_ms >= start && time_ms < end
        })
    }

    pub fn end(&self) -> f64 {
        self.settle_end
    }
}

/// Time reel `reel_id` of a run spun at 0 lands on its final position
///
/// Follows the live schedule: the pattern's auto stop, deferred to the
/// reel's start when it falls inside the stagger delay, then the align leg
/// and the settle leg if there is one.
pub fn live_landing(preset: &SpeedPreset, pattern: StopPattern, reel_id: usize) -> f64 {
    if preset.is_instant() {
        return 0.0;
    }
    let stop_at =
        preset.spin_duration + pattern.stop_offset(reel_id, preset.interval_between_reels);
    let settle = if preset.has_settle_phase() {
        preset.settle_duration
    } else {
        0.0
    };
    stop_at.max(preset.reel_delay(reel_id)) + preset.align_duration + settle
}

fn phase_color(mode: SpeedMode, phase: PresetPhase) -> &'static str {
    match phase {
        PresetPhase::Spin => mode.color(),
        PresetPhase::Decelerate => "#60a5fa",
        PresetPhase::Align => "#34d399",
        PresetPhase::Settle => "#a78bfa",
        PresetPhase::Interval => "#6b7280",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub tracks: Vec<TimelineTrack>,
    pub blocks: Vec<TimelineBlock>,
    pub current_time: f64,
    pub total_duration: f64,
    /// End of the animation the view has to cover, beyond the blocks
    #[serde(default)]
    pub run_end: f64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            tracks: vec![
                TimelineTrack::new(GLOBAL_TRACK, "Global"),
                TimelineTrack::new(REELS_TRACK, "Reels Group"),
                TimelineTrack::new(WIN_TRACK, "Win Demo"),
                TimelineTrack::new(AUDIO_TRACK, "Audio/FX"),
            ],
            blocks: Vec::new(),
            current_time: 0.0,
            total_duration: DEFAULT_VIEW_MS,
            run_end: 0.0,
        }
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline laid out for a preset
    pub fn from_preset(mode: SpeedMode, preset: &SpeedPreset) -> Self {
        let mut timeline = Self::default();
        timeline.generate_from_preset(mode, preset);
        timeline
    }

    /// Move the playhead, clamped to the view range
    pub fn set_time(&mut self, time_ms: f64) {
        if time_ms.is_nan() {
            return;
        }
        self.current_time = time_ms.clamp(0.0, self.total_duration);
    }

    pub fn reset(&mut self) {
        self.current_time = 0.0;
    }

    /// Replace all blocks with the phases of a preset
    pub fn generate_from_preset(&mut self, mode: SpeedMode, preset: &SpeedPreset) {
        self.blocks.clear();
        self.current_time = 0.0;

        let plan = SpinPlan::for_reel(preset, 0);
        for phase in PresetPhase::SEQUENCE {
            if phase == PresetPhase::Settle && !preset.has_settle_phase() {
                continue;
            }
            let (start, end) = plan.phase_range(phase);
            let label = match phase {
                PresetPhase::Spin => format!("Spin ({mode})"),
                other => other.label().to_string(),
            };
            self.blocks.push(TimelineBlock {
                id: Uuid::new_v4().to_string(),
                track_id: REELS_TRACK.to_string(),
                start,
                duration: end - start,
                label,
                color: phase_color(mode, phase).to_string(),
                phase: Some(phase),
            });
        }

        self.fit_view();
        debug!(
            "Timeline generated for {}: {} blocks, {:.0}ms view",
            mode,
            self.blocks.len(),
            self.total_duration
        );
    }

    pub fn block(&self, id: &str) -> Option<&TimelineBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Block tagged with a preset phase
    pub fn block_for_phase(&self, phase: PresetPhase) -> Option<&TimelineBlock> {
        self.blocks.iter().find(|b| b.phase == Some(phase))
    }

    /// Blocks of a track in time order
    pub fn blocks_on(&self, track_id: &str) -> Vec<&TimelineBlock> {
        let mut blocks: Vec<&TimelineBlock> = self
            .blocks
            .iter()
            .filter(|b| b.track_id == track_id)
            .collect();
        blocks.sort_by(|a, b| a.start.total_cmp(&b.start));
        blocks
    }

    /// End of the last block on any track
    pub fn content_end(&self) -> f64 {
        self.blocks.iter().map(TimelineBlock::end).fold(0.0, f64::max)
    }

    /// Resize a block and shift the later blocks of its track by the same delta
    ///
    /// Returns the preset phase the block stands for, so the caller can
    /// mirror the edit into the preset.
    pub fn update_block_duration(
        &mut self,
        id: &str,
        duration_ms: f64,
    ) -> Result<Option<PresetPhase>, TimelineError> {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return Err(TimelineError::InvalidDuration(duration_ms));
        }
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| TimelineError::UnknownBlock(id.to_string()))?;

        let track_id = self.blocks[index].track_id.clone();
        let delta = duration_ms - self.blocks[index].duration;

        let mut order: Vec<usize> = (0..self.blocks.len())
            .filter(|&i| self.blocks[i].track_id == track_id)
            .collect();
        order.sort_by(|&a, &b| {
            self.blocks[a]
                .start
                .total_cmp(&self.blocks[b].start)
                .then(a.cmp(&b))
        });
        let later = order
            .iter()
            .position(|&i| i == index)
            .map_or(&[][..], |pos| &order[pos + 1..]);
        for &i in later {
            self.blocks[i].start += delta;
        }
        self.blocks[index].duration = duration_ms;

        self.fit_view();
        debug!(
            "Block {} resized to {:.0}ms ({} later blocks shifted by {:+.0}ms)",
            self.blocks[index].label,
            duration_ms,
            later.len(),
            delta
        );
        Ok(self.blocks[index].phase)
    }

    /// Resize the block tagged with `phase`; `Ok(false)` when there is none
    pub fn set_phase_duration(
        &mut self,
        phase: PresetPhase,
        duration_ms: f64,
    ) -> Result<bool, TimelineError> {
        let Some(id) = self.block_for_phase(phase).map(|b| b.id.clone()) else {
            return Ok(false);
        };
        self.update_block_duration(&id, duration_ms)?;
        Ok(true)
    }

    /// Keep the view long enough for an animation ending at `end_ms`
    pub fn cover_run(&mut self, end_ms: f64) {
        if end_ms.is_finite() {
            self.run_end = end_ms.max(0.0);
            self.fit_view();
        }
    }

    /// View range covering every block and the run, plus padding
    fn fit_view(&mut self) {
        let end = self.content_end().max(self.run_end);
        self.total_duration = DEFAULT_VIEW_MS.max(end + VIEW_PADDING_MS);
        self.current_time = self.current_time.min(self.total_duration);
    }
}
