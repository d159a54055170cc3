//! Scrub/playback bridge
//!
//! Owns the playhead and decides where reel state comes from. While playing,
//! the live sequencer is ticked by the clock. While scrubbing, reel states are
//! sampled from the closed-form trajectory and no live run exists. The frame
//! state always comes from the evaluator, so both paths agree at any time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::animation::events::PhaseObserver;
use crate::animation::reel::{ReelConfig, ReelMotionState};
use crate::animation::sequencer::{ReelSequencer, SequencerEvent};
use crate::animation::trajectory::sample_reel;
use crate::config::manifest::{LayoutElement, RhythmSpec, SlotManifest, StopPattern};
use crate::config::speed_preset::{PresetCatalog, PresetPhase, SpeedMode, SpeedPreset};
use crate::error::{ConfigError, EditError};
use crate::timeline::blocks::{live_landing, Timeline};
use crate::timeline::evaluator::{evaluate, FrameState, BOUNCE_DURATION_MS};

/// Who drives the playhead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    #[default]
    Stopped,
    Playing,
    Paused,
    Scrubbing,
}

impl PlaybackMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlaybackMode::Stopped => "Stopped",
            PlaybackMode::Playing => "Playing",
            PlaybackMode::Paused => "Paused",
            PlaybackMode::Scrubbing => "Scrubbing",
        }
    }
}

/// One clock step from the host frame loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    /// Host clock, informational only
    pub absolute_ms: f64,
    pub delta_ms: f64,
}

impl ClockTick {
    pub fn new(absolute_ms: f64, delta_ms: f64) -> Self {
        Self {
            absolute_ms,
            delta_ms,
        }
    }
}

pub struct PlaybackBridge {
    catalog: PresetCatalog,
    speed_mode: SpeedMode,
    stop_pattern: StopPattern,
    reel_configs: Vec<ReelConfig>,
    sequencer: ReelSequencer,
    timeline: Timeline,
    mode: PlaybackMode,
    /// The live run has been integrated up to the playhead
    live: bool,
}

impl PlaybackBridge {
    pub fn new(
        catalog: PresetCatalog,
        speed_mode: SpeedMode,
        stop_pattern: StopPattern,
        reel_count: usize,
        symbol_height: f64,
    ) -> Result<Self, ConfigError> {
        let preset = catalog.get(speed_mode);
        let sequencer = ReelSequencer::new(reel_count, symbol_height, Arc::clone(&preset))?;
        let reel_configs = sequencer.reels().iter().map(|r| *r.config()).collect();
        let timeline = Timeline::from_preset(speed_mode, &preset.read());

        let mut bridge = Self {
            catalog,
            speed_mode,
            stop_pattern,
            reel_configs,
            sequencer,
            timeline,
            mode: PlaybackMode::Stopped,
            live: false,
        };
        bridge.cover_run();
        Ok(bridge)
    }

    /// Bridge for a manifest's grid; its rhythm spec, if any, is copied into the catalog
    pub fn from_manifest(
        manifest: &SlotManifest,
        catalog: PresetCatalog,
        speed_mode: SpeedMode,
        stop_pattern: StopPattern,
    ) -> Result<Self, ConfigError> {
        manifest.validate()?;
        let mut stop_pattern = stop_pattern;
        if let Some(rhythm) = &manifest.rhythm_spec {
            catalog.apply_rhythm(rhythm)?;
            stop_pattern = rhythm.stop_pattern;
        }
        Self::new(
            catalog,
            speed_mode,
            stop_pattern,
            manifest.reel_count(),
            manifest.symbol_height(),
        )
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn PhaseObserver>>) {
        self.sequencer.set_observer(observer);
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn sequencer(&self) -> &ReelSequencer {
        &self.sequencer
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn stop_pattern(&self) -> StopPattern {
        self.stop_pattern
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn current_time(&self) -> f64 {
        self.timeline.current_time
    }

    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration
    }

    pub fn symbol_height(&self) -> f64 {
        self.reel_configs
            .first()
            .map(ReelConfig::symbol_height)
            .unwrap_or_default()
    }

    /// Current values of the active preset
    pub fn preset(&self) -> SpeedPreset {
        self.catalog.snapshot(self.speed_mode)
    }

    /// Switch speed mode; rewinds and relays the timeline
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
        let preset = self.catalog.get(mode);
        self.timeline.generate_from_preset(mode, &preset.read());
        self.sequencer.set_preset(preset);
        self.cover_run();
        self.stop();
        info!("Speed mode set to {}", mode);
    }

    pub fn set_stop_pattern(&mut self, pattern: StopPattern) {
        self.stop_pattern = pattern;
        self.cover_run();
        self.stop();
        info!("Stop pattern set to {:?}", pattern);
    }

    /// Start or resume playback
    ///
    /// Unless resuming from a pause, the live run is rebuilt from time zero
    /// and brought up to the playhead. Returns the events of that catch-up.
    pub fn play(&mut self) -> Vec<SequencerEvent> {
        if self.mode == PlaybackMode::Playing {
            return Vec::new();
        }
        if self.timeline.current_time >= self.timeline.total_duration {
            self.timeline.reset();
            self.live = false;
        }

        let events = if self.live {
            Vec::new()
        } else {
            self.rebuild_live(self.timeline.current_time)
        };
        self.mode = PlaybackMode::Playing;
        debug!("Playback started at {:.1}ms", self.timeline.current_time);
        events
    }

    pub fn pause(&mut self) {
        if self.mode == PlaybackMode::Playing {
            self.mode = PlaybackMode::Paused;
            debug!("Playback paused at {:.1}ms", self.timeline.current_time);
        }
    }

    /// Rewind to zero with every reel idle
    pub fn stop(&mut self) {
        self.sequencer.reset_all();
        self.timeline.reset();
        self.mode = PlaybackMode::Stopped;
        self.live = false;
    }

    /// Move the playhead directly; reel states are sampled until the next play
    pub fn scrub(&mut self, time_ms: f64) {
        self.timeline.set_time(time_ms);
        self.mode = PlaybackMode::Scrubbing;
        self.live = false;
    }

    /// Advance the playhead while playing
    pub fn tick(&mut self, tick: ClockTick) -> Vec<SequencerEvent> {
        if self.mode != PlaybackMode::Playing {
            return Vec::new();
        }

        let target = self.timeline.current_time + tick.delta_ms.max(0.0);
        self.timeline.set_time(target);
        let now = self.timeline.current_time;
        let events = self.sequencer.update(now);

        if now >= self.timeline.total_duration {
            self.mode = PlaybackMode::Paused;
            info!("Reached end of timeline at {:.1}ms", now);
        }
        events
    }

    /// Stop every reel now, overriding the stop pattern
    pub fn request_stop(&mut self) -> Vec<SequencerEvent> {
        if !self.live {
            return Vec::new();
        }
        self.sequencer.stop_all(self.timeline.current_time)
    }

    /// Snap every reel now
    pub fn request_instant_stop(&mut self) -> Vec<SequencerEvent> {
        if !self.live {
            return Vec::new();
        }
        self.sequencer.instant_stop_all(self.timeline.current_time)
    }

    /// Reel states at the playhead
    pub fn reel_states(&self) -> Vec<ReelMotionState> {
        match self.mode {
            PlaybackMode::Stopped => vec![ReelMotionState::default(); self.reel_configs.len()],
            PlaybackMode::Playing | PlaybackMode::Paused if self.live => self.sequencer.states(),
            _ => self.sampled_states(self.timeline.current_time),
        }
    }

    /// Reel states computed from the trajectory alone
    pub fn sampled_states(&self, time_ms: f64) -> Vec<ReelMotionState> {
        let preset = self.preset();
        self.reel_configs
            .iter()
            .map(|config| {
                let stop_at = self.planned_stop(&preset, config.reel_id());
                sample_reel(&preset, config, 0.0, stop_at, time_ms)
            })
            .collect()
    }

    /// Evaluator rhythm derived from the live catalog
    pub fn rhythm_spec(&self) -> RhythmSpec {
        RhythmSpec::from_catalog(
            &self.catalog,
            self.symbol_height(),
            self.speed_mode,
            self.stop_pattern,
        )
    }

    /// Frame state at the playhead
    pub fn frame_state(&self, elements: &[LayoutElement]) -> FrameState {
        evaluate(
            self.timeline.current_time,
            Some(&self.rhythm_spec()),
            elements,
        )
    }

    /// Edit a duration of the active preset and mirror it into the timeline
    pub fn update_phase_duration(
        &mut self,
        phase: PresetPhase,
        duration_ms: f64,
    ) -> Result<(), EditError> {
        self.catalog
            .update_phase_duration(self.speed_mode, phase, duration_ms)?;
        self.timeline.set_phase_duration(phase, duration_ms)?;
        self.after_preset_edit(phase);
        Ok(())
    }

    /// Resize a timeline block and mirror it into the preset
    pub fn update_block_duration(&mut self, id: &str, duration_ms: f64) -> Result<(), EditError> {
        let phase = self.timeline.update_block_duration(id, duration_ms)?;
        if let Some(phase) = phase {
            self.catalog
                .update_phase_duration(self.speed_mode, phase, duration_ms)?;
            self.after_preset_edit(phase);
        }
        Ok(())
    }

    fn after_preset_edit(&mut self, phase: PresetPhase) {
        self.cover_run();
        match self.mode {
            // pending stops move with the new spin time
            PlaybackMode::Playing
                if matches!(phase, PresetPhase::Spin | PresetPhase::Interval) =>
            {
                self.sequencer.schedule_auto_stops(self.stop_pattern, 0.0);
            }
            PlaybackMode::Playing => {}
            _ => self.live = false,
        }
    }

    /// Last moment anything moves: the latest live landing or evaluator bounce
    fn run_end(&self) -> f64 {
        let preset = self.preset();
        let rhythm = self.rhythm_spec();
        (0..self.reel_configs.len())
            .map(|reel| {
                let landing = live_landing(&preset, self.stop_pattern, reel);
                let bounce_end = rhythm
                    .stop_time(reel)
                    .map_or(0.0, |stop| stop + BOUNCE_DURATION_MS);
                landing.max(bounce_end)
            })
            .fold(0.0, f64::max)
    }

    fn cover_run(&mut self) {
        let end = self.run_end();
        self.timeline.cover_run(end);
    }

    fn planned_stop(&self, preset: &SpeedPreset, reel_id: usize) -> Option<f64> {
        if preset.is_instant() {
            return None;
        }
        Some(
            preset.spin_duration
                + self
                    .stop_pattern
                    .stop_offset(reel_id, preset.interval_between_reels),
        )
    }

    fn rebuild_live(&mut self, time_ms: f64) -> Vec<SequencerEvent> {
        self.sequencer.reset_all();
        let mut events = self.sequencer.spin_all(0.0);
        self.sequencer.schedule_auto_stops(self.stop_pattern, 0.0);
        events.extend(self.sequencer.update(time_ms));
        self.live = true;
        debug!(
            "Live run rebuilt up to {:.1}ms ({} events)",
            time_ms,
            events.len()
        );
        events
    }
}
