//! Speed preset catalog
//!
//! Named phase-duration and physics tables for the four speed modes.
//! Presets are handed out as [`SharedPreset`] handles: an edit made through the
//! catalog is seen by every controller holding the same handle.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::manifest::RhythmSpec;
use crate::error::{check_duration, check_parameter, ConfigError};

/// Minimum distance, in symbols, between the stop request and the alignment line
pub const MIN_SAFETY_SYMBOLS: f64 = 3.0;

/// Cruise speed used when a preset does not describe one (px/s)
pub const DEFAULT_CRUISE_SPEED: f64 = 2500.0;

/// Live handle to a preset
pub type SharedPreset = Arc<RwLock<SpeedPreset>>;

/// Named speed mode
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum SpeedMode {
    Instant,
    Fast,
    #[default]
    Normal,
    Slow,
}

impl SpeedMode {
    pub const ALL: [SpeedMode; 4] = [
        SpeedMode::Instant,
        SpeedMode::Fast,
        SpeedMode::Normal,
        SpeedMode::Slow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpeedMode::Instant => "instant",
            SpeedMode::Fast => "fast",
            SpeedMode::Normal => "normal",
            SpeedMode::Slow => "slow",
        }
    }

    /// Timeline block color for this mode
    pub fn color(&self) -> &'static str {
        match self {
            SpeedMode::Instant => "#ef4444",
            SpeedMode::Fast => "#fbbf24",
            SpeedMode::Normal | SpeedMode::Slow => "#9ca3af",
        }
    }
}

impl fmt::Display for SpeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpeedMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instant" => Ok(SpeedMode::Instant),
            "fast" => Ok(SpeedMode::Fast),
            "normal" => Ok(SpeedMode::Normal),
            "slow" => Ok(SpeedMode::Slow),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// One editable duration field of a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetPhase {
    Spin,
    Decelerate,
    Align,
    Settle,
    Interval,
}

impl PresetPhase {
    /// Phases laid out one after another on a reel's timeline
    pub const SEQUENCE: [PresetPhase; 4] = [
        PresetPhase::Spin,
        PresetPhase::Decelerate,
        PresetPhase::Align,
        PresetPhase::Settle,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            PresetPhase::Spin => "spin_duration",
            PresetPhase::Decelerate => "decelerate_duration",
            PresetPhase::Align => "align_duration",
            PresetPhase::Settle => "settle_duration",
            PresetPhase::Interval => "interval_between_reels",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PresetPhase::Spin => "Spin",
            PresetPhase::Decelerate => "Decelerate",
            PresetPhase::Align => "Align",
            PresetPhase::Settle => "Settle",
            PresetPhase::Interval => "Reel Interval",
        }
    }
}

/// Phase durations (ms) and physics parameters for one speed mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedPreset {
    pub spin_duration: f64,
    pub decelerate_duration: f64,
    pub align_duration: f64,
    pub settle_duration: f64,
    /// Stagger step between consecutive reels
    pub interval_between_reels: f64,
    /// Symbol heights travelled while spinning
    pub spin_symbol_count: u32,
    /// Symbol heights kept between a stop request and the alignment line
    pub decelerate_symbol_count: u32,
    /// Fractional symbol heights travelled past alignment before settling
    pub overshoot_symbols: f64,
    /// Elasticity of the settle curve, 0 disables the bounce
    pub bounce_strength: f64,
}

impl Default for SpeedPreset {
    fn default() -> Self {
        Self::normal()
    }
}

impl SpeedPreset {
    /// No animation at all: reels complete as soon as they spin
    pub fn instant() -> Self {
        Self {
            spin_duration: 0.0,
            decelerate_duration: 0.0,
            align_duration: 0.0,
            settle_duration: 0.0,
            interval_between_reels: 0.0,
            spin_symbol_count: 0,
            decelerate_symbol_count: 0,
            overshoot_symbols: 0.0,
            bounce_strength: 0.0,
        }
    }

    pub fn fast() -> Self {
        Self {
            spin_duration: 1000.0,
            decelerate_duration: 500.0,
            align_duration: 200.0,
            settle_duration: 150.0,
            interval_between_reels: 100.0,
            spin_symbol_count: 12,
            decelerate_symbol_count: 2,
            overshoot_symbols: 0.25,
            bounce_strength: 0.6,
        }
    }

    pub fn normal() -> Self {
        Self {
            spin_duration: 2000.0,
            decelerate_duration: 1000.0,
            align_duration: 300.0,
            settle_duration: 200.0,
            interval_between_reels: 200.0,
            spin_symbol_count: 20,
            decelerate_symbol_count: 3,
            overshoot_symbols: 0.3,
            bounce_strength: 0.5,
        }
    }

    pub fn slow() -> Self {
        Self {
            spin_duration: 3000.0,
            decelerate_duration: 1500.0,
            align_duration: 450.0,
            settle_duration: 300.0,
            interval_between_reels: 300.0,
            spin_symbol_count: 24,
            decelerate_symbol_count: 4,
            overshoot_symbols: 0.4,
            bounce_strength: 0.4,
        }
    }

    /// Built-in table for a mode
    pub fn for_mode(mode: SpeedMode) -> Self {
        match mode {
            SpeedMode::Instant => Self::instant(),
            SpeedMode::Fast => Self::fast(),
            SpeedMode::Normal => Self::normal(),
            SpeedMode::Slow => Self::slow(),
        }
    }

    /// Reject negative or non-finite values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_duration("spin_duration", self.spin_duration)?;
        check_duration("decelerate_duration", self.decelerate_duration)?;
        check_duration("align_duration", self.align_duration)?;
        check_duration("settle_duration", self.settle_duration)?;
        check_duration("interval_between_reels", self.interval_between_reels)?;
        check_parameter("overshoot_symbols", self.overshoot_symbols)?;
        check_parameter("bounce_strength", self.bounce_strength)?;
        Ok(())
    }

    /// Validate and wrap into a live handle
    pub fn into_shared(self) -> Result<SharedPreset, ConfigError> {
        self.validate()?;
        Ok(Arc::new(RwLock::new(self)))
    }

    pub fn duration(&self, phase: PresetPhase) -> f64 {
        match phase {
            PresetPhase::Spin => self.spin_duration,
            PresetPhase::Decelerate => self.decelerate_duration,
            PresetPhase::Align => self.align_duration,
            PresetPhase::Settle => self.settle_duration,
            PresetPhase::Interval => self.interval_between_reels,
        }
    }

    /// Overwrite a single duration field
    pub fn set_duration(&mut self, phase: PresetPhase, ms: f64) -> Result<(), ConfigError> {
        let ms = check_duration(phase.field_name(), ms)?;
        match phase {
            PresetPhase::Spin => self.spin_duration = ms,
            PresetPhase::Decelerate => self.decelerate_duration = ms,
            PresetPhase::Align => self.align_duration = ms,
            PresetPhase::Settle => self.settle_duration = ms,
            PresetPhase::Interval => self.interval_between_reels = ms,
        }
        Ok(())
    }

    pub fn is_instant(&self) -> bool {
        self.spin_duration <= 0.0
    }

    /// Overshoot and bounce together enable the settle phase
    pub fn has_settle_phase(&self) -> bool {
        self.overshoot_symbols > 0.0 && self.bounce_strength > 0.0
    }

    /// Stagger delay of a reel
    pub fn reel_delay(&self, reel_id: usize) -> f64 {
        reel_id as f64 * self.interval_between_reels
    }

    /// Cruise speed in px/s for a reel with the given symbol height
    pub fn cruise_speed(&self, symbol_height: f64) -> f64 {
        if self.spin_symbol_count == 0 || self.spin_duration <= 0.0 {
            return DEFAULT_CRUISE_SPEED;
        }
        self.spin_symbol_count as f64 * symbol_height / ms_to_secs(self.spin_duration)
    }

    /// Distance kept between a stop request and the alignment target
    pub fn safety_distance(&self, symbol_height: f64) -> f64 {
        MIN_SAFETY_SYMBOLS.max(self.decelerate_symbol_count as f64) * symbol_height
    }

    /// Pixels travelled past alignment before settling
    pub fn overshoot_distance(&self, symbol_height: f64) -> f64 {
        if self.has_settle_phase() {
            self.overshoot_symbols * symbol_height
        } else {
            0.0
        }
    }
}

/// Convert configuration milliseconds to animation seconds
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}

/// All four presets, each behind a live handle
#[derive(Debug, Clone)]
pub struct PresetCatalog {
    presets: BTreeMap<SpeedMode, SharedPreset>,
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetCatalog {
    /// Catalog with the built-in tables
    pub fn builtin() -> Self {
        let presets = SpeedMode::ALL
            .iter()
            .map(|&mode| (mode, Arc::new(RwLock::new(SpeedPreset::for_mode(mode)))))
            .collect();
        Self { presets }
    }

    /// Built-in catalog with per-mode overrides read from a JSON file
    ///
    /// The file maps mode names to (possibly partial) presets.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides: BTreeMap<SpeedMode, SpeedPreset> =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::builtin();
        catalog.apply_overrides(overrides)?;
        info!("Loaded preset overrides from {:?}", path);
        Ok(catalog)
    }

    /// Replace presets in place, keeping existing handles live
    pub fn apply_overrides(
        &self,
        overrides: BTreeMap<SpeedMode, SpeedPreset>,
    ) -> Result<(), ConfigError> {
        for preset in overrides.values() {
            preset.validate()?;
        }
        for (mode, preset) in overrides {
            *self.get(mode).write() = preset;
        }
        Ok(())
    }

    /// Copy manifest timing onto the matching presets
    pub fn apply_rhythm(&self, rhythm: &RhythmSpec) -> Result<(), ConfigError> {
        for profile in rhythm.profiles.values() {
            check_duration("spin_duration", profile.spin_duration)?;
            check_duration("reel_stop_interval", profile.reel_stop_interval)?;
        }
        for (&mode, profile) in &rhythm.profiles {
            let shared = self.get(mode);
            let mut preset = shared.write();
            preset.spin_duration = profile.spin_duration;
            preset.interval_between_reels = profile.reel_stop_interval;
        }
        Ok(())
    }

    /// Live handle for a mode
    pub fn get(&self, mode: SpeedMode) -> SharedPreset {
        // every mode is inserted at construction
        self.presets
            .get(&mode)
            .cloned()
            .unwrap_or_else(|| Arc::new(RwLock::new(SpeedPreset::for_mode(mode))))
    }

    /// Copy of the current values for a mode
    pub fn snapshot(&self, mode: SpeedMode) -> SpeedPreset {
        self.get(mode).read().clone()
    }

    /// Edit one duration field of a preset in place
    pub fn update_phase_duration(
        &self,
        mode: SpeedMode,
        phase: PresetPhase,
        ms: f64,
    ) -> Result<(), ConfigError> {
        self.get(mode).write().set_duration(phase, ms)?;
        debug!("Preset {} {} -> {}ms", mode, phase.field_name(), ms);
        Ok(())
    }
}
