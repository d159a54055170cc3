//! Reel motion legs
//!
//! Closed-form pieces of the reel model shared by the live controller and the
//! pure trajectory sampler: the acceleration ramp, cruise, the align leg and
//! the settle leg. All times are absolute milliseconds.

use crate::animation::easing::{ease_out_cubic, settle_curve};
use crate::config::speed_preset::{ms_to_secs, SpeedPreset};

/// Length of the acceleration ramp from rest to cruise speed
pub const RAMP_MS: f64 = 500.0;

/// Tolerance, in symbols, when snapping onto an alignment line
const ALIGN_EPSILON: f64 = 1e-9;

/// Speed after `elapsed_ms` of the ramp
pub fn ramp_speed(cruise_speed: f64, elapsed_ms: f64) -> f64 {
    cruise_speed * (elapsed_ms.clamp(0.0, RAMP_MS) / RAMP_MS)
}

/// Distance covered after `elapsed_ms` of the ramp
pub fn ramp_distance(cruise_speed: f64, elapsed_ms: f64) -> f64 {
    let t = elapsed_ms.clamp(0.0, RAMP_MS);
    0.5 * ramp_speed(cruise_speed, t) * ms_to_secs(t)
}

/// Distance covered by a reel that has not been asked to stop
pub fn free_spin_distance(cruise_speed: f64, elapsed_ms: f64) -> f64 {
    let cruise_ms = (elapsed_ms - RAMP_MS).max(0.0);
    ramp_distance(cruise_speed, elapsed_ms) + cruise_speed * ms_to_secs(cruise_ms)
}

/// Smallest multiple of `symbol_height` at or above `position`
pub fn align_up(position: f64, symbol_height: f64) -> f64 {
    ((position / symbol_height) - ALIGN_EPSILON).ceil() * symbol_height
}

/// Multiple of `symbol_height` closest to `position`
pub fn align_nearest(position: f64, symbol_height: f64) -> f64 {
    (position / symbol_height).round() * symbol_height
}

fn progress(now: f64, started_at: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        1.0
    } else {
        ((now - started_at) / duration).clamp(0.0, 1.0)
    }
}

/// Align leg computed when a stop is requested
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopPlan {
    pub start_position: f64,
    pub started_at: f64,
    /// First alignment line past the safety distance
    pub aligned_target: f64,
    /// Where the align leg ends: aligned target plus any overshoot
    pub align_target: f64,
    pub align_duration: f64,
    /// A settle leg follows the align leg
    pub settles: bool,
}

impl StopPlan {
    pub fn new(
        start_position: f64,
        started_at: f64,
        preset: &SpeedPreset,
        symbol_height: f64,
    ) -> Self {
        let aligned_target = align_up(
            start_position + preset.safety_distance(symbol_height),
            symbol_height,
        );
        let overshoot = preset.overshoot_distance(symbol_height);

        Self {
            start_position,
            started_at,
            aligned_target,
            align_target: aligned_target + overshoot,
            align_duration: preset.align_duration,
            settles: overshoot > 0.0,
        }
    }

    pub fn align_end(&self) -> f64 {
        self.started_at + self.align_duration
    }

    /// Position on the align leg at `now`
    pub fn position_at(&self, now: f64) -> f64 {
        let eased = ease_out_cubic(progress(now, self.started_at, self.align_duration));
        self.start_position + (self.align_target - self.start_position) * eased
    }
}

/// Settle leg from the overshoot back onto the nearest alignment line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettleLeg {
    pub from: f64,
    pub to: f64,
    pub started_at: f64,
    pub duration: f64,
    pub bounce_strength: f64,
}

impl SettleLeg {
    /// Durations are read from the preset when the leg begins
    pub fn new(from: f64, started_at: f64, preset: &SpeedPreset, symbol_height: f64) -> Self {
        Self {
            from,
            to: align_nearest(from, symbol_height),
            started_at,
            duration: preset.settle_duration,
            bounce_strength: preset.bounce_strength,
        }
    }

    pub fn end(&self) -> f64 {
        self.started_at + self.duration
    }

    pub fn position_at(&self, now: f64) -> f64 {
        let eased = settle_curve(
            progress(now, self.started_at, self.duration),
            self.bounce_strength,
        );
        self.from + (self.to - self.from) * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ramp() {
        assert_eq!(ramp_speed(1000.0, 0.0), 0.0);
        assert_eq!(ramp_speed(1000.0, 250.0), 500.0);
        assert_eq!(ramp_speed(1000.0, 900.0), 1000.0);
        // triangle: 0.5 * 1000 px/s * 0.5 s
        assert_abs_diff_eq!(ramp_distance(1000.0, RAMP_MS), 250.0);
        assert_abs_diff_eq!(free_spin_distance(1000.0, 1500.0), 1250.0);
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(6375.0, 125.0), 6375.0);
        assert_eq!(align_up(6376.0, 125.0), 6500.0);
        assert_eq!(align_up(0.0, 125.0), 0.0);
        assert_eq!(align_up(0.1, 125.0), 125.0);
    }

    #[test]
    fn test_align_nearest() {
        assert_eq!(align_nearest(6412.5, 125.0), 6375.0);
        assert_eq!(align_nearest(6450.0, 125.0), 6500.0);
    }

    #[test]
    fn test_stop_plan_worked_example() {
        // normal preset, stop requested at 6000px
        let plan = StopPlan::new(6000.0, 3000.0, &SpeedPreset::normal(), 125.0);
        assert_eq!(plan.aligned_target, 6375.0);
        assert_abs_diff_eq!(plan.align_target, 6375.0 + 0.3 * 125.0);
        assert!(plan.settles);
        assert_eq!(plan.align_end(), 3300.0);
        assert_eq!(plan.position_at(3000.0), 6000.0);
        assert_abs_diff_eq!(plan.position_at(3300.0), plan.align_target);
    }

    #[test]
    fn test_stop_plan_without_overshoot() {
        let preset = SpeedPreset {
            overshoot_symbols: 0.0,
            ..SpeedPreset::normal()
        };
        let plan = StopPlan::new(6010.0, 0.0, &preset, 125.0);
        assert_eq!(plan.aligned_target, 6500.0);
        assert_eq!(plan.align_target, 6500.0);
        assert!(!plan.settles);
    }

    #[test]
    fn test_settle_leg_rounds_to_nearest() {
        let preset = SpeedPreset::normal();
        let leg = SettleLeg::new(6412.5, 3300.0, &preset, 125.0);
        assert_eq!(leg.to, 6375.0);
        assert_eq!(leg.end(), 3500.0);
        assert_eq!(leg.position_at(3300.0), 6412.5);
        assert_abs_diff_eq!(leg.position_at(3500.0), 6375.0);

        // an overshoot past half a symbol settles one symbol further on
        let leg = SettleLeg::new(6375.0 + 0.6 * 125.0, 0.0, &preset, 125.0);
        assert_eq!(leg.to, 6500.0);
    }

    #[test]
    fn test_zero_length_legs_finish_immediately() {
        let preset = SpeedPreset {
            align_duration: 0.0,
            ..SpeedPreset::normal()
        };
        let plan = StopPlan::new(100.0, 50.0, &preset, 125.0);
        assert_eq!(plan.position_at(50.0), plan.align_target);
    }
}
