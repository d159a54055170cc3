//! Time to frame-state evaluator
//!
//! A pure function of time: the same time, rhythm and elements always give
//! the same [`FrameState`]. Scrubbing relies on this to jump anywhere on the
//! timeline without playing through it.

use std::collections::BTreeMap;

use crate::animation::easing::{bump, ease_in_back};
use crate::config::manifest::{LayoutElement, RhythmSpec};

/// Length of the anticipation wind-up at the start of a spin
pub const ACCEL_DURATION_MS: f64 = 500.0;

/// Peak of the wind-up offset, in pixels
pub const ANTICIPATION_AMPLITUDE: f64 = 100.0;

/// Scroll speed while spinning
pub const SPIN_SPEED_PX_PER_MS: f64 = 2.5;

/// Landing bump window after a reel's stop time
pub const BOUNCE_DURATION_MS: f64 = 400.0;

pub const MOTION_BLUR: f64 = 10.0;

/// Vertical stretch while in motion
pub const MOTION_STRETCH: f64 = 1.1;

/// Visual transform of one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub offset_y: f64,
    pub blur: f64,
    pub scale_y: f64,
    pub opacity: f64,
}

impl ElementTransform {
    pub const STATIC: ElementTransform = ElementTransform {
        offset_y: 0.0,
        blur: 0.0,
        scale_y: 1.0,
        opacity: 1.0,
    };

    pub fn is_static(&self) -> bool {
        *self == Self::STATIC
    }
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::STATIC
    }
}

/// Transform of every element, keyed by element id
pub type FrameState = BTreeMap<String, ElementTransform>;

/// Frame state of all elements at `time_ms`
///
/// Without a rhythm, with a rhythm missing its active profile, or at
/// `time_ms <= 0`, every element is static. Only symbols ever move.
pub fn evaluate(
    time_ms: f64,
    rhythm: Option<&RhythmSpec>,
    elements: &[LayoutElement],
) -> FrameState {
    let mut state: FrameState = elements
        .iter()
        .map(|el| (el.id.clone(), ElementTransform::STATIC))
        .collect();

    if !time_ms.is_finite() || time_ms <= 0.0 {
        return state;
    }
    let Some(rhythm) = rhythm else {
        return state;
    };
    let Some(profile) = rhythm.active_profile() else {
        return state;
    };

    for el in elements.iter().filter(|el| el.is_symbol()) {
        let Some(stop_time) = rhythm.stop_time(el.reel_index()) else {
            continue;
        };
        state.insert(
            el.id.clone(),
            symbol_transform(time_ms, stop_time, profile.bounce_strength),
        );
    }
    state
}

/// Transform of a symbol on a reel that stops at `stop_time`
pub fn symbol_transform(time_ms: f64, stop_time: f64, bounce_strength: f64) -> ElementTransform {
    if time_ms < stop_time {
        if time_ms < ACCEL_DURATION_MS {
            let progress = time_ms / ACCEL_DURATION_MS;
            return ElementTransform {
                offset_y: ease_in_back(progress) * ANTICIPATION_AMPLITUDE,
                ..ElementTransform::STATIC
            };
        }
        return in_motion(SPIN_SPEED_PX_PER_MS * (time_ms - ACCEL_DURATION_MS));
    }

    let since_stop = time_ms - stop_time;
    if since_stop < BOUNCE_DURATION_MS {
        let progress = since_stop / BOUNCE_DURATION_MS;
        return in_motion(bounce_strength * bump(progress));
    }
    ElementTransform::STATIC
}

fn in_motion(offset_y: f64) -> ElementTransform {
    ElementTransform {
        offset_y,
        blur: MOTION_BLUR,
        scale_y: MOTION_STRETCH,
        opacity: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::manifest::{GridConfig, SlotManifest, SpeedProfile, StopPattern};
    use crate::config::speed_preset::SpeedMode;
    use approx::assert_abs_diff_eq;

    fn rhythm() -> RhythmSpec {
        let mut spec = RhythmSpec::default();
        spec.profiles.insert(
            SpeedMode::Normal,
            SpeedProfile {
                spin_duration: 2000.0,
                reel_stop_interval: 200.0,
                bounce_strength: 40.0,
            },
        );
        spec
    }

    fn elements() -> Vec<LayoutElement> {
        SlotManifest::default_layout().layout_elements
    }

    #[test]
    fn test_static_without_rhythm_or_time() {
        let elements = elements();
        for state in [
            evaluate(1000.0, None, &elements),
            evaluate(0.0, Some(&rhythm()), &elements),
            evaluate(-50.0, Some(&rhythm()), &elements),
            evaluate(f64::NAN, Some(&rhythm()), &elements),
        ] {
            assert_eq!(state.len(), elements.len());
            assert!(state.values().all(ElementTransform::is_static));
        }
    }

    #[test]
    fn test_missing_profile_is_static() {
        let spec = RhythmSpec {
            active_mode: SpeedMode::Slow,
            ..rhythm()
        };
        let state = evaluate(1000.0, Some(&spec), &elements());
        assert!(state.values().all(ElementTransform::is_static));
    }

    #[test]
    fn test_non_symbols_never_move() {
        let spec = rhythm();
        for t in [100.0, 1000.0, 2100.0, 5000.0] {
            let state = evaluate(t, Some(&spec), &elements());
            assert!(state["bg_main"].is_static());
            assert!(state["btn_spin"].is_static());
            assert!(state["panel_reels"].is_static());
        }
    }

    #[test]
    fn test_phases() {
        // anticipation dips upward first
        let early = symbol_transform(100.0, 2000.0, 40.0);
        assert!(early.offset_y < 0.0);
        assert_eq!(early.blur, 0.0);

        let spinning = symbol_transform(1000.0, 2000.0, 40.0);
        assert_abs_diff_eq!(spinning.offset_y, 1250.0);
        assert_eq!(spinning.blur, MOTION_BLUR);
        assert_eq!(spinning.scale_y, MOTION_STRETCH);

        // bounce peaks mid-window and keeps the motion look
        let bounce = symbol_transform(2200.0, 2000.0, 40.0);
        assert_abs_diff_eq!(bounce.offset_y, 40.0, epsilon = 1e-9);
        assert_eq!(bounce.blur, MOTION_BLUR);

        assert!(symbol_transform(2400.0, 2000.0, 40.0).is_static());
    }

    #[test]
    fn test_bounce_starts_and_ends_at_zero() {
        let at_stop = symbol_transform(2000.0, 2000.0, 40.0);
        assert_abs_diff_eq!(at_stop.offset_y, 0.0, epsilon = 1e-9);
        let near_end = symbol_transform(2399.999, 2000.0, 40.0);
        assert!(near_end.offset_y.abs() < 0.01);
    }

    #[test]
    fn test_reels_stop_in_turn() {
        let spec = rhythm();
        let state = evaluate(2300.0, Some(&spec), &elements());

        // reel 0 stopped at 2000, reel 1 at 2200, reel 2 at 2400
        assert!(state["sym_c1_r1"].offset_y.abs() < 40.0);
        assert_eq!(state["sym_c3_r1"].blur, MOTION_BLUR);
        assert_abs_diff_eq!(state["sym_c3_r2"].offset_y, 2.5 * 1800.0);

        let settled = evaluate(2900.0, Some(&spec), &elements());
        assert!(settled["sym_c2_r3"].is_static());
        assert!(!settled["sym_c5_r3"].is_static());
    }

    #[test]
    fn test_stop_pattern_shapes_stop_times() {
        let spec = RhythmSpec {
            stop_pattern: StopPattern::Slam,
            ..rhythm()
        };
        let state = evaluate(2500.0, Some(&spec), &elements());
        assert!(state.values().all(ElementTransform::is_static));
    }

    #[test]
    fn test_idempotent() {
        let spec = rhythm();
        let grid = GridConfig::default();
        let elements = grid.symbol_elements();
        for t in [1.0, 499.0, 500.0, 1999.0, 2000.0, 2150.0, 3000.0] {
            assert_eq!(
                evaluate(t, Some(&spec), &elements),
                evaluate(t, Some(&spec), &elements)
            );
        }
    }

    #[test]
    fn test_result_does_not_depend_on_evaluation_order() {
        let spec = rhythm();
        let elements = elements();

        // forward in ticks, then backwards over the same times
        let ticked: Vec<FrameState> = (1..=200)
            .map(|i| evaluate(i as f64 * 16.0, Some(&spec), &elements))
            .collect();
        for i in (1..=200).rev() {
            let jumped = evaluate(i as f64 * 16.0, Some(&spec), &elements);
            assert_eq!(jumped, ticked[i - 1]);
        }
    }
}
