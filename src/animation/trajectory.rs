//! Closed-form reel trajectory
//!
//! Samples the same motion model the controller integrates, straight from the
//! spin and stop times. Used when scrubbing, where no live run exists.

use crate::animation::motion::{free_spin_distance, ramp_speed, SettleLeg, StopPlan, RAMP_MS};
use crate::animation::reel::{ReelConfig, ReelMotionState, ReelStatus};
use crate::config::speed_preset::SpeedPreset;

/// State of a reel at `t_ms`, spun at `spin_at` and asked to stop at `stop_at`
///
/// A stop that falls inside the stagger delay takes effect when the reel
/// starts, the way the sequencer defers it.
pub fn sample_reel(
    preset: &SpeedPreset,
    config: &ReelConfig,
    spin_at: f64,
    stop_at: Option<f64>,
    t_ms: f64,
) -> ReelMotionState {
    if !t_ms.is_finite() || t_ms < spin_at {
        return ReelMotionState::default();
    }
    if preset.is_instant() {
        return ReelMotionState {
            status: ReelStatus::Completed,
            ..Default::default()
        };
    }

    let symbol_height = config.symbol_height();
    let starts_at = spin_at + preset.reel_delay(config.reel_id());
    if t_ms < starts_at {
        return ReelMotionState::default();
    }
    let cruise = preset.cruise_speed(symbol_height);

    match stop_at.map(|stop_at| stop_at.max(starts_at)) {
        Some(stop_at) if stop_at <= t_ms => {
            let plan = StopPlan::new(
                free_spin_distance(cruise, stop_at - starts_at),
                stop_at,
                preset,
                symbol_height,
            );
            sample_stop(preset, symbol_height, &plan, t_ms)
        }
        _ => {
            let elapsed = t_ms - starts_at;
            ReelMotionState {
                position: free_spin_distance(cruise, elapsed),
                speed: ramp_speed(cruise, elapsed),
                status: if elapsed < RAMP_MS {
                    ReelStatus::Accelerating
                } else {
                    ReelStatus::Spinning
                },
            }
        }
    }
}

fn sample_stop(
    preset: &SpeedPreset,
    symbol_height: f64,
    plan: &StopPlan,
    t_ms: f64,
) -> ReelMotionState {
    let stopping = |position| ReelMotionState {
        position,
        speed: 0.0,
        status: ReelStatus::Stopping,
    };
    let completed = |position| ReelMotionState {
        position,
        speed: 0.0,
        status: ReelStatus::Completed,
    };

    if t_ms < plan.align_end() {
        return stopping(plan.position_at(t_ms));
    }
    if !plan.settles {
        return completed(plan.align_target);
    }

    let leg = SettleLeg::new(plan.align_target, plan.align_end(), preset, symbol_height);
    if t_ms < leg.end() {
        stopping(leg.position_at(t_ms))
    } else {
        completed(leg.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::reel::ReelController;
    use crate::animation::sequencer::ReelSequencer;
    use crate::config::manifest::StopPattern;
    use approx::assert_abs_diff_eq;

    const H: f64 = 125.0;

    #[test]
    fn test_idle_before_start() {
        let config = ReelConfig::new(2, H).unwrap();
        let preset = SpeedPreset::normal();
        assert_eq!(
            sample_reel(&preset, &config, 1000.0, None, 500.0),
            ReelMotionState::default()
        );
        // inside the 400ms stagger delay
        assert_eq!(
            sample_reel(&preset, &config, 1000.0, None, 1399.0).status,
            ReelStatus::Idle
        );
        assert_eq!(
            sample_reel(&preset, &config, 1000.0, None, 1400.0).status,
            ReelStatus::Accelerating
        );
    }

    #[test]
    fn test_instant_preset_is_completed() {
        let config = ReelConfig::new(0, H).unwrap();
        let state = sample_reel(&SpeedPreset::instant(), &config, 0.0, None, 10.0);
        assert_eq!(state.status, ReelStatus::Completed);
        assert_eq!(state.position, 0.0);
    }

    #[test]
    fn test_stop_inside_delay_lands_after_start() {
        // reel 3 starts at 600ms; a stop at 100ms waits for it
        let config = ReelConfig::new(3, H).unwrap();
        let preset = SpeedPreset::normal();

        let starting = sample_reel(&preset, &config, 0.0, Some(100.0), 600.0);
        assert_eq!(starting.status, ReelStatus::Stopping);
        assert_eq!(starting.position, 0.0);

        let landed = sample_reel(&preset, &config, 0.0, Some(100.0), 5000.0);
        assert_eq!(landed.status, ReelStatus::Completed);
        assert_abs_diff_eq!(landed.position, 375.0, epsilon = 1e-9);
    }

    #[test]
    fn test_matches_sequencer_with_stops_inside_delay() {
        let mut preset = SpeedPreset::fast();
        preset.interval_between_reels = 400.0;
        let shared = preset.clone().into_shared().unwrap();
        let mut sequencer = ReelSequencer::new(5, H, shared).unwrap();
        sequencer.spin_all(0.0);
        sequencer.schedule_auto_stops(StopPattern::Slam, 0.0);

        let mut t = 0.0;
        while t < 3000.0 {
            t += 16.0;
            sequencer.update(t);
            for reel in sequencer.reels() {
                let sampled = sample_reel(&preset, reel.config(), 0.0, Some(1000.0), t);
                assert_eq!(sampled.status, reel.status(), "reel {} at {t}", reel.reel_id());
                assert_abs_diff_eq!(sampled.position, reel.position(), epsilon = 1e-6);
            }
        }
        assert!(sequencer.all_completed());
    }

    #[test]
    fn test_matches_live_controller() {
        for preset in [SpeedPreset::fast(), SpeedPreset::normal(), SpeedPreset::slow()] {
            let shared = preset.clone().into_shared().unwrap();
            for reel_id in 0..5 {
                let config = ReelConfig::new(reel_id, H).unwrap();
                let mut live = ReelController::new(config);
                let stop_at = 2500.0 + reel_id as f64 * 150.0;
                live.spin(&shared, 0.0);

                let mut t = 0.0;
                while t < 6000.0 {
                    t += 16.0;
                    if t >= stop_at && live.stop_requested_at().is_none() {
                        live.advance_to(stop_at);
                        live.stop(stop_at);
                    }
                    live.advance_to(t);

                    let sampled = sample_reel(&preset, &config, 0.0, Some(stop_at), t);
                    assert_eq!(sampled.status, live.status(), "reel {reel_id} at {t}");
                    assert_abs_diff_eq!(sampled.position, live.position(), epsilon = 1e-6);
                }
                assert_eq!(live.status(), ReelStatus::Completed);
            }
        }
    }
}
