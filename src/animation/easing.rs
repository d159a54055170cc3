//! Motion curves
//!
//! Stateless easing functions mapping normalized progress `t` in [0, 1] to an
//! eased value. Inputs outside the range are clamped. The back and elastic
//! curves leave [0, 1].

use std::f64::consts::PI;

/// Overshoot constant of the back curve
const BACK_C1: f64 = 1.70158;

/// Power ease-out: `1 - (1 - t)^power`
pub fn ease_out_power(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(power)
}

/// Decelerating curve used to bring a reel onto its alignment line
pub fn ease_out_cubic(t: f64) -> f64 {
    ease_out_power(t, 3)
}

/// Anticipation curve: dips below zero before accelerating to 1
pub fn ease_in_back(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let c3 = BACK_C1 + 1.0;
    c3 * t * t * t - BACK_C1 * t * t
}

/// Decaying oscillation around 1
pub fn ease_out_elastic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t == 0.0 {
        return 0.0;
    }
    if t == 1.0 {
        return 1.0;
    }
    let c4 = (2.0 * PI) / 3.0;
    2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
}

/// One-hump bump, zero at both ends and 1 at the midpoint
pub fn bump(t: f64) -> f64 {
    (t.clamp(0.0, 1.0) * PI).sin()
}

/// Calculate cubic bezier curve value
///
/// Control points: P0=(0,0), P1=(p1x,p1y), P2=(p2x,p2y), P3=(1,1)
///
/// Uses Newton-Raphson iteration to solve for s given x = t,
/// then evaluates y(s).
pub fn cubic_bezier(t: f64, p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut s = t;
    for _ in 0..8 {
        let s2 = s * s;
        let s3 = s2 * s;
        let inv = 1.0 - s;
        let inv2 = inv * inv;

        let x = 3.0 * inv2 * s * p1x + 3.0 * inv * s2 * p2x + s3;
        let dx = 3.0 * inv2 * p1x + 6.0 * inv * s * (p2x - p1x) + 3.0 * s2 * (1.0 - p2x);

        if dx.abs() < 1e-10 {
            break;
        }
        s = (s - (x - t) / dx).clamp(0.0, 1.0);
    }

    let s2 = s * s;
    let s3 = s2 * s;
    let inv = 1.0 - s;
    let inv2 = inv * inv;

    let y = 3.0 * inv2 * s * p1y + 3.0 * inv * s2 * p2y + s3;
    y.clamp(0.0, 1.0)
}

/// CSS-style ease-out: control points (0, 0) -> (0.58, 1)
pub fn ease_out(t: f64) -> f64 {
    cubic_bezier(t, 0.0, 0.0, 0.58, 1.0)
}

/// Settle curve: smooth ease-out blended toward elastic by `bounce_strength`
///
/// A strength of 0 gives a plain ease-out, 1 or more a full elastic ease.
pub fn settle_curve(t: f64, bounce_strength: f64) -> f64 {
    let mix = bounce_strength.clamp(0.0, 1.0);
    let smooth = ease_out(t);
    smooth + (ease_out_elastic(t) - smooth) * mix
}
