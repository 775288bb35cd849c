//! Unit cubic bezier curves for timing functions.
//!
//! The curve runs from (0, 0) to (1, 1); only the two middle control points
//! are configurable. X is the fraction of elapsed time, Y the fraction of
//! progress.

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 64;
const DERIVATIVE_EPSILON: f64 = 1e-6;

/// A unit cubic bezier curve in polynomial form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl UnitBezier {
    pub fn new(p1x: f64, p1y: f64, p2x: f64, p2y: f64) -> Self {
        let cx = 3.0 * p1x;
        let bx = 3.0 * (p2x - p1x) - cx;
        let cy = 3.0 * p1y;
        let by = 3.0 * (p2y - p1y) - cy;

        Self {
            ax: 1.0 - cx - bx,
            bx,
            cx,
            ay: 1.0 - cy - by,
            by,
            cy,
        }
    }

    #[inline]
    pub fn sample_curve_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    #[inline]
    pub fn sample_curve_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    #[inline]
    fn sample_curve_derivative_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Find the curve parameter whose X is within `epsilon` of `x`.
    pub fn solve_curve_x(&self, x: f64, epsilon: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let x2 = self.sample_curve_x(t) - x;
            if x2.abs() < epsilon {
                return t;
            }
            let d2 = self.sample_curve_derivative_x(t);
            if d2.abs() < DERIVATIVE_EPSILON {
                break;
            }
            t -= x2 / d2;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }

        for _ in 0..BISECTION_ITERATIONS {
            if lo >= hi {
                break;
            }
            let x2 = self.sample_curve_x(t);
            if (x2 - x).abs() < epsilon {
                return t;
            }
            if x > x2 {
                lo = t;
            } else {
                hi = t;
            }
            t = (hi - lo) * 0.5 + lo;
        }

        t
    }

    /// Progress at elapsed fraction `x`.
    #[inline]
    pub fn solve(&self, x: f64, epsilon: f64) -> f64 {
        self.sample_curve_y(self.solve_curve_x(x, epsilon))
    }
}

/// Solver precision for an effect lasting `duration_secs`.
///
/// Longer effects need a tighter epsilon so frames do not visibly step.
#[inline]
pub fn solve_epsilon(duration_secs: f64) -> f64 {
    1.0 / (200.0 * duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [(f64, f64, f64, f64); 5] = [
        (0.25, 0.1, 0.25, 1.0),
        (0.42, 0.0, 1.0, 1.0),
        (0.0, 0.0, 0.58, 1.0),
        (0.42, 0.0, 0.58, 1.0),
        (0.68, -0.55, 0.27, 1.55),
    ];

    #[test]
    fn test_solve_curve_x_inverts_within_epsilon() {
        for &(x1, y1, x2, y2) in &CURVES {
            let bezier = UnitBezier::new(x1, y1, x2, y2);
            for duration in [0.25, 1.0, 10.0] {
                let epsilon = solve_epsilon(duration);
                for i in 0..=100 {
                    let x = i as f64 / 100.0;
                    let t = bezier.solve_curve_x(x, epsilon);
                    assert!(
                        (bezier.sample_curve_x(t) - x).abs() < epsilon,
                        "curve ({x1}, {y1}, {x2}, {y2}) at x = {x}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_endpoints() {
        let bezier = UnitBezier::new(0.25, 0.1, 0.25, 1.0);
        assert!(bezier.solve(0.0, 1e-3).abs() < 1e-3);
        assert!((bezier.solve(1.0, 1e-3) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_linear_control_points() {
        let bezier = UnitBezier::new(0.0, 0.0, 1.0, 1.0);
        assert!((bezier.solve(0.3, 1e-4) - 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_ease_is_ahead_in_the_middle() {
        let ease = UnitBezier::new(0.25, 0.1, 0.25, 1.0);
        let mid = ease.solve(0.5, solve_epsilon(1.0));
        assert!(mid > 0.7 && mid < 0.9);
    }

    #[test]
    fn test_monotonic_for_in_range_y() {
        let bezier = UnitBezier::new(0.42, 0.0, 0.58, 1.0);
        let epsilon = solve_epsilon(100.0);
        let mut last = 0.0;
        for i in 0..=200 {
            let y = bezier.solve(i as f64 / 200.0, epsilon);
            assert!(y + 1e-3 >= last);
            last = y;
        }
    }

    #[test]
    fn test_epsilon_tightens_with_duration() {
        assert!(solve_epsilon(10.0) < solve_epsilon(1.0));
        assert!((solve_epsilon(1.0) - 0.005).abs() < 1e-12);
    }
}
