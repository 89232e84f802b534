//! Piecewise-linear signal curves and two-sided envelopes.

use simloop_core::{DomainError, SetupError, EPS_DISTANCE};

/// Piecewise-linear curve over strictly increasing x-samples.
///
/// Evaluation is defined on `[x_min, x_max]` widened by
/// [`EPS_DISTANCE`]. A curve with fewer than two samples is "not set":
/// it can be built and stored, but every evaluation fails with
/// [`DomainError::CurveNotSet`].
///
/// # Examples
///
/// ```
/// use simloop_engine::SignalCurve;
///
/// let curve = SignalCurve::from_points(&[(0.0, 1.0), (10.0, 2.0), (20.0, 2.0), (30.0, -1.0)])
///     .unwrap();
/// assert_eq!(curve.interpolate(10.0).unwrap(), 2.0);
/// assert_eq!(curve.interpolate(5.0).unwrap(), 1.5);
/// assert!((curve.interpolate(21.0).unwrap() - 1.7).abs() < 1e-12);
/// assert!(curve.interpolate(31.0).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SignalCurve {
    /// Build a curve from parallel sample vectors.
    ///
    /// Fails if the lengths differ, a value is not finite, or `x` is not
    /// strictly increasing.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, SetupError> {
        if x.len() != y.len() {
            return Err(SetupError::MalformedCurve {
                reason: format!("{} x-samples but {} y-samples", x.len(), y.len()),
            });
        }
        if let Some(i) = x.iter().chain(&y).position(|v| !v.is_finite()) {
            return Err(SetupError::MalformedCurve {
                reason: format!("sample {} is not finite", i % x.len().max(1)),
            });
        }
        if let Some(i) = x.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SetupError::MalformedCurve {
                reason: format!("x is not strictly increasing at index {}", i + 1),
            });
        }
        Ok(Self { x, y })
    }

    /// Build a curve from `(x, y)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> Result<Self, SetupError> {
        let (x, y) = points.iter().copied().unzip();
        Self::new(x, y)
    }

    /// Replace the samples.
    pub fn define(&mut self, x: Vec<f64>, y: Vec<f64>) -> Result<(), SetupError> {
        *self = Self::new(x, y)?;
        Ok(())
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the curve has no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Whether the curve has at least two samples.
    pub fn is_set(&self) -> bool {
        self.x.len() >= 2
    }

    /// Sample abscissas.
    pub fn xs(&self) -> &[f64] {
        &self.x
    }

    /// Sample values.
    pub fn ys(&self) -> &[f64] {
        &self.y
    }

    /// Whether `x` lies in the curve's domain, within [`EPS_DISTANCE`].
    pub fn in_bounds(&self, x: f64) -> bool {
        match (self.x.first(), self.x.last()) {
            (Some(&lo), Some(&hi)) if self.is_set() => {
                x >= lo - EPS_DISTANCE && x <= hi + EPS_DISTANCE
            }
            _ => false,
        }
    }

    /// Index `i` of the segment `[x[i-1], x[i]]` used for `x`.
    ///
    /// The first index whose sample strictly exceeds `x`, clamped to the
    /// first segment at or below `x_min` and the last at or above `x_max`.
    fn segment(&self, x: f64) -> usize {
        let n = self.x.len();
        self.x.partition_point(|&xi| xi <= x).clamp(1, n - 1)
    }

    fn domain_error(&self, x: f64) -> DomainError {
        DomainError::OutOfRange {
            x,
            min: self.x[0],
            max: self.x[self.x.len() - 1],
        }
    }

    fn require_set(&self) -> Result<(), DomainError> {
        if self.is_set() {
            Ok(())
        } else {
            Err(DomainError::CurveNotSet)
        }
    }

    /// Linear interpolation at `x`.
    ///
    /// Within [`EPS_DISTANCE`] outside the domain, the boundary segment's
    /// line is extended; further out is a domain error.
    pub fn interpolate(&self, x: f64) -> Result<f64, DomainError> {
        self.require_set()?;
        if !self.in_bounds(x) {
            return Err(self.domain_error(x));
        }
        let i = self.segment(x);
        let (v0, v1) = (self.y[i - 1], self.y[i]);
        let ds0 = self.x[i - 1] - x;
        let ds1 = self.x[i] - x;
        Ok(v0 - ds0 * (v1 - v0) / (ds1 - ds0))
    }

    /// Value of the last sample at or before `x`.
    ///
    /// Fails below the domain; above it, returns the last sample.
    pub fn previous(&self, x: f64) -> Result<f64, DomainError> {
        self.require_set()?;
        if x < self.x[0] - EPS_DISTANCE {
            return Err(self.domain_error(x));
        }
        let i = self.segment(x);
        if self.x[i] - x <= 0.0 {
            Ok(self.y[i])
        } else {
            Ok(self.y[i - 1])
        }
    }

    /// Value of the first sample at or after `x`.
    ///
    /// Fails above the domain; below it, returns the first sample.
    pub fn next(&self, x: f64) -> Result<f64, DomainError> {
        self.require_set()?;
        if x > self.x[self.x.len() - 1] + EPS_DISTANCE {
            return Err(self.domain_error(x));
        }
        let i = self.segment(x);
        if self.x[i - 1] - x >= 0.0 {
            Ok(self.y[i - 1])
        } else {
            Ok(self.y[i])
        }
    }

    /// Whether `(x, y)` lies strictly closer than `eps` to the curve.
    pub fn hit(&self, x: f64, y: f64, eps: f64) -> bool {
        self.interpolate(x).is_ok_and(|v| (v - y).abs() < eps)
    }
}

/// Band between a lower and an upper curve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignalTube {
    lower: SignalCurve,
    upper: SignalCurve,
}

impl SignalTube {
    /// A tube bounded by `lower` and `upper`.
    pub fn new(lower: SignalCurve, upper: SignalCurve) -> Self {
        Self { lower, upper }
    }

    /// Lower boundary.
    pub fn lower(&self) -> &SignalCurve {
        &self.lower
    }

    /// Upper boundary.
    pub fn upper(&self) -> &SignalCurve {
        &self.upper
    }

    /// Replace the lower boundary.
    pub fn set_lower(&mut self, lower: SignalCurve) {
        self.lower = lower;
    }

    /// Replace the upper boundary.
    pub fn set_upper(&mut self, upper: SignalCurve) {
        self.upper = upper;
    }

    /// Whether both boundaries have at least two samples.
    pub fn is_set(&self) -> bool {
        self.lower.is_set() && self.upper.is_set()
    }

    /// `(lower(x), upper(x))`.
    pub fn bounds(&self, x: f64) -> Result<(f64, f64), DomainError> {
        Ok((self.lower.interpolate(x)?, self.upper.interpolate(x)?))
    }

    /// Midpoint of the band at `x`.
    pub fn center(&self, x: f64) -> Result<f64, DomainError> {
        let (lo, hi) = self.bounds(x)?;
        Ok(0.5 * (lo + hi))
    }

    /// Whether `y` lies inside the band at `x`, boundaries included.
    ///
    /// Each side only constrains `y` where `x` is inside that curve's
    /// domain.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let above_lower = match self.lower.interpolate(x) {
            Ok(lo) => y >= lo,
            Err(_) => true,
        };
        let below_upper = match self.upper.interpolate(x) {
            Ok(hi) => y <= hi,
            Err(_) => true,
        };
        above_lower && below_upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> SignalCurve {
        SignalCurve::from_points(&[(0.0, 1.0), (10.0, 2.0), (20.0, 2.0), (30.0, -1.0)]).unwrap()
    }

    #[test]
    fn exact_at_samples_and_linear_between() {
        let c = sample();
        assert_eq!(c.interpolate(0.0).unwrap(), 1.0);
        assert_eq!(c.interpolate(10.0).unwrap(), 2.0);
        assert_eq!(c.interpolate(20.0).unwrap(), 2.0);
        assert_eq!(c.interpolate(30.0).unwrap(), -1.0);
        assert_eq!(c.interpolate(5.0).unwrap(), 1.5);
        assert!((c.interpolate(21.0).unwrap() - 1.7).abs() < 1e-12);
    }

    #[test]
    fn out_of_domain_fails_beyond_tolerance() {
        let c = sample();
        assert_eq!(
            c.interpolate(-0.1),
            Err(DomainError::OutOfRange {
                x: -0.1,
                min: 0.0,
                max: 30.0
            })
        );
        assert!(c.interpolate(30.0 + 1e-6).is_err());
    }

    #[test]
    fn within_tolerance_extends_boundary_segment() {
        let c = sample();
        let below = c.interpolate(-0.5e-9).unwrap();
        assert!((below - (1.0 - 0.5e-10)).abs() < 1e-15);
        let above = c.interpolate(30.0 + 0.5e-9).unwrap();
        assert!(above < -1.0);
    }

    #[test]
    fn unset_curve_is_a_domain_error() {
        let c = SignalCurve::from_points(&[(0.0, 1.0)]).unwrap();
        assert!(!c.is_set());
        assert_eq!(c.interpolate(0.0), Err(DomainError::CurveNotSet));
        assert_eq!(SignalCurve::default().previous(0.0), Err(DomainError::CurveNotSet));
        assert!(!c.in_bounds(0.0));
    }

    #[test]
    fn malformed_definitions_are_rejected() {
        assert!(SignalCurve::new(vec![0.0, 1.0], vec![0.0]).is_err());
        assert!(SignalCurve::new(vec![0.0, 0.0], vec![0.0, 1.0]).is_err());
        assert!(SignalCurve::new(vec![1.0, 0.0], vec![0.0, 1.0]).is_err());
        assert!(SignalCurve::new(vec![0.0, f64::NAN], vec![0.0, 1.0]).is_err());
    }

    #[test]
    fn previous_and_next_pick_neighbouring_samples() {
        let c = sample();
        assert_eq!(c.previous(15.0).unwrap(), 2.0);
        assert_eq!(c.next(15.0).unwrap(), 2.0);
        assert_eq!(c.previous(25.0).unwrap(), 2.0);
        assert_eq!(c.next(25.0).unwrap(), -1.0);
        assert_eq!(c.previous(5.0).unwrap(), 1.0);
        assert_eq!(c.next(5.0).unwrap(), 2.0);
    }

    #[test]
    fn previous_and_next_at_samples_return_that_sample() {
        let c = sample();
        for (x, y) in [(0.0, 1.0), (10.0, 2.0), (20.0, 2.0), (30.0, -1.0)] {
            assert_eq!(c.previous(x).unwrap(), y, "previous({x})");
            assert_eq!(c.next(x).unwrap(), y, "next({x})");
        }
    }

    #[test]
    fn previous_and_next_outside_domain() {
        let c = sample();
        assert!(c.previous(-1.0).is_err());
        assert_eq!(c.previous(100.0).unwrap(), -1.0);
        assert!(c.next(31.0).is_err());
        assert_eq!(c.next(-100.0).unwrap(), 1.0);
    }

    #[test]
    fn hit_tests_distance_to_curve() {
        let c = sample();
        assert!(c.hit(5.0, 1.5, 1e-9));
        assert!(c.hit(5.0, 1.55, 0.1));
        assert!(!c.hit(5.0, 1.7, 0.1));
        assert!(!c.hit(50.0, -1.0, 1.0));
    }

    #[test]
    fn hit_excludes_points_exactly_eps_away() {
        let c = sample();
        assert!(!c.hit(5.0, 2.0, 0.5));
        assert!(!c.hit(5.0, 1.25, 0.25));
        assert!(c.hit(5.0, 1.25, 0.2500001));
        assert!(!c.hit(5.0, 1.5, 0.0));
    }

    #[test]
    fn tube_bounds_center_and_contains() {
        let tube = SignalTube::new(
            SignalCurve::from_points(&[(0.0, -1.0), (10.0, 1.0)]).unwrap(),
            SignalCurve::from_points(&[(0.0, 1.0), (10.0, 3.0)]).unwrap(),
        );
        assert!(tube.is_set());
        assert_eq!(tube.bounds(5.0).unwrap(), (0.0, 2.0));
        assert_eq!(tube.center(5.0).unwrap(), 1.0);
        assert!(tube.contains(5.0, 0.0));
        assert!(tube.contains(5.0, 2.0));
        assert!(!tube.contains(5.0, -0.01));
        assert!(!tube.contains(5.0, 2.01));
    }

    #[test]
    fn tube_side_outside_its_domain_does_not_constrain() {
        let tube = SignalTube::new(
            SignalCurve::from_points(&[(0.0, 0.0), (5.0, 0.0)]).unwrap(),
            SignalCurve::from_points(&[(0.0, 1.0), (10.0, 1.0)]).unwrap(),
        );
        assert!(tube.contains(8.0, -50.0));
        assert!(!tube.contains(8.0, 1.5));
        assert!(!tube.contains(3.0, -0.5));
    }

    proptest! {
        #[test]
        fn interpolation_stays_between_bracketing_samples(
            ys in proptest::collection::vec(-100.0f64..100.0, 2..12),
            t in 0.0f64..1.0,
        ) {
            let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64 * 1.5).collect();
            let c = SignalCurve::new(xs.clone(), ys.clone()).unwrap();
            for (x, y) in xs.iter().zip(&ys) {
                prop_assert!((c.interpolate(*x).unwrap() - y).abs() < 1e-9);
            }
            let x = t * xs[xs.len() - 1];
            let i = c.segment(x);
            let v = c.interpolate(x).unwrap();
            let (lo, hi) = if ys[i - 1] < ys[i] { (ys[i - 1], ys[i]) } else { (ys[i], ys[i - 1]) };
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
