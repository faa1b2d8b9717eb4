//! Fuzzy sets and their membership functions

use std::fmt;
use std::sync::Arc;

use crate::core::error::{Result, SwarmError};

/// Integration steps for the centroid; the curve is sampled at `SAMPLES + 1` points
pub const CENTROID_SAMPLES: usize = 100;

/// User-supplied membership curve
pub type MembershipFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Shape of a membership curve
#[derive(Clone)]
pub enum MembershipFunction {
    /// 0 outside `[a, c]`, 1 at `b`, linear on each flank
    Triangle { a: f64, b: f64, c: f64 },
    /// 0 outside `[a, d]`, 1 on `[b, c]`, linear on each flank
    Trapezoid { a: f64, b: f64, c: f64, d: f64 },
    Custom(MembershipFn),
}

impl MembershipFunction {
    /// Raw, unclamped value of the curve at `x`
    fn raw(&self, x: f64) -> f64 {
        match *self {
            MembershipFunction::Triangle { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x == b {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            }
            MembershipFunction::Trapezoid { a, b, c, d } => {
                if x < a || x > d {
                    0.0
                } else if x >= b && x <= c {
                    1.0
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            }
            MembershipFunction::Custom(ref f) => f(x),
        }
    }

    /// Support of the built-in shapes
    fn support(&self) -> Option<(f64, f64)> {
        match *self {
            MembershipFunction::Triangle { a, c, .. } => Some((a, c)),
            MembershipFunction::Trapezoid { a, d, .. } => Some((a, d)),
            MembershipFunction::Custom(_) => None,
        }
    }
}

impl fmt::Debug for MembershipFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipFunction::Triangle { a, b, c } => f
                .debug_struct("Triangle")
                .field("a", a)
                .field("b", b)
                .field("c", c)
                .finish(),
            MembershipFunction::Trapezoid { a, b, c, d } => f
                .debug_struct("Trapezoid")
                .field("a", a)
                .field("b", b)
                .field("c", c)
                .field("d", d)
                .finish(),
            MembershipFunction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A named membership curve over a bounded domain.
///
/// The centroid is computed once at construction and reused by every decision.
#[derive(Debug, Clone)]
pub struct FuzzySet {
    name: String,
    domain: (f64, f64),
    function: MembershipFunction,
    centroid: f64,
}

impl FuzzySet {
    /// Triangle with domain equal to its support `[a, c]`
    pub fn triangle(name: impl Into<String>, a: f64, b: f64, c: f64) -> Result<Self> {
        let name = name.into();
        if ![a, b, c].iter().all(|v| v.is_finite()) || !(a <= b && b <= c) {
            return Err(SwarmError::InvalidFuzzySet {
                set: name,
                reason: format!("triangle points must be finite with a <= b <= c, got ({a}, {b}, {c})"),
            });
        }
        Self::build(name, (a, c), MembershipFunction::Triangle { a, b, c })
    }

    /// Trapezoid with domain equal to its support `[a, d]`
    pub fn trapezoid(name: impl Into<String>, a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let name = name.into();
        if ![a, b, c, d].iter().all(|v| v.is_finite()) || !(a <= b && b <= c && c <= d) {
            return Err(SwarmError::InvalidFuzzySet {
                set: name,
                reason: format!(
                    "trapezoid points must be finite with a <= b <= c <= d, got ({a}, {b}, {c}, {d})"
                ),
            });
        }
        Self::build(name, (a, d), MembershipFunction::Trapezoid { a, b, c, d })
    }

    /// Arbitrary curve. Its output is clamped to [0, 1]; a non-finite output
    /// is a computation error.
    pub fn custom<F>(name: impl Into<String>, domain: (f64, f64), f: F) -> Result<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        let name = name.into();
        check_domain(&name, domain)?;
        Self::build(name, domain, MembershipFunction::Custom(Arc::new(f)))
    }

    /// Replace the domain. Built-in shapes may only narrow or widen it; values
    /// outside the new domain read as 0.
    pub fn with_domain(self, lo: f64, hi: f64) -> Result<Self> {
        check_domain(&self.name, (lo, hi))?;
        Self::build(self.name, (lo, hi), self.function)
    }

    fn build(name: String, domain: (f64, f64), function: MembershipFunction) -> Result<Self> {
        let mut set = Self {
            name,
            domain,
            function,
            centroid: 0.0,
        };
        set.centroid = set.compute_centroid()?;
        Ok(set)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn function(&self) -> &MembershipFunction {
        &self.function
    }

    pub fn centroid(&self) -> f64 {
        self.centroid
    }

    /// Degree of membership in [0, 1], exactly 0 outside the domain
    pub fn evaluate(&self, x: f64) -> Result<f64> {
        let (lo, hi) = self.domain;
        if !(x >= lo && x <= hi) {
            return Ok(0.0);
        }
        if let Some((a, b)) = self.function.support() {
            if x < a || x > b {
                return Ok(0.0);
            }
        }

        let raw = self.function.raw(x);
        if !raw.is_finite() {
            return Err(SwarmError::Computation(format!(
                "membership of '{}' at {} is {}",
                self.name, x, raw
            )));
        }
        Ok(raw.clamp(0.0, 1.0))
    }

    /// Discrete centroid of the curve over the domain: `Σ x·μ(x) / Σ μ(x)`,
    /// 0 when the curve is empty.
    fn compute_centroid(&self) -> Result<f64> {
        let (lo, hi) = self.domain;
        let dx = (hi - lo) / CENTROID_SAMPLES as f64;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..=CENTROID_SAMPLES {
            let x = lo + i as f64 * dx;
            let mu = self.evaluate(x).map_err(|err| SwarmError::InvalidFuzzySet {
                set: self.name.clone(),
                reason: err.to_string(),
            })?;
            numerator += x * mu;
            denominator += mu;
        }

        Ok(if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        })
    }
}

fn check_domain(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(SwarmError::InvalidFuzzySet {
            set: name.to_string(),
            reason: format!("domain [{lo}, {hi}] must be finite and ordered"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_shape() {
        let set = FuzzySet::triangle("medium", 3.0, 8.0, 13.0).unwrap();
        assert_eq!(set.evaluate(2.0).unwrap(), 0.0);
        assert_eq!(set.evaluate(3.0).unwrap(), 0.0);
        assert_eq!(set.evaluate(8.0).unwrap(), 1.0);
        assert!((set.evaluate(5.5).unwrap() - 0.5).abs() < 1e-12);
        assert!((set.evaluate(10.5).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(set.evaluate(14.0).unwrap(), 0.0);
    }

    #[test]
    fn test_triangle_shoulder_peaks_at_edge() {
        let available = FuzzySet::triangle("available", 0.0, 1.0, 1.0).unwrap();
        assert_eq!(available.evaluate(1.0).unwrap(), 1.0);

        let full = FuzzySet::triangle("full", 0.0, 0.0, 1.0).unwrap();
        assert_eq!(full.evaluate(0.0).unwrap(), 1.0);
        assert!((full.evaluate(0.25).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_trapezoid_plateau_is_inclusive() {
        let far = FuzzySet::trapezoid("far", 10.0, 15.0, 20.0, 20.0).unwrap();
        assert_eq!(far.evaluate(15.0).unwrap(), 1.0);
        assert_eq!(far.evaluate(20.0).unwrap(), 1.0);
        assert!((far.evaluate(12.5).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(far.evaluate(21.0).unwrap(), 0.0);
    }

    #[test]
    fn test_narrowed_domain_cuts_curve() {
        let close = FuzzySet::trapezoid("close", 0.0, 0.0, 3.0, 5.0)
            .unwrap()
            .with_domain(0.0, 4.0)
            .unwrap();
        assert!(close.evaluate(4.5).unwrap() == 0.0);
        assert!(close.evaluate(3.5).unwrap() > 0.0);
    }

    #[test]
    fn test_invalid_points_rejected() {
        assert!(matches!(
            FuzzySet::triangle("bad", 5.0, 1.0, 10.0),
            Err(SwarmError::InvalidFuzzySet { .. })
        ));
        assert!(FuzzySet::trapezoid("nan", 0.0, f64::NAN, 1.0, 2.0).is_err());
        assert!(FuzzySet::custom("inverted", (1.0, 0.0), |_| 1.0).is_err());
    }

    #[test]
    fn test_symmetric_centroid() {
        let harvest = FuzzySet::triangle("harvest", 0.5, 0.75, 1.0).unwrap();
        assert!((harvest.centroid() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_custom_is_clamped() {
        let loud = FuzzySet::custom("loud", (0.0, 10.0), |x| x).unwrap();
        assert_eq!(loud.evaluate(5.0).unwrap(), 1.0);
        assert_eq!(loud.evaluate(-1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_custom_non_finite_is_error() {
        let set = FuzzySet::custom("spiky", (0.0, 10.0), |x| if x > 7.5 { f64::NAN } else { 0.5 });
        // The centroid samples hit the NaN region
        assert!(set.is_err());

        let late = FuzzySet::custom("late", (0.0, 10.0), |x| if x > 10.0 { f64::NAN } else { 0.5 })
            .unwrap()
            .with_domain(0.0, 20.0);
        assert!(late.is_err());
    }

    #[test]
    fn test_failure_between_samples_is_not_zero() {
        let holed = FuzzySet::custom("holed", (0.0, 10.0), |x| {
            if x > 5.02 && x < 5.08 {
                f64::NAN
            } else {
                x / 10.0
            }
        })
        .unwrap();
        assert!((holed.evaluate(5.0).unwrap() - 0.5).abs() < 1e-12);
        assert!(matches!(holed.evaluate(5.05), Err(SwarmError::Computation(_))));
    }
}
