//! Cost and response curves
//!
//! A [`MarginalCost`] maps a cumulative quantity (groundwater deficit) to the
//! cost of the next unit. Pricing a draw needs the area under that curve, so
//! every curve also knows how to integrate itself. Curves with a closed form
//! override [`MarginalCost::integral`]; anything else falls back to adaptive
//! Simpson quadrature.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::error::{PlanError, Result};
use crate::numeric::integrate::{simpson, DEFAULT_TOLERANCE};

/// Marginal cost as a function of cumulative deficit
pub trait MarginalCost: Send + Sync + fmt::Debug {
    /// Cost of one more unit when the cumulative level is `x`
    fn at(&self, x: f64) -> f64;

    /// Definite integral of [`MarginalCost::at`] over `[from, to]`
    fn integral(&self, from: f64, to: f64) -> f64 {
        simpson(|x| self.at(x), from, to, DEFAULT_TOLERANCE)
    }
}

/// `base * (1 + rate)^x`
///
/// With `rate = 0` this is a flat unit cost of `base`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exponential {
    pub base: f64,
    pub rate: f64,
}

impl Exponential {
    pub fn new(base: f64, rate: f64) -> Result<Self> {
        if !base.is_finite() || base < 0.0 {
            return Err(PlanError::invalid(format!(
                "exponential base must be finite and non-negative, got {}",
                base
            )));
        }
        if !rate.is_finite() || rate <= -1.0 {
            return Err(PlanError::invalid(format!(
                "exponential rate must be finite and greater than -1, got {}",
                rate
            )));
        }
        Ok(Self { base, rate })
    }

    /// Flat curve: every unit costs `base`
    pub fn flat(base: f64) -> Result<Self> {
        Self::new(base, 0.0)
    }
}

impl Default for Exponential {
    fn default() -> Self {
        Self { base: 1.0, rate: 0.0 }
    }
}

impl MarginalCost for Exponential {
    fn at(&self, x: f64) -> f64 {
        self.base * (1.0 + self.rate).powf(x)
    }

    fn integral(&self, from: f64, to: f64) -> f64 {
        let growth = (1.0 + self.rate).ln();
        if growth.abs() < 1e-12 {
            return self.base * (to - from);
        }
        let g = 1.0 + self.rate;
        self.base * (g.powf(to) - g.powf(from)) / growth
    }
}

/// Wraps an arbitrary pure function as a marginal cost curve
pub struct CurveFn<F>(pub F);

impl<F> MarginalCost for CurveFn<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn at(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

impl<F> fmt::Debug for CurveFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CurveFn(..)")
    }
}

/// Logistic curve on the domain and range `[0, 1]`
///
/// `k` controls steepness. `k = 1` is the identity on `[0, 1]`; larger values
/// give an S-shape through `(0.5, 0.5)`. Inputs outside the domain are
/// clamped to the nearest end.
pub fn unit_sigmoid(k: f64) -> impl Fn(f64) -> f64 + Clone + Send + Sync {
    move |x: f64| {
        if x <= 0.0 {
            0.0
        } else if x >= 1.0 {
            1.0
        } else {
            1.0 / (1.0 + (1.0 / x - 1.0).powf(k))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_values() {
        let c = Exponential::new(2.0, 0.5).unwrap();
        assert!((c.at(0.0) - 2.0).abs() < 1e-12);
        assert!((c.at(2.0) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_integral_matches_quadrature() {
        let c = Exponential::new(1.5, 0.2).unwrap();
        let closed = c.integral(1.0, 7.0);
        let numeric = simpson(|x| c.at(x), 1.0, 7.0, DEFAULT_TOLERANCE);
        assert!((closed - numeric).abs() < 1e-8);
    }

    #[test]
    fn test_flat_curve_integral_is_linear() {
        let c = Exponential::flat(3.0).unwrap();
        assert!((c.integral(2.0, 6.0) - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_rejects_bad_parameters() {
        assert!(Exponential::new(1.0, -1.0).is_err());
        assert!(Exponential::new(-1.0, 0.1).is_err());
        assert!(Exponential::new(f64::NAN, 0.1).is_err());
    }

    #[test]
    fn test_curve_fn_uses_quadrature() {
        let c = CurveFn(|x: f64| 2.0 * x);
        assert!((c.integral(0.0, 3.0) - 9.0).abs() < 1e-9);
        assert_eq!(format!("{:?}", c), "CurveFn(..)");
    }

    #[test]
    fn test_unit_sigmoid_bounds_and_shape() {
        let linear = unit_sigmoid(1.0);
        assert_eq!(linear(-0.5), 0.0);
        assert_eq!(linear(0.0), 0.0);
        assert_eq!(linear(1.0), 1.0);
        assert_eq!(linear(3.0), 1.0);
        assert!((linear(0.3) - 0.3).abs() < 1e-12);

        let steep = unit_sigmoid(3.0);
        assert!((steep(0.5) - 0.5).abs() < 1e-12);
        assert!(steep(0.2) < 0.2);
        assert!(steep(0.8) > 0.8);
    }
}
