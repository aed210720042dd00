//! Pure numeric primitives shared by the water and crop models
//!
//! Nothing here holds state: cost curves, production response curves,
//! quadrature and a time-weighted expected value.

pub mod curves;
pub mod integrate;
pub mod stats;

pub use curves::{unit_sigmoid, CurveFn, Exponential, MarginalCost};
pub use integrate::simpson;
pub use stats::expected_value;
