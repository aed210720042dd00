//! Adaptive Simpson quadrature for marginal cost curves without a closed form

/// Absolute tolerance used by [`simpson`] callers that have no better guess.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Recursion limit for [`simpson`]. Each level halves the interval.
pub const MAX_DEPTH: u32 = 40;

/// Integrate `f` over `[a, b]` with adaptive Simpson's rule.
///
/// Reversed bounds give the negated integral, equal bounds give zero.
pub fn simpson<F>(f: F, a: f64, b: f64, tolerance: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return 0.0;
    }
    if b < a {
        return -simpson(f, b, a, tolerance);
    }

    let fa = f(a);
    let fb = f(b);
    let m = 0.5 * (a + b);
    let fm = f(m);
    let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
    refine(&f, a, b, fa, fm, fb, whole, tolerance, MAX_DEPTH)
}

#[allow(clippy::too_many_arguments)]
fn refine<F>(f: &F, a: f64, b: f64, fa: f64, fm: f64, fb: f64, whole: f64, tol: f64, depth: u32) -> f64
where
    F: Fn(f64) -> f64,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm);
    let frm = f(rm);
    let left = (m - a) / 6.0 * (fa + 4.0 * flm + fm);
    let right = (b - m) / 6.0 * (fm + 4.0 * frm + fb);
    let delta = left + right - whole;

    if depth == 0 || delta.abs() <= 15.0 * tol {
        // Richardson extrapolation
        return left + right + delta / 15.0;
    }

    refine(f, a, m, fa, flm, fm, left, tol / 2.0, depth - 1)
        + refine(f, m, b, fm, frm, fb, right, tol / 2.0, depth - 1)
}
