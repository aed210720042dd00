//! Time-weighted summaries of driver histories

/// Expected value of a time series with geometric information decay.
///
/// The observation `t` periods before the last gets weight `(1 - d)^t`, then
/// weights are normalised. `d = 0` gives the arithmetic mean and `d = 1`
/// returns the last value. Returns `None` for an empty series.
pub fn expected_value(series: &[f64], d: f64) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let n = series.len();
    let keep = 1.0 - d;

    let mut weighted = 0.0;
    let mut total = 0.0;
    for (i, value) in series.iter().enumerate() {
        let age = (n - 1 - i) as i32;
        let w = keep.powi(age);
        weighted += w * value;
        total += w;
    }
    if total == 0.0 {
        return None;
    }
    Some(weighted / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_decay_is_mean() {
        let v = expected_value(&[1.0, 2.0, 3.0, 6.0], 0.0).unwrap();
        assert!((v - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_decay_is_last_value() {
        let v = expected_value(&[1.0, 2.0, 9.0], 1.0).unwrap();
        assert!((v - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_decay_favours_recent() {
        // weights 0.25, 0.5, 1.0
        let v = expected_value(&[0.0, 0.0, 7.0], 0.5).unwrap();
        assert!((v - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_series() {
        assert!(expected_value(&[], 0.3).is_none());
    }
}
