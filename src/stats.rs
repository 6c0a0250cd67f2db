//! Plain numeric helpers over slices. Nulls are filtered out by callers
//! except where noted.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (ddof = 0).
pub fn population_variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Rescale `value` into [0, 1] against `min`/`max`.
/// A zero range uses a divisor of 1, so constant columns map to 0.
pub fn scale(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    let divisor = if range == 0.0 { 1.0 } else { range };
    (value - min) / divisor
}

/// Pearson correlation over the rows where both sides are present.
/// NaN when fewer than two complete pairs or either side has no variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 20.0]), Some(15.0));
        assert_eq!(population_variance(&[1.0, 2.0, 3.0]), Some(2.0 / 3.0));
    }

    #[test]
    fn scale_handles_constant_range() {
        assert_eq!(scale(5.0, 5.0, 5.0), 0.0);
        assert_eq!(scale(15.0, 10.0, 20.0), 0.5);
    }

    #[test]
    fn pearson_perfect_and_inverse() {
        let x = [Some(1.0), Some(2.0), Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(6.0)];
        let z = [Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_skips_incomplete_pairs() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(1.0), Some(100.0), Some(2.0), Some(3.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
        assert!(pearson(&[Some(1.0), Some(1.0)], &[Some(1.0), Some(2.0)]).is_nan());
    }
}
