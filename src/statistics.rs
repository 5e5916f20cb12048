/// Interpolation helpers shared by the physical models and the resampler.

/// One-dimensional piecewise-linear interpolation with the same contract as
/// numpy's `interp`: anchor positions must be strictly increasing, and points
/// outside the anchor range are held at the nearest edge value.
pub fn np_interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    debug_assert!(!xp.is_empty() && xp.len() == fp.len());
    if x <= xp[0] {
        return fp[0];
    }
    let last = xp.len() - 1;
    if x >= xp[last] {
        return fp[last];
    }
    // first anchor not below x; bounded by the edge checks above
    let upper = xp.partition_point(|anchor| *anchor < x);
    let lower = upper - 1;
    let fraction = (x - xp[lower]) / (xp[upper] - xp[lower]);
    fp[lower] + fraction * (fp[upper] - fp[lower])
}

/// Linear blend between two values, with `fraction` clamped to [0, 1].
pub(crate) fn lerp_clamped(a: f64, b: f64, fraction: f64) -> f64 {
    let fraction = fraction.clamp(0.0, 1.0);
    a + fraction * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::*;

    #[fixture]
    fn anchors() -> (Vec<f64>, Vec<f64>) {
        (vec![-10.0, 0.0, 5.0, 6.0], vec![1.0, 0.8, 0.9, 1.0])
    }

    #[rstest]
    fn should_interpolate_between_anchors(anchors: (Vec<f64>, Vec<f64>)) {
        let (xp, fp) = anchors;
        assert_approx_eq!(np_interp(-5.0, &xp, &fp), 0.9);
        assert_approx_eq!(np_interp(2.5, &xp, &fp), 0.85);
        assert_approx_eq!(np_interp(5.5, &xp, &fp), 0.95);
    }

    #[rstest]
    fn should_hold_edges_constant(anchors: (Vec<f64>, Vec<f64>)) {
        let (xp, fp) = anchors;
        assert_approx_eq!(np_interp(-40.0, &xp, &fp), 1.0);
        assert_approx_eq!(np_interp(40.0, &xp, &fp), 1.0);
    }

    #[rstest]
    fn should_return_exact_values_at_anchors(anchors: (Vec<f64>, Vec<f64>)) {
        let (xp, fp) = anchors;
        for (x, f) in xp.iter().zip(fp.iter()) {
            assert_approx_eq!(np_interp(*x, &xp, &fp), *f);
        }
    }

    #[rstest]
    fn should_clamp_lerp_fraction() {
        assert_approx_eq!(lerp_clamped(1.0, 3.0, 0.5), 2.0);
        assert_approx_eq!(lerp_clamped(1.0, 3.0, -2.0), 1.0);
        assert_approx_eq!(lerp_clamped(1.0, 3.0, 7.0), 3.0);
    }
}
