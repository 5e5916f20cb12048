use crate::statistics::np_interp;

/// Weather-compensation curve mapping outdoor temperature to the base supply
/// water temperature. Piecewise linear between the two outdoor anchors,
/// clamped to `water_max` at the cold end and `water_min` at the warm end.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatingCurve {
    outdoor_min: f64,
    outdoor_max: f64,
    water_min: f64,
    water_max: f64,
}

impl HeatingCurve {
    pub fn new(outdoor_min: f64, outdoor_max: f64, water_min: f64, water_max: f64) -> Self {
        Self {
            outdoor_min,
            outdoor_max,
            water_min,
            water_max,
        }
    }

    /// Base supply temperature for a given outdoor temperature, in Celsius.
    pub fn supply_temperature(&self, outdoor_temp: f64) -> f64 {
        np_interp(
            outdoor_temp,
            &[self.outdoor_min, self.outdoor_max],
            &[self.water_max, self.water_min],
        )
    }

    /// Base supply temperature profile for an outdoor temperature series.
    pub fn supply_temperature_series(&self, outdoor_temps: &[f64]) -> Vec<f64> {
        outdoor_temps
            .iter()
            .map(|t| self.supply_temperature(*t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::*;

    #[fixture]
    fn curve() -> HeatingCurve {
        HeatingCurve::new(-20.0, 15.0, 25.0, 50.0)
    }

    #[rstest]
    fn should_clamp_below_the_cold_anchor(curve: HeatingCurve) {
        assert_approx_eq!(curve.supply_temperature(-20.0), 50.0);
        assert_approx_eq!(curve.supply_temperature(-35.0), 50.0);
    }

    #[rstest]
    fn should_clamp_above_the_warm_anchor(curve: HeatingCurve) {
        assert_approx_eq!(curve.supply_temperature(15.0), 25.0);
        assert_approx_eq!(curve.supply_temperature(28.0), 25.0);
    }

    #[rstest]
    fn should_interpolate_between_anchors(curve: HeatingCurve) {
        // halfway along the outdoor span sits halfway down the water span
        assert_approx_eq!(curve.supply_temperature(-2.5), 37.5);
        let series = curve.supply_temperature_series(&[-20.0, -2.5, 15.0]);
        assert_eq!(series.len(), 3);
        assert_approx_eq!(series[1], 37.5);
    }

    #[rstest]
    fn should_be_monotone_non_increasing_in_outdoor_temperature(curve: HeatingCurve) {
        let mut previous = f64::INFINITY;
        for outdoor in -25..30 {
            let supply = curve.supply_temperature(outdoor as f64);
            assert!(supply <= previous);
            previous = supply;
        }
    }
}
