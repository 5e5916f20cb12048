use crate::core::solar_gain::{orientation_factor, Orientation};
use crate::core::units::{STC_IRRADIANCE_W_PER_M2, WATTS_PER_KILOWATT};

/// Combined inverter, wiring and temperature losses of a rooftop system.
const PV_SYSTEM_EFFICIENCY: f64 = 0.85;

/// Tilt angle at which flat-plate panels collect best at mid-European
/// latitudes, in degrees from horizontal.
const OPTIMAL_TILT_DEG: f64 = 35.0;

/// Collection derating for a panel tilt away from the optimum.
pub fn tilt_factor(tilt_deg: f64) -> f64 {
    (1.0 - (tilt_deg - OPTIMAL_TILT_DEG).abs() * 0.01).max(0.7)
}

/// Expected PV output from the radiation forecast and installed peak watts
/// per orientation. Used as the production forecast when no external PV
/// forecast is supplied.
#[derive(Clone, Copy, Debug)]
pub struct PvProductionModel {
    east_wp: f64,
    south_wp: f64,
    west_wp: f64,
    tilt_factor: f64,
}

impl PvProductionModel {
    pub fn new(east_wp: f64, south_wp: f64, west_wp: f64, tilt_deg: f64) -> Self {
        Self {
            east_wp,
            south_wp,
            west_wp,
            tilt_factor: tilt_factor(tilt_deg),
        }
    }

    /// Production in kW for a radiation sample (W/m2) at the given hour of
    /// day. Peak watts are quoted at STC irradiance, hence the double
    /// division: once to normalise the irradiance, once for W to kW.
    pub fn production_kw(&self, hour_of_day: f64, radiation_w_per_m2: f64) -> f64 {
        let collected_wp = self.east_wp * orientation_factor(Orientation::East, hour_of_day)
            + self.south_wp * orientation_factor(Orientation::South, hour_of_day)
            + self.west_wp * orientation_factor(Orientation::West, hour_of_day);
        (collected_wp * (radiation_w_per_m2 / STC_IRRADIANCE_W_PER_M2) * self.tilt_factor
            * PV_SYSTEM_EFFICIENCY
            / WATTS_PER_KILOWATT as f64)
            .max(0.0)
    }

    pub fn production_series_kw(
        &self,
        start_hour: f64,
        step_hours: f64,
        radiation: &[f64],
    ) -> Vec<f64> {
        radiation
            .iter()
            .enumerate()
            .map(|(t, irradiance)| {
                self.production_kw(start_hour + t as f64 * step_hours, *irradiance)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::*;

    #[rstest]
    fn should_not_derate_at_the_optimal_tilt() {
        assert_approx_eq!(tilt_factor(35.0), 1.0);
    }

    #[rstest]
    fn should_derate_gently_and_floor_at_flat_or_vertical() {
        assert_approx_eq!(tilt_factor(25.0), 0.9);
        assert_approx_eq!(tilt_factor(45.0), 0.9);
        assert_approx_eq!(tilt_factor(0.0), 0.7);
        assert_approx_eq!(tilt_factor(90.0), 0.7);
    }

    #[rstest]
    fn should_produce_at_stc_scaled_by_orientation_and_losses() {
        // 3 kWp due south at noon under full STC irradiance
        let model = PvProductionModel::new(0.0, 3_000.0, 0.0, 35.0);
        assert_approx_eq!(model.production_kw(12.0, 1_000.0), 3.0 * 0.85);
    }

    #[rstest]
    fn should_produce_nothing_at_night_or_without_panels() {
        let model = PvProductionModel::new(1_500.0, 3_000.0, 1_500.0, 35.0);
        assert_approx_eq!(model.production_kw(2.0, 0.0), 0.0);

        let none = PvProductionModel::new(0.0, 0.0, 0.0, 35.0);
        assert_approx_eq!(none.production_kw(12.0, 800.0), 0.0);
    }

    #[rstest]
    fn should_shift_production_with_panel_orientation() {
        let east = PvProductionModel::new(3_000.0, 0.0, 0.0, 35.0);
        let west = PvProductionModel::new(0.0, 0.0, 3_000.0, 35.0);
        let radiation = vec![500.0; 24];
        let east_series = east.production_series_kw(0.0, 1.0, &radiation);
        let west_series = west.production_series_kw(0.0, 1.0, &radiation);
        assert!(east_series[8] > west_series[8]);
        assert!(west_series[16] > east_series[16]);
    }
}
