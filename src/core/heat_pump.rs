use crate::core::units::COP_REFERENCE_FLOW_TEMP;
use crate::statistics::{lerp_clamped, np_interp};
use serde::{Deserialize, Serialize};

/// Lowest COP the model will report. A heat pump driven far outside its
/// envelope still converts electricity to heat at least resistively.
pub const COP_FLOOR: f64 = 0.5;

// Defrost derating anchors for an air-source evaporator: no frost outside
// [-10, 6] Celsius, worst around 0-3 Celsius in humid air. Columns give the
// multiplier at 70% and 100% relative humidity; the model interpolates
// bilinearly and clamps humidity to the column range.
const DEFROST_TEMP_ANCHORS: [f64; 6] = [-10.0, -7.0, 0.0, 3.0, 5.0, 6.0];
const DEFROST_AT_70_RH: [f64; 6] = [1.00, 0.92, 0.80, 0.75, 0.90, 1.00];
const DEFROST_AT_100_RH: [f64; 6] = [1.00, 0.88, 0.70, 0.60, 0.80, 1.00];

/// COP multiplier accounting for defrost cycles, in [0.6, 1.0].
pub fn defrost_factor(outdoor_temp: f64, relative_humidity: f64) -> f64 {
    if outdoor_temp <= DEFROST_TEMP_ANCHORS[0] || outdoor_temp >= *DEFROST_TEMP_ANCHORS.last().unwrap()
    {
        return 1.0;
    }
    let at_70 = np_interp(outdoor_temp, &DEFROST_TEMP_ANCHORS, &DEFROST_AT_70_RH);
    let at_100 = np_interp(outdoor_temp, &DEFROST_TEMP_ANCHORS, &DEFROST_AT_100_RH);
    lerp_clamped(at_70, at_100, (relative_humidity - 70.0) / 30.0)
}

/// Coefficient-of-performance law of the heat pump:
///
/// `cop = (cop_base + outdoor_coeff * t_outdoor - k_factor * (t_supply - 35)) * compensation`
///
/// derated by the defrost multiplier and floored at [`COP_FLOOR`].
/// `cop_base` is the rated COP at a 35 Celsius flow temperature.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct CopParams {
    pub cop_base: f64,
    pub k_factor: f64,
    pub outdoor_coeff: f64,
    pub compensation: f64,
}

impl CopParams {
    pub fn cop(&self, outdoor_temp: f64, supply_temp: f64, relative_humidity: f64) -> f64 {
        let raw = (self.cop_base + self.outdoor_coeff * outdoor_temp
            - self.k_factor * (supply_temp - COP_REFERENCE_FLOW_TEMP))
            * self.compensation;
        (raw * defrost_factor(outdoor_temp, relative_humidity)).max(COP_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::*;

    #[fixture]
    fn params() -> CopParams {
        CopParams {
            cop_base: 4.2,
            k_factor: 0.11,
            outdoor_coeff: 0.06,
            compensation: 1.0,
        }
    }

    #[rstest]
    fn should_not_derate_outside_the_frost_window() {
        assert_approx_eq!(defrost_factor(-15.0, 90.0), 1.0);
        assert_approx_eq!(defrost_factor(-10.0, 90.0), 1.0);
        assert_approx_eq!(defrost_factor(6.0, 90.0), 1.0);
        assert_approx_eq!(defrost_factor(12.0, 90.0), 1.0);
    }

    #[rstest]
    fn should_hit_the_worst_case_near_freezing_in_saturated_air() {
        assert_approx_eq!(defrost_factor(3.0, 100.0), 0.60);
        assert_approx_eq!(defrost_factor(0.0, 100.0), 0.70);
        assert_approx_eq!(defrost_factor(0.0, 70.0), 0.80);
    }

    #[rstest]
    fn should_interpolate_bilinearly_between_anchors() {
        // halfway between the 0 and 3 degree rows, halfway between columns
        assert_approx_eq!(defrost_factor(1.5, 85.0), 0.7125);
    }

    #[rstest]
    fn should_clamp_humidity_to_the_tabulated_columns() {
        assert_approx_eq!(defrost_factor(0.0, 55.0), defrost_factor(0.0, 70.0));
        assert_approx_eq!(defrost_factor(0.0, 100.0), defrost_factor(0.0, 115.0));
    }

    #[rstest]
    fn should_rate_cop_at_the_reference_flow_temperature(params: CopParams) {
        // A7/W35 with no frost: base plus the outdoor term
        assert_approx_eq!(params.cop(7.0, 35.0, 80.0), 4.2 + 0.06 * 7.0);
    }

    #[rstest]
    fn should_fall_with_supply_temperature_and_rise_with_outdoor(params: CopParams) {
        let warm_water = params.cop(7.0, 45.0, 80.0);
        let cool_water = params.cop(7.0, 35.0, 80.0);
        assert!(warm_water < cool_water);
        assert_approx_eq!(cool_water - warm_water, 0.11 * 10.0);

        let cold_day = params.cop(-5.0, 35.0, 30.0);
        let mild_day = params.cop(10.0, 35.0, 30.0);
        assert!(cold_day < mild_day);
    }

    #[rstest]
    fn should_apply_the_defrost_derating(params: CopParams) {
        let dry = params.cop(0.0, 35.0, 70.0);
        let humid = params.cop(0.0, 35.0, 100.0);
        assert!(humid < dry);
        assert_approx_eq!(humid, (4.2) * 0.70);
    }

    #[rstest]
    fn should_never_fall_below_the_floor(params: CopParams) {
        assert_approx_eq!(params.cop(-30.0, 70.0, 80.0), COP_FLOOR);
    }
}
