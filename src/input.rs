use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

/// Upper bound on the planning horizon length accepted from callers.
pub const MAX_HORIZON_STEPS: usize = 96;
pub const MAX_STEP_HOURS: f64 = 2.0;

pub const DEFAULT_RELATIVE_HUMIDITY: f64 = 80.0;

/// Dwelling energy label, mapped to a fixed effective envelope U-value (see
/// `core::heat_loss`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize_enum_str, Serialize_enum_str)]
pub enum EnergyLabel {
    #[serde(rename = "A+++")]
    APlusPlusPlus,
    #[serde(rename = "A++")]
    APlusPlus,
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

/// Ventilation system of the dwelling, mapped to an effective air-change
/// rate (see `core::heat_loss`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize_enum_str, Serialize_enum_str,
)]
pub enum VentilationType {
    #[default]
    #[serde(rename = "natural_standard")]
    NaturalStandard,
    #[serde(rename = "mechanical_exhaust")]
    MechanicalExhaust,
    #[serde(rename = "balanced")]
    Balanced,
    #[serde(rename = "heat_recovery_70")]
    HeatRecovery70,
}

/// Relative humidity for the defrost model: either one value for the whole
/// horizon or a per-step series.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum HumidityInput {
    Constant(f64),
    Series(Vec<f64>),
}

impl Default for HumidityInput {
    fn default() -> Self {
        Self::Constant(DEFAULT_RELATIVE_HUMIDITY)
    }
}

impl HumidityInput {
    pub(crate) fn series(&self, horizon: usize) -> Vec<f64> {
        match self {
            Self::Constant(value) => vec![*value; horizon],
            Self::Series(values) if values.is_empty() => {
                vec![DEFAULT_RELATIVE_HUMIDITY; horizon]
            }
            Self::Series(values) => values.clone(),
        }
    }
}

/// Runtime state the host carries across planning cycles. The core holds no
/// globals; anything mutable is handed in here explicitly.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuntimeOverrides {
    /// A committed manual offset. When set, optimization is skipped and the
    /// override is broadcast over the horizon (and verified against the
    /// supply bounds like any other plan).
    #[serde(default)]
    pub manual_offset: Option<i32>,
}

/// Immutable input record for one planning cycle. All series are aligned to
/// the planning grid (`horizon_steps` steps of `step_hours` each); the
/// resampler in `core::forecast` exists to do that alignment upstream.
///
/// Unknown fields are rejected rather than ignored, so a host passing a
/// stale attribute bag fails loudly at the boundary.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PlannerInput {
    pub horizon_steps: usize,
    pub step_hours: f64,

    /// Base supply-temperature profile. When absent it is derived from the
    /// outdoor forecast via the heating curve parameters below.
    #[serde(default)]
    pub base_supply_temp: Option<Vec<f64>>,
    pub outdoor_temp: Vec<f64>,
    /// Shortwave radiation forecast, W/m2.
    pub radiation: Vec<f64>,
    #[serde(default)]
    pub humidity: HumidityInput,
    pub price_consumption: Vec<f64>,
    #[serde(default)]
    pub price_production: Option<Vec<f64>>,
    /// Household load excluding the heat pump, kW.
    pub baseline_load: Vec<f64>,
    /// External PV production forecast, kW. When absent the built-in PV
    /// model produces a fallback from the radiation forecast.
    #[serde(default)]
    pub pv_production: Option<Vec<f64>>,

    pub area_m2: f64,
    #[serde(default = "default_ceiling_height")]
    pub ceiling_h_m: f64,
    pub energy_label: EnergyLabel,
    #[serde(default)]
    pub ventilation_type: VentilationType,
    #[serde(default = "default_indoor_temp")]
    pub indoor_temp: f64,

    #[serde(default)]
    pub glass_east_m2: f64,
    #[serde(default)]
    pub glass_west_m2: f64,
    #[serde(default)]
    pub glass_south_m2: f64,
    #[serde(default = "default_glass_u_value")]
    pub glass_u_value: f64,

    #[serde(default)]
    pub pv_east_wp: f64,
    #[serde(default)]
    pub pv_south_wp: f64,
    #[serde(default)]
    pub pv_west_wp: f64,
    #[serde(default = "default_pv_tilt")]
    pub pv_tilt_deg: f64,

    pub water_min: f64,
    pub water_max: f64,
    #[serde(default = "default_curve_outdoor_min")]
    pub curve_outdoor_min: f64,
    #[serde(default = "default_curve_outdoor_max")]
    pub curve_outdoor_max: f64,

    #[serde(default = "default_offset_min")]
    pub offset_min: i32,
    #[serde(default = "default_offset_max")]
    pub offset_max: i32,
    #[serde(default = "default_offset_step_max")]
    pub offset_step_max: i32,

    #[serde(default = "default_cop_base")]
    pub cop_base: f64,
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    #[serde(default = "default_outdoor_coeff_alpha")]
    pub outdoor_coeff_alpha: f64,
    #[serde(default = "default_cop_compensation_f")]
    pub cop_compensation_f: f64,

    #[serde(default = "default_storage_efficiency")]
    pub storage_efficiency_eta: f64,
    #[serde(default = "default_max_buffer_debt")]
    pub max_buffer_debt_kwh: f64,
    #[serde(default = "default_terminal_penalty")]
    pub terminal_penalty_lambda: f64,

    #[serde(default)]
    pub initial_offset: i32,
    #[serde(default)]
    pub initial_buffer_kwh: f64,
    /// Hour-of-day at step 0, anchoring the solar orientation factors.
    #[serde(default)]
    pub start_hour: f64,

    #[serde(default)]
    pub overrides: RuntimeOverrides,
}

fn default_ceiling_height() -> f64 {
    2.5
}
fn default_indoor_temp() -> f64 {
    20.0
}
fn default_glass_u_value() -> f64 {
    1.2
}
fn default_pv_tilt() -> f64 {
    35.0
}
fn default_curve_outdoor_min() -> f64 {
    -20.0
}
fn default_curve_outdoor_max() -> f64 {
    15.0
}
fn default_offset_min() -> i32 {
    -4
}
fn default_offset_max() -> i32 {
    4
}
fn default_offset_step_max() -> i32 {
    1
}
fn default_cop_base() -> f64 {
    4.2
}
fn default_k_factor() -> f64 {
    0.11
}
fn default_outdoor_coeff_alpha() -> f64 {
    0.06
}
fn default_cop_compensation_f() -> f64 {
    1.0
}
fn default_storage_efficiency() -> f64 {
    0.5
}
fn default_max_buffer_debt() -> f64 {
    5.0
}
fn default_terminal_penalty() -> f64 {
    0.01
}

impl PlannerInput {
    /// Reject malformed inputs before anything reaches the optimizer.
    /// Emptiness of a forecast series is not a config error: it is reported
    /// as an infeasible plan with a warning, so a host with a flapping
    /// sensor keeps its last committed offset instead of crashing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_steps == 0 || self.horizon_steps > MAX_HORIZON_STEPS {
            return Err(ConfigError::HorizonOutOfRange {
                got: self.horizon_steps,
                max: MAX_HORIZON_STEPS,
            });
        }
        if !self.step_hours.is_finite() || self.step_hours <= 0.0 || self.step_hours > MAX_STEP_HOURS
        {
            return Err(ConfigError::StepHoursOutOfRange {
                got: self.step_hours,
                max: MAX_STEP_HOURS,
            });
        }

        for (name, series) in self.named_series() {
            if !series.is_empty() && series.len() != self.horizon_steps {
                return Err(ConfigError::SeriesLengthMismatch {
                    name,
                    got: series.len(),
                    expected: self.horizon_steps,
                });
            }
        }
        if let HumidityInput::Series(values) = &self.humidity {
            if !values.is_empty() && values.len() != self.horizon_steps {
                return Err(ConfigError::SeriesLengthMismatch {
                    name: "humidity",
                    got: values.len(),
                    expected: self.horizon_steps,
                });
            }
        }
        for (name, series) in [
            ("radiation", &self.radiation),
            ("baseline_load", &self.baseline_load),
        ] {
            if let Some(value) = series.iter().copied().find(|v| *v < 0.0) {
                return Err(ConfigError::NegativeParameter { name, got: value });
            }
        }

        for (name, value) in [
            ("area_m2", self.area_m2),
            ("ceiling_h_m", self.ceiling_h_m),
            ("glass_east_m2", self.glass_east_m2),
            ("glass_west_m2", self.glass_west_m2),
            ("glass_south_m2", self.glass_south_m2),
            ("glass_u_value", self.glass_u_value),
            ("pv_east_wp", self.pv_east_wp),
            ("pv_south_wp", self.pv_south_wp),
            ("pv_west_wp", self.pv_west_wp),
            ("pv_tilt_deg", self.pv_tilt_deg),
            ("max_buffer_debt_kwh", self.max_buffer_debt_kwh),
            ("terminal_penalty_lambda", self.terminal_penalty_lambda),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteParameter { name, got: value });
            }
            if value < 0.0 {
                return Err(ConfigError::NegativeParameter { name, got: value });
            }
        }
        for (name, value) in [
            ("water_min", self.water_min),
            ("water_max", self.water_max),
            ("indoor_temp", self.indoor_temp),
            ("cop_base", self.cop_base),
            ("k_factor", self.k_factor),
            ("outdoor_coeff_alpha", self.outdoor_coeff_alpha),
            ("cop_compensation_f", self.cop_compensation_f),
            ("storage_efficiency_eta", self.storage_efficiency_eta),
            ("initial_buffer_kwh", self.initial_buffer_kwh),
            ("start_hour", self.start_hour),
            ("curve_outdoor_min", self.curve_outdoor_min),
            ("curve_outdoor_max", self.curve_outdoor_max),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteParameter { name, got: value });
            }
        }

        if self.water_min >= self.water_max {
            return Err(ConfigError::InvertedWaterBounds {
                water_min: self.water_min,
                water_max: self.water_max,
            });
        }
        if self.curve_outdoor_min >= self.curve_outdoor_max {
            return Err(ConfigError::InvertedCurveBounds {
                outdoor_min: self.curve_outdoor_min,
                outdoor_max: self.curve_outdoor_max,
            });
        }
        if self.offset_min > self.offset_max {
            return Err(ConfigError::InvertedOffsetBounds {
                offset_min: self.offset_min,
                offset_max: self.offset_max,
            });
        }
        if self.offset_step_max < 1 {
            return Err(ConfigError::OffsetStepTooSmall(self.offset_step_max));
        }
        if self.initial_offset < self.offset_min || self.initial_offset > self.offset_max {
            return Err(ConfigError::InitialOffsetOutOfRange {
                got: self.initial_offset,
                offset_min: self.offset_min,
                offset_max: self.offset_max,
            });
        }
        if let Some(manual) = self.overrides.manual_offset {
            if manual < self.offset_min || manual > self.offset_max {
                return Err(ConfigError::ManualOverrideOutOfRange {
                    got: manual,
                    offset_min: self.offset_min,
                    offset_max: self.offset_max,
                });
            }
        }
        if !(0.0..=1.0).contains(&self.storage_efficiency_eta) {
            return Err(ConfigError::StorageEfficiencyOutOfRange(
                self.storage_efficiency_eta,
            ));
        }
        if self.initial_buffer_kwh < -self.max_buffer_debt_kwh {
            return Err(ConfigError::InitialBufferBelowDebtLimit {
                got: self.initial_buffer_kwh,
                max_debt: self.max_buffer_debt_kwh,
            });
        }

        Ok(())
    }

    /// Required and optional forecast series with the names used in
    /// diagnostics.
    pub(crate) fn named_series(&self) -> Vec<(&'static str, &[f64])> {
        let mut series: Vec<(&'static str, &[f64])> = vec![
            ("outdoor_temp", &self.outdoor_temp),
            ("radiation", &self.radiation),
            ("price_consumption", &self.price_consumption),
            ("baseline_load", &self.baseline_load),
        ];
        if let Some(base) = &self.base_supply_temp {
            series.push(("base_supply_temp", base));
        }
        if let Some(prices) = &self.price_production {
            series.push(("price_production", prices));
        }
        if let Some(pv) = &self.pv_production {
            series.push(("pv_production", pv));
        }
        series
    }

    /// Names of required series that are empty, i.e. unavailable upstream.
    pub(crate) fn missing_series(&self) -> Vec<&'static str> {
        [
            ("outdoor_temp", self.outdoor_temp.is_empty()),
            ("radiation", self.radiation.is_empty()),
            ("price_consumption", self.price_consumption.is_empty()),
            ("baseline_load", self.baseline_load.is_empty()),
        ]
        .into_iter()
        .filter(|(_, empty)| *empty)
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    pub(crate) fn minimal_input(horizon: usize) -> PlannerInput {
        let json = serde_json::json!({
            "horizon_steps": horizon,
            "step_hours": 1.0,
            "outdoor_temp": vec![5.0; horizon],
            "radiation": vec![0.0; horizon],
            "price_consumption": vec![0.25; horizon],
            "baseline_load": vec![0.3; horizon],
            "area_m2": 120.0,
            "energy_label": "B",
            "water_min": 25.0,
            "water_max": 50.0,
        });
        serde_json::from_value(json).expect("minimal input deserializes")
    }

    #[rstest]
    fn should_apply_documented_defaults() {
        let input = minimal_input(6);
        assert_eq!(input.humidity, HumidityInput::Constant(80.0));
        assert_eq!(input.offset_min, -4);
        assert_eq!(input.offset_max, 4);
        assert_eq!(input.offset_step_max, 1);
        assert_eq!(input.storage_efficiency_eta, 0.5);
        assert_eq!(input.max_buffer_debt_kwh, 5.0);
        assert_eq!(input.terminal_penalty_lambda, 0.01);
        assert_eq!(input.ventilation_type, VentilationType::NaturalStandard);
        assert_eq!(input.overrides.manual_offset, None);
        assert!(input.validate().is_ok());
    }

    #[rstest]
    fn should_parse_label_names_with_plus_signs() {
        let label: EnergyLabel = serde_json::from_value(serde_json::json!("A+++")).unwrap();
        assert_eq!(label, EnergyLabel::APlusPlusPlus);
        assert_eq!(
            serde_json::to_value(EnergyLabel::APlus).unwrap(),
            serde_json::json!("A+")
        );
    }

    #[rstest]
    fn should_reject_unknown_fields() {
        let json = serde_json::json!({
            "horizon_steps": 2,
            "step_hours": 1.0,
            "outdoor_temp": [5.0, 5.0],
            "radiation": [0.0, 0.0],
            "price_consumption": [0.25, 0.25],
            "baseline_load": [0.3, 0.3],
            "area_m2": 120.0,
            "energy_label": "B",
            "water_min": 25.0,
            "water_max": 50.0,
            "some_legacy_attribute": true,
        });
        assert!(serde_json::from_value::<PlannerInput>(json).is_err());
    }

    #[rstest]
    fn should_accept_scalar_or_series_humidity() {
        let scalar: HumidityInput = serde_json::from_value(serde_json::json!(75.0)).unwrap();
        assert_eq!(scalar.series(3), vec![75.0; 3]);

        let series: HumidityInput =
            serde_json::from_value(serde_json::json!([70.0, 80.0, 90.0])).unwrap();
        assert_eq!(series.series(3), vec![70.0, 80.0, 90.0]);
    }

    #[rstest]
    fn should_reject_horizons_outside_the_supported_range() {
        let mut input = minimal_input(6);
        input.horizon_steps = 0;
        assert!(matches!(
            input.validate(),
            Err(ConfigError::HorizonOutOfRange { .. })
        ));
    }

    #[rstest]
    fn should_reject_length_mismatches() {
        let mut input = minimal_input(6);
        input.outdoor_temp = vec![5.0; 4];
        assert!(matches!(
            input.validate(),
            Err(ConfigError::SeriesLengthMismatch {
                name: "outdoor_temp",
                ..
            })
        ));
    }

    #[rstest]
    fn should_reject_inverted_water_bounds() {
        let mut input = minimal_input(6);
        input.water_min = 50.0;
        input.water_max = 25.0;
        assert!(matches!(
            input.validate(),
            Err(ConfigError::InvertedWaterBounds { .. })
        ));
    }

    #[rstest]
    fn should_reject_an_initial_offset_outside_the_range() {
        let mut input = minimal_input(6);
        input.initial_offset = 7;
        assert!(matches!(
            input.validate(),
            Err(ConfigError::InitialOffsetOutOfRange { .. })
        ));
    }

    #[rstest]
    fn should_reject_an_overdrawn_initial_buffer() {
        let mut input = minimal_input(6);
        input.initial_buffer_kwh = -9.0;
        assert!(matches!(
            input.validate(),
            Err(ConfigError::InitialBufferBelowDebtLimit { .. })
        ));
    }

    #[rstest]
    fn should_reject_non_finite_parameters() {
        let mut input = minimal_input(6);
        input.k_factor = f64::NAN;
        assert!(matches!(
            input.validate(),
            Err(ConfigError::NonFiniteParameter { name: "k_factor", .. })
        ));
    }

    #[rstest]
    fn should_report_missing_series_by_name() {
        let mut input = minimal_input(6);
        input.price_consumption = vec![];
        input.radiation = vec![];
        assert!(input.validate().is_ok(), "emptiness is not a config error");
        assert_eq!(input.missing_series(), vec!["radiation", "price_consumption"]);
    }
}
