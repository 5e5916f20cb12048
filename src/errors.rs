use thiserror::Error;

/// Rejections raised while validating a [`crate::PlannerInput`]. These are the
/// only errors the crate returns as `Err`; every runtime condition (missing
/// forecasts, infeasible constraints, cancellation) is reported through the
/// plan status and warning list instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("horizon_steps must be between 1 and {max}, got {got}")]
    HorizonOutOfRange { got: usize, max: usize },
    #[error("step_hours must be greater than 0 and at most {max}, got {got}")]
    StepHoursOutOfRange { got: f64, max: f64 },
    #[error("forecast series `{name}` has length {got} where the horizon expects {expected}")]
    SeriesLengthMismatch {
        name: &'static str,
        got: usize,
        expected: usize,
    },
    #[error("`{name}` must be non-negative, got {got}")]
    NegativeParameter { name: &'static str, got: f64 },
    #[error("`{name}` must be a finite number, got {got}")]
    NonFiniteParameter { name: &'static str, got: f64 },
    #[error("water_min ({water_min}) must be strictly below water_max ({water_max})")]
    InvertedWaterBounds { water_min: f64, water_max: f64 },
    #[error("offset_min ({offset_min}) must not exceed offset_max ({offset_max})")]
    InvertedOffsetBounds { offset_min: i32, offset_max: i32 },
    #[error("offset_step_max must be at least 1, got {0}")]
    OffsetStepTooSmall(i32),
    #[error("initial_offset {got} lies outside [{offset_min}, {offset_max}]")]
    InitialOffsetOutOfRange {
        got: i32,
        offset_min: i32,
        offset_max: i32,
    },
    #[error("manual offset override {got} lies outside [{offset_min}, {offset_max}]")]
    ManualOverrideOutOfRange {
        got: i32,
        offset_min: i32,
        offset_max: i32,
    },
    #[error("initial_buffer_kwh {got} is below the heat-debt limit -{max_debt}")]
    InitialBufferBelowDebtLimit { got: f64, max_debt: f64 },
    #[error("storage_efficiency_eta must lie within [0, 1], got {0}")]
    StorageEfficiencyOutOfRange(f64),
    #[error(
        "curve_outdoor_min ({outdoor_min}) must be strictly below curve_outdoor_max ({outdoor_max})"
    )]
    InvertedCurveBounds { outdoor_min: f64, outdoor_max: f64 },
}
