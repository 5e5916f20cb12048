//! Planning engine for a residential heat-pump heating-curve optimizer.
//!
//! Given aligned forecasts of weather, prices and household load plus a
//! description of the dwelling, [`plan`] produces the sequence of integer
//! heating-curve offsets that minimises expected electricity cost over the
//! horizon, exploiting the building's thermal mass as a short-horizon buffer
//! (including bounded heat debt). The optimizer itself is a forward tabular
//! dynamic program ([`core::planner`]); callers that already hold a net
//! demand series can drive it directly through [`plan_with_context`].

pub mod cancel;
pub mod core;
mod errors;
mod input;
mod output;
pub mod statistics;

#[macro_use]
extern crate is_close;

use itertools::izip;
use tracing::debug;

pub use crate::cancel::CancelToken;
pub use crate::core::demand::{PlanningContext, StepOutcome};
pub use crate::core::forecast::{resample_to_horizon, RawForecast, ResampleError, ResampledForecast};
pub use crate::core::heat_pump::{CopParams, COP_FLOOR};
pub use crate::core::planner::plan_with_context;
pub use crate::errors::ConfigError;
pub use crate::input::{
    EnergyLabel, HumidityInput, PlannerInput, RuntimeOverrides, VentilationType,
    MAX_HORIZON_STEPS,
};
pub use crate::output::{PlanStatus, PlannerOutput};

use crate::core::extract;
use crate::core::heat_loss::HeatLossModel;
use crate::core::heating_curve::HeatingCurve;
use crate::core::pv::PvProductionModel;
use crate::core::solar_gain::SolarGainModel;

/// Run one planning cycle.
///
/// Returns `Err` only for a malformed input; every runtime condition
/// (missing forecasts, infeasible constraints, cancellation, numeric
/// trouble) is reported through the output status and warnings.
pub fn plan(input: &PlannerInput, cancel: &CancelToken) -> Result<PlannerOutput, ConfigError> {
    input.validate()?;
    let horizon = input.horizon_steps;

    let missing = input.missing_series();
    if !missing.is_empty() {
        debug!(?missing, "required forecast series unavailable");
        return Ok(PlannerOutput::infeasible(
            horizon,
            input.initial_offset,
            input.initial_buffer_kwh,
            vec![format!("missing forecast series: {}", missing.join(", "))],
        ));
    }
    let humidity = input.humidity.series(horizon);
    for (name, series) in input
        .named_series()
        .into_iter()
        .chain([("humidity", humidity.as_slice())])
    {
        if series.iter().any(|v| !v.is_finite()) {
            return Ok(PlannerOutput::infeasible(
                horizon,
                input.initial_offset,
                input.initial_buffer_kwh,
                vec![format!("non-finite value in forecast series `{name}`")],
            ));
        }
    }

    let ctx = build_context(input);

    if let Some(manual) = input.overrides.manual_offset {
        debug!(manual, "manual offset override active");
        return Ok(extract::build_output(
            &ctx,
            &vec![manual; horizon],
            vec![format!("manual offset override {manual} active; optimization skipped")],
        ));
    }

    Ok(plan_with_context(&ctx, cancel))
}

/// Evaluate the physical sub-models and assemble the planning context: heat
/// loss and solar gain become net demand, PV falls back to the built-in
/// model when no forecast was supplied.
fn build_context(input: &PlannerInput) -> PlanningContext {
    let base_supply_temp = match &input.base_supply_temp {
        Some(base) if !base.is_empty() => base.clone(),
        _ => HeatingCurve::new(
            input.curve_outdoor_min,
            input.curve_outdoor_max,
            input.water_min,
            input.water_max,
        )
        .supply_temperature_series(&input.outdoor_temp),
    };

    let heat_loss = HeatLossModel::new(
        input.energy_label,
        input.area_m2,
        input.ventilation_type,
        input.ceiling_h_m,
        input.indoor_temp,
    )
    .heat_loss_series_kw(&input.outdoor_temp);

    let solar_gain = SolarGainModel::new(
        input.glass_east_m2,
        input.glass_south_m2,
        input.glass_west_m2,
        input.glass_u_value,
    )
    .gain_series_kw(input.start_hour, input.step_hours, &input.radiation);

    let demand_kw: Vec<f64> = izip!(&heat_loss, &solar_gain)
        .map(|(loss, gain)| loss - gain)
        .collect();

    let pv_production_kw = match &input.pv_production {
        Some(pv) if !pv.is_empty() => pv.clone(),
        _ => PvProductionModel::new(
            input.pv_east_wp,
            input.pv_south_wp,
            input.pv_west_wp,
            input.pv_tilt_deg,
        )
        .production_series_kw(input.start_hour, input.step_hours, &input.radiation),
    };

    PlanningContext {
        step_hours: input.step_hours,
        demand_kw,
        base_supply_temp,
        outdoor_temp: input.outdoor_temp.clone(),
        humidity: input.humidity.series(input.horizon_steps),
        price_consumption: input.price_consumption.clone(),
        price_production: input
            .price_production
            .clone()
            .filter(|p| !p.is_empty()),
        baseline_load_kw: input.baseline_load.clone(),
        pv_production_kw,
        cop: CopParams {
            cop_base: input.cop_base,
            k_factor: input.k_factor,
            outdoor_coeff: input.outdoor_coeff_alpha,
            compensation: input.cop_compensation_f,
        },
        water_min: input.water_min,
        water_max: input.water_max,
        offset_min: input.offset_min,
        offset_max: input.offset_max,
        offset_step_max: input.offset_step_max,
        storage_efficiency: input.storage_efficiency_eta,
        max_buffer_debt_kwh: input.max_buffer_debt_kwh,
        terminal_penalty_lambda: input.terminal_penalty_lambda,
        initial_offset: input.initial_offset,
        initial_buffer_kwh: input.initial_buffer_kwh,
    }
}
