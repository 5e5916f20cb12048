use serde::{Deserialize, Serialize};

/// Outcome class of a planning run. Anything other than `Ok` means the
/// offsets are a fallback, not an optimum.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Ok,
    /// No heating is needed anywhere in the horizon; the all-zero plan is
    /// returned without running the optimizer.
    DegenerateFlat,
    /// Required forecasts were missing or no path satisfied the
    /// constraints; the committed offset is broadcast instead.
    Infeasible,
    Cancelled,
}

/// Result of one planning call.
///
/// For `Ok` and `DegenerateFlat` every series spans the horizon. For
/// `Infeasible` only `offsets` and `buffer_kwh` are populated (with the
/// committed fallback); for `Cancelled` no partial result is returned and
/// every series is empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlannerOutput {
    pub status: PlanStatus,
    pub offsets: Vec<i32>,
    pub buffer_kwh: Vec<f64>,
    pub supply_temp: Vec<f64>,
    pub cop: Vec<f64>,
    pub cost_per_step: Vec<f64>,
    pub total_cost: f64,
    /// Terminal buffer penalty `lambda * |b_end|`, reported separately and
    /// never folded into `total_cost`.
    pub terminal_penalty: f64,
    /// Cost of the same horizon with every offset forced to zero.
    pub baseline_cost: f64,
    pub savings_per_step: Vec<f64>,
    pub total_savings: f64,
    pub warnings: Vec<String>,
}

impl PlannerOutput {
    pub(crate) fn fallback(
        status: PlanStatus,
        offsets: Vec<i32>,
        buffer_kwh: Vec<f64>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            status,
            offsets,
            buffer_kwh,
            supply_temp: vec![],
            cop: vec![],
            cost_per_step: vec![],
            total_cost: 0.0,
            terminal_penalty: 0.0,
            baseline_cost: 0.0,
            savings_per_step: vec![],
            total_savings: 0.0,
            warnings,
        }
    }

    pub(crate) fn infeasible(
        horizon: usize,
        initial_offset: i32,
        initial_buffer_kwh: f64,
        warnings: Vec<String>,
    ) -> Self {
        Self::fallback(
            PlanStatus::Infeasible,
            vec![initial_offset; horizon],
            vec![initial_buffer_kwh; horizon],
            warnings,
        )
    }

    pub(crate) fn cancelled() -> Self {
        Self::fallback(PlanStatus::Cancelled, vec![], vec![], vec![])
    }
}
