use crate::core::demand::PlanningContext;
use crate::core::heat_pump::COP_FLOOR;
use crate::output::{PlanStatus, PlannerOutput};
use tracing::warn;

/// Recomputed forward trajectory for a fixed offset sequence.
struct Trajectory {
    buffer_kwh: Vec<f64>,
    supply_temp: Vec<f64>,
    cop: Vec<f64>,
    cost_per_step: Vec<f64>,
    total_cost: f64,
}

/// Rebuild the full result for a chosen offset path.
///
/// The trajectory is recomputed from scratch with the same transition rules
/// the optimizer used, never read out of the DP table, and every invariant
/// is re-verified on the way. A violation downgrades the result to
/// `Infeasible` rather than clamping anything.
pub(crate) fn build_output(
    ctx: &PlanningContext,
    offsets: &[i32],
    mut warnings: Vec<String>,
) -> PlannerOutput {
    match verified_trajectory(ctx, offsets) {
        Ok(trajectory) => {
            let baseline = cost_trajectory(ctx, &vec![0; ctx.horizon()]);
            let savings_per_step: Vec<f64> = baseline
                .cost_per_step
                .iter()
                .zip(trajectory.cost_per_step.iter())
                .map(|(base, plan)| base - plan)
                .collect();
            let total_savings = baseline.total_cost - trajectory.total_cost;
            let terminal_penalty = ctx.terminal_penalty_lambda
                * trajectory.buffer_kwh.last().copied().unwrap_or(0.0).abs();
            PlannerOutput {
                status: PlanStatus::Ok,
                offsets: offsets.to_vec(),
                buffer_kwh: trajectory.buffer_kwh,
                supply_temp: trajectory.supply_temp,
                cop: trajectory.cop,
                cost_per_step: trajectory.cost_per_step,
                total_cost: trajectory.total_cost,
                terminal_penalty,
                baseline_cost: baseline.total_cost,
                savings_per_step,
                total_savings,
                warnings,
            }
        }
        Err(violation) => {
            warn!(violation, "optimal path failed verification");
            warnings.push(violation.to_string());
            PlannerOutput::infeasible(
                ctx.horizon(),
                ctx.initial_offset,
                ctx.initial_buffer_kwh,
                warnings,
            )
        }
    }
}

/// Forward recomputation without constraint checks, used for the chosen
/// path after verification and for the all-zero baseline reference.
fn cost_trajectory(ctx: &PlanningContext, offsets: &[i32]) -> Trajectory {
    let mut buffer = ctx.initial_buffer_kwh;
    let mut buffer_kwh = Vec::with_capacity(offsets.len());
    let mut supply_temp = Vec::with_capacity(offsets.len());
    let mut cop = Vec::with_capacity(offsets.len());
    let mut cost_per_step = Vec::with_capacity(offsets.len());
    for (t, &offset) in offsets.iter().enumerate() {
        let outcome = ctx.step_outcome(t, offset, buffer);
        buffer = outcome.buffer_after_kwh;
        buffer_kwh.push(buffer);
        supply_temp.push(ctx.supply_temp(t, offset));
        cop.push(ctx.cop_at(t, offset));
        cost_per_step.push(outcome.cost);
    }
    let total_cost = cost_per_step.iter().sum();
    Trajectory {
        buffer_kwh,
        supply_temp,
        cop,
        cost_per_step,
        total_cost,
    }
}

fn verified_trajectory(ctx: &PlanningContext, offsets: &[i32]) -> Result<Trajectory, &'static str> {
    if offsets.len() != ctx.horizon() {
        return Err("offset sequence does not span the horizon");
    }
    for pair in offsets.windows(2) {
        if (pair[1] - pair[0]).abs() > ctx.offset_step_max {
            return Err("offset sequence changes faster than offset_step_max");
        }
    }
    for (t, &offset) in offsets.iter().enumerate() {
        if offset < ctx.offset_min || offset > ctx.offset_max {
            return Err("offset outside the configured range");
        }
        if !ctx.offset_admissible_at(t, offset) {
            return Err("supply temperature escapes the water bounds");
        }
    }

    let trajectory = cost_trajectory(ctx, offsets);

    for buffer in &trajectory.buffer_kwh {
        if !buffer.is_finite() {
            return Err("non-finite buffer in recomputed trajectory");
        }
        if *buffer < -ctx.max_buffer_debt_kwh
            && !is_close!(*buffer, -ctx.max_buffer_debt_kwh, abs_tol = 1e-9)
        {
            return Err("buffer exceeds the heat-debt limit");
        }
    }
    if trajectory.cop.iter().any(|c| *c < COP_FLOOR) {
        return Err("COP fell below the model floor");
    }
    if trajectory.cost_per_step.iter().any(|c| !c.is_finite())
        || !trajectory.total_cost.is_finite()
    {
        return Err("non-finite cost in recomputed trajectory");
    }

    Ok(trajectory)
}
