use crate::cancel::CancelToken;
use crate::core::demand::PlanningContext;
use crate::core::extract;
use crate::output::{PlanStatus, PlannerOutput};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use tracing::debug;

/// One surviving state in the dynamic program: the cheapest way to reach a
/// (offset, cumulative-offset-sum) pair at a given step, with the buffer it
/// carries tracked exactly rather than discretised.
#[derive(Clone, Copy, Debug)]
struct DpEntry {
    cost: f64,
    prev_offset: i32,
    prev_cum: i32,
    buffer_kwh: f64,
}

/// Per-step table: offset -> cumulative offset sum -> best entry. IndexMap
/// keeps insertion order so runs over identical inputs stay byte-identical.
type DpLayer = IndexMap<i32, IndexMap<i32, DpEntry>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PlanFailure {
    /// No path from the committed state satisfies the supply-temperature
    /// and heat-debt constraints.
    Infeasible,
    /// A non-finite cost or buffer surfaced mid-optimization.
    NumericError,
    Cancelled,
}

pub(crate) struct OptimalPath {
    pub offsets: Vec<i32>,
    /// The admissible offset set shrank to one value, so the sequence was
    /// forced rather than optimized.
    pub forced: bool,
}

/// Plan against a fully prepared context. This is the level the end-to-end
/// scenarios drive: callers that already hold aligned demand and price
/// series can skip the input models entirely.
pub fn plan_with_context(ctx: &PlanningContext, cancel: &CancelToken) -> PlannerOutput {
    let horizon = ctx.horizon();
    if horizon == 0 || !ctx.series_lengths_consistent() {
        return PlannerOutput::infeasible(
            horizon,
            ctx.initial_offset,
            ctx.initial_buffer_kwh,
            vec!["planning series do not cover the horizon consistently".into()],
        );
    }

    if ctx.total_positive_demand_kwh() <= 0.0 {
        debug!("no positive heat demand anywhere in the horizon");
        return degenerate_flat(ctx);
    }

    match optimize(ctx, cancel) {
        Ok(path) => {
            let mut warnings = Vec::new();
            if path.forced {
                warnings
                    .push("admissible offset set reduced to a single value; sequence is forced".into());
            }
            extract::build_output(ctx, &path.offsets, warnings)
        }
        Err(PlanFailure::Infeasible) => PlannerOutput::infeasible(
            horizon,
            ctx.initial_offset,
            ctx.initial_buffer_kwh,
            vec!["no offset sequence satisfies the supply-temperature and heat-debt constraints"
                .into()],
        ),
        Err(PlanFailure::NumericError) => PlannerOutput::infeasible(
            horizon,
            ctx.initial_offset,
            ctx.initial_buffer_kwh,
            vec!["non-finite value encountered during optimization".into()],
        ),
        Err(PlanFailure::Cancelled) => PlannerOutput::cancelled(),
    }
}

/// Forward tabular dynamic program over (offset, cumulative offset sum).
///
/// The cumulative sum stays in the state key even though the present cost
/// function depends on (offset, buffer) alone: it separates states whose
/// accumulated temperature bias differs, which a future smoothness or
/// comfort penalty would need.
pub(crate) fn optimize(
    ctx: &PlanningContext,
    cancel: &CancelToken,
) -> Result<OptimalPath, PlanFailure> {
    let horizon = ctx.horizon();
    let offsets = ctx.admissible_offsets();
    if offsets.is_empty() {
        return Err(PlanFailure::Infeasible);
    }
    debug!(?offsets, horizon, "starting offset optimization");

    let mut dp: Vec<DpLayer> = Vec::with_capacity(horizon);

    // Step 0 transitions out of the committed pre-horizon state.
    let mut first = DpLayer::default();
    for &offset in &offsets {
        if (offset - ctx.initial_offset).abs() > ctx.offset_step_max
            || !ctx.offset_admissible_at(0, offset)
        {
            continue;
        }
        let outcome = ctx.step_outcome(0, offset, ctx.initial_buffer_kwh);
        if !outcome.cost.is_finite() || !outcome.buffer_after_kwh.is_finite() {
            return Err(PlanFailure::NumericError);
        }
        if !ctx.within_debt_limit(outcome.buffer_after_kwh) {
            continue;
        }
        first.entry(offset).or_default().insert(
            offset,
            DpEntry {
                cost: outcome.cost,
                prev_offset: ctx.initial_offset,
                prev_cum: 0,
                buffer_kwh: outcome.buffer_after_kwh,
            },
        );
    }
    if first.is_empty() {
        return Err(PlanFailure::Infeasible);
    }
    dp.push(first);

    for t in 1..horizon {
        if cancel.is_cancelled() {
            return Err(PlanFailure::Cancelled);
        }
        let mut layer = DpLayer::default();
        for &offset in &offsets {
            if !ctx.offset_admissible_at(t, offset) {
                continue;
            }
            for (&prev_offset, sums) in &dp[t - 1] {
                if (offset - prev_offset).abs() > ctx.offset_step_max {
                    continue;
                }
                for (&prev_cum, prev_entry) in sums {
                    let outcome = ctx.step_outcome(t, offset, prev_entry.buffer_kwh);
                    if !outcome.cost.is_finite() || !outcome.buffer_after_kwh.is_finite() {
                        return Err(PlanFailure::NumericError);
                    }
                    if !ctx.within_debt_limit(outcome.buffer_after_kwh) {
                        continue;
                    }
                    let candidate = DpEntry {
                        cost: prev_entry.cost + outcome.cost,
                        prev_offset,
                        prev_cum,
                        buffer_kwh: outcome.buffer_after_kwh,
                    };
                    insert_if_better(&mut layer, offset, prev_cum + offset, candidate);
                }
            }
        }
        if layer.is_empty() {
            return Err(PlanFailure::Infeasible);
        }
        dp.push(layer);
    }

    let (mut offset, mut cum) = select_terminal_state(ctx, dp.last().expect("horizon >= 1"));

    let mut result = vec![0; horizon];
    for t in (0..horizon).rev() {
        result[t] = offset;
        let entry = &dp[t][&offset][&cum];
        offset = entry.prev_offset;
        cum = entry.prev_cum;
    }
    debug!(offsets = ?result, "offset optimization finished");

    Ok(OptimalPath {
        offsets: result,
        forced: offsets.len() == 1,
    })
}

/// Keep the cheapest entry per (offset, cumulative sum); on an exact cost
/// tie prefer the smaller offset change into this step.
fn insert_if_better(layer: &mut DpLayer, offset: i32, cum: i32, candidate: DpEntry) {
    let slot = layer.entry(offset).or_default();
    match slot.get_mut(&cum) {
        None => {
            slot.insert(cum, candidate);
        }
        Some(existing) => {
            let replaces = candidate.cost < existing.cost
                || (candidate.cost == existing.cost
                    && (offset - candidate.prev_offset).abs()
                        < (offset - existing.prev_offset).abs());
            if replaces {
                *existing = candidate;
            }
        }
    }
}

/// Pick the terminal state minimising cost plus the terminal-buffer
/// penalty. Ties fall to the smaller absolute offset, then the smaller
/// offset change into the final step, then the smaller cumulative sum; a
/// last component on the signed offset makes the order total so the result
/// is unique.
fn select_terminal_state(ctx: &PlanningContext, last_layer: &DpLayer) -> (i32, i32) {
    last_layer
        .iter()
        .flat_map(|(&offset, sums)| {
            sums.iter().map(move |(&cum, entry)| {
                let objective =
                    entry.cost + ctx.terminal_penalty_lambda * entry.buffer_kwh.abs();
                let step_change = (offset - entry.prev_offset).abs();
                (
                    (OrderedFloat(objective), offset.abs(), step_change, cum, offset),
                    offset,
                    cum,
                )
            })
        })
        .min_by_key(|(key, _, _)| *key)
        .map(|(_, offset, cum)| (offset, cum))
        .expect("terminal layer is non-empty")
}

fn degenerate_flat(ctx: &PlanningContext) -> PlannerOutput {
    let horizon = ctx.horizon();
    PlannerOutput {
        status: PlanStatus::DegenerateFlat,
        offsets: vec![0; horizon],
        buffer_kwh: vec![ctx.initial_buffer_kwh; horizon],
        supply_temp: ctx.base_supply_temp.clone(),
        cop: (0..horizon).map(|t| ctx.cop_at(t, 0)).collect(),
        cost_per_step: vec![0.0; horizon],
        total_cost: 0.0,
        terminal_penalty: ctx.terminal_penalty_lambda * ctx.initial_buffer_kwh.abs(),
        baseline_cost: 0.0,
        savings_per_step: vec![0.0; horizon],
        total_savings: 0.0,
        warnings: vec![],
    }
}
