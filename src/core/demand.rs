use crate::core::heat_pump::CopParams;

/// Tolerance applied to the heat-debt bound and supply-temperature bounds so
/// trajectories landing exactly on a limit are not rejected by rounding.
pub(crate) const BOUND_TOLERANCE: f64 = 1e-9;

/// Everything the dynamic program and the result extractor need to evaluate
/// one planning run: aligned per-step series, the COP law, and the buffer
/// and constraint parameters. Borrowed immutably for the duration of a call;
/// independent runs can share nothing and proceed in parallel.
#[derive(Clone, Debug)]
pub struct PlanningContext {
    pub step_hours: f64,
    /// Net heat demand per step in kW; negative when solar gain exceeds loss.
    pub demand_kw: Vec<f64>,
    pub base_supply_temp: Vec<f64>,
    pub outdoor_temp: Vec<f64>,
    pub humidity: Vec<f64>,
    pub price_consumption: Vec<f64>,
    pub price_production: Option<Vec<f64>>,
    pub baseline_load_kw: Vec<f64>,
    pub pv_production_kw: Vec<f64>,
    pub cop: CopParams,
    pub water_min: f64,
    pub water_max: f64,
    pub offset_min: i32,
    pub offset_max: i32,
    pub offset_step_max: i32,
    /// Fraction of the step's demand banked in the thermal mass per degree
    /// of offset.
    pub storage_efficiency: f64,
    pub max_buffer_debt_kwh: f64,
    pub terminal_penalty_lambda: f64,
    pub initial_offset: i32,
    pub initial_buffer_kwh: f64,
}

/// Result of applying one offset for one step: the buffer movement, the heat
/// the pump actually delivered, and what that electricity costs at the
/// effective tariff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepOutcome {
    pub buffer_after_kwh: f64,
    pub heat_delivered_kwh: f64,
    pub electricity_kwh: f64,
    pub price_per_kwh: f64,
    pub cost: f64,
}

impl PlanningContext {
    pub fn horizon(&self) -> usize {
        self.demand_kw.len()
    }

    pub fn supply_temp(&self, t: usize, offset: i32) -> f64 {
        self.base_supply_temp[t] + offset as f64
    }

    pub fn cop_at(&self, t: usize, offset: i32) -> f64 {
        self.cop
            .cop(self.outdoor_temp[t], self.supply_temp(t, offset), self.humidity[t])
    }

    /// Whether the offset keeps the supply temperature within the water
    /// bounds at step `t`.
    pub fn offset_admissible_at(&self, t: usize, offset: i32) -> bool {
        let supply = self.supply_temp(t, offset);
        supply >= self.water_min - BOUND_TOLERANCE && supply <= self.water_max + BOUND_TOLERANCE
    }

    /// Offsets admissible at one step or more. An offset violating the
    /// supply bounds at every step is dropped from the action space
    /// entirely; per-step violations are filtered during the transition.
    pub fn admissible_offsets(&self) -> Vec<i32> {
        (self.offset_min..=self.offset_max)
            .filter(|o| (0..self.horizon()).any(|t| self.offset_admissible_at(t, *o)))
            .collect()
    }

    pub fn within_debt_limit(&self, buffer_kwh: f64) -> bool {
        buffer_kwh >= -self.max_buffer_debt_kwh - BOUND_TOLERANCE
    }

    /// Total heat the building must be supplied with over the horizon, in
    /// kWh. Steps with surplus gain contribute nothing.
    pub fn total_positive_demand_kwh(&self) -> f64 {
        self.demand_kw
            .iter()
            .map(|d| d.max(0.0) * self.step_hours)
            .sum()
    }

    /// Per-kWh price the household pays (or forgoes) for the heat pump's
    /// draw at step `t`: the consumption tariff while the meter imports, the
    /// feed-in tariff while it exports. Without a feed-in tariff the
    /// consumption price applies throughout.
    pub fn effective_price(&self, t: usize, electricity_kwh: f64) -> f64 {
        let net_balance_kw = self.baseline_load_kw[t] + electricity_kwh / self.step_hours
            - self.pv_production_kw[t];
        if net_balance_kw >= 0.0 {
            self.price_consumption[t]
        } else {
            self.price_production
                .as_ref()
                .map(|p| p[t])
                .unwrap_or(self.price_consumption[t])
        }
    }

    /// Apply `offset` for step `t` starting from `buffer_before_kwh`.
    ///
    /// Surplus gain (negative demand) is banked in the thermal mass and the
    /// pump stays off. Otherwise a positive offset overheats and banks
    /// `offset * demand * storage_efficiency * step_hours` kWh while the
    /// pump still covers the full demand; a negative offset underheats,
    /// drawing the same amount out of the mass and shrinking what the pump
    /// must deliver. Callers check the debt limit on the returned buffer.
    pub fn step_outcome(&self, t: usize, offset: i32, buffer_before_kwh: f64) -> StepOutcome {
        let demand = self.demand_kw[t];
        let (buffer_delta, heat_delivered_kwh) = if demand < 0.0 {
            (-demand * self.step_hours, 0.0)
        } else {
            let delta = offset as f64 * demand * self.storage_efficiency * self.step_hours;
            let delivered = (demand * self.step_hours + delta.min(0.0)).max(0.0);
            (delta, delivered)
        };
        let electricity_kwh = heat_delivered_kwh / self.cop_at(t, offset);
        let price_per_kwh = self.effective_price(t, electricity_kwh);
        StepOutcome {
            buffer_after_kwh: buffer_before_kwh + buffer_delta,
            heat_delivered_kwh,
            electricity_kwh,
            price_per_kwh,
            cost: electricity_kwh * price_per_kwh,
        }
    }

    /// Defensive cross-check that every series covers the horizon.
    pub(crate) fn series_lengths_consistent(&self) -> bool {
        let h = self.horizon();
        let production_ok = self.price_production.as_ref().map_or(true, |p| p.len() == h);
        self.base_supply_temp.len() == h
            && self.outdoor_temp.len() == h
            && self.humidity.len() == h
            && self.price_consumption.len() == h
            && self.baseline_load_kw.len() == h
            && self.pv_production_kw.len() == h
            && production_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn context() -> PlanningContext {
        PlanningContext {
            step_hours: 1.0,
            demand_kw: vec![6.0, -2.0, 4.0],
            base_supply_temp: vec![38.0; 3],
            outdoor_temp: vec![7.0; 3],
            humidity: vec![50.0; 3],
            price_consumption: vec![0.25; 3],
            price_production: Some(vec![0.08; 3]),
            baseline_load_kw: vec![0.4; 3],
            pv_production_kw: vec![0.0, 5.0, 0.0],
            cop: CopParams {
                cop_base: 4.2,
                k_factor: 0.11,
                outdoor_coeff: 0.06,
                compensation: 1.0,
            },
            water_min: 25.0,
            water_max: 50.0,
            offset_min: -4,
            offset_max: 4,
            offset_step_max: 1,
            storage_efficiency: 0.5,
            max_buffer_debt_kwh: 5.0,
            terminal_penalty_lambda: 0.01,
            initial_offset: 0,
            initial_buffer_kwh: 0.0,
        }
    }

    #[rstest]
    fn should_keep_all_offsets_that_fit_the_water_bounds(context: PlanningContext) {
        assert_eq!(context.admissible_offsets(), (-4..=4).collect::<Vec<_>>());
    }

    #[rstest]
    fn should_drop_offsets_that_never_fit(context: PlanningContext) {
        let mut context = context;
        context.base_supply_temp = vec![48.0; 3];
        assert_eq!(context.admissible_offsets(), (-4..=2).collect::<Vec<_>>());
    }

    #[rstest]
    fn should_charge_the_buffer_from_surplus_gain(context: PlanningContext) {
        // step 1 has -2 kW of net demand: 2 kWh banked, pump off
        let outcome = context.step_outcome(1, 3, 1.0);
        assert_approx_eq!(outcome.buffer_after_kwh, 3.0);
        assert_approx_eq!(outcome.heat_delivered_kwh, 0.0);
        assert_approx_eq!(outcome.cost, 0.0);
    }

    #[rstest]
    fn should_bank_extra_heat_on_positive_offsets(context: PlanningContext) {
        let outcome = context.step_outcome(0, 2, 0.0);
        // 2 * 6 kW * 0.5 * 1 h banked on top of the full 6 kWh delivered
        assert_approx_eq!(outcome.buffer_after_kwh, 6.0);
        assert_approx_eq!(outcome.heat_delivered_kwh, 6.0);
        assert!(outcome.electricity_kwh > 0.0);
    }

    #[rstest]
    fn should_draw_debt_on_negative_offsets(context: PlanningContext) {
        let outcome = context.step_outcome(0, -1, 0.0);
        assert_approx_eq!(outcome.buffer_after_kwh, -3.0);
        assert_approx_eq!(outcome.heat_delivered_kwh, 3.0);

        // the draw is monotone in the offset
        let deeper = context.step_outcome(0, -2, 0.0);
        assert!(deeper.buffer_after_kwh < outcome.buffer_after_kwh);
        assert!(deeper.heat_delivered_kwh < outcome.heat_delivered_kwh);
        assert!(deeper.heat_delivered_kwh >= 0.0);
    }

    #[rstest]
    fn should_price_imports_at_the_consumption_tariff(context: PlanningContext) {
        let outcome = context.step_outcome(0, 0, 0.0);
        assert_approx_eq!(outcome.price_per_kwh, 0.25);
        assert_approx_eq!(outcome.cost, outcome.electricity_kwh * 0.25);
    }

    #[rstest]
    fn should_price_exports_at_the_feed_in_tariff(context: PlanningContext) {
        // step 1: 5 kW of PV against 0.4 kW baseline and an idle pump
        let outcome = context.step_outcome(1, 0, 0.0);
        assert_approx_eq!(outcome.price_per_kwh, 0.08);
    }

    #[rstest]
    fn should_fall_back_to_consumption_price_without_feed_in(context: PlanningContext) {
        let mut context = context;
        context.price_production = None;
        let outcome = context.step_outcome(1, 0, 0.0);
        assert_approx_eq!(outcome.price_per_kwh, 0.25);
    }

    #[rstest]
    fn should_sum_only_positive_demand(context: PlanningContext) {
        assert_approx_eq!(context.total_positive_demand_kwh(), 10.0);
    }

    #[rstest]
    fn should_respect_the_debt_limit_with_tolerance(context: PlanningContext) {
        assert!(context.within_debt_limit(-5.0));
        assert!(context.within_debt_limit(0.0));
        assert!(!context.within_debt_limit(-5.1));
    }
}
