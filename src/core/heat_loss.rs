use crate::core::units::{AIR_HEAT_CAPACITY_WH_PER_M3_K, WATTS_PER_KILOWATT};
use crate::input::{EnergyLabel, VentilationType};

impl EnergyLabel {
    /// Effective envelope U-value for the label, in W/(m2.K).
    pub fn u_value(&self) -> f64 {
        match self {
            EnergyLabel::APlusPlusPlus => 0.18,
            EnergyLabel::APlusPlus => 0.25,
            EnergyLabel::APlus => 0.35,
            EnergyLabel::A => 0.45,
            EnergyLabel::B => 0.60,
            EnergyLabel::C => 0.80,
            EnergyLabel::D => 1.00,
            EnergyLabel::E => 1.40,
            EnergyLabel::F => 1.80,
            EnergyLabel::G => 2.50,
        }
    }
}

impl VentilationType {
    /// Effective air changes per hour reaching the envelope. Heat-recovery
    /// systems exchange most of their air through the recovery unit, so only
    /// the unrecovered fraction counts here.
    pub fn air_changes_per_hour(&self) -> f64 {
        match self {
            VentilationType::NaturalStandard => 1.0,
            VentilationType::MechanicalExhaust => 0.9,
            VentilationType::Balanced => 0.8,
            VentilationType::HeatRecovery70 => 0.24,
        }
    }

    /// Ventilation loss coefficient in W/(m3.K), ISO 13789 style.
    pub fn coefficient_w_per_m3_k(&self) -> f64 {
        AIR_HEAT_CAPACITY_WH_PER_M3_K * self.air_changes_per_hour()
    }
}

/// Steady-state building heat loss from a heat transfer coefficient derived
/// from the energy label (transmission) and the ventilation type.
#[derive(Clone, Copy, Debug)]
pub struct HeatLossModel {
    htc_w_per_k: f64,
    indoor_temp: f64,
}

impl HeatLossModel {
    /// Arguments:
    /// * `energy_label` - energy label of the dwelling, mapped to an envelope U-value
    /// * `area_m2` - heated floor area, in m2
    /// * `ventilation_type` - ventilation system, mapped to an air-change rate
    /// * `ceiling_height_m` - average ceiling height, in m
    /// * `indoor_temp` - indoor setpoint used for the loss calculation, in Celsius
    pub fn new(
        energy_label: EnergyLabel,
        area_m2: f64,
        ventilation_type: VentilationType,
        ceiling_height_m: f64,
        indoor_temp: f64,
    ) -> Self {
        let htc_w_per_k = transmission_htc_w_per_k(energy_label, area_m2)
            + ventilation_htc_w_per_k(ventilation_type, area_m2, ceiling_height_m);
        Self {
            htc_w_per_k,
            indoor_temp,
        }
    }

    pub fn htc_w_per_k(&self) -> f64 {
        self.htc_w_per_k
    }

    /// Instantaneous heat loss at the given outdoor temperature, in kW.
    /// Never negative: free cooling is not counted as demand.
    pub fn heat_loss_kw(&self, outdoor_temp: f64) -> f64 {
        self.htc_w_per_k * (self.indoor_temp - outdoor_temp).max(0.0)
            / WATTS_PER_KILOWATT as f64
    }

    pub fn heat_loss_series_kw(&self, outdoor_temps: &[f64]) -> Vec<f64> {
        outdoor_temps
            .iter()
            .map(|t| self.heat_loss_kw(*t))
            .collect()
    }
}

pub fn transmission_htc_w_per_k(energy_label: EnergyLabel, area_m2: f64) -> f64 {
    energy_label.u_value() * area_m2
}

pub fn ventilation_htc_w_per_k(
    ventilation_type: VentilationType,
    area_m2: f64,
    ceiling_height_m: f64,
) -> f64 {
    ventilation_type.coefficient_w_per_m3_k() * area_m2 * ceiling_height_m
}
