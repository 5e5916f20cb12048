use crate::core::units::{HOURS_PER_DAY, WATTS_PER_KILOWATT};
use crate::statistics::np_interp;

/// Glazing and PV orientations the models distinguish between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    East,
    South,
    West,
}

// Fraction of the forecast shortwave radiation reaching a vertical surface
// of each orientation, tabulated by hour of day and interpolated linearly.
// East peaks mid-morning, south at solar noon, west late afternoon.
const EAST_HOURS: [f64; 7] = [0.0, 5.0, 8.0, 11.0, 14.0, 18.0, 24.0];
const EAST_FACTORS: [f64; 7] = [0.0, 0.05, 0.95, 0.60, 0.20, 0.05, 0.0];
const SOUTH_HOURS: [f64; 7] = [0.0, 6.0, 9.0, 12.0, 15.0, 18.0, 24.0];
const SOUTH_FACTORS: [f64; 7] = [0.0, 0.05, 0.60, 1.00, 0.60, 0.05, 0.0];
const WEST_HOURS: [f64; 7] = [0.0, 6.0, 10.0, 13.0, 16.0, 19.0, 24.0];
const WEST_FACTORS: [f64; 7] = [0.0, 0.05, 0.20, 0.60, 0.95, 0.05, 0.0];

/// Orientation factor at a given hour of day (wrapped into [0, 24)).
pub fn orientation_factor(orientation: Orientation, hour_of_day: f64) -> f64 {
    let hour = hour_of_day.rem_euclid(HOURS_PER_DAY as f64);
    match orientation {
        Orientation::East => np_interp(hour, &EAST_HOURS, &EAST_FACTORS),
        Orientation::South => np_interp(hour, &SOUTH_HOURS, &SOUTH_FACTORS),
        Orientation::West => np_interp(hour, &WEST_HOURS, &WEST_FACTORS),
    }
}

/// Solar heat gain coefficient of the glazing, approximated from its
/// U-value band: better-insulated glass admits less solar energy.
pub fn solar_heat_gain_coefficient(glass_u_value: f64) -> f64 {
    (0.7 - (glass_u_value - 0.8) * 0.2).clamp(0.3, 0.7)
}

/// Passive solar gain through oriented glazing.
#[derive(Clone, Copy, Debug)]
pub struct SolarGainModel {
    glass_east_m2: f64,
    glass_south_m2: f64,
    glass_west_m2: f64,
    shgc: f64,
}

impl SolarGainModel {
    pub fn new(
        glass_east_m2: f64,
        glass_south_m2: f64,
        glass_west_m2: f64,
        glass_u_value: f64,
    ) -> Self {
        Self {
            glass_east_m2,
            glass_south_m2,
            glass_west_m2,
            shgc: solar_heat_gain_coefficient(glass_u_value),
        }
    }

    /// Gain in kW for a radiation sample (W/m2) at the given hour of day.
    pub fn gain_kw(&self, hour_of_day: f64, radiation_w_per_m2: f64) -> f64 {
        let collected = self.glass_east_m2 * orientation_factor(Orientation::East, hour_of_day)
            + self.glass_south_m2 * orientation_factor(Orientation::South, hour_of_day)
            + self.glass_west_m2 * orientation_factor(Orientation::West, hour_of_day);
        (self.shgc * collected * radiation_w_per_m2 / WATTS_PER_KILOWATT as f64).max(0.0)
    }

    /// Gain series aligned to the radiation forecast, with step `t` falling
    /// at hour-of-day `start_hour + t * step_hours`.
    pub fn gain_series_kw(
        &self,
        start_hour: f64,
        step_hours: f64,
        radiation: &[f64],
    ) -> Vec<f64> {
        radiation
            .iter()
            .enumerate()
            .map(|(t, irradiance)| {
                self.gain_kw(start_hour + t as f64 * step_hours, *irradiance)
            })
            .collect()
    }
}
