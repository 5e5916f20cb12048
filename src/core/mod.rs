pub mod demand;
pub mod extract;
pub mod forecast;
pub mod heat_loss;
pub mod heat_pump;
pub mod heating_curve;
pub mod planner;
pub mod pv;
pub mod solar_gain;
pub mod units;
