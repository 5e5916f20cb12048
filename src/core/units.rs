pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;

/// Irradiance under standard test conditions, in W/m2. Peak-watt ratings of
/// PV panels are quoted against this value.
pub const STC_IRRADIANCE_W_PER_M2: f64 = 1_000.0;

/// Volumetric heat capacity of air in Wh/(m3.K), as used for ventilation
/// heat-loss coefficients in ISO 13789.
pub const AIR_HEAT_CAPACITY_WH_PER_M3_K: f64 = 0.33;

/// Flow temperature against which heat pump COP ratings are quoted (A7/W35
/// style test points), in Celsius.
pub const COP_REFERENCE_FLOW_TEMP: f64 = 35.0;
