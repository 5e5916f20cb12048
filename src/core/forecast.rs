use crate::core::units::MINUTES_PER_HOUR;
use crate::statistics::np_interp;
use thiserror::Error;
use tracing::{debug, warn};

/// Native resolutions forecasts are commonly published at, in minutes.
pub const KNOWN_NATIVE_STEPS_MINUTES: [u32; 4] = [5, 15, 30, 60];

/// A forecast series as delivered by an upstream source, before alignment to
/// the planning grid. `native_step_minutes` is the resolution the source
/// publishes at; `None` means the source did not tag one.
#[derive(Clone, Debug, PartialEq)]
pub struct RawForecast {
    pub values: Vec<f64>,
    pub native_step_minutes: Option<u32>,
}

impl RawForecast {
    pub fn new(values: Vec<f64>, native_step_minutes: Option<u32>) -> Self {
        Self {
            values,
            native_step_minutes,
        }
    }
}

/// A series aligned to the planning grid. `assumed_native_step` is set when
/// the source carried no resolution tag and the target step was assumed, so
/// the caller can surface a warning.
#[derive(Clone, Debug, PartialEq)]
pub struct ResampledForecast {
    pub values: Vec<f64>,
    pub assumed_native_step: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum ResampleError {
    #[error("forecast source is empty or holds no known value")]
    Unavailable,
    #[error("resampled series has length {got}, expected {expected}")]
    LengthMismatch { got: usize, expected: usize },
}

/// Align a raw forecast to `horizon` steps of `step_hours` each.
///
/// Downsampling takes the arithmetic mean over each covering target
/// interval; upsampling interpolates linearly between adjacent source
/// samples with the edges held constant. Values missing at the tail are
/// forward-filled from the last known value.
pub fn resample_to_horizon(
    raw: &RawForecast,
    step_hours: f64,
    horizon: usize,
) -> Result<ResampledForecast, ResampleError> {
    let values = fill_unknown_values(&raw.values).ok_or(ResampleError::Unavailable)?;

    let target_minutes = step_hours * MINUTES_PER_HOUR as f64;
    let assumed_native_step = raw.native_step_minutes.is_none();
    let native_minutes = raw
        .native_step_minutes
        .map(|m| m as f64)
        .unwrap_or(target_minutes);
    match raw.native_step_minutes {
        None => debug!(
            target_minutes,
            "forecast carries no native step; assuming the planning step"
        ),
        Some(native) if !KNOWN_NATIVE_STEPS_MINUTES.contains(&native) => warn!(
            native,
            "forecast tags a native step outside the commonly published resolutions"
        ),
        Some(_) => {}
    }

    let resampled = if (native_minutes - target_minutes).abs() < 1e-9 {
        align_same_step(&values, horizon)
    } else if native_minutes < target_minutes {
        downsample(&values, native_minutes, target_minutes, horizon)
    } else {
        upsample(&values, native_minutes, target_minutes, horizon)
    };

    if resampled.len() != horizon {
        return Err(ResampleError::LengthMismatch {
            got: resampled.len(),
            expected: horizon,
        });
    }

    Ok(ResampledForecast {
        values: resampled,
        assumed_native_step,
    })
}

/// Replace non-finite entries by the nearest preceding known value (the
/// first known value for a non-finite head). Returns `None` when no entry is
/// known at all.
fn fill_unknown_values(values: &[f64]) -> Option<Vec<f64>> {
    let first_known = values.iter().copied().find(|v| v.is_finite())?;
    let mut last_known = first_known;
    Some(
        values
            .iter()
            .map(|v| {
                if v.is_finite() {
                    last_known = *v;
                }
                last_known
            })
            .collect(),
    )
}

fn align_same_step(values: &[f64], horizon: usize) -> Vec<f64> {
    let last = *values.last().expect("series is non-empty");
    (0..horizon)
        .map(|t| values.get(t).copied().unwrap_or(last))
        .collect()
}

fn downsample(
    values: &[f64],
    native_minutes: f64,
    target_minutes: f64,
    horizon: usize,
) -> Vec<f64> {
    let last = *values.last().expect("series is non-empty");
    (0..horizon)
        .map(|t| {
            let window_start = t as f64 * target_minutes;
            let window_end = (t + 1) as f64 * target_minutes;
            let window: Vec<f64> = values
                .iter()
                .enumerate()
                .filter(|(i, _)| {
                    let sample_time = *i as f64 * native_minutes;
                    sample_time >= window_start - 1e-9 && sample_time < window_end - 1e-9
                })
                .map(|(_, v)| *v)
                .collect();
            if window.is_empty() {
                last
            } else {
                window.iter().sum::<f64>() / window.len() as f64
            }
        })
        .collect()
}

fn upsample(values: &[f64], native_minutes: f64, target_minutes: f64, horizon: usize) -> Vec<f64> {
    let sample_times: Vec<f64> = (0..values.len())
        .map(|i| i as f64 * native_minutes)
        .collect();
    (0..horizon)
        .map(|t| np_interp(t as f64 * target_minutes, &sample_times, values))
        .collect()
}
