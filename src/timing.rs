//! Timing metrics for synthesized results.
//!
//! Both the handler and the client fallback build their [`Metrics`] here.
//! Values are rounded to hundredths of a second before summing, so
//! `total == retrieval + generation` holds exactly at two decimals.

use rand::Rng;
use std::ops::Range;
use std::time::Duration;

use crate::models::Metrics;

/// Placeholder retrieval time, in seconds.
pub const RETRIEVAL_SECS: Range<f64> = 0.2..0.7;
/// Placeholder generation time for the offline fallback, in seconds.
pub const GENERATION_SECS: Range<f64> = 1.0..2.5;

fn hundredths(secs: f64) -> i64 {
    (secs * 100.0).round() as i64
}

/// Builds metrics from raw second values, rounding each to two decimals.
pub fn metrics_from(retrieval_secs: f64, generation_secs: f64) -> Metrics {
    let retrieval = hundredths(retrieval_secs);
    let generation = hundredths(generation_secs);
    Metrics {
        retrieval_time: retrieval as f64 / 100.0,
        generation_time: generation as f64 / 100.0,
        total_time: (retrieval + generation) as f64 / 100.0,
    }
}

pub fn random_retrieval<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(RETRIEVAL_SECS)
}

/// Fully random metrics, used when neither the server nor the sample table
/// can answer.
pub fn simulated_metrics<R: Rng + ?Sized>(rng: &mut R) -> Metrics {
    let retrieval = random_retrieval(rng);
    let generation = rng.random_range(GENERATION_SECS);
    metrics_from(retrieval, generation)
}

/// Metrics for a live completion: random retrieval plus the measured call.
pub fn measured_metrics(retrieval_secs: f64, elapsed: Duration) -> Metrics {
    metrics_from(retrieval_secs, elapsed.as_secs_f64())
}

/// Two decimals with the unit suffix, e.g. `1.77s`.
pub fn format_seconds(secs: f64) -> String {
    format!("{:.2}s", secs)
}
