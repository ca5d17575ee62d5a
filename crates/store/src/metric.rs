//! Exact distance computation for the in-memory backend.
//!
//! The Postgres backend delegates these to pgvector's `<=>` / `<->`
//! operators; the in-memory backend computes them here, matching pgvector's
//! definitions so both backends rank identically.

use crate::types::DistanceMetric;

/// Cosine distance: `1 - (a·b)/(|a||b|)`. Zero vectors are treated as
/// maximally distant, mirroring pgvector's NaN-avoidance.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Euclidean (L2) distance.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

/// Distance between two vectors under the given metric.
pub fn distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f64 {
    match metric {
        DistanceMetric::Cosine => cosine_distance(a, b),
        DistanceMetric::L2 => l2_distance(a, b),
    }
}
