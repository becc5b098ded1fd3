//! Serial reference loops.
//!
//! Numerically correct but summed strictly left to right, so results are not
//! bit-identical to the lane-grouped backends. Used as the correctness oracle
//! and as the fallback for "potato hardware".

use super::{finish_distance, finish_similarity, inverse_norm};

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        let diff = x - y;
        acc += diff * diff;
    }
    finish_distance(acc)
}

pub(crate) fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    finish_similarity(dot, norm_a, norm_b)
}

pub(crate) fn normalize(v: &mut [f32]) {
    let sum_sq: f32 = v.iter().fold(0.0, |acc, x| acc + x * x);
    if let Some(scale) = inverse_norm(sum_sq) {
        for x in v.iter_mut() {
            *x *= scale;
        }
    }
}
