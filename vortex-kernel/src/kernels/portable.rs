//! Portable 4-lane kernels: the reference reduction order.
//!
//! Written only against [`F32x4`], so the compiler is free to map each lane
//! group onto whatever vector unit the target has. The native 4-lane
//! backends must agree with these bit for bit.

use super::{finish_distance, finish_similarity, inverse_norm};
use crate::lanes::{F32x4, LANES};

#[inline(always)]
fn common<'a>(a: &'a [f32], b: &'a [f32]) -> (&'a [f32], &'a [f32]) {
    let n = a.len().min(b.len());
    (&a[..n], &b[..n])
}

pub(crate) fn sum_sq(v: &[f32]) -> f32 {
    let groups = v.chunks_exact(LANES);
    let tail = groups.remainder();

    let mut acc = F32x4::ZERO;
    for group in groups {
        let lanes = F32x4::load(group);
        acc = acc + lanes * lanes;
    }

    let mut sum = acc.horizontal_sum();
    for x in tail {
        sum += x * x;
    }
    sum
}

pub(crate) fn distance(a: &[f32], b: &[f32]) -> f32 {
    let (a, b) = common(a, b);
    let (groups_a, groups_b) = (a.chunks_exact(LANES), b.chunks_exact(LANES));
    let (tail_a, tail_b) = (groups_a.remainder(), groups_b.remainder());

    let mut acc = F32x4::ZERO;
    for (ga, gb) in groups_a.zip(groups_b) {
        let diff = F32x4::load(ga) - F32x4::load(gb);
        acc = acc + diff * diff;
    }

    let mut sum = acc.horizontal_sum();
    for (x, y) in tail_a.iter().zip(tail_b) {
        let diff = x - y;
        sum += diff * diff;
    }
    finish_distance(sum)
}

pub(crate) fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let (a, b) = common(a, b);
    let (groups_a, groups_b) = (a.chunks_exact(LANES), b.chunks_exact(LANES));
    let (tail_a, tail_b) = (groups_a.remainder(), groups_b.remainder());

    let mut dot = F32x4::ZERO;
    let mut norm_a = F32x4::ZERO;
    let mut norm_b = F32x4::ZERO;
    for (ga, gb) in groups_a.zip(groups_b) {
        let va = F32x4::load(ga);
        let vb = F32x4::load(gb);
        dot = dot + va * vb;
        norm_a = norm_a + va * va;
        norm_b = norm_b + vb * vb;
    }

    let mut dot = dot.horizontal_sum();
    let mut norm_a = norm_a.horizontal_sum();
    let mut norm_b = norm_b.horizontal_sum();
    for (&x, &y) in tail_a.iter().zip(tail_b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    finish_similarity(dot, norm_a, norm_b)
}

pub(crate) fn normalize(v: &mut [f32]) {
    let Some(scale) = inverse_norm(sum_sq(v)) else {
        return;
    };

    let factor = F32x4::splat(scale);
    let mut groups = v.chunks_exact_mut(LANES);
    for group in &mut groups {
        (F32x4::load(group) * factor).store(group);
    }
    for x in groups.into_remainder() {
        *x *= scale;
    }
}
