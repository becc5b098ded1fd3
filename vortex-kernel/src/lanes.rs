//! Portable 4-lane group used by the reference reduction.
//!
//! A lane group is a view of 4 consecutive vector elements loaded into
//! parallel slots. Every 4-lane backend reduces in exactly this shape:
//! per-lane accumulation over the whole vector, one horizontal combine at
//! the end, then the scalar tail.

use std::ops::{Add, Mul, Sub};

/// Lane width of the reference grouping.
pub const LANES: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C, align(16))]
pub struct F32x4([f32; LANES]);

impl F32x4 {
    pub const ZERO: Self = Self([0.0; LANES]);

    #[inline(always)]
    pub fn splat(value: f32) -> Self {
        Self([value; LANES])
    }

    /// Loads the first 4 elements of `group`.
    ///
    /// # Panics
    /// Panics if `group` holds fewer than 4 elements.
    #[inline(always)]
    pub fn load(group: &[f32]) -> Self {
        Self([group[0], group[1], group[2], group[3]])
    }

    /// Stores the lanes into the first 4 elements of `out`.
    #[inline(always)]
    pub fn store(self, out: &mut [f32]) {
        out[..LANES].copy_from_slice(&self.0);
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; LANES] {
        self.0
    }

    /// Combines the lanes strictly left to right: `((l0 + l1) + l2) + l3`.
    #[inline(always)]
    pub fn horizontal_sum(self) -> f32 {
        let [l0, l1, l2, l3] = self.0;
        ((l0 + l1) + l2) + l3
    }
}

impl From<[f32; LANES]> for F32x4 {
    fn from(lanes: [f32; LANES]) -> Self {
        Self(lanes)
    }
}

impl Add for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        let (a, b) = (self.0, rhs.0);
        Self([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
    }
}

impl Sub for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        let (a, b) = (self.0, rhs.0);
        Self([a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]])
    }
}

impl Mul for F32x4 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self.0, rhs.0);
        Self([a[0] * b[0], a[1] * b[1], a[2] * b[2], a[3] * b[3]])
    }
}
