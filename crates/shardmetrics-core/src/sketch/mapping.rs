//! Value <-> bucket index mapping with bounded relative error.
//!
//! Uses a cubic polynomial in place of `log2` on the significand:
//! `L(v) = ((A*s + B)*s + C)*s + e` where `v = 2^e * (1 + s)`, `s` in `[0, 1)`.
//! The polynomial is exact at both ends of each binade and monotonic in
//! between. Its worst slope deviation from `log2` is the correcting factor,
//! which is folded into `gamma` so the relative accuracy still holds.

use crate::error::{MetricsError, Result};

const A: f64 = 6.0 / 35.0;
const B: f64 = -3.0 / 5.0;
const C: f64 = 10.0 / 7.0;

const EXPONENT_BIAS: i64 = 1023;
const SIGNIFICAND_WIDTH: u32 = 52;
const SIGNIFICAND_MASK: u64 = (1 << SIGNIFICAND_WIDTH) - 1;
const EXPONENT_MASK: u64 = 0x7ff << SIGNIFICAND_WIDTH;
const ONE_BITS: u64 = 0x3ff0_0000_0000_0000;

pub const DEFAULT_RELATIVE_ACCURACY: f64 = 0.01;

fn correcting_factor() -> f64 {
    7.0 / (10.0 * std::f64::consts::LN_2)
}

#[derive(Debug, Clone, Copy)]
pub struct CubicMapping {
    relative_accuracy: f64,
    multiplier: f64,
}

impl Default for CubicMapping {
    fn default() -> Self {
        Self::build(DEFAULT_RELATIVE_ACCURACY)
    }
}

impl CubicMapping {
    pub fn new(relative_accuracy: f64) -> Result<Self> {
        if !(relative_accuracy > 0.0 && relative_accuracy < 1.0) {
            return Err(MetricsError::InvalidConfig(format!(
                "relative accuracy must be in (0, 1), got {relative_accuracy}"
            )));
        }
        Ok(Self::build(relative_accuracy))
    }

    fn build(relative_accuracy: f64) -> Self {
        let cf = correcting_factor();
        let gamma = ((1.0 + relative_accuracy) / (1.0 - relative_accuracy)).powf(1.0 / cf);
        let multiplier = std::f64::consts::LN_2 / gamma.ln();
        // Recompute from gamma so the reported accuracy matches the buckets.
        let relative_accuracy = 1.0 - 2.0 / (1.0 + (cf * gamma.ln()).exp());
        Self { relative_accuracy, multiplier }
    }

    pub fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    /// Smallest value that gets its own bucket; anything below counts as zero.
    pub fn min_indexable_value(&self) -> f64 {
        f64::MIN_POSITIVE
    }

    /// Bucket index of a positive, finite, normal value.
    pub fn index(&self, value: f64) -> i32 {
        let index = log_like(value) * self.multiplier;
        index.floor() as i32
    }

    /// Representative value of a bucket: within `relative_accuracy` of every
    /// value that maps to it.
    pub fn value(&self, index: i32) -> f64 {
        self.lower_bound(index) * (1.0 + self.relative_accuracy)
    }

    fn lower_bound(&self, index: i32) -> f64 {
        log_like_inverse(f64::from(index) / self.multiplier)
    }
}

fn log_like(value: f64) -> f64 {
    let bits = value.to_bits();
    let exponent = ((bits & EXPONENT_MASK) >> SIGNIFICAND_WIDTH) as i64 - EXPONENT_BIAS;
    let s = f64::from_bits((bits & SIGNIFICAND_MASK) | ONE_BITS) - 1.0;
    ((A * s + B) * s + C) * s + exponent as f64
}

fn log_like_inverse(x: f64) -> f64 {
    let exponent = x.floor();
    // Cardano's formula for the real root of the cubic.
    let d0 = B * B - 3.0 * A * C;
    let d1 = 2.0 * B * B * B - 9.0 * A * B * C - 27.0 * A * A * (x - exponent);
    let p = ((d1 - (d1 * d1 - 4.0 * d0 * d0 * d0).sqrt()) / 2.0).cbrt();
    let significand_plus_one = -(B + p + d0 / p) / (3.0 * A) + 1.0;
    build_double(exponent as i64, significand_plus_one)
}

fn build_double(exponent: i64, significand_plus_one: f64) -> f64 {
    let exponent_bits = (((exponent + EXPONENT_BIAS) as u64) << SIGNIFICAND_WIDTH) & EXPONENT_MASK;
    f64::from_bits(exponent_bits | (significand_plus_one.to_bits() & SIGNIFICAND_MASK))
}
