//! Reduced-precision quantization of vector components.
//!
//! Each component is mapped independently onto a small set of signed
//! magnitudes. The magnitude range is assumed to be [0, 1]; anything larger
//! saturates at the top level.

use crate::error::QuantizeError;
use std::fmt;
use std::str::FromStr;

/// Highest supported level: 2^23 segments keep every level exact in an f32.
pub const MAX_BIT_LEVEL: u32 = 24;

/// Number of bits used per quantized component. `0` keeps full precision.
///
/// Level 3 has no defined rule and is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BitLevel(u32);

impl BitLevel {
    pub const FULL: BitLevel = BitLevel(0);

    pub fn new(level: u32) -> Result<Self, QuantizeError> {
        match level {
            0..=2 => Ok(BitLevel(level)),
            4..=MAX_BIT_LEVEL => Ok(BitLevel(level)),
            _ => Err(QuantizeError::UnsupportedBitLevel(level)),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_full_precision(self) -> bool {
        self.0 == 0
    }
}

impl FromStr for BitLevel {
    type Err = QuantizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s.trim().parse::<u32>().map_err(|_| QuantizeError::NotANumber)?;
        BitLevel::new(level)
    }
}

impl fmt::Display for BitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantize one component.
///
/// Zero is treated as positive, so at level 1 it becomes `+1/3`.
pub fn quantize(value: f32, level: BitLevel) -> f32 {
    if level.is_full_precision() {
        return value;
    }

    let sign = if value < 0.0 { -1.0 } else { 1.0 };
    let magnitude = value * sign;

    let quantized = match level.0 {
        1 => return sign / 3.0,
        2 => {
            if magnitude <= 0.5 {
                0.25
            } else {
                0.75
            }
        }
        bits => {
            let segments = (1u64 << (bits - 1)) as f64;
            let level_index = (magnitude as f64 * segments + 0.5).floor().min(segments);
            (level_index / segments) as f32
        }
    };

    sign * quantized
}

/// Quantize every component of `values` in place.
pub fn quantize_slice(values: &mut [f32], level: BitLevel) {
    if level.is_full_precision() {
        return;
    }
    values.iter_mut().for_each(|v| *v = quantize(*v, level));
}
