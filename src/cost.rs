//! # Bounded costs
//!
//! Every stored cost is a 12-bit unsigned value. Overflow is never an error, sums clamp to
//! [`MAX_COST`] through [`saturate`] so results stay bit-compatible with fixed-width arithmetic.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// A single matching or path cost, always in `0..=MAX_COST`.
pub type Cost = u16;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Saturation ceiling for all costs (12-bit unsigned range).
pub const MAX_COST: Cost = 4095;

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Clamp `value` to `max`.
#[inline]
pub fn saturate(value: u32, max: Cost) -> Cost {
    if value > max as u32 {
        max
    }
    else {
        value as Cost
    }
}

/// Saturating sum of two costs.
#[inline]
pub fn sat_add(a: Cost, b: Cost) -> Cost {
    saturate(a as u32 + b as u32, MAX_COST)
}

/// Cost fusion: add `add` into `acc` element-wise with saturation.
pub fn fuse_into(acc: &mut [Cost], add: &[Cost]) {
    debug_assert_eq!(acc.len(), add.len());

    for (a, b) in acc.iter_mut().zip(add.iter()) {
        *a = sat_add(*a, *b);
    }
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
