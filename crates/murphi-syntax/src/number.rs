//! Helpers for the arbitrary-precision arithmetic used by width, offset,
//! and count computations.
//!
//! All semantic quantities in the compiler are `BigInt`s; overflow is by
//! definition a bug, so no fixed-width integer ever holds one.

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// The number of bits needed to distinguish `count` values.
///
/// This is `ceil(log2(count))`: a type with a single value needs no storage
/// at all.
pub fn bits_for(count: &BigInt) -> BigInt {
    if count <= &BigInt::one() {
        return BigInt::zero();
    }
    let highest = count - BigInt::one();
    BigInt::from(highest.magnitude().bits())
}

/// The population count of a non-negative value.
pub fn popcount(v: &BigInt) -> u64 {
    debug_assert!(!v.is_negative());
    v.magnitude().count_ones()
}

/// Whether a value is an exact power of two.
pub fn is_onehot(v: &BigInt) -> bool {
    if v.is_negative() || v.is_zero() {
        return false;
    }
    popcount(v) == 1
}
