use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use super::TermManager;
use crate::{
    poly::{big_bit, modulus},
    terms::{Term, TermKind},
};

/// Interprets `x` as a `width`-bit two's complement number.
fn to_signed(x: BigUint, width: u32) -> BigInt {
    if big_bit(&x, width - 1) {
        BigInt::from(x) - BigInt::from(modulus(width))
    } else {
        BigInt::from(x)
    }
}

/// Bounds on the value of bit-vector terms, from the bits that are known.
impl TermManager {
    /// The bits of a constant or a bit-array, least significant first.
    /// Other terms have no known bits.
    pub(crate) fn known_bits(&self, t: Term) -> Option<Vec<Term>> {
        let of = |b: bool| if b { Term::TRUE } else { Term::FALSE };
        match self.terms.kind(t) {
            TermKind::BvConst64 { width, value } => {
                Some((0..*width).map(|i| of((value >> i) & 1 == 1)).collect())
            }
            TermKind::BvConst { width, value } => {
                Some((0..*width).map(|i| of(big_bit(value, i))).collect())
            }
            TermKind::BvArray(bits) => Some(bits.clone()),
            _ => None,
        }
    }

    /// Unsigned `(lower, upper)` bounds of `t`.
    pub(crate) fn unsigned_bounds(&self, t: Term) -> (BigUint, BigUint) {
        let width = self.bitsize_of(t);
        match self.known_bits(t) {
            Some(bits) => {
                let mut lower = BigUint::zero();
                let mut upper = BigUint::zero();
                for (i, b) in bits.iter().enumerate() {
                    if *b == Term::TRUE {
                        lower |= BigUint::one() << i;
                    }
                    if *b != Term::FALSE {
                        upper |= BigUint::one() << i;
                    }
                }
                (lower, upper)
            }
            None => (BigUint::zero(), modulus(width) - BigUint::one()),
        }
    }

    /// Signed `(lower, upper)` bounds of `t`.
    pub(crate) fn signed_bounds(&self, t: Term) -> (BigInt, BigInt) {
        let width = self.bitsize_of(t);
        match self.known_bits(t) {
            Some(bits) => {
                let sign = width as usize - 1;
                let mut lower = BigUint::zero();
                let mut upper = BigUint::zero();
                for (i, b) in bits.iter().enumerate() {
                    // the sign bit counts negatively: an unknown sign lowers the lower bound
                    let (low_bit, up_bit) = if i == sign {
                        (*b != Term::FALSE, *b == Term::TRUE)
                    } else {
                        (*b == Term::TRUE, *b != Term::FALSE)
                    };
                    if low_bit {
                        lower |= BigUint::one() << i;
                    }
                    if up_bit {
                        upper |= BigUint::one() << i;
                    }
                }
                (to_signed(lower, width), to_signed(upper, width))
            }
            None => {
                let half = BigInt::from(modulus(width - 1));
                (-half.clone(), half - BigInt::one())
            }
        }
    }

    /// `t1 <= t2` holds for every value (unsigned).
    pub(crate) fn must_le(&self, t1: Term, t2: Term) -> bool {
        self.unsigned_bounds(t1).1 <= self.unsigned_bounds(t2).0
    }

    pub(crate) fn must_lt(&self, t1: Term, t2: Term) -> bool {
        self.unsigned_bounds(t1).1 < self.unsigned_bounds(t2).0
    }

    /// `t1 <= t2` holds for every value (signed).
    pub(crate) fn must_sle(&self, t1: Term, t2: Term) -> bool {
        self.signed_bounds(t1).1 <= self.signed_bounds(t2).0
    }

    pub(crate) fn must_slt(&self, t1: Term, t2: Term) -> bool {
        self.signed_bounds(t1).1 < self.signed_bounds(t2).0
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::{BigInt, BigUint};

    use crate::manager::TermManager;

    #[test]
    fn test_constant_bounds() {
        let mut tm = TermManager::init();
        let c = tm.bvconst_u64(4, 0b1010).unwrap();
        assert_eq!(
            tm.unsigned_bounds(c),
            (BigUint::from(10u32), BigUint::from(10u32))
        );
        assert_eq!(tm.signed_bounds(c), (BigInt::from(-6), BigInt::from(-6)));
    }

    #[test]
    fn test_array_bounds() {
        let mut tm = TermManager::init();
        let bv4 = tm.bv_type(4).unwrap();
        let x = tm.new_uninterpreted(bv4).unwrap();
        // 0 x0 x1 x2 with the top bit unknown
        let s = tm.shift_left0(x, 1).unwrap();
        assert_eq!(tm.unsigned_bounds(s), (BigUint::from(0u32), BigUint::from(14u32)));
        assert_eq!(tm.signed_bounds(s), (BigInt::from(-8), BigInt::from(6)));
        // x0 x1 x2 0
        let r = tm.shift_right0(x, 1).unwrap();
        assert_eq!(tm.unsigned_bounds(r), (BigUint::from(0u32), BigUint::from(7u32)));
        assert_eq!(tm.signed_bounds(r), (BigInt::from(0), BigInt::from(7)));
    }

    #[test]
    fn test_opaque_bounds() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let x = tm.new_uninterpreted(bv8).unwrap();
        assert_eq!(tm.unsigned_bounds(x), (BigUint::from(0u32), BigUint::from(255u32)));
        assert_eq!(tm.signed_bounds(x), (BigInt::from(-128), BigInt::from(127)));
        let zero = tm.bvconst_zero(8).unwrap();
        assert!(tm.must_le(zero, x));
        assert!(!tm.must_lt(zero, x));
    }
}
