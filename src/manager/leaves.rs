use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};

use super::TermManager;
use crate::{
    error::TermError,
    poly::{bv_normalize, mask64, modulus},
    terms::{Term, TermKind},
    types::TypeId,
};

/// Constants, uninterpreted symbols and variables.
impl TermManager {
    pub fn true_term(&self) -> Term {
        Term::TRUE
    }

    pub fn false_term(&self) -> Term {
        Term::FALSE
    }

    /// The `i`-th constant of the scalar or uninterpreted type `tau`.
    pub fn constant(&mut self, tau: TypeId, i: i64) -> Result<Term, TermError> {
        self.record(self.check_good_constant(tau, i))?;
        Ok(self.mk_constant(tau, i as u32))
    }

    pub(crate) fn mk_constant(&mut self, tau: TypeId, i: u32) -> Term {
        self.terms.intern(TermKind::Constant(tau, i), tau)
    }

    /// A fresh uninterpreted symbol of type `tau`.
    pub fn new_uninterpreted(&mut self, tau: TypeId) -> Result<Term, TermError> {
        self.record(self.check_good_type(tau, None))?;
        Ok(self.terms.fresh_uninterpreted(tau))
    }

    /// A fresh variable of type `tau`, to be bound by a quantifier.
    pub fn new_variable(&mut self, tau: TypeId) -> Result<Term, TermError> {
        self.record(self.check_good_type(tau, None))?;
        Ok(self.terms.fresh_variable(tau))
    }

    pub(crate) fn mk_fresh_variable(&mut self, tau: TypeId) -> Term {
        self.terms.fresh_variable(tau)
    }

    /* Arithmetic constants */

    pub fn rational(&mut self, q: &BigRational) -> Term {
        let tau = if q.is_integer() {
            TypeId::INT
        } else {
            TypeId::REAL
        };
        self.terms.intern(TermKind::ArithConst(q.clone()), tau)
    }

    pub fn integer(&mut self, i: i64) -> Term {
        self.rational(&BigRational::from_integer(BigInt::from(i)))
    }

    pub fn zero(&mut self) -> Term {
        self.rational(&BigRational::zero())
    }

    /* Bit-vector constants */

    pub fn bvconst_u64(&mut self, n: u32, x: u64) -> Result<Term, TermError> {
        let r = Self::check_positive(n as i64).and_then(|_| Self::check_maxbvsize(n as u64));
        self.record(r)?;
        Ok(self.mk_bvconst(n, &BigUint::from(x)))
    }

    pub fn bvconst_biguint(&mut self, n: u32, x: &BigUint) -> Result<Term, TermError> {
        let r = Self::check_positive(n as i64).and_then(|_| Self::check_maxbvsize(n as u64));
        self.record(r)?;
        Ok(self.mk_bvconst(n, x))
    }

    pub fn bvconst_zero(&mut self, n: u32) -> Result<Term, TermError> {
        self.bvconst_u64(n, 0)
    }

    pub fn bvconst_one(&mut self, n: u32) -> Result<Term, TermError> {
        self.bvconst_u64(n, 1)
    }

    /// The constant with all bits set.
    pub fn bvconst_minus_one(&mut self, n: u32) -> Result<Term, TermError> {
        let r = Self::check_positive(n as i64).and_then(|_| Self::check_maxbvsize(n as u64));
        self.record(r)?;
        let all_ones = modulus(n) - BigUint::one();
        Ok(self.mk_bvconst(n, &all_ones))
    }

    /// The constant given by its bits, least significant first.
    pub fn bvconst_from_bits(&mut self, bits: &[bool]) -> Result<Term, TermError> {
        if bits.is_empty() {
            return self.record(Err(TermError::EmptyBitvector));
        }
        self.record(Self::check_maxbvsize(bits.len() as u64))?;
        let mut value = BigUint::zero();
        for (i, b) in bits.iter().enumerate() {
            if *b {
                value |= BigUint::one() << i;
            }
        }
        Ok(self.mk_bvconst(bits.len() as u32, &value))
    }

    /// The constant `x mod 2^n`; `n` must be positive.
    pub(crate) fn mk_bvconst(&mut self, n: u32, x: &BigUint) -> Term {
        let tau = self.types.bv(n);
        let value = bv_normalize(x, n);
        let kind = if n <= 64 {
            TermKind::BvConst64 {
                width: n,
                value: value.to_u64().unwrap_or(0) & mask64(n),
            }
        } else {
            TermKind::BvConst { width: n, value }
        };
        self.terms.intern(kind, tau)
    }

    pub(crate) fn mk_bvconst64(&mut self, n: u32, x: u64) -> Term {
        debug_assert!(n <= 64);
        let tau = self.types.bv(n);
        self.terms.intern(
            TermKind::BvConst64 {
                width: n,
                value: x & mask64(n),
            },
            tau,
        )
    }

    /// The value of a bit-vector constant.
    pub(crate) fn bv_constant_value(&self, t: Term) -> Option<BigUint> {
        match self.terms.kind(t) {
            TermKind::BvConst64 { value, .. } => Some(BigUint::from(*value)),
            TermKind::BvConst { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    pub(crate) fn arith_constant_value(&self, t: Term) -> Option<&BigRational> {
        match self.terms.kind(t) {
            TermKind::ArithConst(q) => Some(q),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use crate::{manager::TermManager, terms::TermKind, types::TypeId};

    #[test]
    fn test_constants_are_interned() {
        let mut tm = TermManager::init();
        let s = tm.scalar_type(3).unwrap();
        assert_eq!(tm.constant(s, 1).unwrap(), tm.constant(s, 1).unwrap());
        assert_ne!(tm.constant(s, 1).unwrap(), tm.constant(s, 2).unwrap());
        let five = tm.integer(5);
        assert_eq!(tm.integer(5), five);
        assert_eq!(tm.terms().type_of(five), TypeId::INT);
    }

    #[test]
    fn test_fresh_symbols_differ() {
        let mut tm = TermManager::init();
        let x = tm.new_uninterpreted(TypeId::REAL).unwrap();
        let y = tm.new_uninterpreted(TypeId::REAL).unwrap();
        let v = tm.new_variable(TypeId::REAL).unwrap();
        assert_ne!(x, y);
        assert_ne!(x, v);
        assert!(matches!(tm.terms().kind(v), TermKind::Variable(..)));
    }

    #[test]
    fn test_bvconst_forms() {
        let mut tm = TermManager::init();
        let a = tm.bvconst_u64(4, 0x1f).unwrap();
        assert_eq!(tm.terms().kind(a), &TermKind::BvConst64 { width: 4, value: 0xf });
        assert_eq!(tm.bvconst_minus_one(4).unwrap(), a);
        assert_eq!(tm.bvconst_from_bits(&[true, true, true, true]).unwrap(), a);

        let wide = tm.bvconst_one(100).unwrap();
        assert_eq!(
            tm.terms().kind(wide),
            &TermKind::BvConst {
                width: 100,
                value: BigUint::from(1u32)
            }
        );
        assert_eq!(tm.bvconst_biguint(100, &BigUint::from(1u32)).unwrap(), wide);
    }
}
