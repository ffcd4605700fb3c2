use indexmap::IndexMap;
use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::TermManager;
use crate::{
    error::TermError,
    poly::{ArithBuffer, BufferPool},
    terms::{PowerProduct, Term, TermKind},
    types::TypeId,
};

/// Arithmetic terms and atoms.
///
/// Every arithmetic term is kept as a normalized polynomial.
/// Variables, constants and power products with coefficient one are the degenerate cases.
impl TermManager {
    pub fn add(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(self.arith_with(|m, b| {
            b.set_term(&m.terms, t1);
            b.add_term(&m.terms, t2, &BigRational::one());
        }))
    }

    pub fn sub(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(self.arith_with(|m, b| {
            b.set_term(&m.terms, t1);
            b.add_term(&m.terms, t2, &-BigRational::one());
        }))
    }

    pub fn neg(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(self.arith_with(|m, b| {
            b.set_term(&m.terms, t);
            b.negate();
        }))
    }

    /// Sum of all terms.
    pub fn sum(&mut self, ts: &[Term]) -> Result<Term, TermError> {
        let r = Self::check_arity(ts.len()).and_then(|_| self.check_ariths(ts));
        self.record(r)?;
        Ok(self.arith_with(|m, b| {
            for t in ts {
                b.add_term(&m.terms, *t, &BigRational::one());
            }
        }))
    }

    pub fn mul(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        let r = self
            .check_ariths(&[t1, t2])
            .and_then(|_| self.check_product_degree(&[t1, t2]));
        self.record(r)?;
        Ok(self.arith_with(|m, b| {
            b.set_term(&m.terms, t1);
            m.with_buffer(BufferPool::arith, |m, f| {
                f.set_term(&m.terms, t2);
                b.mul_buffer(f);
            });
        }))
    }

    pub fn square(&mut self, t: Term) -> Result<Term, TermError> {
        let r = self
            .check_arith(t)
            .and_then(|_| self.check_power_degree(t, 2));
        self.record(r)?;
        Ok(self.arith_with(|m, b| {
            b.set_term(&m.terms, t);
            b.square();
        }))
    }

    /// `t^d`
    pub fn power(&mut self, t: Term, d: u32) -> Result<Term, TermError> {
        let r = self
            .check_arith(t)
            .and_then(|_| self.check_power_degree(t, d));
        self.record(r)?;
        Ok(self.arith_with(|m, b| {
            b.add_const(&BigRational::one());
            m.with_buffer(BufferPool::arith, |m, f| {
                f.set_term(&m.terms, t);
                let mut d = d;
                while d > 0 {
                    if d & 1 == 1 {
                        b.mul_buffer(f);
                    }
                    d >>= 1;
                    if d > 0 {
                        f.square();
                    }
                }
            });
        }))
    }

    /* Atoms */

    pub fn arith_eq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(self.mk_arith_eq(t1, t2))
    }

    pub fn arith_neq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(!self.mk_arith_eq(t1, t2))
    }

    pub fn arith_geq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(self.mk_arith_geq(t1, t2))
    }

    pub fn arith_leq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(self.mk_arith_geq(t2, t1))
    }

    pub fn arith_gt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(!self.mk_arith_geq(t2, t1))
    }

    pub fn arith_lt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_ariths(&[t1, t2]))?;
        Ok(!self.mk_arith_geq(t1, t2))
    }

    pub fn arith_eq0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(self.mk_arith_eq0(t))
    }

    pub fn arith_neq0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(!self.mk_arith_eq0(t))
    }

    pub fn arith_geq0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(self.mk_arith_geq0(t))
    }

    pub fn arith_leq0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(self.mk_arith_leq0(t))
    }

    pub fn arith_gt0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(!self.mk_arith_leq0(t))
    }

    pub fn arith_lt0(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_arith(t))?;
        Ok(!self.mk_arith_geq0(t))
    }

    /* Internal constructors */

    /// Runs `f` on a cleared arithmetic buffer and finalizes the result.
    fn arith_with(&mut self, f: impl FnOnce(&mut Self, &mut ArithBuffer)) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            f(m, b);
            m.finalize_arith(b)
        })
    }

    /// Turns the content of `b` into a term.
    pub(crate) fn finalize_arith(&mut self, b: &ArithBuffer) -> Term {
        if let Some(q) = b.constant() {
            return self.rational(&q);
        }
        if b.len() == 1 {
            if let Some((pp, c)) = b.monomials().next() {
                if c.is_one() {
                    return self.arith_pp_term(pp);
                }
            }
        }
        let monos = b.to_monomials();
        let is_int = monos
            .iter()
            .all(|(c, pp)| c.is_integer() && pp.vars().all(|x| self.terms.type_of(x) == TypeId::INT));
        let tau = if is_int { TypeId::INT } else { TypeId::REAL };
        self.terms.intern(TermKind::ArithPoly(monos), tau)
    }

    /// The term for a power product of arithmetic variables.
    pub(crate) fn arith_pp_term(&mut self, pp: &PowerProduct) -> Term {
        if let Some(x) = pp.as_var() {
            return x;
        }
        let is_int = pp.vars().all(|x| self.terms.type_of(x) == TypeId::INT);
        let tau = if is_int { TypeId::INT } else { TypeId::REAL };
        self.terms.intern(TermKind::PowerProduct(pp.clone()), tau)
    }

    /// `b = 0`
    fn arith_eq0_atom(&mut self, b: &mut ArithBuffer) -> Term {
        if let Some(q) = b.constant() {
            return if q.is_zero() { Term::TRUE } else { Term::FALSE };
        }
        if let Some((p1, p2)) = b.binary_equality() {
            let x = self.arith_pp_term(&p1);
            let y = self.arith_pp_term(&p2);
            let (l, r) = if x < y { (x, y) } else { (y, x) };
            return self.terms.intern(TermKind::ArithBinEq(l, r), TypeId::BOOL);
        }
        // p = 0 and -p = 0 share one atom
        let leading_negative = b
            .monomials()
            .find(|(pp, _)| !pp.is_one())
            .map_or(false, |(_, c)| c.is_negative());
        if leading_negative {
            b.negate();
        }
        let p = self.finalize_arith(b);
        self.terms.intern(TermKind::ArithEq0(p), TypeId::BOOL)
    }

    /// `b >= 0`
    fn arith_geq0_atom(&mut self, b: &ArithBuffer) -> Term {
        if let Some(q) = b.constant() {
            return if q.is_negative() { Term::FALSE } else { Term::TRUE };
        }
        let p = self.finalize_arith(b);
        self.terms.intern(TermKind::ArithGe0(p), TypeId::BOOL)
    }

    pub(crate) fn mk_arith_eq0(&mut self, t: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t);
            m.arith_eq0_atom(b)
        })
    }

    pub(crate) fn mk_arith_geq0(&mut self, t: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t);
            m.arith_geq0_atom(b)
        })
    }

    /// `t <= 0` is `-t >= 0`.
    pub(crate) fn mk_arith_leq0(&mut self, t: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t);
            b.negate();
            m.arith_geq0_atom(b)
        })
    }

    /// `t1 - t2 = 0`, without lifting.
    fn arith_diff_eq0(&mut self, t1: Term, t2: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t1);
            b.add_term(&m.terms, t2, &-BigRational::one());
            m.arith_eq0_atom(b)
        })
    }

    fn arith_diff_geq0(&mut self, t1: Term, t2: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t1);
            b.add_term(&m.terms, t2, &-BigRational::one());
            m.arith_geq0_atom(b)
        })
    }

    pub(crate) fn mk_arith_eq(&mut self, t1: Term, t2: Term) -> Term {
        if self.options.lift_ite {
            if let Some(l) = self.check_for_lift_if(t1, t2) {
                let left = self.arith_diff_eq0(l.left1, l.left2);
                let right = self.arith_diff_eq0(l.right1, l.right2);
                return self.mk_bool_ite(l.cond, left, right);
            }
        }
        self.arith_diff_eq0(t1, t2)
    }

    pub(crate) fn mk_arith_geq(&mut self, t1: Term, t2: Term) -> Term {
        if self.options.lift_ite {
            if let Some(l) = self.check_for_lift_if(t1, t2) {
                let left = self.arith_diff_geq0(l.left1, l.left2);
                let right = self.arith_diff_geq0(l.right1, l.right2);
                return self.mk_bool_ite(l.cond, left, right);
            }
        }
        self.arith_diff_geq0(t1, t2)
    }

    /// `t1 - t2` is a non-zero constant.
    pub(crate) fn arith_must_differ(&mut self, t1: Term, t2: Term) -> bool {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t1);
            b.add_term(&m.terms, t2, &-BigRational::one());
            matches!(b.constant(), Some(q) if !q.is_zero())
        })
    }

    /* Rebuilding */

    /// Rebuilds a polynomial or power product, replacing each variable `x` by `map[x]`.
    pub(crate) fn rebuild_polynomial(
        &mut self,
        kind: &TermKind,
        tau: TypeId,
        map: &IndexMap<Term, Term>,
    ) -> Term {
        match kind {
            TermKind::PowerProduct(pp) if self.types.is_bitvector(tau) => {
                let width = self.types.bv_size(tau);
                self.rebuild_bv_poly(width, &[(BigUint::one(), pp.clone())], map)
            }
            TermKind::PowerProduct(pp) => {
                self.rebuild_arith_poly(&[(BigRational::one(), pp.clone())], map)
            }
            TermKind::ArithPoly(monos) => self.rebuild_arith_poly(monos, map),
            TermKind::BvPoly64 { width, monomials } => {
                let monos: Vec<(BigUint, PowerProduct)> = monomials
                    .iter()
                    .map(|(c, pp)| (BigUint::from(*c), pp.clone()))
                    .collect();
                self.rebuild_bv_poly(*width, &monos, map)
            }
            TermKind::BvPoly { width, monomials } => self.rebuild_bv_poly(*width, monomials, map),
            _ => unreachable!("not a polynomial: {:?}", kind),
        }
    }

    fn rebuild_arith_poly(
        &mut self,
        monos: &[(BigRational, PowerProduct)],
        map: &IndexMap<Term, Term>,
    ) -> Term {
        self.arith_with(|m, acc| {
            for (c, pp) in monos {
                m.with_buffer(BufferPool::arith, |m, prod| {
                    prod.add_const(c);
                    for (x, e) in pp.iter() {
                        let y = map.get(x).copied().unwrap_or(*x);
                        m.with_buffer(BufferPool::arith, |m, f| {
                            f.set_term(&m.terms, y);
                            for _ in 0..*e {
                                prod.mul_buffer(f);
                            }
                        });
                    }
                    acc.add_buffer(prod);
                });
            }
        })
    }
}
