use super::TermManager;
use crate::{
    error::TermError,
    terms::{Term, TermKind},
    types::TypeId,
};

/// Boolean connectives.
///
/// Only `Or`, `Xor` and `Eq` exist as kinds. Conjunction is a negated disjunction of negations, implication is a disjunction.
impl TermManager {
    pub fn not(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_boolean(t))?;
        Ok(!t)
    }

    pub fn or(&mut self, ts: &[Term]) -> Result<Term, TermError> {
        let r = Self::check_arity(ts.len()).and_then(|_| self.check_booleans(ts));
        self.record(r)?;
        Ok(self.mk_or(ts.to_vec()))
    }

    pub fn and(&mut self, ts: &[Term]) -> Result<Term, TermError> {
        let r = Self::check_arity(ts.len()).and_then(|_| self.check_booleans(ts));
        self.record(r)?;
        Ok(self.mk_and(ts.to_vec()))
    }

    pub fn or2(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.or(&[t1, t2])
    }

    pub fn and2(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.and(&[t1, t2])
    }

    pub fn xor(&mut self, ts: &[Term]) -> Result<Term, TermError> {
        let r = Self::check_arity(ts.len()).and_then(|_| self.check_booleans(ts));
        self.record(r)?;
        Ok(self.mk_xor(ts.to_vec()))
    }

    pub fn xor2(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_booleans(&[t1, t2]))?;
        Ok(self.mk_xor2(t1, t2))
    }

    pub fn iff(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_booleans(&[t1, t2]))?;
        Ok(self.mk_iff(t1, t2))
    }

    pub fn implies(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_booleans(&[t1, t2]))?;
        Ok(self.mk_implies(t1, t2))
    }

    /* Simplifying constructors */

    /// `or(ts)`: sorted, without duplicates and `false`, `true` if it contains `true` or a pair `x`, `not x`.
    pub(crate) fn mk_or(&mut self, mut ts: Vec<Term>) -> Term {
        ts.sort();
        ts.dedup();
        // true sorts first, false second
        if ts.first() == Some(&Term::TRUE) {
            return Term::TRUE;
        }
        if ts.first() == Some(&Term::FALSE) {
            ts.remove(0);
        }
        if ts.windows(2).any(|w| w[0].opposite(w[1])) {
            return Term::TRUE;
        }
        match ts.len() {
            0 => Term::FALSE,
            1 => ts[0],
            _ => self.terms.intern(TermKind::Or(ts), TypeId::BOOL),
        }
    }

    pub(crate) fn mk_and(&mut self, ts: Vec<Term>) -> Term {
        let negated = ts.into_iter().map(|t| !t).collect();
        !self.mk_or(negated)
    }

    pub(crate) fn mk_or2(&mut self, t1: Term, t2: Term) -> Term {
        self.mk_or(vec![t1, t2])
    }

    pub(crate) fn mk_and2(&mut self, t1: Term, t2: Term) -> Term {
        self.mk_and(vec![t1, t2])
    }

    pub(crate) fn mk_implies(&mut self, t1: Term, t2: Term) -> Term {
        if t1 == t2 || t1 == Term::FALSE || t2 == Term::TRUE {
            return Term::TRUE;
        }
        if t1 == Term::TRUE {
            return t2;
        }
        if t2 == Term::FALSE || t1.opposite(t2) {
            return !t1;
        }
        self.mk_or2(!t1, t2)
    }

    fn is_negated_uninterpreted(&self, t: Term) -> bool {
        t.is_neg() && matches!(self.terms.kind(t), TermKind::Uninterpreted(..))
    }

    /// `iff(t1, t2)`, as an equality between Booleans with the smaller term first.
    /// Both sides are negated when both are negative or one is a negated uninterpreted symbol.
    pub(crate) fn mk_iff(&mut self, mut t1: Term, mut t2: Term) -> Term {
        if t1 == t2 {
            return Term::TRUE;
        }
        if t1 == Term::TRUE {
            return t2;
        }
        if t2 == Term::TRUE {
            return t1;
        }
        if t1 == Term::FALSE {
            return !t2;
        }
        if t2 == Term::FALSE {
            return !t1;
        }
        if t1.opposite(t2) {
            return Term::FALSE;
        }
        if (t1.is_neg() && t2.is_neg())
            || self.is_negated_uninterpreted(t1)
            || self.is_negated_uninterpreted(t2)
        {
            t1 = !t1;
            t2 = !t2;
        }
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        self.terms.intern(TermKind::Eq(t1, t2), TypeId::BOOL)
    }

    /// `xor(t1, t2)`, as a negated equality between positive terms.
    pub(crate) fn mk_xor2(&mut self, mut t1: Term, mut t2: Term) -> Term {
        if t1 == t2 {
            return Term::FALSE;
        }
        if t1 == Term::FALSE {
            return t2;
        }
        if t2 == Term::FALSE {
            return t1;
        }
        if t1 == Term::TRUE {
            return !t2;
        }
        if t2 == Term::TRUE {
            return !t1;
        }
        if t1.opposite(t2) {
            return Term::TRUE;
        }
        let mut negate = true;
        if t1.is_neg() {
            t1 = !t1;
            negate = !negate;
        }
        if t2.is_neg() {
            t2 = !t2;
            negate = !negate;
        }
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        let eq = self.terms.intern(TermKind::Eq(t1, t2), TypeId::BOOL);
        eq.with_polarity(negate)
    }

    /// n-ary `xor`.
    /// Constants and negations are absorbed into a parity, pairs of equal arguments cancel out.
    pub(crate) fn mk_xor(&mut self, ts: Vec<Term>) -> Term {
        let mut negate = false;
        let mut args = Vec::with_capacity(ts.len());
        for t in ts {
            if t == Term::TRUE || t == Term::FALSE {
                negate ^= t == Term::TRUE;
                continue;
            }
            negate ^= t.is_neg();
            args.push(t.unsigned());
        }
        args.sort();
        let mut kept: Vec<Term> = Vec::with_capacity(args.len());
        for t in args {
            if kept.last() == Some(&t) {
                kept.pop();
            } else {
                kept.push(t);
            }
        }
        match kept.len() {
            0 => Term::TRUE.with_polarity(!negate),
            1 => kept[0].with_polarity(negate),
            2 => {
                let eq = self.terms.intern(TermKind::Eq(kept[0], kept[1]), TypeId::BOOL);
                eq.with_polarity(!negate)
            }
            _ => self
                .terms
                .intern(TermKind::Xor(kept), TypeId::BOOL)
                .with_polarity(negate),
        }
    }

    /// `ite(c, t, e)` over Booleans.
    pub(crate) fn mk_bool_ite(&mut self, mut c: Term, mut t: Term, mut e: Term) -> Term {
        if t == e || c == Term::TRUE {
            return t;
        }
        if c == Term::FALSE {
            return e;
        }
        if t.opposite(e) {
            return self.mk_iff(c, t);
        }

        // condition in a branch
        if c == t {
            return self.mk_or2(c, e);
        }
        if c == e {
            return self.mk_and2(c, t);
        }
        if c.opposite(t) {
            return self.mk_and2(t, e);
        }
        if c.opposite(e) {
            return self.mk_or2(t, e);
        }

        // constant branches
        if t == Term::TRUE {
            return self.mk_or2(c, e);
        }
        if e == Term::FALSE {
            return self.mk_and2(c, t);
        }
        if t == Term::FALSE {
            return self.mk_and2(!c, e);
        }
        if e == Term::TRUE {
            return self.mk_or2(!c, t);
        }

        if c.is_neg() {
            c = !c;
            std::mem::swap(&mut t, &mut e);
        }

        if t.is_pos() && e.is_pos() {
            if let (TermKind::BvEq(x1, y1), TermKind::BvEq(x2, y2)) =
                (self.terms.kind(t).clone(), self.terms.kind(e).clone())
            {
                return self.mk_lifted_ite_bveq(c, t, e, (x1, y1), (x2, y2));
            }
        }
        self.terms.intern(TermKind::Ite(c, t, e), TypeId::BOOL)
    }

    /// `ite c (x = y) (x = u)` becomes `x = ite c y u`, for any side shared by the two equalities.
    fn mk_lifted_ite_bveq(
        &mut self,
        c: Term,
        t: Term,
        e: Term,
        (x1, y1): (Term, Term),
        (x2, y2): (Term, Term),
    ) -> Term {
        let shared = if x1 == x2 {
            Some((x1, y1, y2))
        } else if x1 == y2 {
            Some((x1, y1, x2))
        } else if y1 == x2 {
            Some((y1, x1, y2))
        } else if y1 == y2 {
            Some((y1, x1, x2))
        } else {
            None
        };
        match shared {
            Some((x, y, u)) => {
                let tau = self.terms.type_of(y);
                let ite = self.mk_ite(c, y, u, tau);
                self.bveq_atom(x, ite)
            }
            None => self.terms.intern(TermKind::Ite(c, t, e), TypeId::BOOL),
        }
    }
}
