//! Substitution of variables and uninterpreted symbols by terms.

use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};

use crate::{
    error::TermError,
    manager::TermManager,
    terms::{Term, TermKind},
};

/// The variables occurring free in `t`.
pub fn free_vars(tm: &TermManager, t: Term) -> IndexSet<Term> {
    let mut free = IndexSet::new();
    let mut seen = IndexSet::new();
    collect_free_vars(tm, t.unsigned(), &mut Vec::new(), &mut seen, &mut free);
    free
}

fn collect_free_vars(
    tm: &TermManager,
    t: Term,
    bound: &mut Vec<Term>,
    seen: &mut IndexSet<(Term, usize)>,
    free: &mut IndexSet<Term>,
) {
    // the same subterm under the same binders is visited once
    if !seen.insert((t, bound.len())) {
        return;
    }
    match tm.terms().kind(t) {
        TermKind::Variable(..) => {
            if !bound.contains(&t) {
                free.insert(t);
            }
        }
        TermKind::Forall(vars, body) => {
            let n = bound.len();
            bound.extend(vars);
            collect_free_vars(tm, body.unsigned(), bound, seen, free);
            bound.truncate(n);
        }
        kind => {
            for c in kind.children() {
                collect_free_vars(tm, c.unsigned(), bound, seen, free);
            }
        }
    }
}

/// A substitution mapping variables or uninterpreted symbols to terms.
///
/// Applying it rebuilds the term bottom-up through the simplifying constructors, so the result is in normal form.
/// Bound variables of quantifiers are never replaced, and they are renamed when they would capture a free variable of the range.
#[derive(Debug, Clone, Default)]
pub struct TermSubst {
    map: IndexMap<Term, Term>,
    /// Free variables of the range
    range_vars: IndexSet<Term>,
    cache: IndexMap<Term, Term>,
}

impl TermSubst {
    /// Creates the substitution `x_i -> v_i`.
    ///
    /// Every `x_i` must be a variable or an uninterpreted symbol, and the type of `v_i` a subtype of the type of `x_i`.
    pub fn new(tm: &mut TermManager, pairs: &[(Term, Term)]) -> Result<Self, TermError> {
        let r = Self::check(tm, pairs);
        tm.record(r)?;
        let mut subst = TermSubst::default();
        for (x, v) in pairs {
            subst.range_vars.extend(free_vars(tm, *v));
            subst.map.insert(*x, *v);
        }
        Ok(subst)
    }

    fn check(tm: &TermManager, pairs: &[(Term, Term)]) -> Result<(), TermError> {
        for (i, (x, v)) in pairs.iter().enumerate() {
            tm.check_good_term(*x)?;
            tm.check_good_term(*v)?;
            let is_symbol = matches!(
                tm.terms().kind(*x),
                TermKind::Variable(..) | TermKind::Uninterpreted(..)
            );
            if x.is_neg() || !is_symbol {
                return Err(TermError::VariableRequired { term1: *x, index: i });
            }
            let tau = tm.terms().type_of(*x);
            if !tm.types().is_subtype(tm.terms().type_of(*v), tau) {
                return Err(TermError::TypeMismatch {
                    term1: *v,
                    type1: tau,
                    index: Some(i),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Term, &Term)> {
        self.map.iter()
    }

    /// Applies the substitution to `t`.
    ///
    /// Fails with `DegreeOverflow` if a rebuilt polynomial gets a degree above `MAX_DEGREE`.
    /// The error is recorded in the manager like for any other constructor.
    pub fn apply(&mut self, t: Term, tm: &mut TermManager) -> Result<Term, TermError> {
        let r = self.apply_pos(t.unsigned(), tm)?;
        Ok(r.with_polarity(t.is_neg()))
    }

    fn apply_pos(&mut self, t: Term, tm: &mut TermManager) -> Result<Term, TermError> {
        if let Some(v) = self.map.get(&t) {
            return Ok(*v);
        }
        if let Some(v) = self.cache.get(&t) {
            return Ok(*v);
        }
        let kind = tm.terms().kind(t).clone();
        let r = match kind {
            _ if kind.is_atomic() => t,
            TermKind::Forall(vars, body) => self.apply_forall(&vars, body, tm)?,
            _ => {
                let mut children = Vec::new();
                for c in kind.children() {
                    children.push(self.apply(c, tm)?);
                }
                tm.rebuild(t, &children)?
            }
        };
        self.cache.insert(t, r);
        Ok(r)
    }

    /// Bound variables hide their bindings in `map`. A bound variable that is free in the range is renamed to a fresh one.
    fn apply_forall(
        &mut self,
        vars: &[Term],
        body: Term,
        tm: &mut TermManager,
    ) -> Result<Term, TermError> {
        let mut inner = TermSubst {
            map: self.map.clone(),
            range_vars: self.range_vars.clone(),
            cache: IndexMap::new(),
        };
        let mut new_vars = Vec::with_capacity(vars.len());
        for x in vars {
            inner.map.shift_remove(x);
            if self.range_vars.contains(x) {
                let tau = tm.terms().type_of(*x);
                let y = tm.mk_fresh_variable(tau);
                log::trace!("Renaming bound variable {} to {}", x, y);
                inner.map.insert(*x, y);
                new_vars.push(y);
            } else {
                new_vars.push(*x);
            }
        }
        if inner.map.is_empty() {
            return Ok(tm.mk_forall(vars, body));
        }
        let body = inner.apply(body, tm)?;
        new_vars.sort();
        Ok(tm.mk_forall(&new_vars, body))
    }
}

impl Display for TermSubst {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (key, value) in self.map.iter() {
            writeln!(f, "{} -> {}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, types::TypeId};

    #[test]
    fn test_substitution_simplifies() {
        let mut tm = TermManager::init();
        let x = tm.new_uninterpreted(TypeId::INT).unwrap();
        let y = tm.new_uninterpreted(TypeId::INT).unwrap();
        let sum = tm.add(x, y).unwrap();
        let ge = tm.arith_geq(sum, y).unwrap();
        let one = tm.integer(1);
        let mut s = TermSubst::new(&mut tm, &[(x, one)]).unwrap();
        assert_eq!(s.apply(ge, &mut tm).unwrap(), Term::TRUE);
        assert_eq!(s.apply(!ge, &mut tm).unwrap(), Term::FALSE);
        let mut s = TermSubst::new(&mut tm, &[(y, x)]).unwrap();
        let two_x = tm.add(x, x).unwrap();
        assert_eq!(s.apply(sum, &mut tm).unwrap(), two_x);
    }

    #[test]
    fn test_substitution_checks() {
        let mut tm = TermManager::init();
        let x = tm.new_uninterpreted(TypeId::INT).unwrap();
        let p = tm.new_uninterpreted(TypeId::BOOL).unwrap();
        let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
        let one = tm.integer(1);
        let e = TermSubst::new(&mut tm, &[(one, x)]).unwrap_err();
        assert_eq!(e.code(), ErrorCode::VariableRequired);
        let e = TermSubst::new(&mut tm, &[(x, one), (x, p)]).unwrap_err();
        assert_eq!(e.code(), ErrorCode::TypeMismatch);
        assert_eq!(e.index(), Some(1));
        assert!(TermSubst::new(&mut tm, &[(x, r)]).is_err());
        assert!(TermSubst::new(&mut tm, &[(r, x)]).is_ok());
        assert!(TermSubst::new(&mut tm, &[(!p, p)]).is_err());
    }

    #[test]
    fn test_bound_variables_are_not_replaced() {
        let mut tm = TermManager::init();
        let v = tm.new_variable(TypeId::REAL).unwrap();
        let zero = tm.zero();
        let body = tm.arith_geq(v, zero).unwrap();
        let all = tm.forall(&[v], body).unwrap();
        let f = tm.and(&[all, body]).unwrap();
        let one = tm.integer(1);
        let mut s = TermSubst::new(&mut tm, &[(v, one)]).unwrap();
        assert_eq!(s.apply(f, &mut tm).unwrap(), all);
    }

    #[test]
    fn test_capture_is_avoided() {
        let mut tm = TermManager::init();
        let real = TypeId::REAL;
        let x = tm.new_variable(real).unwrap();
        let y = tm.new_variable(real).unwrap();
        let body = tm.arith_geq(x, y).unwrap();
        let all = tm.forall(&[y], body).unwrap();
        // x := y must not be captured by the binder of y
        let mut s = TermSubst::new(&mut tm, &[(x, y)]).unwrap();
        let r = s.apply(all, &mut tm).unwrap();
        assert_ne!(r, tm.true_term());
        match tm.terms().kind(r).clone() {
            TermKind::Forall(vars, _) => {
                assert_eq!(vars.len(), 1);
                assert_ne!(vars[0], y);
            }
            k => panic!("expected a quantifier, got {:?}", k),
        }
        let free = free_vars(&tm, r);
        assert_eq!(free.into_iter().collect::<Vec<_>>(), vec![y]);
    }

    #[test]
    fn test_substitution_respects_degree_bound() {
        let mut tm = TermManager::init();
        let x = tm.new_uninterpreted(TypeId::INT).unwrap();
        let y = tm.new_uninterpreted(TypeId::INT).unwrap();
        let x2 = tm.square(x).unwrap();
        let big = tm.power(y, 40000).unwrap();
        let terms = tm.num_terms();
        let mut s = TermSubst::new(&mut tm, &[(x, big)]).unwrap();
        let e = s.apply(x2, &mut tm).unwrap_err();
        assert_eq!(e.code(), ErrorCode::DegreeOverflow);
        assert_eq!(e.badval(), Some(80000));
        assert_eq!(tm.last_error(), Some(&e));
        assert_eq!(tm.num_terms(), terms);
        assert_eq!(tm.pool().leased(), 0);

        // below the bound the substitution goes through
        let half = tm.power(y, 30000).unwrap();
        let mut s = TermSubst::new(&mut tm, &[(x, half)]).unwrap();
        let r = s.apply(x2, &mut tm).unwrap();
        assert_eq!(r, tm.power(y, 60000).unwrap());
    }

    #[test]
    fn test_free_vars() {
        let mut tm = TermManager::init();
        let x = tm.new_variable(TypeId::INT).unwrap();
        let y = tm.new_variable(TypeId::INT).unwrap();
        let u = tm.new_uninterpreted(TypeId::INT).unwrap();
        let s = tm.add(x, u).unwrap();
        let body = tm.arith_eq(s, y).unwrap();
        let all = tm.forall(&[x], body).unwrap();
        let free = free_vars(&tm, all);
        assert!(free.contains(&y));
        assert!(!free.contains(&x));
        assert!(!free.contains(&u));
    }
}
