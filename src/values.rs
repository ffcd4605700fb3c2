//! Representatives for model values.
//!
//! A model maps variables to abstract [`Value`]s. The [`ValueTable`] turns each value into a value term and collects the terms known to denote it (its witnesses).
//! For every value it then selects a representative witness, preferring atomic terms, then applications with the smallest nesting of applications.

use std::fmt::{Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use num_bigint::BigUint;
use num_rational::BigRational;

use crate::{
    error::TermError,
    manager::TermManager,
    terms::{Term, TermKind},
    types::TypeId,
};

/// An abstract value, as produced by a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Rational(BigRational),
    Bitvector { width: u32, value: BigUint },
    /// The `index`-th element of a scalar or uninterpreted type
    Uninterpreted { tau: TypeId, index: u32 },
    Tuple(Vec<Value>),
    /// A finite function: the listed points, and a value everywhere else if `default` is set
    Function {
        entries: Vec<(Vec<Value>, Value)>,
        default: Option<Box<Value>>,
    },
}

impl Value {
    /// The constant term denoting this value. Functions have no such term.
    pub fn to_term(&self, tm: &mut TermManager) -> Result<Option<Term>, TermError> {
        let t = match self {
            Value::Bool(b) => {
                if *b {
                    Term::TRUE
                } else {
                    Term::FALSE
                }
            }
            Value::Rational(q) => tm.rational(q),
            Value::Bitvector { width, value } => tm.bvconst_biguint(*width, value)?,
            Value::Uninterpreted { tau, index } => tm.constant(*tau, i64::from(*index))?,
            Value::Tuple(vs) => {
                let mut args = Vec::with_capacity(vs.len());
                for v in vs {
                    match v.to_term(tm)? {
                        Some(t) => args.push(t),
                        None => return Ok(None),
                    }
                }
                tm.tuple(&args)?
            }
            Value::Function { .. } => return Ok(None),
        };
        Ok(Some(t))
    }

    /// Values that take part in the distinctness and scalar constraints.
    fn is_elementary(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Rational(_)
                | Value::Bitvector { .. }
                | Value::Uninterpreted { .. }
        )
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Rational(q) => write!(f, "{}", q),
            Value::Bitvector { width, value } => write!(f, "(_ bv{} {})", value, width),
            Value::Uninterpreted { tau, index } => write!(f, "{}!{}", tau, index),
            Value::Tuple(vs) => write!(f, "(mk-tuple {})", vs.iter().join(" ")),
            Value::Function { entries, default } => {
                write!(f, "(function")?;
                for (args, v) in entries {
                    write!(f, " [{} -> {}]", args.iter().join(" "), v)?;
                }
                if let Some(d) = default {
                    write!(f, " [else -> {}]", d)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Witnesses and representatives of model values.
#[derive(Debug, Default)]
pub struct ValueTable {
    /// Value term to the terms known to have that value
    map: IndexMap<Term, Vec<Term>>,
    /// Type to the value terms of that type
    type_map: IndexMap<TypeId, Vec<Term>>,
    val_map: IndexMap<Value, Term>,
    priority: IndexMap<Term, u32>,
    /// Value term to its representative
    var_rep: IndexMap<Term, Term>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the model `pairs` and selects a representative for every value.
    ///
    /// The entries of function values become witnesses `f(a1, ..., an)` of their values.
    /// Witnesses must be atomic terms or applications.
    ///
    /// # Panics
    /// If the representatives cannot be ordered, i.e., every remaining witness depends on a value without representative.
    pub fn fill(&mut self, tm: &mut TermManager, pairs: &[(Term, Value)]) -> Result<(), TermError> {
        for (x, v) in pairs {
            self.store_term_value(tm, *x, v)?;
        }
        for (x, v) in pairs {
            if let Value::Function { entries, default } = v {
                if default.is_some() {
                    log::warn!("Default value of function {} is ignored", x);
                }
                self.store_func_values(tm, *x, entries)?;
            }
        }
        self.select_representatives(tm);
        Ok(())
    }

    fn store_term_value(
        &mut self,
        tm: &mut TermManager,
        var: Term,
        value: &Value,
    ) -> Result<(), TermError> {
        let tvalue = match self.val_map.get(value) {
            Some(t) => *t,
            None => {
                let t = match value.to_term(tm)? {
                    Some(t) => t,
                    None => return Ok(()),
                };
                self.val_map.insert(value.clone(), t);
                if value.is_elementary() {
                    let tau = tm.terms().type_of(t);
                    self.type_map.entry(tau).or_default().push(t);
                }
                t
            }
        };
        self.map.entry(tvalue).or_default().push(var);
        if tm.is_atomic(var) {
            self.priority.insert(var, 0);
            self.priority.insert(tvalue, 0);
            self.var_rep.entry(tvalue).or_insert(var);
        }
        Ok(())
    }

    fn store_func_values(
        &mut self,
        tm: &mut TermManager,
        f: Term,
        entries: &[(Vec<Value>, Value)],
    ) -> Result<(), TermError> {
        'entries: for (args, v) in entries {
            let mut arg_terms = Vec::with_capacity(args.len());
            for a in args {
                match a.to_term(tm)? {
                    Some(t) => arg_terms.push(t),
                    None => continue 'entries,
                }
            }
            let app = tm.app(f, &arg_terms)?;
            self.store_term_value(tm, app, v)?;
        }
        Ok(())
    }

    /// `1 + sum of the argument priorities` for an application whose arguments all have a priority, 0 otherwise.
    /// Arguments that are not value terms of the table count as atomic.
    fn calculate_priority(&self, tm: &TermManager, x: Term) -> u32 {
        match tm.terms().kind(x) {
            TermKind::App(_, args) => {
                let mut prio = 1;
                for a in args {
                    match self.priority.get(a) {
                        Some(p) => prio += p,
                        None if !self.map.contains_key(a) => {}
                        None => return 0,
                    }
                }
                prio
            }
            _ => 0,
        }
    }

    /// Selects the witness of least priority for `tvalue`. Returns false if no witness has a priority yet.
    fn try_select(&mut self, tm: &TermManager, tvalue: Term) -> bool {
        let witnesses = self.map.get(&tvalue).cloned().unwrap_or_default();
        let mut best: Option<(u32, Term)> = None;
        for x in witnesses {
            let prio = self.calculate_priority(tm, x);
            if prio > 0 {
                self.priority.insert(x, prio);
                if best.map_or(true, |(p, _)| prio < p) {
                    best = Some((prio, x));
                }
            }
        }
        match best {
            Some((prio, x)) => {
                self.priority.insert(tvalue, prio);
                self.var_rep.entry(tvalue).or_insert(x);
                true
            }
            None => false,
        }
    }

    fn select_representatives(&mut self, tm: &TermManager) {
        let mut pending: Vec<Term> = self
            .map
            .keys()
            .filter(|t| !self.var_rep.contains_key(*t))
            .copied()
            .collect();
        let mut pass = 0;
        while !pending.is_empty() {
            pass += 1;
            log::debug!(
                "Representative selection pass {}: {} values pending",
                pass,
                pending.len()
            );
            let before = pending.len();
            pending.retain(|t| !self.try_select(tm, *t));
            if pending.len() == before {
                panic!(
                    "Unable to clear dependency for {}\n{}",
                    pending[0], self
                );
            }
        }
    }

    /// The representative of the value term `value`, with the arguments of an application replaced by their own representatives.
    ///
    /// # Panics
    /// If `value` is not in the table, or if the representatives depend on each other.
    pub fn get_value_rep(&mut self, tm: &mut TermManager, value: Term) -> Term {
        let mut requests = IndexSet::new();
        self.value_rep(tm, value, &mut requests)
    }

    fn value_rep(
        &mut self,
        tm: &mut TermManager,
        value: Term,
        requests: &mut IndexSet<Term>,
    ) -> Term {
        let best = match self.var_rep.get(&value) {
            Some(x) => *x,
            None => {
                let witnesses = match self.map.get(&value) {
                    Some(ws) if !ws.is_empty() => ws,
                    _ => panic!("Unable to find a representative for {}", value),
                };
                let best = witnesses
                    .iter()
                    .filter_map(|x| self.priority.get(x).map(|p| (*p, *x)))
                    .min_by_key(|(p, _)| *p)
                    .map_or(witnesses[0], |(_, x)| x);
                self.var_rep.insert(value, best);
                best
            }
        };
        let (f, args) = match tm.terms().kind(best) {
            TermKind::App(f, args) => (*f, args.clone()),
            _ => return best,
        };
        let domain = tm
            .types()
            .function_domain(tm.terms().type_of(f))
            .map(<[TypeId]>::to_vec)
            .unwrap_or_default();
        requests.insert(value);
        let mut reps = Vec::with_capacity(args.len());
        for (a, sigma) in args.into_iter().zip(domain) {
            if requests.contains(&a) {
                panic!(
                    "Circular dependency while finding a representative for {}",
                    value
                );
            }
            if !self.map.contains_key(&a) {
                reps.push(a);
                continue;
            }
            // a value shared across types may have a representative outside the domain
            let rep = self.value_rep(tm, a, requests);
            if tm.types().is_subtype(tm.terms().type_of(rep), sigma) {
                reps.push(rep);
            } else {
                reps.push(a);
            }
        }
        requests.shift_remove(&value);
        tm.mk_app(f, &reps)
    }

    /// Replaces every value term of an uninterpreted type in `values` by its representative.
    pub fn set_values_from_table(&mut self, tm: &mut TermManager, values: &mut [Term]) {
        for x in values.iter_mut() {
            let tau = tm.terms().type_of(*x);
            if tm.types().is_uninterpreted(tau) {
                *x = self.get_value_rep(tm, *x);
            }
        }
    }

    /// Conjunction of `distinct` over the value terms of each uninterpreted type.
    pub fn constraint_distinct(&self, tm: &mut TermManager) -> Term {
        let mut conj = Vec::new();
        for (tau, ts) in &self.type_map {
            if tm.types().is_uninterpreted(*tau) && ts.len() >= 2 {
                conj.push(tm.mk_distinct(ts.clone()));
            }
        }
        tm.mk_and(conj)
    }

    /// Conjunction of `distinct` over the terms of each uninterpreted type in `vars`.
    pub fn constraint_distinct_filter(
        &self,
        tm: &mut TermManager,
        vars: &[Term],
    ) -> Result<Term, TermError> {
        tm.record(tm.check_good_terms(vars))?;
        let mut by_type: IndexMap<TypeId, Vec<Term>> = IndexMap::new();
        for t in vars {
            let tau = tm.terms().type_of(*t);
            if tm.types().is_uninterpreted(tau) {
                by_type.entry(tau).or_default().push(*t);
            }
        }
        let mut conj = Vec::new();
        for (_, ts) in by_type {
            if ts.len() >= 2 {
                conj.push(tm.distinct(&ts)?);
            }
        }
        Ok(tm.mk_and(conj))
    }

    /// For each term `t` of an uninterpreted type, the disjunction of `t = w` over the value terms `w` of that type.
    /// With a `bound`, value terms of a higher priority are left out.
    pub fn constraint_scalar(
        &self,
        tm: &mut TermManager,
        ts: &[Term],
        bound: Option<u32>,
    ) -> Result<Term, TermError> {
        tm.record(tm.check_good_terms(ts))?;
        let mut conj = Vec::with_capacity(ts.len());
        for t in ts {
            let tau = tm.terms().type_of(*t);
            if !tm.types().is_uninterpreted(tau) {
                continue;
            }
            let values = match self.type_map.get(&tau) {
                Some(vs) => vs,
                None => continue,
            };
            let mut disj = Vec::with_capacity(values.len());
            for u in values {
                let too_deep = match (bound, self.priority.get(u)) {
                    (Some(b), Some(p)) => *p > b,
                    _ => false,
                };
                if !too_deep {
                    disj.push(tm.mk_eq(*t, *u));
                }
            }
            conj.push(tm.mk_or(disj));
        }
        Ok(tm.mk_and(conj))
    }

    /* Queries */

    /// The value term of `v`, if `v` was stored.
    pub fn value_term(&self, v: &Value) -> Option<Term> {
        self.val_map.get(v).copied()
    }

    pub fn witnesses(&self, value: Term) -> Option<&[Term]> {
        self.map.get(&value).map(|ws| ws.as_slice())
    }

    /// The selected representative of the value term `value`.
    pub fn representative(&self, value: Term) -> Option<Term> {
        self.var_rep.get(&value).copied()
    }

    pub fn priority(&self, t: Term) -> Option<u32> {
        self.priority.get(&t).copied()
    }
}

impl Display for ValueTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "== VALUE TYPES ==")?;
        for (tau, ts) in &self.type_map {
            writeln!(f, "{} -> [{}]", tau, ts.iter().join(", "))?;
        }
        writeln!(f, "== VALUES ==")?;
        for (v, t) in &self.val_map {
            writeln!(f, "{} -> {}", v, t)?;
        }
        writeln!(f, "== PRIORITY ==")?;
        for (t, p) in &self.priority {
            writeln!(f, "{} -> {}", t, p)?;
        }
        writeln!(f, "== VALUE TERMS ==")?;
        for (t, ws) in &self.map {
            writeln!(f, "{} -> [{}]", t, ws.iter().join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    use super::*;

    fn elem(tau: TypeId, index: u32) -> Value {
        Value::Uninterpreted { tau, index }
    }

    /// `a = u0`, `b = u1`, `f(u0) = u1`, `f(u1) = u2`
    fn setup() -> (TermManager, ValueTable, TypeId, [Term; 3]) {
        let mut tm = TermManager::init();
        let u = tm.uninterpreted_type();
        let fty = tm.function_type(&[u], u).unwrap();
        let a = tm.new_uninterpreted(u).unwrap();
        let b = tm.new_uninterpreted(u).unwrap();
        let f = tm.new_uninterpreted(fty).unwrap();
        let fun = Value::Function {
            entries: vec![
                (vec![elem(u, 0)], elem(u, 1)),
                (vec![elem(u, 1)], elem(u, 2)),
            ],
            default: None,
        };
        let mut table = ValueTable::new();
        table
            .fill(&mut tm, &[(a, elem(u, 0)), (b, elem(u, 1)), (f, fun)])
            .unwrap();
        (tm, table, u, [a, b, f])
    }

    #[test]
    fn test_representatives() {
        let (mut tm, mut table, u, [a, b, f]) = setup();
        let c0 = table.value_term(&elem(u, 0)).unwrap();
        let c1 = table.value_term(&elem(u, 1)).unwrap();
        let c2 = table.value_term(&elem(u, 2)).unwrap();
        assert_eq!(table.representative(c0), Some(a));
        assert_eq!(table.representative(c1), Some(b));
        assert_eq!(table.witnesses(c1).map(|ws| ws.len()), Some(2));
        assert_eq!(table.priority(c2), Some(1));

        let fb = tm.app(f, &[b]).unwrap();
        assert_eq!(table.get_value_rep(&mut tm, c2), fb);

        let mut values = [c0, c2, Term::TRUE];
        table.set_values_from_table(&mut tm, &mut values);
        assert_eq!(values, [a, fb, Term::TRUE]);
    }

    #[test]
    fn test_constraints() {
        let (mut tm, table, u, [a, b, _]) = setup();
        let c0 = table.value_term(&elem(u, 0)).unwrap();
        let c1 = table.value_term(&elem(u, 1)).unwrap();
        let c2 = table.value_term(&elem(u, 2)).unwrap();

        // constants of the same type are trivially distinct
        assert_eq!(table.constraint_distinct(&mut tm), Term::TRUE);

        let x = tm.new_uninterpreted(TypeId::INT).unwrap();
        let d = table.constraint_distinct_filter(&mut tm, &[a, x, b]).unwrap();
        let expected = tm.distinct(&[a, b]).unwrap();
        assert_eq!(d, expected);

        let all = table.constraint_scalar(&mut tm, &[a, x], None).unwrap();
        let eqs = [tm.eq(a, c0).unwrap(), tm.eq(a, c1).unwrap(), tm.eq(a, c2).unwrap()];
        let expected = tm.or(&eqs).unwrap();
        assert_eq!(all, expected);

        let shallow = table.constraint_scalar(&mut tm, &[a], Some(0)).unwrap();
        let expected = tm.or(&eqs[..2]).unwrap();
        assert_eq!(shallow, expected);

        assert!(table.constraint_scalar(&mut tm, &[Term::NULL], None).is_err());
    }

    #[test]
    fn test_elementary_values() {
        let mut tm = TermManager::init();
        let x = tm.new_uninterpreted(TypeId::INT).unwrap();
        let bv8 = tm.bv_type(8).unwrap();
        let y = tm.new_uninterpreted(bv8).unwrap();
        let three = Value::Rational(BigRational::from_integer(BigInt::from(3)));
        let byte = Value::Bitvector {
            width: 8,
            value: BigUint::from(200u32),
        };
        let mut table = ValueTable::new();
        table
            .fill(&mut tm, &[(x, three.clone()), (y, byte.clone())])
            .unwrap();
        let t3 = table.value_term(&three).unwrap();
        assert_eq!(t3, tm.integer(3));
        assert_eq!(table.get_value_rep(&mut tm, t3), x);
        let tb = table.value_term(&byte).unwrap();
        assert_eq!(tb, tm.bvconst_u64(8, 200).unwrap());
        assert_eq!(table.representative(tb), Some(y));
    }

    #[test]
    fn test_function_default_is_ignored() {
        let mut tm = TermManager::init();
        let fty = tm.function_type(&[TypeId::BOOL], TypeId::BOOL).unwrap();
        let f = tm.new_uninterpreted(fty).unwrap();
        let fun = Value::Function {
            entries: vec![(vec![Value::Bool(true)], Value::Bool(false))],
            default: Some(Box::new(Value::Bool(true))),
        };
        let mut table = ValueTable::new();
        table.fill(&mut tm, &[(f, fun)]).unwrap();
        let ft = tm.app(f, &[Term::TRUE]).unwrap();
        assert_eq!(table.representative(Term::FALSE), Some(ft));
        assert_eq!(table.value_term(&Value::Bool(true)), None);
    }

    #[test]
    #[should_panic(expected = "Unable to clear dependency")]
    fn test_cyclic_witnesses_panic() {
        let mut tm = TermManager::init();
        let u = tm.uninterpreted_type();
        let fty = tm.function_type(&[u], u).unwrap();
        let f = tm.new_uninterpreted(fty).unwrap();
        let fun = Value::Function {
            entries: vec![
                (vec![elem(u, 0)], elem(u, 1)),
                (vec![elem(u, 1)], elem(u, 0)),
            ],
            default: None,
        };
        let mut table = ValueTable::new();
        let _ = table.fill(&mut tm, &[(f, fun)]);
    }

    #[test]
    #[should_panic(expected = "Unable to find a representative")]
    fn test_unknown_value_panics() {
        let (mut tm, mut table, u, _) = setup();
        let c5 = tm.constant(u, 5).unwrap();
        table.get_value_rep(&mut tm, c5);
    }
}
