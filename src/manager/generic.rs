use num_rational::BigRational;
use num_traits::One;

use super::TermManager;
use crate::{
    error::TermError,
    poly::BufferPool,
    terms::{Term, TermKind},
    types::TypeId,
};

/// The two sides of an (in)equality pushed through an if-then-else:
/// `op(a, b)` is `ite(cond, op(left1, left2), op(right1, right2))`.
pub(crate) struct Lifted {
    pub cond: Term,
    pub left1: Term,
    pub left2: Term,
    pub right1: Term,
    pub right2: Term,
}

/// If-then-else, equalities, functions, tuples and quantifiers.
impl TermManager {
    pub fn ite(&mut self, c: Term, t: Term, e: Term) -> Result<Term, TermError> {
        let r = self
            .check_boolean(c)
            .and_then(|_| self.check_compatible(t, e));
        self.record(r)?;
        let (tau, sigma) = (self.terms.type_of(t), self.terms.type_of(e));
        let Some(tau) = self.types.supertype(tau, sigma) else {
            unreachable!("compatible types without supertype")
        };
        Ok(self.mk_ite(c, t, e, tau))
    }

    pub fn eq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_compatible(t1, t2))?;
        Ok(self.mk_eq(t1, t2))
    }

    pub fn neq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_compatible(t1, t2))?;
        Ok(self.mk_neq(t1, t2))
    }

    pub fn distinct(&mut self, ts: &[Term]) -> Result<Term, TermError> {
        self.record(self.check_distinct(ts))?;
        Ok(self.mk_distinct(ts.to_vec()))
    }

    pub fn app(&mut self, f: Term, args: &[Term]) -> Result<Term, TermError> {
        self.record(self.check_application(f, args))?;
        Ok(self.mk_app(f, args))
    }

    pub fn update(&mut self, f: Term, args: &[Term], v: Term) -> Result<Term, TermError> {
        self.record(self.check_update(f, args, v))?;
        Ok(self.mk_update(f, args, v))
    }

    pub fn tuple(&mut self, args: &[Term]) -> Result<Term, TermError> {
        let r = Self::check_positive(args.len() as i64)
            .and_then(|_| Self::check_arity(args.len()))
            .and_then(|_| self.check_good_terms(args));
        self.record(r)?;
        Ok(self.mk_tuple(args))
    }

    /// Component `i` of the tuple `t`, counting from 0.
    pub fn select(&mut self, t: Term, i: u32) -> Result<Term, TermError> {
        self.record(self.check_select(t, i).map(|_| ()))?;
        Ok(self.mk_select(t, i))
    }

    /// The tuple `t` with component `i` replaced by `v`.
    pub fn tuple_update(&mut self, t: Term, i: u32, v: Term) -> Result<Term, TermError> {
        self.record(self.check_tuple_update(t, i, v))?;
        Ok(self.mk_tuple_update(t, i, v))
    }

    pub fn forall(&mut self, vars: &[Term], body: Term) -> Result<Term, TermError> {
        let mut vars = vars.to_vec();
        vars.sort();
        self.record(self.check_quantified(&vars, body))?;
        Ok(self.mk_forall(&vars, body))
    }

    /// `exists vars. body`, represented as `not (forall vars. not body)`.
    pub fn exists(&mut self, vars: &[Term], body: Term) -> Result<Term, TermError> {
        let mut vars = vars.to_vec();
        vars.sort();
        self.record(self.check_quantified(&vars, body))?;
        Ok(!self.mk_forall(&vars, !body))
    }

    /* If-then-else */

    /// `ite(c, t, e)` of type `tau`, the supertype of the branches.
    pub(crate) fn mk_ite(&mut self, mut c: Term, mut t: Term, mut e: Term, tau: TypeId) -> Term {
        if tau == TypeId::BOOL {
            return self.mk_bool_ite(c, t, e);
        }
        if t == e || c == Term::TRUE {
            return t;
        }
        if c == Term::FALSE {
            return e;
        }
        if c.is_neg() {
            c = !c;
            std::mem::swap(&mut t, &mut e);
        }
        if self.options.factor_ite && tau == TypeId::INT {
            let polys = matches!(self.terms.kind(t), TermKind::ArithPoly(_))
                && matches!(self.terms.kind(e), TermKind::ArithPoly(_));
            if polys {
                return self.mk_integer_poly_ite(c, t, e);
            }
        }
        self.terms.intern(TermKind::Ite(c, t, e), tau)
    }

    /// `ite(c, a*p, a*q)` becomes `a * ite(c, p, q)` where `a` is the gcd of the coefficients of both polynomials.
    fn mk_integer_poly_ite(&mut self, c: Term, t: Term, e: Term) -> Term {
        self.with_buffer(BufferPool::arith, |m, b| {
            b.set_term(&m.terms, t);
            let g1 = b.integer_gcd();
            b.set_term(&m.terms, e);
            let g2 = b.integer_gcd();
            let gcd = match (g1, g2) {
                (Some(g1), Some(g2)) => num_integer::Integer::gcd(&g1, &g2),
                _ => return m.terms.intern(TermKind::Ite(c, t, e), TypeId::INT),
            };
            let gcd = BigRational::from_integer(gcd);
            if gcd.is_one() {
                return m.terms.intern(TermKind::Ite(c, t, e), TypeId::INT);
            }
            b.set_term(&m.terms, t);
            b.div_const(&gcd);
            let t1 = m.finalize_arith(b);
            b.set_term(&m.terms, e);
            b.div_const(&gcd);
            let e1 = m.finalize_arith(b);
            let ite = m.terms.intern(TermKind::Ite(c, t1, e1), TypeId::INT);
            b.set_term(&m.terms, ite);
            b.mul_const(&gcd);
            m.finalize_arith(b)
        })
    }

    /// Recognizes the operands of a binary atom that can be lifted over an if-then-else:
    /// both are `ite` with the same condition, or exactly one of them is an `ite`.
    pub(crate) fn check_for_lift_if(&self, t1: Term, t2: Term) -> Option<Lifted> {
        match (self.terms.kind(t1), self.terms.kind(t2)) {
            (TermKind::Ite(c1, a1, b1), TermKind::Ite(c2, a2, b2)) => {
                if c1 == c2 {
                    Some(Lifted {
                        cond: *c1,
                        left1: *a1,
                        left2: *a2,
                        right1: *b1,
                        right2: *b2,
                    })
                } else {
                    None
                }
            }
            (TermKind::Ite(c, a, b), _) => Some(Lifted {
                cond: *c,
                left1: *a,
                left2: t2,
                right1: *b,
                right2: t2,
            }),
            (_, TermKind::Ite(c, a, b)) => Some(Lifted {
                cond: *c,
                left1: t1,
                left2: *a,
                right1: t1,
                right2: *b,
            }),
            _ => None,
        }
    }

    /* Equalities */

    pub(crate) fn mk_eq(&mut self, t1: Term, t2: Term) -> Term {
        let tau = self.terms.type_of(t1);
        if tau == TypeId::BOOL {
            return self.mk_iff(t1, t2);
        }
        if self.types.is_arithmetic(tau) {
            return self.mk_arith_eq(t1, t2);
        }
        if self.types.is_bitvector(tau) {
            return self.mk_bveq(t1, t2);
        }
        if t1 == t2 {
            return Term::TRUE;
        }
        if self.disequal_terms(t1, t2) {
            return Term::FALSE;
        }
        let (l, r) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        self.terms.intern(TermKind::Eq(l, r), TypeId::BOOL)
    }

    pub(crate) fn mk_neq(&mut self, t1: Term, t2: Term) -> Term {
        if self.terms.type_of(t1) == TypeId::BOOL {
            return self.mk_xor2(t1, t2);
        }
        !self.mk_eq(t1, t2)
    }

    pub(crate) fn mk_distinct(&mut self, mut ts: Vec<Term>) -> Term {
        match ts.len() {
            0 | 1 => return Term::TRUE,
            2 => return self.mk_neq(ts[0], ts[1]),
            _ => {}
        }
        let tau = self.terms.type_of(ts[0]);
        if let Some(card) = self.types.card(tau) {
            if ts.len() as u64 > card {
                return Term::FALSE;
            }
        }
        ts.sort();
        if ts.windows(2).any(|w| w[0] == w[1]) {
            return Term::FALSE;
        }
        if self.pairwise_disequal(&ts) {
            return Term::TRUE;
        }
        self.terms.intern(TermKind::Distinct(ts), TypeId::BOOL)
    }

    /* Functions */

    /// `f(args)`. Applications of updates are simplified:
    /// `update(g, args, v)(args)` is `v`, and `update(g, xs, v)(args)` is `g(args)` when `args` and `xs` are pairwise disequal.
    pub(crate) fn mk_app(&mut self, mut f: Term, args: &[Term]) -> Term {
        loop {
            let (g, xs, v) = match self.terms.kind(f) {
                TermKind::Update(g, xs, v) => (*g, xs.clone(), *v),
                _ => break,
            };
            if xs.as_slice() == args {
                return v;
            }
            if self.disequal_term_arrays(&xs, args) {
                f = g;
            } else {
                break;
            }
        }
        let tau = self.terms.type_of(f);
        let range = self.types.function_range(tau).unwrap_or(TypeId::NULL);
        self.terms.intern(TermKind::App(f, args.to_vec()), range)
    }

    pub(crate) fn mk_update(&mut self, f: Term, args: &[Term], v: Term) -> Term {
        let f = match self.terms.kind(f) {
            TermKind::Update(g, xs, _) if xs.as_slice() == args => *g,
            _ => f,
        };
        let tau = self.terms.type_of(f);
        self.terms
            .intern(TermKind::Update(f, args.to_vec(), v), tau)
    }

    /* Tuples */

    /// `tuple(select(0, x), ..., select(n-1, x))` is `x`.
    pub(crate) fn mk_tuple(&mut self, args: &[Term]) -> Term {
        if let Some(x) = self.tuple_source(args) {
            return x;
        }
        let comps: Vec<TypeId> = args.iter().map(|t| self.terms.type_of(*t)).collect();
        let tau = self.types.tuple(comps);
        self.terms.intern(TermKind::Tuple(args.to_vec()), tau)
    }

    fn tuple_source(&self, args: &[Term]) -> Option<Term> {
        let x = match self.terms.kind(*args.first()?) {
            TermKind::Select(0, x) if args[0].is_pos() => *x,
            _ => return None,
        };
        let arity = self.types.tuple_components(self.terms.type_of(x))?.len();
        if arity != args.len() {
            return None;
        }
        for (i, t) in args.iter().enumerate() {
            match self.terms.kind(*t) {
                TermKind::Select(j, y) if t.is_pos() && *j as usize == i && *y == x => {}
                _ => return None,
            }
        }
        Some(x)
    }

    pub(crate) fn mk_select(&mut self, t: Term, i: u32) -> Term {
        if let TermKind::Tuple(args) = self.terms.kind(t) {
            return args[i as usize];
        }
        let tau = self
            .types
            .tuple_components(self.terms.type_of(t))
            .and_then(|c| c.get(i as usize).copied())
            .unwrap_or(TypeId::NULL);
        self.terms.intern(TermKind::Select(i, t), tau)
    }

    pub(crate) fn mk_tuple_update(&mut self, t: Term, i: u32, v: Term) -> Term {
        let args: Vec<Term> = match self.terms.kind(t) {
            TermKind::Tuple(args) => args.clone(),
            _ => {
                let n = self
                    .types
                    .tuple_components(self.terms.type_of(t))
                    .map_or(0, |c| c.len());
                (0..n as u32).map(|j| self.mk_select(t, j)).collect()
            }
        };
        let mut args = args;
        args[i as usize] = v;
        self.mk_tuple(&args)
    }

    /* Quantifiers */

    /// `forall vars. body`; `vars` must be sorted.
    pub(crate) fn mk_forall(&mut self, vars: &[Term], body: Term) -> Term {
        if body == Term::TRUE || body == Term::FALSE {
            return body;
        }
        self.terms
            .intern(TermKind::Forall(vars.to_vec(), body), TypeId::BOOL)
    }
}
