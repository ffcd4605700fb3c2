//! Skolemization of existential quantifiers.
//!
//! Existentials are the quantifiers in negative position, i.e., `not (forall x. body)`.
//! Each of them is replaced by a fresh function of the universals in scope, and universals are kept where they are.

use indexmap::IndexMap;

use crate::{
    error::TermError,
    manager::TermManager,
    subst::TermSubst,
    terms::{Term, TermKind},
};

/// Records the Skolem function chosen for every existential variable.
#[derive(Debug, Default)]
pub struct Analyzer {
    /// Existential variable to its Skolem function, or to itself at top level
    existentials: IndexMap<Term, Term>,
    num_skolem: usize,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn existentials(&self) -> &IndexMap<Term, Term> {
        &self.existentials
    }

    /// The Skolem function of `x`, or `x` itself if it was bound at top level.
    pub fn skolem_of(&self, x: Term) -> Option<Term> {
        self.existentials.get(&x).copied()
    }

    /// Number of Skolem functions created so far.
    pub fn num_skolem(&self) -> usize {
        self.num_skolem
    }

    fn record(&mut self, x: Term, f: Term) {
        if let Some(old) = self.existentials.insert(x, f) {
            panic!("Variable {} skolemized twice (was {}, now {})", x, old, f);
        }
    }
}

/// Rewrites formulas such that they contain no existential quantifier.
pub struct Skolemizer<'a> {
    manager: &'a mut TermManager,
    analyzer: &'a mut Analyzer,
    /// Rewrite boolean if-then-else into implications
    flatten_ite: bool,
    /// Rewrite boolean equalities into implications
    flatten_iff: bool,

    /// Universal variables in scope, outermost first
    uvars: Vec<Term>,
    /// Rewritten terms in the current scope of universals
    cache: IndexMap<Term, Term>,
}

impl<'a> Skolemizer<'a> {
    pub fn new(
        manager: &'a mut TermManager,
        analyzer: &'a mut Analyzer,
        flatten_ite: bool,
        flatten_iff: bool,
    ) -> Self {
        Self {
            manager,
            analyzer,
            flatten_ite,
            flatten_iff,
            uvars: Vec::new(),
            cache: IndexMap::new(),
        }
    }

    /// Skolemizes the boolean term `t`.
    pub fn skolemize(&mut self, t: Term) -> Result<Term, TermError> {
        let check = self.manager.check_boolean(t);
        self.manager.record(check)?;
        debug_assert!(self.uvars.is_empty());
        self.visit(t)
    }

    fn visit(&mut self, t: Term) -> Result<Term, TermError> {
        if let Some(r) = self.cache.get(&t) {
            return Ok(*r);
        }
        let neg = t.is_neg();
        let kind = self.manager.terms().kind(t).clone();
        let r = match kind {
            _ if kind.is_atomic() => t,
            TermKind::Ite(c, a, b) if self.flatten_ite && self.manager.is_bool(a) => {
                let (a, b) = (a.with_polarity(neg), b.with_polarity(neg));
                let l = self.manager.mk_implies(c, a);
                let r = self.manager.mk_implies(!c, b);
                let l = self.visit(l)?;
                let r = self.visit(r)?;
                self.manager.mk_and2(l, r)
            }
            TermKind::Eq(a, b) if self.flatten_iff && self.manager.is_bool(a) => {
                let ab = self.manager.mk_implies(a, b);
                let ba = self.manager.mk_implies(b, a);
                if neg {
                    let l = self.visit(!ab)?;
                    let r = self.visit(!ba)?;
                    self.manager.mk_or2(l, r)
                } else {
                    let l = self.visit(ab)?;
                    let r = self.visit(ba)?;
                    self.manager.mk_and2(l, r)
                }
            }
            TermKind::Or(args) if neg => {
                let mut conj = Vec::with_capacity(args.len());
                for a in args {
                    conj.push(self.visit(!a)?);
                }
                self.manager.mk_and(conj)
            }
            TermKind::Forall(vars, body) if neg => {
                let body = self.introduce_skolems(&vars, body)?;
                self.visit(!body)?
            }
            TermKind::Forall(vars, body) => {
                self.uvars.extend(&vars);
                let outer = std::mem::take(&mut self.cache);
                let body = self.visit(body);
                self.cache = outer;
                self.uvars.truncate(self.uvars.len() - vars.len());
                let body = body?;
                self.manager.mk_forall(&vars, body)
            }
            _ => {
                let mut children = Vec::new();
                for c in kind.children() {
                    children.push(self.visit(c)?);
                }
                self.manager
                    .rebuild(t.unsigned(), &children)?
                    .with_polarity(neg)
            }
        };
        self.cache.insert(t, r);
        Ok(r)
    }

    /// Replaces the existential variables `vars` in `body` by Skolem terms over the universals in scope.
    fn introduce_skolems(&mut self, vars: &[Term], body: Term) -> Result<Term, TermError> {
        if self.uvars.is_empty() {
            for x in vars {
                log::debug!("Existential {} at top level", x);
                self.analyzer.record(*x, *x);
            }
            return Ok(body);
        }
        let domain: Vec<_> = self
            .uvars
            .iter()
            .map(|u| self.manager.terms().type_of(*u))
            .collect();
        let mut pairs = Vec::with_capacity(vars.len());
        for x in vars {
            let range = self.manager.terms().type_of(*x);
            let fty = self.manager.function_type(&domain, range)?;
            let f = self.manager.new_uninterpreted(fty)?;
            let base = match self.manager.term_name(*x) {
                Some(name) => name.to_string(),
                None => x.to_string(),
            };
            let name = format!("skolem{}_{}", self.analyzer.num_skolem, base);
            self.analyzer.num_skolem += 1;
            self.manager.set_term_name(f, &name)?;
            log::debug!("Skolemizing {} as {}", x, name);
            self.analyzer.record(*x, f);
            let app = self.manager.mk_app(f, &self.uvars);
            pairs.push((*x, app));
        }
        let mut subst = TermSubst::new(self.manager, &pairs)?;
        subst.apply(body, self.manager)
    }
}
