//! The term manager: one context object owning the type and term tables, the name tables, the buffer pool and the last-error record.
//!
//! Every public constructor validates its arguments first and returns a [`TermError`] without touching any table when a check fails.
//! Internal constructors (`mk_*`) assume well-typed arguments and apply the simplification rules.

use indexmap::IndexMap;

use crate::{
    error::TermError,
    options::Options,
    poly::{BufferList, BufferPool, Scratch},
    terms::{NameTable, Term, TermKind, TermTable},
    types::{TypeId, TypeTable},
};

mod arith;
mod boolean;
mod bv;
mod bvbounds;
mod checks;
mod diseq;
mod generic;
mod leaves;
mod names;
mod types;

#[derive(Debug, Default)]
pub struct TermManager {
    types: TypeTable,
    terms: TermTable,

    /// Names of types and terms
    type_names: NameTable<TypeId>,
    term_names: NameTable<Term>,

    /// Scratch buffers for polynomial and bit-vector constructors
    pool: BufferPool,

    options: Options,

    /// First error since the last call to `clear_error`
    last_error: Option<TermError>,
}

impl TermManager {
    /// Creates a manager with the default options.
    pub fn init() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Discards all types, terms and names, and drains the buffer pool.
    /// All handles obtained before are invalid afterwards.
    pub fn cleanup(&mut self) {
        log::debug!(
            "Cleanup: dropping {} terms, {} types, {} free buffers",
            self.terms.len(),
            self.types.len(),
            self.pool.free()
        );
        self.types = TypeTable::default();
        self.terms = TermTable::default();
        self.type_names.clear();
        self.term_names.clear();
        self.pool.drain();
        self.last_error = None;
    }

    /* Error record */

    /// The first error recorded since the last [`clear_error`](Self::clear_error).
    pub fn last_error(&self) -> Option<&TermError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Stores the error of `r`, if any, unless an error is already recorded.
    pub(crate) fn record<T>(&mut self, r: Result<T, TermError>) -> Result<T, TermError> {
        if let Err(e) = &r {
            log::debug!("Constructor failed: {} ({})", e, e.code());
            if self.last_error.is_none() {
                self.last_error = Some(e.clone());
            }
        }
        r
    }

    /* Tables */

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn terms(&self) -> &TermTable {
        &self.terms
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Leases a buffer from the list selected by `list`, runs `f` with it, and returns it to the pool.
    pub(crate) fn with_buffer<B: Scratch, R>(
        &mut self,
        list: fn(&mut BufferPool) -> &mut BufferList<B>,
        f: impl FnOnce(&mut Self, &mut B) -> R,
    ) -> R {
        let mut buffer = list(&mut self.pool).take();
        let r = f(self, &mut buffer);
        list(&mut self.pool).give(buffer);
        r
    }

    /* Rebuilding */

    /// Rebuilds the positive term `t` with new children through the simplifying constructors.
    ///
    /// `children` must have the shape of [`TermKind::children`] and be type-compatible with the old ones.
    /// The result is positive if `t` was; reapplying the polarity is up to the caller.
    /// Fails with `DegreeOverflow` when a rebuilt polynomial would exceed `MAX_DEGREE`.
    pub(crate) fn rebuild(&mut self, t: Term, children: &[Term]) -> Result<Term, TermError> {
        let t = t.unsigned();
        let kind = self.terms.kind(t).clone();
        if children == kind.children().as_slice() {
            return Ok(t);
        }
        let tau = self.terms.type_of(t);
        let r = match kind {
            TermKind::True
            | TermKind::Constant(..)
            | TermKind::Uninterpreted(..)
            | TermKind::Variable(..)
            | TermKind::ArithConst(_)
            | TermKind::BvConst64 { .. }
            | TermKind::BvConst { .. } => t,
            TermKind::PowerProduct(_)
            | TermKind::ArithPoly(_)
            | TermKind::BvPoly64 { .. }
            | TermKind::BvPoly { .. } => {
                let map: IndexMap<Term, Term> = kind
                    .children()
                    .into_iter()
                    .zip(children.iter().copied())
                    .collect();
                let check = self.check_substituted_degree(&kind, &map);
                self.record(check)?;
                self.rebuild_polynomial(&kind, tau, &map)
            }
            TermKind::BitSelect(i, _) => self.mk_bit_of(children[0], i),
            TermKind::BvArray(_) => self.bits_term(children.to_vec()),
            TermKind::BvBinary(op, _, _) => self.mk_bvbinary(op, children[0], children[1]),
            TermKind::Ite(..) => {
                let (c, a, b) = (children[0], children[1], children[2]);
                let (ta, tb) = (self.terms.type_of(a), self.terms.type_of(b));
                let sigma = self.types.supertype(ta, tb).unwrap_or(tau);
                self.mk_ite(c, a, b, sigma)
            }
            TermKind::App(..) => self.mk_app(children[0], &children[1..]),
            TermKind::Update(..) => {
                let n = children.len();
                self.mk_update(children[0], &children[1..n - 1], children[n - 1])
            }
            TermKind::Tuple(_) => self.mk_tuple(children),
            TermKind::Select(i, _) => self.mk_select(children[0], i),
            TermKind::Forall(..) => {
                let n = children.len();
                self.mk_forall(&children[..n - 1], children[n - 1])
            }
            TermKind::Eq(..) => self.mk_eq(children[0], children[1]),
            TermKind::Distinct(_) => self.mk_distinct(children.to_vec()),
            TermKind::Or(_) => self.mk_or(children.to_vec()),
            TermKind::Xor(_) => self.mk_xor(children.to_vec()),
            TermKind::ArithEq0(_) => self.mk_arith_eq0(children[0]),
            TermKind::ArithGe0(_) => self.mk_arith_geq0(children[0]),
            TermKind::ArithBinEq(..) => self.mk_arith_eq(children[0], children[1]),
            TermKind::BvEq(..) => self.mk_bveq(children[0], children[1]),
            TermKind::BvGe(..) => self.mk_bvge(children[0], children[1]),
            TermKind::BvSge(..) => self.mk_bvsge(children[0], children[1]),
        };
        Ok(r)
    }
}
