use indexmap::IndexMap;

use super::{Term, TermKind};
use crate::types::TypeId;

/// The term table.
///
/// Every term is a [`TermKind`] together with its type.
/// Kinds are hash-consed: the index of a term is its position in the registry, and interning the same kind twice yields the same index.
#[derive(Debug, Clone)]
pub struct TermTable {
    registry: IndexMap<TermKind, TypeId>,
    /// Counter for fresh uninterpreted symbols and variables
    next_serial: u32,
}

impl Default for TermTable {
    fn default() -> Self {
        let mut registry = IndexMap::new();
        registry.insert(TermKind::True, TypeId::BOOL);
        Self {
            registry,
            next_serial: 0,
        }
    }
}

impl TermTable {
    /// Returns the positive reference to the term with the given kind, creating it if necessary.
    /// The caller is responsible for the kind being in normal form and `tau` being its type.
    pub(crate) fn intern(&mut self, kind: TermKind, tau: TypeId) -> Term {
        if let Some(idx) = self.registry.get_index_of(&kind) {
            return Term::pos(idx);
        }
        let (idx, _) = self.registry.insert_full(kind, tau);
        log::trace!("New term t!{}: {:?}", idx, self.registry.get_index(idx).map(|(k, _)| k));
        Term::pos(idx)
    }

    /// Returns the term with the given kind, if it exists.
    pub fn find(&self, kind: &TermKind) -> Option<Term> {
        self.registry.get_index_of(kind).map(Term::pos)
    }

    /// Creates a new uninterpreted symbol of type `tau`.
    pub(crate) fn fresh_uninterpreted(&mut self, tau: TypeId) -> Term {
        let serial = self.next_serial();
        self.intern(TermKind::Uninterpreted(tau, serial), tau)
    }

    /// Creates a new variable of type `tau`.
    pub(crate) fn fresh_variable(&mut self, tau: TypeId) -> Term {
        let serial = self.next_serial();
        self.intern(TermKind::Variable(tau, serial), tau)
    }

    fn next_serial(&mut self) -> u32 {
        let s = self.next_serial;
        self.next_serial += 1;
        s
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns true if `t` refers to a term in this table.
    /// Negative references are only valid for Boolean terms.
    pub fn is_good(&self, t: Term) -> bool {
        if t.is_null() || t.index() >= self.registry.len() {
            return false;
        }
        t.is_pos() || self.type_of(t) == TypeId::BOOL
    }

    /// The kind of the term, regardless of polarity.
    /// Panics if `t` is not in the table.
    pub fn kind(&self, t: Term) -> &TermKind {
        match self.registry.get_index(t.index()) {
            Some((kind, _)) => kind,
            None => panic!("invalid term reference {}", t),
        }
    }

    pub fn type_of(&self, t: Term) -> TypeId {
        match self.registry.get_index(t.index()) {
            Some((_, tau)) => *tau,
            None => panic!("invalid term reference {}", t),
        }
    }

    /// Iterates over the positive references of all terms in the table.
    pub fn iter(&self) -> impl Iterator<Item = (Term, &TermKind, TypeId)> {
        self.registry
            .iter()
            .enumerate()
            .map(|(i, (k, tau))| (Term::pos(i), k, *tau))
    }
}
