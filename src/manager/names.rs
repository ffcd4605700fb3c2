use super::TermManager;
use crate::{
    error::TermError,
    terms::{Term, TermKind},
    types::TypeId,
};

/// Names and introspection.
impl TermManager {
    /* Names */

    /// Binds `name` to `tau`. An earlier binding of `name` is hidden until this one is removed.
    pub fn set_type_name(&mut self, tau: TypeId, name: &str) -> Result<(), TermError> {
        self.record(self.check_good_type(tau, None))?;
        self.type_names.set(name, tau);
        Ok(())
    }

    /// Binds `name` to `t`. An earlier binding of `name` is hidden until this one is removed.
    pub fn set_term_name(&mut self, t: Term, name: &str) -> Result<(), TermError> {
        self.record(self.check_good_term(t))?;
        self.term_names.set(name, t);
        Ok(())
    }

    /// Removes the most recent binding of `name` and returns the type it was bound to.
    pub fn remove_type_name(&mut self, name: &str) -> Option<TypeId> {
        self.type_names.remove(name)
    }

    pub fn remove_term_name(&mut self, name: &str) -> Option<Term> {
        self.term_names.remove(name)
    }

    pub fn get_type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_names.get(name)
    }

    pub fn get_term_by_name(&self, name: &str) -> Option<Term> {
        self.term_names.get(name)
    }

    /// The first name given to `tau`.
    pub fn type_name(&self, tau: TypeId) -> Option<&str> {
        self.type_names.base_name(tau)
    }

    /// The first name given to `t`.
    pub fn term_name(&self, t: Term) -> Option<&str> {
        self.term_names.base_name(t)
    }

    /* Introspection */

    pub fn type_of(&mut self, t: Term) -> Result<TypeId, TermError> {
        self.record(self.check_good_term(t))?;
        Ok(self.terms.type_of(t))
    }

    /// Width of the bit-vector term `t`.
    pub fn bitsize(&mut self, t: Term) -> Result<u32, TermError> {
        self.record(self.check_bv(t))?;
        Ok(self.bitsize_of(t))
    }

    pub(crate) fn bitsize_of(&self, t: Term) -> u32 {
        self.types.bv_size(self.terms.type_of(t))
    }

    fn has_type(&self, t: Term, pred: impl Fn(TypeId) -> bool) -> bool {
        self.terms.is_good(t) && pred(self.terms.type_of(t))
    }

    pub fn is_bool(&self, t: Term) -> bool {
        self.has_type(t, |tau| tau == TypeId::BOOL)
    }

    pub fn is_int(&self, t: Term) -> bool {
        self.has_type(t, |tau| tau == TypeId::INT)
    }

    pub fn is_real(&self, t: Term) -> bool {
        self.has_type(t, |tau| tau == TypeId::REAL)
    }

    pub fn is_arithmetic(&self, t: Term) -> bool {
        self.has_type(t, |tau| self.types.is_arithmetic(tau))
    }

    pub fn is_bitvector(&self, t: Term) -> bool {
        self.has_type(t, |tau| self.types.is_bitvector(tau))
    }

    pub fn is_tuple(&self, t: Term) -> bool {
        self.has_type(t, |tau| self.types.is_tuple(tau))
    }

    pub fn is_function(&self, t: Term) -> bool {
        self.has_type(t, |tau| self.types.is_function(tau))
    }

    /// Returns true for constants, uninterpreted symbols and variables.
    pub fn is_atomic(&self, t: Term) -> bool {
        self.terms.is_good(t) && self.terms.kind(t).is_atomic()
    }

    /// The kind of `t`, `None` if `t` is not a valid term.
    pub fn kind(&self, t: Term) -> Option<&TermKind> {
        if self.terms.is_good(t) {
            Some(self.terms.kind(t))
        } else {
            None
        }
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn num_types(&self) -> usize {
        self.types.len()
    }
}
