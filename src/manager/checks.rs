use indexmap::IndexMap;

use super::TermManager;
use crate::{
    error::TermError,
    options::{MAX_ARITY, MAX_BVSIZE, MAX_DEGREE, MAX_VARS},
    terms::{PowerProduct, Term, TermKind},
    types::{TypeId, TypeKind},
};

type Check = Result<(), TermError>;

/// Argument checks shared by the public constructors.
/// None of them modifies the manager.
impl TermManager {
    pub(crate) fn check_positive(n: i64) -> Check {
        if n <= 0 {
            Err(TermError::PosIntRequired { badval: n })
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_nonneg(n: i64) -> Check {
        if n < 0 {
            Err(TermError::NonnegIntRequired { badval: n })
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_arity(n: usize) -> Check {
        if n > MAX_ARITY {
            Err(TermError::TooManyArguments { badval: n as i64 })
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_maxvars(n: usize) -> Check {
        if n > MAX_VARS {
            Err(TermError::TooManyVars { badval: n as i64 })
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_maxbvsize(n: u64) -> Check {
        if n > MAX_BVSIZE as u64 {
            Err(TermError::MaxBvSizeExceeded { badval: n as i64 })
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_maxdegree(d: u64) -> Check {
        if d > MAX_DEGREE as u64 {
            Err(TermError::DegreeOverflow { badval: d as i64 })
        } else {
            Ok(())
        }
    }

    /* Types */

    pub(crate) fn check_good_type(&self, tau: TypeId, index: Option<usize>) -> Check {
        if self.types.is_good(tau) {
            Ok(())
        } else {
            Err(TermError::InvalidType { type1: tau, index })
        }
    }

    pub(crate) fn check_good_types(&self, taus: &[TypeId]) -> Check {
        taus.iter()
            .enumerate()
            .try_for_each(|(i, tau)| self.check_good_type(*tau, Some(i)))
    }

    /// Checks that `i` is a valid constant index for `tau`.
    pub(crate) fn check_good_constant(&self, tau: TypeId, i: i64) -> Check {
        self.check_good_type(tau, None)?;
        match self.types.kind(tau) {
            TypeKind::Scalar { card, .. } if i < 0 || i >= *card as i64 => {
                Err(TermError::InvalidConstantIndex {
                    type1: tau,
                    badval: i,
                })
            }
            TypeKind::Scalar { .. } => Ok(()),
            TypeKind::Uninterpreted(_) if i < 0 || i > u32::MAX as i64 => {
                Err(TermError::InvalidConstantIndex {
                    type1: tau,
                    badval: i,
                })
            }
            TypeKind::Uninterpreted(_) => Ok(()),
            _ => Err(TermError::ScalarOrUtypeRequired { type1: tau }),
        }
    }

    /* Terms */

    pub(crate) fn check_good_term(&self, t: Term) -> Check {
        if self.terms.is_good(t) {
            Ok(())
        } else {
            Err(TermError::InvalidTerm {
                term1: t,
                index: None,
            })
        }
    }

    pub(crate) fn check_good_terms(&self, ts: &[Term]) -> Check {
        for (i, t) in ts.iter().enumerate() {
            if !self.terms.is_good(*t) {
                return Err(TermError::InvalidTerm {
                    term1: *t,
                    index: Some(i),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn check_boolean(&self, t: Term) -> Check {
        self.check_good_term(t)?;
        if self.terms.type_of(t) != TypeId::BOOL {
            return Err(TermError::TypeMismatch {
                term1: t,
                type1: TypeId::BOOL,
                index: None,
            });
        }
        Ok(())
    }

    pub(crate) fn check_booleans(&self, ts: &[Term]) -> Check {
        self.check_good_terms(ts)?;
        for (i, t) in ts.iter().enumerate() {
            if self.terms.type_of(*t) != TypeId::BOOL {
                return Err(TermError::TypeMismatch {
                    term1: *t,
                    type1: TypeId::BOOL,
                    index: Some(i),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn check_arith(&self, t: Term) -> Check {
        self.check_good_term(t)?;
        if !self.types.is_arithmetic(self.terms.type_of(t)) {
            return Err(TermError::ArithTermRequired { term1: t });
        }
        Ok(())
    }

    pub(crate) fn check_ariths(&self, ts: &[Term]) -> Check {
        ts.iter().try_for_each(|t| self.check_arith(*t))
    }

    pub(crate) fn check_bv(&self, t: Term) -> Check {
        self.check_good_term(t)?;
        if !self.types.is_bitvector(self.terms.type_of(t)) {
            return Err(TermError::BitvectorRequired { term1: t });
        }
        Ok(())
    }

    /// Both terms are bit-vectors of the same width.
    pub(crate) fn check_same_bv(&self, t1: Term, t2: Term) -> Check {
        self.check_bv(t1)?;
        self.check_bv(t2)?;
        let (tau1, tau2) = (self.terms.type_of(t1), self.terms.type_of(t2));
        if tau1 != tau2 {
            return Err(TermError::IncompatibleBvSizes {
                term1: t1,
                type1: tau1,
                term2: t2,
                type2: tau2,
            });
        }
        Ok(())
    }

    pub(crate) fn check_same_bvs(&self, ts: &[Term]) -> Check {
        match ts.split_first() {
            Some((first, rest)) => {
                self.check_bv(*first)?;
                rest.iter().try_for_each(|t| self.check_same_bv(*first, *t))
            }
            None => Err(TermError::PosIntRequired { badval: 0 }),
        }
    }

    pub(crate) fn check_compatible(&self, t1: Term, t2: Term) -> Check {
        self.check_good_term(t1)?;
        self.check_good_term(t2)?;
        let (tau1, tau2) = (self.terms.type_of(t1), self.terms.type_of(t2));
        if !self.types.compatible(tau1, tau2) {
            return Err(TermError::IncompatibleTypes {
                term1: t1,
                type1: tau1,
                term2: t2,
                type2: tau2,
            });
        }
        Ok(())
    }

    /// Checks that all terms have a common supertype.
    pub(crate) fn check_all_compatible(&self, ts: &[Term]) -> Check {
        self.check_good_terms(ts)?;
        if let Some((first, rest)) = ts.split_first() {
            for t in rest {
                self.check_compatible(*first, *t)?;
            }
        }
        Ok(())
    }

    /// Checks `f(args)`.
    pub(crate) fn check_application(&self, f: Term, args: &[Term]) -> Check {
        Self::check_positive(args.len() as i64)?;
        Self::check_arity(args.len())?;
        self.check_good_term(f)?;
        self.check_good_terms(args)?;
        let tau = self.terms.type_of(f);
        let domain = match self.types.function_domain(tau) {
            Some(d) => d,
            None => return Err(TermError::FunctionRequired { term1: f }),
        };
        if domain.len() != args.len() {
            return Err(TermError::WrongNumberOfArguments {
                type1: tau,
                badval: args.len() as i64,
            });
        }
        for (i, (arg, sigma)) in args.iter().zip(domain).enumerate() {
            if !self.types.is_subtype(self.terms.type_of(*arg), *sigma) {
                return Err(TermError::TypeMismatch {
                    term1: *arg,
                    type1: *sigma,
                    index: Some(i),
                });
            }
        }
        Ok(())
    }

    /// Checks `update(f, args, v)`.
    pub(crate) fn check_update(&self, f: Term, args: &[Term], v: Term) -> Check {
        self.check_application(f, args)?;
        self.check_good_term(v)?;
        let tau = self.terms.type_of(f);
        let range = self.types.function_range(tau).unwrap_or(TypeId::NULL);
        if !self.types.is_subtype(self.terms.type_of(v), range) {
            return Err(TermError::TypeMismatch {
                term1: v,
                type1: range,
                index: None,
            });
        }
        Ok(())
    }

    /// Checks that `t` is a tuple with a component `i` and returns the tuple type.
    pub(crate) fn check_select(&self, t: Term, i: u32) -> Result<TypeId, TermError> {
        self.check_good_term(t)?;
        let tau = self.terms.type_of(t);
        match self.types.tuple_components(tau) {
            Some(comps) if (i as usize) < comps.len() => Ok(tau),
            Some(_) => Err(TermError::InvalidTupleIndex {
                type1: tau,
                badval: i as i64,
            }),
            None => Err(TermError::TupleRequired { term1: t }),
        }
    }

    pub(crate) fn check_tuple_update(&self, t: Term, i: u32, v: Term) -> Check {
        let tau = self.check_select(t, i)?;
        self.check_good_term(v)?;
        let sigma = self
            .types
            .tuple_components(tau)
            .and_then(|c| c.get(i as usize).copied())
            .unwrap_or(TypeId::NULL);
        if !self.types.is_subtype(self.terms.type_of(v), sigma) {
            return Err(TermError::TypeMismatch {
                term1: v,
                type1: sigma,
                index: None,
            });
        }
        Ok(())
    }

    /// Checks `distinct(args)`.
    pub(crate) fn check_distinct(&self, args: &[Term]) -> Check {
        Self::check_positive(args.len() as i64)?;
        Self::check_arity(args.len())?;
        self.check_all_compatible(args)
    }

    /// Checks the variables and the body of a quantifier.
    /// `vars` must be sorted.
    pub(crate) fn check_quantified(&self, vars: &[Term], body: Term) -> Check {
        Self::check_positive(vars.len() as i64)?;
        Self::check_maxvars(vars.len())?;
        self.check_good_term(body)?;
        self.check_good_terms(vars)?;
        self.check_boolean(body)?;
        for (i, x) in vars.iter().enumerate() {
            if x.is_neg() || !matches!(self.terms.kind(*x), TermKind::Variable(..)) {
                return Err(TermError::VariableRequired {
                    term1: *x,
                    index: i,
                });
            }
        }
        for (i, w) in vars.windows(2).enumerate() {
            if w[0] == w[1] {
                return Err(TermError::DuplicateVariable {
                    term1: w[1],
                    index: i + 1,
                });
            }
        }
        Ok(())
    }

    /* Degree */

    /// Degree of `t` seen as a polynomial: the total degree of a polynomial or power product, 0 for a constant and 1 otherwise.
    pub(crate) fn term_degree(&self, t: Term) -> u64 {
        match self.terms.kind(t) {
            TermKind::ArithConst(_) | TermKind::BvConst64 { .. } | TermKind::BvConst { .. } => 0,
            TermKind::PowerProduct(pp) => pp.degree(),
            TermKind::ArithPoly(monos) => monos.iter().map(|(_, pp)| pp.degree()).max().unwrap_or(0),
            TermKind::BvPoly64 { monomials, .. } => {
                monomials.iter().map(|(_, pp)| pp.degree()).max().unwrap_or(0)
            }
            TermKind::BvPoly { monomials, .. } => {
                monomials.iter().map(|(_, pp)| pp.degree()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    pub(crate) fn check_product_degree(&self, ts: &[Term]) -> Check {
        Self::check_maxdegree(ts.iter().map(|t| self.term_degree(*t)).sum())
    }

    pub(crate) fn check_power_degree(&self, t: Term, d: u32) -> Check {
        Self::check_maxdegree(self.term_degree(t).saturating_mul(d as u64))
    }

    /// Every monomial of the polynomial `kind` stays within `MAX_DEGREE` once each variable `x` is replaced by `map[x]`.
    pub(crate) fn check_substituted_degree(
        &self,
        kind: &TermKind,
        map: &IndexMap<Term, Term>,
    ) -> Check {
        let monomial_degree = |pp: &PowerProduct| -> u64 {
            pp.iter()
                .map(|(x, e)| {
                    let y = map.get(x).copied().unwrap_or(*x);
                    self.term_degree(y).saturating_mul(u64::from(*e))
                })
                .fold(0, u64::saturating_add)
        };
        let d = match kind {
            TermKind::PowerProduct(pp) => monomial_degree(pp),
            TermKind::ArithPoly(monos) => {
                monos.iter().map(|(_, pp)| monomial_degree(pp)).max().unwrap_or(0)
            }
            TermKind::BvPoly64 { monomials, .. } => {
                monomials.iter().map(|(_, pp)| monomial_degree(pp)).max().unwrap_or(0)
            }
            TermKind::BvPoly { monomials, .. } => {
                monomials.iter().map(|(_, pp)| monomial_degree(pp)).max().unwrap_or(0)
            }
            _ => 0,
        };
        Self::check_maxdegree(d)
    }

    /* Bit-vector arguments */

    pub(crate) fn check_bitshift(&self, t: Term, n: i64) -> Check {
        self.check_bv(t)?;
        Self::check_nonneg(n)?;
        if n > self.bitsize_of(t) as i64 {
            return Err(TermError::InvalidBitshift { badval: n });
        }
        Ok(())
    }

    pub(crate) fn check_extract(&self, t: Term, low: u32, high: u32) -> Check {
        self.check_bv(t)?;
        if low > high || high >= self.bitsize_of(t) {
            return Err(TermError::InvalidBvExtract {
                term1: t,
                low,
                high,
            });
        }
        Ok(())
    }

    pub(crate) fn check_repeat(&self, t: Term, n: i64) -> Check {
        self.check_bv(t)?;
        Self::check_positive(n)?;
        Self::check_maxbvsize((self.bitsize_of(t) as u64).saturating_mul(n as u64))
    }

    pub(crate) fn check_concat(&self, ts: &[Term]) -> Check {
        Self::check_positive(ts.len() as i64)?;
        ts.iter().try_for_each(|t| self.check_bv(*t))?;
        Self::check_maxbvsize(ts.iter().map(|t| self.bitsize_of(*t) as u64).sum())
    }

    pub(crate) fn check_sign_extend(&self, t: Term, n: i64) -> Check {
        self.check_bv(t)?;
        Self::check_nonneg(n)?;
        if self.bitsize_of(t) as i64 + n > MAX_BVSIZE as i64 {
            return Err(TermError::InvalidBvSignExtend { badval: n });
        }
        Ok(())
    }

    pub(crate) fn check_zero_extend(&self, t: Term, n: i64) -> Check {
        self.check_bv(t)?;
        Self::check_nonneg(n)?;
        if self.bitsize_of(t) as i64 + n > MAX_BVSIZE as i64 {
            return Err(TermError::InvalidBvZeroExtend { badval: n });
        }
        Ok(())
    }
}
