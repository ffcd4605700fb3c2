use std::fmt::Display;

use indexmap::IndexSet;
use itertools::Itertools;

/// Handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub(crate) i32);

impl TypeId {
    /// The null sentinel
    pub const NULL: TypeId = TypeId(-1);
    pub const BOOL: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const REAL: TypeId = TypeId(2);

    pub fn index(self) -> usize {
        debug_assert!(self.0 >= 0);
        self.0 as usize
    }

    pub fn is_null(self) -> bool {
        self.0 < 0
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tau!{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Bool,
    Int,
    Real,
    /// Fixed-width bit-vectors
    BitVector(u32),
    /// A finite nominal type with `card` elements.
    /// The `id` makes every declared scalar type distinct.
    Scalar { card: u32, id: u32 },
    /// An opaque, infinite type
    Uninterpreted(u32),
    Tuple(Vec<TypeId>),
    Function { domain: Vec<TypeId>, range: TypeId },
}

/// The type table.
///
/// Structural types are hash-consed: building the same tuple, function or bit-vector type twice yields the same handle.
/// Scalar and uninterpreted types are nominal, each call to [`scalar`](Self::scalar) or [`uninterpreted`](Self::uninterpreted) declares a new one.
#[derive(Debug, Clone)]
pub struct TypeTable {
    registry: IndexSet<TypeKind>,
    /// Counter for nominal types
    next_nominal: u32,
}

impl Default for TypeTable {
    fn default() -> Self {
        let mut registry = IndexSet::new();
        registry.insert(TypeKind::Bool);
        registry.insert(TypeKind::Int);
        registry.insert(TypeKind::Real);
        Self {
            registry,
            next_nominal: 0,
        }
    }
}

impl TypeTable {
    fn intern(&mut self, kind: TypeKind) -> TypeId {
        let (idx, _) = self.registry.insert_full(kind);
        TypeId(idx as i32)
    }

    pub fn bool(&self) -> TypeId {
        TypeId::BOOL
    }

    pub fn int(&self) -> TypeId {
        TypeId::INT
    }

    pub fn real(&self) -> TypeId {
        TypeId::REAL
    }

    pub fn bv(&mut self, n: u32) -> TypeId {
        debug_assert!(n > 0);
        self.intern(TypeKind::BitVector(n))
    }

    pub fn scalar(&mut self, card: u32) -> TypeId {
        debug_assert!(card > 0);
        let id = self.next_nominal;
        self.next_nominal += 1;
        self.intern(TypeKind::Scalar { card, id })
    }

    pub fn uninterpreted(&mut self) -> TypeId {
        let id = self.next_nominal;
        self.next_nominal += 1;
        self.intern(TypeKind::Uninterpreted(id))
    }

    pub fn tuple(&mut self, components: Vec<TypeId>) -> TypeId {
        debug_assert!(!components.is_empty());
        self.intern(TypeKind::Tuple(components))
    }

    pub fn function(&mut self, domain: Vec<TypeId>, range: TypeId) -> TypeId {
        debug_assert!(!domain.is_empty());
        self.intern(TypeKind::Function { domain, range })
    }

    /* Queries */

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns true if the handle denotes a type in this table.
    pub fn is_good(&self, tau: TypeId) -> bool {
        tau.0 >= 0 && (tau.0 as usize) < self.registry.len()
    }

    /// Returns the kind of the type.
    /// Panics if the handle is invalid.
    pub fn kind(&self, tau: TypeId) -> &TypeKind {
        self.registry
            .get_index(tau.index())
            .unwrap_or_else(|| panic!("invalid type handle {}", tau))
    }

    pub fn is_bool(&self, tau: TypeId) -> bool {
        tau == TypeId::BOOL
    }

    pub fn is_int(&self, tau: TypeId) -> bool {
        tau == TypeId::INT
    }

    pub fn is_arithmetic(&self, tau: TypeId) -> bool {
        tau == TypeId::INT || tau == TypeId::REAL
    }

    pub fn is_bitvector(&self, tau: TypeId) -> bool {
        matches!(self.kind(tau), TypeKind::BitVector(_))
    }

    pub fn is_tuple(&self, tau: TypeId) -> bool {
        matches!(self.kind(tau), TypeKind::Tuple(_))
    }

    pub fn is_function(&self, tau: TypeId) -> bool {
        matches!(self.kind(tau), TypeKind::Function { .. })
    }

    pub fn is_scalar(&self, tau: TypeId) -> bool {
        matches!(self.kind(tau), TypeKind::Scalar { .. })
    }

    pub fn is_uninterpreted(&self, tau: TypeId) -> bool {
        matches!(self.kind(tau), TypeKind::Uninterpreted(_))
    }

    /// Width of a bit-vector type, 0 for every other type.
    pub fn bv_size(&self, tau: TypeId) -> u32 {
        match self.kind(tau) {
            TypeKind::BitVector(n) => *n,
            _ => 0,
        }
    }

    pub fn tuple_components(&self, tau: TypeId) -> Option<&[TypeId]> {
        match self.kind(tau) {
            TypeKind::Tuple(comps) => Some(comps),
            _ => None,
        }
    }

    pub fn function_domain(&self, tau: TypeId) -> Option<&[TypeId]> {
        match self.kind(tau) {
            TypeKind::Function { domain, .. } => Some(domain),
            _ => None,
        }
    }

    pub fn function_range(&self, tau: TypeId) -> Option<TypeId> {
        match self.kind(tau) {
            TypeKind::Function { range, .. } => Some(*range),
            _ => None,
        }
    }

    /* Subtyping */

    /// The least common supertype of `tau` and `sigma`, if any.
    ///
    /// - `Real` if one operand is `Int` and the other is `Int` or `Real`
    /// - the common handle if both are equal
    /// - component-wise for tuples, and for functions with the same domain
    /// - `None` otherwise
    pub fn supertype(&mut self, tau: TypeId, sigma: TypeId) -> Option<TypeId> {
        if tau == sigma {
            return Some(tau);
        }
        if self.is_arithmetic(tau) && self.is_arithmetic(sigma) {
            return Some(TypeId::REAL);
        }
        match (self.kind(tau).clone(), self.kind(sigma).clone()) {
            (TypeKind::Tuple(l), TypeKind::Tuple(r)) if l.len() == r.len() => {
                let mut comps = Vec::with_capacity(l.len());
                for (a, b) in l.into_iter().zip(r) {
                    comps.push(self.supertype(a, b)?);
                }
                Some(self.tuple(comps))
            }
            (
                TypeKind::Function {
                    domain: d1,
                    range: r1,
                },
                TypeKind::Function {
                    domain: d2,
                    range: r2,
                },
            ) if d1 == d2 => {
                let range = self.supertype(r1, r2)?;
                Some(self.function(d1, range))
            }
            _ => None,
        }
    }

    /// Returns true if `tau` and `sigma` have a common supertype.
    /// Unlike [`supertype`](Self::supertype) this never creates a type.
    pub fn compatible(&self, tau: TypeId, sigma: TypeId) -> bool {
        if tau == sigma || (self.is_arithmetic(tau) && self.is_arithmetic(sigma)) {
            return true;
        }
        match (self.kind(tau), self.kind(sigma)) {
            (TypeKind::Tuple(l), TypeKind::Tuple(r)) => {
                l.len() == r.len() && l.iter().zip(r).all(|(a, b)| self.compatible(*a, *b))
            }
            (
                TypeKind::Function {
                    domain: d1,
                    range: r1,
                },
                TypeKind::Function {
                    domain: d2,
                    range: r2,
                },
            ) => d1 == d2 && self.compatible(*r1, *r2),
            _ => false,
        }
    }

    /// Returns true if `tau` is a subtype of `sigma`.
    pub fn is_subtype(&self, tau: TypeId, sigma: TypeId) -> bool {
        if tau == sigma || (tau == TypeId::INT && sigma == TypeId::REAL) {
            return true;
        }
        match (self.kind(tau), self.kind(sigma)) {
            (TypeKind::Tuple(l), TypeKind::Tuple(r)) => {
                l.len() == r.len() && l.iter().zip(r).all(|(a, b)| self.is_subtype(*a, *b))
            }
            (
                TypeKind::Function {
                    domain: d1,
                    range: r1,
                },
                TypeKind::Function {
                    domain: d2,
                    range: r2,
                },
            ) => d1 == d2 && self.is_subtype(*r1, *r2),
            _ => false,
        }
    }

    /* Cardinality */

    /// Returns true if the type has finitely many elements.
    pub fn is_finite(&self, tau: TypeId) -> bool {
        match self.kind(tau) {
            TypeKind::Bool | TypeKind::BitVector(_) | TypeKind::Scalar { .. } => true,
            TypeKind::Int | TypeKind::Real | TypeKind::Uninterpreted(_) => false,
            TypeKind::Tuple(comps) => comps.iter().all(|c| self.is_finite(*c)),
            TypeKind::Function { domain, range } => {
                // a function into a singleton type is finite whatever the domain
                self.is_finite(*range)
                    && (self.card(*range) == Some(1) || domain.iter().all(|d| self.is_finite(*d)))
            }
        }
    }

    /// The number of elements of `tau`.
    /// Returns `None` if the type is infinite or its cardinality does not fit in a `u64`.
    pub fn card(&self, tau: TypeId) -> Option<u64> {
        match self.kind(tau) {
            TypeKind::Bool => Some(2),
            TypeKind::Int | TypeKind::Real | TypeKind::Uninterpreted(_) => None,
            TypeKind::BitVector(n) => {
                if *n < 64 {
                    Some(1u64 << n)
                } else {
                    None
                }
            }
            TypeKind::Scalar { card, .. } => Some(*card as u64),
            TypeKind::Tuple(comps) => comps
                .iter()
                .try_fold(1u64, |acc, c| acc.checked_mul(self.card(*c)?)),
            TypeKind::Function { domain, range } => {
                let r = self.card(*range)?;
                if r == 1 {
                    return Some(1);
                }
                let d = domain
                    .iter()
                    .try_fold(1u64, |acc, c| acc.checked_mul(self.card(*c)?))?;
                let d = u32::try_from(d).ok()?;
                r.checked_pow(d)
            }
        }
    }

    /// Renders the type as an s-expression.
    pub fn display(&self, tau: TypeId) -> String {
        if !self.is_good(tau) {
            return format!("{}", tau);
        }
        match self.kind(tau) {
            TypeKind::Bool => "Bool".to_string(),
            TypeKind::Int => "Int".to_string(),
            TypeKind::Real => "Real".to_string(),
            TypeKind::BitVector(n) => format!("(_ BitVec {})", n),
            TypeKind::Scalar { card, id } => format!("(Scalar!{} {})", id, card),
            TypeKind::Uninterpreted(id) => format!("U!{}", id),
            TypeKind::Tuple(comps) => {
                format!("(tuple {})", comps.iter().map(|c| self.display(*c)).join(" "))
            }
            TypeKind::Function { domain, range } => format!(
                "(-> {} {})",
                domain.iter().map(|c| self.display(*c)).join(" "),
                self.display(*range)
            ),
        }
    }
}
