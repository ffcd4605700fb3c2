use std::{fmt::Display, ops::Not};

use num_bigint::BigUint;
use num_rational::BigRational;

use crate::types::TypeId;

mod names;
mod pprod;
mod table;

pub use names::NameTable;
pub use pprod::PowerProduct;
pub use table::TermTable;

/// A reference to a term.
///
/// Bit 0 is the polarity, the remaining bits are the index of the term in the [`TermTable`].
/// Negating a boolean term flips the polarity bit and does not touch the table.
/// Non-boolean terms always have positive polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Term(pub(crate) i32);

impl Term {
    /// The null sentinel
    pub const NULL: Term = Term(-1);
    pub const TRUE: Term = Term(0);
    pub const FALSE: Term = Term(1);

    /// The positive reference to the term at `index`.
    pub(crate) fn pos(index: usize) -> Self {
        Term((index as i32) << 1)
    }

    pub fn index(self) -> usize {
        debug_assert!(self.0 >= 0);
        (self.0 >> 1) as usize
    }

    pub fn is_null(self) -> bool {
        self.0 < 0
    }

    pub fn is_neg(self) -> bool {
        self.0 & 1 == 1
    }

    pub fn is_pos(self) -> bool {
        self.0 & 1 == 0
    }

    /// The positive reference with the same index.
    pub fn unsigned(self) -> Self {
        Term(self.0 & !1)
    }

    /// Returns `self` negated if `neg` is set.
    pub fn with_polarity(self, neg: bool) -> Self {
        if neg {
            !self
        } else {
            self
        }
    }

    /// Returns true if `self` and `other` are the two polarities of the same term.
    pub fn opposite(self, other: Term) -> bool {
        self.0 ^ other.0 == 1
    }

    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Not for Term {
    type Output = Term;

    fn not(self) -> Self::Output {
        Term(self.0 ^ 1)
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else if self.is_neg() {
            write!(f, "(not t!{})", self.index())
        } else {
            write!(f, "t!{}", self.index())
        }
    }
}

/// The opaque binary bit-vector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BvOp {
    Div,
    Rem,
    Sdiv,
    Srem,
    Smod,
    Shl,
    Lshr,
    Ashr,
}

impl Display for BvOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BvOp::Div => write!(f, "bvudiv"),
            BvOp::Rem => write!(f, "bvurem"),
            BvOp::Sdiv => write!(f, "bvsdiv"),
            BvOp::Srem => write!(f, "bvsrem"),
            BvOp::Smod => write!(f, "bvsmod"),
            BvOp::Shl => write!(f, "bvshl"),
            BvOp::Lshr => write!(f, "bvlshr"),
            BvOp::Ashr => write!(f, "bvashr"),
        }
    }
}

/// The kind of a term together with its arguments.
/// Two terms are the same if and only if their kinds are equal.
///
/// Negative connectives (and, implies, arithmetic `<`, bit-vector `<`, ...) have no kind of their own, they are negated references to the positive kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /* Leaves */
    /// The Boolean constant `true`, always at index 0
    True,
    /// The i-th constant of a scalar or uninterpreted type
    Constant(TypeId, u32),
    /// A free uninterpreted symbol.
    /// The second component only distinguishes symbols of the same type.
    Uninterpreted(TypeId, u32),
    /// A variable, may be bound by a quantifier
    Variable(TypeId, u32),
    /// Rational constant
    ArithConst(BigRational),
    /// Bit-vector constant of width at most 64
    BvConst64 { width: u32, value: u64 },
    /// Bit-vector constant of width more than 64
    BvConst { width: u32, value: BigUint },

    /* Polynomials */
    /// A non-trivial product of variables, shared by arithmetic and bit-vector polynomials
    PowerProduct(PowerProduct),
    /// A rational polynomial. Monomials are sorted by power product, the constant (empty product) comes first.
    ArithPoly(Vec<(BigRational, PowerProduct)>),
    /// A bit-vector polynomial of width at most 64
    BvPoly64 {
        width: u32,
        monomials: Vec<(u64, PowerProduct)>,
    },
    /// A bit-vector polynomial of width more than 64
    BvPoly {
        width: u32,
        monomials: Vec<(BigUint, PowerProduct)>,
    },

    /* Bit-vectors */
    /// Bit `i` of a bit-vector term, a Boolean
    BitSelect(u32, Term),
    /// Bit-vector given by its bits, least significant bit first
    BvArray(Vec<Term>),
    BvBinary(BvOp, Term, Term),

    /* Generic composites */
    Ite(Term, Term, Term),
    App(Term, Vec<Term>),
    Update(Term, Vec<Term>, Term),
    Tuple(Vec<Term>),
    Select(u32, Term),
    Forall(Vec<Term>, Term),

    /* Atoms */
    /// Equality, also bi-implication between Booleans
    Eq(Term, Term),
    Distinct(Vec<Term>),
    Or(Vec<Term>),
    Xor(Vec<Term>),
    /// `p = 0` for an arithmetic term `p`
    ArithEq0(Term),
    /// `p >= 0` for an arithmetic term `p`
    ArithGe0(Term),
    /// Equality between two arithmetic terms
    ArithBinEq(Term, Term),
    BvEq(Term, Term),
    /// Unsigned `>=`
    BvGe(Term, Term),
    /// Signed `>=`
    BvSge(Term, Term),
}

impl TermKind {
    /// Returns true for leaves, i.e., terms without term arguments.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            TermKind::True
                | TermKind::Constant(..)
                | TermKind::Uninterpreted(..)
                | TermKind::Variable(..)
                | TermKind::ArithConst(_)
                | TermKind::BvConst64 { .. }
                | TermKind::BvConst { .. }
        )
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            TermKind::True
                | TermKind::Constant(..)
                | TermKind::ArithConst(_)
                | TermKind::BvConst64 { .. }
                | TermKind::BvConst { .. }
        )
    }

    /// The term arguments in a fixed order.
    /// For polynomials and power products these are the variables, in order of appearance.
    pub fn children(&self) -> Vec<Term> {
        match self {
            TermKind::True
            | TermKind::Constant(..)
            | TermKind::Uninterpreted(..)
            | TermKind::Variable(..)
            | TermKind::ArithConst(_)
            | TermKind::BvConst64 { .. }
            | TermKind::BvConst { .. } => vec![],
            TermKind::PowerProduct(pp) => pp.vars().collect(),
            TermKind::ArithPoly(monos) => monos.iter().flat_map(|(_, pp)| pp.vars()).collect(),
            TermKind::BvPoly64 { monomials, .. } => {
                monomials.iter().flat_map(|(_, pp)| pp.vars()).collect()
            }
            TermKind::BvPoly { monomials, .. } => {
                monomials.iter().flat_map(|(_, pp)| pp.vars()).collect()
            }
            TermKind::BitSelect(_, t) | TermKind::Select(_, t) => vec![*t],
            TermKind::ArithEq0(t) | TermKind::ArithGe0(t) => vec![*t],
            TermKind::BvArray(args)
            | TermKind::Tuple(args)
            | TermKind::Distinct(args)
            | TermKind::Or(args)
            | TermKind::Xor(args) => args.clone(),
            TermKind::BvBinary(_, a, b)
            | TermKind::Eq(a, b)
            | TermKind::ArithBinEq(a, b)
            | TermKind::BvEq(a, b)
            | TermKind::BvGe(a, b)
            | TermKind::BvSge(a, b) => vec![*a, *b],
            TermKind::Ite(c, a, b) => vec![*c, *a, *b],
            TermKind::App(f, args) => {
                let mut ch = Vec::with_capacity(args.len() + 1);
                ch.push(*f);
                ch.extend(args);
                ch
            }
            TermKind::Update(f, args, v) => {
                let mut ch = Vec::with_capacity(args.len() + 2);
                ch.push(*f);
                ch.extend(args);
                ch.push(*v);
                ch
            }
            TermKind::Forall(vars, body) => {
                let mut ch = vars.clone();
                ch.push(*body);
                ch
            }
        }
    }
}
