/// Maximal number of arguments of a term constructor
pub const MAX_ARITY: usize = u16::MAX as usize;
/// Maximal number of variables bound by a quantifier
pub const MAX_VARS: usize = u16::MAX as usize;
/// Maximal bit-vector width
pub const MAX_BVSIZE: u32 = u16::MAX as u32;
/// Maximal total degree of a polynomial
pub const MAX_DEGREE: u32 = u16::MAX as u32;

const DEFAULT_FACTOR_ITE: bool = true;
const DEFAULT_LIFT_ITE: bool = true;
const DEFAULT_BVARRAY_FINALIZE: bool = true;

/// Switches for the optional rewrites of the simplifying constructors.
/// Rewrites that are part of the canonical form (ordering, polarity, constant folding) are always on.
#[derive(Debug, Clone)]
pub struct Options {
    /// Whether `ite c (a*p) (a*q)` over integer polynomials is rewritten to `a * ite c p q`, with `a` the gcd of all coefficients.
    pub factor_ite: bool,
    /// Whether arithmetic and bit-vector (in)equalities with an if-then-else operand are lifted over the condition.
    pub lift_ite: bool,
    /// Whether bit-vector polynomials of the form `sum 2^k_i * a_i` over bit-arrays with disjoint supports are turned back into a single bit-array.
    pub bvarray_finalize: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            factor_ite: DEFAULT_FACTOR_ITE,
            lift_ite: DEFAULT_LIFT_ITE,
            bvarray_finalize: DEFAULT_BVARRAY_FINALIZE,
        }
    }
}

impl Options {
    /// Options with every optional rewrite disabled.
    pub fn canonical_only() -> Self {
        Self {
            factor_ite: false,
            lift_ite: false,
            bvarray_finalize: false,
        }
    }
}
