use indexmap::IndexMap;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

use super::TermManager;
use crate::{
    error::TermError,
    poly::{
        big_bit, bv_negate, BufferList, BufferPool, BvArith64Buffer, BvArithBuffer,
        BvLogicBuffer, Scratch,
    },
    terms::{BvOp, PowerProduct, Term, TermKind, TermTable},
    types::TypeId,
};

/// Operations on bit-vector polynomials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BvArithOp {
    Add,
    Sub,
    Neg,
    Mul,
    Square,
    Power(u32),
}

/// The two bit-vector polynomial buffers, seen through `BigUint` coefficients.
/// Widths up to 64 go through [`BvArith64Buffer`], wider ones through [`BvArithBuffer`].
trait BvPolyBuffer: Scratch {
    fn list(pool: &mut BufferPool) -> &mut BufferList<Self>;
    fn prepare(&mut self, width: u32);
    fn width(&self) -> u32;
    fn add_big_const(&mut self, c: &BigUint);
    fn add_big_term(&mut self, terms: &TermTable, t: Term, coeff: &BigUint);
    fn add_buffer(&mut self, other: &Self);
    fn mul_buffer(&mut self, other: &Self);
    fn negate(&mut self);
    fn square(&mut self);
    fn constant_value(&self) -> Option<BigUint>;
    /// Coefficients and power products, constant first
    fn entries(&self) -> Vec<(BigUint, PowerProduct)>;
    fn to_kind(&self) -> TermKind;
}

fn low_u64(c: &BigUint) -> u64 {
    (c & BigUint::from(u64::MAX)).to_u64().unwrap_or(0)
}

impl BvPolyBuffer for BvArith64Buffer {
    fn list(pool: &mut BufferPool) -> &mut BufferList<Self> {
        pool.bvarith64()
    }

    fn prepare(&mut self, width: u32) {
        BvArith64Buffer::prepare(self, width)
    }

    fn width(&self) -> u32 {
        BvArith64Buffer::width(self)
    }

    fn add_big_const(&mut self, c: &BigUint) {
        self.add_const(low_u64(c))
    }

    fn add_big_term(&mut self, terms: &TermTable, t: Term, coeff: &BigUint) {
        self.add_term(terms, t, low_u64(coeff))
    }

    fn add_buffer(&mut self, other: &Self) {
        BvArith64Buffer::add_buffer(self, other)
    }

    fn mul_buffer(&mut self, other: &Self) {
        BvArith64Buffer::mul_buffer(self, other)
    }

    fn negate(&mut self) {
        BvArith64Buffer::negate(self)
    }

    fn square(&mut self) {
        BvArith64Buffer::square(self)
    }

    fn constant_value(&self) -> Option<BigUint> {
        self.constant().map(BigUint::from)
    }

    fn entries(&self) -> Vec<(BigUint, PowerProduct)> {
        self.monomials()
            .map(|(pp, c)| (BigUint::from(*c), pp.clone()))
            .collect()
    }

    fn to_kind(&self) -> TermKind {
        TermKind::BvPoly64 {
            width: BvArith64Buffer::width(self),
            monomials: self.to_monomials(),
        }
    }
}

impl BvPolyBuffer for BvArithBuffer {
    fn list(pool: &mut BufferPool) -> &mut BufferList<Self> {
        pool.bvarith()
    }

    fn prepare(&mut self, width: u32) {
        BvArithBuffer::prepare(self, width)
    }

    fn width(&self) -> u32 {
        BvArithBuffer::width(self)
    }

    fn add_big_const(&mut self, c: &BigUint) {
        self.add_const(c)
    }

    fn add_big_term(&mut self, terms: &TermTable, t: Term, coeff: &BigUint) {
        self.add_term(terms, t, coeff)
    }

    fn add_buffer(&mut self, other: &Self) {
        BvArithBuffer::add_buffer(self, other)
    }

    fn mul_buffer(&mut self, other: &Self) {
        BvArithBuffer::mul_buffer(self, other)
    }

    fn negate(&mut self) {
        BvArithBuffer::negate(self)
    }

    fn square(&mut self) {
        BvArithBuffer::square(self)
    }

    fn constant_value(&self) -> Option<BigUint> {
        self.constant()
    }

    fn entries(&self) -> Vec<(BigUint, PowerProduct)> {
        self.to_monomials()
    }

    fn to_kind(&self) -> TermKind {
        TermKind::BvPoly {
            width: BvArithBuffer::width(self),
            monomials: self.to_monomials(),
        }
    }
}

/// Evaluates a division or remainder on constants, with the SMT-LIB conventions for a zero divisor.
fn fold_division(op: BvOp, width: u32, a: &BigUint, b: &BigUint) -> BigUint {
    let udiv = |x: &BigUint, y: &BigUint| {
        if y.is_zero() {
            (BigUint::one() << width as usize) - BigUint::one()
        } else {
            x / y
        }
    };
    let urem = |x: &BigUint, y: &BigUint| if y.is_zero() { x.clone() } else { x % y };
    let neg = |x: &BigUint| bv_negate(x, width);
    let (sa, sb) = (big_bit(a, width - 1), big_bit(b, width - 1));
    let abs_a = if sa { neg(a) } else { a.clone() };
    let abs_b = if sb { neg(b) } else { b.clone() };
    let r = match op {
        BvOp::Div => udiv(a, b),
        BvOp::Rem => urem(a, b),
        BvOp::Sdiv => {
            let q = udiv(&abs_a, &abs_b);
            if sa != sb {
                neg(&q)
            } else {
                q
            }
        }
        BvOp::Srem => {
            let r = urem(&abs_a, &abs_b);
            if sa {
                neg(&r)
            } else {
                r
            }
        }
        BvOp::Smod => {
            let u = urem(&abs_a, &abs_b);
            if u.is_zero() {
                u
            } else {
                match (sa, sb) {
                    (false, false) => u,
                    (true, false) => neg(&u) + b,
                    (false, true) => u + b,
                    (true, true) => neg(&u),
                }
            }
        }
        BvOp::Shl | BvOp::Lshr | BvOp::Ashr => unreachable!("shifts are handled bitwise"),
    };
    r % (BigUint::one() << width as usize)
}

/// Bit-vector terms.
impl TermManager {
    /* Arithmetic */

    pub fn bvadd(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvarith(BvArithOp::Add, t1, t2))
    }

    pub fn bvsub(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvarith(BvArithOp::Sub, t1, t2))
    }

    pub fn bvneg(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_bv(t))?;
        Ok(self.mk_bvarith(BvArithOp::Neg, t, t))
    }

    pub fn bvmul(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        let r = self
            .check_same_bv(t1, t2)
            .and_then(|_| self.check_product_degree(&[t1, t2]));
        self.record(r)?;
        Ok(self.mk_bvarith(BvArithOp::Mul, t1, t2))
    }

    pub fn bvsquare(&mut self, t: Term) -> Result<Term, TermError> {
        let r = self.check_bv(t).and_then(|_| self.check_power_degree(t, 2));
        self.record(r)?;
        Ok(self.mk_bvarith(BvArithOp::Square, t, t))
    }

    pub fn bvpower(&mut self, t: Term, d: u32) -> Result<Term, TermError> {
        let r = self.check_bv(t).and_then(|_| self.check_power_degree(t, d));
        self.record(r)?;
        Ok(self.mk_bvarith(BvArithOp::Power(d), t, t))
    }

    fn mk_bvarith(&mut self, op: BvArithOp, t1: Term, t2: Term) -> Term {
        let width = self.bitsize_of(t1);
        if width <= 64 {
            self.bvarith_with::<BvArith64Buffer>(width, op, t1, t2)
        } else {
            self.bvarith_with::<BvArithBuffer>(width, op, t1, t2)
        }
    }

    fn bvarith_with<B: BvPolyBuffer>(&mut self, width: u32, op: BvArithOp, t1: Term, t2: Term) -> Term {
        self.bv_poly_with::<B>(width, |m, b| {
            let one = BigUint::one();
            match op {
                BvArithOp::Add => {
                    b.add_big_term(&m.terms, t1, &one);
                    b.add_big_term(&m.terms, t2, &one);
                }
                BvArithOp::Sub => {
                    b.add_big_term(&m.terms, t1, &one);
                    b.add_big_term(&m.terms, t2, &bv_negate(&one, width));
                }
                BvArithOp::Neg => {
                    b.add_big_term(&m.terms, t1, &one);
                    b.negate();
                }
                BvArithOp::Mul => {
                    b.add_big_term(&m.terms, t1, &one);
                    m.with_buffer(B::list, |m, f| {
                        f.prepare(width);
                        f.add_big_term(&m.terms, t2, &one);
                        b.mul_buffer(f);
                    });
                }
                BvArithOp::Square => {
                    b.add_big_term(&m.terms, t1, &one);
                    b.square();
                }
                BvArithOp::Power(mut d) => {
                    b.add_big_const(&one);
                    m.with_buffer(B::list, |m, f| {
                        f.prepare(width);
                        f.add_big_term(&m.terms, t1, &one);
                        while d > 0 {
                            if d & 1 == 1 {
                                b.mul_buffer(f);
                            }
                            d >>= 1;
                            if d > 0 {
                                f.square();
                            }
                        }
                    });
                }
            }
        })
    }

    /// Runs `f` on a buffer prepared for `width` and finalizes the result.
    fn bv_poly_with<B: BvPolyBuffer>(&mut self, width: u32, f: impl FnOnce(&mut Self, &mut B)) -> Term {
        self.with_buffer(B::list, |m, b| {
            b.prepare(width);
            f(m, b);
            m.finalize_bv(b)
        })
    }

    /// Turns a bit-vector polynomial into a term: a constant, a single variable or power product,
    /// a bit-array when the polynomial is a sum of shifted arrays with disjoint support, or a polynomial.
    fn finalize_bv<B: BvPolyBuffer>(&mut self, b: &B) -> Term {
        let width = b.width();
        if let Some(c) = b.constant_value() {
            return self.mk_bvconst(width, &c);
        }
        let entries = b.entries();
        if let [(c, pp)] = entries.as_slice() {
            if c.is_one() {
                return self.bv_pp_term(pp, width);
            }
        }
        if self.options.bvarray_finalize {
            if let Some(bits) = self.poly_as_bits(width, &entries) {
                return self.bits_term(bits);
            }
        }
        let tau = self.types.bv(width);
        self.terms.intern(b.to_kind(), tau)
    }

    fn bv_pp_term(&mut self, pp: &PowerProduct, width: u32) -> Term {
        if let Some(x) = pp.as_var() {
            return x;
        }
        let tau = self.types.bv(width);
        self.terms.intern(TermKind::PowerProduct(pp.clone()), tau)
    }

    /// Recognizes `c + 2^k1 * a1 + ... + 2^kn * an` where the `ai` are bit-arrays and no two summands share a non-zero bit.
    fn poly_as_bits(&self, width: u32, entries: &[(BigUint, PowerProduct)]) -> Option<Vec<Term>> {
        let mut bits = vec![Term::FALSE; width as usize];
        for (c, pp) in entries {
            if pp.is_one() {
                for i in 0..width {
                    if big_bit(c, i) {
                        bits[i as usize] = Term::TRUE;
                    }
                }
                continue;
            }
            let x = pp.as_var()?;
            let array = match self.terms.kind(x) {
                TermKind::BvArray(array) => array,
                _ => return None,
            };
            let mut ones = (0..width).filter(|i| big_bit(c, *i));
            let k = ones.next()? as usize;
            if ones.next().is_some() {
                return None;
            }
            for i in k..width as usize {
                let bit = array[i - k];
                if bit == Term::FALSE {
                    continue;
                }
                if bits[i] != Term::FALSE {
                    return None;
                }
                bits[i] = bit;
            }
        }
        Some(bits)
    }

    /// Rebuilds a bit-vector polynomial with each variable `x` replaced by `map[x]`.
    pub(crate) fn rebuild_bv_poly(
        &mut self,
        width: u32,
        monos: &[(BigUint, PowerProduct)],
        map: &IndexMap<Term, Term>,
    ) -> Term {
        if width <= 64 {
            self.rebuild_bv_poly_with::<BvArith64Buffer>(width, monos, map)
        } else {
            self.rebuild_bv_poly_with::<BvArithBuffer>(width, monos, map)
        }
    }

    fn rebuild_bv_poly_with<B: BvPolyBuffer>(
        &mut self,
        width: u32,
        monos: &[(BigUint, PowerProduct)],
        map: &IndexMap<Term, Term>,
    ) -> Term {
        self.bv_poly_with::<B>(width, |m, acc| {
            for (c, pp) in monos {
                m.with_buffer(B::list, |m, prod| {
                    prod.prepare(width);
                    prod.add_big_const(c);
                    for (x, e) in pp.iter() {
                        let y = map.get(x).copied().unwrap_or(*x);
                        m.with_buffer(B::list, |m, f| {
                            f.prepare(width);
                            f.add_big_term(&m.terms, y, &BigUint::one());
                            for _ in 0..*e {
                                prod.mul_buffer(f);
                            }
                        });
                    }
                    acc.add_buffer(prod);
                });
            }
        })
    }

    /// `t1 - t2` is a non-zero constant, or the two terms have opposite known bits somewhere.
    pub(crate) fn bv_must_differ(&mut self, t1: Term, t2: Term) -> bool {
        if let (Some(b1), Some(b2)) = (self.known_bits(t1), self.known_bits(t2)) {
            return b1.iter().zip(&b2).any(|(x, y)| x.opposite(*y));
        }
        let width = self.bitsize_of(t1);
        if width <= 64 {
            self.bv_diff_is_nonzero::<BvArith64Buffer>(width, t1, t2)
        } else {
            self.bv_diff_is_nonzero::<BvArithBuffer>(width, t1, t2)
        }
    }

    fn bv_diff_is_nonzero<B: BvPolyBuffer>(&mut self, width: u32, t1: Term, t2: Term) -> bool {
        self.with_buffer(B::list, |m, b| {
            b.prepare(width);
            b.add_big_term(&m.terms, t1, &BigUint::one());
            b.add_big_term(&m.terms, t2, &bv_negate(&BigUint::one(), width));
            matches!(b.constant_value(), Some(c) if !c.is_zero())
        })
    }

    /* Bits */

    /// Bit `i` of `t`.
    pub(crate) fn mk_bit_of(&mut self, t: Term, i: u32) -> Term {
        match self.terms.kind(t) {
            TermKind::BvConst64 { value, .. } => Self::const_bit((value >> i) & 1 == 1),
            TermKind::BvConst { value, .. } => Self::const_bit(big_bit(value, i)),
            TermKind::BvArray(bits) => bits[i as usize],
            _ => self.terms.intern(TermKind::BitSelect(i, t), TypeId::BOOL),
        }
    }

    fn const_bit(b: bool) -> Term {
        if b {
            Term::TRUE
        } else {
            Term::FALSE
        }
    }

    /// All bits of `t`, least significant first.
    fn bv_bits(&mut self, t: Term) -> Vec<Term> {
        match self.known_bits(t) {
            Some(bits) => bits,
            None => {
                let width = self.bitsize_of(t);
                (0..width).map(|i| self.mk_bit_of(t, i)).collect()
            }
        }
    }

    /// The bit-vector with the given bits: a constant if every bit is constant,
    /// `x` itself if the bits are exactly those of `x`, a bit-array otherwise.
    pub(crate) fn bits_term(&mut self, bits: Vec<Term>) -> Term {
        let width = bits.len() as u32;
        if bits.iter().all(|b| *b == Term::TRUE || *b == Term::FALSE) {
            let mut value = BigUint::zero();
            for (i, b) in bits.iter().enumerate() {
                if *b == Term::TRUE {
                    value |= BigUint::one() << i;
                }
            }
            return self.mk_bvconst(width, &value);
        }
        if let Some(x) = self.bits_source(&bits) {
            return x;
        }
        let tau = self.types.bv(width);
        self.terms.intern(TermKind::BvArray(bits), tau)
    }

    fn bits_source(&self, bits: &[Term]) -> Option<Term> {
        let x = match self.terms.kind(*bits.first()?) {
            TermKind::BitSelect(0, x) if bits[0].is_pos() => *x,
            _ => return None,
        };
        if self.bitsize_of(x) as usize != bits.len() {
            return None;
        }
        let all = bits.iter().enumerate().all(|(i, b)| {
            b.is_pos() && matches!(self.terms.kind(*b), TermKind::BitSelect(j, y) if *j as usize == i && *y == x)
        });
        all.then(|| x)
    }

    /// Loads the bits of `t` into a logic buffer, runs `f` and turns the result into a term.
    fn bvlogic_with(&mut self, t: Term, f: impl FnOnce(&mut Self, &mut BvLogicBuffer)) -> Term {
        self.with_buffer(BufferPool::bvlogic, |m, b| {
            let bits = m.bv_bits(t);
            b.set_bits(&bits);
            f(m, b);
            m.bits_term(b.bits().to_vec())
        })
    }

    fn mk_bitwise(&mut self, t1: Term, t2: Term, op: fn(&mut Self, Term, Term) -> Term) -> Term {
        self.bvlogic_with(t1, |m, b| {
            let other = m.bv_bits(t2);
            for (i, y) in other.into_iter().enumerate() {
                let x = b.bits()[i];
                b.bits_mut()[i] = op(m, x, y);
            }
        })
    }

    /* Bitwise */

    pub fn bvnot(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_bv(t))?;
        Ok(self.bvlogic_with(t, |_, b| {
            for bit in b.bits_mut() {
                *bit = !*bit;
            }
        }))
    }

    pub fn bvand(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, Self::mk_and2))
    }

    pub fn bvor(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, Self::mk_or2))
    }

    pub fn bvxor(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, Self::mk_xor2))
    }

    pub fn bvnand(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, |m, x, y| !m.mk_and2(x, y)))
    }

    pub fn bvnor(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, |m, x, y| !m.mk_or2(x, y)))
    }

    pub fn bvxnor(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bitwise(t1, t2, Self::mk_iff))
    }

    /* Structure */

    /// `t1` as the high part and `t2` as the low part.
    pub fn bvconcat(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_concat(&[t1, t2]))?;
        Ok(self.bvlogic_with(t2, |m, b| {
            let high = m.bv_bits(t1);
            b.concat_high(&high);
        }))
    }

    /// `n` copies of `t`.
    pub fn bvrepeat(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_repeat(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.repeat(n as u32)))
    }

    /// Bits `low` to `high` of `t`, both included.
    pub fn bvextract(&mut self, t: Term, low: u32, high: u32) -> Result<Term, TermError> {
        self.record(self.check_extract(t, low, high))?;
        Ok(self.bvlogic_with(t, |_, b| b.extract(low, high)))
    }

    pub fn sign_extend(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_sign_extend(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.sign_extend(n as u32)))
    }

    pub fn zero_extend(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_zero_extend(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.zero_extend(n as u32)))
    }

    /// 1-bit vector, set if every bit of `t` is set.
    pub fn redand(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_bv(t))?;
        let bits = self.bv_bits(t);
        let bit = self.mk_and(bits);
        Ok(self.bits_term(vec![bit]))
    }

    /// 1-bit vector, set if some bit of `t` is set.
    pub fn redor(&mut self, t: Term) -> Result<Term, TermError> {
        self.record(self.check_bv(t))?;
        let bits = self.bv_bits(t);
        let bit = self.mk_or(bits);
        Ok(self.bits_term(vec![bit]))
    }

    /// 1-bit vector, set if `t1` and `t2` are equal.
    pub fn redcomp(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        let (b1, b2) = (self.bv_bits(t1), self.bv_bits(t2));
        let eqs: Vec<Term> = b1
            .into_iter()
            .zip(b2)
            .map(|(x, y)| self.mk_iff(x, y))
            .collect();
        let bit = self.mk_and(eqs);
        Ok(self.bits_term(vec![bit]))
    }

    /* Shifts and rotations by a constant */

    pub fn shift_left0(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.shift_left0(n as u32)))
    }

    pub fn shift_left1(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.shift_left1(n as u32)))
    }

    pub fn shift_right0(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.shift_right0(n as u32)))
    }

    pub fn shift_right1(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.shift_right1(n as u32)))
    }

    pub fn ashift_right(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.ashift_right(n as u32)))
    }

    pub fn rotate_left(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.rotate_left(n as u32)))
    }

    pub fn rotate_right(&mut self, t: Term, n: i64) -> Result<Term, TermError> {
        self.record(self.check_bitshift(t, n))?;
        Ok(self.bvlogic_with(t, |_, b| b.rotate_right(n as u32)))
    }

    /* Shifts by a term, division and remainder */

    pub fn bvshl(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Shl, t1, t2)
    }

    pub fn bvlshr(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Lshr, t1, t2)
    }

    pub fn bvashr(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Ashr, t1, t2)
    }

    pub fn bvdiv(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Div, t1, t2)
    }

    pub fn bvrem(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Rem, t1, t2)
    }

    pub fn bvsdiv(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Sdiv, t1, t2)
    }

    pub fn bvsrem(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Srem, t1, t2)
    }

    pub fn bvsmod(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.bvbinary(BvOp::Smod, t1, t2)
    }

    fn bvbinary(&mut self, op: BvOp, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvbinary(op, t1, t2))
    }

    /// Shifts by a constant amount are done bitwise; an amount of at least the width clears
    /// (or sign-fills) every bit. Divisions of constants are evaluated.
    pub(crate) fn mk_bvbinary(&mut self, op: BvOp, t1: Term, t2: Term) -> Term {
        let width = self.bitsize_of(t1);
        if let Some(k) = self.bv_constant_value(t2) {
            match op {
                BvOp::Shl | BvOp::Lshr | BvOp::Ashr => {
                    let k = k.to_u32().map_or(width, |k| k.min(width));
                    return self.bvlogic_with(t1, |_, b| match op {
                        BvOp::Shl => b.shift_left0(k),
                        BvOp::Lshr => b.shift_right0(k),
                        _ => b.ashift_right(k),
                    });
                }
                _ => {
                    if let Some(x) = self.bv_constant_value(t1) {
                        let r = fold_division(op, width, &x, &k);
                        return self.mk_bvconst(width, &r);
                    }
                }
            }
        }
        let tau = self.types.bv(width);
        self.terms.intern(TermKind::BvBinary(op, t1, t2), tau)
    }

    /* Atoms */

    pub fn bveq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bveq(t1, t2))
    }

    pub fn bvneq(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(!self.mk_bveq(t1, t2))
    }

    /// Unsigned `t1 >= t2`
    pub fn bvge(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvge(t1, t2))
    }

    pub fn bvgt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(!self.mk_bvge(t2, t1))
    }

    pub fn bvle(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvge(t2, t1))
    }

    pub fn bvlt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(!self.mk_bvge(t1, t2))
    }

    /// Signed `t1 >= t2`
    pub fn bvsge(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvsge(t1, t2))
    }

    pub fn bvsgt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(!self.mk_bvsge(t2, t1))
    }

    pub fn bvsle(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(self.mk_bvsge(t2, t1))
    }

    pub fn bvslt(&mut self, t1: Term, t2: Term) -> Result<Term, TermError> {
        self.record(self.check_same_bv(t1, t2))?;
        Ok(!self.mk_bvsge(t1, t2))
    }

    pub(crate) fn mk_bveq(&mut self, t1: Term, t2: Term) -> Term {
        if self.options.lift_ite {
            if let Some(l) = self.check_for_lift_if(t1, t2) {
                let left = self.bveq_atom(l.left1, l.left2);
                let right = self.bveq_atom(l.right1, l.right2);
                return self.mk_bool_ite(l.cond, left, right);
            }
        }
        self.bveq_atom(t1, t2)
    }

    pub(crate) fn bveq_atom(&mut self, t1: Term, t2: Term) -> Term {
        if t1 == t2 {
            return Term::TRUE;
        }
        if self.bv_must_differ(t1, t2) {
            return Term::FALSE;
        }
        let (l, r) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        self.terms.intern(TermKind::BvEq(l, r), TypeId::BOOL)
    }

    pub(crate) fn mk_bvge(&mut self, t1: Term, t2: Term) -> Term {
        if t1 == t2 || self.must_le(t2, t1) {
            return Term::TRUE;
        }
        if self.must_lt(t1, t2) {
            return Term::FALSE;
        }
        self.terms.intern(TermKind::BvGe(t1, t2), TypeId::BOOL)
    }

    pub(crate) fn mk_bvsge(&mut self, t1: Term, t2: Term) -> Term {
        if t1 == t2 || self.must_sle(t2, t1) {
            return Term::TRUE;
        }
        if self.must_slt(t1, t2) {
            return Term::FALSE;
        }
        self.terms.intern(TermKind::BvSge(t1, t2), TypeId::BOOL)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;
    use quickcheck_macros::quickcheck;

    use crate::{
        manager::TermManager,
        options::Options,
        terms::{BvOp, Term, TermKind},
    };

    fn value(tm: &TermManager, t: Term) -> Option<BigUint> {
        tm.bv_constant_value(t)
    }

    #[test]
    fn test_constant_arithmetic_wraps() {
        let mut tm = TermManager::init();
        let a = tm.bvconst_u64(8, 200).unwrap();
        let b = tm.bvconst_u64(8, 100).unwrap();
        let s = tm.bvadd(a, b).unwrap();
        assert_eq!(value(&tm, s), Some(BigUint::from(44u32)));
        let d = tm.bvsub(b, a).unwrap();
        assert_eq!(value(&tm, d), Some(BigUint::from(156u32)));
        let p = tm.bvmul(a, b).unwrap();
        assert_eq!(value(&tm, p), Some(BigUint::from((200u32 * 100) % 256)));
    }

    #[test]
    fn test_polynomial_identities() {
        let mut tm = TermManager::init();
        let bv16 = tm.bv_type(16).unwrap();
        let x = tm.new_uninterpreted(bv16).unwrap();
        let y = tm.new_uninterpreted(bv16).unwrap();
        let zero = tm.bvconst_zero(16).unwrap();
        assert_eq!(tm.bvsub(x, x).unwrap(), zero);
        let n = tm.bvneg(x).unwrap();
        assert_eq!(tm.bvneg(n).unwrap(), x);
        let xy = tm.bvadd(x, y).unwrap();
        assert_eq!(tm.bvadd(y, x).unwrap(), xy);
        assert_eq!(tm.bvsub(xy, y).unwrap(), x);
        let sq = tm.bvsquare(x).unwrap();
        assert_eq!(tm.bvmul(x, x).unwrap(), sq);
        assert_eq!(tm.bvpower(x, 2).unwrap(), sq);
        assert!(matches!(tm.terms().kind(sq), TermKind::PowerProduct(_)));
    }

    #[test]
    fn test_wide_polynomials() {
        let mut tm = TermManager::init();
        let bv100 = tm.bv_type(100).unwrap();
        let x = tm.new_uninterpreted(bv100).unwrap();
        let one = tm.bvconst_one(100).unwrap();
        let x1 = tm.bvadd(x, one).unwrap();
        assert!(matches!(tm.terms().kind(x1), TermKind::BvPoly { width: 100, .. }));
        assert_eq!(tm.bvsub(x1, one).unwrap(), x);
        let m = tm.bvconst_minus_one(100).unwrap();
        assert_eq!(tm.bvadd(m, one).unwrap(), tm.bvconst_zero(100).unwrap());
    }

    #[test]
    fn test_shift_by_constant_gives_array() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let t = tm.new_uninterpreted(bv8).unwrap();
        let four = tm.bvconst_u64(8, 4).unwrap();
        let s = tm.bvshl(t, four).unwrap();
        let bits: Vec<Term> = (0..4).map(|i| tm.mk_bit_of(t, i)).collect();
        let mut expected = vec![Term::FALSE; 4];
        expected.extend(bits);
        assert_eq!(tm.terms().kind(s), &TermKind::BvArray(expected));
        assert_eq!(tm.shift_left0(t, 4).unwrap(), s);

        let big = tm.bvconst_u64(8, 200).unwrap();
        assert_eq!(tm.bvlshr(t, big).unwrap(), tm.bvconst_zero(8).unwrap());
        let shl = tm.bvshl(t, t).unwrap();
        assert!(matches!(tm.terms().kind(shl), TermKind::BvBinary(BvOp::Shl, ..)));
    }

    #[test]
    fn test_bits_roundtrip_to_source() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let t = tm.new_uninterpreted(bv8).unwrap();
        assert_eq!(tm.rotate_left(t, 8).unwrap(), t);
        let n = tm.bvnot(t).unwrap();
        assert_eq!(tm.bvnot(n).unwrap(), t);
        assert_eq!(tm.bvand(t, t).unwrap(), t);
        assert_eq!(tm.sign_extend(t, 0).unwrap(), t);
        assert_eq!(tm.bvextract(t, 0, 7).unwrap(), t);
    }

    #[test]
    fn test_disjoint_arrays_are_merged() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let x = tm.new_uninterpreted(bv8).unwrap();
        let y = tm.new_uninterpreted(bv8).unwrap();
        let hi = tm.shift_left0(x, 4).unwrap();
        let mask = tm.bvconst_u64(8, 0x0f).unwrap();
        let lo = tm.bvand(y, mask).unwrap();
        let sum = tm.bvadd(hi, lo).unwrap();
        assert!(matches!(tm.terms().kind(sum), TermKind::BvArray(_)));
        assert_eq!(tm.bvor(hi, lo).unwrap(), sum);

        let mut plain = TermManager::with_options(Options {
            bvarray_finalize: false,
            ..Options::default()
        });
        let bv8 = plain.bv_type(8).unwrap();
        let x = plain.new_uninterpreted(bv8).unwrap();
        let y = plain.new_uninterpreted(bv8).unwrap();
        let hi = plain.shift_left0(x, 4).unwrap();
        let mask = plain.bvconst_u64(8, 0x0f).unwrap();
        let lo = plain.bvand(y, mask).unwrap();
        let sum = plain.bvadd(hi, lo).unwrap();
        assert!(matches!(plain.terms().kind(sum), TermKind::BvPoly64 { .. }));
    }

    #[test]
    fn test_structural_operations_on_constants() {
        let mut tm = TermManager::init();
        let c = tm.bvconst_u64(8, 0b1011_0110).unwrap();
        let e = tm.bvextract(c, 2, 5).unwrap();
        assert_eq!(e, tm.bvconst_u64(4, 0b1101).unwrap());
        let hi = tm.bvconst_u64(4, 0xa).unwrap();
        let lo = tm.bvconst_u64(4, 0x5).unwrap();
        assert_eq!(tm.bvconcat(hi, lo).unwrap(), tm.bvconst_u64(8, 0xa5).unwrap());
        let neg = tm.bvconst_u64(4, 0b1000).unwrap();
        assert_eq!(tm.sign_extend(neg, 4).unwrap(), tm.bvconst_u64(8, 0xf8).unwrap());
        assert_eq!(tm.zero_extend(neg, 4).unwrap(), tm.bvconst_u64(8, 0x08).unwrap());
        let r = tm.bvconst_u64(8, 0b1000_0001).unwrap();
        assert_eq!(tm.rotate_left(r, 1).unwrap(), tm.bvconst_u64(8, 3).unwrap());
        assert_eq!(tm.bvrepeat(lo, 2).unwrap(), tm.bvconst_u64(8, 0x55).unwrap());
    }

    #[test]
    fn test_reductions() {
        let mut tm = TermManager::init();
        let ones = tm.bvconst_minus_one(8).unwrap();
        let one_bit = tm.bvconst_one(1).unwrap();
        assert_eq!(tm.redand(ones).unwrap(), one_bit);
        let bv8 = tm.bv_type(8).unwrap();
        let x = tm.new_uninterpreted(bv8).unwrap();
        assert_eq!(tm.redcomp(x, x).unwrap(), one_bit);
        let r = tm.redor(x).unwrap();
        assert_eq!(tm.bitsize(r).unwrap(), 1);
    }

    #[test]
    fn test_division_folding() {
        let mut tm = TermManager::init();
        let c = |tm: &mut TermManager, v: u64| tm.bvconst_u64(8, v).unwrap();
        let (seven, two, zero) = (c(&mut tm, 7), c(&mut tm, 2), c(&mut tm, 0));
        let minus_seven = c(&mut tm, 249);
        assert_eq!(tm.bvdiv(seven, two).unwrap(), c(&mut tm, 3));
        assert_eq!(tm.bvrem(seven, two).unwrap(), c(&mut tm, 1));
        assert_eq!(tm.bvdiv(seven, zero).unwrap(), c(&mut tm, 255));
        assert_eq!(tm.bvrem(seven, zero).unwrap(), seven);
        assert_eq!(tm.bvsdiv(minus_seven, two).unwrap(), c(&mut tm, 253));
        assert_eq!(tm.bvsrem(minus_seven, two).unwrap(), c(&mut tm, 255));
        assert_eq!(tm.bvsmod(minus_seven, two).unwrap(), c(&mut tm, 1));
    }

    #[test]
    fn test_comparisons_fold_on_bounds() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let x = tm.new_uninterpreted(bv8).unwrap();
        let zero = tm.bvconst_zero(8).unwrap();
        let ones = tm.bvconst_minus_one(8).unwrap();
        assert_eq!(tm.bvge(x, zero).unwrap(), Term::TRUE);
        assert_eq!(tm.bvlt(x, zero).unwrap(), Term::FALSE);
        assert_eq!(tm.bvle(x, ones).unwrap(), Term::TRUE);
        let low = tm.shift_right0(x, 1).unwrap();
        let top = tm.bvconst_u64(8, 0x80).unwrap();
        assert_eq!(tm.bvlt(low, top).unwrap(), Term::TRUE);
        assert_eq!(tm.bvsge(low, zero).unwrap(), Term::TRUE);
        assert_eq!(tm.bvslt(top, x).unwrap(), !tm.bvsge(top, x).unwrap());
        let ge = tm.bvge(x, top).unwrap();
        assert_eq!(tm.terms().kind(ge), &TermKind::BvGe(x, top));
        assert_eq!(tm.bvgt(top, x).unwrap(), !ge);
    }

    #[test]
    fn test_bveq_normalization() {
        let mut tm = TermManager::init();
        let bv8 = tm.bv_type(8).unwrap();
        let x = tm.new_uninterpreted(bv8).unwrap();
        let y = tm.new_uninterpreted(bv8).unwrap();
        let e = tm.bveq(x, y).unwrap();
        assert_eq!(tm.bveq(y, x).unwrap(), e);
        assert_eq!(tm.eq(x, y).unwrap(), e);
        let one = tm.bvconst_one(8).unwrap();
        let x1 = tm.bvadd(x, one).unwrap();
        assert_eq!(tm.bveq(x, x1).unwrap(), Term::FALSE);
        assert_eq!(tm.bvneq(x, x1).unwrap(), Term::TRUE);
    }

    #[quickcheck]
    fn prop_constant_bitwise_ops_fold(a: u8, b: u8) -> bool {
        let mut tm = TermManager::init();
        let ta = tm.bvconst_u64(8, a as u64).unwrap();
        let tb = tm.bvconst_u64(8, b as u64).unwrap();
        let and = tm.bvand(ta, tb).unwrap();
        let or = tm.bvor(ta, tb).unwrap();
        let xor = tm.bvxor(ta, tb).unwrap();
        let add = tm.bvadd(ta, tb).unwrap();
        value(&tm, and) == Some(BigUint::from(a & b))
            && value(&tm, or) == Some(BigUint::from(a | b))
            && value(&tm, xor) == Some(BigUint::from(a ^ b))
            && value(&tm, add) == Some(BigUint::from(a.wrapping_add(b)))
    }

    #[quickcheck]
    fn prop_constant_comparisons_fold(a: u8, b: u8) -> bool {
        let mut tm = TermManager::init();
        let ta = tm.bvconst_u64(8, a as u64).unwrap();
        let tb = tm.bvconst_u64(8, b as u64).unwrap();
        let as_term = |v: bool| if v { Term::TRUE } else { Term::FALSE };
        tm.bvge(ta, tb).unwrap() == as_term(a >= b)
            && tm.bvlt(ta, tb).unwrap() == as_term(a < b)
            && tm.bvsge(ta, tb).unwrap() == as_term(a as i8 >= b as i8)
            && tm.bvsgt(ta, tb).unwrap() == as_term(a as i8 > b as i8)
            && tm.bveq(ta, tb).unwrap() == as_term(a == b)
    }
}
