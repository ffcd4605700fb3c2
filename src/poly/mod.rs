//! Scratch buffers for building polynomials and bit-arrays.
//!
//! A constructor leases a buffer from the [`BufferPool`], fills it, finalizes it to a term and hands it back.

use num_bigint::BigUint;
use num_traits::One;

mod arith;
mod bvarith;
mod bvarith64;
mod bvlogic;

pub use arith::ArithBuffer;
pub use bvarith::BvArithBuffer;
pub use bvarith64::BvArith64Buffer;
pub use bvlogic::BvLogicBuffer;

pub(crate) use bvarith::{modulus, negate as bv_negate, normalize as bv_normalize};
pub(crate) use bvarith64::mask64;

/// A buffer that can be recycled.
pub trait Scratch: Default {
    /// Clears the content of the buffer.
    fn reset(&mut self);
}

/// Returns bit `i` of `x`.
pub(crate) fn big_bit(x: &BigUint, i: u32) -> bool {
    ((x >> i as usize) & BigUint::one()).is_one()
}

/// Free list of one kind of buffer.
#[derive(Debug, Default)]
pub struct BufferList<B> {
    free: Vec<B>,
    leased: usize,
}

impl<B: Scratch> BufferList<B> {
    /// Takes a cleared buffer out of the list, allocating one if the list is empty.
    pub fn take(&mut self) -> B {
        self.leased += 1;
        self.free.pop().unwrap_or_default()
    }

    /// Returns a leased buffer to the list.
    pub fn give(&mut self, mut buffer: B) {
        debug_assert!(self.leased > 0, "returning a buffer that was not leased");
        buffer.reset();
        self.leased = self.leased.saturating_sub(1);
        self.free.push(buffer);
    }

    /// Number of buffers currently leased out
    pub fn leased(&self) -> usize {
        self.leased
    }

    /// Number of buffers ready for reuse
    pub fn free(&self) -> usize {
        self.free.len()
    }

    /// Drops all free buffers.
    pub fn drain(&mut self) {
        self.free.clear();
    }
}

/// Pool of scratch buffers owned by the term manager.
#[derive(Debug, Default)]
pub struct BufferPool {
    arith: BufferList<ArithBuffer>,
    bvarith: BufferList<BvArithBuffer>,
    bvarith64: BufferList<BvArith64Buffer>,
    bvlogic: BufferList<BvLogicBuffer>,
}

impl BufferPool {
    pub fn arith(&mut self) -> &mut BufferList<ArithBuffer> {
        &mut self.arith
    }

    pub fn bvarith(&mut self) -> &mut BufferList<BvArithBuffer> {
        &mut self.bvarith
    }

    pub fn bvarith64(&mut self) -> &mut BufferList<BvArith64Buffer> {
        &mut self.bvarith64
    }

    pub fn bvlogic(&mut self) -> &mut BufferList<BvLogicBuffer> {
        &mut self.bvlogic
    }

    /// Total number of leased buffers, over all kinds.
    pub fn leased(&self) -> usize {
        self.arith.leased() + self.bvarith.leased() + self.bvarith64.leased() + self.bvlogic.leased()
    }

    /// Total number of free buffers, over all kinds.
    pub fn free(&self) -> usize {
        self.arith.free() + self.bvarith.free() + self.bvarith64.free() + self.bvlogic.free()
    }

    /// Drains every free list.
    pub fn drain(&mut self) {
        self.arith.drain();
        self.bvarith.drain();
        self.bvarith64.drain();
        self.bvlogic.drain();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_give_recycles() {
        let mut pool = BufferPool::default();
        let b = pool.arith().take();
        assert_eq!(pool.leased(), 1);
        pool.arith().give(b);
        assert_eq!(pool.leased(), 0);
        assert_eq!(pool.free(), 1);
        let _b = pool.arith().take();
        assert_eq!(pool.free(), 0);
    }

    #[test]
    fn test_drain_empties_every_list() {
        let mut pool = BufferPool::default();
        let a = pool.arith().take();
        let b = pool.bvarith().take();
        let c = pool.bvarith64().take();
        let d = pool.bvlogic().take();
        pool.arith().give(a);
        pool.bvarith().give(b);
        pool.bvarith64().give(c);
        pool.bvlogic().give(d);
        assert_eq!(pool.free(), 4);
        pool.drain();
        assert_eq!(pool.free(), 0);
        assert_eq!(pool.bvarith64().free(), 0);
    }

    #[test]
    fn test_given_buffers_are_reset() {
        let mut pool = BufferPool::default();
        let mut b = pool.bvlogic().take();
        b.set_constant_u64(4, 3);
        pool.bvlogic().give(b);
        let b = pool.bvlogic().take();
        assert_eq!(b.width(), 0);
    }

    #[test]
    fn test_big_bit() {
        let x = BigUint::from(0b1010u32);
        assert!(!big_bit(&x, 0));
        assert!(big_bit(&x, 1));
        assert!(big_bit(&x, 3));
        assert!(!big_bit(&x, 100));
    }
}
