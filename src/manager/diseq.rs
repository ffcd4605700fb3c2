use super::TermManager;
use crate::{
    terms::{Term, TermKind},
    types::TypeId,
};

/// Cheap syntactic disequality.
///
/// A `true` answer means the two terms denote different values in every interpretation.
/// `false` means nothing.
impl TermManager {
    /// Returns true if `t1` and `t2` are known to be distinct.
    /// Tuples and updates are explored with a worklist, so nesting depth is not bounded by the stack.
    pub(crate) fn disequal_terms(&mut self, t1: Term, t2: Term) -> bool {
        let mut todo = vec![(t1, t2)];
        while let Some((a, b)) = todo.pop() {
            if a == b {
                continue;
            }
            if self.disequal_leaves(a, b) {
                return true;
            }
            match (self.terms.kind(a), self.terms.kind(b)) {
                (TermKind::Tuple(xs), TermKind::Tuple(ys)) if xs.len() == ys.len() => {
                    todo.extend(xs.iter().copied().zip(ys.iter().copied()));
                }
                (TermKind::Update(f, xs, v), TermKind::Update(g, ys, w)) if f == g && xs == ys => {
                    todo.push((*v, *w));
                }
                _ => {}
            }
        }
        false
    }

    /// Disequality without looking into tuples or updates.
    fn disequal_leaves(&mut self, a: Term, b: Term) -> bool {
        let tau = self.terms.type_of(a);
        if tau == TypeId::BOOL {
            return a.opposite(b);
        }
        if self.types.is_arithmetic(tau) {
            return self.arith_must_differ(a, b);
        }
        if self.types.is_bitvector(tau) {
            return self.bv_must_differ(a, b);
        }
        matches!(
            (self.terms.kind(a), self.terms.kind(b)),
            (TermKind::Constant(..), TermKind::Constant(..))
        )
    }

    /// Returns true if `a[i]` and `b[i]` are known to be distinct for some `i`.
    pub(crate) fn disequal_term_arrays(&mut self, a: &[Term], b: &[Term]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b)
                .any(|(x, y)| self.disequal_terms(*x, *y))
    }

    /// Returns true if all terms are known to be distinct from each other.
    pub(crate) fn pairwise_disequal(&mut self, ts: &[Term]) -> bool {
        for (i, x) in ts.iter().enumerate() {
            for y in &ts[i + 1..] {
                if !self.disequal_terms(*x, *y) {
                    return false;
                }
            }
        }
        true
    }
}
