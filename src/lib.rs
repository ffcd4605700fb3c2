mod error;
mod manager;
mod options;
mod poly;
mod skolem;
mod subst;
mod terms;
mod types;
mod values;

pub use error::{ErrorCode, TermError};
pub use manager::TermManager;
pub use options::{Options, MAX_ARITY, MAX_BVSIZE, MAX_DEGREE, MAX_VARS};
pub use poly::{
    ArithBuffer, BufferList, BufferPool, BvArith64Buffer, BvArithBuffer, BvLogicBuffer, Scratch,
};
pub use skolem::{Analyzer, Skolemizer};
pub use subst::{free_vars, TermSubst};
pub use terms::{BvOp, NameTable, PowerProduct, Term, TermKind, TermTable};
pub use types::{TypeId, TypeKind, TypeTable};
pub use values::{Value, ValueTable};
