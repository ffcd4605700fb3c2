use std::fmt::Display;

use thiserror::Error;

use crate::{terms::Term, types::TypeId};

/// Plain error codes, one per kind of validation or resource failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    PosIntRequired,
    TooManyArguments,
    TooManyVars,
    MaxBvSizeExceeded,
    DegreeOverflow,
    InvalidType,
    InvalidTerm,
    InvalidConstantIndex,
    ScalarOrUtypeRequired,
    TypeMismatch,
    IncompatibleTypes,
    ArithTermRequired,
    BitvectorRequired,
    FunctionRequired,
    WrongNumberOfArguments,
    TupleRequired,
    InvalidTupleIndex,
    VariableRequired,
    DuplicateVariable,
    IncompatibleBvSizes,
    InvalidBitshift,
    InvalidBvExtract,
    InvalidBvSignExtend,
    InvalidBvZeroExtend,
    EmptyBitvector,
    NonnegIntRequired,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCode::PosIntRequired => "POS_INT_REQUIRED",
            ErrorCode::TooManyArguments => "TOO_MANY_ARGUMENTS",
            ErrorCode::TooManyVars => "TOO_MANY_VARS",
            ErrorCode::MaxBvSizeExceeded => "MAX_BVSIZE_EXCEEDED",
            ErrorCode::DegreeOverflow => "DEGREE_OVERFLOW",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidTerm => "INVALID_TERM",
            ErrorCode::InvalidConstantIndex => "INVALID_CONSTANT_INDEX",
            ErrorCode::ScalarOrUtypeRequired => "SCALAR_OR_UTYPE_REQUIRED",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::IncompatibleTypes => "INCOMPATIBLE_TYPES",
            ErrorCode::ArithTermRequired => "ARITHTERM_REQUIRED",
            ErrorCode::BitvectorRequired => "BITVECTOR_REQUIRED",
            ErrorCode::FunctionRequired => "FUNCTION_REQUIRED",
            ErrorCode::WrongNumberOfArguments => "WRONG_NUMBER_OF_ARGUMENTS",
            ErrorCode::TupleRequired => "TUPLE_REQUIRED",
            ErrorCode::InvalidTupleIndex => "INVALID_TUPLE_INDEX",
            ErrorCode::VariableRequired => "VARIABLE_REQUIRED",
            ErrorCode::DuplicateVariable => "DUPLICATE_VARIABLE",
            ErrorCode::IncompatibleBvSizes => "INCOMPATIBLE_BVSIZES",
            ErrorCode::InvalidBitshift => "INVALID_BITSHIFT",
            ErrorCode::InvalidBvExtract => "INVALID_BVEXTRACT",
            ErrorCode::InvalidBvSignExtend => "INVALID_BVSIGNEXTEND",
            ErrorCode::InvalidBvZeroExtend => "INVALID_BVZEROEXTEND",
            ErrorCode::EmptyBitvector => "EMPTY_BITVECTOR",
            ErrorCode::NonnegIntRequired => "NONNEG_INT_REQUIRED",
        };
        write!(f, "{}", s)
    }
}

/// The error type of all checked constructors.
///
/// Every variant carries the offending handles and values, so that the error doubles as the last-error record of the [`TermManager`](crate::TermManager).
/// Positions (`index`) refer to the argument list of the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("positive integer required (got {badval})")]
    PosIntRequired { badval: i64 },

    #[error("too many arguments ({badval})")]
    TooManyArguments { badval: i64 },

    #[error("too many variables ({badval})")]
    TooManyVars { badval: i64 },

    #[error("maximal bit-vector size exceeded ({badval})")]
    MaxBvSizeExceeded { badval: i64 },

    #[error("maximal polynomial degree exceeded ({badval})")]
    DegreeOverflow { badval: i64 },

    #[error("invalid type {type1}")]
    InvalidType { type1: TypeId, index: Option<usize> },

    #[error("invalid term {term1}")]
    InvalidTerm { term1: Term, index: Option<usize> },

    #[error("invalid constant index {badval} for type {type1}")]
    InvalidConstantIndex { type1: TypeId, badval: i64 },

    #[error("type {type1} is neither scalar nor uninterpreted")]
    ScalarOrUtypeRequired { type1: TypeId },

    #[error("term {term1} does not have type {type1}")]
    TypeMismatch {
        term1: Term,
        type1: TypeId,
        index: Option<usize>,
    },

    #[error("incompatible types: {term1} has type {type1}, {term2} has type {type2}")]
    IncompatibleTypes {
        term1: Term,
        type1: TypeId,
        term2: Term,
        type2: TypeId,
    },

    #[error("arithmetic term required ({term1})")]
    ArithTermRequired { term1: Term },

    #[error("bit-vector term required ({term1})")]
    BitvectorRequired { term1: Term },

    #[error("function term required ({term1})")]
    FunctionRequired { term1: Term },

    #[error("wrong number of arguments ({badval}) for function type {type1}")]
    WrongNumberOfArguments { type1: TypeId, badval: i64 },

    #[error("tuple term required ({term1})")]
    TupleRequired { term1: Term },

    #[error("invalid tuple index {badval} for type {type1}")]
    InvalidTupleIndex { type1: TypeId, badval: i64 },

    #[error("variable required ({term1})")]
    VariableRequired { term1: Term, index: usize },

    #[error("duplicate variable {term1}")]
    DuplicateVariable { term1: Term, index: usize },

    #[error("incompatible bit-vector sizes: {term1} has type {type1}, {term2} has type {type2}")]
    IncompatibleBvSizes {
        term1: Term,
        type1: TypeId,
        term2: Term,
        type2: TypeId,
    },

    #[error("invalid shift amount {badval}")]
    InvalidBitshift { badval: i64 },

    #[error("invalid bit-vector extraction [{low}, {high}] from {term1}")]
    InvalidBvExtract { term1: Term, low: u32, high: u32 },

    #[error("invalid sign extension by {badval}")]
    InvalidBvSignExtend { badval: i64 },

    #[error("invalid zero extension by {badval}")]
    InvalidBvZeroExtend { badval: i64 },

    #[error("empty bit-vector")]
    EmptyBitvector,

    #[error("non-negative integer required (got {badval})")]
    NonnegIntRequired { badval: i64 },
}

impl TermError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TermError::PosIntRequired { .. } => ErrorCode::PosIntRequired,
            TermError::TooManyArguments { .. } => ErrorCode::TooManyArguments,
            TermError::TooManyVars { .. } => ErrorCode::TooManyVars,
            TermError::MaxBvSizeExceeded { .. } => ErrorCode::MaxBvSizeExceeded,
            TermError::DegreeOverflow { .. } => ErrorCode::DegreeOverflow,
            TermError::InvalidType { .. } => ErrorCode::InvalidType,
            TermError::InvalidTerm { .. } => ErrorCode::InvalidTerm,
            TermError::InvalidConstantIndex { .. } => ErrorCode::InvalidConstantIndex,
            TermError::ScalarOrUtypeRequired { .. } => ErrorCode::ScalarOrUtypeRequired,
            TermError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            TermError::IncompatibleTypes { .. } => ErrorCode::IncompatibleTypes,
            TermError::ArithTermRequired { .. } => ErrorCode::ArithTermRequired,
            TermError::BitvectorRequired { .. } => ErrorCode::BitvectorRequired,
            TermError::FunctionRequired { .. } => ErrorCode::FunctionRequired,
            TermError::WrongNumberOfArguments { .. } => ErrorCode::WrongNumberOfArguments,
            TermError::TupleRequired { .. } => ErrorCode::TupleRequired,
            TermError::InvalidTupleIndex { .. } => ErrorCode::InvalidTupleIndex,
            TermError::VariableRequired { .. } => ErrorCode::VariableRequired,
            TermError::DuplicateVariable { .. } => ErrorCode::DuplicateVariable,
            TermError::IncompatibleBvSizes { .. } => ErrorCode::IncompatibleBvSizes,
            TermError::InvalidBitshift { .. } => ErrorCode::InvalidBitshift,
            TermError::InvalidBvExtract { .. } => ErrorCode::InvalidBvExtract,
            TermError::InvalidBvSignExtend { .. } => ErrorCode::InvalidBvSignExtend,
            TermError::InvalidBvZeroExtend { .. } => ErrorCode::InvalidBvZeroExtend,
            TermError::EmptyBitvector => ErrorCode::EmptyBitvector,
            TermError::NonnegIntRequired { .. } => ErrorCode::NonnegIntRequired,
        }
    }

    /// The first offending term, if the error carries one.
    pub fn term1(&self) -> Option<Term> {
        match self {
            TermError::InvalidTerm { term1, .. }
            | TermError::TypeMismatch { term1, .. }
            | TermError::IncompatibleTypes { term1, .. }
            | TermError::ArithTermRequired { term1 }
            | TermError::BitvectorRequired { term1 }
            | TermError::FunctionRequired { term1 }
            | TermError::TupleRequired { term1 }
            | TermError::VariableRequired { term1, .. }
            | TermError::DuplicateVariable { term1, .. }
            | TermError::IncompatibleBvSizes { term1, .. }
            | TermError::InvalidBvExtract { term1, .. } => Some(*term1),
            _ => None,
        }
    }

    /// The first offending type, if the error carries one.
    pub fn type1(&self) -> Option<TypeId> {
        match self {
            TermError::InvalidType { type1, .. }
            | TermError::InvalidConstantIndex { type1, .. }
            | TermError::ScalarOrUtypeRequired { type1 }
            | TermError::TypeMismatch { type1, .. }
            | TermError::IncompatibleTypes { type1, .. }
            | TermError::WrongNumberOfArguments { type1, .. }
            | TermError::InvalidTupleIndex { type1, .. }
            | TermError::IncompatibleBvSizes { type1, .. } => Some(*type1),
            _ => None,
        }
    }

    /// The offending integer argument, if any.
    pub fn badval(&self) -> Option<i64> {
        match self {
            TermError::PosIntRequired { badval }
            | TermError::TooManyArguments { badval }
            | TermError::TooManyVars { badval }
            | TermError::MaxBvSizeExceeded { badval }
            | TermError::DegreeOverflow { badval }
            | TermError::InvalidConstantIndex { badval, .. }
            | TermError::WrongNumberOfArguments { badval, .. }
            | TermError::InvalidTupleIndex { badval, .. }
            | TermError::InvalidBitshift { badval }
            | TermError::InvalidBvSignExtend { badval }
            | TermError::InvalidBvZeroExtend { badval }
            | TermError::NonnegIntRequired { badval } => Some(*badval),
            _ => None,
        }
    }

    /// Position of the offending argument, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            TermError::InvalidType { index, .. }
            | TermError::InvalidTerm { index, .. }
            | TermError::TypeMismatch { index, .. } => *index,
            TermError::VariableRequired { index, .. }
            | TermError::DuplicateVariable { index, .. } => Some(*index),
            _ => None,
        }
    }
}
