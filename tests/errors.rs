use termdag::{ErrorCode, Term, TermManager, TypeId, MAX_BVSIZE, MAX_DEGREE};

fn code<T: std::fmt::Debug>(r: Result<T, termdag::TermError>) -> ErrorCode {
    r.unwrap_err().code()
}

#[test]
fn constructors_report_error_codes() {
    let mut tm = TermManager::init();
    let bv8 = tm.bv_type(8).unwrap();
    let bv4 = tm.bv_type(4).unwrap();
    let s3 = tm.scalar_type(3).unwrap();
    let x = tm.new_uninterpreted(bv8).unwrap();
    let y = tm.new_uninterpreted(bv4).unwrap();
    let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
    let p = tm.new_uninterpreted(TypeId::BOOL).unwrap();
    let v = tm.new_variable(TypeId::REAL).unwrap();

    assert_eq!(code(tm.bv_type(0)), ErrorCode::PosIntRequired);
    assert_eq!(code(tm.bv_type(MAX_BVSIZE + 1)), ErrorCode::MaxBvSizeExceeded);
    assert_eq!(code(tm.constant(TypeId::INT, 0)), ErrorCode::ScalarOrUtypeRequired);
    assert_eq!(code(tm.constant(s3, 3)), ErrorCode::InvalidConstantIndex);
    assert_eq!(code(tm.not(r)), ErrorCode::TypeMismatch);
    assert_eq!(code(tm.add(x, r)), ErrorCode::ArithTermRequired);
    assert_eq!(code(tm.bvadd(x, y)), ErrorCode::IncompatibleBvSizes);
    assert_eq!(code(tm.bvneg(r)), ErrorCode::BitvectorRequired);
    assert_eq!(code(tm.eq(x, r)), ErrorCode::IncompatibleTypes);
    assert_eq!(code(tm.app(r, &[x])), ErrorCode::FunctionRequired);
    assert_eq!(code(tm.select(r, 0)), ErrorCode::TupleRequired);
    assert_eq!(code(tm.shift_left0(x, 9)), ErrorCode::InvalidBitshift);
    assert_eq!(code(tm.bvextract(x, 3, 8)), ErrorCode::InvalidBvExtract);
    assert_eq!(code(tm.sign_extend(x, -1)), ErrorCode::NonnegIntRequired);
    assert_eq!(
        code(tm.zero_extend(x, i64::from(MAX_BVSIZE))),
        ErrorCode::InvalidBvZeroExtend
    );
    assert_eq!(
        code(tm.sign_extend(x, i64::from(MAX_BVSIZE))),
        ErrorCode::InvalidBvSignExtend
    );
    assert_eq!(code(tm.bvconst_from_bits(&[])), ErrorCode::EmptyBitvector);
    assert_eq!(code(tm.power(r, MAX_DEGREE + 1)), ErrorCode::DegreeOverflow);
    assert_eq!(code(tm.forall(&[r], p)), ErrorCode::VariableRequired);
    assert_eq!(code(tm.forall(&[v, v], p)), ErrorCode::DuplicateVariable);
    assert_eq!(code(tm.type_of(Term::NULL)), ErrorCode::InvalidTerm);

    let fty = tm.function_type(&[TypeId::REAL, TypeId::REAL], TypeId::BOOL).unwrap();
    let f = tm.new_uninterpreted(fty).unwrap();
    assert_eq!(code(tm.app(f, &[r])), ErrorCode::WrongNumberOfArguments);
    let pair = tm.tuple(&[r, p]).unwrap();
    assert_eq!(code(tm.select(pair, 2)), ErrorCode::InvalidTupleIndex);
    assert_eq!(code(tm.new_uninterpreted(TypeId::NULL)), ErrorCode::InvalidType);
}

#[test]
fn last_error_keeps_the_first_failure() {
    let mut tm = TermManager::init();
    let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
    assert!(tm.last_error().is_none());

    let err = tm.bvneg(r).unwrap_err();
    assert_eq!(err.term1(), Some(r));
    assert!(tm.not(Term::NULL).is_err());
    let last = tm.last_error().unwrap();
    assert_eq!(last.code(), ErrorCode::BitvectorRequired);
    assert_eq!(last, &err);

    tm.clear_error();
    let bv8 = tm.bv_type(8).unwrap();
    let x = tm.new_uninterpreted(bv8).unwrap();
    assert!(tm.shift_left0(x, 20).is_err());
    let last = tm.last_error().unwrap();
    assert_eq!(last.code(), ErrorCode::InvalidBitshift);
    assert_eq!(last.badval(), Some(20));
}

#[test]
fn failed_calls_change_nothing() {
    let mut tm = TermManager::init();
    let bv8 = tm.bv_type(8).unwrap();
    let x = tm.new_uninterpreted(bv8).unwrap();
    let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
    let (terms, types) = (tm.num_terms(), tm.num_types());
    assert!(tm.bvmul(x, r).is_err());
    assert!(tm.bvconcat(x, r).is_err());
    assert!(tm.mul(r, x).is_err());
    assert!(tm.bvrepeat(x, 0).is_err());
    assert!(tm.function_type(&[TypeId::NULL], TypeId::BOOL).is_err());
    assert_eq!(tm.num_terms(), terms);
    assert_eq!(tm.num_types(), types);
    assert_eq!(tm.pool().leased(), 0);
}

#[test]
fn cleanup_drains_every_buffer_list() {
    let mut tm = TermManager::init();
    let bv8 = tm.bv_type(8).unwrap();
    let bv100 = tm.bv_type(100).unwrap();
    let x = tm.new_uninterpreted(bv8).unwrap();
    let w = tm.new_uninterpreted(bv100).unwrap();
    let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
    tm.bvmul(x, x).unwrap();
    tm.bvmul(w, w).unwrap();
    tm.bvand(x, x).unwrap();
    tm.bvnot(w).unwrap();
    tm.mul(r, r).unwrap();
    assert_eq!(tm.pool().leased(), 0);
    assert!(tm.pool().free() >= 4);

    tm.cleanup();
    assert_eq!(tm.pool().free(), 0);
    assert_eq!(tm.pool().leased(), 0);
    assert!(tm.last_error().is_none());
    assert!(!tm.is_bitvector(x));
}
