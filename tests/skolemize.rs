use termdag::{
    free_vars, Analyzer, ErrorCode, Skolemizer, Term, TermKind, TermManager, TermSubst, TypeId,
    MAX_DEGREE,
};

fn count_foralls(tm: &TermManager, t: Term) -> usize {
    let kind = tm.terms().kind(t);
    let here = usize::from(matches!(kind, TermKind::Forall(..)));
    here + kind
        .children()
        .into_iter()
        .map(|c| count_foralls(tm, c))
        .sum::<usize>()
}

fn skolemize(tm: &mut TermManager, analyzer: &mut Analyzer, t: Term) -> Term {
    Skolemizer::new(tm, analyzer, true, true).skolemize(t).unwrap()
}

/// `P : (Real, Real) -> Bool` and two real variables.
fn predicate() -> (TermManager, Term, Term, Term) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let real = TypeId::REAL;
    let pty = tm.function_type(&[real, real], TypeId::BOOL).unwrap();
    let p = tm.new_uninterpreted(pty).unwrap();
    let x = tm.new_variable(real).unwrap();
    let y = tm.new_variable(real).unwrap();
    tm.set_term_name(x, "x").unwrap();
    tm.set_term_name(y, "y").unwrap();
    (tm, p, x, y)
}

#[test]
fn top_level_existential_keeps_universal() {
    let (mut tm, p, x, y) = predicate();
    // not (forall x. not (forall y. P(x, y)))
    let pxy = tm.app(p, &[x, y]).unwrap();
    let all_y = tm.forall(&[y], pxy).unwrap();
    let all_x = tm.forall(&[x], !all_y).unwrap();
    let mut analyzer = Analyzer::new();
    let r = skolemize(&mut tm, &mut analyzer, !all_x);
    assert_eq!(r, all_y);
    assert_eq!(analyzer.skolem_of(x), Some(x));
    assert_eq!(analyzer.num_skolem(), 0);
}

#[test]
fn existential_under_universal_becomes_function() {
    let (mut tm, p, x, y) = predicate();
    // forall y. not (forall x. not P(x, y))
    let pxy = tm.app(p, &[x, y]).unwrap();
    let all_x = tm.forall(&[x], !pxy).unwrap();
    let all_y = tm.forall(&[y], !all_x).unwrap();
    let mut analyzer = Analyzer::new();
    let r = skolemize(&mut tm, &mut analyzer, all_y);

    let f = analyzer.skolem_of(x).unwrap();
    let fty = tm.type_of(f).unwrap();
    assert_eq!(tm.types().function_domain(fty), Some(&[TypeId::REAL][..]));
    assert_eq!(tm.types().function_range(fty), Some(TypeId::REAL));
    assert_eq!(tm.term_name(f), Some("skolem0_x"));

    let fy = tm.app(f, &[y]).unwrap();
    let pfy = tm.app(p, &[fy, y]).unwrap();
    assert_eq!(r, tm.forall(&[y], pfy).unwrap());
}

#[test]
fn universals_are_preserved() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let int = TypeId::INT;
    let [x, y, z] = [int, int, int].map(|tau| tm.new_variable(tau).unwrap());
    let zero = tm.zero();
    let five = tm.integer(5);

    // (forall x. x >= 0 or exists y. x + y = 0) and exists z. not (z > 5)
    let x_pos = tm.arith_geq(x, zero).unwrap();
    let sum = tm.add(x, y).unwrap();
    let opp = tm.arith_eq0(sum).unwrap();
    let ex_y = tm.exists(&[y], opp).unwrap();
    let body = tm.or2(x_pos, ex_y).unwrap();
    let all_x = tm.forall(&[x], body).unwrap();
    let big = tm.arith_gt(z, five).unwrap();
    let ex_z = tm.exists(&[z], !big).unwrap();
    let t = tm.and2(all_x, ex_z).unwrap();

    let mut analyzer = Analyzer::new();
    let once = skolemize(&mut tm, &mut analyzer, t);
    assert_eq!(count_foralls(&tm, once), 1);
    assert_eq!(analyzer.skolem_of(z), Some(z));
    let f = analyzer.skolem_of(y).unwrap();
    assert_ne!(f, y);
    assert_eq!(analyzer.num_skolem(), 1);

    let free = free_vars(&tm, once);
    assert!(free.contains(&z));
    assert!(!free.contains(&x));
    assert!(!free.contains(&y));

    let mut again = Analyzer::new();
    let twice = skolemize(&mut tm, &mut again, once);
    assert_eq!(once, twice);
    assert!(again.existentials().is_empty());
}

#[test]
fn flattening_can_be_disabled() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let [c, p, q] = [0; 3].map(|_| tm.new_uninterpreted(TypeId::BOOL).unwrap());
    let i = tm.ite(c, p, q).unwrap();
    let mut analyzer = Analyzer::new();
    let kept = Skolemizer::new(&mut tm, &mut analyzer, false, false)
        .skolemize(i)
        .unwrap();
    assert_eq!(kept, i);
    let flat = Skolemizer::new(&mut tm, &mut analyzer, true, false)
        .skolemize(i)
        .unwrap();
    assert_ne!(flat, i);
}

#[test]
fn substitution_does_not_capture() {
    let (mut tm, p, x, y) = predicate();
    // forall y. P(x, y) with x := y
    let pxy = tm.app(p, &[x, y]).unwrap();
    let all = tm.forall(&[y], pxy).unwrap();
    let mut subst = TermSubst::new(&mut tm, &[(x, y)]).unwrap();
    let r = subst.apply(all, &mut tm).unwrap();
    let (vars, body) = match tm.terms().kind(r) {
        TermKind::Forall(vars, body) => (vars.clone(), *body),
        k => panic!("expected a quantifier, got {:?}", k),
    };
    assert_eq!(vars.len(), 1);
    assert_ne!(vars[0], y);
    let expected = tm.app(p, &[y, vars[0]]).unwrap();
    assert_eq!(body, expected);
    assert_eq!(free_vars(&tm, r).len(), 1);
}

#[test]
fn degree_bound_holds_under_quantifiers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let int = TypeId::INT;
    let x = tm.new_uninterpreted(int).unwrap();
    let y = tm.new_uninterpreted(int).unwrap();
    let v = tm.new_variable(int).unwrap();

    // forall v. exists w. x^2 * v >= w
    let w = tm.new_variable(int).unwrap();
    let x2 = tm.square(x).unwrap();
    let x2v = tm.mul(x2, v).unwrap();
    let ge = tm.arith_geq(x2v, w).unwrap();
    let ex = tm.exists(&[w], ge).unwrap();
    let all = tm.forall(&[v], ex).unwrap();

    let mut analyzer = Analyzer::new();
    let sk = Skolemizer::new(&mut tm, &mut analyzer, true, true)
        .skolemize(all)
        .unwrap();
    assert_eq!(analyzer.num_skolem(), 1);

    let big = tm.power(y, 40000).unwrap();
    let mut subst = TermSubst::new(&mut tm, &[(x, big)]).unwrap();
    let e = subst.apply(sk, &mut tm).unwrap_err();
    assert_eq!(e.code(), ErrorCode::DegreeOverflow);
    assert!(e.badval() > Some(i64::from(MAX_DEGREE)));
    assert_eq!(tm.last_error().map(|e| e.code()), Some(ErrorCode::DegreeOverflow));
}
