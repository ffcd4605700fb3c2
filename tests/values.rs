use num_bigint::BigInt;
use num_rational::BigRational;
use termdag::{Analyzer, Skolemizer, Term, TermKind, TermManager, TypeId, Value, ValueTable};

fn elem(tau: TypeId, index: u32) -> Value {
    Value::Uninterpreted { tau, index }
}

#[test]
fn skolem_function_values_get_representatives() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let u = tm.uninterpreted_type();
    let y = tm.new_variable(u).unwrap();
    let x = tm.new_variable(u).unwrap();
    let a = tm.new_uninterpreted(u).unwrap();

    // forall y. exists x. x != y
    let ne = tm.neq(x, y).unwrap();
    let ex = tm.exists(&[x], ne).unwrap();
    let all = tm.forall(&[y], ex).unwrap();
    let mut analyzer = Analyzer::new();
    Skolemizer::new(&mut tm, &mut analyzer, true, true)
        .skolemize(all)
        .unwrap();
    let f = analyzer.skolem_of(x).unwrap();

    // a = u0, f(u0) = u1, f(u1) = u0
    let fun = Value::Function {
        entries: vec![
            (vec![elem(u, 0)], elem(u, 1)),
            (vec![elem(u, 1)], elem(u, 0)),
        ],
        default: None,
    };
    let mut table = ValueTable::new();
    table.fill(&mut tm, &[(a, elem(u, 0)), (f, fun)]).unwrap();

    let c0 = table.value_term(&elem(u, 0)).unwrap();
    let c1 = table.value_term(&elem(u, 1)).unwrap();
    assert_eq!(table.get_value_rep(&mut tm, c0), a);
    let fa = tm.app(f, &[a]).unwrap();
    assert_eq!(table.get_value_rep(&mut tm, c1), fa);

    let mut values = [c1, c0];
    table.set_values_from_table(&mut tm, &mut values);
    assert_eq!(values, [fa, a]);

    let scalar = table.constraint_scalar(&mut tm, &[a], Some(0)).unwrap();
    assert_eq!(scalar, tm.eq(a, c0).unwrap());
}

#[test]
fn rational_and_tuple_values() {
    let mut tm = TermManager::init();
    let tau = tm.tuple_type(&[TypeId::BOOL, TypeId::REAL]).unwrap();
    let t = tm.new_uninterpreted(tau).unwrap();
    let r = tm.new_uninterpreted(TypeId::REAL).unwrap();
    let half = Value::Rational(BigRational::new(BigInt::from(1), BigInt::from(2)));
    let pair = Value::Tuple(vec![Value::Bool(false), half.clone()]);
    let mut table = ValueTable::new();
    table
        .fill(&mut tm, &[(t, pair.clone()), (r, half.clone())])
        .unwrap();

    let th = table.value_term(&half).unwrap();
    let tp = table.value_term(&pair).unwrap();
    assert_eq!(tp, tm.tuple(&[Term::FALSE, th]).unwrap());
    assert_eq!(table.representative(tp), Some(t));
    assert_eq!(table.representative(th), Some(r));
    // no uninterpreted values, nothing to constrain
    assert_eq!(table.constraint_distinct(&mut tm), Term::TRUE);
    assert!(!table.to_string().is_empty());
}

#[test]
fn representatives_respect_function_domains() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tm = TermManager::init();
    let fty = tm.function_type(&[TypeId::INT], TypeId::INT).unwrap();
    let f = tm.new_uninterpreted(fty).unwrap();
    let x = tm.new_uninterpreted(TypeId::REAL).unwrap();
    let n = tm.new_uninterpreted(TypeId::INT).unwrap();
    let int = |i: i64| Value::Rational(BigRational::from_integer(BigInt::from(i)));
    let fun = Value::Function {
        entries: vec![(vec![int(3)], int(5))],
        default: None,
    };

    // 3 is represented by the real x, which cannot be passed to f
    let mut table = ValueTable::new();
    table.fill(&mut tm, &[(x, int(3)), (f, fun.clone())]).unwrap();
    let three = table.value_term(&int(3)).unwrap();
    let five = table.value_term(&int(5)).unwrap();
    assert_eq!(table.get_value_rep(&mut tm, three), x);
    let rep = table.get_value_rep(&mut tm, five);
    assert_eq!(rep, tm.app(f, &[three]).unwrap());
    let domain = tm.types().function_domain(fty).unwrap().to_vec();
    match tm.terms().kind(rep).clone() {
        TermKind::App(g, args) => {
            assert_eq!(g, f);
            let tau = tm.type_of(args[0]).unwrap();
            assert!(tm.types().is_subtype(tau, domain[0]));
        }
        k => panic!("expected an application, got {:?}", k),
    }

    // an integer representative is used
    let mut table = ValueTable::new();
    table.fill(&mut tm, &[(n, int(3)), (x, int(3)), (f, fun)]).unwrap();
    let five = table.value_term(&int(5)).unwrap();
    assert_eq!(table.get_value_rep(&mut tm, five), tm.app(f, &[n]).unwrap());
}
