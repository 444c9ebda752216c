use graph_dissect::prelude::*;

fn grid(rows: usize, cols: usize) -> Graph {
    let at = |r: usize, c: usize| r * cols + c;
    let mut edges = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            if c + 1 < cols {
                edges.push((at(r, c), at(r, c + 1)));
            }
            if r + 1 < rows {
                edges.push((at(r, c), at(r + 1, c)));
            }
        }
    }
    Graph::from_edges(0, rows * cols, &edges).unwrap()
}

fn fresh(rows: usize, cols: usize) -> SepGraph {
    SepGraph::new(grid(rows, cols), 0).unwrap()
}

/// Concat with Empty on either side transitions the state exactly as the
/// method alone does.
#[test]
fn concat_with_empty_is_identity() {
    let m = || Strategy::<SepDomain>::method(SepMethod::Bisect);

    let mut alone = fresh(5, 5);
    separate(&mut alone, &m()).unwrap();

    let mut left = fresh(5, 5);
    separate(&mut left, &Strategy::empty().then(m())).unwrap();

    let mut right = fresh(5, 5);
    separate(&mut right, &m().then(Strategy::empty())).unwrap();

    assert_eq!(alone.parts(), left.parts());
    assert_eq!(alone.parts(), right.parts());
    assert_eq!(alone.frontier(), left.frontier());
    assert_eq!(alone.frontier(), right.frontier());
}

/// The partition identity holds for every separation produced by the
/// built-in methods.
#[test]
fn parts_partition_the_graph() {
    for method in [SepMethod::Zero, SepMethod::Bisect, SepMethod::GreedyGrow] {
        let mut sep = fresh(6, 5);
        separate(&mut sep, &Strategy::method(method)).unwrap();
        assert_eq!(
            sep.comp_size(0) + sep.comp_size(1) + sep.frontier().len(),
            30,
            "{method:?}"
        );
        sep.validate_invariants().unwrap();
    }
}

/// Select evaluates both branches from the same snapshot and commits the
/// better outcome, so its frontier never exceeds either branch's.
#[test]
fn select_frontier_upper_bound() {
    let a = || Strategy::<SepDomain>::method(SepMethod::Bisect);
    let b = || {
        Strategy::method_with(
            SepMethod::GreedyGrow,
            SepMethodParams::Greedy(GreedyParams { passes: 4, seed: 9 }),
        )
    };

    let mut alone_a = fresh(7, 7);
    separate(&mut alone_a, &a()).unwrap();
    let mut alone_b = fresh(7, 7);
    separate(&mut alone_b, &b()).unwrap();
    let mut picked = fresh(7, 7);
    separate(&mut picked, &Strategy::select(a(), b())).unwrap();

    let bound = alone_a.frontier().len().min(alone_b.frontier().len());
    assert!(picked.frontier().len() <= bound);
    picked.validate_invariants().unwrap();
}

/// Select ties on frontier size break toward the smaller absolute load
/// imbalance.
#[test]
fn select_breaks_ties_on_imbalance() {
    let a = || Strategy::<SepDomain>::method(SepMethod::Bisect);
    let mut alone = fresh(6, 6);
    separate(&mut alone, &a()).unwrap();
    let mut picked = fresh(6, 6);
    separate(&mut picked, &Strategy::select(a(), a())).unwrap();
    assert_eq!(picked.frontier(), alone.frontier());
    assert_eq!(picked.load_delta(), alone.load_delta());
}

/// A failing first branch short-circuits the concatenation: the second
/// strategy never runs and the state is left as the failure found it.
#[test]
fn concat_short_circuits_on_failure() {
    let bad = Strategy::cond(
        CondExpr::log(true).add(CondExpr::int(1)),
        Strategy::method(SepMethod::Zero),
        None,
    );
    let strat = bad.then(Strategy::method(SepMethod::Bisect));
    let mut sep = fresh(4, 4);
    let err = separate(&mut sep, &strat).unwrap_err();
    assert!(matches!(err, DissectError::InvalidStrategy(_)));
    // Bisect never ran.
    assert!(sep.frontier().is_empty());
    assert_eq!(sep.comp_size(0), 16);
}

/// Condition arithmetic: integers promote to doubles, comparisons yield
/// booleans, and field references read the live state.
#[test]
fn condition_arithmetic_and_fields() {
    let tab = SepDomain::tab();
    let vert = || CondExpr::field(tab.cond_field_id("vert").unwrap());
    let load = || CondExpr::field(tab.cond_field_id("load").unwrap());

    // On a unit-load 4x4 grid: vert == load == 16.
    let sep = fresh(4, 4);
    let t = vert().eq(load());
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Log(true));

    let t = vert().mul(CondExpr::int(2)).gt(CondExpr::int(31));
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Log(true));

    let t = vert().add(CondExpr::dbl(0.5));
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Dbl(16.5));

    let t = vert().rem(CondExpr::int(5));
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Int(1));

    let t = vert().lt(CondExpr::int(3)).or(load().gt(CondExpr::int(3)));
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Log(true));

    let t = vert().lt(CondExpr::int(3)).not();
    assert_eq!(tab.eval_test(&sep, &t).unwrap(), CondVal::Log(true));
}

/// A non-boolean condition result and boolean comparands are rejected as
/// invalid strategies.
#[test]
fn malformed_conditions_are_rejected() {
    let mut sep = fresh(3, 3);

    // Cond test evaluates to an integer, not a boolean.
    let strat = Strategy::cond(CondExpr::int(1), Strategy::method(SepMethod::Zero), None);
    assert!(matches!(
        separate(&mut sep, &strat),
        Err(DissectError::InvalidStrategy(_))
    ));

    // Boolean operand under a comparison.
    let strat = Strategy::cond(
        CondExpr::log(true).lt(CondExpr::int(2)),
        Strategy::method(SepMethod::Zero),
        None,
    );
    assert!(matches!(
        separate(&mut sep, &strat),
        Err(DissectError::InvalidStrategy(_))
    ));

    // Integer operand under a logical connective.
    let strat = Strategy::cond(
        CondExpr::int(1).and(CondExpr::log(true)),
        Strategy::method(SepMethod::Zero),
        None,
    );
    assert!(matches!(
        separate(&mut sep, &strat),
        Err(DissectError::InvalidStrategy(_))
    ));
}

/// Cond without an else-branch succeeds trivially on a false test.
#[test]
fn false_condition_without_else_is_success() {
    let mut sep = fresh(3, 3);
    let strat = Strategy::cond(
        CondExpr::log(false),
        Strategy::method(SepMethod::Bisect),
        None,
    );
    separate(&mut sep, &strat).unwrap();
    assert!(sep.frontier().is_empty());
}

/// The same strategy tree may be evaluated concurrently on independent
/// states.
#[test]
fn strategy_trees_are_reentrant() {
    let strat = default_separation_strategy();
    let mut a = fresh(6, 6);
    let mut b = fresh(6, 6);
    std::thread::scope(|s| {
        let strat = &strat;
        let ha = s.spawn({
            let a = &mut a;
            move || separate(a, strat)
        });
        let hb = s.spawn({
            let b = &mut b;
            move || separate(b, strat)
        });
        ha.join().unwrap().unwrap();
        hb.join().unwrap().unwrap();
    });
    assert_eq!(a.parts(), b.parts());
}
