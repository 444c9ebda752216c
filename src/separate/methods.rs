//! Built-in vertex-separation methods.
//!
//! Each method honors the uniform call contract: mutate the [`SepGraph`]
//! into a valid two-way-plus-separator assignment and report its own
//! outcome. Randomized methods draw from a seeded generator so runs are
//! reproducible.

use std::collections::VecDeque;

use log::trace;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::error::{Result, invalid_strategy};

use super::{Part, SepGraph};

/// Codes of the registered separation methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SepMethod {
    /// Assign every vertex to the first part.
    Zero,
    /// Deterministic load-balanced index bisection.
    Bisect,
    /// Seeded greedy growing of the second part.
    GreedyGrow,
    /// Frontier-sweep separator refinement.
    Refine,
}

/// Typed parameter records, one variant per method.
#[derive(Clone, Debug)]
pub enum SepMethodParams {
    Zero,
    Bisect,
    Greedy(GreedyParams),
    Refine(RefineParams),
}

/// Parameters of the greedy-growing method.
#[derive(Clone, Copy, Debug)]
pub struct GreedyParams {
    /// Growing passes from distinct seed vertices; the best result wins.
    pub passes: usize,
    /// Seed of the per-call random generator.
    pub seed: u64,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self { passes: 5, seed: 42 }
    }
}

/// Parameters of the frontier refinement method.
#[derive(Clone, Copy, Debug)]
pub struct RefineParams {
    /// Maximum sweeps over the frontier.
    pub passes: usize,
    /// Maximum vertex moves per sweep.
    pub max_moves: usize,
    /// Tolerated load imbalance as a fraction of the total load.
    pub bal_ratio: f64,
}

impl Default for RefineParams {
    fn default() -> Self {
        Self { passes: 8, max_moves: 200, bal_ratio: 0.1 }
    }
}

fn wrong_params(name: &str) -> crate::error::DissectError {
    invalid_strategy(format!("parameter record of the wrong kind for method {name}"))
}

/// Moves every vertex back to the first part.
pub(super) fn sep_zero(sep: &mut SepGraph, params: &SepMethodParams) -> Result<()> {
    let SepMethodParams::Zero = params else {
        return Err(wrong_params("zero"));
    };
    sep.reset();
    Ok(())
}

/// Load-balanced index bisection: prefix vertices go to the first part until
/// half the total load, the rest to the second; every vertex adjacent to the
/// opposite part then moves into the separator. Deterministic, and cheap
/// enough to serve as an initial assignment for refinement.
pub(super) fn sep_bisect(sep: &mut SepGraph, params: &SepMethodParams) -> Result<()> {
    let SepMethodParams::Bisect = params else {
        return Err(wrong_params("bisect"));
    };
    let g = sep.graph();
    let n = g.vertex_count();
    let total = g.load_sum();
    let mut two_way = vec![Part::First; n];
    let mut cum = 0u64;
    for v in 0..n {
        cum += g.vertex_load(v);
        if cum * 2 > total {
            two_way[v] = Part::Second;
        }
    }
    let mut parts = two_way.clone();
    for v in 0..n {
        let other = two_way[v].opposite();
        if g.neighbors(v).iter().any(|&w| two_way[w] == other) {
            parts[v] = Part::Separator;
        }
    }
    sep.assign(parts);
    Ok(())
}

/// Greedy growing: per pass, grow the second part breadth-first from a
/// random seed vertex, carrying the moving frontier as separator, until the
/// grown load reaches the remaining first-part load. Drained queues re-seed
/// from leftover first-part vertices so disconnected graphs are covered.
/// The best pass by (frontier size, absolute load imbalance) is kept.
pub(super) fn sep_greedy_grow(sep: &mut SepGraph, params: &SepMethodParams) -> Result<()> {
    let SepMethodParams::Greedy(p) = params else {
        return Err(wrong_params("gg"));
    };
    let g = sep.graph();
    let n = g.vertex_count();
    if n == 0 {
        return Ok(());
    }
    let mut rng = SmallRng::seed_from_u64(p.seed);
    let mut best: Option<(Vec<Part>, usize, i64)> = None;
    for pass in 0..p.passes.max(1) {
        let mut parts = vec![Part::First; n];
        let mut load = [g.load_sum(), 0u64, 0u64];
        let mut queue = VecDeque::new();
        let seed = rng.gen_range(0..n);
        parts[seed] = Part::Separator;
        load[0] -= g.vertex_load(seed);
        load[2] += g.vertex_load(seed);
        queue.push_back(seed);
        let mut scan = 0;
        while load[1] < load[0] {
            let Some(v) = queue.pop_front() else {
                // Component exhausted: re-seed from the untouched remainder.
                while scan < n && parts[scan] != Part::First {
                    scan += 1;
                }
                if scan == n {
                    break;
                }
                parts[scan] = Part::Separator;
                load[0] -= g.vertex_load(scan);
                load[2] += g.vertex_load(scan);
                queue.push_back(scan);
                continue;
            };
            parts[v] = Part::Second;
            load[2] -= g.vertex_load(v);
            load[1] += g.vertex_load(v);
            for &w in g.neighbors(v) {
                if parts[w] == Part::First {
                    parts[w] = Part::Separator;
                    load[0] -= g.vertex_load(w);
                    load[2] += g.vertex_load(w);
                    queue.push_back(w);
                }
            }
        }
        let fron = parts.iter().filter(|&&p| p == Part::Separator).count();
        let delta = (load[0] as i64 - load[1] as i64).abs();
        trace!("gg pass {pass}: frontier {fron}, delta {delta}");
        if best.as_ref().is_none_or(|(_, bf, bd)| (fron, delta) < (*bf, *bd)) {
            best = Some((parts, fron, delta));
        }
    }
    let (parts, _, _) = best.expect("at least one growing pass");
    sep.assign(parts);
    Ok(())
}

/// Frontier refinement: sweep the separator moving vertices into the
/// lighter part whenever the separator load strictly decreases and the
/// imbalance stays within tolerance (or improves). Stops on a sweep
/// without an applied move.
pub(super) fn sep_refine(sep: &mut SepGraph, params: &SepMethodParams) -> Result<()> {
    let SepMethodParams::Refine(p) = params else {
        return Err(wrong_params("fm"));
    };
    let total = sep.graph().load_sum();
    let tolerated = (p.bal_ratio * total as f64) as i64;
    for pass in 0..p.passes.max(1) {
        let mut moved = 0usize;
        let sweep = sep.frontier().to_vec();
        for v in sweep {
            if moved >= p.max_moves {
                break;
            }
            if sep.part(v) != Part::Separator {
                continue; // pulled back in by an earlier move
            }
            let to = if sep.comp_load(0) <= sep.comp_load(1) { Part::First } else { Part::Second };
            let from = to.opposite();
            let lv = sep.graph().vertex_load(v);
            let pulled: u64 = sep
                .graph()
                .neighbors(v)
                .iter()
                .filter(|&&w| sep.part(w) == from)
                .map(|&w| sep.graph().vertex_load(w))
                .sum();
            if pulled >= lv {
                continue; // separator would not shrink
            }
            let delta = sep.load_delta();
            let new_delta = if to == Part::First {
                delta + lv as i64 + pulled as i64
            } else {
                delta - lv as i64 - pulled as i64
            };
            if new_delta.abs() > tolerated && new_delta.abs() > delta.abs() {
                continue;
            }
            sep.move_to(v, to);
            moved += 1;
        }
        sep.rebuild_frontier();
        trace!("fm pass {pass}: {moved} moves, frontier {}", sep.frontier().len());
        if moved == 0 {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::separate::{SepMethod, separate};
    use crate::strategy::Strategy;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(0, n, &edges).unwrap()
    }

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

    #[test]
    fn bisect_splits_a_ten_path_evenly() {
        let mut sep = SepGraph::new(path(10), 0).unwrap();
        separate(&mut sep, &Strategy::method(SepMethod::Bisect)).unwrap();
        assert_eq!(sep.comp_size(0), 4);
        assert_eq!(sep.comp_size(1), 4);
        assert_eq!(sep.frontier(), &[4, 5]);
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn zero_resets_a_previous_separation() {
        let mut sep = SepGraph::new(path(10), 0).unwrap();
        let strat =
            Strategy::method(SepMethod::Bisect).then(Strategy::method(SepMethod::Zero));
        separate(&mut sep, &strat).unwrap();
        assert_eq!(sep.comp_size(0), 10);
        assert!(sep.frontier().is_empty());
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn greedy_grow_covers_the_whole_graph() {
        let mut sep = SepGraph::new(grid(4, 4), 0).unwrap();
        separate(&mut sep, &Strategy::method(SepMethod::GreedyGrow)).unwrap();
        assert_eq!(sep.comp_size(0) + sep.comp_size(1) + sep.frontier().len(), 16);
        assert!(sep.comp_size(0) > 0 && sep.comp_size(1) > 0);
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn greedy_grow_handles_disconnected_graphs() {
        // Two disjoint 4-paths.
        let g = Graph::from_edges(0, 8, &[(0, 1), (1, 2), (2, 3), (4, 5), (5, 6), (6, 7)])
            .unwrap();
        let mut sep = SepGraph::new(g, 0).unwrap();
        separate(&mut sep, &Strategy::method(SepMethod::GreedyGrow)).unwrap();
        sep.validate_invariants().unwrap();
        assert_eq!(sep.comp_size(0) + sep.comp_size(1) + sep.frontier().len(), 8);
    }

    #[test]
    fn greedy_grow_is_deterministic_per_seed() {
        let run = |seed| {
            let mut sep = SepGraph::new(grid(5, 5), 0).unwrap();
            let params = SepMethodParams::Greedy(GreedyParams { passes: 3, seed });
            separate(
                &mut sep,
                &Strategy::method_with(SepMethod::GreedyGrow, params),
            )
            .unwrap();
            sep.parts().to_vec()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn refine_never_grows_the_separator() {
        let mut sep = SepGraph::new(grid(6, 6), 0).unwrap();
        separate(&mut sep, &Strategy::method(SepMethod::Bisect)).unwrap();
        let before = sep.frontier().len();
        separate(&mut sep, &Strategy::method(SepMethod::Refine)).unwrap();
        assert!(sep.frontier().len() <= before);
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn wrong_parameter_kind_is_rejected() {
        let mut sep = SepGraph::new(path(4), 0).unwrap();
        let strat = Strategy::method_with(SepMethod::Zero, SepMethodParams::Bisect);
        let err = separate(&mut sep, &strat).unwrap_err();
        assert!(matches!(err, crate::error::DissectError::InvalidStrategy(_)));
    }

    #[test]
    fn empty_graph_is_handled() {
        let g = Graph::from_adjacency(0, vec![0], vec![]).unwrap();
        let mut sep = SepGraph::new(g, 0).unwrap();
        separate(&mut sep, &Strategy::method(SepMethod::GreedyGrow)).unwrap();
        assert_eq!(sep.comp_size(0), 0);
    }
}
