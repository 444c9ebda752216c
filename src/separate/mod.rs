//! Vertex-separation state and the separation strategy family.
//!
//! A [`SepGraph`] wraps a halo-free [`Graph`] together with a two-way-plus-
//! separator part assignment, the frontier (separator vertex list), per-part
//! loads and sizes. Separation methods mutate it in place; the full
//! snapshot/restore protocol backs the `Select` combinator, ranking results
//! by frontier size first and absolute load imbalance second.

use once_cell::sync::Lazy;

use crate::error::{DissectError, Result, try_with_capacity};
use crate::graph::{Graph, HaloGraph};
use crate::strategy::{CondVal, ParamKind, SelectState, StratDomain, Strategy, StrategyTab};

mod methods;

pub use methods::{GreedyParams, RefineParams, SepMethod, SepMethodParams};

/// Part assignment of one vertex.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    First = 0,
    Second = 1,
    Separator = 2,
}

impl Part {
    pub fn index(self) -> usize {
        self as usize
    }

    /// The other of the two proper parts; must not be called on the
    /// separator.
    pub(crate) fn opposite(self) -> Part {
        match self {
            Part::First => Part::Second,
            Part::Second => Part::First,
            Part::Separator => unreachable!("separator has no opposite part"),
        }
    }
}

/// A graph under separation: part assignment, frontier and load accounting.
#[derive(Clone, Debug)]
pub struct SepGraph {
    g: Graph,
    parts: Vec<Part>,
    frontier: Vec<usize>,
    comp_load: [u64; 3],
    comp_size: [usize; 2],
    level: u32,
}

impl SepGraph {
    /// Wraps a graph with every vertex assigned to the first part and an
    /// empty frontier; the two target part weights are kept equal (1:1).
    pub fn new(g: Graph, level: u32) -> Result<Self> {
        let n = g.vertex_count();
        let mut parts = try_with_capacity(n)?;
        parts.resize(n, Part::First);
        let comp_load = [g.load_sum(), 0, 0];
        Ok(Self { g, parts, frontier: Vec::new(), comp_load, comp_size: [n, 0], level })
    }

    /// Builds the separation state over the halo-free core of `hg`.
    pub fn from_halo(hg: &HaloGraph) -> Result<Self> {
        Self::new(hg.strip_halo()?, hg.level())
    }

    pub fn graph(&self) -> &Graph {
        &self.g
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Per-vertex part assignment.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, v: usize) -> Part {
        self.parts[v]
    }

    /// Separator vertex list, in ascending vertex order.
    pub fn frontier(&self) -> &[usize] {
        &self.frontier
    }

    /// Vertex count of part `i` (0 or 1).
    pub fn comp_size(&self, i: usize) -> usize {
        self.comp_size[i]
    }

    /// Load of part `i` (0, 1, or 2 for the separator).
    pub fn comp_load(&self, i: usize) -> u64 {
        self.comp_load[i]
    }

    /// Load imbalance between the two parts, `load(first) - load(second)`.
    pub fn load_delta(&self) -> i64 {
        self.comp_load[0] as i64 - self.comp_load[1] as i64
    }

    /// Resets to the initial assignment: everything in the first part.
    pub fn reset(&mut self) {
        self.parts.fill(Part::First);
        self.frontier.clear();
        self.comp_load = [self.g.load_sum(), 0, 0];
        self.comp_size = [self.g.vertex_count(), 0];
    }

    /// Replaces the assignment wholesale and recomputes all bookkeeping.
    pub fn assign(&mut self, parts: Vec<Part>) {
        debug_assert_eq!(parts.len(), self.g.vertex_count());
        self.parts = parts;
        self.recompute();
    }

    /// Moves separator vertex `v` into part `to`, pulling `to`'s opposite-
    /// part neighbors into the separator. The frontier list is left stale;
    /// callers rebuild it once per sweep.
    pub(crate) fn move_to(&mut self, v: usize, to: Part) {
        debug_assert_eq!(self.parts[v], Part::Separator);
        let from = to.opposite();
        let lv = self.g.vertex_load(v);
        self.parts[v] = to;
        self.comp_load[2] -= lv;
        self.comp_load[to.index()] += lv;
        self.comp_size[to.index()] += 1;
        for a in self.g.arc_span(v) {
            let w = self.g.arc_target(a);
            if self.parts[w] == from {
                let lw = self.g.vertex_load(w);
                self.parts[w] = Part::Separator;
                self.comp_load[from.index()] -= lw;
                self.comp_load[2] += lw;
                self.comp_size[from.index()] -= 1;
            }
        }
    }

    /// Rebuilds the frontier list from the part array.
    pub(crate) fn rebuild_frontier(&mut self) {
        self.frontier.clear();
        self.frontier
            .extend((0..self.parts.len()).filter(|&v| self.parts[v] == Part::Separator));
    }

    fn recompute(&mut self) {
        self.comp_load = [0, 0, 0];
        self.comp_size = [0, 0];
        for (v, &p) in self.parts.iter().enumerate() {
            self.comp_load[p.index()] += self.g.vertex_load(v);
            if p != Part::Separator {
                self.comp_size[p.index()] += 1;
            }
        }
        self.rebuild_frontier();
    }

    /// Validates the separation invariants: consistent sizes, loads and
    /// frontier, and no edge joining the two proper parts directly.
    pub fn validate_invariants(&self) -> Result<()> {
        let n = self.g.vertex_count();
        if self.parts.len() != n {
            return Err(DissectError::InternalInconsistency("part array size mismatch"));
        }
        let mut load = [0u64; 3];
        let mut size = [0usize; 2];
        for (v, &p) in self.parts.iter().enumerate() {
            load[p.index()] += self.g.vertex_load(v);
            if p != Part::Separator {
                size[p.index()] += 1;
                let other = p.opposite();
                if self.g.neighbors(v).iter().any(|&w| self.parts[w] == other) {
                    return Err(DissectError::InternalInconsistency(
                        "edge crosses between the two parts",
                    ));
                }
            }
        }
        if load != self.comp_load || size != self.comp_size {
            return Err(DissectError::InternalInconsistency("stale part accounting"));
        }
        if size[0] + size[1] + self.frontier.len() != n {
            return Err(DissectError::InternalInconsistency("parts do not cover the graph"));
        }
        if self.frontier.iter().any(|&v| self.parts[v] != Part::Separator) {
            return Err(DissectError::InternalInconsistency("frontier out of sync"));
        }
        Ok(())
    }
}

/// Full snapshot of a separation state, for `Select`.
#[derive(Debug)]
pub struct SepStore {
    parts: Vec<Part>,
    frontier: Vec<usize>,
    comp_load: [u64; 3],
    comp_size: [usize; 2],
}

impl SelectState for SepGraph {
    type Store = SepStore;

    fn store_init(&self) -> Result<SepStore> {
        let n = self.g.vertex_count();
        Ok(SepStore {
            parts: try_with_capacity(n)?,
            frontier: try_with_capacity(n)?,
            comp_load: [0; 3],
            comp_size: [0; 2],
        })
    }

    fn store_save(&self, store: &mut SepStore) {
        store.parts.clear();
        store.parts.extend_from_slice(&self.parts);
        store.frontier.clear();
        store.frontier.extend_from_slice(&self.frontier);
        store.comp_load = self.comp_load;
        store.comp_size = self.comp_size;
    }

    fn store_restore(&mut self, store: &SepStore) {
        self.parts.clear();
        self.parts.extend_from_slice(&store.parts);
        self.frontier.clear();
        self.frontier.extend_from_slice(&store.frontier);
        self.comp_load = store.comp_load;
        self.comp_size = store.comp_size;
    }

    fn store_better(store: &SepStore, live: &SepGraph) -> bool {
        let stored_delta = (store.comp_load[0] as i64 - store.comp_load[1] as i64).abs();
        store.frontier.len() < live.frontier.len()
            || (store.frontier.len() == live.frontier.len()
                && stored_delta < live.load_delta().abs())
    }
}

/// Marker for the vertex-separation strategy family.
#[derive(Debug, Clone, Copy)]
pub struct SepDomain;

fn cond_levl(sep: &SepGraph) -> CondVal {
    CondVal::Int(sep.level() as i64)
}

fn cond_load(sep: &SepGraph) -> CondVal {
    CondVal::Int(sep.graph().load_sum() as i64)
}

fn cond_vert(sep: &SepGraph) -> CondVal {
    CondVal::Int(sep.graph().vertex_count() as i64)
}

static SEP_TAB: Lazy<StrategyTab<SepDomain>> = Lazy::new(|| {
    StrategyTab::<SepDomain>::new()
        .method(SepMethod::Zero, "zero", methods::sep_zero, SepMethodParams::Zero)
        .method(SepMethod::Bisect, "bisect", methods::sep_bisect, SepMethodParams::Bisect)
        .method(
            SepMethod::GreedyGrow,
            "gg",
            methods::sep_greedy_grow,
            SepMethodParams::Greedy(GreedyParams::default()),
        )
        .method(
            SepMethod::Refine,
            "fm",
            methods::sep_refine,
            SepMethodParams::Refine(RefineParams::default()),
        )
        .cond_field("levl", cond_levl)
        .cond_field("load", cond_load)
        .cond_field("vert", cond_vert)
        .param(SepMethod::GreedyGrow, "pass", ParamKind::Int)
        .param(SepMethod::GreedyGrow, "seed", ParamKind::Int)
        .param(SepMethod::Refine, "pass", ParamKind::Int)
        .param(SepMethod::Refine, "move", ParamKind::Int)
        .param(SepMethod::Refine, "bal", ParamKind::Double)
});

impl StratDomain for SepDomain {
    type Code = SepMethod;
    type Params = SepMethodParams;
    type State<'a> = SepGraph;

    fn tab() -> &'static StrategyTab<Self> {
        &SEP_TAB
    }
}

/// Computes the separation of `sep` according to `strat`. Generic
/// strategy-driven separation entry point.
pub fn separate(sep: &mut SepGraph, strat: &Strategy<SepDomain>) -> Result<()> {
    SepDomain::tab().eval(sep, strat)
}

/// The reference separation pipeline: best of two seeded greedy-grow-then-
/// refine chains.
pub fn default_separation_strategy() -> Strategy<SepDomain> {
    let chain = |seed| {
        Strategy::method_with(
            SepMethod::GreedyGrow,
            SepMethodParams::Greedy(GreedyParams { passes: 3, seed }),
        )
        .then(Strategy::method(SepMethod::Refine))
    };
    Strategy::select(chain(1), chain(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(0, n, &edges).unwrap()
    }

    #[test]
    fn new_state_is_all_first() {
        let sep = SepGraph::new(path(5), 0).unwrap();
        assert_eq!(sep.comp_size(0), 5);
        assert_eq!(sep.comp_size(1), 0);
        assert_eq!(sep.load_delta(), 5);
        assert!(sep.frontier().is_empty());
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn empty_strategy_is_a_no_op() {
        let mut sep = SepGraph::new(path(5), 0).unwrap();
        separate(&mut sep, &Strategy::empty()).unwrap();
        assert_eq!(sep.comp_size(0), 5);
    }

    #[test]
    fn cond_dispatches_on_vertex_count() {
        let tab = SepDomain::tab();
        let vert = crate::strategy::CondExpr::field(tab.cond_field_id("vert").unwrap());
        // vert > 3 holds: bisect runs, else-branch (zero) does not.
        let strat = Strategy::cond(
            vert.gt(crate::strategy::CondExpr::int(3)),
            Strategy::method(SepMethod::Bisect),
            Some(Strategy::method(SepMethod::Zero)),
        );
        let mut sep = SepGraph::new(path(10), 0).unwrap();
        separate(&mut sep, &strat).unwrap();
        assert!(!sep.frontier().is_empty());
        sep.validate_invariants().unwrap();
    }

    #[test]
    fn select_keeps_the_smaller_frontier() {
        let a = Strategy::method(SepMethod::Bisect);
        let b = Strategy::method(SepMethod::GreedyGrow);
        let mut alone_a = SepGraph::new(path(10), 0).unwrap();
        separate(&mut alone_a, &a).unwrap();
        let mut alone_b = SepGraph::new(path(10), 0).unwrap();
        separate(&mut alone_b, &b).unwrap();
        let mut picked = SepGraph::new(path(10), 0).unwrap();
        separate(&mut picked, &Strategy::select(a, b)).unwrap();
        let bound = alone_a.frontier().len().min(alone_b.frontier().len());
        assert!(picked.frontier().len() <= bound);
        picked.validate_invariants().unwrap();
    }

    #[test]
    fn store_round_trip() {
        let mut sep = SepGraph::new(path(6), 0).unwrap();
        let mut store = sep.store_init().unwrap();
        sep.store_save(&mut store);
        separate(&mut sep, &Strategy::method(SepMethod::Bisect)).unwrap();
        assert!(!sep.frontier().is_empty());
        sep.store_restore(&store);
        assert!(sep.frontier().is_empty());
        assert_eq!(sep.comp_size(0), 6);
        sep.validate_invariants().unwrap();
    }
}
