//! Halo graphs.
//!
//! A [`HaloGraph`] extends a [`Graph`] with fringe bookkeeping: the first
//! `vnoh_nbr` vertices are *core* (owned) vertices, the rest are *halo*
//! vertices retained for context only. Core adjacency lists store core
//! neighbors first, then halo neighbors, so that the per-core-vertex core
//! span end (`vnhd`) delimits the halo-free subgraph; halo vertices' lists
//! contain core endpoints only. Halo vertices are never recursed into.

use log::trace;

use crate::error::{DissectError, Result, try_with_capacity};

use super::{Graph, UNSET};

/// A graph plus halo-vertex bookkeeping, created by halo-budgeted induction
/// and destroyed when its owning recursion frame returns.
#[derive(Clone, Debug)]
pub struct HaloGraph {
    g: Graph,
    vnoh_nbr: usize,
    /// Per core vertex, the absolute `adjncy` end of its core-neighbor span.
    /// `None` when the graph carries no halo at all.
    vnhd: Option<Vec<usize>>,
    vnlo_sum: u64,
    enoh_nbr: usize,
    enlo_sum: u64,
    level: u32,
}

impl HaloGraph {
    /// Wraps a pure graph as a halo graph with no halo vertices.
    pub fn from_graph(g: Graph, level: u32) -> Self {
        let vnoh_nbr = g.vertex_count();
        let vnlo_sum = g.load_sum();
        let enoh_nbr = g.arc_count();
        let enlo_sum = g.edge_load_sum();
        Self { g, vnoh_nbr, vnhd: None, vnlo_sum, enoh_nbr, enlo_sum, level }
    }

    /// The underlying graph, halo vertices included.
    pub fn graph(&self) -> &Graph {
        &self.g
    }

    /// Number of core (non-halo) vertices; they occupy indices
    /// `0..vnoh_nbr`.
    pub fn vnoh_nbr(&self) -> usize {
        self.vnoh_nbr
    }

    /// Number of halo vertices.
    pub fn halo_nbr(&self) -> usize {
        self.g.vertex_count() - self.vnoh_nbr
    }

    /// Sum of core vertex loads.
    pub fn core_load(&self) -> u64 {
        self.vnlo_sum
    }

    /// Number of arcs joining two core vertices.
    pub fn core_arc_count(&self) -> usize {
        self.enoh_nbr
    }

    /// Sum of core-to-core arc loads.
    pub fn core_edge_load(&self) -> u64 {
        self.enlo_sum
    }

    /// Nested-dissection recursion depth of this graph.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Arc index range of core vertex `v` restricted to core neighbors.
    pub fn core_span(&self, v: usize) -> std::ops::Range<usize> {
        let span = self.g.arc_span(v);
        match &self.vnhd {
            Some(vnhd) => span.start..vnhd[v],
            None => span,
        }
    }

    /// Copies out the halo-free subgraph over the core vertices.
    pub fn strip_halo(&self) -> Result<Graph> {
        let Some(vnhd) = &self.vnhd else {
            return Ok(self.g.clone());
        };
        let n = self.vnoh_nbr;
        let mut xadj = try_with_capacity(n + 1)?;
        let mut adjncy = try_with_capacity(self.enoh_nbr)?;
        let mut eload =
            if self.g.has_edge_loads() { Some(try_with_capacity(self.enoh_nbr)?) } else { None };
        xadj.push(0);
        for v in 0..n {
            let span = self.g.arc_span(v).start..vnhd[v];
            adjncy.extend_from_slice(&self.g.adjncy[span.clone()]);
            if let Some(t) = eload.as_mut() {
                t.extend(span.map(|a| self.g.arc_load(a)));
            }
            xadj.push(adjncy.len());
        }
        let vload = self.g.vload.as_ref().map(|t| t[..n].to_vec());
        let vnum = self.g.vnum_slice().map(|t| t[..n].to_vec());
        Ok(Graph::from_parts(self.g.base, xadj, adjncy, vload, eload, vnum))
    }

    /// Builds the halo graph induced by the core vertex subset `list`.
    ///
    /// Unlisted far endpoints of core edges become halo vertices of the
    /// child in first-encounter order while `halo_max` allows, and are
    /// dropped afterwards (reducing load sums accordingly). A zero budget
    /// forces pure induction. The child's recursion level is one deeper.
    pub fn induce_list(&self, list: &[usize], halo_max: usize) -> Result<HaloGraph> {
        let n = list.len();
        trace!(
            "halo induction: {} of {} core vertices, halo budget {}",
            n,
            self.vnoh_nbr,
            halo_max
        );

        let mut index = try_with_capacity(self.g.vertex_count())?;
        index.resize(self.g.vertex_count(), UNSET);
        for (i, &v) in list.iter().enumerate() {
            #[cfg(debug_assertions)]
            if v >= self.vnoh_nbr || index[v] != UNSET {
                return Err(DissectError::InternalInconsistency(
                    "induction list not a core vertex subset",
                ));
            }
            index[v] = i;
        }

        let arc_bound: usize = list.iter().map(|&v| self.g.degree(v)).sum();
        let mut xadj = try_with_capacity(n + 1)?;
        let mut adjncy = try_with_capacity(arc_bound)?;
        let mut eload = if self.g.has_edge_loads() { Some(try_with_capacity(arc_bound)?) } else { None };
        let mut vnhd = try_with_capacity(n)?;
        // Halo locals, the parent vertex behind each, and the back arcs
        // (halo local, core local, arc load) discovered from the core side.
        let mut halo_orig: Vec<usize> = Vec::new();
        let mut halo_arcs: Vec<(usize, usize, u64)> = Vec::new();
        let mut halo_tmp: Vec<(usize, u64)> = Vec::new();
        let mut enoh_nbr = 0usize;
        let mut enlo_sum = 0u64;

        xadj.push(0);
        for (i, &v) in list.iter().enumerate() {
            halo_tmp.clear();
            for a in self.g.arc_span(v) {
                let w = self.g.adjncy[a];
                let lo = self.g.arc_load(a);
                let j = index[w];
                if j == UNSET {
                    if halo_orig.len() < halo_max {
                        let h = n + halo_orig.len();
                        index[w] = h;
                        halo_orig.push(w);
                        halo_tmp.push((h, lo));
                        halo_arcs.push((h - n, i, lo));
                    }
                    // Out of budget: the edge is dropped.
                } else if j < n {
                    adjncy.push(j);
                    if let Some(t) = eload.as_mut() {
                        t.push(lo);
                    }
                    enoh_nbr += 1;
                    enlo_sum += lo;
                } else {
                    halo_tmp.push((j, lo));
                    halo_arcs.push((j - n, i, lo));
                }
            }
            vnhd.push(adjncy.len());
            for &(h, lo) in &halo_tmp {
                adjncy.push(h);
                if let Some(t) = eload.as_mut() {
                    t.push(lo);
                }
            }
            xadj.push(adjncy.len());
        }

        // Halo adjacency: back arcs grouped by halo vertex, counting-sorted
        // since every arc was discovered exactly once from the core side.
        let halo_nbr = halo_orig.len();
        let mut offs = vec![0usize; halo_nbr + 1];
        for &(h, _, _) in &halo_arcs {
            offs[h + 1] += 1;
        }
        for h in 0..halo_nbr {
            offs[h + 1] += offs[h];
        }
        let halo_base = adjncy.len();
        adjncy.resize(halo_base + halo_arcs.len(), 0);
        if let Some(t) = eload.as_mut() {
            t.resize(halo_base + halo_arcs.len(), 0);
        }
        {
            let mut fill = offs.clone();
            for &(h, i, lo) in &halo_arcs {
                adjncy[halo_base + fill[h]] = i;
                if let Some(t) = eload.as_mut() {
                    t[halo_base + fill[h]] = lo;
                }
                fill[h] += 1;
            }
        }
        for h in 0..halo_nbr {
            xadj.push(halo_base + offs[h + 1]);
        }

        let vload = match &self.g.vload {
            Some(t) => {
                let mut out = try_with_capacity(n + halo_nbr)?;
                out.extend(list.iter().map(|&v| t[v]));
                out.extend(halo_orig.iter().map(|&v| t[v]));
                Some(out)
            }
            None => None,
        };
        let vnlo_sum = match &self.g.vload {
            Some(t) => list.iter().map(|&v| t[v]).sum(),
            None => n as u64,
        };
        let mut vnum = self.g.vnum_for(list)?;
        vnum.try_reserve_exact(halo_nbr).map_err(|_| DissectError::OutOfMemory)?;
        vnum.extend(halo_orig.iter().map(|&v| self.g.vertex_num(v)));

        let g = Graph::from_parts(self.g.base, xadj, adjncy, vload, eload, Some(vnum));
        Ok(HaloGraph {
            g,
            vnoh_nbr: n,
            vnhd: if halo_nbr > 0 { Some(vnhd) } else { None },
            vnlo_sum,
            enoh_nbr,
            enlo_sum,
            level: self.level + 1,
        })
    }

    /// Validates halo bookkeeping against the underlying graph. Debug/test
    /// helper.
    pub fn check(&self) -> Result<()> {
        self.g.check()?;
        let n = self.vnoh_nbr;
        if n > self.g.vertex_count() {
            return Err(DissectError::InternalInconsistency("core count out of range"));
        }
        let mut enoh = 0;
        let mut enlo = 0;
        for v in 0..n {
            let span = self.core_span(v);
            let full = self.g.arc_span(v);
            if span.start != full.start || span.end > full.end {
                return Err(DissectError::InternalInconsistency("core span out of range"));
            }
            for a in full.clone() {
                let target_is_core = self.g.adjncy[a] < n;
                if target_is_core != span.contains(&a) {
                    return Err(DissectError::InternalInconsistency(
                        "core adjacency not core-first",
                    ));
                }
                if target_is_core {
                    enoh += 1;
                    enlo += self.g.arc_load(a);
                }
            }
        }
        for h in n..self.g.vertex_count() {
            if self.g.neighbors(h).iter().any(|&w| w >= n) {
                return Err(DissectError::InternalInconsistency("halo-halo edge retained"));
            }
        }
        let vnlo: u64 = (0..n).map(|v| self.g.vertex_load(v)).sum();
        if enoh != self.enoh_nbr || enlo != self.enlo_sum || vnlo != self.vnlo_sum {
            return Err(DissectError::InternalInconsistency("stale halo sums"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(0, n, &edges).unwrap()
    }

    #[test]
    fn zero_budget_matches_pure_induction() {
        let hg = HaloGraph::from_graph(path(6), 0);
        let child = hg.induce_list(&[1, 2, 3], 0).unwrap();
        assert_eq!(child.halo_nbr(), 0);
        assert_eq!(child.level(), 1);
        child.check().unwrap();
        let pure = hg.graph().induce_list(&[1, 2, 3]).unwrap();
        for v in 0..3 {
            assert_eq!(child.graph().neighbors(v), pure.neighbors(v));
            assert_eq!(child.graph().vertex_num(v), pure.vertex_num(v));
        }
    }

    #[test]
    fn halo_vertices_kept_within_budget() {
        let hg = HaloGraph::from_graph(path(5), 0);
        let child = hg.induce_list(&[1, 2], 4).unwrap();
        assert_eq!(child.vnoh_nbr(), 2);
        assert_eq!(child.halo_nbr(), 2);
        assert_eq!(child.core_load(), 2);
        assert_eq!(child.core_arc_count(), 2);
        // Halo vertices keep their original numbering through vnum.
        assert_eq!(child.graph().vertex_num(2), 0);
        assert_eq!(child.graph().vertex_num(3), 3);
        child.check().unwrap();
    }

    #[test]
    fn budget_exhaustion_drops_edges() {
        let hg = HaloGraph::from_graph(path(5), 0);
        let child = hg.induce_list(&[1, 2], 1).unwrap();
        assert_eq!(child.halo_nbr(), 1);
        // Vertex 0 (first encounter) became halo; the 2-3 edge was dropped.
        assert_eq!(child.graph().vertex_num(2), 0);
        assert_eq!(child.graph().degree(1), 1);
        child.check().unwrap();
    }

    #[test]
    fn strip_halo_recovers_core_subgraph() {
        let hg = HaloGraph::from_graph(path(7), 0);
        let child = hg.induce_list(&[2, 3, 4], 6).unwrap();
        let core = child.strip_halo().unwrap();
        assert_eq!(core.vertex_count(), 3);
        assert_eq!(core.arc_count(), child.core_arc_count());
        core.check().unwrap();
        // Path 2-3-4 survives untouched.
        assert_eq!(core.neighbors(1), &[0, 2]);
    }

    #[test]
    fn second_level_halo_budget_includes_parent_halo() {
        let hg = HaloGraph::from_graph(path(8), 0);
        let mid = hg.induce_list(&[2, 3, 4, 5], 2).unwrap();
        assert_eq!(mid.halo_nbr(), 2);
        let leaf = mid.induce_list(&[1, 2], mid.halo_nbr() + 1).unwrap();
        // Core {3,4} of the original path: neighbors 2 and 5 turn halo.
        assert_eq!(leaf.vnoh_nbr(), 2);
        assert_eq!(leaf.halo_nbr(), 2);
        assert_eq!(leaf.level(), 2);
        leaf.check().unwrap();
    }
}
