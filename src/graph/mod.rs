//! Compressed sparse row graphs.
//!
//! A [`Graph`] is an immutable symmetric adjacency structure: CSR offset and
//! target arrays (`xadj`/`adjncy`), optional per-vertex and per-arc loads
//! (`None` meaning unit loads), and an optional `vnum` table chaining local
//! vertex indices back to the numbering of the root graph they were induced
//! from. Vertex numbering is exposed under an explicit integer base offset;
//! all internal arrays are zero-based.
//!
//! The core never mutates a source graph; it only derives induced copies
//! (see [`induce`](self) and [`halo::HaloGraph`]).

use itertools::izip;

use crate::error::{DissectError, Result, try_with_capacity};

pub mod halo;
mod induce;

pub use halo::HaloGraph;

/// Sentinel for "vertex not in the induced set" in renumbering scratch maps.
pub(crate) const UNSET: usize = usize::MAX;

/// An immutable sparse graph in CSR form.
#[derive(Clone, Debug)]
pub struct Graph {
    base: usize,
    xadj: Vec<usize>,
    adjncy: Vec<usize>,
    vload: Option<Vec<u64>>,
    eload: Option<Vec<u64>>,
    vnum: Option<Vec<usize>>,
    vload_sum: u64,
    eload_sum: u64,
}

impl Graph {
    /// Builds a graph from raw CSR arrays under the given numbering base.
    ///
    /// `xadj` must hold `n + 1` monotonically non-decreasing offsets into
    /// `adjncy`, and every target must be a valid zero-based vertex index.
    /// Symmetry is not verified here; see [`Graph::check`].
    pub fn from_adjacency(base: usize, xadj: Vec<usize>, adjncy: Vec<usize>) -> Result<Self> {
        if xadj.is_empty() {
            return Err(DissectError::InvalidGraph("empty offset array".into()));
        }
        let n = xadj.len() - 1;
        if xadj[0] != 0 || *xadj.last().unwrap() != adjncy.len() {
            return Err(DissectError::InvalidGraph(format!(
                "offset array does not span the {} targets",
                adjncy.len()
            )));
        }
        if xadj.windows(2).any(|w| w[0] > w[1]) {
            return Err(DissectError::InvalidGraph("offsets not monotone".into()));
        }
        if let Some(&w) = adjncy.iter().find(|&&w| w >= n) {
            return Err(DissectError::InvalidGraph(format!(
                "target {w} out of range for {n} vertices"
            )));
        }
        Ok(Self::from_parts(base, xadj, adjncy, None, None, None))
    }

    /// Builds a graph from an undirected edge list over `n` vertices.
    ///
    /// Each `(u, v)` pair yields the two arcs `u -> v` and `v -> u`.
    pub fn from_edges(base: usize, n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut xadj = vec![0usize; n + 1];
        for &(u, v) in edges {
            if u >= n || v >= n {
                return Err(DissectError::InvalidGraph(format!(
                    "edge ({u}, {v}) out of range for {n} vertices"
                )));
            }
            xadj[u + 1] += 1;
            xadj[v + 1] += 1;
        }
        for i in 0..n {
            xadj[i + 1] += xadj[i];
        }
        let mut fill = xadj.clone();
        let mut adjncy = vec![0usize; edges.len() * 2];
        for &(u, v) in edges {
            adjncy[fill[u]] = v;
            fill[u] += 1;
            adjncy[fill[v]] = u;
            fill[v] += 1;
        }
        Ok(Self::from_parts(base, xadj, adjncy, None, None, None))
    }

    /// Attaches per-vertex loads, replacing the unit-load default.
    pub fn with_vertex_loads(mut self, loads: Vec<u64>) -> Result<Self> {
        if loads.len() != self.vertex_count() {
            return Err(DissectError::InvalidGraph(format!(
                "{} vertex loads for {} vertices",
                loads.len(),
                self.vertex_count()
            )));
        }
        self.vload_sum = loads.iter().sum();
        self.vload = Some(loads);
        Ok(self)
    }

    /// Attaches per-arc loads, replacing the unit-load default. The load of
    /// arc `u -> v` must equal the load of `v -> u`.
    pub fn with_edge_loads(mut self, loads: Vec<u64>) -> Result<Self> {
        if loads.len() != self.adjncy.len() {
            return Err(DissectError::InvalidGraph(format!(
                "{} arc loads for {} arcs",
                loads.len(),
                self.adjncy.len()
            )));
        }
        self.eload_sum = loads.iter().sum();
        self.eload = Some(loads);
        Ok(self)
    }

    pub(crate) fn from_parts(
        base: usize,
        xadj: Vec<usize>,
        adjncy: Vec<usize>,
        vload: Option<Vec<u64>>,
        eload: Option<Vec<u64>>,
        vnum: Option<Vec<usize>>,
    ) -> Self {
        let n = xadj.len() - 1;
        let vload_sum = vload.as_ref().map_or(n as u64, |t| t.iter().sum());
        let eload_sum = eload.as_ref().map_or(adjncy.len() as u64, |t| t.iter().sum());
        Self { base, xadj, adjncy, vload, eload, vnum, vload_sum, eload_sum }
    }

    /// Numbering base offset of this graph.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.xadj.len() - 1
    }

    /// Number of arcs (twice the number of undirected edges in a symmetric
    /// graph).
    pub fn arc_count(&self) -> usize {
        self.adjncy.len()
    }

    /// Zero-based neighbor list of `v`.
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjncy[self.xadj[v]..self.xadj[v + 1]]
    }

    /// Arc index range of `v`, for addressing per-arc loads.
    pub fn arc_span(&self, v: usize) -> std::ops::Range<usize> {
        self.xadj[v]..self.xadj[v + 1]
    }

    /// Target vertex of the arc at index `a`.
    pub fn arc_target(&self, a: usize) -> usize {
        self.adjncy[a]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.xadj[v + 1] - self.xadj[v]
    }

    /// Load of vertex `v` (1 when no load table is attached).
    pub fn vertex_load(&self, v: usize) -> u64 {
        self.vload.as_ref().map_or(1, |t| t[v])
    }

    /// Load of the arc at index `a` (1 when no load table is attached).
    pub fn arc_load(&self, a: usize) -> u64 {
        self.eload.as_ref().map_or(1, |t| t[a])
    }

    /// Sum of all vertex loads.
    pub fn load_sum(&self) -> u64 {
        self.vload_sum
    }

    /// Sum of all arc loads.
    pub fn edge_load_sum(&self) -> u64 {
        self.eload_sum
    }

    pub(crate) fn has_edge_loads(&self) -> bool {
        self.eload.is_some()
    }

    /// Original (root-graph) number of local vertex `v`: the chained `vnum`
    /// entry for induced graphs, `v` plus the base otherwise.
    pub fn vertex_num(&self, v: usize) -> usize {
        match &self.vnum {
            Some(t) => t[v],
            None => v + self.base,
        }
    }

    pub(crate) fn vnum_slice(&self) -> Option<&[usize]> {
        self.vnum.as_deref()
    }

    /// Validates structural consistency: target ranges, adjacency symmetry
    /// (including matching arc loads) and cached load sums. Intended for
    /// debugging and tests, not for hot paths.
    pub fn check(&self) -> Result<()> {
        let n = self.vertex_count();
        for (v, (&beg, &end)) in izip!(&self.xadj, &self.xadj[1..]).enumerate() {
            if beg > end || end > self.adjncy.len() {
                return Err(DissectError::InternalInconsistency("offsets out of range"));
            }
            for a in beg..end {
                let w = self.adjncy[a];
                if w >= n {
                    return Err(DissectError::InternalInconsistency("target out of range"));
                }
                if w == v {
                    return Err(DissectError::InternalInconsistency("self loop"));
                }
                let back = self
                    .arc_span(w)
                    .find(|&b| self.adjncy[b] == v && self.arc_load(b) == self.arc_load(a));
                if back.is_none() {
                    return Err(DissectError::InternalInconsistency("asymmetric adjacency"));
                }
            }
        }
        if self.vload.as_ref().is_some_and(|t| t.iter().sum::<u64>() != self.vload_sum) {
            return Err(DissectError::InternalInconsistency("stale vertex load sum"));
        }
        if self.eload.as_ref().is_some_and(|t| t.iter().sum::<u64>() != self.eload_sum) {
            return Err(DissectError::InternalInconsistency("stale edge load sum"));
        }
        Ok(())
    }

    /// Materializes the `vnum` entries for the vertices in `list`, chaining
    /// through this graph's own table.
    pub(crate) fn vnum_for(&self, list: &[usize]) -> Result<Vec<usize>> {
        let mut vnum = try_with_capacity(list.len())?;
        vnum.extend(list.iter().map(|&v| self.vertex_num(v)));
        Ok(vnum)
    }
}
