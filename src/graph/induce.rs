//! Pure induced-subgraph construction.

use log::trace;

use crate::error::{Result, try_with_capacity};

use super::{Graph, UNSET};

impl Graph {
    /// Builds the subgraph induced by `list`, renumbered into a fresh local
    /// index space under the same base offset.
    ///
    /// `list` need not be sorted but must contain each vertex at most once.
    /// Edges whose far endpoint lies outside `list` are dropped; loads of
    /// fully contained vertices and edges are preserved exactly. The `vnum`
    /// table of the result chains through to this graph's numbering.
    pub fn induce_list(&self, list: &[usize]) -> Result<Graph> {
        let n = list.len();
        trace!("inducing {} of {} vertices", n, self.vertex_count());

        let mut index = try_with_capacity(self.vertex_count())?;
        index.resize(self.vertex_count(), UNSET);
        for (i, &v) in list.iter().enumerate() {
            #[cfg(debug_assertions)]
            if index[v] != UNSET {
                return Err(crate::error::DissectError::InternalInconsistency(
                    "duplicate vertex in induction list",
                ));
            }
            index[v] = i;
        }

        let arc_bound: usize = list.iter().map(|&v| self.degree(v)).sum();
        let mut xadj = try_with_capacity(n + 1)?;
        let mut adjncy = try_with_capacity(arc_bound)?;
        let mut eload = if self.has_edge_loads() { Some(try_with_capacity(arc_bound)?) } else { None };
        xadj.push(0);
        for &v in list {
            for a in self.arc_span(v) {
                let j = index[self.adjncy[a]];
                if j != UNSET {
                    adjncy.push(j);
                    if let Some(t) = eload.as_mut() {
                        t.push(self.arc_load(a));
                    }
                }
            }
            xadj.push(adjncy.len());
        }

        let vload = match &self.vload {
            Some(t) => {
                let mut out = try_with_capacity(n)?;
                out.extend(list.iter().map(|&v| t[v]));
                Some(out)
            }
            None => None,
        };
        let vnum = Some(self.vnum_for(list)?);

        Ok(Graph::from_parts(self.base, xadj, adjncy, vload, eload, vnum))
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
    fn drops_edges_leaving_the_set() {
        let g = path(5);
        let ind = g.induce_list(&[1, 2, 4]).unwrap();
        assert_eq!(ind.vertex_count(), 3);
        // 1-2 survives; 2-3, 3-4 and 0-1 are cut.
        assert_eq!(ind.neighbors(0), &[1]);
        assert_eq!(ind.neighbors(1), &[0]);
        assert_eq!(ind.degree(2), 0);
        ind.check().unwrap();
    }

    #[test]
    fn chains_vnum_through_two_inductions() {
        let g = path(6);
        let mid = g.induce_list(&[2, 3, 4, 5]).unwrap();
        let leaf = mid.induce_list(&[1, 3]).unwrap();
        assert_eq!(leaf.vertex_num(0), 3);
        assert_eq!(leaf.vertex_num(1), 5);
    }

    #[test]
    fn full_list_round_trip() {
        let g = path(4).with_vertex_loads(vec![1, 2, 3, 4]).unwrap();
        let ind = g.induce_list(&[0, 1, 2, 3]).unwrap();
        assert_eq!(ind.vertex_count(), g.vertex_count());
        assert_eq!(ind.arc_count(), g.arc_count());
        assert_eq!(ind.load_sum(), g.load_sum());
        for v in 0..4 {
            assert_eq!(ind.neighbors(v), g.neighbors(v));
            assert_eq!(ind.vertex_load(v), g.vertex_load(v));
            assert_eq!(ind.vertex_num(v), v);
        }
    }

    #[test]
    fn preserves_edge_loads() {
        let g = Graph::from_edges(0, 3, &[(0, 1), (1, 2)])
            .unwrap()
            .with_edge_loads(vec![7, 7, 9, 9])
            .unwrap();
        let ind = g.induce_list(&[1, 2]).unwrap();
        assert_eq!(ind.arc_count(), 2);
        assert_eq!(ind.edge_load_sum(), 18);
        ind.check().unwrap();
    }
}
