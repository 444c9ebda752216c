//! Nested-dissection ordering.
//!
//! The recursion separates the halo-free core of its graph through the
//! separation strategy engine, builds a two- or three-child column block,
//! orders the separator eagerly (separator vertices always take the highest
//! elimination indices), induces halo subgraphs for the two parts and
//! recurses into them, concurrently when the task context still splits.

use std::sync::Arc;

use log::debug;

use crate::context::TaskContext;
use crate::error::Result;
use crate::graph::HaloGraph;
use crate::separate::{SepDomain, SepGraph, default_separation_strategy, separate};
use crate::strategy::Strategy;

use super::strategy::{OrderDomain, OrderMethod, order_strategy};
use super::{CblkId, Order};

/// Parameters of the nested-dissection ordering method.
#[derive(Clone, Debug)]
pub struct NdParams {
    /// Separation strategy applied to each subgraph's halo-free core.
    pub sep_strat: Arc<Strategy<SepDomain>>,
    /// Ordering strategy for terminal (unsplittable) subgraphs.
    pub lea_strat: Arc<Strategy<OrderDomain>>,
    /// Ordering strategy for separator subgraphs.
    pub sep_ord_strat: Arc<Strategy<OrderDomain>>,
}

impl Default for NdParams {
    fn default() -> Self {
        Self {
            sep_strat: Arc::new(default_separation_strategy()),
            lea_strat: Arc::new(Strategy::method(OrderMethod::Simple)),
            sep_ord_strat: Arc::new(Strategy::method(OrderMethod::Simple)),
        }
    }
}

/// Orders `hg` by nested dissection into `order` under leaf block `cblk`,
/// numbering its core vertices from `start`. Top-level recursive ordering
/// entry point; `cblk` must be a leaf block sized to the core.
pub fn order_by_nested_dissection(
    hg: &HaloGraph,
    order: &Order,
    start: usize,
    cblk: CblkId,
    params: &NdParams,
    ctx: &TaskContext,
) -> Result<()> {
    debug!(
        "nested dissection: {} core + {} halo vertices at level {}",
        hg.vnoh_nbr(),
        hg.halo_nbr(),
        hg.level()
    );

    let mut sep = SepGraph::from_halo(hg)?;
    separate(&mut sep, &params.sep_strat)?;

    if sep.comp_size(0) == 0 || sep.comp_size(1) == 0 {
        // Could not separate further; an expected terminal outcome.
        drop(sep);
        return order_strategy(hg, order, start, cblk, &params.lea_strat, ctx);
    }

    #[cfg(debug_assertions)]
    sep.validate_invariants()?;

    let mut lists: [Vec<usize>; 3] = [
        Vec::with_capacity(sep.comp_size(0)),
        Vec::with_capacity(sep.comp_size(1)),
        Vec::with_capacity(sep.frontier().len()),
    ];
    for (v, &p) in sep.parts().iter().enumerate() {
        lists[p.index()].push(v);
    }
    let (n0, n1, nsep) = (lists[0].len(), lists[1].len(), lists[2].len());
    debug!("separated {} vertices into {n0}/{n1} with separator {nsep}", hg.vnoh_nbr());

    let (c0, c1, csep) = order.split_cblk(cblk, n0, n1, nsep)?;

    if let Some(csep) = csep {
        // Separator vertices get the highest indices of this frame and are
        // never recursed into further, so halo information is discarded.
        let sg = hg.graph().induce_list(&lists[2])?;
        let shg = HaloGraph::from_graph(sg, hg.level());
        order_strategy(&shg, order, start + n0 + n1, csep, &params.sep_ord_strat, ctx)?;
    }

    // Fringe for further separation: this frame's separator plus whatever
    // halo the parent already carried.
    let halo_max = nsep + hg.halo_nbr();
    let recurse = |list: &[usize], sub_start: usize, sub_cblk: CblkId, sub_ctx: &TaskContext| {
        let child = hg.induce_list(list, halo_max)?;
        order_by_nested_dissection(&child, order, sub_start, sub_cblk, params, sub_ctx)
    };

    drop(sep);
    match ctx.try_split() {
        Some((ctx0, ctx1)) => {
            let (r0, r1) = TaskContext::join(
                || recurse(&lists[0], start, c0, &ctx0).inspect_err(|_| order.flag_failure()),
                || recurse(&lists[1], start + n0, c1, &ctx1).inspect_err(|_| order.flag_failure()),
            );
            r0.and(r1)
        }
        None => {
            recurse(&lists[0], start, c0, ctx).inspect_err(|_| order.flag_failure())?;
            recurse(&lists[1], start + n0, c1, ctx).inspect_err(|_| order.flag_failure())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::order::CblkKind;
    use crate::order::nested_dissection_order;
    use crate::separate::SepMethod;

    fn path(n: usize) -> Graph {
        let edges: Vec<_> = (0..n - 1).map(|i| (i, i + 1)).collect();
        Graph::from_edges(0, n, &edges).unwrap()
    }

    fn bisect_params() -> NdParams {
        NdParams {
            sep_strat: Arc::new(Strategy::method(SepMethod::Bisect)),
            ..NdParams::default()
        }
    }

    #[test]
    fn ten_path_splits_four_four_two() {
        let order = nested_dissection_order(
            &path(10),
            &bisect_params(),
            &TaskContext::sequential(),
        )
        .unwrap();
        let root = order.cblk(order.root());
        assert_eq!(root.kind, CblkKind::Dissect);
        assert_eq!(root.children.len(), 3);
        let sizes: Vec<_> =
            root.children.iter().map(|&c| order.cblk(c).vnod_nbr).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        order.check().unwrap();
    }

    #[test]
    fn separator_takes_highest_indices() {
        let order = nested_dissection_order(
            &path(10),
            &bisect_params(),
            &TaskContext::sequential(),
        )
        .unwrap();
        let peri = order.peri();
        // Root separator {4, 5} occupies the last two positions.
        let mut tail = peri[8..].to_vec();
        tail.sort_unstable();
        assert_eq!(tail, vec![4, 5]);
    }

    #[test]
    fn degenerate_graph_stays_a_single_leaf() {
        // A single vertex cannot be separated.
        let g = Graph::from_adjacency(0, vec![0, 0], vec![]).unwrap();
        let order =
            nested_dissection_order(&g, &NdParams::default(), &TaskContext::sequential())
                .unwrap();
        assert_eq!(order.cblk_nbr(), 1);
        assert_eq!(order.tree_nbr(), 1);
        let root = order.cblk(order.root());
        assert_eq!(root.kind, CblkKind::Leaf);
        assert_eq!(root.vnod_nbr, 1);
        order.check().unwrap();
    }

    #[test]
    fn failed_separation_leaves_counters_untouched() {
        // A condition over a boolean comparison is malformed; the strategy
        // fails before any column block is built.
        let bad = Strategy::cond(
            crate::strategy::CondExpr::int(1).lt(crate::strategy::CondExpr::log(true)),
            Strategy::method(SepMethod::Bisect),
            None,
        );
        let params = NdParams { sep_strat: Arc::new(bad), ..NdParams::default() };
        let order = Order::new(0, 10).unwrap();
        let hg = HaloGraph::from_graph(path(10), 0);
        let err = order_by_nested_dissection(
            &hg,
            &order,
            0,
            order.root(),
            &params,
            &TaskContext::sequential(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::DissectError::InvalidStrategy(_)));
        assert_eq!(order.cblk_nbr(), 1);
        assert_eq!(order.tree_nbr(), 1);
    }
}
