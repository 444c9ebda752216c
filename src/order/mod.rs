//! Ordering trees and the top-level ordering entry points.
//!
//! An [`Order`] collects the result of a (possibly concurrent) ordering
//! computation: an arena-allocated tree of column blocks, the shared
//! `cblk_nbr`/`tree_nbr` counters and failure flag behind a single mutex,
//! and the inverse permutation sink written at disjoint positions by
//! concurrent recursion branches. Nodes are appended as recursion descends
//! and never freed mid-computation; on failure the partial tree is left
//! intact and the caller discards the whole `Order`.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use parking_lot::Mutex;

use crate::context::TaskContext;
use crate::error::{DissectError, Result, try_with_capacity};
use crate::graph::{Graph, HaloGraph};

pub mod nd;
pub mod strategy;

pub use nd::{NdParams, order_by_nested_dissection};
pub use strategy::{OrderDomain, OrderMethod, OrderMethodParams, OrderState, order_strategy};

/// Stable handle of a column block in the order arena.
pub type CblkId = usize;

const PERI_UNSET: usize = usize::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CblkKind {
    /// Opaque contiguous block of `vnod_nbr` nodes.
    Leaf,
    /// Nested-dissection node with two or three children.
    Dissect,
}

/// One column block: a node of the elimination/dissection tree.
#[derive(Clone, Debug)]
pub struct OrderCblk {
    pub kind: CblkKind,
    /// Number of graph nodes covered by this block's subtree.
    pub vnod_nbr: usize,
    /// Child handles: empty for leaves, `[part0, part1]` or
    /// `[part0, part1, separator]` for dissection nodes.
    pub children: Vec<CblkId>,
}

struct OrderTree {
    nodes: Vec<OrderCblk>,
    cblk_nbr: usize,
    tree_nbr: usize,
    failed: bool,
}

/// A complete ordering under construction or finished.
pub struct Order {
    base: usize,
    vnod_nbr: usize,
    tree: Mutex<OrderTree>,
    peri: Vec<AtomicUsize>,
}

impl Order {
    /// Creates an ordering of `vnod_nbr` nodes under the given numbering
    /// base, rooted at a single leaf block covering everything.
    pub fn new(base: usize, vnod_nbr: usize) -> Result<Self> {
        let mut peri = try_with_capacity(vnod_nbr)?;
        peri.resize_with(vnod_nbr, || AtomicUsize::new(PERI_UNSET));
        let root = OrderCblk { kind: CblkKind::Leaf, vnod_nbr, children: Vec::new() };
        Ok(Self {
            base,
            vnod_nbr,
            tree: Mutex::new(OrderTree { nodes: vec![root], cblk_nbr: 1, tree_nbr: 1, failed: false }),
            peri,
        })
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn vnod_nbr(&self) -> usize {
        self.vnod_nbr
    }

    /// Handle of the root column block.
    pub fn root(&self) -> CblkId {
        0
    }

    /// Running column-block count.
    pub fn cblk_nbr(&self) -> usize {
        self.tree.lock().cblk_nbr
    }

    /// Running tree-node count.
    pub fn tree_nbr(&self) -> usize {
        self.tree.lock().tree_nbr
    }

    /// Snapshot of one column block.
    pub fn cblk(&self, id: CblkId) -> OrderCblk {
        self.tree.lock().nodes[id].clone()
    }

    /// Turns leaf `cblk` into a dissection node with two or three leaf
    /// children pre-filled with the given vertex counts, and bumps the
    /// shared counters accordingly. One critical section; the counters are
    /// only updated after the child allocation succeeded.
    pub(crate) fn split_cblk(
        &self,
        cblk: CblkId,
        n0: usize,
        n1: usize,
        nsep: usize,
    ) -> Result<(CblkId, CblkId, Option<CblkId>)> {
        let mut tree = self.tree.lock();
        #[cfg(debug_assertions)]
        {
            let node = &tree.nodes[cblk];
            if node.kind != CblkKind::Leaf || node.vnod_nbr != n0 + n1 + nsep {
                return Err(DissectError::InternalInconsistency(
                    "splitting a non-leaf or mis-sized column block",
                ));
            }
        }
        let child_nbr = if nsep > 0 { 3 } else { 2 };
        tree.nodes.try_reserve(child_nbr).map_err(|_| DissectError::OutOfMemory)?;
        let c0 = tree.nodes.len();
        tree.nodes.push(OrderCblk { kind: CblkKind::Leaf, vnod_nbr: n0, children: Vec::new() });
        let c1 = tree.nodes.len();
        tree.nodes.push(OrderCblk { kind: CblkKind::Leaf, vnod_nbr: n1, children: Vec::new() });
        let csep = if nsep > 0 {
            let c = tree.nodes.len();
            tree.nodes.push(OrderCblk { kind: CblkKind::Leaf, vnod_nbr: nsep, children: Vec::new() });
            Some(c)
        } else {
            None
        };
        let mut children = vec![c0, c1];
        children.extend(csep);
        tree.nodes[cblk].kind = CblkKind::Dissect;
        tree.nodes[cblk].children = children;
        if nsep > 0 {
            tree.cblk_nbr += 2;
            tree.tree_nbr += 3;
        } else {
            tree.cblk_nbr += 1;
            tree.tree_nbr += 2;
        }
        Ok((c0, c1, csep))
    }

    /// Flags a branch failure; observed by the joining caller.
    pub(crate) fn flag_failure(&self) {
        self.tree.lock().failed = true;
    }

    /// Whether any recursion branch has failed so far.
    pub fn failed(&self) -> bool {
        self.tree.lock().failed
    }

    /// Records that the node at elimination position `pos` (zero-based) is
    /// the vertex with original number `vnum`. Positions written by
    /// concurrent branches are disjoint by construction.
    pub fn set_peri(&self, pos: usize, vnum: usize) {
        debug_assert!(pos < self.vnod_nbr);
        self.peri[pos].store(vnum, Ordering::Relaxed);
    }

    /// Snapshot of the inverse permutation: elimination position to original
    /// vertex number. Unordered positions hold `usize::MAX`.
    pub fn peri(&self) -> Vec<usize> {
        self.peri.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }

    /// Direct permutation: `perm[v - base]` is the elimination position
    /// (base-offset) of vertex `v`. Fails when the ordering is incomplete
    /// or not a permutation.
    pub fn perm(&self) -> Result<Vec<usize>> {
        let mut perm = vec![PERI_UNSET; self.vnod_nbr];
        for (pos, p) in self.peri.iter().enumerate() {
            let vnum = p.load(Ordering::Relaxed);
            let v = vnum.wrapping_sub(self.base);
            if v >= self.vnod_nbr {
                return Err(DissectError::InternalInconsistency("incomplete ordering"));
            }
            if perm[v] != PERI_UNSET {
                return Err(DissectError::InternalInconsistency("duplicate elimination index"));
            }
            perm[v] = pos + self.base;
        }
        Ok(perm)
    }

    /// Validates the finished ordering: every counter equals the sum of
    /// per-node contributions, leaf sizes partition the graph, and the
    /// inverse permutation is a permutation.
    pub fn check(&self) -> Result<()> {
        let tree = self.tree.lock();
        let mut stack = vec![0usize];
        let mut node_nbr = 0usize;
        let mut leaf_nbr = 0usize;
        let mut leaf_vnod = 0usize;
        while let Some(id) = stack.pop() {
            let node = &tree.nodes[id];
            node_nbr += 1;
            match node.kind {
                CblkKind::Leaf => {
                    if !node.children.is_empty() {
                        return Err(DissectError::InternalInconsistency("leaf with children"));
                    }
                    leaf_nbr += 1;
                    leaf_vnod += node.vnod_nbr;
                }
                CblkKind::Dissect => {
                    if node.children.len() < 2 || node.children.len() > 3 {
                        return Err(DissectError::InternalInconsistency(
                            "dissection node without 2 or 3 children",
                        ));
                    }
                    let child_vnod: usize =
                        node.children.iter().map(|&c| tree.nodes[c].vnod_nbr).sum();
                    if child_vnod != node.vnod_nbr {
                        return Err(DissectError::InternalInconsistency(
                            "children do not cover their parent block",
                        ));
                    }
                    stack.extend_from_slice(&node.children);
                }
            }
        }
        if node_nbr != tree.tree_nbr || leaf_nbr != tree.cblk_nbr {
            return Err(DissectError::InternalInconsistency("stale tree counters"));
        }
        if leaf_vnod != self.vnod_nbr {
            return Err(DissectError::InternalInconsistency("leaves do not cover the graph"));
        }
        drop(tree);
        self.perm().map(drop)
    }
}

/// Orders a graph by nested dissection, building the root ordering and halo
/// wrapper and running the recursion under `ctx`.
pub fn nested_dissection_order(g: &Graph, params: &NdParams, ctx: &TaskContext) -> Result<Order> {
    let order = Order::new(g.base(), g.vertex_count())?;
    let hg = HaloGraph::from_graph(g.clone(), 0);
    order_by_nested_dissection(&hg, &order, 0, order.root(), params, ctx)?;
    if order.failed() {
        return Err(DissectError::InternalInconsistency(
            "a recursion branch failed without propagating",
        ));
    }
    debug!(
        "ordered {} nodes: {} column blocks, {} tree nodes",
        order.vnod_nbr(),
        order.cblk_nbr(),
        order.tree_nbr()
    );
    Ok(order)
}
