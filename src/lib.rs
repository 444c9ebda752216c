//! # graph-dissect
//!
//! graph-dissect computes vertex separators and fill-reducing nested-
//! dissection orderings for sparse graphs, as used by direct sparse solvers
//! and mesh partitioners. Its two inseparable cores are a small interpreted
//! **strategy engine** (a combinator tree composing pluggable graph-
//! transformation methods into pipelines, with conditional and
//! best-of-two operators) and the recursive **nested-dissection orderer**
//! the engine drives: each recursion frame separates a subgraph through a
//! strategy, induces part and separator subgraphs (with halo budgets) and
//! assembles a column-block tree.
//!
//! ## Features
//! - CSR graphs with base-offset numbering, vertex/edge loads and
//!   original-number chaining through inductions
//! - Halo graphs: induced subgraphs keeping a budgeted fringe of context
//!   vertices around the owned core
//! - Strategy trees (`Empty`, `Concat`, `Cond`, `Select`, `Method`) over
//!   per-family method registries with typed parameter records
//! - Fork-join concurrent recursion over split worker-pool contexts
//!   (`parallel` feature, on by default)
//!
//! ## Determinism
//!
//! All randomized decisions use `SmallRng` seeds drawn from method
//! parameters so runs are reproducible, and sequential and concurrent
//! execution assign the same elimination indices for deterministic method
//! sets. Unit tests fix seeds explicitly.
//!
//! ## Usage
//!
//! ```
//! use graph_dissect::prelude::*;
//!
//! // A 4x4 grid graph.
//! let mut edges = Vec::new();
//! for r in 0..4 {
//!     for c in 0..4 {
//!         if c + 1 < 4 { edges.push((r * 4 + c, r * 4 + c + 1)); }
//!         if r + 1 < 4 { edges.push((r * 4 + c, (r + 1) * 4 + c)); }
//!     }
//! }
//! let g = Graph::from_edges(0, 16, &edges)?;
//! let order = nested_dissection_order(&g, &NdParams::default(), &TaskContext::available())?;
//! let perm = order.perm()?;
//! assert_eq!(perm.len(), 16);
//! # Ok::<(), graph_dissect::DissectError>(())
//! ```
//!
//! Strategy trees are built programmatically; a textual strategy DSL, graph
//! file formats and distributed-memory graphs are external collaborators.

pub mod context;
pub mod error;
pub mod graph;
pub mod order;
pub mod separate;
pub mod strategy;

pub use error::{DissectError, Result};

/// A convenient prelude importing the most-used types and entry points.
pub mod prelude {
    pub use crate::context::TaskContext;
    pub use crate::error::{DissectError, Result};
    pub use crate::graph::{Graph, HaloGraph};
    pub use crate::order::{
        CblkId, CblkKind, NdParams, Order, OrderCblk, OrderDomain, OrderMethod,
        OrderMethodParams, nested_dissection_order, order_by_nested_dissection, order_strategy,
    };
    pub use crate::separate::{
        GreedyParams, Part, RefineParams, SepDomain, SepGraph, SepMethod, SepMethodParams,
        default_separation_strategy, separate,
    };
    pub use crate::strategy::{CondExpr, CondVal, StratDomain, Strategy, StrategyTab};
}
