//! The ordering strategy family.
//!
//! Leaf and separator subgraphs are ordered through the same strategy
//! engine as separation; the family's state bundles the halo graph with the
//! ordering sink, the frame's base elimination index, the destination
//! column block and the task context. Nested dissection itself is a
//! registered method, so ordering strategies can recurse into it.

use once_cell::sync::Lazy;

use crate::context::TaskContext;
use crate::error::{Result, invalid_strategy};
use crate::graph::HaloGraph;
use crate::strategy::{CondVal, ParamKind, SelectState, StratDomain, Strategy, StrategyTab};

use super::nd::{NdParams, order_by_nested_dissection};
use super::{CblkId, Order};

/// Codes of the registered ordering methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderMethod {
    /// Number core vertices in natural order.
    Simple,
    /// Recursive nested dissection.
    NestedDissection,
}

/// Typed parameter records, one variant per method.
#[derive(Clone, Debug)]
pub enum OrderMethodParams {
    Simple,
    Nd(NdParams),
}

/// One ordering frame: the state ordering methods act on.
pub struct OrderState<'a> {
    pub hg: &'a HaloGraph,
    pub order: &'a Order,
    /// Base elimination index (zero-based position) of this frame.
    pub start: usize,
    /// Destination column block; a leaf sized to the core on entry.
    pub cblk: CblkId,
    pub ctx: &'a TaskContext,
}

/// The ordering family has no snapshot protocol; `Select` is rejected.
impl SelectState for OrderState<'_> {
    type Store = ();

    fn store_init(&self) -> Result<()> {
        Err(invalid_strategy("select is not supported for ordering strategies"))
    }

    fn store_save(&self, _store: &mut ()) {}

    fn store_restore(&mut self, _store: &()) {}

    fn store_better(_store: &(), _live: &Self) -> bool {
        false
    }
}

fn wrong_params(name: &str) -> crate::error::DissectError {
    invalid_strategy(format!("parameter record of the wrong kind for method {name}"))
}

/// Numbers the core vertices in natural order from the frame's base index.
fn order_simple(st: &mut OrderState<'_>, params: &OrderMethodParams) -> Result<()> {
    let OrderMethodParams::Simple = params else {
        return Err(wrong_params("simple"));
    };
    let g = st.hg.graph();
    for v in 0..st.hg.vnoh_nbr() {
        st.order.set_peri(st.start + v, g.vertex_num(v));
    }
    Ok(())
}

fn order_nested(st: &mut OrderState<'_>, params: &OrderMethodParams) -> Result<()> {
    let OrderMethodParams::Nd(p) = params else {
        return Err(wrong_params("nd"));
    };
    order_by_nested_dissection(st.hg, st.order, st.start, st.cblk, p, st.ctx)
}

fn cond_levl(st: &OrderState<'_>) -> CondVal {
    CondVal::Int(st.hg.level() as i64)
}

fn cond_vert(st: &OrderState<'_>) -> CondVal {
    CondVal::Int(st.hg.vnoh_nbr() as i64)
}

fn cond_load(st: &OrderState<'_>) -> CondVal {
    CondVal::Int(st.hg.core_load() as i64)
}

fn cond_edge(st: &OrderState<'_>) -> CondVal {
    CondVal::Int(st.hg.core_arc_count() as i64)
}

/// Marker for the ordering strategy family.
#[derive(Debug, Clone, Copy)]
pub struct OrderDomain;

static ORD_TAB: Lazy<StrategyTab<OrderDomain>> = Lazy::new(|| {
    StrategyTab::<OrderDomain>::new()
        .method(OrderMethod::Simple, "simple", order_simple, OrderMethodParams::Simple)
        .method(
            OrderMethod::NestedDissection,
            "nd",
            order_nested,
            OrderMethodParams::Nd(NdParams::default()),
        )
        .cond_field("levl", cond_levl)
        .cond_field("vert", cond_vert)
        .cond_field("load", cond_load)
        .cond_field("edge", cond_edge)
        .param(OrderMethod::NestedDissection, "sep", ParamKind::Strat)
        .param(OrderMethod::NestedDissection, "ole", ParamKind::Strat)
        .param(OrderMethod::NestedDissection, "ose", ParamKind::Strat)
});

impl StratDomain for OrderDomain {
    type Code = OrderMethod;
    type Params = OrderMethodParams;
    type State<'a> = OrderState<'a>;

    fn tab() -> &'static StrategyTab<Self> {
        &ORD_TAB
    }
}

/// Orders the core of `hg` into `order` under `cblk` according to `strat`.
/// Generic ordering-family entry point, used for leaf and separator
/// ordering alike.
pub fn order_strategy(
    hg: &HaloGraph,
    order: &Order,
    start: usize,
    cblk: CblkId,
    strat: &Strategy<OrderDomain>,
    ctx: &TaskContext,
) -> Result<()> {
    let mut st = OrderState { hg, order, start, cblk, ctx };
    OrderDomain::tab().eval(&mut st, strat)
}
