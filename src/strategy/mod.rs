//! The strategy evaluation engine.
//!
//! A [`Strategy`] is an immutable combinator tree composing pluggable
//! graph-transformation methods into pipelines: sequencing (`Concat`),
//! branching on live state fields (`Cond`), best-of-two evaluation with
//! snapshot/restore (`Select`) and registered method invocation (`Method`).
//! Trees are built programmatically (a textual DSL front-end is an external
//! collaborator) and are re-entrant: the same tree may be evaluated
//! concurrently on independent states from different recursion branches.
//!
//! Each graph family (vertex separation, ordering) binds a
//! [`StrategyTab`], the registry triple of method table, parameter-field
//! descriptors and condition-field table, through its [`StratDomain`]
//! implementation. Tabs are built once into statics and read-only
//! thereafter.

use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;

use crate::error::Result;

pub mod cond;
mod eval;

pub use cond::{ArithOp, CmpOp, CondExpr, CondVal};

/// A graph family that strategies can drive.
///
/// Implementors are zero-sized markers tying together the method-code enum,
/// the typed parameter records, the mutable state type and the bound
/// registry.
pub trait StratDomain: Sized + 'static {
    /// Mnemonic method codes; a closed set per family.
    type Code: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;
    /// Typed parameter records, one variant per method code.
    type Params: Clone + fmt::Debug + Send + Sync + 'static;
    /// The capability-bearing state methods mutate.
    type State<'a>;

    /// The strategy table bound to this family.
    fn tab() -> &'static StrategyTab<Self>;
}

/// Method implementation signature: mutate the state under the resolved
/// parameter record, returning the method's own outcome unchanged.
pub type MethodFunc<D> = for<'a> fn(
    &mut <D as StratDomain>::State<'a>,
    &<D as StratDomain>::Params,
) -> Result<()>;

/// Condition-field accessor: read one named field of the live state.
pub type CondAccess<D> = for<'a> fn(&<D as StratDomain>::State<'a>) -> CondVal;

/// Snapshot/restore protocol backing the `Select` combinator.
///
/// Domains without snapshot support report
/// [`InvalidStrategy`](crate::DissectError::InvalidStrategy) from
/// [`store_init`](SelectState::store_init).
pub trait SelectState: Sized {
    /// Scoped copy of the mutable portion of the state.
    type Store;

    /// Allocates an (uninitialized) store; allocation failure is
    /// `OutOfMemory`.
    fn store_init(&self) -> Result<Self::Store>;
    /// Saves the live state into the store.
    fn store_save(&self, store: &mut Self::Store);
    /// Restores the live state from the store.
    fn store_restore(&mut self, store: &Self::Store);
    /// Ranks a stored result against the live state; `true` when the stored
    /// one wins under the domain ordering.
    fn store_better(store: &Self::Store, live: &Self) -> bool;
}

/// An immutable strategy tree over the graph family `D`.
#[derive(Debug)]
pub enum Strategy<D: StratDomain> {
    /// No-op; always succeeds.
    Empty,
    /// Evaluate the first strategy, then the second if the first succeeded.
    Concat(Box<Strategy<D>>, Box<Strategy<D>>),
    /// Branch on a condition over live state fields.
    Cond {
        test: CondExpr,
        then: Box<Strategy<D>>,
        other: Option<Box<Strategy<D>>>,
    },
    /// Evaluate both branches from the same snapshot and keep the better
    /// outcome.
    Select(Box<Strategy<D>>, Box<Strategy<D>>),
    /// Invoke a registered method; `None` parameters mean the registry
    /// defaults established at construction time.
    Method {
        code: D::Code,
        params: Option<D::Params>,
    },
}

impl<D: StratDomain> Strategy<D> {
    pub fn empty() -> Self {
        Strategy::Empty
    }

    /// Method node using the registry's default parameter record.
    pub fn method(code: D::Code) -> Self {
        Strategy::Method { code, params: None }
    }

    /// Method node with caller-supplied parameters overriding the defaults.
    pub fn method_with(code: D::Code, params: D::Params) -> Self {
        Strategy::Method { code, params: Some(params) }
    }

    /// `self` then `next`.
    pub fn then(self, next: Self) -> Self {
        Strategy::Concat(Box::new(self), Box::new(next))
    }

    pub fn select(a: Self, b: Self) -> Self {
        Strategy::Select(Box::new(a), Box::new(b))
    }

    pub fn cond(test: CondExpr, then: Self, other: Option<Self>) -> Self {
        Strategy::Cond { test, then: Box::new(then), other: other.map(Box::new) }
    }
}

/// Kind of a method parameter field, for external DSL front-ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Double,
    Case,
    Strat,
}

/// Descriptor of one parameter field of one method.
#[derive(Clone, Debug)]
pub struct ParamDesc<C> {
    pub code: C,
    pub name: &'static str,
    pub kind: ParamKind,
}

/// One registered method: implementation plus default parameter block.
pub struct MethodEntry<D: StratDomain> {
    pub name: &'static str,
    pub func: MethodFunc<D>,
    pub defaults: D::Params,
}

/// One named condition field of the family's state.
pub struct CondField<D: StratDomain> {
    pub name: &'static str,
    pub access: CondAccess<D>,
}

/// Registry triple scoped to one graph family: method table, parameter-field
/// descriptors and condition-field table.
pub struct StrategyTab<D: StratDomain> {
    methods: HashMap<D::Code, MethodEntry<D>>,
    conds: Vec<CondField<D>>,
    params: Vec<ParamDesc<D::Code>>,
}

impl<D: StratDomain> StrategyTab<D> {
    pub fn new() -> Self {
        Self { methods: HashMap::new(), conds: Vec::new(), params: Vec::new() }
    }

    /// Registers a method under its code.
    pub fn method(
        mut self,
        code: D::Code,
        name: &'static str,
        func: MethodFunc<D>,
        defaults: D::Params,
    ) -> Self {
        self.methods.insert(code, MethodEntry { name, func, defaults });
        self
    }

    /// Registers a named condition field.
    pub fn cond_field(mut self, name: &'static str, access: CondAccess<D>) -> Self {
        self.conds.push(CondField { name, access });
        self
    }

    /// Registers a parameter-field descriptor for DSL front-ends.
    pub fn param(mut self, code: D::Code, name: &'static str, kind: ParamKind) -> Self {
        self.params.push(ParamDesc { code, name, kind });
        self
    }

    pub fn method_entry(&self, code: D::Code) -> Option<&MethodEntry<D>> {
        self.methods.get(&code)
    }

    /// Resolves a condition-field name to the id used by
    /// [`CondExpr::field`].
    pub fn cond_field_id(&self, name: &str) -> Option<usize> {
        self.conds.iter().position(|f| f.name == name)
    }

    pub(crate) fn cond_fields(&self) -> &[CondField<D>] {
        &self.conds
    }

    /// Parameter-field descriptors registered for `code`.
    pub fn param_descs(&self, code: D::Code) -> impl Iterator<Item = &ParamDesc<D::Code>> {
        self.params.iter().filter(move |d| d.code == code)
    }
}

impl<D: StratDomain> Default for StrategyTab<D> {
    fn default() -> Self {
        Self::new()
    }
}
