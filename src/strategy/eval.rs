//! The generic strategy evaluator.

use log::{debug, trace};

use crate::error::{Result, invalid_strategy};

use super::{CondVal, SelectState, StratDomain, Strategy, StrategyTab};

impl<D: StratDomain> StrategyTab<D> {
    /// Evaluates a strategy tree against a mutable state.
    ///
    /// Side effects are confined to `state`; the tree itself is read-only.
    /// `Concat` short-circuits on a failed first branch; `Select` ranks the
    /// two branch outcomes through the state's [`SelectState`] protocol and
    /// commits the winner, releasing both scoped copies unconditionally.
    pub fn eval<'a>(&self, state: &mut D::State<'a>, strat: &Strategy<D>) -> Result<()>
    where
        D::State<'a>: SelectState,
    {
        match strat {
            Strategy::Empty => Ok(()),
            Strategy::Concat(a, b) => {
                self.eval(state, a)?;
                self.eval(state, b)
            }
            Strategy::Cond { test, then, other } => match self.eval_test(state, test)? {
                CondVal::Log(true) => self.eval(state, then),
                CondVal::Log(false) => match other {
                    Some(e) => self.eval(state, e),
                    None => Ok(()),
                },
                v => Err(invalid_strategy(format!(
                    "condition yielded {v:?}, expected a boolean"
                ))),
            },
            Strategy::Select(a, b) => {
                let mut best = state.store_init()?;
                let mut init = state.store_init()?;
                state.store_save(&mut init);
                if let Err(e) = self.eval(state, a) {
                    debug!("select: first branch failed: {e}");
                }
                state.store_save(&mut best);
                state.store_restore(&init);
                if let Err(e) = self.eval(state, b) {
                    debug!("select: second branch failed: {e}");
                }
                if <D::State<'a> as SelectState>::store_better(&best, state) {
                    state.store_restore(&best);
                }
                Ok(())
            }
            Strategy::Method { code, params } => {
                let entry = self
                    .method_entry(*code)
                    .ok_or_else(|| invalid_strategy(format!("unregistered method {code:?}")))?;
                trace!("method {}", entry.name);
                (entry.func)(state, params.as_ref().unwrap_or(&entry.defaults))
            }
        }
    }
}
