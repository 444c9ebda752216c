//! Condition expressions over live state fields.
//!
//! Conditions are small typed expression trees evaluated against the state a
//! strategy runs on. State fields are referenced by id into the bound
//! [`StrategyTab`]'s condition-field table and resolved through accessor
//! functions; integers promote to doubles in mixed arithmetic and
//! comparisons. An operand of the wrong kind is an `InvalidStrategy` error.

use crate::error::{Result, invalid_strategy};

use super::{StratDomain, StrategyTab};

/// A typed condition value: integer, double or boolean.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CondVal {
    Int(i64),
    Dbl(f64),
    Log(bool),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Gt,
    Eq,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Mod,
}

/// A condition expression tree.
#[derive(Clone, Debug)]
pub enum CondExpr {
    /// Literal value.
    Val(CondVal),
    /// State field, by id in the bound condition table.
    Field(usize),
    Not(Box<CondExpr>),
    And(Box<CondExpr>, Box<CondExpr>),
    Or(Box<CondExpr>, Box<CondExpr>),
    Cmp(CmpOp, Box<CondExpr>, Box<CondExpr>),
    Arith(ArithOp, Box<CondExpr>, Box<CondExpr>),
}

impl CondExpr {
    pub fn int(v: i64) -> Self {
        CondExpr::Val(CondVal::Int(v))
    }

    pub fn dbl(v: f64) -> Self {
        CondExpr::Val(CondVal::Dbl(v))
    }

    pub fn log(v: bool) -> Self {
        CondExpr::Val(CondVal::Log(v))
    }

    pub fn field(id: usize) -> Self {
        CondExpr::Field(id)
    }

    pub fn lt(self, other: Self) -> Self {
        CondExpr::Cmp(CmpOp::Lt, Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: Self) -> Self {
        CondExpr::Cmp(CmpOp::Gt, Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: Self) -> Self {
        CondExpr::Cmp(CmpOp::Eq, Box::new(self), Box::new(other))
    }

    pub fn and(self, other: Self) -> Self {
        CondExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        CondExpr::Or(Box::new(self), Box::new(other))
    }

    pub fn not(self) -> Self {
        CondExpr::Not(Box::new(self))
    }

    pub fn add(self, other: Self) -> Self {
        CondExpr::Arith(ArithOp::Add, Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: Self) -> Self {
        CondExpr::Arith(ArithOp::Sub, Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Self) -> Self {
        CondExpr::Arith(ArithOp::Mul, Box::new(self), Box::new(other))
    }

    pub fn rem(self, other: Self) -> Self {
        CondExpr::Arith(ArithOp::Mod, Box::new(self), Box::new(other))
    }
}

fn as_log(v: CondVal) -> Result<bool> {
    match v {
        CondVal::Log(b) => Ok(b),
        v => Err(invalid_strategy(format!("expected a boolean operand, got {v:?}"))),
    }
}

/// Numeric operand pair with int-to-double promotion.
enum NumPair {
    Int(i64, i64),
    Dbl(f64, f64),
}

fn as_nums(a: CondVal, b: CondVal) -> Result<NumPair> {
    match (a, b) {
        (CondVal::Int(x), CondVal::Int(y)) => Ok(NumPair::Int(x, y)),
        (CondVal::Int(x), CondVal::Dbl(y)) => Ok(NumPair::Dbl(x as f64, y)),
        (CondVal::Dbl(x), CondVal::Int(y)) => Ok(NumPair::Dbl(x, y as f64)),
        (CondVal::Dbl(x), CondVal::Dbl(y)) => Ok(NumPair::Dbl(x, y)),
        (a, b) => Err(invalid_strategy(format!("expected numeric operands, got {a:?} and {b:?}"))),
    }
}

impl<D: StratDomain> StrategyTab<D> {
    /// Evaluates a condition expression against the live state.
    pub fn eval_test<'a>(&self, state: &D::State<'a>, expr: &CondExpr) -> Result<CondVal> {
        match expr {
            CondExpr::Val(v) => Ok(*v),
            CondExpr::Field(id) => {
                let field = self
                    .cond_fields()
                    .get(*id)
                    .ok_or_else(|| invalid_strategy(format!("unregistered condition field {id}")))?;
                Ok((field.access)(state))
            }
            CondExpr::Not(e) => Ok(CondVal::Log(!as_log(self.eval_test(state, e)?)?)),
            CondExpr::And(a, b) => {
                let a = as_log(self.eval_test(state, a)?)?;
                let b = as_log(self.eval_test(state, b)?)?;
                Ok(CondVal::Log(a && b))
            }
            CondExpr::Or(a, b) => {
                let a = as_log(self.eval_test(state, a)?)?;
                let b = as_log(self.eval_test(state, b)?)?;
                Ok(CondVal::Log(a || b))
            }
            CondExpr::Cmp(op, a, b) => {
                let pair = as_nums(self.eval_test(state, a)?, self.eval_test(state, b)?)?;
                let res = match (op, pair) {
                    (CmpOp::Lt, NumPair::Int(x, y)) => x < y,
                    (CmpOp::Lt, NumPair::Dbl(x, y)) => x < y,
                    (CmpOp::Gt, NumPair::Int(x, y)) => x > y,
                    (CmpOp::Gt, NumPair::Dbl(x, y)) => x > y,
                    (CmpOp::Eq, NumPair::Int(x, y)) => x == y,
                    (CmpOp::Eq, NumPair::Dbl(x, y)) => x == y,
                };
                Ok(CondVal::Log(res))
            }
            CondExpr::Arith(op, a, b) => {
                let pair = as_nums(self.eval_test(state, a)?, self.eval_test(state, b)?)?;
                match (op, pair) {
                    (ArithOp::Add, NumPair::Int(x, y)) => Ok(CondVal::Int(x + y)),
                    (ArithOp::Sub, NumPair::Int(x, y)) => Ok(CondVal::Int(x - y)),
                    (ArithOp::Mul, NumPair::Int(x, y)) => Ok(CondVal::Int(x * y)),
                    (ArithOp::Mod, NumPair::Int(x, y)) if y != 0 => Ok(CondVal::Int(x % y)),
                    (ArithOp::Mod, NumPair::Int(..)) => {
                        Err(invalid_strategy("modulo by zero in condition"))
                    }
                    (ArithOp::Add, NumPair::Dbl(x, y)) => Ok(CondVal::Dbl(x + y)),
                    (ArithOp::Sub, NumPair::Dbl(x, y)) => Ok(CondVal::Dbl(x - y)),
                    (ArithOp::Mul, NumPair::Dbl(x, y)) => Ok(CondVal::Dbl(x * y)),
                    (ArithOp::Mod, NumPair::Dbl(..)) => {
                        Err(invalid_strategy("modulo needs integer operands"))
                    }
                }
            }
        }
    }
}
