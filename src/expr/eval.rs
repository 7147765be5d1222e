//! Concrete evaluation of expressions under a full assignment.

use super::{CmpOp, Expr, Formula, VarId};

/// Source of variable values. Booleans read as 0 / 1.
pub trait Assignment {
    /// Value of `var`, or `None` when unassigned.
    fn value(&self, var: VarId) -> Option<i64>;
}

/// Dense values indexed by variable.
impl Assignment for [i64] {
    fn value(&self, var: VarId) -> Option<i64> {
        self.get(var.index()).copied()
    }
}

/// Dense partial values indexed by variable.
impl Assignment for [Option<i64>] {
    fn value(&self, var: VarId) -> Option<i64> {
        self.get(var.index()).copied().flatten()
    }
}

impl Expr {
    /// Evaluates the expression; `None` if a variable is unassigned.
    pub fn evaluate<A: Assignment + ?Sized>(&self, env: &A) -> Option<i64> {
        match self {
            Expr::Const(c) => Some(*c),
            Expr::Var(v) => env.value(*v),
            Expr::Sum(terms) => terms
                .iter()
                .try_fold(0i64, |acc, t| Some(acc.saturating_add(t.evaluate(env)?))),
            Expr::Sub(a, b) => Some(a.evaluate(env)?.saturating_sub(b.evaluate(env)?)),
            Expr::Scale(k, e) => Some(e.evaluate(env)?.saturating_mul(*k)),
            Expr::Ite(c, a, b) => {
                if c.evaluate(env)? {
                    a.evaluate(env)
                } else {
                    b.evaluate(env)
                }
            }
        }
    }
}

impl CmpOp {
    /// Applies the comparison to two concrete values.
    pub fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            CmpOp::Le => lhs <= rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
        }
    }
}

impl Formula {
    /// Evaluates the formula; `None` if a needed variable is unassigned.
    pub fn evaluate<A: Assignment + ?Sized>(&self, env: &A) -> Option<bool> {
        match self {
            Formula::Const(b) => Some(*b),
            Formula::Var(v) => env.value(*v).map(|x| x != 0),
            Formula::Cmp(op, a, b) => Some(op.apply(a.evaluate(env)?, b.evaluate(env)?)),
            Formula::Not(f) => f.evaluate(env).map(|b| !b),
            Formula::And(fs) => {
                for f in fs {
                    if !f.evaluate(env)? {
                        return Some(false);
                    }
                }
                Some(true)
            }
            Formula::Or(fs) => {
                for f in fs {
                    if f.evaluate(env)? {
                        return Some(true);
                    }
                }
                Some(false)
            }
            Formula::Implies(a, b) => {
                if a.evaluate(env)? {
                    b.evaluate(env)
                } else {
                    Some(true)
                }
            }
        }
    }
}
