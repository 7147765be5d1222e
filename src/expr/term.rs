//! Arithmetic expressions and boolean formulas.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use super::VarId;

/// Integer-valued linear expression (with if-then-else).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal.
    Const(i64),
    /// Integer variable.
    Var(VarId),
    /// Sum of terms. The empty sum is 0.
    Sum(Vec<Expr>),
    /// `lhs - rhs`.
    Sub(Box<Expr>, Box<Expr>),
    /// Constant multiple.
    Scale(i64, Box<Expr>),
    /// `if cond then a else b`.
    Ite(Box<Formula>, Box<Expr>, Box<Expr>),
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Le,
    Lt,
    Ge,
    Gt,
    Eq,
    Ne,
}

/// Boolean formula over [`Expr`] comparisons and boolean variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Formula {
    /// `true` / `false`.
    Const(bool),
    /// Boolean variable.
    Var(VarId),
    /// Arithmetic comparison.
    Cmp(CmpOp, Expr, Expr),
    Not(Box<Formula>),
    /// Conjunction. The empty conjunction is `true`.
    And(Vec<Formula>),
    /// Disjunction. The empty disjunction is `false`.
    Or(Vec<Formula>),
    Implies(Box<Formula>, Box<Formula>),
}

impl Expr {
    /// Integer literal.
    pub fn constant(value: i64) -> Self {
        Expr::Const(value)
    }

    /// Variable reference.
    pub fn var(id: VarId) -> Self {
        Expr::Var(id)
    }

    /// Sum of an iterator of expressions.
    pub fn sum<I>(terms: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Expr::Sum(terms.into_iter().map(Into::into).collect())
    }

    /// `if cond then then_expr else else_expr`.
    pub fn ite(cond: Formula, then_expr: impl Into<Expr>, else_expr: impl Into<Expr>) -> Self {
        Expr::Ite(
            Box::new(cond),
            Box::new(then_expr.into()),
            Box::new(else_expr.into()),
        )
    }

    /// 1 when the boolean variable holds, 0 otherwise.
    pub fn indicator(flag: VarId) -> Self {
        Expr::ite(Formula::Var(flag), Expr::Const(1), Expr::Const(0))
    }

    /// `min(a, b)`.
    pub fn min(a: impl Into<Expr>, b: impl Into<Expr>) -> Self {
        let (a, b) = (a.into(), b.into());
        Expr::ite(a.clone().le(b.clone()), a, b)
    }

    /// `max(a, b)`.
    pub fn max(a: impl Into<Expr>, b: impl Into<Expr>) -> Self {
        let (a, b) = (a.into(), b.into());
        Expr::ite(a.clone().ge(b.clone()), a, b)
    }

    /// Length of the intersection of `[start, end]` with `[lo, hi]`,
    /// clipped to zero when they are disjoint or only touch.
    ///
    /// `max(0, min(end, hi) - max(start, lo))`
    pub fn clipped_overlap(start: VarId, end: VarId, lo: i64, hi: i64) -> Self {
        let raw = Expr::min(end, hi) - Expr::max(start, lo);
        Expr::max(0, raw)
    }

    pub fn le(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Le, self, rhs.into())
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Lt, self, rhs.into())
    }

    pub fn ge(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Ge, self, rhs.into())
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Gt, self, rhs.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Eq, self, rhs.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, rhs: impl Into<Expr>) -> Formula {
        Formula::Cmp(CmpOp::Ne, self, rhs.into())
    }

    /// Variables mentioned by this expression, appended to `out`.
    pub fn collect_vars(&self, out: &mut Vec<VarId>) {
        match self {
            Expr::Const(_) => {}
            Expr::Var(v) => out.push(*v),
            Expr::Sum(terms) => terms.iter().for_each(|t| t.collect_vars(out)),
            Expr::Sub(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Expr::Scale(_, e) => e.collect_vars(out),
            Expr::Ite(c, a, b) => {
                c.collect_vars(out);
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Const(value)
    }
}

// Unsuffixed literals default to i32.
impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Const(i64::from(value))
    }
}

impl From<VarId> for Expr {
    fn from(id: VarId) -> Self {
        Expr::Var(id)
    }
}

impl<T: Into<Expr>> Add<T> for Expr {
    type Output = Expr;

    fn add(self, rhs: T) -> Expr {
        match (self, rhs.into()) {
            (Expr::Sum(mut terms), rhs) => {
                terms.push(rhs);
                Expr::Sum(terms)
            }
            (lhs, rhs) => Expr::Sum(vec![lhs, rhs]),
        }
    }
}

impl<T: Into<Expr>> Sub<T> for Expr {
    type Output = Expr;

    fn sub(self, rhs: T) -> Expr {
        Expr::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl Mul<i64> for Expr {
    type Output = Expr;

    fn mul(self, k: i64) -> Expr {
        Expr::Scale(k, Box::new(self))
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Scale(-1, Box::new(self))
    }
}

impl Formula {
    /// Boolean variable literal.
    pub fn var(id: VarId) -> Self {
        Formula::Var(id)
    }

    pub fn and(parts: Vec<Formula>) -> Self {
        Formula::And(parts)
    }

    pub fn or(parts: Vec<Formula>) -> Self {
        Formula::Or(parts)
    }

    pub fn implies(premise: Formula, conclusion: Formula) -> Self {
        Formula::Implies(Box::new(premise), Box::new(conclusion))
    }

    /// Logical negation.
    pub fn negate(self) -> Self {
        match self {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Not(inner) => *inner,
            other => Formula::Not(Box::new(other)),
        }
    }

    /// Variables mentioned by this formula, appended to `out`.
    pub fn collect_vars(&self, out: &mut Vec<VarId>) {
        match self {
            Formula::Const(_) => {}
            Formula::Var(v) => out.push(*v),
            Formula::Cmp(_, a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
            Formula::Not(f) => f.collect_vars(out),
            Formula::And(fs) | Formula::Or(fs) => fs.iter().for_each(|f| f.collect_vars(out)),
            Formula::Implies(a, b) => {
                a.collect_vars(out);
                b.collect_vars(out);
            }
        }
    }

    /// Sorted, deduplicated variables of this formula.
    pub fn vars(&self) -> Vec<VarId> {
        let mut out = Vec::new();
        self.collect_vars(&mut out);
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_flattens_sums() {
        let a = VarId(0);
        let b = VarId(1);
        let e = Expr::var(a) + b + 3;
        match e {
            Expr::Sum(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected sum, got {other:?}"),
        }
    }

    #[test]
    fn test_negate_double() {
        let f = Formula::var(VarId(0));
        assert_eq!(f.clone().negate().negate(), f);
        assert_eq!(Formula::Const(true).negate(), Formula::Const(false));
    }

    #[test]
    fn test_vars_dedup() {
        let a = VarId(2);
        let b = VarId(0);
        let f = Formula::or(vec![
            Expr::var(a).le(b),
            Expr::var(b).le(Expr::var(a) + 1),
        ]);
        assert_eq!(f.vars(), vec![b, a]);
    }

    #[test]
    fn test_overlap_mentions_both_endpoints() {
        let s = VarId(0);
        let e = VarId(1);
        let overlap = Expr::clipped_overlap(s, e, 2, 6);
        let mut vars = Vec::new();
        overlap.collect_vars(&mut vars);
        assert!(vars.contains(&s));
        assert!(vars.contains(&e));
    }
}
