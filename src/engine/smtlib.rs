//! SMT-LIB 2 rendering.
//!
//! [`Script`] is the declarative part every engine keeps: declarations,
//! assertions and goals. It renders to a script that any SMT-LIB 2 solver
//! (with the common `minimize`/`maximize` extension for goals) can replay.

use std::fmt::Write as _;

use crate::encoding::Sense;
use crate::error::EngineError;
use crate::expr::{CmpOp, Expr, Formula, Sort, VarDecl, VarId};

use super::EngineMode;

/// Declared variable with its search range.
#[derive(Debug, Clone)]
pub struct Declared {
    pub decl: VarDecl,
    pub range: (i64, i64),
}

/// Declarations, assertions and goals of one session.
#[derive(Debug, Clone)]
pub struct Script {
    mode: EngineMode,
    decls: Vec<Option<Declared>>,
    assertions: Vec<Formula>,
    goals: Vec<(Sense, Expr)>,
}

impl Script {
    pub fn new(mode: EngineMode) -> Self {
        Self {
            mode,
            decls: Vec::new(),
            assertions: Vec::new(),
            goals: Vec::new(),
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    pub fn declare(&mut self, var: VarId, decl: &VarDecl, range: (i64, i64)) {
        if self.decls.len() <= var.index() {
            self.decls.resize(var.index() + 1, None);
        }
        self.decls[var.index()] = Some(Declared {
            decl: decl.clone(),
            range,
        });
    }

    pub fn declared(&self, var: VarId) -> Option<&Declared> {
        self.decls.get(var.index()).and_then(Option::as_ref)
    }

    /// Declared variables in id order.
    pub fn declarations(&self) -> impl Iterator<Item = (VarId, &Declared)> {
        self.decls
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.as_ref().map(|d| (VarId(i as u32), d)))
    }

    /// Number of variable slots (highest declared id + 1).
    pub fn width(&self) -> usize {
        self.decls.len()
    }

    fn check_declared(&self, vars: &[VarId]) -> Result<(), EngineError> {
        match vars.iter().find(|v| self.declared(**v).is_none()) {
            Some(v) => Err(EngineError::Undeclared(v.index())),
            None => Ok(()),
        }
    }

    pub fn assert(&mut self, formula: Formula) -> Result<(), EngineError> {
        self.check_declared(&formula.vars())?;
        self.assertions.push(formula);
        Ok(())
    }

    pub fn add_goal(&mut self, sense: Sense, expr: Expr) -> Result<(), EngineError> {
        if self.mode == EngineMode::Decision {
            return Err(EngineError::OptimizationUnavailable);
        }
        let mut vars = Vec::new();
        expr.collect_vars(&mut vars);
        self.check_declared(&vars)?;
        self.goals.push((sense, expr));
        Ok(())
    }

    pub fn assertions(&self) -> &[Formula] {
        &self.assertions
    }

    pub fn goals(&self) -> &[(Sense, Expr)] {
        &self.goals
    }

    fn name(&self, var: VarId) -> String {
        match self.declared(var) {
            Some(d) => symbol(&d.decl.name),
            None => format!("v{}", var.index()),
        }
    }

    /// Renders an expression.
    pub fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Const(c) => literal(*c),
            Expr::Var(v) => self.name(*v),
            Expr::Sum(terms) => match terms.as_slice() {
                [] => "0".to_string(),
                [t] => self.expr(t),
                terms => self.apply("+", terms.iter().map(|t| self.expr(t))),
            },
            Expr::Sub(a, b) => format!("(- {} {})", self.expr(a), self.expr(b)),
            Expr::Scale(k, e) => format!("(* {} {})", literal(*k), self.expr(e)),
            Expr::Ite(c, a, b) => format!(
                "(ite {} {} {})",
                self.formula(c),
                self.expr(a),
                self.expr(b)
            ),
        }
    }

    /// Renders a formula.
    pub fn formula(&self, formula: &Formula) -> String {
        match formula {
            Formula::Const(b) => b.to_string(),
            Formula::Var(v) => self.name(*v),
            Formula::Cmp(CmpOp::Ne, a, b) => {
                format!("(distinct {} {})", self.expr(a), self.expr(b))
            }
            Formula::Cmp(op, a, b) => {
                let op = match op {
                    CmpOp::Le => "<=",
                    CmpOp::Lt => "<",
                    CmpOp::Ge => ">=",
                    CmpOp::Gt => ">",
                    CmpOp::Eq | CmpOp::Ne => "=",
                };
                format!("({} {} {})", op, self.expr(a), self.expr(b))
            }
            Formula::Not(f) => format!("(not {})", self.formula(f)),
            Formula::And(fs) if fs.is_empty() => "true".to_string(),
            Formula::And(fs) => self.apply("and", fs.iter().map(|f| self.formula(f))),
            Formula::Or(fs) if fs.is_empty() => "false".to_string(),
            Formula::Or(fs) => self.apply("or", fs.iter().map(|f| self.formula(f))),
            Formula::Implies(a, b) => {
                format!("(=> {} {})", self.formula(a), self.formula(b))
            }
        }
    }

    fn apply(&self, op: &str, args: impl Iterator<Item = String>) -> String {
        let mut out = format!("({op}");
        for arg in args {
            out.push(' ');
            out.push_str(&arg);
        }
        out.push(')');
        out
    }

    /// Declarations and assertions, without goals or commands.
    pub fn render_body(&self) -> String {
        let mut out = String::new();
        for (_, d) in self.declarations() {
            let sort = match d.decl.sort {
                Sort::Int => "Int",
                Sort::Bool => "Bool",
            };
            let name = symbol(&d.decl.name);
            let _ = writeln!(out, "(declare-fun {name} () {sort})");
            if let (Sort::Int, Some((lo, hi)), false) = (d.decl.sort, d.decl.range, d.decl.implied) {
                let _ = writeln!(
                    out,
                    "(assert (and (<= {} {name}) (<= {name} {})))",
                    literal(lo),
                    literal(hi)
                );
            }
        }
        for f in &self.assertions {
            let _ = writeln!(out, "(assert {})", self.formula(f));
        }
        out
    }

    /// Complete script: logic, body and goals.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.mode == EngineMode::Decision {
            out.push_str("(set-logic QF_LIA)\n");
        }
        out.push_str(&self.render_body());
        for (sense, e) in &self.goals {
            let cmd = match sense {
                Sense::Minimize => "minimize",
                Sense::Maximize => "maximize",
            };
            let _ = writeln!(out, "({cmd} {})", self.expr(e));
        }
        out
    }
}

/// Integer literal; negatives as `(- n)`.
pub fn literal(value: i64) -> String {
    if value < 0 {
        format!("(- {})", value.unsigned_abs())
    } else {
        value.to_string()
    }
}

const RESERVED: &[&str] = &[
    "true", "false", "and", "or", "not", "ite", "let", "forall", "exists", "assert", "distinct",
    "par", "_", "!", "as", "BINARY", "DECIMAL", "HEXADECIMAL", "NUMERAL", "STRING",
];

/// Simple symbol when legal, `|quoted|` otherwise.
pub fn symbol(name: &str) -> String {
    let special = |c: char| "~!@$%^&*_-+=<>.?/".contains(c);
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || special(c))
        && !RESERVED.contains(&name);
    if simple {
        name.to_string()
    } else {
        format!("|{}|", name.replace(['|', '\\'], "_"))
    }
}
