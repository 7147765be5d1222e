//! Engine backed by the Z3 library.
//!
//! The engine records declarations, assertions and goals in a [`Script`].
//! Each check lowers the script into a fresh Z3 context. Optimization mode
//! uses `Optimize`, whose default priority is lexicographic in the order
//! goals were added. Decision mode uses a solver specialised for `QF_LIA`.
//!
//! Z3 reads parallelism and the random seed from its global parameters,
//! so those two settings apply to the whole process. The timeout is set
//! on each solver instance.

use std::fmt;
use std::time::Instant;

use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, Optimize, Params, Solver, StatisticsValue};

use super::smtlib::Script;
use super::{Engine, EngineMode, EngineSettings, Model, SatResult, Statistics, Value};
use crate::encoding::Sense;
use crate::error::EngineError;
use crate::expr::{CmpOp, Expr, Formula, Sort, VarDecl, VarId};

/// Z3 constant standing for one declared variable.
enum Sym<'ctx> {
    Int(Int<'ctx>),
    Bool(Bool<'ctx>),
}

/// Translation of expressions and formulas into Z3 terms.
struct Lowering<'ctx> {
    ctx: &'ctx Context,
    syms: Vec<Option<Sym<'ctx>>>,
}

impl<'ctx> Lowering<'ctx> {
    fn new(ctx: &'ctx Context, script: &Script) -> Self {
        let mut syms = Vec::with_capacity(script.width());
        syms.resize_with(script.width(), || None);
        for (var, declared) in script.declarations() {
            let name = declared.decl.name.as_str();
            syms[var.index()] = Some(match declared.decl.sort {
                Sort::Int => Sym::Int(Int::new_const(ctx, name)),
                Sort::Bool => Sym::Bool(Bool::new_const(ctx, name)),
            });
        }
        Self { ctx, syms }
    }

    fn sym(&self, var: VarId) -> Result<&Sym<'ctx>, EngineError> {
        self.syms
            .get(var.index())
            .and_then(Option::as_ref)
            .ok_or(EngineError::Undeclared(var.index()))
    }

    fn constant(&self, value: i64) -> Int<'ctx> {
        Int::from_i64(self.ctx, value)
    }

    fn int(&self, expr: &Expr) -> Result<Int<'ctx>, EngineError> {
        Ok(match expr {
            Expr::Const(c) => self.constant(*c),
            Expr::Var(v) => match self.sym(*v)? {
                Sym::Int(i) => i.clone(),
                Sym::Bool(b) => b.ite(&self.constant(1), &self.constant(0)),
            },
            Expr::Sum(terms) => {
                let terms = terms
                    .iter()
                    .map(|t| self.int(t))
                    .collect::<Result<Vec<_>, _>>()?;
                let refs: Vec<&Int<'ctx>> = terms.iter().collect();
                if refs.is_empty() {
                    self.constant(0)
                } else {
                    Int::add(self.ctx, &refs)
                }
            }
            Expr::Sub(a, b) => Int::sub(self.ctx, &[&self.int(a)?, &self.int(b)?]),
            Expr::Scale(k, e) => Int::mul(self.ctx, &[&self.constant(*k), &self.int(e)?]),
            Expr::Ite(c, a, b) => self.boolean(c)?.ite(&self.int(a)?, &self.int(b)?),
        })
    }

    fn boolean(&self, formula: &Formula) -> Result<Bool<'ctx>, EngineError> {
        Ok(match formula {
            Formula::Const(b) => Bool::from_bool(self.ctx, *b),
            Formula::Var(v) => match self.sym(*v)? {
                Sym::Bool(b) => b.clone(),
                Sym::Int(_) => return Err(EngineError::SortMismatch(v.index())),
            },
            Formula::Cmp(op, a, b) => {
                let (a, b) = (self.int(a)?, self.int(b)?);
                match op {
                    CmpOp::Le => a.le(&b),
                    CmpOp::Lt => a.lt(&b),
                    CmpOp::Ge => a.ge(&b),
                    CmpOp::Gt => a.gt(&b),
                    CmpOp::Eq => a._eq(&b),
                    CmpOp::Ne => a._eq(&b).not(),
                }
            }
            Formula::Not(f) => self.boolean(f)?.not(),
            Formula::And(fs) => Bool::and(self.ctx, &self.booleans(fs)?.iter().collect::<Vec<_>>()),
            Formula::Or(fs) => Bool::or(self.ctx, &self.booleans(fs)?.iter().collect::<Vec<_>>()),
            Formula::Implies(a, b) => self.boolean(a)?.implies(&self.boolean(b)?),
        })
    }

    fn booleans(&self, formulas: &[Formula]) -> Result<Vec<Bool<'ctx>>, EngineError> {
        formulas.iter().map(|f| self.boolean(f)).collect()
    }
}

/// Z3 solver matching the engine mode.
enum Backend<'ctx> {
    Decision(Solver<'ctx>),
    Optimization(Optimize<'ctx>),
}

impl<'ctx> Backend<'ctx> {
    fn new(ctx: &'ctx Context, mode: EngineMode) -> Result<Self, EngineError> {
        match mode {
            EngineMode::Decision => Solver::new_for_logic(ctx, "QF_LIA")
                .map(Backend::Decision)
                .ok_or_else(|| EngineError::Protocol("z3 rejected logic QF_LIA".to_string())),
            EngineMode::Optimization => Ok(Backend::Optimization(Optimize::new(ctx))),
        }
    }

    fn set_params(&self, params: &Params<'ctx>) {
        match self {
            Backend::Decision(s) => s.set_params(params),
            Backend::Optimization(o) => o.set_params(params),
        }
    }

    fn assert(&self, formula: &Bool<'ctx>) {
        match self {
            Backend::Decision(s) => s.assert(formula),
            Backend::Optimization(o) => o.assert(formula),
        }
    }

    fn add_goal(&self, sense: Sense, goal: &Int<'ctx>) -> Result<(), EngineError> {
        let Backend::Optimization(o) = self else {
            return Err(EngineError::OptimizationUnavailable);
        };
        match sense {
            Sense::Minimize => {
                o.minimize(goal);
            }
            Sense::Maximize => {
                o.maximize(goal);
            }
        }
        Ok(())
    }

    fn check(&self) -> z3::SatResult {
        match self {
            Backend::Decision(s) => s.check(),
            Backend::Optimization(o) => o.check(&[]),
        }
    }

    fn model(&self) -> Option<z3::Model<'ctx>> {
        match self {
            Backend::Decision(s) => s.get_model(),
            Backend::Optimization(o) => o.get_model(),
        }
    }

    fn reason_unknown(&self) -> Option<String> {
        match self {
            Backend::Decision(s) => s.get_reason_unknown(),
            Backend::Optimization(o) => o.get_reason_unknown(),
        }
    }

    fn statistics(&self) -> Statistics {
        let stats = match self {
            Backend::Decision(s) => s.get_statistics(),
            Backend::Optimization(o) => o.get_statistics(),
        };
        let entries: Statistics = stats
            .entries()
            .map(|entry| {
                let value = match entry.value {
                    StatisticsValue::UInt(v) => f64::from(v),
                    StatisticsValue::Double(v) => v,
                };
                (entry.key, value)
            })
            .collect();
        entries
    }
}

impl fmt::Display for Backend<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Decision(s) => write!(f, "{s}"),
            Backend::Optimization(o) => write!(f, "{o}"),
        }
    }
}

/// Engine backed by Z3: unbounded integers, exact verdicts.
///
/// # Example
/// ```
/// use u_schedule_smt::engine::{Engine, EngineMode, EngineSettings, SatResult, Z3Engine};
/// use u_schedule_smt::expr::{Expr, VarPool};
///
/// let mut pool = VarPool::new();
/// let x = pool.time("x");
/// let mut engine = Z3Engine::new(EngineMode::Optimization, &EngineSettings::default());
/// engine.declare(x, pool.get(x), (0, 0)).unwrap();
/// engine.assert(Expr::var(x).ge(3)).unwrap();
/// engine.minimize(Expr::var(x)).unwrap();
///
/// assert_eq!(engine.check().unwrap(), SatResult::Sat);
/// assert_eq!(engine.model().unwrap().get(x).unwrap().as_i64(), 3);
/// ```
#[derive(Debug)]
pub struct Z3Engine {
    script: Script,
    settings: EngineSettings,
    model: Option<Model>,
    reason: Option<String>,
    stats: Statistics,
}

impl Z3Engine {
    pub fn new(mode: EngineMode, settings: &EngineSettings) -> Self {
        Self {
            script: Script::new(mode),
            settings: settings.clone(),
            model: None,
            reason: None,
            stats: Statistics::new(),
        }
    }

    fn apply_global_params(&self) {
        let parallel = self.settings.threads > 1;
        z3::set_global_param("parallel.enable", if parallel { "true" } else { "false" });
        if parallel {
            z3::set_global_param("parallel.threads.max", &self.settings.threads.to_string());
        }
        if let Some(seed) = self.settings.random_seed {
            // z3 seeds are 32-bit
            z3::set_global_param("smt.random_seed", &(seed as u32).to_string());
        }
    }

    /// Lowers declarations, hard ranges, assertions and goals into a new
    /// solver on `ctx`.
    fn build<'ctx>(
        &self,
        ctx: &'ctx Context,
    ) -> Result<(Lowering<'ctx>, Backend<'ctx>), EngineError> {
        let lowering = Lowering::new(ctx, &self.script);
        let backend = Backend::new(ctx, self.script.mode())?;

        for (var, declared) in self.script.declarations() {
            let decl = &declared.decl;
            if let (Some((lo, hi)), false) = (decl.range, decl.implied) {
                if let Sym::Int(v) = lowering.sym(var)? {
                    backend.assert(&v.ge(&lowering.constant(lo)));
                    backend.assert(&v.le(&lowering.constant(hi)));
                }
            }
        }
        for formula in self.script.assertions() {
            backend.assert(&lowering.boolean(formula)?);
        }
        for (sense, expr) in self.script.goals() {
            backend.add_goal(*sense, &lowering.int(expr)?)?;
        }
        Ok((lowering, backend))
    }

    fn model_from(
        &self,
        lowering: &Lowering<'_>,
        found: &z3::Model<'_>,
    ) -> Result<Model, EngineError> {
        let mut model = Model::new();
        for (var, declared) in self.script.declarations() {
            let value = match lowering.sym(var)? {
                Sym::Int(v) => found.eval(v, true).and_then(|x| x.as_i64()).map(Value::Int),
                Sym::Bool(b) => found.eval(b, true).and_then(|x| x.as_bool()).map(Value::Bool),
            };
            let value = value.ok_or_else(|| {
                EngineError::Protocol(format!("no value for '{}' in the model", declared.decl.name))
            })?;
            model.insert(var, declared.decl.name.clone(), value);
        }
        Ok(model)
    }
}

impl Engine for Z3Engine {
    fn mode(&self) -> EngineMode {
        self.script.mode()
    }

    /// Time variables stay unbounded: `range` is ignored.
    fn declare(
        &mut self,
        var: VarId,
        decl: &VarDecl,
        range: (i64, i64),
    ) -> Result<(), EngineError> {
        self.script.declare(var, decl, range);
        Ok(())
    }

    fn assert(&mut self, formula: Formula) -> Result<(), EngineError> {
        self.script.assert(formula)
    }

    fn minimize(&mut self, expr: Expr) -> Result<(), EngineError> {
        self.script.add_goal(Sense::Minimize, expr)
    }

    fn maximize(&mut self, expr: Expr) -> Result<(), EngineError> {
        self.script.add_goal(Sense::Maximize, expr)
    }

    fn check(&mut self) -> Result<SatResult, EngineError> {
        let started = Instant::now();
        self.model = None;
        self.reason = None;
        self.apply_global_params();

        let mut config = Config::new();
        config.set_model_generation(true);
        let ctx = Context::new(&config);
        let (lowering, backend) = self.build(&ctx)?;

        let mut params = Params::new(&ctx);
        let timeout = u32::try_from(self.settings.timeout.as_millis()).unwrap_or(u32::MAX);
        params.set_u32("timeout", timeout);
        backend.set_params(&params);

        let result = match backend.check() {
            z3::SatResult::Sat => {
                let found = backend.model().ok_or_else(|| {
                    EngineError::Protocol("sat verdict without a model".to_string())
                })?;
                self.model = Some(self.model_from(&lowering, &found)?);
                SatResult::Sat
            }
            z3::SatResult::Unsat => SatResult::Unsat,
            z3::SatResult::Unknown => {
                self.reason = Some(
                    backend
                        .reason_unknown()
                        .unwrap_or_else(|| "unknown".to_string()),
                );
                SatResult::Unknown
            }
        };

        self.stats = backend.statistics();
        self.stats
            .entry("time".to_string())
            .or_insert_with(|| started.elapsed().as_secs_f64());
        Ok(result)
    }

    fn reason_unknown(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    fn model(&self) -> Option<Model> {
        self.model.clone()
    }

    fn statistics(&self) -> Statistics {
        self.stats.clone()
    }

    fn assertions(&self) -> &[Formula] {
        self.script.assertions()
    }

    /// Z3's own rendering of the solver state.
    fn to_smt2(&self) -> Result<String, EngineError> {
        let ctx = Context::new(&Config::new());
        let (_, backend) = self.build(&ctx)?;
        Ok(backend.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::VarPool;

    fn engine(mode: EngineMode, pool: &VarPool) -> Z3Engine {
        let mut e = Z3Engine::new(mode, &EngineSettings::default());
        for (id, decl) in pool.iter() {
            e.declare(id, decl, (0, 0)).unwrap();
        }
        e
    }

    fn value(e: &Z3Engine, var: VarId) -> i64 {
        e.model().unwrap().get(var).unwrap().as_i64()
    }

    #[test]
    fn test_sat_and_model() {
        let mut pool = VarPool::new();
        let (s, t) = (pool.time("s"), pool.time("e"));
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert((Expr::var(t) - s).eq(4)).unwrap();
        e.assert(Expr::var(s).eq(3)).unwrap();

        assert_eq!(e.check().unwrap(), SatResult::Sat);
        assert_eq!(value(&e, s), 3);
        assert_eq!(value(&e, t), 7);
        assert!(e.statistics().contains_key("time"));
    }

    #[test]
    fn test_unsat() {
        let mut pool = VarPool::new();
        let x = pool.time("x");
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert(Expr::var(x).gt(5)).unwrap();
        e.assert(Expr::var(x).lt(6)).unwrap();

        assert_eq!(e.check().unwrap(), SatResult::Unsat);
        assert!(e.model().is_none());
        assert!(e.reason_unknown().is_none());
    }

    #[test]
    fn test_time_variables_are_unbounded() {
        let mut pool = VarPool::new();
        let x = pool.time("x");
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert(Expr::var(x).ge(1_000_000)).unwrap();
        assert_eq!(e.check().unwrap(), SatResult::Sat);
        assert!(value(&e, x) >= 1_000_000);
    }

    #[test]
    fn test_hard_and_implied_ranges() {
        let mut pool = VarPool::new();
        let x = pool.int("x", 900, 1000);
        let aux = pool.derived("aux", 0, 5);
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert(Expr::var(aux).eq(x)).unwrap();
        assert_eq!(e.check().unwrap(), SatResult::Sat);
        assert!((900..=1000).contains(&value(&e, x)));

        e.assert(Expr::var(x).lt(900)).unwrap();
        assert_eq!(e.check().unwrap(), SatResult::Unsat);
    }

    #[test]
    fn test_booleans_and_indicators() {
        let mut pool = VarPool::new();
        let a = pool.boolean("a");
        let b = pool.boolean("b");
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert((Expr::indicator(a) + Expr::indicator(b)).eq(1)).unwrap();
        e.assert(Formula::var(a).negate()).unwrap();

        assert_eq!(e.check().unwrap(), SatResult::Sat);
        let model = e.model().unwrap();
        assert_eq!(model.get(a), Some(Value::Bool(false)));
        assert_eq!(model.get(b), Some(Value::Bool(true)));
    }

    #[test]
    fn test_lexicographic_goals() {
        let mut pool = VarPool::new();
        let (x, y) = (pool.int("x", 0, 5), pool.int("y", 0, 5));
        let mut e = engine(EngineMode::Optimization, &pool);
        e.assert((Expr::var(x) + y).le(6)).unwrap();
        e.maximize(Expr::var(x)).unwrap();
        e.minimize(-Expr::var(y)).unwrap();

        assert_eq!(e.check().unwrap(), SatResult::Sat);
        assert_eq!(value(&e, x), 5);
        assert_eq!(value(&e, y), 1);
    }

    #[test]
    fn test_decision_mode_rejects_goals() {
        let mut pool = VarPool::new();
        let x = pool.time("x");
        let mut e = engine(EngineMode::Decision, &pool);
        assert!(matches!(
            e.minimize(Expr::var(x)),
            Err(EngineError::OptimizationUnavailable)
        ));
    }

    #[test]
    fn test_integer_used_as_formula() {
        let mut pool = VarPool::new();
        let x = pool.time("x");
        let mut e = engine(EngineMode::Decision, &pool);
        e.assert(Formula::var(x)).unwrap();
        assert!(matches!(e.check(), Err(EngineError::SortMismatch(0))));
    }

    #[test]
    fn test_to_smt2() {
        let mut pool = VarPool::new();
        let x = pool.time("t_start");
        let mut e = engine(EngineMode::Optimization, &pool);
        e.assert(Expr::var(x).ge(2)).unwrap();
        e.minimize(Expr::var(x)).unwrap();

        let text = e.to_smt2().unwrap();
        assert!(text.contains("t_start"));
        assert!(text.contains("assert"));
        assert!(text.contains("minimize"));
    }
}
