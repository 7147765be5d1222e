//! Bounded search engine.
//!
//! Secondary engine for small problems, usable without a native Z3.
//! Decides formulas over variables with finite ranges by depth-first
//! search. Each search node propagates bounds from the linear facts that
//! are forced in the current domains (plain comparisons, conjunctions,
//! disjunctions with a single live alternative, if-then-else terms whose
//! condition is decided), then branches on the first unfixed variable:
//! booleans first, then integers in declaration order.
//!
//! Goals are optimized lexicographically by iterative tightening: once a
//! goal cannot be improved it is fixed at its optimum before the next
//! goal is considered.
//!
//! Time variables only carry an estimated range. Exhausting such a range
//! proves nothing, so it is reported as `unknown`. The same holds when a
//! maximized goal settles with an estimated variable at its upper end.
//!
//! With more than one thread the values of the root branching variable
//! are explored on a rayon pool. The first solution in value order wins,
//! so the result does not depend on scheduling.
//!
//! # Reference
//! Apt (2003), "Principles of Constraint Programming", Ch. 6 (bounds consistency)

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::debug;

use super::smtlib::Script;
use super::{Engine, EngineMode, EngineSettings, Model, SatResult, Statistics, Value};
use crate::encoding::Sense;
use crate::error::EngineError;
use crate::expr::{CmpOp, Expr, Formula, Sort, VarDecl, VarId};

/// How many nodes are expanded between two deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 256;

/// Reason reported when the search ran out of estimated ranges.
pub const RANGE_EXHAUSTED: &str = "search range exhausted";

/// Cap on propagation rounds per search node.
const MAX_PROPAGATION_ROUNDS: usize = 128;

type Dom = (i64, i64);

/// Formula in negation normal form.
#[derive(Debug, Clone)]
enum Node {
    Const(bool),
    /// Boolean variable with polarity.
    Lit(usize, bool),
    /// `term <op> 0`
    Cmp(CmpOp, Term),
    And(Vec<Node>),
    Or(Vec<Node>),
}

#[derive(Debug, Clone)]
enum Term {
    Const(i64),
    Var(usize),
    Sum(Vec<Term>),
    Scale(i64, Box<Term>),
    Ite(Box<Node>, Box<Term>, Box<Term>),
}

/// `sum(c * x) + k`
struct Linear {
    terms: Vec<(usize, i128)>,
    k: i128,
}

struct Conflict;

fn negate_op(op: CmpOp) -> CmpOp {
    match op {
        CmpOp::Le => CmpOp::Gt,
        CmpOp::Lt => CmpOp::Ge,
        CmpOp::Ge => CmpOp::Lt,
        CmpOp::Gt => CmpOp::Le,
        CmpOp::Eq => CmpOp::Ne,
        CmpOp::Ne => CmpOp::Eq,
    }
}

fn lower_term(expr: &Expr) -> Term {
    match expr {
        Expr::Const(c) => Term::Const(*c),
        Expr::Var(v) => Term::Var(v.index()),
        Expr::Sum(ts) => Term::Sum(ts.iter().map(lower_term).collect()),
        Expr::Sub(a, b) => difference(a, b),
        Expr::Scale(k, e) => Term::Scale(*k, Box::new(lower_term(e))),
        Expr::Ite(c, a, b) => Term::Ite(
            Box::new(lower(c, true)),
            Box::new(lower_term(a)),
            Box::new(lower_term(b)),
        ),
    }
}

fn difference(a: &Expr, b: &Expr) -> Term {
    Term::Sum(vec![lower_term(a), Term::Scale(-1, Box::new(lower_term(b)))])
}

/// Lowers `formula` (or its negation) to negation normal form.
fn lower(formula: &Formula, positive: bool) -> Node {
    match formula {
        Formula::Const(b) => Node::Const(*b == positive),
        Formula::Var(v) => Node::Lit(v.index(), positive),
        Formula::Cmp(op, a, b) => {
            let op = if positive { *op } else { negate_op(*op) };
            Node::Cmp(op, difference(a, b))
        }
        Formula::Not(f) => lower(f, !positive),
        Formula::And(fs) => {
            let parts = fs.iter().map(|f| lower(f, positive)).collect();
            if positive {
                Node::And(parts)
            } else {
                Node::Or(parts)
            }
        }
        Formula::Or(fs) => {
            let parts = fs.iter().map(|f| lower(f, positive)).collect();
            if positive {
                Node::Or(parts)
            } else {
                Node::And(parts)
            }
        }
        Formula::Implies(p, q) => {
            if positive {
                Node::Or(vec![lower(p, false), lower(q, true)])
            } else {
                Node::And(vec![lower(p, true), lower(q, false)])
            }
        }
    }
}

// ======================== Evaluation ========================

fn decide(op: CmpOp, lo: i128, hi: i128) -> Option<bool> {
    let (holds, fails) = match op {
        CmpOp::Le => (hi <= 0, lo > 0),
        CmpOp::Lt => (hi < 0, lo >= 0),
        CmpOp::Ge => (lo >= 0, hi < 0),
        CmpOp::Gt => (lo > 0, hi <= 0),
        CmpOp::Eq => (lo == 0 && hi == 0, lo > 0 || hi < 0),
        CmpOp::Ne => (lo > 0 || hi < 0, lo == 0 && hi == 0),
    };
    if holds {
        Some(true)
    } else if fails {
        Some(false)
    } else {
        None
    }
}

/// Three-valued evaluation: `None` when the domains do not decide it.
fn eval(node: &Node, doms: &[Dom]) -> Option<bool> {
    match node {
        Node::Const(b) => Some(*b),
        Node::Lit(v, positive) => {
            let (lo, hi) = doms[*v];
            (lo == hi).then_some((lo != 0) == *positive)
        }
        Node::Cmp(op, t) => {
            let (lo, hi) = bounds(t, doms);
            decide(*op, lo, hi)
        }
        Node::And(parts) => {
            let mut all = true;
            for p in parts {
                match eval(p, doms) {
                    Some(false) => return Some(false),
                    None => all = false,
                    Some(true) => {}
                }
            }
            all.then_some(true)
        }
        Node::Or(parts) => {
            let mut none = true;
            for p in parts {
                match eval(p, doms) {
                    Some(true) => return Some(true),
                    None => none = false,
                    Some(false) => {}
                }
            }
            none.then_some(false)
        }
    }
}

fn bounds(term: &Term, doms: &[Dom]) -> (i128, i128) {
    match term {
        Term::Const(c) => (*c as i128, *c as i128),
        Term::Var(v) => (doms[*v].0 as i128, doms[*v].1 as i128),
        Term::Sum(ts) => ts.iter().fold((0, 0), |(lo, hi), t| {
            let (a, b) = bounds(t, doms);
            (lo + a, hi + b)
        }),
        Term::Scale(k, t) => {
            let (lo, hi) = bounds(t, doms);
            let k = *k as i128;
            if k >= 0 {
                (k * lo, k * hi)
            } else {
                (k * hi, k * lo)
            }
        }
        Term::Ite(c, a, b) => match eval(c, doms) {
            Some(true) => bounds(a, doms),
            Some(false) => bounds(b, doms),
            None => {
                let (a_lo, a_hi) = bounds(a, doms);
                let (b_lo, b_hi) = bounds(b, doms);
                (a_lo.min(b_lo), a_hi.max(b_hi))
            }
        },
    }
}

// ======================== Propagation ========================

/// Linear form of `term`, resolving decided if-then-else branches.
fn linearize(term: &Term, doms: &[Dom]) -> Option<Linear> {
    fn walk(term: &Term, scale: i128, doms: &[Dom], out: &mut Linear) -> Option<()> {
        match term {
            Term::Const(c) => out.k += scale * *c as i128,
            Term::Var(v) => out.terms.push((*v, scale)),
            Term::Sum(ts) => {
                for t in ts {
                    walk(t, scale, doms, out)?;
                }
            }
            Term::Scale(k, t) => walk(t, scale * *k as i128, doms, out)?,
            Term::Ite(c, a, b) => match eval(c, doms)? {
                true => walk(a, scale, doms, out)?,
                false => walk(b, scale, doms, out)?,
            },
        }
        Some(())
    }

    let mut lin = Linear {
        terms: Vec::new(),
        k: 0,
    };
    walk(term, 1, doms, &mut lin)?;
    lin.terms.sort_unstable_by_key(|&(v, _)| v);
    let mut merged: Vec<(usize, i128)> = Vec::with_capacity(lin.terms.len());
    for (v, c) in lin.terms {
        match merged.last_mut() {
            Some((last, acc)) if *last == v => *acc += c,
            _ => merged.push((v, c)),
        }
    }
    merged.retain(|&(_, c)| c != 0);
    lin.terms = merged;
    Some(lin)
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i128, b: i128) -> i128 {
    -floor_div(-a, b)
}

fn term_min(c: i128, dom: Dom) -> i128 {
    if c > 0 {
        c * dom.0 as i128
    } else {
        c * dom.1 as i128
    }
}

/// Tightens domains for `sum(c * x) + k <= 0`.
fn tighten_le(terms: &[(usize, i128)], k: i128, doms: &mut [Dom]) -> Result<bool, Conflict> {
    let min_total: i128 = terms.iter().map(|&(v, c)| term_min(c, doms[v])).sum();
    if min_total + k > 0 {
        return Err(Conflict);
    }
    let mut changed = false;
    for &(v, c) in terms {
        // c * x_v <= -k - (min of the other terms)
        let budget = -k - (min_total - term_min(c, doms[v]));
        let (lo, hi) = doms[v];
        if c > 0 {
            let new_hi = floor_div(budget, c);
            if new_hi < hi as i128 {
                if new_hi < lo as i128 {
                    return Err(Conflict);
                }
                doms[v].1 = new_hi as i64;
                changed = true;
            }
        } else {
            let new_lo = ceil_div(budget, c);
            if new_lo > lo as i128 {
                if new_lo > hi as i128 {
                    return Err(Conflict);
                }
                doms[v].0 = new_lo as i64;
                changed = true;
            }
        }
    }
    Ok(changed)
}

fn tighten_ne(lin: &Linear, doms: &mut [Dom]) -> Result<bool, Conflict> {
    let mut free = None;
    let mut rest = lin.k;
    for &(v, c) in &lin.terms {
        let (lo, hi) = doms[v];
        if lo == hi {
            rest += c * lo as i128;
        } else if free.is_some() {
            return Ok(false);
        } else {
            free = Some((v, c));
        }
    }
    match free {
        None if rest == 0 => Err(Conflict),
        None => Ok(false),
        Some((v, c)) => {
            if rest % c != 0 {
                return Ok(false);
            }
            let excluded = -rest / c;
            let (lo, hi) = doms[v];
            if excluded == lo as i128 {
                doms[v].0 = lo + 1;
                Ok(true)
            } else if excluded == hi as i128 {
                doms[v].1 = hi - 1;
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

fn tighten(op: CmpOp, lin: &Linear, doms: &mut [Dom]) -> Result<bool, Conflict> {
    let negated = || -> Vec<(usize, i128)> { lin.terms.iter().map(|&(v, c)| (v, -c)).collect() };
    match op {
        CmpOp::Le => tighten_le(&lin.terms, lin.k, doms),
        CmpOp::Lt => tighten_le(&lin.terms, lin.k + 1, doms),
        CmpOp::Ge => tighten_le(&negated(), -lin.k, doms),
        CmpOp::Gt => tighten_le(&negated(), -lin.k + 1, doms),
        CmpOp::Eq => {
            let a = tighten_le(&lin.terms, lin.k, doms)?;
            let b = tighten_le(&negated(), -lin.k, doms)?;
            Ok(a || b)
        }
        CmpOp::Ne => tighten_ne(lin, doms),
    }
}

/// Narrows domains with the consequences of `node` holding.
fn force(node: &Node, doms: &mut [Dom]) -> Result<bool, Conflict> {
    match node {
        Node::Const(true) => Ok(false),
        Node::Const(false) => Err(Conflict),
        Node::Lit(v, positive) => {
            let target = i64::from(*positive);
            let (lo, hi) = doms[*v];
            if target < lo || target > hi {
                Err(Conflict)
            } else if lo == hi {
                Ok(false)
            } else {
                doms[*v] = (target, target);
                Ok(true)
            }
        }
        Node::Cmp(op, term) => match linearize(term, doms) {
            Some(lin) => tighten(*op, &lin, doms),
            None => {
                let (lo, hi) = bounds(term, doms);
                match decide(*op, lo, hi) {
                    Some(false) => Err(Conflict),
                    _ => Ok(false),
                }
            }
        },
        Node::And(parts) => {
            let mut changed = false;
            for p in parts {
                changed |= force(p, doms)?;
            }
            Ok(changed)
        }
        Node::Or(parts) => {
            let mut live = None;
            let mut count = 0;
            for p in parts {
                match eval(p, doms) {
                    Some(true) => return Ok(false),
                    Some(false) => {}
                    None => {
                        count += 1;
                        live = Some(p);
                    }
                }
            }
            match (count, live) {
                (0, _) => Err(Conflict),
                (1, Some(p)) => force(p, doms),
                _ => Ok(false),
            }
        }
    }
}

fn propagate(nodes: &[Node], doms: &mut [Dom]) -> Result<(), Conflict> {
    for _ in 0..MAX_PROPAGATION_ROUNDS {
        let mut changed = false;
        for node in nodes {
            changed |= force(node, doms)?;
        }
        if !changed {
            break;
        }
    }
    Ok(())
}

// ======================== Search ========================

enum Verdict {
    Sat(Vec<i64>),
    Unsat,
    /// No solution inside estimated ranges.
    RangeExhausted,
    Timeout,
}

enum Outcome {
    Found(Vec<i64>),
    Exhausted,
    Timeout,
    /// Parallel branch abandoned because an earlier branch succeeded.
    Aborted,
}

/// Static search parameters shared by every branch.
struct Plan<'a> {
    nodes: &'a [Node],
    /// Branching order (variable indices).
    order: &'a [usize],
    /// Per variable: enumerate values from the top.
    descending: &'a [bool],
    deadline: Instant,
}

impl Plan<'_> {
    fn values(&self, var: usize, (lo, hi): Dom) -> Box<dyn Iterator<Item = i64>> {
        if self.descending[var] {
            Box::new((lo..=hi).rev())
        } else {
            Box::new(lo..=hi)
        }
    }

    fn first_unfixed(&self, doms: &[Dom]) -> Option<usize> {
        self.order.iter().copied().find(|&v| doms[v].0 != doms[v].1)
    }
}

struct Search<'a> {
    plan: &'a Plan<'a>,
    visited: u64,
    /// Parallel branch index and the smallest index that found a solution.
    race: Option<(usize, &'a AtomicUsize)>,
}

impl Search<'_> {
    fn dfs(&mut self, mut doms: Vec<Dom>) -> Outcome {
        self.visited += 1;
        if self.visited % DEADLINE_CHECK_INTERVAL == 0 {
            if Instant::now() >= self.plan.deadline {
                return Outcome::Timeout;
            }
            if let Some((index, best)) = self.race {
                if best.load(Ordering::Relaxed) < index {
                    return Outcome::Aborted;
                }
            }
        }
        if propagate(self.plan.nodes, &mut doms).is_err() {
            return Outcome::Exhausted;
        }
        let Some(var) = self.plan.first_unfixed(&doms) else {
            return leaf(self.plan.nodes, &doms);
        };
        for value in self.plan.values(var, doms[var]) {
            let mut child = doms.clone();
            child[var] = (value, value);
            match self.dfs(child) {
                Outcome::Exhausted => {}
                other => return other,
            }
        }
        Outcome::Exhausted
    }
}

fn leaf(nodes: &[Node], doms: &[Dom]) -> Outcome {
    if nodes.iter().all(|n| eval(n, doms) == Some(true)) {
        Outcome::Found(doms.iter().map(|d| d.0).collect())
    } else {
        Outcome::Exhausted
    }
}

/// Reference engine for finite problems.
///
/// # Example
/// ```
/// use u_schedule_smt::engine::{BoundedEngine, Engine, EngineMode, EngineSettings, SatResult};
/// use u_schedule_smt::expr::{Expr, VarPool};
///
/// let mut pool = VarPool::new();
/// let x = pool.int("x", 0, 10);
/// let mut engine = BoundedEngine::new(EngineMode::Optimization, &EngineSettings::default());
/// engine.declare(x, pool.get(x), (0, 10)).unwrap();
/// engine.assert(Expr::var(x).ge(3)).unwrap();
/// engine.maximize(Expr::var(x) * 2).unwrap();
///
/// assert_eq!(engine.check().unwrap(), SatResult::Sat);
/// assert_eq!(engine.model().unwrap().get(x).unwrap().as_i64(), 10);
/// ```
#[derive(Debug)]
pub struct BoundedEngine {
    script: Script,
    settings: EngineSettings,
    model: Option<Model>,
    reason: Option<String>,
    stats: Statistics,
}

impl BoundedEngine {
    pub fn new(mode: EngineMode, settings: &EngineSettings) -> Self {
        Self {
            script: Script::new(mode),
            settings: settings.clone(),
            model: None,
            reason: None,
            stats: Statistics::new(),
        }
    }

    fn initial_domains(&self) -> Vec<Dom> {
        let mut doms = vec![(0, 0); self.script.width()];
        for (var, declared) in self.script.declarations() {
            doms[var.index()] = match declared.decl.sort {
                Sort::Bool => (0, 1),
                Sort::Int => declared.range,
            };
        }
        doms
    }

    fn branching_order(&self) -> Vec<usize> {
        let declared: Vec<(VarId, Sort)> = self
            .script
            .declarations()
            .map(|(v, d)| (v, d.decl.sort))
            .collect();
        declared
            .iter()
            .filter(|(_, s)| *s == Sort::Bool)
            .chain(declared.iter().filter(|(_, s)| *s == Sort::Int))
            .map(|(v, _)| v.index())
            .collect()
    }

    /// Integer variables searched over an estimated range, with the
    /// upper end of that range.
    fn estimated_upper_ends(&self) -> Vec<(usize, i64)> {
        self.script
            .declarations()
            .filter(|(_, d)| {
                d.decl.sort == Sort::Int && (d.decl.range.is_none() || d.decl.implied)
            })
            .map(|(v, d)| (v.index(), d.range.1))
            .collect()
    }

    fn value_order(&self) -> Vec<bool> {
        let width = self.script.width();
        match self.settings.random_seed {
            Some(seed) => {
                let mut rng = SmallRng::seed_from_u64(seed);
                (0..width).map(|_| rng.random_bool(0.5)).collect()
            }
            None => vec![false; width],
        }
    }

    /// Finds a model, then improves each goal in turn until it is proved
    /// optimal and fixes it there.
    fn search(&self, started: Instant, pool: Option<&rayon::ThreadPool>) -> (Verdict, u64, u64) {
        let mut nodes: Vec<Node> = self
            .script
            .assertions()
            .iter()
            .map(|f| lower(f, true))
            .collect();
        let doms = self.initial_domains();
        let order = self.branching_order();
        let descending = self.value_order();
        let deadline = started + self.settings.timeout;
        let estimated = self.estimated_upper_ends();
        let exhausted = if estimated.is_empty() {
            Verdict::Unsat
        } else {
            Verdict::RangeExhausted
        };
        let attempt = |nodes: &[Node], visited: &mut u64| {
            let plan = Plan {
                nodes,
                order: &order,
                descending: &descending,
                deadline,
            };
            let (outcome, n) = run(&plan, &doms, pool);
            *visited += n;
            outcome
        };

        let mut visited = 0;
        let mut solutions = 0;
        let mut best = match attempt(&nodes[..], &mut visited) {
            Outcome::Found(values) => values,
            Outcome::Timeout => return (Verdict::Timeout, visited, solutions),
            Outcome::Exhausted | Outcome::Aborted => return (exhausted, visited, solutions),
        };
        solutions += 1;

        for (index, (sense, expr)) in self.script.goals().iter().enumerate() {
            let term = lower_term(expr);
            let op = match sense {
                Sense::Minimize => CmpOp::Lt,
                Sense::Maximize => CmpOp::Gt,
            };
            loop {
                let current = goal_value(&term, &best);
                if self.settings.verbose {
                    debug!(event = "goal_bound", goal = index, value = current);
                }
                nodes.push(Node::Cmp(op, offset(&term, current)));
                let outcome = attempt(&nodes[..], &mut visited);
                nodes.pop();
                match outcome {
                    Outcome::Found(values) => {
                        best = values;
                        solutions += 1;
                    }
                    Outcome::Timeout => return (Verdict::Timeout, visited, solutions),
                    Outcome::Exhausted | Outcome::Aborted => {
                        let clipped = estimated.iter().any(|&(v, hi)| best[v] == hi);
                        if *sense == Sense::Maximize && clipped {
                            return (Verdict::RangeExhausted, visited, solutions);
                        }
                        debug!(event = "goal_settled", goal = index, sense = ?sense, value = current);
                        nodes.push(Node::Cmp(CmpOp::Eq, offset(&term, current)));
                        break;
                    }
                }
            }
        }
        (Verdict::Sat(best), visited, solutions)
    }

    fn model_from(&self, values: &[i64]) -> Model {
        let mut model = Model::new();
        for (var, declared) in self.script.declarations() {
            let raw = values[var.index()];
            let value = match declared.decl.sort {
                Sort::Bool => Value::Bool(raw != 0),
                Sort::Int => Value::Int(raw),
            };
            model.insert(var, declared.decl.name.clone(), value);
        }
        model
    }
}

fn run(plan: &Plan<'_>, doms: &[Dom], pool: Option<&rayon::ThreadPool>) -> (Outcome, u64) {
    match pool {
        None => {
            let mut search = Search {
                plan,
                visited: 0,
                race: None,
            };
            let outcome = search.dfs(doms.to_vec());
            (outcome, search.visited)
        }
        Some(pool) => run_split(plan, doms, pool),
    }
}

/// Explores the root variable's values in parallel.
fn run_split(plan: &Plan<'_>, doms: &[Dom], pool: &rayon::ThreadPool) -> (Outcome, u64) {
    let mut root = doms.to_vec();
    if propagate(plan.nodes, &mut root).is_err() {
        return (Outcome::Exhausted, 1);
    }
    let Some(var) = plan.first_unfixed(&root) else {
        return (leaf(plan.nodes, &root), 1);
    };
    let values: Vec<i64> = plan.values(var, root[var]).collect();
    let best = AtomicUsize::new(usize::MAX);

    let results: Vec<(Outcome, u64)> = pool.install(|| {
        values
            .par_iter()
            .enumerate()
            .map(|(index, &value)| {
                if best.load(Ordering::Relaxed) < index {
                    return (Outcome::Aborted, 0);
                }
                let mut child = root.clone();
                child[var] = (value, value);
                let mut search = Search {
                    plan,
                    visited: 0,
                    race: Some((index, &best)),
                };
                let outcome = search.dfs(child);
                if matches!(outcome, Outcome::Found(_)) {
                    best.fetch_min(index, Ordering::Relaxed);
                }
                (outcome, search.visited)
            })
            .collect()
    });

    let visited = 1 + results.iter().map(|(_, n)| n).sum::<u64>();
    for (outcome, _) in results {
        match outcome {
            Outcome::Exhausted | Outcome::Aborted => {}
            decided => return (decided, visited),
        }
    }
    (Outcome::Exhausted, visited)
}

impl Engine for BoundedEngine {
    fn mode(&self) -> EngineMode {
        self.script.mode()
    }

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

        let pool = if self.settings.threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.settings.threads)
                    .build()?,
            )
        } else {
            None
        };
        let (verdict, visited, solutions) = self.search(started, pool.as_ref());

        let result = match verdict {
            Verdict::Sat(values) => {
                self.model = Some(self.model_from(&values));
                SatResult::Sat
            }
            Verdict::Unsat => SatResult::Unsat,
            Verdict::RangeExhausted => {
                self.reason = Some(RANGE_EXHAUSTED.to_string());
                SatResult::Unknown
            }
            Verdict::Timeout => {
                self.reason = Some("timeout".to_string());
                SatResult::Unknown
            }
        };
        self.stats = Statistics::from([
            ("nodes".to_string(), visited as f64),
            ("solutions".to_string(), solutions as f64),
            ("threads".to_string(), self.settings.threads as f64),
            ("time".to_string(), started.elapsed().as_secs_f64()),
        ]);
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

    fn to_smt2(&self) -> Result<String, EngineError> {
        Ok(self.script.render())
    }
}

/// Value of a goal under a complete assignment.
fn goal_value(term: &Term, values: &[i64]) -> i64 {
    let doms: Vec<Dom> = values.iter().map(|&v| (v, v)).collect();
    let value = bounds(term, &doms).0;
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// `term - value`
fn offset(term: &Term, value: i64) -> Term {
    Term::Sum(vec![term.clone(), Term::Scale(-1, Box::new(Term::Const(value)))])
}
