//! Depth-first branch and bound engine.
//!
//! # Algorithm
//!
//! 1. Validate the snapshot and normalize every domain
//! 2. Propagate to a fixed point:
//!    a. presence literals of optional variables
//!    b. bounds of active linear constraints
//!    c. value removal for active all-different constraints
//!    d. unit rules for boolean constraints
//!    e. enforcement literals of constraints that can no longer hold
//!    f. the objective cut `objective < incumbent`
//! 3. Branch on the unfixed variable with the smallest domain by bisecting
//!    it, visiting first the half the objective prefers
//! 4. On a full assignment, check every constraint exactly and record the
//!    solution as the new incumbent
//!
//! This is a complete search meant for small models and for testing the
//! modeling layer end to end; it makes no attempt at learning or restarts.

use std::collections::HashSet;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::model::{
    is_positive, literal_is_true, reference_value, variable_of, ConstraintKind, CpModelProto,
};

use super::config::SearchConfig;
use super::domain::Domain;
use super::engine::SolvingEngine;
use super::types::{CpSolverResponse, CpSolverStatus};

/// The bundled reference engine.
///
/// [`solve`](SolvingEngine::solve) uses the engine's own [`SearchConfig`];
/// [`solve_with_parameters`](SolvingEngine::solve_with_parameters) builds a
/// fresh configuration from the parameter string instead.
///
/// # Examples
///
/// ```
/// use u_cpmodel::model::CpModel;
/// use u_cpmodel::solver::{CpSolverStatus, DepthFirstEngine, SolvingEngine};
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var([0, 10], "x").unwrap();
/// model.add_linear_constraint([(x, 1)], 0, 5).unwrap();
/// model.maximize(x).unwrap();
///
/// let response = DepthFirstEngine::new().solve(model.model());
/// assert_eq!(response.status, CpSolverStatus::Optimal);
/// assert_eq!(response.value(x), Some(5));
/// assert_eq!(response.objective_value, 5.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DepthFirstEngine {
    config: SearchConfig,
}

impl DepthFirstEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    fn run(&self, model: &CpModelProto, config: &SearchConfig) -> CpSolverResponse {
        let start = Instant::now();

        if let Err(err) = model.validate() {
            warn!("rejecting model: {err}");
            return CpSolverResponse::empty(CpSolverStatus::ModelInvalid);
        }
        if let Err(err) = config.validate() {
            warn!("rejecting search configuration: {err}");
            return CpSolverResponse::empty(CpSolverStatus::ModelInvalid);
        }

        info!(
            "solving model with {} variables and {} constraints",
            model.variables.len(),
            model.constraints.len()
        );

        let problem = Problem::new(model, config);
        let mut root = problem.initial.clone();
        let (outcome, root_bound) = match problem.propagate(&mut root, None) {
            Ok(()) => {
                let root_bound = problem.objective_lower_bound(&root);
                (explore(&problem, config, start, root), root_bound)
            }
            Err(Conflict) => (
                Outcome {
                    num_conflicts: 1,
                    ..Default::default()
                },
                None,
            ),
        };

        let response = problem.response(outcome, root_bound, start);
        info!(
            "search finished: {} after {} branches and {} conflicts in {:.3}s",
            response.status, response.num_branches, response.num_conflicts, response.wall_time
        );
        response
    }
}

impl SolvingEngine for DepthFirstEngine {
    fn solve(&self, model: &CpModelProto) -> CpSolverResponse {
        self.run(model, &self.config)
    }

    fn solve_with_parameters(&self, model: &CpModelProto, parameters: &str) -> CpSolverResponse {
        match SearchConfig::from_parameters(parameters) {
            Ok(config) => self.run(model, &config),
            Err(err) => {
                warn!("rejecting parameters '{parameters}': {err}");
                CpSolverResponse::empty(CpSolverStatus::ModelInvalid)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conflict;

/// `Ok(changed)` or a wiped-out domain.
type Propagation = Result<bool, Conflict>;

/// `coeff * x[var]`, with a negated reference folded into the coefficient.
#[derive(Debug, Clone, Copy)]
struct Term {
    coeff: i128,
    var: usize,
}

fn terms(vars: &[i32], coeffs: &[i64]) -> Vec<Term> {
    vars.iter()
        .zip(coeffs)
        .map(|(&reference, &coeff)| Term {
            coeff: reference_value(reference, coeff),
            var: variable_of(reference) as usize,
        })
        .collect()
}

#[derive(Debug)]
enum Kind {
    Linear { terms: Vec<Term>, domain: Domain },
    AllDifferent(Vec<i32>),
    BoolOr(Vec<i32>),
    BoolAnd(Vec<i32>),
    BoolXor(Vec<i32>),
}

#[derive(Debug)]
struct PreparedConstraint {
    enforcement: Vec<i32>,
    kind: Kind,
}

#[derive(Debug)]
struct Objective {
    terms: Vec<Term>,
    offset: f64,
    scaling_factor: f64,
}

impl Objective {
    fn scaled(&self, inner: i128) -> f64 {
        let scale = if self.scaling_factor == 0.0 {
            1.0
        } else {
            self.scaling_factor
        };
        scale * (inner as f64 + self.offset)
    }
}

/// A snapshot translated into the engine's working form.
#[derive(Debug)]
struct Problem {
    declared: Vec<Domain>,
    presence: Vec<Option<i32>>,
    initial: Vec<Domain>,
    constraints: Vec<PreparedConstraint>,
    objective: Option<Objective>,
    order: Vec<usize>,
    prefer_high: Vec<bool>,
}

impl Problem {
    fn new(model: &CpModelProto, config: &SearchConfig) -> Self {
        let declared: Vec<Domain> = model
            .variables
            .iter()
            .map(|var| Domain::from_flat(&var.domain))
            .collect();
        let presence: Vec<Option<i32>> = model
            .variables
            .iter()
            .map(|var| var.enforcement_literal)
            .collect();
        // An absent variable is fixed to 0, so 0 stays reachable until the
        // presence literal is decided.
        let initial = declared
            .iter()
            .zip(&presence)
            .map(|(domain, presence)| match presence {
                Some(_) => domain.with_value(0),
                None => domain.clone(),
            })
            .collect();

        let constraints = model
            .constraints
            .iter()
            .map(|ct| PreparedConstraint {
                enforcement: ct.enforcement_literal.clone(),
                kind: match &ct.kind {
                    ConstraintKind::Linear(linear) => Kind::Linear {
                        terms: terms(&linear.vars, &linear.coeffs),
                        domain: Domain::from_flat(&linear.domain),
                    },
                    ConstraintKind::AllDifferent(all_diff) => {
                        Kind::AllDifferent(all_diff.vars.clone())
                    }
                    ConstraintKind::BoolOr(arg) => Kind::BoolOr(arg.literals.clone()),
                    ConstraintKind::BoolAnd(arg) => Kind::BoolAnd(arg.literals.clone()),
                    ConstraintKind::BoolXor(arg) => Kind::BoolXor(arg.literals.clone()),
                },
            })
            .collect();

        let objective = model.objective.as_ref().map(|objective| Objective {
            terms: terms(&objective.vars, &objective.coeffs),
            offset: objective.offset,
            scaling_factor: objective.scaling_factor,
        });

        let num_variables = declared.len();
        let mut order: Vec<usize> = (0..num_variables).collect();
        if config.randomize_search {
            let mut rng = StdRng::seed_from_u64(config.random_seed.unwrap_or(42));
            order.shuffle(&mut rng);
        }

        let mut prefer_high = vec![false; num_variables];
        if let Some(objective) = &objective {
            for term in &objective.terms {
                prefer_high[term.var] = term.coeff < 0;
            }
        }

        Self {
            declared,
            presence,
            initial,
            constraints,
            objective,
            order,
            prefer_high,
        }
    }

    /// Propagates to a fixed point. `cut` bounds the inner objective from
    /// above once an incumbent exists.
    fn propagate(&self, domains: &mut [Domain], cut: Option<i128>) -> Result<(), Conflict> {
        loop {
            let mut changed = false;

            for (var, presence) in self.presence.iter().enumerate() {
                if let Some(lit) = *presence {
                    changed |= self.propagate_presence(domains, var, lit)?;
                }
            }

            for constraint in &self.constraints {
                changed |= match enforcement(domains, &constraint.enforcement) {
                    Enforcement::Active => constraint.kind.propagate(domains)?,
                    Enforcement::Inactive => false,
                    Enforcement::Undecided { unknown: 1, last } => {
                        if constraint.kind.is_violated(domains) {
                            set_literal(domains, last, false)?
                        } else {
                            false
                        }
                    }
                    Enforcement::Undecided { .. } => false,
                };
            }

            if let (Some(objective), Some(cut)) = (&self.objective, cut) {
                changed |= propagate_linear(domains, &objective.terms, i128::MIN, cut)?;
            }

            if !changed {
                return Ok(());
            }
        }
    }

    fn propagate_presence(&self, domains: &mut [Domain], var: usize, lit: i32) -> Propagation {
        match literal_state(domains, lit) {
            Some(true) => {
                let domain = domains[var].intersection(&self.declared[var]);
                restrict(domains, var, domain)
            }
            Some(false) => {
                let domain = domains[var].intersect(0, 0);
                restrict(domains, var, domain)
            }
            None => {
                if domains[var].intersection(&self.declared[var]).is_empty() {
                    set_literal(domains, lit, false)
                } else {
                    Ok(false)
                }
            }
        }
    }

    fn select_variable(&self, domains: &[Domain]) -> Option<usize> {
        self.order
            .iter()
            .copied()
            .filter(|&var| domains[var].fixed_value().is_none())
            .min_by_key(|&var| domains[var].size())
    }

    fn is_solution(&self, solution: &[i64]) -> bool {
        let domains_hold = solution.iter().enumerate().all(|(var, &value)| {
            let present = self
                .presence[var]
                .map_or(true, |lit| literal_holds(lit, solution));
            if present {
                self.declared[var].contains(value)
            } else {
                value == 0
            }
        });

        domains_hold
            && self.constraints.iter().all(|constraint| {
                !constraint
                    .enforcement
                    .iter()
                    .all(|&lit| literal_holds(lit, solution))
                    || constraint.kind.is_satisfied(solution)
            })
    }

    fn objective_inner(&self, solution: &[i64]) -> i128 {
        self.objective
            .as_ref()
            .map_or(0, |objective| {
                // Only a foreign snapshot can overflow here; saturate then.
                objective.terms.iter().fold(0i128, |sum, term| {
                    sum.saturating_add(term.coeff * solution[term.var] as i128)
                })
            })
    }

    fn objective_lower_bound(&self, domains: &[Domain]) -> Option<i128> {
        let objective = self.objective.as_ref()?;
        linear_bounds(domains, &objective.terms).map(|(lo, _)| lo)
    }

    fn response(
        &self,
        outcome: Outcome,
        root_bound: Option<i128>,
        start: Instant,
    ) -> CpSolverResponse {
        let status = match (&outcome.best, outcome.limit_reached) {
            (Some(_), true) => CpSolverStatus::Feasible,
            (Some(_), false) if self.objective.is_some() && outcome.stopped_early => {
                CpSolverStatus::Feasible
            }
            (Some(_), false) => CpSolverStatus::Optimal,
            (None, true) => CpSolverStatus::Unknown,
            (None, false) => CpSolverStatus::Infeasible,
        };

        let scaled = |inner: i128| {
            self.objective
                .as_ref()
                .map_or(0.0, |objective| objective.scaled(inner))
        };

        let (solution, objective_value) = match outcome.best {
            Some(incumbent) => (incumbent.solution, scaled(incumbent.objective)),
            None => (Vec::new(), 0.0),
        };
        let best_objective_bound = if status == CpSolverStatus::Optimal {
            objective_value
        } else {
            root_bound.map_or(0.0, scaled)
        };

        CpSolverResponse {
            status,
            solution,
            objective_value,
            best_objective_bound,
            num_branches: outcome.num_branches,
            num_conflicts: outcome.num_conflicts,
            wall_time: start.elapsed().as_secs_f64(),
        }
    }
}

impl Kind {
    fn propagate(&self, domains: &mut [Domain]) -> Propagation {
        match self {
            Kind::Linear { terms, domain } => {
                let (lo, hi) = domain.bounds().ok_or(Conflict)?;
                let changed = propagate_linear(domains, terms, lo as i128, hi as i128)?;
                // Holes in a multi-interval domain are only checked once fixed.
                if let Some(sum) = fixed_linear_value(domains, terms) {
                    if !linear_domain_contains(domain, sum) {
                        return Err(Conflict);
                    }
                }
                Ok(changed)
            }
            Kind::AllDifferent(refs) => {
                let mut changed = false;
                for (i, &reference) in refs.iter().enumerate() {
                    let Some(value) = domains[variable_of(reference) as usize].fixed_value() else {
                        continue;
                    };
                    let taken = reference_value(reference, value);
                    for (j, &other) in refs.iter().enumerate() {
                        if i == j {
                            continue;
                        }
                        let var = variable_of(other) as usize;
                        // x with reference_value(other, x) == taken
                        let preimage = if is_positive(other) { taken } else { -taken };
                        let Ok(excluded) = i64::try_from(preimage) else {
                            continue;
                        };
                        let domain = domains[var].remove(excluded);
                        changed |= restrict(domains, var, domain)?;
                    }
                }
                Ok(changed)
            }
            Kind::BoolOr(literals) => {
                let mut unknown = Vec::new();
                for &lit in literals {
                    match literal_state(domains, lit) {
                        Some(true) => return Ok(false),
                        Some(false) => {}
                        None => unknown.push(lit),
                    }
                }
                match unknown.as_slice() {
                    [] => Err(Conflict),
                    [lit] => set_literal(domains, *lit, true),
                    _ => Ok(false),
                }
            }
            Kind::BoolAnd(literals) => {
                let mut changed = false;
                for &lit in literals {
                    changed |= set_literal(domains, lit, true)?;
                }
                Ok(changed)
            }
            Kind::BoolXor(literals) => {
                let mut num_true = 0usize;
                let mut unknown = Vec::new();
                for &lit in literals {
                    match literal_state(domains, lit) {
                        Some(true) => num_true += 1,
                        Some(false) => {}
                        None => unknown.push(lit),
                    }
                }
                match unknown.as_slice() {
                    [] if num_true % 2 == 1 => Ok(false),
                    [] => Err(Conflict),
                    [lit] => set_literal(domains, *lit, num_true % 2 == 0),
                    _ => Ok(false),
                }
            }
        }
    }

    /// Whether the constraint cannot hold under the current domains.
    fn is_violated(&self, domains: &[Domain]) -> bool {
        match self {
            Kind::Linear { terms, domain } => {
                let Some((lo, hi)) = domain.bounds() else {
                    return true;
                };
                // Overflowing bounds prove nothing.
                if let Some((sum_min, sum_max)) = linear_bounds(domains, terms) {
                    if sum_min > hi as i128 || sum_max < lo as i128 {
                        return true;
                    }
                }
                fixed_linear_value(domains, terms)
                    .is_some_and(|sum| !linear_domain_contains(domain, sum))
            }
            Kind::AllDifferent(refs) => {
                let mut seen = HashSet::new();
                refs.iter().any(|&reference| {
                    domains[variable_of(reference) as usize]
                        .fixed_value()
                        .is_some_and(|value| !seen.insert(reference_value(reference, value)))
                })
            }
            Kind::BoolOr(literals) => literals
                .iter()
                .all(|&lit| literal_state(domains, lit) == Some(false)),
            Kind::BoolAnd(literals) => literals
                .iter()
                .any(|&lit| literal_state(domains, lit) == Some(false)),
            Kind::BoolXor(literals) => {
                let states: Option<Vec<bool>> = literals
                    .iter()
                    .map(|&lit| literal_state(domains, lit))
                    .collect();
                states.is_some_and(|states| states.iter().filter(|&&state| state).count() % 2 == 0)
            }
        }
    }

    fn is_satisfied(&self, solution: &[i64]) -> bool {
        match self {
            Kind::Linear { terms, domain } => {
                linear_value(terms, solution).is_some_and(|sum| linear_domain_contains(domain, sum))
            }
            Kind::AllDifferent(refs) => {
                let mut seen = HashSet::new();
                refs.iter().all(|&reference| {
                    seen.insert(reference_value(
                        reference,
                        solution[variable_of(reference) as usize],
                    ))
                })
            }
            Kind::BoolOr(literals) => literals.iter().any(|&lit| literal_holds(lit, solution)),
            Kind::BoolAnd(literals) => literals.iter().all(|&lit| literal_holds(lit, solution)),
            Kind::BoolXor(literals) => {
                literals
                    .iter()
                    .filter(|&&lit| literal_holds(lit, solution))
                    .count()
                    % 2
                    == 1
            }
        }
    }
}

enum Enforcement {
    Active,
    Inactive,
    Undecided { unknown: usize, last: i32 },
}

fn enforcement(domains: &[Domain], literals: &[i32]) -> Enforcement {
    let mut unknown = 0;
    let mut last = 0;
    for &lit in literals {
        match literal_state(domains, lit) {
            Some(true) => {}
            Some(false) => return Enforcement::Inactive,
            None => {
                unknown += 1;
                last = lit;
            }
        }
    }
    if unknown == 0 {
        Enforcement::Active
    } else {
        Enforcement::Undecided { unknown, last }
    }
}

/// Truth value of a literal if the domain of its variable decides it.
fn literal_state(domains: &[Domain], lit: i32) -> Option<bool> {
    let domain = &domains[variable_of(lit) as usize];
    if let Some(value) = domain.fixed_value() {
        Some(literal_is_true(lit, value))
    } else if !domain.contains(0) {
        Some(is_positive(lit))
    } else {
        None
    }
}

fn set_literal(domains: &mut [Domain], lit: i32, value: bool) -> Propagation {
    let var = variable_of(lit) as usize;
    let domain = if is_positive(lit) == value {
        domains[var].remove(0)
    } else {
        domains[var].intersect(0, 0)
    };
    restrict(domains, var, domain)
}

fn literal_holds(lit: i32, solution: &[i64]) -> bool {
    literal_is_true(lit, solution[variable_of(lit) as usize])
}

fn restrict(domains: &mut [Domain], var: usize, domain: Domain) -> Propagation {
    if domain.is_empty() {
        return Err(Conflict);
    }
    if domain == domains[var] {
        return Ok(false);
    }
    domains[var] = domain;
    Ok(true)
}

/// Exact value of a linear sum, `None` when it leaves the `i128` range.
///
/// Each product fits in `i128` since both factors fit in 64 bits.
fn linear_value(terms: &[Term], solution: &[i64]) -> Option<i128> {
    terms.iter().try_fold(0i128, |sum, term| {
        sum.checked_add(term.coeff * solution[term.var] as i128)
    })
}

fn linear_domain_contains(domain: &Domain, sum: i128) -> bool {
    i64::try_from(sum).is_ok_and(|sum| domain.contains(sum))
}

fn fixed_linear_value(domains: &[Domain], terms: &[Term]) -> Option<i128> {
    terms.iter().try_fold(0i128, |sum, term| {
        let value = domains[term.var].fixed_value()?;
        sum.checked_add(term.coeff * value as i128)
    })
}

fn term_bounds(term: &Term, domain: &Domain) -> Option<(i128, i128)> {
    let (lo, hi) = domain.bounds()?;
    let (a, b) = (term.coeff * lo as i128, term.coeff * hi as i128);
    Some((a.min(b), a.max(b)))
}

/// Bounds of a linear sum, `None` on an empty domain or when a partial sum
/// leaves the `i128` range.
fn linear_bounds(domains: &[Domain], terms: &[Term]) -> Option<(i128, i128)> {
    terms.iter().try_fold((0i128, 0i128), |(lo, hi), term| {
        let (t_lo, t_hi) = term_bounds(term, &domains[term.var])?;
        Some((lo.checked_add(t_lo)?, hi.checked_add(t_hi)?))
    })
}

fn sum_bounds(bounds: &[(i128, i128)]) -> Option<(i128, i128)> {
    bounds.iter().try_fold((0i128, 0i128), |(lo, hi), &(t_lo, t_hi)| {
        Some((lo.checked_add(t_lo)?, hi.checked_add(t_hi)?))
    })
}

/// Bounds propagation of `lo <= sum(terms) <= hi`.
fn propagate_linear(domains: &mut [Domain], terms: &[Term], lo: i128, hi: i128) -> Propagation {
    let bounds: Vec<(i128, i128)> = terms
        .iter()
        .map(|term| term_bounds(term, &domains[term.var]))
        .collect::<Option<_>>()
        .ok_or(Conflict)?;
    // An overflowing sum gives no sound residual bounds.
    let Some((sum_min, sum_max)) = sum_bounds(&bounds) else {
        return Ok(false);
    };

    if sum_min > hi || sum_max < lo {
        return Err(Conflict);
    }

    let mut changed = false;
    for (term, &(t_min, t_max)) in terms.iter().zip(&bounds) {
        if term.coeff == 0 {
            continue;
        }
        let (Some(rest_max), Some(rest_min)) =
            (sum_max.checked_sub(t_max), sum_min.checked_sub(t_min))
        else {
            continue;
        };
        // Saturation only loosens these bounds.
        let term_lo = lo.saturating_sub(rest_max);
        let term_hi = hi.saturating_sub(rest_min);
        let (x_lo, x_hi) = if term.coeff > 0 {
            (div_ceil(term_lo, term.coeff), div_floor(term_hi, term.coeff))
        } else {
            (div_ceil(term_hi, term.coeff), div_floor(term_lo, term.coeff))
        };
        if x_lo > i64::MAX as i128 || x_hi < i64::MIN as i128 {
            return Err(Conflict);
        }
        let domain = domains[term.var].intersect(clamp_i64(x_lo), clamp_i64(x_hi));
        changed |= restrict(domains, term.var, domain)?;
    }
    Ok(changed)
}

fn div_floor(a: i128, b: i128) -> i128 {
    match (a.checked_div(b), a.checked_rem(b)) {
        (Some(q), Some(r)) if r != 0 && ((r < 0) != (b < 0)) => q - 1,
        (Some(q), _) => q,
        (None, _) => i128::MAX,
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    match (a.checked_div(b), a.checked_rem(b)) {
        (Some(q), Some(r)) if r != 0 && ((r < 0) == (b < 0)) => q + 1,
        (Some(q), _) => q,
        (None, _) => i128::MAX,
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[derive(Debug, Clone)]
struct Incumbent {
    objective: i128,
    solution: Vec<i64>,
}

#[derive(Debug, Default)]
struct Outcome {
    best: Option<Incumbent>,
    num_branches: u64,
    num_conflicts: u64,
    limit_reached: bool,
    stopped_early: bool,
}

struct Search<'a> {
    problem: &'a Problem,
    config: &'a SearchConfig,
    start: Instant,
    outcome: Outcome,
}

impl<'a> Search<'a> {
    fn new(problem: &'a Problem, config: &'a SearchConfig, start: Instant) -> Self {
        Self {
            problem,
            config,
            start,
            outcome: Outcome::default(),
        }
    }

    fn should_stop(&mut self) -> bool {
        if self.outcome.stopped_early || self.outcome.limit_reached {
            return true;
        }
        if let Some(max_nodes) = self.config.max_number_of_nodes {
            if self.outcome.num_branches >= max_nodes {
                self.outcome.limit_reached = true;
            }
        }
        if let Some(max_time) = self.config.max_time_in_seconds {
            if self.start.elapsed().as_secs_f64() >= max_time {
                self.outcome.limit_reached = true;
            }
        }
        self.outcome.limit_reached
    }

    fn cut(&self) -> Option<i128> {
        self.problem.objective.as_ref()?;
        self.outcome
            .best
            .as_ref()
            .map(|incumbent| incumbent.objective.saturating_sub(1))
    }

    /// Depth-first search from `root` over an explicit stack of pending
    /// nodes. The preferred half of a split is pushed last so it is popped
    /// first.
    fn explore(&mut self, root: Vec<Domain>) {
        let mut pending = vec![root];
        let mut at_root = true;

        while let Some(mut domains) = pending.pop() {
            if self.should_stop() {
                return;
            }
            if !at_root {
                self.outcome.num_branches += 1;
            }
            at_root = false;

            if self.problem.propagate(&mut domains, self.cut()).is_err() {
                self.outcome.num_conflicts += 1;
                continue;
            }

            let Some(var) = self.problem.select_variable(&domains) else {
                self.record(&domains);
                continue;
            };
            let Some((low, high)) = domains[var].split() else {
                continue;
            };
            let (first, second) = if self.problem.prefer_high[var] {
                (high, low)
            } else {
                (low, high)
            };

            let mut later = domains.clone();
            later[var] = second;
            domains[var] = first;
            pending.push(later);
            pending.push(domains);
        }
    }

    fn record(&mut self, domains: &[Domain]) {
        let Some(solution) = domains
            .iter()
            .map(Domain::fixed_value)
            .collect::<Option<Vec<i64>>>()
        else {
            return;
        };
        if !self.problem.is_solution(&solution) {
            self.outcome.num_conflicts += 1;
            return;
        }

        let objective = self.problem.objective_inner(&solution);
        if self.problem.objective.is_some()
            && self
                .outcome
                .best
                .as_ref()
                .is_some_and(|incumbent| objective >= incumbent.objective)
        {
            return;
        }
        debug!(
            "solution found after {} branches, inner objective {objective}",
            self.outcome.num_branches
        );
        self.outcome.best = Some(Incumbent {
            objective,
            solution,
        });
        if self.problem.objective.is_none() || self.config.stop_after_first_solution {
            self.outcome.stopped_early = true;
        }
    }
}

fn explore(problem: &Problem, config: &SearchConfig, start: Instant, root: Vec<Domain>) -> Outcome {
    if config.num_search_workers > 1 {
        #[cfg(feature = "parallel")]
        return explore_parallel(problem, config, start, root);
        #[cfg(not(feature = "parallel"))]
        debug!("num_search_workers ignored without the parallel feature");
    }

    let mut search = Search::new(problem, config, start);
    search.explore(root);
    search.outcome
}

/// Splits the root branching variable into one slice per worker and
/// searches the slices independently.
#[cfg(feature = "parallel")]
fn explore_parallel(
    problem: &Problem,
    config: &SearchConfig,
    start: Instant,
    root: Vec<Domain>,
) -> Outcome {
    let Some(var) = problem.select_variable(&root) else {
        let mut search = Search::new(problem, config, start);
        search.explore(root);
        return search.outcome;
    };

    let mut slices = vec![root[var].clone()];
    while slices.len() < config.num_search_workers {
        let Some((largest, _)) = slices
            .iter()
            .enumerate()
            .filter(|(_, slice)| slice.fixed_value().is_none())
            .max_by_key(|(_, slice)| slice.size())
        else {
            break;
        };
        let slice = slices.swap_remove(largest);
        if let Some((low, high)) = slice.split() {
            slices.push(low);
            slices.push(high);
        }
    }
    slices.sort_by_key(Domain::min);
    if problem.prefer_high[var] {
        slices.reverse();
    }
    debug!("searching {} root slices in parallel", slices.len());

    let outcomes: Vec<Outcome> = slices
        .into_par_iter()
        .map(|slice| {
            let mut domains = root.clone();
            domains[var] = slice;
            let mut search = Search::new(problem, config, start);
            search.outcome.num_branches += 1;
            search.explore(domains);
            search.outcome
        })
        .collect();

    let has_objective = problem.objective.is_some();
    outcomes
        .into_iter()
        .fold(Outcome::default(), |mut merged, outcome| {
            merged.num_branches += outcome.num_branches;
            merged.num_conflicts += outcome.num_conflicts;
            merged.limit_reached |= outcome.limit_reached;
            merged.stopped_early |= outcome.stopped_early;
            merged.best = match (merged.best.take(), outcome.best) {
                (Some(a), Some(b)) if has_objective && b.objective < a.objective => Some(b),
                (Some(a), _) => Some(a),
                (None, b) => b,
            };
            merged
        })
}
