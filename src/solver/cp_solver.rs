//! Solver facade over a [`SolvingEngine`].

use log::info;

use crate::model::{CpModel, CpModelProto, IntVar, IntegerExpression, ModelError};

use super::engine::SolvingEngine;
use super::search::DepthFirstEngine;
use super::types::{CpSolverResponse, CpSolverStatus};

/// Hands a model snapshot to an engine and keeps the last response.
///
/// Each call to [`solve`](CpSolver::solve) replaces the stored response.
///
/// # Examples
///
/// ```
/// use u_cpmodel::model::CpModel;
/// use u_cpmodel::solver::{CpSolver, CpSolverStatus};
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var([0, 10], "x").unwrap();
/// model.add_linear_constraint([(x, 1)], 0, 5).unwrap();
/// model.maximize(x).unwrap();
///
/// let mut solver = CpSolver::new();
/// assert_eq!(solver.solve(&model), CpSolverStatus::Optimal);
/// assert_eq!(solver.value(x), Some(5));
/// assert_eq!(solver.objective_value(), Some(5.0));
/// ```
#[derive(Debug, Default)]
pub struct CpSolver<E = DepthFirstEngine> {
    engine: E,
    string_parameters: Option<String>,
    response: Option<CpSolverResponse>,
}

impl CpSolver {
    /// Creates a solver backed by the bundled [`DepthFirstEngine`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: SolvingEngine> CpSolver<E> {
    pub fn with_engine(engine: E) -> Self {
        Self {
            engine,
            string_parameters: None,
            response: None,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Sets the parameter string forwarded to the engine on every solve.
    pub fn set_string_parameters(&mut self, parameters: impl Into<String>) {
        self.string_parameters = Some(parameters.into());
    }

    pub fn clear_string_parameters(&mut self) {
        self.string_parameters = None;
    }

    pub fn string_parameters(&self) -> Option<&str> {
        self.string_parameters.as_deref()
    }

    /// Solves the current state of `model`.
    pub fn solve(&mut self, model: &CpModel) -> CpSolverStatus {
        self.solve_proto(model.model())
    }

    /// Solves a raw snapshot.
    pub fn solve_proto(&mut self, proto: &CpModelProto) -> CpSolverStatus {
        info!(
            "dispatching model ({} variables, {} constraints, parameters: {})",
            proto.variables.len(),
            proto.constraints.len(),
            self.string_parameters.as_deref().unwrap_or("<default>")
        );

        let response = match &self.string_parameters {
            Some(parameters) => self.engine.solve_with_parameters(proto, parameters),
            None => self.engine.solve(proto),
        };
        let status = response.status;
        self.response = Some(response);
        status
    }

    /// The response of the last solve, if any.
    pub fn response(&self) -> Option<&CpSolverResponse> {
        self.response.as_ref()
    }

    /// Value of `var` in the last solution.
    pub fn value(&self, var: IntVar) -> Option<i64> {
        self.response.as_ref()?.value(var)
    }

    /// Truth value of a literal in the last solution.
    pub fn boolean_value(&self, literal: impl Into<IntegerExpression>) -> Result<Option<bool>, ModelError> {
        let lit = literal.into().index()?;
        Ok(self
            .response
            .as_ref()
            .and_then(|response| response.boolean_value(lit)))
    }

    /// Scaled objective value of the last solution.
    pub fn objective_value(&self) -> Option<f64> {
        self.response
            .as_ref()
            .filter(|response| response.status.has_solution())
            .map(|response| response.objective_value)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records how it was called and answers with a canned response.
    #[derive(Default)]
    struct MockEngine {
        calls: RefCell<Vec<Option<String>>>,
        status: Option<CpSolverStatus>,
    }

    impl SolvingEngine for MockEngine {
        fn solve(&self, model: &CpModelProto) -> CpSolverResponse {
            self.calls.borrow_mut().push(None);
            self.answer(model)
        }

        fn solve_with_parameters(&self, model: &CpModelProto, parameters: &str) -> CpSolverResponse {
            self.calls.borrow_mut().push(Some(parameters.to_owned()));
            self.answer(model)
        }
    }

    impl MockEngine {
        fn answer(&self, model: &CpModelProto) -> CpSolverResponse {
            CpSolverResponse {
                status: self.status.unwrap_or(CpSolverStatus::Feasible),
                solution: (0..model.variables.len() as i64).collect(),
                objective_value: 3.0,
                ..Default::default()
            }
        }
    }

    #[test]
    fn test_dispatch_without_parameters() {
        let mut model = CpModel::new();
        let _ = model.new_bool_var("a");

        let mut solver = CpSolver::with_engine(MockEngine::default());
        assert_eq!(solver.solve(&model), CpSolverStatus::Feasible);
        assert_eq!(*solver.engine().calls.borrow(), vec![None]);
    }

    #[test]
    fn test_dispatch_with_parameters() {
        let model = CpModel::new();
        let mut solver = CpSolver::with_engine(MockEngine::default());
        solver.set_string_parameters("max_time_in_seconds:10");
        assert_eq!(solver.string_parameters(), Some("max_time_in_seconds:10"));

        let _ = solver.solve(&model);
        solver.clear_string_parameters();
        let _ = solver.solve(&model);

        assert_eq!(
            *solver.engine().calls.borrow(),
            vec![Some("max_time_in_seconds:10".to_owned()), None]
        );
    }

    #[test]
    fn test_response_is_replaced() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");

        let mut solver = CpSolver::with_engine(MockEngine::default());
        assert!(solver.response().is_none());
        assert_eq!(solver.value(a), None);

        let _ = solver.solve(&model);
        assert_eq!(solver.value(b), Some(1));
        assert_eq!(solver.boolean_value(a).unwrap(), Some(false));
        assert_eq!(solver.boolean_value(b.not()).unwrap(), Some(false));
        assert_eq!(solver.objective_value(), Some(3.0));

        let c = model.new_int_var([0, 5], "c").unwrap();
        let _ = solver.solve(&model);
        assert_eq!(solver.response().map(|r| r.solution.len()), Some(3));
        assert_eq!(solver.value(c), Some(2));
    }

    #[test]
    fn test_no_objective_value_without_solution() {
        let model = CpModel::new();
        let mut solver = CpSolver::with_engine(MockEngine {
            status: Some(CpSolverStatus::Infeasible),
            ..Default::default()
        });
        assert_eq!(solver.solve(&model), CpSolverStatus::Infeasible);
        assert_eq!(solver.objective_value(), None);
    }

    #[test]
    fn test_compound_boolean_value_rejected() {
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let solver = CpSolver::new();
        assert!(matches!(
            solver.boolean_value(a + a),
            Err(ModelError::UnsupportedExpression(_))
        ));
    }

    #[test]
    fn test_default_engine_end_to_end() {
        let mut model = CpModel::new();
        let x = model.new_int_var([0, 10], "x").unwrap();
        let b = model.new_bool_var("b");
        let ct = model.add_linear_constraint([(x, 1)], 0, 5).unwrap();
        model.only_enforce_if(ct, b).unwrap();
        model.add_bool_or([b]).unwrap();
        model.maximize(x).unwrap();

        let mut solver = CpSolver::new();
        solver.set_string_parameters("max_time_in_seconds:30");
        assert_eq!(solver.solve(&model), CpSolverStatus::Optimal);
        assert_eq!(solver.value(x), Some(5));
        assert_eq!(solver.boolean_value(b).unwrap(), Some(true));
        assert_eq!(solver.objective_value(), Some(5.0));

        solver.set_string_parameters("no_such_option:1");
        assert_eq!(solver.solve(&model), CpSolverStatus::ModelInvalid);
        assert_eq!(solver.value(x), None);
    }
}
