//! Solve results.

use std::fmt;

use crate::model::{literal_is_true, variable_of, IntVar};

/// Status reported by a solving engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CpSolverStatus {
    /// No solution found and nothing proven, e.g. a limit was hit first.
    #[default]
    Unknown,
    /// The snapshot or the parameters were rejected.
    ModelInvalid,
    /// A solution was found but not proven optimal.
    Feasible,
    /// No solution exists.
    Infeasible,
    /// A solution was found and the search is complete.
    Optimal,
}

impl CpSolverStatus {
    /// Whether the response carries an assignment.
    pub fn has_solution(self) -> bool {
        matches!(self, CpSolverStatus::Optimal | CpSolverStatus::Feasible)
    }
}

impl fmt::Display for CpSolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CpSolverStatus::Unknown => "UNKNOWN",
            CpSolverStatus::ModelInvalid => "MODEL_INVALID",
            CpSolverStatus::Feasible => "FEASIBLE",
            CpSolverStatus::Infeasible => "INFEASIBLE",
            CpSolverStatus::Optimal => "OPTIMAL",
        };
        f.write_str(name)
    }
}

/// Full answer of a solving engine.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpSolverResponse {
    /// Outcome of the solve.
    pub status: CpSolverStatus,
    /// Value of every variable, indexed like the snapshot. Empty unless
    /// `status.has_solution()`.
    pub solution: Vec<i64>,
    /// Scaled objective value of the solution (0 without objective).
    pub objective_value: f64,
    /// Scaled bound on the objective proven by the search.
    pub best_objective_bound: f64,
    /// Search nodes created by branching.
    pub num_branches: u64,
    /// Nodes closed by a propagation failure or a rejected assignment.
    pub num_conflicts: u64,
    /// Wall time in seconds.
    pub wall_time: f64,
}

impl CpSolverResponse {
    /// Creates an empty response with the given status.
    pub fn empty(status: CpSolverStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Value of a variable in the solution.
    pub fn value(&self, var: IntVar) -> Option<i64> {
        usize::try_from(var.index())
            .ok()
            .and_then(|index| self.solution.get(index).copied())
    }

    /// Truth value of a literal in the solution.
    pub fn boolean_value(&self, literal: i32) -> Option<bool> {
        let value = self.solution.get(variable_of(literal) as usize)?;
        Some(literal_is_true(literal, *value))
    }
}
