use crate::model::CpModelProto;

use super::types::CpSolverResponse;

/// A solving engine consuming model snapshots.
///
/// Implementors provide the actual search. This can wrap an external
/// solver process or library, or the bundled
/// [`DepthFirstEngine`](super::DepthFirstEngine).
///
/// Both entry points are synchronous: they return once the engine is done.
/// A snapshot the engine cannot accept is answered with
/// [`CpSolverStatus::ModelInvalid`](super::CpSolverStatus::ModelInvalid),
/// not with an error.
pub trait SolvingEngine {
    /// Solves with the engine's default parameters.
    fn solve(&self, model: &CpModelProto) -> CpSolverResponse;

    /// Solves with a free-form parameter string interpreted by the engine.
    fn solve_with_parameters(&self, model: &CpModelProto, parameters: &str) -> CpSolverResponse;
}

impl<E: SolvingEngine + ?Sized> SolvingEngine for Box<E> {
    fn solve(&self, model: &CpModelProto) -> CpSolverResponse {
        (**self).solve(model)
    }

    fn solve_with_parameters(&self, model: &CpModelProto, parameters: &str) -> CpSolverResponse {
        (**self).solve_with_parameters(model, parameters)
    }
}
