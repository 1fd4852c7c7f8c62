//! Constraint model builder with a pluggable solving engine.
//!
//! - **Model**: [`model::CpModel`] incrementally builds integer variables,
//!   linear, all-different and boolean constraints with optional
//!   enforcement literals, and a single-variable objective. The result is a
//!   self-contained [`model::CpModelProto`] snapshot.
//! - **Solver**: [`solver::CpSolver`] hands the snapshot to a
//!   [`solver::SolvingEngine`] and keeps the response. The bundled
//!   [`solver::DepthFirstEngine`] is a small complete search for testing and
//!   modest models.
//!
//! # Literals
//!
//! Boolean literals share the index space of variables: `i >= 0` is
//! variable `i`, and `negated(i) = -i - 1` is its negation.
//!
//! ```
//! use u_cpmodel::model::{negated, CpModel};
//! use u_cpmodel::solver::{CpSolver, CpSolverStatus};
//!
//! let mut model = CpModel::new();
//! let a = model.new_bool_var("a");
//! let b = model.new_bool_var("b");
//! model.add_bool_or([a.not(), b.not()]).unwrap();
//! model.maximize(a).unwrap();
//! assert_eq!(model.objective().unwrap().vars, vec![negated(a.index())]);
//!
//! let mut solver = CpSolver::new();
//! assert_eq!(solver.solve(&model), CpSolverStatus::Optimal);
//! assert_eq!(solver.boolean_value(b).unwrap(), Some(false));
//! ```
//!
//! # Features
//!
//! - `serde`: serialization of snapshots and responses
//! - `parallel`: root splitting across rayon workers in the bundled engine

pub mod model;
pub mod solver;
