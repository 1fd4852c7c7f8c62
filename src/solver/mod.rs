//! Solving engines and the solver facade.
//!
//! # Key Components
//!
//! - **Engine seam**: [`SolvingEngine`]: the coarse-grained entry point a
//!   snapshot is handed to, with and without a parameter string
//! - **Facade**: [`CpSolver`]: dispatches a [`CpModel`](crate::model::CpModel)
//!   and keeps the last [`CpSolverResponse`]
//! - **Reference engine**: [`DepthFirstEngine`]: a complete branch and bound
//!   search configured through [`SearchConfig`]
//!
//! # Design
//!
//! Engines never fail with an error. A snapshot or a parameter string they
//! cannot accept is answered with [`CpSolverStatus::ModelInvalid`].

mod config;
mod cp_solver;
mod domain;
mod engine;
mod search;
mod types;

pub use config::{ParameterError, SearchConfig};
pub use cp_solver::CpSolver;
pub use domain::Domain;
pub use engine::SolvingEngine;
pub use search::DepthFirstEngine;
pub use types::{CpSolverResponse, CpSolverStatus};
