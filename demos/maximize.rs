//! Builds a small model, solves it with the bundled engine and prints the
//! result.
//!
//! Run with `RUST_LOG=debug cargo run --example maximize` to see the search
//! log.

use u_cpmodel::model::{CpModel, ModelError};
use u_cpmodel::solver::CpSolver;

fn main() -> Result<(), ModelError> {
    env_logger::init();

    let mut model = CpModel::new();
    let x = model.new_int_var([0, 10], "x")?;
    let y = model.new_int_var([0, 4, 8, 12], "y")?;
    let use_cap = model.new_bool_var("use_cap");

    // x + y <= 14, and x <= 5 whenever use_cap holds.
    model.add_linear_constraint([(x, 1), (y, 1)], i64::MIN, 14)?;
    let cap = model.add_linear_constraint([(x, 1)], 0, 5)?;
    model.only_enforce_if(cap, use_cap)?;
    // y = 0 forces the cap.
    model.add_implication(y.not(), use_cap)?;
    model.maximize(x)?;

    let mut solver = CpSolver::new();
    solver.set_string_parameters("max_time_in_seconds:10");
    let status = solver.solve(&model);

    println!("status: {status}");
    if status.has_solution() {
        println!("x = {:?}", solver.value(x));
        println!("y = {:?}", solver.value(y));
        println!("use_cap = {:?}", solver.boolean_value(use_cap)?);
        println!("objective = {:?}", solver.objective_value());
    }
    Ok(())
}
