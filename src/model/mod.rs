//! Constraint model construction.
//!
//! Builds the in-memory description of a discrete optimization problem:
//! integer variables, constraints, and an optional objective.
//!
//! # Key Components
//!
//! - **Literals**: [`negated`], [`variable_of`], [`is_negated`]: the signed
//!   encoding of a boolean variable and its negation
//! - **Expressions**: [`IntVar`], [`IntegerExpression`]: handles and
//!   expression trees resolving to a literal index
//! - **Builder**: [`CpModel`]: typed constructors appending to the model
//! - **Snapshot**: [`CpModelProto`]: what a solving engine receives
//!
//! # Design
//!
//! The model is append-only. Indices are dense and assigned in creation
//! order, and references are stored as plain integers, so a snapshot is a
//! self-contained value with no handles inside it.

mod builder;
mod error;
mod expression;
mod literal;
mod proto;

pub use builder::{Constraint, CpModel};
pub use error::ModelError;
pub use expression::{IntVar, IntegerExpression};
pub use literal::{
    is_negated, is_positive, literal_is_true, negated, reference_value, variable_of,
};
pub use proto::{
    AllDifferentConstraintProto, BoolArgumentProto, ConstraintKind, ConstraintProto,
    CpModelProto, CpObjectiveProto, IntegerVariableProto, LinearConstraintProto,
};
