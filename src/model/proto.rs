//! Snapshot types handed to a solving engine.
//!
//! Every reference stored here is an `i32` literal/variable index, never a
//! handle. Domains are flat sequences of closed interval endpoints kept in
//! insertion order; engines normalize them.

use super::error::{check_domain, ModelError};
use super::literal::variable_of;

/// A variable of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntegerVariableProto {
    /// Display name; not required to be unique and may be empty.
    pub name: String,
    /// Flat `[lo0, hi0, lo1, hi1, ...]` interval endpoints.
    pub domain: Vec<i64>,
    /// When present and false, the variable is absent.
    pub enforcement_literal: Option<i32>,
}

/// `sum(coeffs[i] * vars[i]) ∈ domain`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearConstraintProto {
    /// Variable references; a negative reference stands for `-var`.
    pub vars: Vec<i32>,
    /// Coefficients, parallel to `vars`.
    pub coeffs: Vec<i64>,
    /// Allowed values of the sum as flat interval endpoints.
    pub domain: Vec<i64>,
}

/// All listed variables take pairwise distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllDifferentConstraintProto {
    /// Variable references that must differ pairwise.
    pub vars: Vec<i32>,
}

/// A list of literals, interpreted by the enclosing [`ConstraintKind`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoolArgumentProto {
    /// Literals; a negative literal is the negation of its variable.
    pub literals: Vec<i32>,
}

/// Structural payload of a constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// A linear sum restricted to a domain.
    Linear(LinearConstraintProto),
    /// Pairwise distinct values.
    AllDifferent(AllDifferentConstraintProto),
    /// At least one literal is true.
    BoolOr(BoolArgumentProto),
    /// Every literal is true.
    BoolAnd(BoolArgumentProto),
    /// An odd number of literals is true.
    BoolXor(BoolArgumentProto),
}

impl ConstraintKind {
    /// Short tag naming the constraint kind.
    pub fn name(&self) -> &'static str {
        match self {
            ConstraintKind::Linear(_) => "linear",
            ConstraintKind::AllDifferent(_) => "all_different",
            ConstraintKind::BoolOr(_) => "bool_or",
            ConstraintKind::BoolAnd(_) => "bool_and",
            ConstraintKind::BoolXor(_) => "bool_xor",
        }
    }

    /// Variable or literal references used by the payload, in order.
    pub fn references(&self) -> &[i32] {
        match self {
            ConstraintKind::Linear(linear) => &linear.vars,
            ConstraintKind::AllDifferent(all_diff) => &all_diff.vars,
            ConstraintKind::BoolOr(arg) | ConstraintKind::BoolAnd(arg) | ConstraintKind::BoolXor(arg) => {
                &arg.literals
            }
        }
    }
}

/// A constraint together with the literals gating it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintProto {
    /// Conjunction of literals that must hold for the constraint to apply.
    pub enforcement_literal: Vec<i32>,
    /// What the constraint requires once enforced.
    pub kind: ConstraintKind,
}

impl ConstraintProto {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            enforcement_literal: Vec::new(),
            kind,
        }
    }
}

/// Canonical minimization objective.
///
/// The engine minimizes `sum(coeffs[i] * vars[i]) + offset`; the reported
/// objective value is that quantity multiplied by `scaling_factor`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpObjectiveProto {
    /// Variable references; a negative reference stands for `-var`.
    pub vars: Vec<i32>,
    /// Coefficients, parallel to `vars`.
    pub coeffs: Vec<i64>,
    /// Constant added to the sum before scaling.
    pub offset: f64,
    /// Multiplier of the reported value; `-1` for maximization, `0` reads
    /// as `1`.
    pub scaling_factor: f64,
}

/// The complete problem description for one solve.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CpModelProto {
    /// Variables, indexed by creation order.
    pub variables: Vec<IntegerVariableProto>,
    /// Constraints, indexed by creation order.
    pub constraints: Vec<ConstraintProto>,
    /// Objective to minimize; `None` for a pure satisfaction problem.
    pub objective: Option<CpObjectiveProto>,
}

impl CpModelProto {
    /// Checks that a reference points at an existing variable.
    pub fn check_reference(&self, reference: i32) -> Result<(), ModelError> {
        let index = variable_of(reference);
        if (index as usize) < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::DanglingIndexReference {
                reference,
                index,
                num_variables: self.variables.len(),
            })
        }
    }

    /// Re-checks every structural invariant of the snapshot.
    ///
    /// Snapshots produced by [`CpModel`](super::CpModel) always pass; this
    /// exists for engines receiving snapshots from elsewhere.
    pub fn validate(&self) -> Result<(), ModelError> {
        for variable in &self.variables {
            check_domain(&variable.name, &variable.domain)?;
            if let Some(lit) = variable.enforcement_literal {
                self.check_reference(lit)?;
            }
        }

        for (c, constraint) in self.constraints.iter().enumerate() {
            for &lit in &constraint.enforcement_literal {
                self.check_reference(lit)?;
            }
            for &reference in constraint.kind.references() {
                self.check_reference(reference)?;
            }
            if let ConstraintKind::Linear(linear) = &constraint.kind {
                if linear.vars.len() != linear.coeffs.len() {
                    return Err(ModelError::LengthMismatch {
                        constraint: c,
                        vars: linear.vars.len(),
                        coeffs: linear.coeffs.len(),
                    });
                }
                check_domain(&format!("constraint {c}"), &linear.domain)?;
            }
        }

        if let Some(objective) = &self.objective {
            if objective.vars.len() != objective.coeffs.len() {
                return Err(ModelError::LengthMismatch {
                    constraint: self.constraints.len(),
                    vars: objective.vars.len(),
                    coeffs: objective.coeffs.len(),
                });
            }
            for &reference in &objective.vars {
                self.check_reference(reference)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(domain: Vec<i64>) -> IntegerVariableProto {
        IntegerVariableProto {
            name: "v".into(),
            domain,
            enforcement_literal: None,
        }
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        assert!(CpModelProto::default().validate().is_ok());
    }

    #[test]
    fn test_dangling_constraint_reference() {
        let proto = CpModelProto {
            variables: vec![variable(vec![0, 1])],
            constraints: vec![ConstraintProto::new(ConstraintKind::AllDifferent(
                AllDifferentConstraintProto { vars: vec![0, 1] },
            ))],
            objective: None,
        };

        assert_eq!(
            proto.validate(),
            Err(ModelError::DanglingIndexReference {
                reference: 1,
                index: 1,
                num_variables: 1
            })
        );
    }

    #[test]
    fn test_dangling_negated_enforcement() {
        let mut constraint = ConstraintProto::new(ConstraintKind::BoolOr(BoolArgumentProto {
            literals: vec![0],
        }));
        constraint.enforcement_literal.push(-3);
        let proto = CpModelProto {
            variables: vec![variable(vec![0, 1])],
            constraints: vec![constraint],
            objective: None,
        };

        assert!(matches!(
            proto.validate(),
            Err(ModelError::DanglingIndexReference { index: 2, .. })
        ));
    }

    #[test]
    fn test_linear_length_mismatch() {
        let proto = CpModelProto {
            variables: vec![variable(vec![0, 10])],
            constraints: vec![ConstraintProto::new(ConstraintKind::Linear(
                LinearConstraintProto {
                    vars: vec![0],
                    coeffs: vec![1, 2],
                    domain: vec![0, 5],
                },
            ))],
            objective: None,
        };

        assert!(matches!(
            proto.validate(),
            Err(ModelError::LengthMismatch { constraint: 0, .. })
        ));
    }

    #[test]
    fn test_bad_variable_domain() {
        let proto = CpModelProto {
            variables: vec![variable(vec![3, 1])],
            ..Default::default()
        };
        assert!(matches!(
            proto.validate(),
            Err(ModelError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn test_dangling_objective() {
        let proto = CpModelProto {
            variables: vec![variable(vec![0, 10])],
            constraints: Vec::new(),
            objective: Some(CpObjectiveProto {
                vars: vec![-2],
                coeffs: vec![1],
                offset: 0.0,
                scaling_factor: -1.0,
            }),
        };
        assert!(proto.validate().is_err());
    }
}
