//! The model builder.

use std::collections::HashMap;

use log::{debug, trace};

use super::error::{check_domain, ModelError};
use super::expression::{IntVar, IntegerExpression};
use super::literal::negated;
use super::proto::{
    AllDifferentConstraintProto, BoolArgumentProto, ConstraintKind, ConstraintProto,
    CpModelProto, CpObjectiveProto, IntegerVariableProto, LinearConstraintProto,
};

/// Handle to a constraint of a [`CpModel`].
///
/// The handle is an index into the model's constraint list, so mutating
/// through [`CpModel::only_enforce_if`] changes the stored record itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    index: usize,
}

impl Constraint {
    /// Index of the constraint (0-based, creation order among constraints).
    pub fn index(self) -> usize {
        self.index
    }
}

/// Append-only builder for a constraint model.
///
/// Variables and constraints get dense, 0-based indices in creation order
/// and are never removed or reindexed, so every handle stays valid for the
/// lifetime of the model.
///
/// A model must have a single writer while it is being built; indices are
/// assigned from the current length without synchronization.
///
/// # Examples
///
/// ```
/// use u_cpmodel::model::CpModel;
///
/// let mut model = CpModel::new();
/// let x = model.new_int_var([0, 10], "x").unwrap();
/// let b = model.new_bool_var("b");
///
/// let ct = model.add_linear_constraint([(x, 1)], 0, 5).unwrap();
/// model.only_enforce_if(ct, b).unwrap();
/// model.maximize(x).unwrap();
///
/// assert_eq!(x.index(), 0);
/// assert_eq!(b.index(), 1);
/// assert_eq!(model.constraint(ct).unwrap().enforcement_literal, vec![1]);
/// assert!(model.has_objective());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    proto: CpModelProto,
    constant_map: HashMap<i64, IntVar>,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot built so far.
    pub fn model(&self) -> &CpModelProto {
        &self.proto
    }

    /// Consumes the builder and returns its snapshot.
    pub fn into_proto(self) -> CpModelProto {
        self.proto
    }

    pub fn num_variables(&self) -> usize {
        self.proto.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.proto.constraints.len()
    }

    /// The stored record of a variable.
    pub fn variable(&self, var: IntVar) -> Option<&IntegerVariableProto> {
        usize::try_from(var.index())
            .ok()
            .and_then(|index| self.proto.variables.get(index))
    }

    /// The stored record of a constraint.
    pub fn constraint(&self, ct: Constraint) -> Option<&ConstraintProto> {
        self.proto.constraints.get(ct.index)
    }

    // Variables.

    /// Creates an integer variable whose domain is a union of closed
    /// intervals given as flat `[lo0, hi0, lo1, hi1, ...]` endpoints.
    ///
    /// The endpoints are stored verbatim; intervals may be unsorted or
    /// overlapping.
    pub fn new_int_var<I>(&mut self, domain: I, name: impl Into<String>) -> Result<IntVar, ModelError>
    where
        I: IntoIterator<Item = i64>,
    {
        let name = name.into();
        let domain: Vec<i64> = domain.into_iter().collect();
        check_domain(&name, &domain)?;
        Ok(self.push_variable(name, domain, None))
    }

    /// Creates an integer variable with domain `[lb, ub]`.
    pub fn new_int_var_from_bounds(
        &mut self,
        lb: i64,
        ub: i64,
        name: impl Into<String>,
    ) -> Result<IntVar, ModelError> {
        self.new_int_var([lb, ub], name)
    }

    /// Creates an integer variable that only exists when `is_present` holds.
    pub fn new_optional_int_var<I>(
        &mut self,
        domain: I,
        name: impl Into<String>,
        is_present: impl Into<IntegerExpression>,
    ) -> Result<IntVar, ModelError>
    where
        I: IntoIterator<Item = i64>,
    {
        let name = name.into();
        let domain: Vec<i64> = domain.into_iter().collect();
        check_domain(&name, &domain)?;
        let presence = self.literal(is_present)?;
        Ok(self.push_variable(name, domain, Some(presence)))
    }

    /// Creates a boolean variable, i.e. an integer variable over `[0, 1]`.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> IntVar {
        self.push_variable(name.into(), vec![0, 1], None)
    }

    /// Returns a variable fixed to `value`. Constants are cached, so asking
    /// twice for the same value yields the same variable.
    pub fn new_constant(&mut self, value: i64) -> IntVar {
        if let Some(&var) = self.constant_map.get(&value) {
            return var;
        }
        let var = self.push_variable(String::new(), vec![value, value], None);
        let _ = self.constant_map.insert(value, var);
        var
    }

    fn push_variable(
        &mut self,
        name: String,
        domain: Vec<i64>,
        enforcement_literal: Option<i32>,
    ) -> IntVar {
        let var = IntVar::new(self.proto.variables.len() as i32);
        trace!("new variable {var} '{name}' domain {domain:?}");
        self.proto.variables.push(IntegerVariableProto {
            name,
            domain,
            enforcement_literal,
        });
        var
    }

    // Constraints.

    /// Adds `lb <= sum(coeff * var) <= ub`.
    pub fn add_linear_constraint<I>(&mut self, terms: I, lb: i64, ub: i64) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = (IntVar, i64)>,
    {
        self.add_linear_constraint_with_domain(terms, [lb, ub])
    }

    /// Adds `sum(coeff * var) ∈ domain`, with the domain given as flat
    /// interval endpoints.
    pub fn add_linear_constraint_with_domain<I, D>(
        &mut self,
        terms: I,
        domain: D,
    ) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = (IntVar, i64)>,
        D: IntoIterator<Item = i64>,
    {
        let domain: Vec<i64> = domain.into_iter().collect();
        check_domain("linear constraint", &domain)?;

        let mut linear = LinearConstraintProto {
            domain,
            ..Default::default()
        };
        for (var, coeff) in terms {
            self.proto.check_reference(var.index())?;
            linear.vars.push(var.index());
            linear.coeffs.push(coeff);
        }
        Ok(self.push_constraint(ConstraintKind::Linear(linear)))
    }

    /// Adds `lb <= sum(vars) <= ub`.
    pub fn add_sum_constraint<I>(&mut self, vars: I, lb: i64, ub: i64) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = IntVar>,
    {
        self.add_linear_constraint(vars.into_iter().map(|var| (var, 1)), lb, ub)
    }

    /// Forces all variables to take pairwise distinct values.
    pub fn add_all_different<I>(&mut self, vars: I) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = IntVar>,
    {
        let vars = vars
            .into_iter()
            .map(|var| {
                self.proto.check_reference(var.index())?;
                Ok(var.index())
            })
            .collect::<Result<Vec<_>, ModelError>>()?;
        Ok(self.push_constraint(ConstraintKind::AllDifferent(
            AllDifferentConstraintProto { vars },
        )))
    }

    /// At least one of the literals is true.
    pub fn add_bool_or<I, L>(&mut self, literals: I) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = L>,
        L: Into<IntegerExpression>,
    {
        let literals = self.literals(literals)?;
        Ok(self.push_constraint(ConstraintKind::BoolOr(BoolArgumentProto { literals })))
    }

    /// Every literal is true.
    pub fn add_bool_and<I, L>(&mut self, literals: I) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = L>,
        L: Into<IntegerExpression>,
    {
        let literals = self.literals(literals)?;
        Ok(self.push_constraint(ConstraintKind::BoolAnd(BoolArgumentProto { literals })))
    }

    /// An odd number of the literals is true.
    pub fn add_bool_xor<I, L>(&mut self, literals: I) -> Result<Constraint, ModelError>
    where
        I: IntoIterator<Item = L>,
        L: Into<IntegerExpression>,
    {
        let literals = self.literals(literals)?;
        Ok(self.push_constraint(ConstraintKind::BoolXor(BoolArgumentProto { literals })))
    }

    /// `a => b`, stored as `bool_or(not(a), b)`.
    pub fn add_implication(
        &mut self,
        a: impl Into<IntegerExpression>,
        b: impl Into<IntegerExpression>,
    ) -> Result<Constraint, ModelError> {
        let a = self.literal(a)?;
        let b = self.literal(b)?;
        Ok(self.push_constraint(ConstraintKind::BoolOr(BoolArgumentProto {
            literals: vec![negated(a), b],
        })))
    }

    /// Adds one more enforcement literal to an existing constraint. Calls
    /// accumulate: the constraint applies only if all of them hold.
    pub fn only_enforce_if(
        &mut self,
        ct: Constraint,
        literal: impl Into<IntegerExpression>,
    ) -> Result<(), ModelError> {
        let lit = self.literal(literal)?;
        let num_constraints = self.proto.constraints.len();
        let record = self
            .proto
            .constraints
            .get_mut(ct.index)
            .ok_or(ModelError::UnknownConstraint {
                index: ct.index,
                num_constraints,
            })?;
        record.enforcement_literal.push(lit);
        trace!("constraint {} enforced by {lit}", ct.index);
        Ok(())
    }

    fn push_constraint(&mut self, kind: ConstraintKind) -> Constraint {
        let ct = Constraint {
            index: self.proto.constraints.len(),
        };
        trace!("new constraint {} ({})", ct.index, kind.name());
        self.proto.constraints.push(ConstraintProto::new(kind));
        ct
    }

    fn literal(&self, expr: impl Into<IntegerExpression>) -> Result<i32, ModelError> {
        let lit = expr.into().index()?;
        self.proto.check_reference(lit)?;
        Ok(lit)
    }

    fn literals<I, L>(&self, literals: I) -> Result<Vec<i32>, ModelError>
    where
        I: IntoIterator<Item = L>,
        L: Into<IntegerExpression>,
    {
        literals.into_iter().map(|lit| self.literal(lit)).collect()
    }

    // Objective.

    /// Minimizes `expr`, replacing any previous objective.
    ///
    /// The objective is an integer context: a negated literal `not(b)` reads
    /// as `-b`, not as the Boolean `1 - b`. Minimizing `b.not()` therefore
    /// drives `b` up and reports `-b`.
    pub fn minimize(&mut self, expr: impl Into<IntegerExpression>) -> Result<(), ModelError> {
        self.set_objective(expr.into(), true)
    }

    /// Maximizes `expr`, replacing any previous objective.
    ///
    /// Stored as the minimization of the negated reference with a scaling
    /// factor of `-1`, so engines only ever see minimization problems.
    ///
    /// As with [`minimize`](Self::minimize), a negated literal reads as
    /// `-b`: maximizing `b.not()` drives `b` to its minimum and reports
    /// `-b` (`-0.0` when `b = 0`), not the truth value of `not(b)`.
    pub fn maximize(&mut self, expr: impl Into<IntegerExpression>) -> Result<(), ModelError> {
        self.set_objective(expr.into(), false)
    }

    /// Whether an objective has been set.
    pub fn has_objective(&self) -> bool {
        self.proto.objective.is_some()
    }

    pub fn objective(&self) -> Option<&CpObjectiveProto> {
        self.proto.objective.as_ref()
    }

    /// Turns the model back into a pure satisfaction problem.
    pub fn clear_objective(&mut self) {
        self.proto.objective = None;
    }

    fn set_objective(&mut self, expr: IntegerExpression, minimize: bool) -> Result<(), ModelError> {
        // TODO: general linear objectives once Sum/ScaledVariable resolve to
        // coefficient lists.
        let index = match expr.index() {
            Ok(index) => index,
            Err(_) => {
                return Err(ModelError::UnsupportedExpression(format!(
                    "objective {expr} is not a single variable or literal"
                )))
            }
        };
        self.proto.check_reference(index)?;

        let objective = if minimize {
            CpObjectiveProto {
                vars: vec![index],
                coeffs: vec![1],
                offset: 0.0,
                scaling_factor: 1.0,
            }
        } else {
            CpObjectiveProto {
                vars: vec![negated(index)],
                coeffs: vec![1],
                offset: 0.0,
                scaling_factor: -1.0,
            }
        };
        debug!(
            "objective set to {} {expr}",
            if minimize { "minimize" } else { "maximize" }
        );
        self.proto.objective = Some(objective);
        Ok(())
    }
}
