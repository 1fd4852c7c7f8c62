//! Integer expressions and variable handles.

use std::fmt;
use std::ops::{Add, Mul, Neg};

use super::error::ModelError;
use super::literal::negated;

/// Handle to a variable of a [`CpModel`](super::CpModel).
///
/// The handle holds only the variable index; name and domain live in the
/// model. A boolean variable is an `IntVar` with domain `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntVar {
    index: i32,
}

impl IntVar {
    pub(crate) fn new(index: i32) -> Self {
        Self { index }
    }

    /// Index of the variable in the model (0-based, creation order).
    pub fn index(self) -> i32 {
        self.index
    }

    /// The negated literal `¬self`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> IntegerExpression {
        IntegerExpression::Negation(self)
    }
}

impl fmt::Display for IntVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.index)
    }
}

/// An integer expression over model variables.
///
/// Only [`Variable`](Self::Variable) and [`Negation`](Self::Negation) denote
/// a single literal. The compound variants can be built but asking them for
/// an index fails with [`ModelError::UnsupportedExpression`].
///
/// ```
/// use u_cpmodel::model::{CpModel, IntegerExpression};
///
/// let mut model = CpModel::new();
/// let x = model.new_bool_var("x");
/// let y = model.new_bool_var("y");
///
/// assert_eq!(IntegerExpression::from(x).index(), Ok(0));
/// assert_eq!(y.not().index(), Ok(-2));
/// assert!((x + y).index().is_err());
/// assert!((3 * x).index().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerExpression {
    /// A variable, or a boolean variable used as a positive literal.
    Variable(IntVar),
    /// The negation of a boolean variable.
    Negation(IntVar),
    /// `coefficient * var`.
    ScaledVariable { coefficient: i64, var: IntVar },
    /// Sum of sub-expressions.
    Sum(Vec<IntegerExpression>),
}

impl IntegerExpression {
    /// Resolves the expression to a literal index.
    pub fn index(&self) -> Result<i32, ModelError> {
        match self {
            IntegerExpression::Variable(var) => Ok(var.index()),
            IntegerExpression::Negation(var) => Ok(negated(var.index())),
            IntegerExpression::ScaledVariable { .. } | IntegerExpression::Sum(_) => Err(
                ModelError::UnsupportedExpression(format!("{self} has no single literal index")),
            ),
        }
    }

    /// Negates a literal expression. Negating a negation gives back the
    /// original variable.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Result<IntegerExpression, ModelError> {
        match self {
            IntegerExpression::Variable(var) => Ok(IntegerExpression::Negation(var)),
            IntegerExpression::Negation(var) => Ok(IntegerExpression::Variable(var)),
            other => Err(ModelError::UnsupportedExpression(format!(
                "cannot negate {other}"
            ))),
        }
    }

    /// Whether the expression denotes a single literal.
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            IntegerExpression::Variable(_) | IntegerExpression::Negation(_)
        )
    }

    fn into_terms(self) -> Vec<IntegerExpression> {
        match self {
            IntegerExpression::Sum(terms) => terms,
            other => vec![other],
        }
    }
}

impl fmt::Display for IntegerExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerExpression::Variable(var) => write!(f, "{var}"),
            IntegerExpression::Negation(var) => write!(f, "not({var})"),
            IntegerExpression::ScaledVariable { coefficient, var } => {
                write!(f, "{coefficient} * {var}")
            }
            IntegerExpression::Sum(terms) => {
                write!(f, "(")?;
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{term}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<IntVar> for IntegerExpression {
    fn from(var: IntVar) -> Self {
        IntegerExpression::Variable(var)
    }
}

impl From<&IntVar> for IntegerExpression {
    fn from(var: &IntVar) -> Self {
        IntegerExpression::Variable(*var)
    }
}

impl Mul<IntVar> for i64 {
    type Output = IntegerExpression;

    fn mul(self, var: IntVar) -> IntegerExpression {
        IntegerExpression::ScaledVariable {
            coefficient: self,
            var,
        }
    }
}

impl Mul<i64> for IntVar {
    type Output = IntegerExpression;

    fn mul(self, coefficient: i64) -> IntegerExpression {
        coefficient * self
    }
}

impl Neg for IntVar {
    type Output = IntegerExpression;

    fn neg(self) -> IntegerExpression {
        -1 * self
    }
}

impl<T: Into<IntegerExpression>> Add<T> for IntegerExpression {
    type Output = IntegerExpression;

    fn add(self, rhs: T) -> IntegerExpression {
        let mut terms = self.into_terms();
        terms.extend(rhs.into().into_terms());
        IntegerExpression::Sum(terms)
    }
}

impl<T: Into<IntegerExpression>> Add<T> for IntVar {
    type Output = IntegerExpression;

    fn add(self, rhs: T) -> IntegerExpression {
        IntegerExpression::from(self) + rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_index() {
        let x = IntVar::new(4);
        assert_eq!(IntegerExpression::from(x).index(), Ok(4));
        assert_eq!(x.not().index(), Ok(-5));
    }

    #[test]
    fn test_double_negation() {
        let x = IntVar::new(2);
        let back = x.not().not().unwrap();
        assert_eq!(back, IntegerExpression::Variable(x));
        assert_eq!(back.index(), Ok(2));
    }

    #[test]
    fn test_compound_fails_fast() {
        let x = IntVar::new(0);
        let y = IntVar::new(1);

        let scaled = 3 * x;
        assert!(matches!(
            scaled.index(),
            Err(ModelError::UnsupportedExpression(_))
        ));

        let sum = x + y;
        assert!(matches!(sum.index(), Err(ModelError::UnsupportedExpression(_))));
        assert!(sum.not().is_err());
    }

    #[test]
    fn test_sum_flattening() {
        let x = IntVar::new(0);
        let y = IntVar::new(1);
        let z = IntVar::new(2);

        let sum = x + y + 2 * z;
        match sum {
            IntegerExpression::Sum(ref terms) => assert_eq!(terms.len(), 3),
            ref other => panic!("expected a sum, got {other}"),
        }
        assert_eq!(sum.to_string(), "(x0 + x1 + 2 * x2)");
    }

    #[test]
    fn test_neg_is_scaled() {
        let x = IntVar::new(7);
        assert_eq!(
            -x,
            IntegerExpression::ScaledVariable {
                coefficient: -1,
                var: x
            }
        );
        assert!(!(-x).is_atomic());
    }
}
