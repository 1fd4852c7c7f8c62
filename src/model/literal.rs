//! Signed literal encoding.
//!
//! A boolean variable with index `i` is referenced by the literal `i`; its
//! negation is referenced by `-i - 1`. Negation is therefore a pure integer
//! transform and never needs to look anything up in the model.
//!
//! ```
//! use u_cpmodel::model::{is_negated, negated, variable_of};
//!
//! let lit = negated(3);
//! assert_eq!(lit, -4);
//! assert!(is_negated(lit));
//! assert_eq!(variable_of(lit), 3);
//! assert_eq!(negated(lit), 3);
//! ```

/// Returns the negation of a literal: `-lit - 1`.
///
/// In two's complement this is the bitwise complement, so it is an
/// involution over the whole `i32` range.
#[inline]
pub fn negated(lit: i32) -> i32 {
    !lit
}

/// Index of the variable a literal refers to.
#[inline]
pub fn variable_of(lit: i32) -> i32 {
    if lit >= 0 {
        lit
    } else {
        negated(lit)
    }
}

/// Whether the literal refers to the negation of its variable.
#[inline]
pub fn is_negated(lit: i32) -> bool {
    lit < 0
}

/// Whether the literal refers to its variable directly.
#[inline]
pub fn is_positive(lit: i32) -> bool {
    lit >= 0
}

/// Evaluates a literal in a Boolean context, given the value of its variable.
///
/// A positive literal is true iff the variable is non-zero; a negated one is
/// true iff the variable is zero.
#[inline]
pub fn literal_is_true(lit: i32, value: i64) -> bool {
    if is_positive(lit) {
        value != 0
    } else {
        value == 0
    }
}

/// Evaluates a reference in an integer context: a negated reference stands
/// for `-var`. Widened so that negating `i64::MIN` cannot overflow.
#[inline]
pub fn reference_value(reference: i32, value: i64) -> i128 {
    if is_positive(reference) {
        value as i128
    } else {
        -(value as i128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_negation_involutive(index in 0i32..i32::MAX) {
            prop_assert_eq!(negated(negated(index)), index);
        }

        #[test]
        fn prop_negation_is_negative(index in 0i32..i32::MAX) {
            prop_assert!(negated(index) < 0);
            prop_assert!(is_negated(negated(index)));
        }

        #[test]
        fn prop_variable_extraction(index in 0i32..i32::MAX) {
            prop_assert_eq!(variable_of(index), index);
            prop_assert_eq!(variable_of(negated(index)), index);
        }

        #[test]
        fn prop_no_fixed_point(lit in any::<i32>()) {
            prop_assert_ne!(negated(lit), lit);
        }
    }

    #[test]
    fn test_negated_examples() {
        assert_eq!(negated(0), -1);
        assert_eq!(negated(5), -6);
        assert_eq!(negated(-1), 0);
    }

    #[test]
    fn test_boolean_context() {
        assert!(literal_is_true(2, 1));
        assert!(!literal_is_true(2, 0));
        assert!(literal_is_true(negated(2), 0));
        assert!(!literal_is_true(negated(2), 1));
    }

    #[test]
    fn test_integer_context() {
        assert_eq!(reference_value(4, 7), 7);
        assert_eq!(reference_value(negated(4), 7), -7);
        assert_eq!(
            reference_value(negated(0), i64::MIN),
            -(i64::MIN as i128)
        );
    }
}
