use thiserror::Error;

/// Errors raised while building a [`CpModel`](super::CpModel).
///
/// All of them are precondition checks performed before the model is
/// mutated, so a failed call leaves the model exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A domain is empty, has an odd number of endpoints, or contains a
    /// decreasing `(lo, hi)` pair.
    #[error("invalid domain {domain:?} for '{name}': {reason}")]
    InvalidDomain {
        name: String,
        domain: Vec<i64>,
        reason: &'static str,
    },
    /// An expression without a single literal index was used where one is
    /// required.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    /// A reference points at a variable that does not exist in the model.
    #[error("reference {reference} points to variable {index}, but the model has {num_variables} variables")]
    DanglingIndexReference {
        reference: i32,
        index: i32,
        num_variables: usize,
    },
    /// A constraint handle does not belong to this model.
    #[error("constraint {index} does not exist in a model with {num_constraints} constraints")]
    UnknownConstraint { index: usize, num_constraints: usize },
    /// Parallel sequences in a snapshot have different lengths.
    #[error("constraint {constraint}: {vars} variables but {coeffs} coefficients")]
    LengthMismatch {
        constraint: usize,
        vars: usize,
        coeffs: usize,
    },
}

/// Checks the flat interval-endpoint encoding of a domain.
pub(crate) fn check_domain(name: &str, domain: &[i64]) -> Result<(), ModelError> {
    let reason = if domain.is_empty() {
        Some("domain is empty")
    } else if domain.len() % 2 != 0 {
        Some("odd number of interval endpoints")
    } else if domain.chunks_exact(2).any(|pair| pair[0] > pair[1]) {
        Some("interval lower bound exceeds upper bound")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ModelError::InvalidDomain {
            name: name.to_owned(),
            domain: domain.to_vec(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(check_domain("x", &[0, 10]).is_ok());
        assert!(check_domain("x", &[5, 5]).is_ok());
        // Unsorted and overlapping intervals are kept verbatim.
        assert!(check_domain("x", &[8, 9, 0, 3, 2, 4]).is_ok());
    }

    #[test]
    fn test_invalid_domains() {
        assert!(matches!(
            check_domain("x", &[]),
            Err(ModelError::InvalidDomain { reason: "domain is empty", .. })
        ));
        assert!(matches!(
            check_domain("x", &[0, 1, 2]),
            Err(ModelError::InvalidDomain { .. })
        ));
        assert!(matches!(
            check_domain("x", &[0, 1, 5, 4]),
            Err(ModelError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ModelError::DanglingIndexReference {
            reference: -4,
            index: 3,
            num_variables: 2,
        };
        assert_eq!(
            err.to_string(),
            "reference -4 points to variable 3, but the model has 2 variables"
        );
    }
}
