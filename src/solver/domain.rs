//! Normalized integer domains.

/// A finite set of integers stored as sorted, disjoint, non-adjacent closed
/// intervals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Domain {
    intervals: Vec<(i64, i64)>,
}

impl Domain {
    /// Normalizes flat `[lo0, hi0, lo1, hi1, ...]` endpoints. Decreasing
    /// pairs and a trailing odd endpoint are ignored.
    pub fn from_flat(flat: &[i64]) -> Self {
        let mut intervals: Vec<(i64, i64)> = flat
            .chunks_exact(2)
            .filter(|pair| pair[0] <= pair[1])
            .map(|pair| (pair[0], pair[1]))
            .collect();
        intervals.sort_unstable();

        let mut merged: Vec<(i64, i64)> = Vec::with_capacity(intervals.len());
        for (lo, hi) in intervals {
            match merged.last_mut() {
                Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
                _ => merged.push((lo, hi)),
            }
        }
        Self { intervals: merged }
    }

    pub fn singleton(value: i64) -> Self {
        Self {
            intervals: vec![(value, value)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn intervals(&self) -> &[(i64, i64)] {
        &self.intervals
    }

    pub fn min(&self) -> Option<i64> {
        self.intervals.first().map(|&(lo, _)| lo)
    }

    pub fn max(&self) -> Option<i64> {
        self.intervals.last().map(|&(_, hi)| hi)
    }

    pub fn bounds(&self) -> Option<(i64, i64)> {
        Some((self.min()?, self.max()?))
    }

    /// The single value of a fixed domain.
    pub fn fixed_value(&self) -> Option<i64> {
        match self.intervals.as_slice() {
            [(lo, hi)] if lo == hi => Some(*lo),
            _ => None,
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.intervals
            .binary_search_by(|&(lo, hi)| {
                if hi < value {
                    std::cmp::Ordering::Less
                } else if lo > value {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Number of values, saturating at `u128::MAX`.
    pub fn size(&self) -> u128 {
        self.intervals
            .iter()
            .map(|&(lo, hi)| (hi as i128 - lo as i128) as u128 + 1)
            .fold(0u128, u128::saturating_add)
    }

    /// Values of the domain within `[lo, hi]`.
    pub fn intersect(&self, lo: i64, hi: i64) -> Domain {
        let intervals = self
            .intervals
            .iter()
            .filter_map(|&(a, b)| {
                let (a, b) = (a.max(lo), b.min(hi));
                (a <= b).then_some((a, b))
            })
            .collect();
        Domain { intervals }
    }

    /// Values present in both domains.
    pub fn intersection(&self, other: &Domain) -> Domain {
        let mut intervals = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.intervals.len() && j < other.intervals.len() {
            let (a_lo, a_hi) = self.intervals[i];
            let (b_lo, b_hi) = other.intervals[j];
            let (lo, hi) = (a_lo.max(b_lo), a_hi.min(b_hi));
            if lo <= hi {
                intervals.push((lo, hi));
            }
            if a_hi < b_hi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Domain { intervals }
    }

    /// The domain without `value`.
    pub fn remove(&self, value: i64) -> Domain {
        if !self.contains(value) {
            return self.clone();
        }
        let mut intervals = Vec::with_capacity(self.intervals.len() + 1);
        for &(lo, hi) in &self.intervals {
            if value < lo || value > hi {
                intervals.push((lo, hi));
                continue;
            }
            if lo < value {
                intervals.push((lo, value - 1));
            }
            if value < hi {
                intervals.push((value + 1, hi));
            }
        }
        Domain { intervals }
    }

    /// The domain with `value` added.
    pub fn with_value(&self, value: i64) -> Domain {
        let mut flat: Vec<i64> = self
            .intervals
            .iter()
            .flat_map(|&(lo, hi)| [lo, hi])
            .collect();
        flat.extend([value, value]);
        Domain::from_flat(&flat)
    }

    /// Splits a domain with at least two values into a lower and an upper
    /// part, both non-empty.
    pub fn split(&self) -> Option<(Domain, Domain)> {
        let (lo, hi) = self.bounds()?;
        if lo == hi {
            return None;
        }
        let mid = (lo as i128 + (hi as i128 - lo as i128) / 2) as i64;
        Some((self.intersect(lo, mid), self.intersect(mid + 1, hi)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let domain = Domain::from_flat(&[8, 9, 0, 3, 2, 5, 7, 7]);
        assert_eq!(domain.intervals(), &[(0, 5), (7, 9)]);
        assert_eq!(domain.size(), 9);
        assert_eq!(domain.bounds(), Some((0, 9)));
    }

    #[test]
    fn test_contains() {
        let domain = Domain::from_flat(&[0, 2, 10, 12]);
        assert!(domain.contains(0));
        assert!(domain.contains(11));
        assert!(!domain.contains(5));
        assert!(!domain.contains(13));
    }

    #[test]
    fn test_fixed() {
        assert_eq!(Domain::singleton(4).fixed_value(), Some(4));
        assert_eq!(Domain::from_flat(&[0, 1]).fixed_value(), None);
        assert_eq!(Domain::from_flat(&[3, 3, 5, 5]).fixed_value(), None);
    }

    #[test]
    fn test_intersect_and_remove() {
        let domain = Domain::from_flat(&[0, 10]);
        assert_eq!(domain.intersect(3, 20).intervals(), &[(3, 10)]);
        assert!(domain.intersect(11, 20).is_empty());
        assert_eq!(domain.remove(5).intervals(), &[(0, 4), (6, 10)]);
        assert_eq!(domain.remove(0).intervals(), &[(1, 10)]);
        assert_eq!(domain.remove(42), domain);
        assert!(Domain::singleton(1).remove(1).is_empty());
    }

    #[test]
    fn test_intersection() {
        let a = Domain::from_flat(&[0, 5, 10, 20]);
        let b = Domain::from_flat(&[3, 12, 18, 30]);
        assert_eq!(a.intersection(&b).intervals(), &[(3, 5), (10, 12), (18, 20)]);
        assert!(a.intersection(&Domain::from_flat(&[6, 9])).is_empty());
    }

    #[test]
    fn test_with_value() {
        let domain = Domain::from_flat(&[5, 9]);
        assert_eq!(domain.with_value(0).intervals(), &[(0, 0), (5, 9)]);
        assert_eq!(domain.with_value(4).intervals(), &[(4, 9)]);
    }

    #[test]
    fn test_split() {
        let (low, high) = Domain::from_flat(&[0, 9]).split().unwrap();
        assert_eq!(low.intervals(), &[(0, 4)]);
        assert_eq!(high.intervals(), &[(5, 9)]);

        let (low, high) = Domain::from_flat(&[i64::MIN, i64::MAX]).split().unwrap();
        assert!(!low.is_empty() && !high.is_empty());

        assert!(Domain::singleton(3).split().is_none());
    }

    #[test]
    fn test_full_range_size() {
        let domain = Domain::from_flat(&[i64::MIN, i64::MAX]);
        assert_eq!(domain.size(), 1u128 << 64);
    }
}
