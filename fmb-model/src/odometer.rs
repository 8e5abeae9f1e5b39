//! Deterministic odometer-order enumeration of groundings
//! (`spec.md` §4.4.3, §5 "Ordering").
//!
//! Each position counts fastest on the right, like the digits of a mixed-
//! radix number: the last position advances every step, carrying into
//! earlier positions only once it wraps. This fixed order is part of the
//! contract (`spec.md` §5: "regression tests depend on it").

/// Enumerates every tuple in `[1..=bounds[0]] x ... x [1..=bounds[n-1]]` in
/// odometer order. Yields exactly one empty tuple when `bounds` is empty.
pub struct Odometer {
    bounds: Vec<usize>,
    current: Vec<usize>,
    done: bool,
}

impl Odometer {
    pub fn new(bounds: Vec<usize>) -> Odometer {
        let done = bounds.iter().any(|&b| b == 0);
        let current = vec![1; bounds.len()];
        Odometer {
            bounds,
            current,
            done,
        }
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let result = self.current.clone();

        if self.bounds.is_empty() {
            self.done = true;
            return Some(result);
        }

        let mut i = self.current.len();
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.current[i] < self.bounds[i] {
                self.current[i] += 1;
                for slot in &mut self.current[i + 1..] {
                    *slot = 1;
                }
                break;
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bounds_yields_one_empty_grounding() {
        let all: Vec<_> = Odometer::new(vec![]).collect();
        assert_eq!(all, vec![vec![]]);
    }

    #[test]
    fn last_position_advances_fastest() {
        let all: Vec<_> = Odometer::new(vec![2, 2]).collect();
        assert_eq!(all, vec![vec![1, 1], vec![1, 2], vec![2, 1], vec![2, 2]]);
    }

    #[test]
    fn zero_bound_yields_nothing() {
        let all: Vec<_> = Odometer::new(vec![2, 0]).collect();
        assert!(all.is_empty());
    }

    #[test]
    fn count_matches_product_of_bounds() {
        let bounds = vec![3, 2, 4];
        let count = Odometer::new(bounds.clone()).count();
        assert_eq!(count, bounds.iter().product());
    }
}
