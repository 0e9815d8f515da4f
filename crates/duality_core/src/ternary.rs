//! The three-valued result every semantic relation in the kernel returns.

use std::fmt;

/// Result of a semantic relation: proven, refuted, or undecided pending
/// further information (constraint resolution, reduction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ternary {
    Yes,
    No,
    Maybe,
}

impl Ternary {
    /// Short-circuiting conjunction: `Yes ∧ x = x`, `No ∧ _ = No`,
    /// `Maybe ∧ Yes = Maybe`, `Maybe ∧ Maybe = Maybe`.
    pub fn and(self, other: Ternary) -> Ternary {
        match (self, other) {
            (Ternary::No, _) | (_, Ternary::No) => Ternary::No,
            (Ternary::Yes, x) | (x, Ternary::Yes) => x,
            (Ternary::Maybe, Ternary::Maybe) => Ternary::Maybe,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Ternary::Yes)
    }

    pub fn is_no(self) -> bool {
        matches!(self, Ternary::No)
    }

    /// Fold a sequence of ternaries with `and`, short-circuiting on the
    /// first `No`. Every multi-part conjunction in the kernel goes through
    /// this helper rather than being hand-inlined.
    pub fn combine<I: IntoIterator<Item = Ternary>>(results: I) -> Ternary {
        let mut acc = Ternary::Yes;
        for r in results {
            acc = acc.and(r);
            if acc.is_no() {
                return Ternary::No;
            }
        }
        acc
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ternary::Yes => write!(f, "Yes"),
            Ternary::No => write!(f, "No"),
            Ternary::Maybe => write!(f, "Maybe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_is_identity() {
        assert_eq!(Ternary::Yes.and(Ternary::Maybe), Ternary::Maybe);
        assert_eq!(Ternary::Maybe.and(Ternary::Yes), Ternary::Maybe);
        assert_eq!(Ternary::Yes.and(Ternary::Yes), Ternary::Yes);
    }

    #[test]
    fn no_dominates() {
        assert_eq!(Ternary::No.and(Ternary::Yes), Ternary::No);
        assert_eq!(Ternary::Maybe.and(Ternary::No), Ternary::No);
        assert_eq!(Ternary::No.and(Ternary::No), Ternary::No);
    }

    #[test]
    fn maybe_absorbs() {
        assert_eq!(Ternary::Maybe.and(Ternary::Maybe), Ternary::Maybe);
    }

    #[test]
    fn combine_short_circuits() {
        let results = vec![Ternary::Yes, Ternary::Maybe, Ternary::No, Ternary::Yes];
        assert_eq!(Ternary::combine(results), Ternary::No);
    }

    #[test]
    fn combine_empty_is_yes() {
        assert_eq!(Ternary::combine(std::iter::empty()), Ternary::Yes);
    }
}
