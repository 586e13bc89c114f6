//! # Pricing rules
//!
//! Strategies for choosing the entering variable of a primal iteration and the leaving row of a
//! dual iteration. The driver computes the candidates; a rule only chooses among them.
use crate::data::number_types::traits::Field;

/// A nonbasic variable whose movement improves the objective.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate<F> {
    /// Index of the variable.
    pub variable: usize,
    /// Its reduced cost.
    pub reduced_cost: F,
    /// Direction in which it would move, `1` to increase and `-1` to decrease.
    pub direction: F,
}

/// Chooses one half of each pivot.
///
/// In a primal iteration the rule picks the entering variable among the improving candidates and
/// a primal ratio test finds the leaving row. In a dual iteration it is the other way around: the
/// rule picks a row whose basic variable violates a bound, that variable leaves, and a dual ratio
/// test over the pivot row finds the entering variable.
///
/// A rule may keep state between calls, for example reference weights, and is therefore borrowed
/// mutably.
pub trait PricingRule<F> {
    /// Create a new instance.
    fn new() -> Self where Self: Sized;

    /// Column selection rule for the primal Simplex method.
    ///
    /// # Arguments
    ///
    /// * `candidates`: Improving nonbasic variables, in increasing order of variable index.
    ///
    /// # Return value
    ///
    /// Index into `candidates`, `None` if it is empty.
    fn select_entering(&mut self, candidates: &[Candidate<F>]) -> Option<usize>;

    /// Row selection rule for the dual Simplex method.
    ///
    /// # Arguments
    ///
    /// * `infeasibilities`: Rows with a basic variable outside of its bounds, together with the
    /// size of the violation, in increasing order of row.
    ///
    /// # Return value
    ///
    /// Index into `infeasibilities`, `None` if it is empty.
    fn select_leaving(&mut self, infeasibilities: &[(usize, F)]) -> Option<usize>;
}

/// Enter the improving candidate of lowest index and let the violated row of lowest index leave.
///
/// Both lists arrive sorted by index, so this is the first element of each.
pub struct FirstProfitable;
impl<F> PricingRule<F> for FirstProfitable {
    fn new() -> Self {
        Self
    }

    fn select_entering(&mut self, candidates: &[Candidate<F>]) -> Option<usize> {
        if candidates.is_empty() { None } else { Some(0) }
    }

    fn select_leaving(&mut self, infeasibilities: &[(usize, F)]) -> Option<usize> {
        if infeasibilities.is_empty() { None } else { Some(0) }
    }
}

/// Pivot on the variable with the largest reduced cost in absolute value, and on the row with the
/// largest bound violation.
///
/// Ties are broken in favor of the lowest index.
pub struct Dantzig;
impl<F: Field> PricingRule<F> for Dantzig {
    fn new() -> Self {
        Self
    }

    fn select_entering(&mut self, candidates: &[Candidate<F>]) -> Option<usize> {
        largest(candidates.iter().map(|candidate| candidate.reduced_cost.abs()))
    }

    fn select_leaving(&mut self, infeasibilities: &[(usize, F)]) -> Option<usize> {
        largest(infeasibilities.iter().map(|&(_, infeasibility)| infeasibility))
    }
}

/// Position of the first largest value.
fn largest<F: Field>(values: impl Iterator<Item = F>) -> Option<usize> {
    let mut best: Option<(usize, F)> = None;
    for (index, value) in values.enumerate() {
        match best {
            Some((_, existing)) if value <= existing => {},
            _ => best = Some((index, value)),
        }
    }

    best.map(|(index, _)| index)
}

#[cfg(test)]
mod test {
    use crate::algorithm::simplex::strategy::pricing::{Candidate, Dantzig, FirstProfitable, PricingRule};

    fn candidates() -> Vec<Candidate<f64>> {
        vec![
            Candidate { variable: 2, reduced_cost: -1_f64, direction: 1_f64 },
            Candidate { variable: 4, reduced_cost: 3_f64, direction: -1_f64 },
            Candidate { variable: 5, reduced_cost: -3_f64, direction: 1_f64 },
        ]
    }

    #[test]
    fn first_profitable() {
        let mut rule = <FirstProfitable as PricingRule<f64>>::new();
        assert_eq!(rule.select_entering(&candidates()), Some(0));
        assert_eq!(PricingRule::<f64>::select_entering(&mut rule, &[]), None);
        assert_eq!(rule.select_leaving(&[(3, 1_f64), (1, 5_f64)]), Some(0));
    }

    #[test]
    fn dantzig() {
        let mut rule = <Dantzig as PricingRule<f64>>::new();
        assert_eq!(rule.select_entering(&candidates()), Some(1));
        assert_eq!(rule.select_leaving(&[(3, 1_f64), (1, 5_f64), (2, 5_f64)]), Some(1));
        assert_eq!(PricingRule::<f64>::select_leaving(&mut rule, &[]), None);
    }
}
