//! # Solver context
//!
//! Tolerances and policies of a single solve, converted to the number type of that solve. A
//! reference to the context is passed through every call of the factorization and the iterator;
//! there is no global solver state.
use crate::config::{RefactorizationPolicy, RowSelection, SolverConfig, Tolerances};
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

/// Tolerances in the number type of the solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericTolerances<F> {
    /// Bound violation that is still considered feasible.
    pub primal: F,
    /// Reduced cost of the wrong sign that is still considered optimal.
    pub dual: F,
    /// Pivot values of smaller magnitude can't be committed to the eta file.
    pub pivot: F,
    /// Pivot column values of smaller magnitude are ignored in ratio tests.
    pub ratio_pivot: F,
    /// Smallest magnitude accepted as a pivot while factorizing.
    pub factorization_pivot: F,
    /// Relative tolerance below which solve results are rounded to zero.
    pub drop: F,
    /// Relaxation of the bounds in the first pass of the Harris ratio test, as a multiple of
    /// `primal`.
    pub harris: F,
}

/// Everything the factorization and the iterator need to know about the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverContext<F> {
    /// Numerical tolerances.
    pub tolerances: NumericTolerances<F>,
    /// Refactorization frequency.
    pub refactorization: RefactorizationPolicy,
    /// Pivot row selection while factorizing.
    pub row_selection: RowSelection,
}

impl<F: Field> SolverContext<F> {
    /// Validate a configuration and convert its tolerances.
    ///
    /// # Errors
    ///
    /// If a tolerance is negative, not finite or not representable, or a policy value is out of
    /// range.
    pub fn new(config: &SolverConfig) -> Result<Self> {
        let Tolerances {
            primal, dual, pivot_epsilon_scale, ratio_pivot, factorization_pivot, drop, harris_scale,
        } = config.tolerances;

        let pivot = convert::<F>("pivot_epsilon_scale", pivot_epsilon_scale)? * F::epsilon();
        let tolerances = NumericTolerances {
            primal: convert("primal", primal)?,
            dual: convert("dual", dual)?,
            pivot,
            ratio_pivot: convert("ratio_pivot", ratio_pivot)?,
            factorization_pivot: convert("factorization_pivot", factorization_pivot)?,
            drop: convert("drop", drop)?,
            harris: convert("harris_scale", harris_scale)?,
        };

        let policy = config.refactorization;
        if policy.pivot_cap == 0 {
            return Err(Error::InvalidConfig("pivot_cap must be at least 1".to_string()));
        }
        if !(policy.growth_factor >= 1_f64) || !policy.growth_factor.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "growth_factor must be a finite value of at least 1, got {}", policy.growth_factor,
            )));
        }
        if !(0_f64..=1_f64).contains(&policy.warm_up) {
            return Err(Error::InvalidConfig(format!("warm_up must lie in [0, 1], got {}", policy.warm_up)));
        }
        if let RowSelection::Markowitz { threshold } = config.row_selection {
            if !(threshold > 0_f64 && threshold <= 1_f64) {
                return Err(Error::InvalidConfig(format!(
                    "Markowitz threshold must lie in (0, 1], got {threshold}",
                )));
            }
        }

        Ok(Self { tolerances, refactorization: policy, row_selection: config.row_selection })
    }
}

impl<F: Field> Default for SolverContext<F> {
    fn default() -> Self {
        let config = SolverConfig::default();
        let tolerance = |value: f64| F::from_f64(value).unwrap_or_else(F::epsilon);
        Self {
            tolerances: NumericTolerances {
                primal: tolerance(config.tolerances.primal),
                dual: tolerance(config.tolerances.dual),
                pivot: tolerance(config.tolerances.pivot_epsilon_scale) * F::epsilon(),
                ratio_pivot: tolerance(config.tolerances.ratio_pivot),
                factorization_pivot: tolerance(config.tolerances.factorization_pivot),
                drop: tolerance(config.tolerances.drop),
                harris: tolerance(config.tolerances.harris_scale),
            },
            refactorization: config.refactorization,
            row_selection: config.row_selection,
        }
    }
}

fn convert<F: Field>(name: &str, value: f64) -> Result<F> {
    if !value.is_finite() || value < 0_f64 {
        return Err(Error::InvalidConfig(format!("tolerance {name} must be finite and nonnegative, got {value}")));
    }

    F::from_f64(value)
        .ok_or_else(|| Error::InvalidConfig(format!("tolerance {name} = {value} is not representable")))
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;

    use crate::algorithm::simplex::context::SolverContext;
    use crate::config::{RowSelection, SolverConfig, Tolerances};
    use crate::error::Error;

    #[test]
    fn conversion() {
        let context = SolverContext::<f64>::new(&SolverConfig::new()).unwrap();
        assert_relative_eq!(context.tolerances.primal, 5.01e-7);
        assert_relative_eq!(context.tolerances.pivot, 1e5 * f64::EPSILON);
        assert_eq!(context, SolverContext::default());

        let context = SolverContext::<f32>::new(&SolverConfig::new()).unwrap();
        assert_relative_eq!(context.tolerances.dual, 1e-6_f32);
    }

    #[test]
    fn invalid() {
        let config = SolverConfig::new().with_tolerances(Tolerances { primal: -1_f64, ..Tolerances::default() });
        assert!(matches!(SolverContext::<f64>::new(&config), Err(Error::InvalidConfig(_))));

        let config = SolverConfig::new().with_pivot_cap(0);
        assert!(matches!(SolverContext::<f64>::new(&config), Err(Error::InvalidConfig(_))));

        let config = SolverConfig::new().with_row_selection(RowSelection::Markowitz { threshold: 0_f64 });
        assert!(matches!(SolverContext::<f64>::new(&config), Err(Error::InvalidConfig(_))));
    }
}
