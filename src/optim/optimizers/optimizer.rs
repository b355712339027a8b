//! Traits and conversion logic for optimization.
//!
//! This module provides core traits and conversion functionality for optimization,
//! including:
//!
//! - The `Optimizer` trait defining the interface for optimization algorithms
//! - Initial guess handling via `InitialGuesses` and conversions from common types

use ndarray::Array1;

use crate::kinetics::KineticParameters;
use crate::optim::error::OptimizeError;
use crate::optim::model::Model;
use crate::optim::problem::CurveFitProblem;
use crate::optim::report::FitReport;

/// Trait defining the interface for optimization algorithms.
///
/// Every optimizer is a local method: the result depends on the initial guess,
/// and a poor guess may end in a different local optimum or in a
/// `ConvergenceError`. Retrying with another guess is left to the caller.
pub trait Optimizer<M: Model> {
    /// Optimizes the given problem to find optimal parameters.
    ///
    /// # Arguments
    /// * `problem` - The optimization problem to solve
    /// * `initial_guess` - Initial parameter values to start optimization from
    ///
    /// # Returns
    /// * `Result<FitReport, OptimizeError>` - The fit report or an error
    fn optimize<T>(
        &self,
        problem: &CurveFitProblem<M>,
        initial_guess: T,
    ) -> Result<FitReport, OptimizeError>
    where
        T: Into<InitialGuesses>;
}

/// Wrapper type for initial parameter guesses used in optimization.
#[derive(Debug, Clone)]
pub struct InitialGuesses(pub Array1<f64>);

impl InitialGuesses {
    /// Get the values of the initial guesses.
    pub fn get_values(self) -> Array1<f64> {
        self.0
    }
}

impl From<Array1<f64>> for InitialGuesses {
    fn from(value: Array1<f64>) -> Self {
        InitialGuesses(value)
    }
}

impl From<Vec<f64>> for InitialGuesses {
    fn from(value: Vec<f64>) -> Self {
        InitialGuesses(Array1::from_vec(value))
    }
}

impl<const N: usize> From<[f64; N]> for InitialGuesses {
    fn from(value: [f64; N]) -> Self {
        InitialGuesses(Array1::from_vec(value.to_vec()))
    }
}

impl From<KineticParameters> for InitialGuesses {
    fn from(value: KineticParameters) -> Self {
        InitialGuesses(Array1::from_vec(value.to_vec()))
    }
}

/// Validates an initial guess against a problem and unwraps its values.
pub(crate) fn prepare_initial_guess<M: Model>(
    problem: &CurveFitProblem<M>,
    initial_guess: impl Into<InitialGuesses>,
) -> Result<Array1<f64>, OptimizeError> {
    let initial_guess = initial_guess.into().get_values();
    problem.check_initial_guess(&initial_guess)?;
    Ok(initial_guess)
}
