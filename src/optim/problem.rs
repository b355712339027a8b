use argmin::core::{CostFunction, Error, Gradient, Jacobian, Operator};
use log::warn;
use ndarray::{Array1, Array2};

use crate::data::ObservationSet;

use super::error::OptimizeError;
use super::model::Model;

/// Represents a least-squares curve fitting problem
///
/// Pairs a model with the observations it should reproduce. The residual of
/// data point `i` is `model(x_i, params) - y_i` and the objective is the sum of
/// the squared residuals.
///
/// # Fields
/// * `model` - Model predicting the dependent variable
/// * `observations` - Measured `(x, y)` pairs
#[derive(Debug, Clone)]
pub struct CurveFitProblem<M: Model> {
    /// Model predicting the dependent variable
    model: M,
    /// Measured `(x, y)` pairs
    observations: ObservationSet,
}

impl<M: Model> CurveFitProblem<M> {
    /// Creates a new curve fitting problem
    ///
    /// # Arguments
    /// * `model` - Model to fit
    /// * `observations` - Validated observation set
    ///
    /// Non-positive concentrations are accepted but logged, since they can put
    /// the rate-law denominator `k_m + s` at zero during the fit.
    pub fn new(model: M, observations: ObservationSet) -> Self {
        if !observations.has_positive_concentrations() {
            warn!("Observation set contains non-positive concentrations; residuals may become non-finite");
        }
        Self {
            model,
            observations,
        }
    }

    /// Creates a new curve fitting problem from raw sequences
    ///
    /// # Errors
    /// Returns `OptimizeError::ShapeError` if `xs` and `ys` differ in length
    pub fn from_data(model: M, xs: &[f64], ys: &[f64]) -> Result<Self, OptimizeError> {
        let observations = ObservationSet::new(xs.to_vec(), ys.to_vec())?;
        Ok(Self::new(model, observations))
    }

    /// Computes the residual vector `model(x_i, params) - y_i`
    ///
    /// # Errors
    /// Returns `OptimizeError::NonFiniteResidual` for the first data point whose
    /// prediction is NaN or infinite, e.g. when `k_m + s == 0`.
    pub fn residuals(&self, params: &Array1<f64>) -> Result<Array1<f64>, OptimizeError> {
        let residuals: Array1<f64> = self
            .observations
            .iter()
            .map(|(x, y)| self.model.predict(x, params) - y)
            .collect();

        match residuals.iter().position(|r| !r.is_finite()) {
            Some(index) => Err(OptimizeError::NonFiniteResidual { index }),
            None => Ok(residuals),
        }
    }

    /// Computes the Jacobian of the residuals with respect to the parameters
    ///
    /// # Returns
    /// * `Array2<f64>` - Matrix of shape `(n_points, n_params)`
    pub fn jacobian_matrix(&self, params: &Array1<f64>) -> Array2<f64> {
        let mut jacobian = Array2::zeros((self.n_points(), params.len()));
        for (i, x) in self.observations.concentrations().iter().enumerate() {
            jacobian
                .row_mut(i)
                .assign(&self.model.param_gradient(*x, params));
        }
        jacobian
    }

    /// Sum of squared residuals at `params`
    pub fn sum_of_squares(&self, params: &Array1<f64>) -> Result<f64, OptimizeError> {
        let residuals = self.residuals(params)?;
        Ok(residuals.dot(&residuals))
    }

    /// Validates the length of an initial guess against the model
    ///
    /// # Errors
    /// Returns `OptimizeError::InitialGuessLengthError` if the model declares a
    /// parameter count that differs from the guess, or the guess is empty.
    pub fn check_initial_guess(&self, guess: &Array1<f64>) -> Result<(), OptimizeError> {
        let expected = self.model.n_params().unwrap_or(guess.len()).max(1);
        if guess.len() != expected {
            return Err(OptimizeError::InitialGuessLengthError {
                expected,
                found: guess.len(),
            });
        }
        Ok(())
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    /// Returns the number of data points
    pub fn n_points(&self) -> usize {
        self.observations.len()
    }
}

/// Residual vector of the problem, used by Jacobian-based solvers.
impl<M: Model> Operator for CurveFitProblem<M> {
    type Param = Array1<f64>;
    type Output = Array1<f64>;

    fn apply(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.residuals(params)?)
    }
}

impl<M: Model> Jacobian for CurveFitProblem<M> {
    type Param = Array1<f64>;
    type Jacobian = Array2<f64>;

    fn jacobian(&self, params: &Self::Param) -> Result<Self::Jacobian, Error> {
        Ok(self.jacobian_matrix(params))
    }
}

/// Sum of squared residuals, used by cost-based solvers.
impl<M: Model> CostFunction for CurveFitProblem<M> {
    type Param = Array1<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.sum_of_squares(params)?)
    }
}

/// Gradient of the sum of squares, `2 Jᵀ r`.
impl<M: Model> Gradient for CurveFitProblem<M> {
    type Param = Array1<f64>;
    type Gradient = Array1<f64>;

    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, Error> {
        let residuals = self.residuals(params)?;
        let jacobian = self.jacobian_matrix(params);
        Ok(jacobian.t().dot(&residuals) * 2.0)
    }
}
