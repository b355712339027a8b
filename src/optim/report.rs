use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::kinetics::KineticParameters;

use super::{
    error::OptimizeError,
    metrics::{
        akaike_information_criterion, bayesian_information_criterion,
        coefficient_of_determination, mean_absolute_error, root_mean_squared_error,
        sum_of_squared_errors,
    },
    model::Model,
    problem::CurveFitProblem,
};

/// Reason an optimizer stopped successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The gradient of the objective fell below `gtol`
    GradientTolerance,
    /// The relative decrease of the objective fell below `ftol`
    CostTolerance,
    /// The parameter step fell below `xtol`
    StepTolerance,
    /// The residuals vanished exactly
    PerfectFit,
    /// The objective fell below the configured target cost
    TargetCost,
    /// The solver reported convergence on its own criteria
    SolverConverged,
}

/// A report containing optimization results and evaluation metrics
///
/// The report includes:
/// - Best-fit parameter values
/// - Parameter covariance and standard errors, when they can be estimated
/// - Residuals at the best fit and statistical metrics of the fit quality
/// - The number of iterations and the reason the optimizer stopped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    /// Optimized parameter values, in model order
    pub params: Array1<f64>,
    /// Estimated parameter covariance `inv(JᵀJ) · SSE / (n - p)`
    pub covariance: Option<Array2<f64>>,
    /// Square roots of the covariance diagonal
    pub standard_errors: Option<Array1<f64>>,
    /// Residuals `model(x_i) - y_i` at the best parameters
    pub residuals: Array1<f64>,
    /// Sum of squared residuals
    pub sse: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Akaike Information Criterion
    pub aic: f64,
    /// Bayesian Information Criterion
    pub bic: f64,
    /// Number of optimizer iterations
    pub iterations: u64,
    /// Reason the optimizer stopped
    pub termination: Termination,
}

impl FitReport {
    /// Creates a new FitReport with calculated metrics and uncertainty analysis
    ///
    /// # Arguments
    /// * `problem` - The problem that was optimized
    /// * `params` - Best parameter vector found by the optimizer
    /// * `iterations` - Number of iterations the optimizer used
    /// * `termination` - Reason the optimizer stopped
    ///
    /// # Returns
    /// * `Result<FitReport, OptimizeError>` - The report, or an error if the
    ///   residuals at `params` are not finite
    pub(crate) fn new<M: Model>(
        problem: &CurveFitProblem<M>,
        params: Array1<f64>,
        iterations: u64,
        termination: Termination,
    ) -> Result<Self, OptimizeError> {
        let residuals = problem.residuals(&params)?;
        let jacobian = problem.jacobian_matrix(&params);
        let n_params = params.len();

        let sse = sum_of_squared_errors(&residuals);
        let covariance = estimate_covariance(&jacobian, sse);
        let standard_errors = covariance
            .as_ref()
            .map(|cov| cov.diag().mapv(|v| v.sqrt()));

        Ok(Self {
            rmse: root_mean_squared_error(&residuals),
            mae: mean_absolute_error(&residuals),
            r_squared: coefficient_of_determination(
                &residuals,
                problem.observations().velocities(),
            ),
            aic: akaike_information_criterion(&residuals, n_params),
            bic: bayesian_information_criterion(&residuals, n_params),
            params,
            covariance,
            standard_errors,
            residuals,
            sse,
            iterations,
            termination,
        })
    }

    /// Interprets the parameters as Michaelis-Menten constants `[v_max, k_m]`.
    ///
    /// # Returns
    /// * `Option<KineticParameters>` - `None` unless exactly two parameters were fitted
    pub fn kinetic_parameters(&self) -> Option<KineticParameters> {
        KineticParameters::try_from(self.params.to_vec().as_slice()).ok()
    }
}

/// Estimates the parameter covariance from the Jacobian at the optimum.
///
/// Returns `None` when there are not more data points than parameters or the
/// normal matrix `JᵀJ` cannot be inverted.
fn estimate_covariance(jacobian: &Array2<f64>, sse: f64) -> Option<Array2<f64>> {
    let (n_points, n_params) = jacobian.dim();
    if n_points <= n_params {
        return None;
    }

    let jtj = jacobian.t().dot(jacobian);
    let inverse = DMatrix::from_fn(n_params, n_params, |i, j| jtj[[i, j]]).try_inverse()?;
    let scale = sse / (n_points - n_params) as f64;

    Some(Array2::from_shape_fn((n_params, n_params), |(i, j)| {
        inverse[(i, j)] * scale
    }))
}
