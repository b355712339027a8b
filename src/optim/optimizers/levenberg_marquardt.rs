//! Levenberg-Marquardt least-squares algorithm implementation.
//!
//! This module provides the default optimizer of the crate. It includes:
//!
//! - The main `LevenbergMarquardt` optimizer struct and implementation
//! - A builder pattern via `LevenbergMarquardtBuilder` for convenient configuration
//! - The [`curve_fit`] convenience function fitting a model to raw sequences
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (JᵀJ + λ · diag(JᵀJ)) δ = -Jᵀr
//! ```
//!
//! A step is accepted when it strictly decreases the sum of squares, after which
//! the damping `λ` is relaxed; otherwise the step is rejected and `λ` grows. Small
//! `λ` approaches Gauss-Newton, large `λ` approaches scaled steepest descent.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::optim::report::{FitReport, Termination};
use crate::optim::{CurveFitProblem, InitialGuesses, Model, OptimizeError, Optimizer};

use super::optimizer::prepare_initial_guess;

/// Factor by which the damping grows after a rejected step and shrinks after an accepted one
const DAMPING_FACTOR: f64 = 10.0;

/// Lower bound of the damping after accepted steps
const MIN_DAMPING: f64 = 1e-12;

/// Damping beyond which the iteration is considered stalled
const MAX_DAMPING: f64 = 1e16;

/// Implementation of the Levenberg-Marquardt algorithm.
///
/// # Convergence
///
/// The iteration stops successfully when one of these holds:
/// * `gtol` - the largest component of `Jᵀr` is at most `gtol`
/// * `ftol` - an accepted step reduced the sum of squares by a relative amount of at most `ftol`
/// * `xtol` - a step satisfied `‖δ‖ <= xtol · (‖p‖ + xtol)`
///
/// It fails with `OptimizeError::ConvergenceError` when `max_iters` iterations
/// pass without convergence or the damping exceeds its upper bound.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardt {
    /// Maximum number of iterations before stopping
    pub max_iters: u64,
    /// Relative tolerance on the decrease of the sum of squares
    pub ftol: f64,
    /// Relative tolerance on the parameter step
    pub xtol: f64,
    /// Absolute tolerance on the gradient `Jᵀr`
    pub gtol: f64,
    /// Damping used for the first iteration
    pub initial_damping: f64,
}

impl LevenbergMarquardt {
    /// Creates a new LevenbergMarquardt optimizer instance with the specified parameters.
    pub fn new(max_iters: u64, ftol: f64, xtol: f64, gtol: f64, initial_damping: f64) -> Self {
        Self {
            max_iters,
            ftol,
            xtol,
            gtol,
            initial_damping,
        }
    }

    /// Runs the damped Gauss-Newton iteration from `initial_guess`.
    ///
    /// # Returns
    /// * `Ok((params, iterations, termination))` on convergence
    /// * `Err(OptimizeError)` if the iteration does not converge or the
    ///   residuals at the initial guess are not finite
    fn minimize<M: Model>(
        &self,
        problem: &CurveFitProblem<M>,
        initial_guess: Array1<f64>,
    ) -> Result<(Array1<f64>, u64, Termination), OptimizeError> {
        let mut params = initial_guess;
        let mut residuals = problem.residuals(&params)?;
        let mut cost = residuals.dot(&residuals);
        let mut damping = self.initial_damping;

        if cost == 0.0 {
            return Ok((params, 0, Termination::PerfectFit));
        }

        for iter in 1..=self.max_iters {
            let jacobian = problem.jacobian_matrix(&params);
            let jtj = jacobian.t().dot(&jacobian);
            let gradient = jacobian.t().dot(&residuals);

            if !jtj.iter().all(|v| v.is_finite()) {
                return Err(OptimizeError::SingularSystem);
            }

            let max_gradient = gradient.iter().fold(0.0_f64, |acc, g| acc.max(g.abs()));
            if max_gradient <= self.gtol {
                info!("Levenberg-Marquardt converged (gradient) after {iter} iterations");
                return Ok((params, iter, Termination::GradientTolerance));
            }

            loop {
                let param_norm = params.dot(&params).sqrt();
                let step = solve_damped(&jtj, &gradient, damping);
                let singular = step.is_none();

                if let Some(step) = step {
                    let step_norm = step.dot(&step).sqrt();
                    let small_step = step_norm <= self.xtol * (param_norm + self.xtol);
                    let candidate = &params + &step;

                    if let Ok(candidate_residuals) = problem.residuals(&candidate) {
                        let candidate_cost = candidate_residuals.dot(&candidate_residuals);

                        if candidate_cost < cost {
                            let reduction = (cost - candidate_cost) / cost;

                            params = candidate;
                            residuals = candidate_residuals;
                            cost = candidate_cost;
                            damping = (damping / DAMPING_FACTOR).max(MIN_DAMPING);

                            debug!(
                                "iter {iter}: cost = {cost:.6e}, damping = {damping:.1e}, params = {params}"
                            );

                            let termination = if cost == 0.0 {
                                Some(Termination::PerfectFit)
                            } else if reduction <= self.ftol {
                                Some(Termination::CostTolerance)
                            } else if small_step {
                                Some(Termination::StepTolerance)
                            } else {
                                None
                            };

                            if let Some(termination) = termination {
                                info!(
                                    "Levenberg-Marquardt converged ({termination:?}) after {iter} iterations, cost = {cost:.6e}"
                                );
                                return Ok((params, iter, termination));
                            }

                            break;
                        }
                    }

                    if small_step {
                        info!(
                            "Levenberg-Marquardt converged (StepTolerance) after {iter} iterations, cost = {cost:.6e}"
                        );
                        return Ok((params, iter, Termination::StepTolerance));
                    }
                }

                damping *= DAMPING_FACTOR;
                if damping > MAX_DAMPING {
                    debug!("iter {iter}: damping exceeded {MAX_DAMPING:e} without progress");
                    if singular {
                        return Err(OptimizeError::SingularSystem);
                    }
                    return Err(OptimizeError::ConvergenceError {
                        iterations: iter,
                        cost,
                    });
                }
            }
        }

        Err(OptimizeError::ConvergenceError {
            iterations: self.max_iters,
            cost,
        })
    }
}

/// Solves `(JᵀJ + λ · diag(JᵀJ)) δ = -Jᵀr` for the step `δ`.
///
/// # Returns
/// * `Option<Array1<f64>>` - The step, or `None` if the damped system is singular
fn solve_damped(jtj: &Array2<f64>, gradient: &Array1<f64>, damping: f64) -> Option<Array1<f64>> {
    let n = gradient.len();
    let lhs = DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            jtj[[i, i]] + damping * jtj[[i, i]].max(f64::MIN_POSITIVE)
        } else {
            jtj[[i, j]]
        }
    });
    let rhs = DVector::from_iterator(n, gradient.iter().map(|g| -g));

    let step = lhs.lu().solve(&rhs)?;
    if step.iter().all(|v| v.is_finite()) {
        Some(Array1::from_iter(step.iter().cloned()))
    } else {
        None
    }
}

impl<M: Model> Optimizer<M> for LevenbergMarquardt {
    /// Optimizes the given problem using the Levenberg-Marquardt algorithm.
    ///
    /// # Arguments
    ///
    /// * `problem` - The optimization problem to solve
    /// * `initial_guess` - Initial parameter values to start optimization from
    ///
    /// # Returns
    ///
    /// * `Ok(FitReport)` - The fit report at the optimal parameters
    /// * `Err(OptimizeError)` - Error if optimization fails or doesn't converge
    fn optimize<T>(
        &self,
        problem: &CurveFitProblem<M>,
        initial_guess: T,
    ) -> Result<FitReport, OptimizeError>
    where
        T: Into<InitialGuesses>,
    {
        let initial_guess = prepare_initial_guess(problem, initial_guess)?;
        let (params, iterations, termination) = self.minimize(problem, initial_guess)?;
        FitReport::new(problem, params, iterations, termination)
    }
}

/// Builder for configuring and constructing LevenbergMarquardt instances.
pub struct LevenbergMarquardtBuilder {
    max_iters: u64,
    ftol: f64,
    xtol: f64,
    gtol: f64,
    initial_damping: f64,
}

impl LevenbergMarquardtBuilder {
    /// Sets the maximum number of iterations.
    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the relative tolerance on the decrease of the sum of squares.
    pub fn ftol(mut self, ftol: f64) -> Self {
        self.ftol = ftol;
        self
    }

    /// Sets the relative tolerance on the parameter step.
    pub fn xtol(mut self, xtol: f64) -> Self {
        self.xtol = xtol;
        self
    }

    /// Sets the absolute tolerance on the gradient.
    pub fn gtol(mut self, gtol: f64) -> Self {
        self.gtol = gtol;
        self
    }

    /// Sets the damping of the first iteration.
    pub fn initial_damping(mut self, initial_damping: f64) -> Self {
        self.initial_damping = initial_damping;
        self
    }

    /// Builds and returns a LevenbergMarquardt instance with the configured settings.
    pub fn build(self) -> LevenbergMarquardt {
        LevenbergMarquardt {
            max_iters: self.max_iters,
            ftol: self.ftol,
            xtol: self.xtol,
            gtol: self.gtol,
            initial_damping: self.initial_damping,
        }
    }
}

impl Default for LevenbergMarquardtBuilder {
    /// Creates a new LevenbergMarquardtBuilder with default settings.
    ///
    /// Default values:
    /// - max_iters: 200
    /// - ftol: `f64::EPSILON`
    /// - xtol: 1e-12
    /// - gtol: 0.0
    /// - initial_damping: 1e-3
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: f64::EPSILON,
            xtol: 1e-12,
            gtol: 0.0,
            initial_damping: 1e-3,
        }
    }
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        LevenbergMarquardtBuilder::default().build()
    }
}

/// Fits `model` to the pairs `(xs[i], ys[i])` by nonlinear least squares.
///
/// Uses [`LevenbergMarquardt`] with default settings. The result depends on
/// `initial_guess`: a guess far from the optimum may converge to another local
/// minimum or fail with `OptimizeError::ConvergenceError`. No retry with other
/// guesses is attempted.
///
/// # Arguments
/// * `model` - Model `y = f(x, params)` to fit
/// * `xs` - Independent variable values
/// * `ys` - Observed dependent variable values
/// * `initial_guess` - Starting parameter vector
///
/// # Errors
/// * `OptimizeError::ShapeError` if `xs` and `ys` differ in length
/// * `OptimizeError::InitialGuessLengthError` if the guess does not fit the model
/// * `OptimizeError::NonFiniteResidual` if the model is not finite at the guess
/// * `OptimizeError::ConvergenceError` if the iteration does not converge
pub fn curve_fit<M: Model>(
    model: M,
    xs: &[f64],
    ys: &[f64],
    initial_guess: impl Into<InitialGuesses>,
) -> Result<FitReport, OptimizeError> {
    let problem = CurveFitProblem::from_data(model, xs, ys)?;
    LevenbergMarquardt::default().optimize(&problem, initial_guess)
}
