//! L-BFGS fitting through argmin.
//!
//! An alternative to [`LevenbergMarquardt`](super::LevenbergMarquardt) that treats the
//! sum of squares as a generic smooth objective and minimizes it with argmin's
//! limited-memory quasi-Newton solver and a More-Thuente line search. The gradient
//! `2 Jᵀr` comes from [`CurveFitProblem`].
//!
//! L-BFGS ignores the least-squares structure, so it needs more iterations and is
//! more sensitive to badly scaled parameters. It is mostly useful as a cross-check.

use argmin::core::observers::ObserverMode;
use argmin::core::{Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS as ArgminLBFGS;
use argmin_observer_slog::SlogLogger;
use log::info;

use crate::optim::report::{FitReport, Termination};
use crate::optim::{CurveFitProblem, InitialGuesses, Model, OptimizeError, Optimizer};

use super::optimizer::prepare_initial_guess;

/// Limited-memory BFGS configured for curve fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct LBFGS {
    /// Number of past updates kept for the inverse Hessian approximation
    pub m: usize,
    /// Iteration cap; reaching it is reported as `ConvergenceError`
    pub max_iters: u64,
    /// Sum of squares at which the run stops early
    pub target_cost: f64,
    /// Sufficient decrease constant of the line search
    pub c1: f64,
    /// Curvature constant of the line search
    pub c2: f64,
    /// Attach argmin's terminal observer
    pub show_progress: bool,
}

impl Default for LBFGS {
    fn default() -> Self {
        Self {
            m: 5,
            max_iters: 500,
            target_cost: 1e-12,
            c1: 1e-4,
            c2: 0.9,
            show_progress: false,
        }
    }
}

impl<M: Model + Clone> Optimizer<M> for LBFGS {
    fn optimize<T>(
        &self,
        problem: &CurveFitProblem<M>,
        initial_guess: T,
    ) -> Result<FitReport, OptimizeError>
    where
        T: Into<InitialGuesses>,
    {
        let start = prepare_initial_guess(problem, initial_guess)?;
        // Surface a non-finite start before argmin wraps it into an opaque error
        problem.residuals(&start)?;

        let linesearch = MoreThuenteLineSearch::new()
            .with_c(self.c1, self.c2)
            .map_err(OptimizeError::ArgMinError)?;

        let mut executor = Executor::new(problem.clone(), ArgminLBFGS::new(linesearch, self.m))
            .configure(|state| {
                state
                    .param(start)
                    .max_iters(self.max_iters)
                    .target_cost(self.target_cost)
            });
        if self.show_progress {
            executor = executor.add_observer(SlogLogger::term(), ObserverMode::Always);
        }

        let state = executor.run().map_err(OptimizeError::ArgMinError)?.state;
        let iterations = state.get_iter();
        let best_cost = state.get_best_cost();

        let termination = match state.termination_status {
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                return Err(OptimizeError::ConvergenceError {
                    iterations,
                    cost: best_cost,
                })
            }
            TerminationStatus::Terminated(TerminationReason::TargetCostReached) => {
                Termination::TargetCost
            }
            _ => Termination::SolverConverged,
        };

        let Some(best) = state.get_best_param().cloned() else {
            return Err(OptimizeError::ConvergenceError {
                iterations,
                cost: best_cost,
            });
        };

        info!("L-BFGS stopped ({termination:?}) after {iterations} iterations, cost = {best_cost:.6e}");
        FitReport::new(problem, best, iterations, termination)
    }
}

/// Fluent configuration of [`LBFGS`], starting from its defaults.
#[derive(Debug, Clone, Default)]
pub struct LBFGSBuilder {
    inner: LBFGS,
}

impl LBFGSBuilder {
    /// Line search constants, `0 < c1 < c2 < 1`.
    pub fn linesearch(mut self, c1: f64, c2: f64) -> Self {
        self.inner.c1 = c1;
        self.inner.c2 = c2;
        self
    }

    pub fn max_iters(mut self, max_iters: u64) -> Self {
        self.inner.max_iters = max_iters;
        self
    }

    pub fn target_cost(mut self, target_cost: f64) -> Self {
        self.inner.target_cost = target_cost;
        self
    }

    /// History size of the inverse Hessian approximation.
    pub fn m(mut self, m: usize) -> Self {
        self.inner.m = m;
        self
    }

    pub fn show_progress(mut self, show_progress: bool) -> Self {
        self.inner.show_progress = show_progress;
        self
    }

    pub fn build(self) -> LBFGS {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinetics::MichaelisMenten;

    #[test]
    fn test_builder_overrides_defaults() {
        let lbfgs = LBFGSBuilder::default().m(7).max_iters(20).build();
        assert_eq!(
            lbfgs,
            LBFGS {
                m: 7,
                max_iters: 20,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_non_finite_start() {
        let problem = CurveFitProblem::from_data(MichaelisMenten, &[1.0, 2.0], &[1.0, 1.0]).unwrap();
        let result = LBFGS::default().optimize(&problem, [1.0, -1.0]);
        assert!(matches!(
            result,
            Err(OptimizeError::NonFiniteResidual { index: 0 })
        ));
    }

    #[test]
    fn test_iteration_cap() {
        let xs = [0.1, 0.5, 1.0, 2.0, 5.0];
        let ys = xs.map(|s| 2.0 * s / (1.0 + s));
        let problem = CurveFitProblem::from_data(MichaelisMenten, &xs, &ys).unwrap();
        let lbfgs = LBFGSBuilder::default().max_iters(1).target_cost(0.0).build();
        let result = lbfgs.optimize(&problem, [1.5, 0.5]);
        assert!(matches!(
            result,
            Err(OptimizeError::ConvergenceError { iterations: 1, .. })
        ));
    }
}
