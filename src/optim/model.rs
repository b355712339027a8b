//! Models that can be fitted by the least-squares optimizers.
//!
//! A model maps an independent variable and a parameter vector to a predicted
//! value. Any closure of the form `Fn(f64, &Array1<f64>) -> f64` is a model;
//! [`MichaelisMenten`] is the built-in one and provides an analytic gradient.

use finitediff::FiniteDiff;
use ndarray::Array1;

use crate::kinetics::{velocity, MichaelisMenten};

/// Trait defining a model `y = f(x, params)` for curve fitting.
pub trait Model {
    /// Predicts the dependent variable at `x` for the given parameters.
    fn predict(&self, x: f64, params: &Array1<f64>) -> f64;

    /// Computes the partial derivatives of [`Model::predict`] with respect to
    /// each parameter at `x`.
    ///
    /// The default implementation uses central finite differences.
    fn param_gradient(&self, x: f64, params: &Array1<f64>) -> Array1<f64> {
        let f = |p: &Array1<f64>| self.predict(x, p);
        params.central_diff(&f)
    }

    /// Number of parameters the model expects, if fixed.
    fn n_params(&self) -> Option<usize> {
        None
    }
}

impl<F> Model for F
where
    F: Fn(f64, &Array1<f64>) -> f64,
{
    fn predict(&self, x: f64, params: &Array1<f64>) -> f64 {
        self(x, params)
    }
}

impl Model for MichaelisMenten {
    fn predict(&self, x: f64, params: &Array1<f64>) -> f64 {
        velocity(x, params[0], params[1])
    }

    fn param_gradient(&self, x: f64, params: &Array1<f64>) -> Array1<f64> {
        let (v_max, k_m) = (params[0], params[1]);
        let denom = k_m + x;
        Array1::from_vec(vec![x / denom, -v_max * x / (denom * denom)])
    }

    fn n_params(&self) -> Option<usize> {
        Some(MichaelisMenten::N_PARAMS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_analytic_gradient_matches_finite_differences() {
        let closure = |s: f64, p: &Array1<f64>| p[0] * s / (p[1] + s);
        let params = Array1::from_vec(vec![1687.5, 121.3]);

        for s in [0.8, 51.2, 1638.4] {
            let analytic = MichaelisMenten.param_gradient(s, &params);
            let numeric = closure.param_gradient(s, &params);
            for (a, n) in analytic.iter().zip(numeric.iter()) {
                assert_relative_eq!(*a, *n, max_relative = 1e-3);
            }
        }
    }

    #[test]
    fn test_closure_model_predicts() {
        let linear = |x: f64, p: &Array1<f64>| p[0] + p[1] * x;
        let params = Array1::from_vec(vec![1.0, 2.0]);
        assert_eq!(linear.predict(3.0, &params), 7.0);
        assert_eq!(linear.n_params(), None);
        assert_eq!(MichaelisMenten.n_params(), Some(2));
    }
}
