//! Adaptive reference integration of the mass balance.
//!
//! The fixed-step Euler scheme is only first-order accurate. To judge its error, the
//! same system is integrated with an embedded Runge-Kutta pair from `peroxide`
//! (Dormand-Prince 4(5) by default, Runge-Kutta-Fehlberg 4(5) optionally) whose
//! step size adapts to a local error tolerance.

use derive_builder::Builder;
use log::debug;
use peroxide::fuga::{BasicODESolver, ODESolver, DP45, RKF45};
use serde::{Deserialize, Serialize};

use crate::kinetics::KineticParameters;

use super::error::SimulationError;
use super::result::SimulationTrace;
use super::setup::{validate_span, SimulationSetup};
use super::system::MassBalance;

/// Embedded Runge-Kutta pair used for the adaptive integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdaptiveMethod {
    #[default]
    Dp45,
    Rkf45,
}

/// Step control of the adaptive integration
///
/// # Fields
///
/// * `dt` - Initial step size (default: 10.0)
/// * `tol` - Local error tolerance (default: 1e-8)
/// * `safety_factor` - Step size safety factor (default: 0.9)
/// * `min_step` - Smallest allowed step size (default: 1e-6)
/// * `max_step` - Largest allowed step size (default: 10.0)
/// * `max_step_iter` - Maximum step size adjustments per step (default: 100)
/// * `method` - Runge-Kutta pair (default: Dormand-Prince)
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
pub struct AdaptiveSetup {
    #[builder(default = "10.0")]
    pub dt: f64,
    #[builder(default = "1e-8")]
    pub tol: f64,
    #[builder(default = "0.9")]
    pub safety_factor: f64,
    #[builder(default = "1e-6")]
    pub min_step: f64,
    #[builder(default = "10.0")]
    pub max_step: f64,
    #[builder(default = "100")]
    pub max_step_iter: usize,
    #[builder(default)]
    #[serde(default)]
    pub method: AdaptiveMethod,
}

impl Default for AdaptiveSetup {
    fn default() -> Self {
        Self {
            dt: 10.0,
            tol: 1e-8,
            safety_factor: 0.9,
            min_step: 1e-6,
            max_step: 10.0,
            max_step_iter: 100,
            method: AdaptiveMethod::Dp45,
        }
    }
}

impl AdaptiveSetup {
    fn validate(&self) -> Result<(), SimulationError> {
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(SimulationError::InvalidSettings(format!(
                "tolerance must be positive, got {}",
                self.tol
            )));
        }
        if !(self.min_step > 0.0 && self.min_step <= self.max_step) {
            return Err(SimulationError::InvalidSettings(format!(
                "step bounds must satisfy 0 < min_step <= max_step, got [{}, {}]",
                self.min_step, self.max_step
            )));
        }
        if !(self.safety_factor > 0.0 && self.safety_factor <= 1.0) {
            return Err(SimulationError::InvalidSettings(format!(
                "safety factor must lie in (0, 1], got {}",
                self.safety_factor
            )));
        }
        Ok(())
    }
}

/// Integrates the mass balance of `setup` with an adaptive Runge-Kutta pair.
///
/// Only the initial state and stop time of `setup` are used; step control comes
/// from `adaptive`. The returned trace holds every accepted step and its last time
/// point may lie past the stop time.
///
/// # Errors
///
/// * `SimulationError::InvalidStepError` / `InvalidStopTime` for an invalid span
/// * `SimulationError::InvalidSettings` for inconsistent step control
/// * `SimulationError::IntegrationError` if the solver fails
/// * `SimulationError::NonFiniteState` if the solution becomes non-finite
pub fn integrate_adaptive(
    adaptive: &AdaptiveSetup,
    setup: &SimulationSetup,
    params: &KineticParameters,
) -> Result<SimulationTrace, SimulationError> {
    validate_span(adaptive.dt, setup.t1)?;
    adaptive.validate()?;

    let (s0, p0) = setup.initial_state();
    if setup.t1 == 0.0 {
        return Ok(SimulationTrace::new((s0, p0), 1));
    }

    let system = MassBalance::new(*params);
    let initial_state = vec![s0, p0];
    let span = (0.0, setup.t1);

    let (t_out, y_out) = match adaptive.method {
        AdaptiveMethod::Dp45 => {
            let integrator = DP45::new(
                adaptive.tol,
                adaptive.safety_factor,
                adaptive.min_step,
                adaptive.max_step,
                adaptive.max_step_iter,
            );
            BasicODESolver::new(integrator).solve(&system, span, adaptive.dt, &initial_state)?
        }
        AdaptiveMethod::Rkf45 => {
            let integrator = RKF45::new(
                adaptive.tol,
                adaptive.safety_factor,
                adaptive.min_step,
                adaptive.max_step,
                adaptive.max_step_iter,
            );
            BasicODESolver::new(integrator).solve(&system, span, adaptive.dt, &initial_state)?
        }
    };

    let mut trace = SimulationTrace::new((s0, p0), t_out.len());
    for (t, y) in t_out.iter().zip(y_out.iter()).skip(1) {
        if !y.iter().all(|v| v.is_finite()) {
            return Err(SimulationError::NonFiniteState { time: *t });
        }
        trace.push(*t, y[0], y[1]);
    }

    debug!(
        "Adaptive integration ({:?}) finished with {} accepted steps",
        adaptive.method,
        trace.len() - 1
    );

    Ok(trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// With k_m >> S the rate law is nearly first-order,
    /// S(t) ~ S0 * exp(-v_max / k_m * t).
    #[test]
    fn test_first_order_limit() {
        let params = KineticParameters::new(1.0, 1e6);
        let setup = SimulationSetup {
            t1: 1e5,
            dt: 100.0,
            initial_substrate: 1.0,
            initial_product: 0.0,
        };
        let adaptive = AdaptiveSetup {
            dt: 100.0,
            max_step: 1000.0,
            ..Default::default()
        };

        let trace = integrate_adaptive(&adaptive, &setup, &params).unwrap();
        let expected = trace
            .time
            .iter()
            .map(|t| (-t / 1e6).exp())
            .collect::<Vec<_>>();

        for (s, e) in trace.substrate.iter().zip(expected.iter()) {
            assert_relative_eq!(*s, *e, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_conserves_mass() {
        let trace = integrate_adaptive(
            &AdaptiveSetup::default(),
            &SimulationSetup::default(),
            &KineticParameters::new(0.0596, 5.0),
        )
        .unwrap();

        assert!(trace.mass_balance_error() < 1e-10);
        assert!(trace.last().unwrap().0 >= 1400.0);
    }

    #[test]
    fn test_methods_agree() {
        let setup = SimulationSetup::default();
        let params = KineticParameters::new(0.0596, 5.0);
        let fine = AdaptiveSetup {
            dt: 1.0,
            max_step: 1.0,
            ..Default::default()
        };
        let dp45 = integrate_adaptive(&fine, &setup, &params).unwrap();
        let rkf45 = integrate_adaptive(
            &AdaptiveSetup {
                method: AdaptiveMethod::Rkf45,
                ..fine
            },
            &setup,
            &params,
        )
        .unwrap();

        // Interior times only, the two traces end at different points past t1
        let times = (0..=26).map(|k| k as f64 * 50.0).collect::<Vec<_>>();
        let lhs = dp45.substrate_at(&times);
        let rhs = rkf45.substrate_at(&times);
        for (a, b) in lhs.iter().zip(rhs.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_invalid_settings() {
        let adaptive = AdaptiveSetup {
            tol: 0.0,
            ..Default::default()
        };
        let result = integrate_adaptive(
            &adaptive,
            &SimulationSetup::default(),
            &KineticParameters::new(1.0, 1.0),
        );
        assert!(matches!(result, Err(SimulationError::InvalidSettings(_))));

        let adaptive = AdaptiveSetup {
            dt: -1.0,
            ..Default::default()
        };
        let result = integrate_adaptive(
            &adaptive,
            &SimulationSetup::default(),
            &KineticParameters::new(1.0, 1.0),
        );
        assert!(matches!(result, Err(SimulationError::InvalidStepError(_))));
    }

    #[test]
    fn test_method_deserialize() {
        let json = r#"{"dt": 1.0, "tol": 1e-6, "safety_factor": 0.9, "min_step": 1e-6, "max_step": 5.0, "max_step_iter": 50, "method": "rkf45"}"#;
        let adaptive: AdaptiveSetup = serde_json::from_str(json).unwrap();
        assert_eq!(adaptive.method, AdaptiveMethod::Rkf45);
    }
}
