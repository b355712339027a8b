//! Fixed-step explicit Euler integration of the mass balance.
//!
//! Starting from `(S0, P0)` at `t = 0`, each step advances
//!
//! ```text
//! S_{k+1} = S_k + dt * dS/dt(S_k)
//! P_{k+1} = P_k + dt * dP/dt(S_k)
//! ```
//!
//! until the current time reaches the stop time. Time points are computed as
//! `k * dt`, so long runs do not accumulate summation drift. The last time point
//! may exceed the stop time by less than one step when `dt` does not divide it.
//!
//! Explicit Euler does not keep the substrate non-negative. With a large step the
//! substrate can undershoot zero, which is reported through a warning but not
//! corrected.

use log::{debug, warn};

use crate::kinetics::KineticParameters;

use super::error::SimulationError;
use super::result::SimulationTrace;
use super::setup::{validate_span, SimulationSetup};
use super::system::derivatives;

/// Step count beyond which `k as f64` no longer represents every step index exactly.
const MAX_STEPS: f64 = 9_007_199_254_740_992.0;

/// Integrates the mass balance from `t = 0` to `stop_time` with step `step_size`.
///
/// # Arguments
///
/// * `initial_state` - `(substrate, product)` at `t = 0`
/// * `step_size` - Fixed step size, must be positive and finite
/// * `stop_time` - Time at which stepping stops, must be non-negative and finite
/// * `params` - Kinetic parameters of the rate law
///
/// # Returns
///
/// The trace of all visited states, the initial state included. A stop time of
/// `0` yields a trace with the initial state only.
///
/// # Errors
///
/// * `SimulationError::InvalidStepError` if the step size is not positive
/// * `SimulationError::InvalidStopTime` if the stop time is negative or not finite
/// * `SimulationError::TooManySteps` if reaching the stop time takes more than 2^53 steps
/// * `SimulationError::NonFiniteState` if a state becomes NaN or infinite
pub fn integrate(
    initial_state: (f64, f64),
    step_size: f64,
    stop_time: f64,
    params: &KineticParameters,
) -> Result<SimulationTrace, SimulationError> {
    validate_span(step_size, stop_time)?;

    let n_steps = (stop_time / step_size).ceil();
    if n_steps > MAX_STEPS {
        return Err(SimulationError::TooManySteps {
            step_size,
            stop_time,
        });
    }
    let mut trace = SimulationTrace::new(initial_state, (n_steps as usize).saturating_add(1));

    let (mut s, mut p) = initial_state;
    let mut k = 0_usize;
    let mut warned = false;

    while (k as f64) * step_size < stop_time {
        let (ds_dt, dp_dt) = derivatives(s, params);
        s += step_size * ds_dt;
        p += step_size * dp_dt;
        k += 1;

        let t = (k as f64) * step_size;
        if !(s.is_finite() && p.is_finite()) {
            return Err(SimulationError::NonFiniteState { time: t });
        }
        if s < 0.0 && !warned {
            warn!("Substrate dropped below zero at t = {t} (S = {s}); consider a smaller step size");
            warned = true;
        }

        trace.push(t, s, p);
    }

    debug!(
        "Euler integration finished after {k} steps (dt = {step_size}, t1 = {stop_time})"
    );

    Ok(trace)
}

/// Fixed-step Euler integrator for a configured [`SimulationSetup`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerIntegrator {
    pub setup: SimulationSetup,
}

impl EulerIntegrator {
    pub fn new(setup: SimulationSetup) -> Self {
        Self { setup }
    }

    /// Integrates the mass balance with the configured initial state, step size and
    /// stop time.
    pub fn integrate(&self, params: &KineticParameters) -> Result<SimulationTrace, SimulationError> {
        integrate(
            self.setup.initial_state(),
            self.setup.dt,
            self.setup.t1,
            params,
        )
    }
}

impl From<SimulationSetup> for EulerIntegrator {
    fn from(setup: SimulationSetup) -> Self {
        Self::new(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> KineticParameters {
        KineticParameters::new(0.0596, 5.0)
    }

    #[test]
    fn test_reference_scenario() {
        // Arrange
        let setup = SimulationSetup::default();

        // Act
        let trace = EulerIntegrator::new(setup).integrate(&params()).unwrap();

        // Assert
        assert_eq!(trace.len(), 141);
        let (t, s, p) = trace.last().unwrap();
        assert_eq!(t, 1400.0);
        assert_relative_eq!(s, 0.046824148013889184, max_relative = 1e-9);
        assert_relative_eq!(p, 49.953175851986124, max_relative = 1e-12);
        assert!(trace.mass_balance_error() < 1e-10);
    }

    #[test]
    fn test_first_step() {
        let trace = integrate((50.0, 0.0), 10.0, 10.0, &params()).unwrap();

        assert_eq!(trace.time, vec![0.0, 10.0]);
        assert_relative_eq!(trace.substrate[1], 49.45818181818182, epsilon = 1e-12);
        assert_relative_eq!(trace.product[1], 0.5418181818181818, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_stop_time() {
        let trace = integrate((50.0, 0.0), 10.0, 0.0, &params()).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.last(), Some((0.0, 50.0, 0.0)));
    }

    #[test]
    fn test_overshoot() {
        // dt does not divide t1, the last point lies within one step past t1
        let trace = integrate((50.0, 0.0), 3.0, 10.0, &params()).unwrap();
        assert_eq!(trace.time, vec![0.0, 3.0, 6.0, 9.0, 12.0]);
    }

    #[test]
    fn test_small_step_count() {
        let trace = integrate((1.0, 0.0), 0.1, 1.0, &params()).unwrap();
        assert_eq!(trace.len(), 11);
        assert_relative_eq!(trace.last().unwrap().0, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_monotone_and_deterministic() {
        let first = integrate((50.0, 0.0), 10.0, 1400.0, &params()).unwrap();
        let second = integrate((50.0, 0.0), 10.0, 1400.0, &params()).unwrap();
        assert_eq!(first, second);

        for window in first.substrate.windows(2) {
            assert!(window[1] <= window[0]);
        }
        for window in first.product.windows(2) {
            assert!(window[1] >= window[0]);
        }
    }

    #[test]
    fn test_invalid_step() {
        for dt in [0.0, -10.0, f64::NAN] {
            let result = integrate((50.0, 0.0), dt, 1400.0, &params());
            assert!(matches!(result, Err(SimulationError::InvalidStepError(_))));
        }
    }

    #[test]
    fn test_invalid_stop_time() {
        let result = integrate((50.0, 0.0), 1.0, -1.0, &params());
        assert!(matches!(result, Err(SimulationError::InvalidStopTime(_))));
    }

    #[test]
    fn test_vanishing_step_is_rejected() {
        let result = integrate((50.0, 0.0), 1e-300, 1.0, &params());
        assert!(matches!(
            result,
            Err(SimulationError::TooManySteps { step_size, .. }) if step_size == 1e-300
        ));
    }

    #[test]
    fn test_non_finite_state() {
        // k_m + S == 0 at the initial state
        let params = KineticParameters::new(1.0, -2.0);
        let result = integrate((2.0, 0.0), 1.0, 10.0, &params);
        assert!(matches!(
            result,
            Err(SimulationError::NonFiniteState { time }) if time == 1.0
        ));
    }

    #[test]
    fn test_large_step_undershoots() {
        let params = KineticParameters::new(10.0, 0.1);
        let trace = integrate((1.0, 0.0), 1.0, 2.0, &params).unwrap();
        assert!(trace.min_substrate() < 0.0);
        assert!(trace.mass_balance_error() < 1e-12);
    }
}
