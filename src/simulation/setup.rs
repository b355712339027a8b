//! Setup module for configuring mass-balance simulations.
//!
//! This module provides the [`SimulationSetup`] struct and its builder for configuring
//! the fixed-step integration of the enzymatic mass balance. It handles:
//!
//! - The initial substrate and product concentrations
//! - The stop time of the integration
//! - The integration step size

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Configuration for the fixed-step integration of the mass balance
///
/// Integration always starts at `t = 0`.
///
/// # Fields
///
/// * `t1` - Stop time of the simulation (default: 1400.0)
/// * `dt` - Time step size (default: 10.0)
/// * `initial_substrate` - Substrate concentration at `t = 0` (default: 50.0)
/// * `initial_product` - Product concentration at `t = 0` (default: 0.0)
///
/// # Examples
///
/// ```
/// use enzkin::prelude::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t1(100.0)
///     .dt(0.5)
///     .initial_substrate(10.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.initial_product, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
pub struct SimulationSetup {
    #[builder(default = "1400.0")]
    pub t1: f64,
    #[builder(default = "10.0")]
    pub dt: f64,
    #[builder(default = "50.0")]
    pub initial_substrate: f64,
    #[builder(default = "0.0")]
    pub initial_product: f64,
}

impl SimulationSetup {
    /// Returns the initial state as `(substrate, product)`.
    pub fn initial_state(&self) -> (f64, f64) {
        (self.initial_substrate, self.initial_product)
    }

    /// Checks that the step size and stop time describe a terminating integration.
    ///
    /// # Errors
    ///
    /// * `SimulationError::InvalidStepError` if `dt` is not positive and finite
    /// * `SimulationError::InvalidStopTime` if `t1` is negative or not finite
    pub fn validate(&self) -> Result<(), SimulationError> {
        validate_span(self.dt, self.t1)
    }
}

impl Default for SimulationSetup {
    fn default() -> Self {
        Self {
            t1: 1400.0,
            dt: 10.0,
            initial_substrate: 50.0,
            initial_product: 0.0,
        }
    }
}

/// Checks step size and stop time of an integration starting at `t = 0`.
pub(crate) fn validate_span(step_size: f64, stop_time: f64) -> Result<(), SimulationError> {
    if !(step_size > 0.0 && step_size.is_finite()) {
        return Err(SimulationError::InvalidStepError(step_size));
    }
    if !(stop_time >= 0.0 && stop_time.is_finite()) {
        return Err(SimulationError::InvalidStopTime(stop_time));
    }
    Ok(())
}
