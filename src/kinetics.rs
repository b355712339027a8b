//! Michaelis-Menten Kinetics Module
//!
//! This module provides the rate law shared by the fitting and the simulation
//! parts of the crate:
//!
//! - [`velocity`]: the Michaelis-Menten rate law `v_max * s / (k_m + s)`
//! - [`KineticParameters`]: the `(v_max, k_m)` pair passed explicitly to every
//!   consumer of the rate law
//! - [`MichaelisMenten`]: a model type that evaluates the rate law from a
//!   parameter vector ordered `[v_max, k_m]`
//!
//! The rate law performs no validation. When `k_m + s == 0` the result is not
//! finite; the fitter and the integrators detect this and report an error.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Evaluates the Michaelis-Menten rate law.
///
/// # Arguments
///
/// * `s` - Substrate concentration
/// * `v_max` - Maximum reaction velocity
/// * `k_m` - Half-saturation constant
///
/// # Returns
///
/// The reaction velocity `v_max * s / (k_m + s)`. Non-finite if `k_m + s == 0`.
pub fn velocity(s: f64, v_max: f64, k_m: f64) -> f64 {
    v_max * s / (k_m + s)
}

/// Kinetic constants of a single Michaelis-Menten reaction
///
/// # Examples
///
/// ```
/// use enzkin::prelude::KineticParametersBuilder;
///
/// let params = KineticParametersBuilder::default()
///     .v_max(0.0596)
///     .k_m(5.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(params.velocity(0.0), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Builder, Serialize, Deserialize)]
pub struct KineticParameters {
    /// Maximum reaction velocity
    pub v_max: f64,
    /// Half-saturation (Michaelis) constant
    pub k_m: f64,
}

impl KineticParameters {
    pub fn new(v_max: f64, k_m: f64) -> Self {
        Self { v_max, k_m }
    }

    /// Evaluates the rate law at substrate concentration `s`.
    pub fn velocity(&self, s: f64) -> f64 {
        velocity(s, self.v_max, self.k_m)
    }

    /// Returns the parameters in the `[v_max, k_m]` order used by [`MichaelisMenten`].
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.v_max, self.k_m]
    }
}

impl TryFrom<&[f64]> for KineticParameters {
    type Error = usize;

    /// Builds parameters from a `[v_max, k_m]` slice. The error carries the
    /// length of a slice that does not hold exactly two values.
    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        match values {
            [v_max, k_m] => Ok(Self::new(*v_max, *k_m)),
            _ => Err(values.len()),
        }
    }
}

/// The Michaelis-Menten model with the parameter order `[v_max, k_m]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MichaelisMenten;

impl MichaelisMenten {
    /// Number of free parameters of the model
    pub const N_PARAMS: usize = 2;

    /// Evaluates the fitted curve over a set of concentrations.
    ///
    /// # Arguments
    ///
    /// * `params` - Kinetic parameters to evaluate with
    /// * `xs` - Substrate concentrations
    ///
    /// # Returns
    ///
    /// The velocities at each concentration, in input order
    pub fn curve(&self, params: &KineticParameters, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|s| params.velocity(*s)).collect()
    }
}
