//! Mass-balance system of a single Michaelis-Menten reaction `S -> P`.
//!
//! ```text
//! dS/dt = -v_max * S / (k_m + S)
//! dP/dt = -dS/dt
//! ```
//!
//! The derivatives sum to zero identically, so `S + P` is conserved.

use peroxide::fuga::ODEProblem;

use crate::kinetics::{velocity, KineticParameters};

/// Evaluates the mass-balance derivatives at substrate concentration `s`.
///
/// # Returns
///
/// `(dS_dt, dP_dt)`, non-finite if `k_m + s == 0`
pub fn derivatives(s: f64, params: &KineticParameters) -> (f64, f64) {
    let ds_dt = -velocity(s, params.v_max, params.k_m);
    (ds_dt, -ds_dt)
}

/// The mass balance as an ODE system with state `[S, P]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassBalance {
    pub params: KineticParameters,
}

impl MassBalance {
    pub fn new(params: KineticParameters) -> Self {
        Self { params }
    }

    /// Evaluates `(dS_dt, dP_dt)` at substrate concentration `s`.
    pub fn derivatives(&self, s: f64) -> (f64, f64) {
        derivatives(s, &self.params)
    }
}

impl ODEProblem for MassBalance {
    fn rhs(&self, t: f64, y: &[f64], dy: &mut [f64]) -> Result<(), argmin_math::Error> {
        let (ds_dt, dp_dt) = self.derivatives(y[0]);
        if !(ds_dt.is_finite() && dp_dt.is_finite()) {
            return Err(argmin_math::Error::msg(format!(
                "non-finite derivative at t = {t}, S = {}",
                y[0]
            )));
        }

        dy[0] = ds_dt;
        dy[1] = dp_dt;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservation() {
        let params = KineticParameters::new(0.0596, 5.0);
        for s in [0.0, 0.1, 5.0, 50.0, 1e6] {
            let (ds, dp) = derivatives(s, &params);
            assert_eq!(ds + dp, 0.0);
            assert!(ds <= 0.0);
        }
    }

    #[test]
    fn test_rhs_matches_derivatives() {
        let system = MassBalance::new(KineticParameters::new(2.0, 1.0));
        let mut dy = [0.0; 2];
        system.rhs(0.0, &[1.0, 0.0], &mut dy).unwrap();
        assert_eq!(dy, [-1.0, 1.0]);
    }

    #[test]
    fn test_rhs_rejects_vanishing_denominator() {
        let system = MassBalance::new(KineticParameters::new(2.0, -1.0));
        let mut dy = [0.0; 2];
        assert!(system.rhs(0.0, &[1.0, 0.0], &mut dy).is_err());
    }
}
