//! Simulation Result Module
//!
//! This module provides the [`SimulationTrace`] produced by the integrators: three
//! equally long series of time, substrate and product. Traces are built by
//! appending one state per step and are not modified after the integration
//! returns.
//!
//! Traces can be compared with each other through linear interpolation, which is
//! how a fixed-step Euler trace is checked against the adaptive reference.

use serde::{Deserialize, Serialize};
use splines::{Interpolation, Key, Spline};

/// Upper bound on the number of time points reserved up front
const MAX_RESERVED_POINTS: usize = 1 << 20;

/// Time series of a mass-balance integration.
///
/// # Fields
///
/// * `time` - Time points, starting at `0`
/// * `substrate` - Substrate concentration at each time point
/// * `product` - Product concentration at each time point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationTrace {
    pub time: Vec<f64>,
    pub substrate: Vec<f64>,
    pub product: Vec<f64>,
}

impl SimulationTrace {
    /// Creates a trace holding only the initial state at `t = 0`.
    ///
    /// # Arguments
    ///
    /// * `initial_state` - `(substrate, product)` at `t = 0`
    /// * `capacity` - Expected number of time points, reserved up to a fixed bound
    pub fn new(initial_state: (f64, f64), capacity: usize) -> Self {
        let capacity = capacity.min(MAX_RESERVED_POINTS);
        let mut trace = Self {
            time: Vec::with_capacity(capacity),
            substrate: Vec::with_capacity(capacity),
            product: Vec::with_capacity(capacity),
        };
        trace.push(0.0, initial_state.0, initial_state.1);
        trace
    }

    pub(crate) fn push(&mut self, t: f64, substrate: f64, product: f64) {
        self.time.push(t);
        self.substrate.push(substrate);
        self.product.push(product);
    }

    /// Number of time points, including the initial state.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Returns the last recorded `(time, substrate, product)`.
    pub fn last(&self) -> Option<(f64, f64, f64)> {
        let i = self.len().checked_sub(1)?;
        Some((self.time[i], self.substrate[i], self.product[i]))
    }

    /// Total mass `S + P` at every time point.
    pub fn total_mass(&self) -> Vec<f64> {
        self.substrate
            .iter()
            .zip(self.product.iter())
            .map(|(s, p)| s + p)
            .collect()
    }

    /// Largest absolute deviation of `S + P` from its initial value.
    pub fn mass_balance_error(&self) -> f64 {
        let totals = self.total_mass();
        let Some(initial) = totals.first().copied() else {
            return 0.0;
        };
        totals
            .iter()
            .fold(0.0_f64, |acc, total| acc.max((total - initial).abs()))
    }

    /// Smallest substrate concentration of the trace.
    pub fn min_substrate(&self) -> f64 {
        self.substrate.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Samples the substrate series at arbitrary times by linear interpolation.
    ///
    /// Times outside the trace are clamped to the first or last value.
    pub fn substrate_at(&self, query_times: &[f64]) -> Vec<f64> {
        let spline = linear_spline(&self.time, &self.substrate);
        query_times
            .iter()
            .map(|t| spline.clamped_sample(*t).unwrap_or(f64::NAN))
            .collect()
    }

    /// Largest absolute substrate difference between this trace and `reference`,
    /// evaluated at the time points of this trace.
    ///
    /// The reference is linearly interpolated between its own time points and
    /// clamped past its ends, so the result includes that interpolation error.
    /// A coarse reference, or one whose last point overshoots this trace's end,
    /// inflates the deviation even when both traces solve the same problem
    /// accurately.
    pub fn max_deviation(&self, reference: &SimulationTrace) -> f64 {
        reference
            .substrate_at(&self.time)
            .iter()
            .zip(self.substrate.iter())
            .fold(0.0_f64, |acc, (r, s)| acc.max((r - s).abs()))
    }
}

/// Creates a linear spline through the points `(times[i], values[i])`.
fn linear_spline(times: &[f64], values: &[f64]) -> Spline<f64, f64> {
    let keys = times
        .iter()
        .zip(values.iter())
        .map(|(t, v)| Key::new(*t, *v, Interpolation::Linear))
        .collect();
    Spline::from_vec(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn trace() -> SimulationTrace {
        let mut trace = SimulationTrace::new((10.0, 0.0), 3);
        trace.push(1.0, 6.0, 4.0);
        trace.push(2.0, 2.0, 8.0);
        trace
    }

    #[test]
    fn test_new_trace_holds_initial_state() {
        let trace = SimulationTrace::new((50.0, 1.0), 1);
        assert_eq!(
            trace,
            SimulationTrace {
                time: vec![0.0],
                substrate: vec![50.0],
                product: vec![1.0],
            }
        );
        assert_eq!(trace.last(), Some((0.0, 50.0, 1.0)));
    }

    #[test]
    fn test_reservation_is_bounded() {
        let trace = SimulationTrace::new((1.0, 0.0), usize::MAX);
        assert!(trace.time.capacity() <= MAX_RESERVED_POINTS);
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_mass_balance_error() {
        let trace = trace();
        assert_eq!(trace.total_mass(), vec![10.0, 10.0, 10.0]);
        assert_relative_eq!(trace.mass_balance_error(), 0.0);
        assert_eq!(trace.min_substrate(), 2.0);
    }

    #[test]
    fn test_substrate_interpolation() {
        let trace = trace();
        let sampled = trace.substrate_at(&[0.5, 1.5, 5.0]);
        assert_relative_eq!(sampled[0], 8.0, epsilon = 1e-12);
        assert_relative_eq!(sampled[1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(sampled[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_deviation() {
        let reference = trace();
        let mut other = SimulationTrace::new((10.0, 0.0), 2);
        other.push(1.0, 5.0, 5.0);
        assert_relative_eq!(other.max_deviation(&reference), 1.0, epsilon = 1e-12);
        assert_relative_eq!(reference.max_deviation(&reference), 0.0, epsilon = 1e-12);
    }
}
