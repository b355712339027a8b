//! Observation Set Module
//!
//! This module holds the measured `(concentration, velocity)` pairs that the
//! fitter consumes. An [`ObservationSet`] is validated once on construction and
//! is immutable afterwards.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Substrate concentrations of the reference initial-rate experiment
pub const REFERENCE_CONCENTRATIONS: [f64; 12] = [
    0.8, 1.6, 3.2, 6.4, 12.8, 25.6, 51.2, 102.4, 204.8, 409.6, 819.2, 1638.4,
];

/// Initial velocities of the reference initial-rate experiment
pub const REFERENCE_VELOCITIES: [f64; 12] = [
    15.446, 32.059, 53.654, 77.778, 188.276, 349.091, 567.805, 707.368, 970.787, 1430.588,
    1339.217, 1644.693,
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Concentrations and velocities differ in length ({xs} vs {ys})")]
    ShapeError { xs: usize, ys: usize },
    #[error("Observation set contains no data points")]
    EmptyObservations,
}

/// Ordered pairs of substrate concentration and measured velocity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservations", into = "RawObservations")]
pub struct ObservationSet {
    concentrations: Array1<f64>,
    velocities: Array1<f64>,
}

impl ObservationSet {
    /// Creates a new observation set.
    ///
    /// # Arguments
    ///
    /// * `concentrations` - Substrate concentrations
    /// * `velocities` - Velocities measured at each concentration
    ///
    /// # Errors
    ///
    /// * `DataError::ShapeError` if both sequences differ in length
    /// * `DataError::EmptyObservations` if there is no data point
    pub fn new(
        concentrations: impl Into<Array1<f64>>,
        velocities: impl Into<Array1<f64>>,
    ) -> Result<Self, DataError> {
        let concentrations = concentrations.into();
        let velocities = velocities.into();

        if concentrations.len() != velocities.len() {
            return Err(DataError::ShapeError {
                xs: concentrations.len(),
                ys: velocities.len(),
            });
        }

        if concentrations.is_empty() {
            return Err(DataError::EmptyObservations);
        }

        Ok(Self {
            concentrations,
            velocities,
        })
    }

    /// Returns the reference dataset of twelve initial-rate measurements.
    pub fn reference() -> Self {
        Self {
            concentrations: Array1::from_vec(REFERENCE_CONCENTRATIONS.to_vec()),
            velocities: Array1::from_vec(REFERENCE_VELOCITIES.to_vec()),
        }
    }

    pub fn concentrations(&self) -> &Array1<f64> {
        &self.concentrations
    }

    pub fn velocities(&self) -> &Array1<f64> {
        &self.velocities
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.concentrations.len()
    }

    /// Iterates over `(concentration, velocity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.concentrations
            .iter()
            .zip(self.velocities.iter())
            .map(|(x, y)| (*x, *y))
    }

    /// Whether every concentration is strictly positive, which keeps the
    /// Michaelis-Menten denominator away from zero for positive `k_m`.
    pub fn has_positive_concentrations(&self) -> bool {
        self.concentrations.iter().all(|x| *x > 0.0)
    }
}

/// Serialized form of an observation set
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawObservations {
    concentrations: Vec<f64>,
    velocities: Vec<f64>,
}

impl TryFrom<RawObservations> for ObservationSet {
    type Error = DataError;

    fn try_from(raw: RawObservations) -> Result<Self, Self::Error> {
        ObservationSet::new(raw.concentrations, raw.velocities)
    }
}

impl From<ObservationSet> for RawObservations {
    fn from(set: ObservationSet) -> Self {
        RawObservations {
            concentrations: set.concentrations.to_vec(),
            velocities: set.velocities.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch() {
        let result = ObservationSet::new(vec![1.0, 2.0], vec![1.0]);
        assert_eq!(result, Err(DataError::ShapeError { xs: 2, ys: 1 }));
    }

    #[test]
    fn test_empty() {
        let result = ObservationSet::new(Vec::<f64>::new(), Vec::<f64>::new());
        assert_eq!(result, Err(DataError::EmptyObservations));
    }

    #[test]
    fn test_reference_dataset() {
        let set = ObservationSet::reference();
        assert_eq!(set.len(), 12);
        assert!(set.has_positive_concentrations());
        assert_eq!(set.iter().next(), Some((0.8, 15.446)));
        assert_eq!(set.iter().last(), Some((1638.4, 1644.693)));
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let json = r#"{"concentrations": [1.0, 2.0], "velocities": [0.5]}"#;
        assert!(serde_json::from_str::<ObservationSet>(json).is_err());

        let json = r#"{"concentrations": [1.0, 2.0], "velocities": [0.5, 0.7]}"#;
        let set: ObservationSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.velocities().to_vec(), vec![0.5, 0.7]);
    }

    #[test]
    fn test_non_positive_concentrations_are_reported() {
        let set = ObservationSet::new(vec![0.0, 1.0], vec![0.0, 1.0]).unwrap();
        assert!(!set.has_positive_concentrations());
    }
}
