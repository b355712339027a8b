//! Simulation Error Module
//!
//! This module provides the error type of the mass-balance integrators.
//!
//! # Key Error Types
//!
//! The [`SimulationError`] enum covers the failure points of an integration:
//! - Invalid step sizes and stop times, including spans with too many steps
//! - Non-finite states, e.g. from a vanishing rate-law denominator
//! - Failures reported by the adaptive ODE solver

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Step size must be positive and finite, got {0}")]
    InvalidStepError(f64),
    #[error("Stop time must be non-negative and finite, got {0}")]
    InvalidStopTime(f64),
    #[error("Step size {step_size} needs more than 2^53 steps to reach t = {stop_time}")]
    TooManySteps { step_size: f64, stop_time: f64 },
    #[error("State became non-finite at t = {time}")]
    NonFiniteState { time: f64 },
    #[error("Invalid adaptive solver settings: {0}")]
    InvalidSettings(String),
    #[error("Error during ODE integration: {0}")]
    IntegrationError(#[from] argmin_math::Error),
}
