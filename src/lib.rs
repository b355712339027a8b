//! enzkin Rust Library
//!
//! This library provides the numeric core of Michaelis-Menten enzyme kinetics, including:
//! - Evaluating the Michaelis-Menten rate law
//! - Fitting kinetic parameters to velocity measurements by nonlinear least squares
//! - Integrating the enzymatic mass balance with a fixed-step Euler scheme
//! - Integrating the same system with an adaptive reference solver

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::data::*;
    pub use crate::kinetics::*;

    #[cfg(feature = "simulation")]
    pub use crate::simulation::adaptive::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::error::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::euler::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::result::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::setup::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::system::*;

    #[cfg(feature = "optimization")]
    pub use crate::optim::*;
}

/// Michaelis-Menten rate law and kinetic parameters
pub mod kinetics;

/// Observation sets used as fitting input
pub mod data;

/// Simulation of the enzymatic mass balance
#[cfg(feature = "simulation")]
pub mod simulation {
    pub use crate::simulation::setup::SimulationSetup;
    pub use peroxide::fuga::{DP45, RKF45};

    /// Adaptive reference integration
    pub mod adaptive;
    /// Error types for simulation failures
    pub mod error;
    /// Fixed-step explicit Euler integration
    pub mod euler;
    /// Simulation trace data structures
    pub mod result;
    /// Simulation setup and configuration
    pub mod setup;
    /// Mass-balance derivative evaluation
    pub mod system;
}

#[cfg(feature = "optimization")]
pub mod optim {
    pub use crate::optim::error::*;
    pub use crate::optim::model::*;
    pub use crate::optim::optimizers::*;
    pub use crate::optim::problem::*;
    pub use crate::optim::report::*;
    pub use argmin::core::CostFunction;
    pub use argmin::core::Gradient;
    use argmin_math as _;

    pub mod error;
    pub mod metrics;
    pub mod model;
    pub mod problem;
    pub mod report;

    pub mod optimizers {
        pub use crate::optim::optimizers::lbfgs::*;
        pub use crate::optim::optimizers::levenberg_marquardt::*;
        pub use crate::optim::optimizers::optimizer::*;
        pub mod lbfgs;
        pub mod levenberg_marquardt;
        pub mod optimizer;
    }
}

/// Plain-text tables for fit reports and simulation traces
pub mod info;
