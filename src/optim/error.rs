use thiserror::Error;

use crate::data::DataError;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("Error optimizing")]
    ArgMinError(argmin::core::Error),
    #[error("Concentrations and velocities differ in length ({xs} vs {ys})")]
    ShapeError { xs: usize, ys: usize },
    #[error("Invalid observations: {0}")]
    Data(DataError),
    #[error("Initial guess array has wrong length")]
    InitialGuessLengthError { expected: usize, found: usize },
    #[error("Problem did not converge within {iterations} iterations (cost {cost})")]
    ConvergenceError { iterations: u64, cost: f64 },
    #[error("Model produced a non-finite residual at data point {index}")]
    NonFiniteResidual { index: usize },
    #[error("Normal equations are singular or not finite")]
    SingularSystem,
}

impl From<DataError> for OptimizeError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::ShapeError { xs, ys } => OptimizeError::ShapeError { xs, ys },
            other => OptimizeError::Data(other),
        }
    }
}
