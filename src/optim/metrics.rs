use ndarray::Array1;

/// Calculates the sum of squared errors (SSE) between predicted and actual values.
///
/// SSE = Σ(y_pred - y_actual)²
///
/// # Arguments
/// * `residuals` - Residuals (differences between predicted and actual values)
///
/// # Returns
/// * `f64` - Sum of squared errors
pub fn sum_of_squared_errors(residuals: &Array1<f64>) -> f64 {
    residuals.mapv(|x| x * x).sum()
}

/// Calculates Mean Squared Error (MSE), a measure of prediction accuracy that penalizes larger errors more heavily.
///
/// MSE = (1/n) * Σ(y_pred - y_actual)²
///
/// # Arguments
/// * `residuals` - Residuals (differences between predicted and actual values)
///
/// # Returns
/// * `f64` - Mean squared error value
pub fn mean_squared_error(residuals: &Array1<f64>) -> f64 {
    sum_of_squared_errors(residuals) / residuals.len() as f64
}

/// Calculates Root Mean Squared Error (RMSE), the square root of MSE.
/// Like MSE, lower values indicate better fit, but RMSE is in the same units as the original data.
pub fn root_mean_squared_error(residuals: &Array1<f64>) -> f64 {
    mean_squared_error(residuals).sqrt()
}

/// Calculates Mean Absolute Error (MAE).
///
/// MAE = (1/n) * Σ|y_pred - y_actual|
pub fn mean_absolute_error(residuals: &Array1<f64>) -> f64 {
    residuals.mapv(|x| x.abs()).sum() / residuals.len() as f64
}

/// Calculates the coefficient of determination R² of a fit.
///
/// R² = 1 - SSE / SST, where SST is the total sum of squares of the observations
/// around their mean.
///
/// # Arguments
/// * `residuals` - Residuals of the fit
/// * `observed` - Observed values
pub fn coefficient_of_determination(residuals: &Array1<f64>, observed: &Array1<f64>) -> f64 {
    let mean = observed.sum() / observed.len() as f64;
    let sst = observed.mapv(|y| (y - mean) * (y - mean)).sum();
    1.0 - sum_of_squared_errors(residuals) / sst
}

/// Calculates Akaike Information Criterion (AIC), a measure of model quality that balances
/// goodness of fit against model complexity. Lower values indicate better models.
///
/// AIC = n * ln(SSE/n) + 2k
/// where:
/// - n is the number of data points
/// - SSE is the sum of squared errors
/// - k is the number of model parameters
///
/// # Arguments
/// * `residuals` - Residuals (differences between predicted and actual values)
/// * `num_parameters` - Number of parameters in the model (model complexity)
///
/// # Returns
/// * `f64` - AIC value
pub fn akaike_information_criterion(residuals: &Array1<f64>, num_parameters: usize) -> f64 {
    let num_samples = residuals.len() as f64;
    let sse = sum_of_squared_errors(residuals);
    num_samples * (sse / num_samples).ln() + 2.0 * num_parameters as f64
}

/// Calculates Bayesian Information Criterion (BIC), similar to AIC but with a stronger penalty
/// for model complexity. Lower values indicate better models.
///
/// BIC = n * ln(SSE/n) + k * ln(n)
pub fn bayesian_information_criterion(residuals: &Array1<f64>, num_parameters: usize) -> f64 {
    let num_samples = residuals.len() as f64;
    let sse = sum_of_squared_errors(residuals);
    num_samples * (sse / num_samples).ln() + num_parameters as f64 * num_samples.ln()
}
