//! Information display module
//!
//! This module renders observation sets, fit reports and simulation traces as
//! plain-text tables by implementing `Display` on top of `tabled`.

use std::fmt::{self, Display};

use tabled::{builder::Builder, settings::Style};

use crate::data::ObservationSet;
use crate::kinetics::KineticParameters;

/// Trait for converting rows of a result to table records
trait TableRecord {
    /// Column headers of the table
    fn columns() -> Vec<String>;

    /// Cell values of one row, in column order
    fn to_record(&self) -> Vec<String>;
}

/// Converts a collection of TableRecord implementors to a formatted table string
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Wraps titled sections into one outer table.
fn sections(title: &str, parts: Vec<(&str, String)>) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec![title]);

    for (heading, content) in parts {
        builder.push_record(vec![heading.to_string()]);
        builder.push_record(vec![content]);
    }

    let mut table = builder.build();
    table.with(Style::sharp());
    table.to_string()
}

impl TableRecord for (f64, f64) {
    fn columns() -> Vec<String> {
        vec!["Substrate".to_string(), "Velocity".to_string()]
    }

    fn to_record(&self) -> Vec<String> {
        vec![self.0.to_string(), self.1.to_string()]
    }
}

impl Display for ObservationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.iter().collect::<Vec<_>>();
        write!(f, "{}", to_table(&rows))
    }
}

impl Display for KineticParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v_max = {}, k_m = {}", self.v_max, self.k_m)
    }
}

#[cfg(feature = "optimization")]
mod fit {
    use super::*;
    use crate::optim::FitReport;

    /// One fitted parameter with its standard error
    struct ParameterRow {
        name: String,
        value: f64,
        std_error: Option<f64>,
    }

    impl TableRecord for ParameterRow {
        fn columns() -> Vec<String> {
            vec![
                "Parameter".to_string(),
                "Value".to_string(),
                "Std. Error".to_string(),
            ]
        }

        fn to_record(&self) -> Vec<String> {
            vec![
                self.name.clone(),
                format!("{:.6}", self.value),
                self.std_error
                    .map(|e| format!("{e:.6}"))
                    .unwrap_or("-".to_string()),
            ]
        }
    }

    /// Parameter names in model order; `v_max` and `k_m` for two-parameter fits
    fn parameter_names(n_params: usize) -> Vec<String> {
        if n_params == 2 {
            vec!["v_max".to_string(), "k_m".to_string()]
        } else {
            (0..n_params).map(|i| format!("p{i}")).collect()
        }
    }

    impl Display for FitReport {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let rows = parameter_names(self.params.len())
                .into_iter()
                .enumerate()
                .map(|(i, name)| ParameterRow {
                    name,
                    value: self.params[i],
                    std_error: self.standard_errors.as_ref().map(|se| se[i]),
                })
                .collect::<Vec<_>>();

            let mut metrics = Builder::default();
            metrics.push_record(vec!["Metric", "Value"]);
            metrics.push_record(vec!["SSE".to_string(), format!("{:.6}", self.sse)]);
            metrics.push_record(vec!["RMSE".to_string(), format!("{:.6}", self.rmse)]);
            metrics.push_record(vec!["MAE".to_string(), format!("{:.6}", self.mae)]);
            metrics.push_record(vec!["R²".to_string(), format!("{:.6}", self.r_squared)]);
            metrics.push_record(vec!["AIC".to_string(), format!("{:.4}", self.aic)]);
            metrics.push_record(vec!["BIC".to_string(), format!("{:.4}", self.bic)]);
            metrics.push_record(vec!["Iterations".to_string(), self.iterations.to_string()]);
            metrics.push_record(vec![
                "Termination".to_string(),
                format!("{:?}", self.termination),
            ]);
            let mut metrics = metrics.build();
            metrics.with(Style::rounded());

            let table = sections(
                "Fit Report",
                vec![
                    ("Parameters", to_table(&rows)),
                    ("Metrics", metrics.to_string()),
                ],
            );
            write!(f, "{table}")
        }
    }

}

#[cfg(feature = "simulation")]
mod trace {
    use super::*;
    use crate::simulation::result::SimulationTrace;

    struct TraceRow(f64, f64, f64);

    impl TableRecord for TraceRow {
        fn columns() -> Vec<String> {
            vec![
                "Time".to_string(),
                "Substrate".to_string(),
                "Product".to_string(),
            ]
        }

        fn to_record(&self) -> Vec<String> {
            vec![
                self.0.to_string(),
                format!("{:.6}", self.1),
                format!("{:.6}", self.2),
            ]
        }
    }

    impl Display for SimulationTrace {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let rows = self
                .time
                .iter()
                .zip(self.substrate.iter())
                .zip(self.product.iter())
                .map(|((t, s), p)| TraceRow(*t, *s, *p))
                .collect::<Vec<_>>();

            write!(f, "{}", to_table(&rows))
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_table() {
        let observations = ObservationSet::new(vec![1.0, 2.0], vec![0.5, 0.75]).unwrap();
        let table = observations.to_string();

        assert!(table.contains("Substrate"));
        assert!(table.contains("0.75"));
    }

    #[test]
    fn test_parameter_display() {
        let params = KineticParameters::new(2.0, 0.5);
        assert_eq!(params.to_string(), "v_max = 2, k_m = 0.5");
    }
}
