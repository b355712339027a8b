//! Tests for the simulation module.
//!
//! This module contains tests for the integration of the enzymatic mass balance:
//! - The fixed-step Euler scheme on the reference scenario
//! - Conservation of total mass and monotone substrate consumption
//! - Convergence of Euler towards the adaptive reference as the step shrinks
//! - Invalid step sizes and other failure cases

#[cfg(test)]
mod test_simulation {
    use approx::assert_relative_eq;
    use enzkin::prelude::*;

    fn reference_params() -> KineticParameters {
        KineticParameters::new(0.0596, 5.0)
    }

    #[test]
    fn test_reference_scenario() {
        // ARRANGE
        let setup = SimulationSetupBuilder::default()
            .t1(1400.0)
            .dt(10.0)
            .initial_substrate(50.0)
            .initial_product(0.0)
            .build()
            .expect("Failed to build setup");

        // ACT
        let trace = EulerIntegrator::new(setup)
            .integrate(&reference_params())
            .expect("Failed to integrate");

        // ASSERT
        assert_eq!(trace.len(), 141);
        assert_eq!(trace.time[0], 0.0);
        assert_eq!(trace.time[140], 1400.0);
        assert_relative_eq!(trace.substrate[1], 49.45818181818182, epsilon = 1e-12);
        assert_relative_eq!(trace.product[1], 0.5418181818181818, epsilon = 1e-12);

        let (_, s, p) = trace.last().unwrap();
        assert!(s < 0.1);
        assert_relative_eq!(s + p, 50.0, epsilon = 1e-10);
    }

    #[test]
    fn test_conservation_and_monotonicity() {
        // ARRANGE
        let params = KineticParameters::new(1.5, 0.3);

        // ACT
        let trace = integrate((20.0, 5.0), 0.05, 30.0, &params).expect("Failed to integrate");

        // ASSERT
        assert!(trace.mass_balance_error() < 1e-10);
        for window in trace.substrate.windows(2) {
            assert!(window[1] <= window[0]);
        }
        assert!(trace.min_substrate() >= 0.0);
    }

    #[test]
    fn test_time_grid() {
        let trace = integrate((1.0, 0.0), 0.1, 1.0, &reference_params()).unwrap();

        assert_eq!(trace.len(), 11);
        for (k, t) in trace.time.iter().enumerate() {
            assert_eq!(*t, k as f64 * 0.1);
        }
    }

    #[test]
    fn test_zero_stop_time() {
        let trace = integrate((50.0, 0.0), 10.0, 0.0, &reference_params()).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.substrate, vec![50.0]);
        assert_eq!(trace.product, vec![0.0]);
    }

    #[test]
    fn test_invalid_step() {
        for dt in [0.0, -10.0] {
            let result = integrate((50.0, 0.0), dt, 1400.0, &reference_params());
            assert!(matches!(result, Err(SimulationError::InvalidStepError(_))));
        }
    }

    #[test]
    fn test_deterministic() {
        let setup = SimulationSetup::default();
        let first = EulerIntegrator::new(setup)
            .integrate(&reference_params())
            .unwrap();
        let second = EulerIntegrator::new(setup)
            .integrate(&reference_params())
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_euler_converges_to_adaptive_reference() {
        // ARRANGE
        let params = reference_params();
        let adaptive = AdaptiveSetup {
            dt: 1.0,
            max_step: 1.0,
            ..Default::default()
        };
        let reference =
            integrate_adaptive(&adaptive, &SimulationSetup::default(), &params).unwrap();

        // ACT
        let deviations = [10.0, 1.0, 0.1]
            .iter()
            .map(|dt| {
                let setup = SimulationSetup {
                    dt: *dt,
                    ..Default::default()
                };
                EulerIntegrator::new(setup)
                    .integrate(&params)
                    .unwrap()
                    .max_deviation(&reference)
            })
            .collect::<Vec<_>>();

        // ASSERT
        assert!(deviations[0] < 1.0);
        assert!(deviations[1] < deviations[0]);
        assert!(deviations[2] < deviations[1]);
    }

    #[test]
    fn test_adaptive_matches_derivatives_at_start() {
        // ARRANGE
        let params = reference_params();
        let setup = SimulationSetup {
            t1: 1e-3,
            ..Default::default()
        };
        let adaptive = AdaptiveSetup {
            dt: 1e-3,
            ..Default::default()
        };

        // ACT
        let trace = integrate_adaptive(&adaptive, &setup, &params).unwrap();

        // ASSERT
        let (ds_dt, _) = derivatives(50.0, &params);
        let (t, s, _) = trace.last().unwrap();
        assert_relative_eq!((s - 50.0) / t, ds_dt, max_relative = 1e-4);
    }
}
