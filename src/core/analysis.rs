//! Return-series statistics: beta, volatility ratio, and move projection.
//!
//! All functions here are pure and synchronous. Statistics use the sample
//! convention (N−1 denominators) and returns are simple period-over-period
//! fractions; both choices are fixed so results are reproducible across
//! runs and comparable between coins.

use crate::core::error::AnalysisError;
use crate::core::series::PriceSeries;

/// Beta and volatility ratio of one target asset against a reference asset,
/// computed over a single pair of aligned return series.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaResult {
    pub beta: f64,
    pub volatility_ratio: f64,
    pub reference_symbol: String,
    pub target_symbol: String,
}

/// A hypothetical reference-asset move mapped through a beta coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveProjection {
    pub input_move_pct: f64,
    pub projected_move_pct: f64,
}

/// Derives fractional period-over-period returns from a price history.
///
/// Each adjacent pair `(p[i-1], p[i])` yields `(p[i] - p[i-1]) / p[i-1]`,
/// so a series of N prices produces N−1 returns.
pub fn compute_returns(series: &PriceSeries) -> Result<Vec<f64>, AnalysisError> {
    if series.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            got: series.len(),
        });
    }
    Ok(series
        .points()
        .windows(2)
        .map(|w| (w[1].price - w[0].price) / w[0].price)
        .collect())
}

/// Beta of the target returns against the reference returns:
/// sample covariance(target, reference) / sample variance(reference).
///
/// Both series must have the same length of at least two observations. A
/// reference series with zero variance (the asset did not move over the
/// window) has no defined beta and fails rather than returning infinity.
pub fn compute_beta(
    reference_returns: &[f64],
    target_returns: &[f64],
) -> Result<f64, AnalysisError> {
    check_aligned(reference_returns, target_returns)?;

    let reference_variance = sample_variance(reference_returns);
    if reference_variance == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    Ok(sample_covariance(target_returns, reference_returns) / reference_variance)
}

/// Ratio of sample standard deviations: stddev(target) / stddev(reference).
///
/// Describes relative magnitude of movement independent of direction. Same
/// alignment and zero-variance guards as [`compute_beta`].
pub fn compute_volatility_ratio(
    reference_returns: &[f64],
    target_returns: &[f64],
) -> Result<f64, AnalysisError> {
    check_aligned(reference_returns, target_returns)?;

    let reference_variance = sample_variance(reference_returns);
    if reference_variance == 0.0 {
        return Err(AnalysisError::ZeroVariance);
    }

    Ok((sample_variance(target_returns) / reference_variance).sqrt())
}

/// Projects a reference-asset percentage move onto the target asset:
/// `beta * reference_move_pct`.
pub fn project_move(beta: f64, reference_move_pct: f64) -> Result<f64, AnalysisError> {
    if !beta.is_finite() {
        return Err(AnalysisError::invalid_input(format!(
            "beta must be finite, got {beta}"
        )));
    }
    if !reference_move_pct.is_finite() {
        return Err(AnalysisError::invalid_input(format!(
            "reference move must be finite, got {reference_move_pct}"
        )));
    }
    Ok(beta * reference_move_pct)
}

/// Builds a [`MoveProjection`] from a computed beta result and a
/// user-supplied reference move.
pub fn project(result: &BetaResult, input_move_pct: f64) -> Result<MoveProjection, AnalysisError> {
    Ok(MoveProjection {
        input_move_pct,
        projected_move_pct: project_move(result.beta, input_move_pct)?,
    })
}

/// Runs the full pipeline for one coin pair: derive returns from both price
/// histories, then compute beta and volatility ratio over them.
pub fn analyze(
    reference: &PriceSeries,
    target: &PriceSeries,
    reference_symbol: &str,
    target_symbol: &str,
) -> Result<BetaResult, AnalysisError> {
    let reference_returns = compute_returns(reference)?;
    let target_returns = compute_returns(target)?;

    Ok(BetaResult {
        beta: compute_beta(&reference_returns, &target_returns)?,
        volatility_ratio: compute_volatility_ratio(&reference_returns, &target_returns)?,
        reference_symbol: reference_symbol.to_string(),
        target_symbol: target_symbol.to_string(),
    })
}

fn check_aligned(reference: &[f64], target: &[f64]) -> Result<(), AnalysisError> {
    if reference.len() != target.len() || reference.len() < 2 {
        return Err(AnalysisError::MismatchedLength {
            reference: reference.len(),
            target: target.len(),
        });
    }
    for (label, series) in [("reference", reference), ("target", target)] {
        if let Some(i) = series.iter().position(|r| !r.is_finite()) {
            return Err(AnalysisError::invalid_input(format!(
                "{label} return at index {i} is not finite"
            )));
        }
    }
    Ok(())
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

// Callers guarantee len >= 2.
fn sample_variance(data: &[f64]) -> f64 {
    let m = mean(data);
    data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64
}

fn sample_covariance(x: &[f64], y: &[f64]) -> f64 {
    let mean_x = mean(x);
    let mean_y = mean(y);
    x.iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum::<f64>()
        / (x.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::PricePoint;
    use chrono::{TimeZone, Utc};

    const EPSILON: f64 = 1e-9;

    fn series(prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, price)| PricePoint {
                timestamp: Utc
                    .timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0)
                    .unwrap(),
                price: *price,
            })
            .collect();
        PriceSeries::new(points).unwrap()
    }

    #[test]
    fn returns_have_one_fewer_entry_than_prices() {
        let returns = compute_returns(&series(&[100.0, 110.0, 99.0, 99.0])).unwrap();
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.10).abs() < EPSILON);
        assert!((returns[1] - (-0.10)).abs() < EPSILON);
        assert!((returns[2] - 0.0).abs() < EPSILON);
    }

    #[test]
    fn returns_fail_on_short_series() {
        assert_eq!(
            compute_returns(&series(&[100.0])),
            Err(AnalysisError::InsufficientData {
                required: 2,
                got: 1
            })
        );
        assert_eq!(
            compute_returns(&series(&[])),
            Err(AnalysisError::InsufficientData {
                required: 2,
                got: 0
            })
        );
    }

    #[test]
    fn beta_of_series_against_itself_is_one() {
        let returns = vec![0.01, -0.02, 0.03, 0.005];
        let beta = compute_beta(&returns, &returns).unwrap();
        assert!((beta - 1.0).abs() < EPSILON);
    }

    #[test]
    fn beta_fails_on_constant_reference() {
        let reference = vec![0.01, 0.01, 0.01];
        let target = vec![0.02, -0.04, 0.05];
        assert_eq!(
            compute_beta(&reference, &target),
            Err(AnalysisError::ZeroVariance)
        );
    }

    #[test]
    fn beta_fails_on_mismatched_lengths() {
        let reference = vec![0.01, -0.02, 0.03];
        let target = vec![0.02, -0.04];
        assert_eq!(
            compute_beta(&reference, &target),
            Err(AnalysisError::MismatchedLength {
                reference: 3,
                target: 2
            })
        );
        assert_eq!(
            compute_volatility_ratio(&reference, &target),
            Err(AnalysisError::MismatchedLength {
                reference: 3,
                target: 2
            })
        );
    }

    #[test]
    fn beta_fails_on_single_observation() {
        assert_eq!(
            compute_beta(&[0.01], &[0.02]),
            Err(AnalysisError::MismatchedLength {
                reference: 1,
                target: 1
            })
        );
    }

    #[test]
    fn beta_rejects_non_finite_returns() {
        let reference = vec![0.01, f64::NAN, 0.03];
        let target = vec![0.02, -0.04, 0.05];
        assert!(matches!(
            compute_beta(&reference, &target),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn volatility_ratio_of_series_against_itself_is_one() {
        let returns = vec![0.01, -0.02, 0.03, 0.005];
        let ratio = compute_volatility_ratio(&returns, &returns).unwrap();
        assert!((ratio - 1.0).abs() < EPSILON);
    }

    #[test]
    fn known_scenario_matches_sample_convention() {
        let reference = vec![0.01, -0.02, 0.03, 0.00];
        let target = vec![0.02, -0.04, 0.05, 0.01];

        // Sample covariance 0.0023/3, sample variance 0.0013/3.
        let beta = compute_beta(&reference, &target).unwrap();
        assert!((beta - 23.0 / 13.0).abs() < 1e-9);

        let ratio = compute_volatility_ratio(&reference, &target).unwrap();
        assert!((ratio - (42.0_f64 / 13.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn doubled_moves_give_beta_of_two() {
        let reference = vec![0.01, -0.02, 0.03, 0.00];
        let target: Vec<f64> = reference.iter().map(|r| r * 2.0).collect();
        let beta = compute_beta(&reference, &target).unwrap();
        assert!((beta - 2.0).abs() < EPSILON);
        let ratio = compute_volatility_ratio(&reference, &target).unwrap();
        assert!((ratio - 2.0).abs() < EPSILON);
    }

    #[test]
    fn inverse_moves_give_negative_beta() {
        let reference = vec![0.01, -0.02, 0.03, 0.00];
        let target: Vec<f64> = reference.iter().map(|r| -r).collect();
        let beta = compute_beta(&reference, &target).unwrap();
        assert!((beta + 1.0).abs() < EPSILON);
    }

    #[test]
    fn projects_move_linearly() {
        assert_eq!(project_move(2.0, 5.0).unwrap(), 10.0);
        assert_eq!(project_move(-0.5, 4.0).unwrap(), -2.0);
    }

    #[test]
    fn projection_rejects_non_finite_input() {
        assert!(matches!(
            project_move(f64::NAN, 5.0),
            Err(AnalysisError::InvalidInput { .. })
        ));
        assert!(matches!(
            project_move(1.0, f64::INFINITY),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn projection_carries_input_and_output() {
        let result = BetaResult {
            beta: 1.5,
            volatility_ratio: 1.2,
            reference_symbol: "bitcoin".to_string(),
            target_symbol: "ethereum".to_string(),
        };
        let projection = project(&result, 4.0).unwrap();
        assert_eq!(projection.input_move_pct, 4.0);
        assert_eq!(projection.projected_move_pct, 6.0);
    }

    #[test]
    fn analyze_composes_full_pipeline() {
        let reference = series(&[100.0, 101.0, 98.98, 101.9494, 101.9494]);
        let target: Vec<f64> = vec![200.0, 204.0, 195.84, 205.632, 207.68832];
        let target = series(&target);

        let result = analyze(&reference, &target, "bitcoin", "ethereum").unwrap();
        assert_eq!(result.reference_symbol, "bitcoin");
        assert_eq!(result.target_symbol, "ethereum");
        assert!(result.beta.is_finite());
        assert!(result.volatility_ratio > 0.0);
    }

    #[test]
    fn analyze_propagates_insufficient_data() {
        let reference = series(&[100.0]);
        let target = series(&[200.0, 204.0]);
        assert_eq!(
            analyze(&reference, &target, "bitcoin", "ethereum"),
            Err(AnalysisError::InsufficientData {
                required: 2,
                got: 1
            })
        );
    }
}
