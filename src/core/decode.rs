//! Turning a distribution over the candidate set into a single direction.

use crate::domain::model::Direction;
use crate::utils::error::{EvalError, Result};

const NORM_EPSILON: f64 = 1e-12;

pub fn dot(a: Direction, b: Direction) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn length(v: Direction) -> f64 {
    dot(v, v).sqrt()
}

/// `None` when the vector is too short to carry a direction.
pub fn normalize(v: Direction) -> Option<Direction> {
    let l = length(v);
    if l > NORM_EPSILON && l.is_finite() {
        Some([v[0] / l, v[1] / l, v[2] / l])
    } else {
        None
    }
}

/// Max-subtracted softmax.
pub fn softmax(logits: &[f64]) -> Result<Vec<f64>> {
    if logits.is_empty() {
        return Err(EvalError::EmptyData {
            message: "cannot take softmax of an empty output row".to_string(),
        });
    }

    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    Ok(exps.into_iter().map(|e| e / sum).collect())
}

fn check_shape(dist: &[f64], candidates: &[Direction]) -> Result<()> {
    if candidates.is_empty() {
        return Err(EvalError::EmptyData {
            message: "candidate point set is empty".to_string(),
        });
    }
    if dist.len() != candidates.len() {
        return Err(EvalError::ShapeMismatch {
            context: "distribution".to_string(),
            expected: candidates.len(),
            actual: dist.len(),
        });
    }
    Ok(())
}

/// Index and direction of the most probable candidate. Ties go to the lowest
/// index and NaN never wins; an all-NaN distribution is an error.
pub fn decode_argmax(dist: &[f64], candidates: &[Direction]) -> Result<(usize, Direction)> {
    check_shape(dist, candidates)?;

    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in dist.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, best_p)| p > best_p) {
            best = Some((i, p));
        }
    }

    match best {
        Some((index, _)) => Ok((index, candidates[index])),
        None => Err(EvalError::ValidationError {
            message: "distribution has no comparable entries".to_string(),
        }),
    }
}

/// Probability-weighted mean of the candidates, projected back on the sphere.
pub fn decode_expectation(dist: &[f64], candidates: &[Direction]) -> Result<Direction> {
    check_shape(dist, candidates)?;

    let mut acc = [0.0; 3];
    for (&p, c) in dist.iter().zip(candidates) {
        acc[0] += p * c[0];
        acc[1] += p * c[1];
        acc[2] += p * c[2];
    }

    match normalize(acc) {
        Some(dir) => Ok(dir),
        None => {
            // Mass cancels out, use the mode.
            let (index, dir) = decode_argmax(dist, candidates)?;
            tracing::debug!(
                "Expectation has zero norm, falling back to candidate {}",
                index
            );
            Ok(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axes() -> Vec<Direction> {
        vec![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [-1.0, 0.0, 0.0],
        ]
    }

    fn assert_close(a: Direction, b: Direction) {
        for k in 0..3 {
            assert!((a[k] - b[k]).abs() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn test_normalize_yields_unit_vector() {
        let v = normalize([3.0, -4.0, 12.0]).unwrap();
        assert!((length(v) - 1.0).abs() < 1e-12);
        assert_close(v, [3.0 / 13.0, -4.0 / 13.0, 12.0 / 13.0]);
    }

    #[test]
    fn test_normalize_rejects_zero() {
        assert!(normalize([0.0, 0.0, 0.0]).is_none());
        assert!(normalize([f64::NAN, 0.0, 1.0]).is_none());
    }

    #[test]
    fn test_softmax_sums_to_one_and_is_shift_invariant() {
        let a = softmax(&[1.0, 2.0, 3.0]).unwrap();
        let b = softmax(&[1001.0, 1002.0, 1003.0]).unwrap();
        assert!((a.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-12);
        }
        assert!(a[2] > a[1] && a[1] > a[0]);
    }

    #[test]
    fn test_softmax_empty_is_error() {
        assert!(softmax(&[]).is_err());
    }

    #[test]
    fn test_argmax_picks_highest_probability() {
        let (index, dir) = decode_argmax(&[0.1, 0.2, 0.6, 0.1], &axes()).unwrap();
        assert_eq!(index, 2);
        assert_close(dir, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_argmax_ties_go_to_first() {
        let (index, _) = decode_argmax(&[0.4, 0.4, 0.1, 0.1], &axes()).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_argmax_ignores_nan() {
        let (index, _) = decode_argmax(&[f64::NAN, 0.2, 0.7, 0.1], &axes()).unwrap();
        assert_eq!(index, 2);
    }

    #[test]
    fn test_argmax_all_nan_is_error() {
        let err = decode_argmax(&[f64::NAN; 4], &axes()).unwrap_err();
        assert!(matches!(err, EvalError::ValidationError { .. }));
    }

    #[test]
    fn test_expectation_of_one_hot_is_candidate() {
        let dir = decode_expectation(&[0.0, 1.0, 0.0, 0.0], &axes()).unwrap();
        assert_close(dir, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_expectation_is_normalized_weighted_mean() {
        let dir = decode_expectation(&[0.5, 0.5, 0.0, 0.0], &axes()).unwrap();
        let s = 1.0 / 2.0_f64.sqrt();
        assert_close(dir, [s, s, 0.0]);
    }

    #[test]
    fn test_expectation_zero_norm_falls_back_to_argmax() {
        let dir = decode_expectation(&[0.5, 0.0, 0.0, 0.5], &axes()).unwrap();
        assert_close(dir, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = decode_expectation(&[0.5, 0.5], &axes()).unwrap_err();
        assert!(matches!(
            err,
            EvalError::ShapeMismatch {
                expected: 4,
                actual: 2,
                ..
            }
        ));
        assert!(decode_argmax(&[], &[]).is_err());
    }
}
