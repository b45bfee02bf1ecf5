use crate::core::decode::{dot, normalize};
use crate::domain::model::{AngleUnit, BatchScore, Direction, ErrorStats};
use crate::utils::error::{EvalError, Result};

/// Angle between two directions. Inputs need not be unit length.
pub fn angular_error(a: Direction, b: Direction, unit: AngleUnit) -> Result<f64> {
    let (a, b) = match (normalize(a), normalize(b)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(EvalError::ValidationError {
                message: format!("cannot measure the angle between {:?} and {:?}", a, b),
            })
        }
    };
    // Clamp to [-1, 1] to absorb rounding
    let cos = dot(a, b).clamp(-1.0, 1.0);
    Ok(unit.convert_radians(cos.acos()))
}

impl ErrorStats {
    pub fn from_errors(errors: &[f64]) -> Self {
        if errors.is_empty() {
            return Self::default();
        }

        let mut sorted = errors.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len();
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };
        // Nearest-rank percentile
        let p90_rank = ((0.9 * n as f64).ceil() as usize).clamp(1, n);

        Self {
            mean,
            median,
            p90: sorted[p90_rank - 1],
            max: sorted[n - 1],
        }
    }
}

/// Running totals for one evaluation pass.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    batches: Vec<BatchScore>,
    exp_errors: Vec<f64>,
    max_errors: Vec<f64>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one batch of per-sample errors and returns its means.
    pub fn push_batch(&mut self, exp_errors: &[f64], max_errors: &[f64]) -> Result<BatchScore> {
        if exp_errors.len() != max_errors.len() {
            return Err(EvalError::ShapeMismatch {
                context: "batch errors".to_string(),
                expected: exp_errors.len(),
                actual: max_errors.len(),
            });
        }
        if exp_errors.is_empty() {
            return Err(EvalError::EmptyData {
                message: "batch without samples".to_string(),
            });
        }

        let n = exp_errors.len() as f64;
        let score = BatchScore {
            index: self.batches.len(),
            samples: exp_errors.len(),
            angle_exp: exp_errors.iter().sum::<f64>() / n,
            angle_max: max_errors.iter().sum::<f64>() / n,
        };

        self.exp_errors.extend_from_slice(exp_errors);
        self.max_errors.extend_from_slice(max_errors);
        self.batches.push(score.clone());
        Ok(score)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn sample_count(&self) -> usize {
        self.exp_errors.len()
    }

    /// Mean of batch means for (exp, max).
    pub fn batch_averaged(&self) -> (f64, f64) {
        if self.batches.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.batches.len() as f64;
        let exp = self.batches.iter().map(|b| b.angle_exp).sum::<f64>() / n;
        let max = self.batches.iter().map(|b| b.angle_max).sum::<f64>() / n;
        (exp, max)
    }

    pub fn exp_stats(&self) -> ErrorStats {
        ErrorStats::from_errors(&self.exp_errors)
    }

    pub fn max_stats(&self) -> ErrorStats {
        ErrorStats::from_errors(&self.max_errors)
    }

    pub fn into_batches(self) -> Vec<BatchScore> {
        self.batches
    }
}
