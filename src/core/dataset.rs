use crate::core::decode::normalize;
use crate::domain::model::{Direction, Sample};
use crate::domain::ports::Storage;
use crate::utils::error::{EvalError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::HashSet;

pub const POINTS_FILE: &str = "points.csv";

#[derive(Debug, Deserialize)]
struct PointRow {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Deserialize)]
struct SampleRow {
    id: String,
    x: f64,
    y: f64,
    z: f64,
}

/// Held-out split plus the candidate points the network predicts over.
#[derive(Debug, Clone)]
pub struct SphereDataset {
    pub points: Vec<Direction>,
    pub samples: Vec<Sample>,
}

impl SphereDataset {
    /// Reads `points.csv` and `<split>.csv` from the storage root. Without a
    /// points file, `candidate_count` points are generated instead.
    pub fn load<S: Storage>(storage: &S, split: &str, candidate_count: Option<usize>) -> Result<Self> {
        let points = if storage.exists(POINTS_FILE) {
            let points = read_points(&storage.read_file(POINTS_FILE)?)?;
            if let Some(expected) = candidate_count {
                if expected != points.len() {
                    return Err(EvalError::ShapeMismatch {
                        context: POINTS_FILE.to_string(),
                        expected,
                        actual: points.len(),
                    });
                }
            }
            points
        } else if let Some(n) = candidate_count {
            tracing::info!("{} not found, generating {} lattice points", POINTS_FILE, n);
            fibonacci_sphere(n)
        } else {
            return Err(EvalError::MissingConfigError {
                field: format!("{} or candidate_count", POINTS_FILE),
            });
        };

        let split_file = format!("{}.csv", split);
        let samples = read_samples(&storage.read_file(&split_file)?)?;

        if points.is_empty() {
            return Err(EvalError::EmptyData {
                message: "candidate point set is empty".to_string(),
            });
        }
        if samples.is_empty() {
            return Err(EvalError::EmptyData {
                message: format!("split '{}' has no samples", split),
            });
        }

        tracing::debug!(
            "Loaded {} candidates and {} samples from split '{}'",
            points.len(),
            samples.len(),
            split
        );

        Ok(Self { points, samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample indices grouped into batches; the last one may be short.
    pub fn batches(&self, batch_size: usize, shuffle_seed: Option<u64>) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        if let Some(seed) = shuffle_seed {
            let mut rng = StdRng::seed_from_u64(seed);
            order.shuffle(&mut rng);
        }
        order
            .chunks(batch_size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}

fn read_points(data: &[u8]) -> Result<Vec<Direction>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut points = Vec::new();
    for (line, row) in reader.deserialize::<PointRow>().enumerate() {
        let row = row?;
        let p = normalize([row.x, row.y, row.z]).ok_or_else(|| EvalError::ValidationError {
            message: format!("{} row {} is not a direction", POINTS_FILE, line + 1),
        })?;
        points.push(p);
    }
    Ok(points)
}

fn read_samples(data: &[u8]) -> Result<Vec<Sample>> {
    let mut reader = csv::Reader::from_reader(data);
    let mut seen = HashSet::new();
    let mut samples = Vec::new();
    for row in reader.deserialize::<SampleRow>() {
        let row = row?;
        let direction =
            normalize([row.x, row.y, row.z]).ok_or_else(|| EvalError::ValidationError {
                message: format!("sample '{}' has a zero ground-truth vector", row.id),
            })?;
        if !seen.insert(row.id.clone()) {
            return Err(EvalError::ValidationError {
                message: format!("duplicate sample id '{}'", row.id),
            });
        }
        samples.push(Sample {
            id: row.id,
            direction,
        });
    }
    Ok(samples)
}

/// Near-uniform points on the unit sphere.
pub fn fibonacci_sphere(n: usize) -> Vec<Direction> {
    let phi = std::f64::consts::PI * (1.0 + 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let t = (i as f64 + 0.5) / n as f64;
            let theta = (1.0 - 2.0 * t).acos();
            let angle = phi * i as f64;
            [
                theta.sin() * angle.cos(),
                theta.sin() * angle.sin(),
                theta.cos(),
            ]
        })
        .collect()
}
