use crate::core::dataset::SphereDataset;
use crate::core::decode::{decode_argmax, decode_expectation, softmax};
use crate::core::metrics::{angular_error, BatchAccumulator};
use crate::domain::model::{AngleUnit, Direction, EvalReport, OutputKind, SampleScore};
use crate::domain::ports::{ConfigProvider, Predictor, ProgressSink};
use crate::utils::error::{EvalError, Result};
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct EvalOptions {
    pub batch_size: usize,
    pub shuffle_seed: Option<u64>,
    pub log_every: usize,
    pub unit: AngleUnit,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle_seed: None,
            log_every: 10,
            unit: AngleUnit::Degrees,
        }
    }
}

impl EvalOptions {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            batch_size: config.batch_size(),
            shuffle_seed: config.shuffle(),
            log_every: config.log_every(),
            unit: config.unit(),
        }
    }
}

/// Scores one network output row against its ground truth.
pub fn score_distribution(
    id: &str,
    output: &[f64],
    kind: OutputKind,
    truth: Direction,
    candidates: &[Direction],
    unit: AngleUnit,
) -> Result<SampleScore> {
    if let Some(bad) = output.iter().find(|v| !v.is_finite()) {
        return Err(EvalError::ValidationError {
            message: format!("sample '{}': non-finite network output {}", id, bad),
        });
    }

    let dist = match kind {
        OutputKind::Logits => softmax(output)?,
        OutputKind::Probabilities => output.to_vec(),
    };

    let pred_exp = decode_expectation(&dist, candidates)?;
    let (argmax_index, pred_max) = decode_argmax(&dist, candidates)?;

    Ok(SampleScore {
        id: id.to_string(),
        angle_exp: angular_error(truth, pred_exp, unit)?,
        angle_max: angular_error(truth, pred_max, unit)?,
        argmax_index,
    })
}

pub struct Evaluator<'a> {
    dataset: &'a SphereDataset,
    options: EvalOptions,
    monitor: SystemMonitor,
    sinks: Vec<Box<dyn ProgressSink + 'a>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(dataset: &'a SphereDataset, options: EvalOptions) -> Self {
        Self::new_with_monitoring(dataset, options, false)
    }

    pub fn new_with_monitoring(
        dataset: &'a SphereDataset,
        options: EvalOptions,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            dataset,
            options,
            monitor: SystemMonitor::new(monitor_enabled),
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn ProgressSink + 'a>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn run<P: Predictor>(&mut self, epoch: u32, predictor: &P) -> Result<EvalReport> {
        let tic = Instant::now();
        println!("Test : {}", epoch);
        self.monitor.log_stats("Start");

        let unit = self.options.unit;
        let batches = self
            .dataset
            .batches(self.options.batch_size, self.options.shuffle_seed);
        let total = batches.len();
        let mut acc = BatchAccumulator::new();
        let mut sample_scores = Vec::with_capacity(self.dataset.len());

        for (idx, batch) in batches.iter().enumerate() {
            let ids: Vec<&str> = batch
                .iter()
                .map(|&i| self.dataset.samples[i].id.as_str())
                .collect();
            let outputs = predictor.predict(&ids)?;
            if outputs.len() != ids.len() {
                return Err(EvalError::ShapeMismatch {
                    context: "predictor rows".to_string(),
                    expected: ids.len(),
                    actual: outputs.len(),
                });
            }

            let mut exp_errors = Vec::with_capacity(batch.len());
            let mut max_errors = Vec::with_capacity(batch.len());
            for (&i, output) in batch.iter().zip(&outputs) {
                let sample = &self.dataset.samples[i];
                let score = score_distribution(
                    &sample.id,
                    output,
                    predictor.output_kind(),
                    sample.direction,
                    &self.dataset.points,
                    unit,
                )?;
                exp_errors.push(score.angle_exp);
                max_errors.push(score.angle_max);
                sample_scores.push(score);
            }

            let batch_score = acc.push_batch(&exp_errors, &max_errors)?;

            if self.options.log_every > 0 && idx % self.options.log_every == 0 {
                tracing::info!(
                    "Step: [{}/{}]\tAngle error_max: {:.4}\tAngle error_exp: {:.4}",
                    idx,
                    total,
                    batch_score.angle_max,
                    batch_score.angle_exp
                );
            }
        }

        let (angle_exp, angle_max) = acc.batch_averaged();
        for sink in self.sinks.iter_mut() {
            sink.record(epoch, angle_max, angle_exp)?;
        }

        let elapsed = tic.elapsed().as_secs_f64();
        println!("Angle Error : {:.4}", angle_exp);
        println!("test_time : {:.4}s", elapsed);
        self.monitor.log_final_stats();

        let exp_stats = acc.exp_stats();
        let max_stats = acc.max_stats();
        let samples = acc.sample_count();

        Ok(EvalReport {
            epoch,
            unit,
            batches: acc.batch_count(),
            samples,
            angle_exp,
            angle_max,
            exp_stats,
            max_stats,
            elapsed_secs: elapsed,
            batch_scores: acc.into_batches(),
            sample_scores,
        })
    }
}
