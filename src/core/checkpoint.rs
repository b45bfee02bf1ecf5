use crate::domain::model::OutputKind;
use crate::domain::ports::{Predictor, Storage};
use crate::utils::error::{EvalError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `<name>.<epoch>.csv`, the per-epoch naming used by the trainer.
pub fn checkpoint_file_name(save_file_name: &str, epoch: u32) -> String {
    format!("{}.{}.csv", save_file_name, epoch)
}

pub fn checkpoint_path(save_path: &str, save_file_name: &str, epoch: u32) -> PathBuf {
    Path::new(save_path).join(checkpoint_file_name(save_file_name, epoch))
}

/// Network outputs recorded for one checkpoint, keyed by sample id.
#[derive(Debug, Clone)]
pub struct RecordedPredictor {
    outputs: HashMap<String, Vec<f64>>,
    width: usize,
    kind: OutputKind,
}

impl RecordedPredictor {
    pub fn load<S: Storage>(storage: &S, file_name: &str, kind: OutputKind) -> Result<Self> {
        if !storage.exists(file_name) {
            return Err(EvalError::CheckpointNotFound {
                path: file_name.to_string(),
            });
        }
        let data = storage.read_file(file_name)?;
        let predictor = Self::from_csv(&data, kind)?;
        tracing::info!(
            "Loaded {} recorded outputs ({} candidates) from {}",
            predictor.outputs.len(),
            predictor.width,
            file_name
        );
        Ok(predictor)
    }

    /// Parses `id,o0,o1,...` rows.
    pub fn from_csv(data: &[u8], kind: OutputKind) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data);
        let width = reader.headers()?.len().saturating_sub(1);
        if width == 0 {
            return Err(EvalError::EmptyData {
                message: "checkpoint has no output columns".to_string(),
            });
        }

        let mut outputs = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let id = record.get(0).unwrap_or_default().to_string();
            let values = record
                .iter()
                .skip(1)
                .map(|field| {
                    let value = field.trim().parse::<f64>().map_err(|e| EvalError::ValidationError {
                        message: format!("sample '{}': bad output value '{}': {}", id, field, e),
                    })?;
                    if !value.is_finite() {
                        return Err(EvalError::ValidationError {
                            message: format!("sample '{}': non-finite output value '{}'", id, field),
                        });
                    }
                    Ok(value)
                })
                .collect::<Result<Vec<f64>>>()?;

            if values.len() != width {
                return Err(EvalError::ShapeMismatch {
                    context: format!("outputs of sample '{}'", id),
                    expected: width,
                    actual: values.len(),
                });
            }
            if outputs.insert(id.clone(), values).is_some() {
                return Err(EvalError::ValidationError {
                    message: format!("duplicate sample id '{}' in checkpoint", id),
                });
            }
        }

        Ok(Self {
            outputs,
            width,
            kind,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

impl Predictor for RecordedPredictor {
    fn predict(&self, ids: &[&str]) -> Result<Vec<Vec<f64>>> {
        ids.iter()
            .map(|id| {
                self.outputs
                    .get(*id)
                    .cloned()
                    .ok_or_else(|| EvalError::ValidationError {
                        message: format!("no recorded output for sample '{}'", id),
                    })
            })
            .collect()
    }

    fn output_kind(&self) -> OutputKind {
        self.kind
    }
}
