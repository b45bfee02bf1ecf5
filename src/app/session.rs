use crate::app::history::CsvHistory;
use crate::config::cli::LocalStorage;
use crate::core::checkpoint::{checkpoint_file_name, checkpoint_path, RecordedPredictor};
use crate::core::dataset::SphereDataset;
use crate::core::evaluator::{EvalOptions, Evaluator};
use crate::core::ConfigProvider;
use crate::domain::model::EvalReport;
use crate::utils::error::{EvalError, Result};
use std::path::Path;

pub fn load_dataset<C: ConfigProvider>(config: &C) -> Result<SphereDataset> {
    let storage = LocalStorage::new(config.data_path().to_string());
    SphereDataset::load(&storage, config.split(), config.candidate_count())
}

pub fn load_predictor<C: ConfigProvider>(config: &C, epoch: u32) -> Result<RecordedPredictor> {
    let storage = LocalStorage::new(config.save_path().to_string());
    let file_name = checkpoint_file_name(config.save_file_name(), epoch);
    RecordedPredictor::load(&storage, &file_name, config.output_kind()).map_err(|e| match e {
        EvalError::CheckpointNotFound { .. } => EvalError::CheckpointNotFound {
            path: checkpoint_path(config.save_path(), config.save_file_name(), epoch)
                .display()
                .to_string(),
        },
        other => other,
    })
}

/// Splits a user supplied file path into a storage root and a file name.
pub fn history_sink(path: &str) -> CsvHistory<LocalStorage> {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history.csv".to_string());
    CsvHistory::new(LocalStorage::new(dir), file)
}

/// Loads the checkpoint for `epoch` and runs one evaluation pass.
pub fn evaluate_epoch<C: ConfigProvider>(
    config: &C,
    dataset: &SphereDataset,
    epoch: u32,
    history: Option<&str>,
    monitor_enabled: bool,
) -> Result<EvalReport> {
    let predictor = load_predictor(config, epoch)?;
    let mut evaluator =
        Evaluator::new_with_monitoring(dataset, EvalOptions::from_config(config), monitor_enabled);
    if let Some(path) = history {
        evaluator = evaluator.with_sink(Box::new(history_sink(path)));
    }
    evaluator.run(epoch, &predictor)
}
