pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{AngleUnit, OutputKind};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_stem, validate_path, validate_positive_number, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sphere-eval")]
#[command(about = "Evaluate spherical direction predictions against a held-out split")]
pub struct CliConfig {
    /// Which epoch's checkpoint to evaluate
    #[arg(long, default_value = "50")]
    pub epoch: u32,

    #[arg(long, default_value = "32")]
    pub batch_size: usize,

    /// Directory holding points.csv and the split files
    #[arg(long, default_value = "./data")]
    pub data_path: String,

    #[arg(long, default_value = "test")]
    pub split: String,

    #[arg(long, default_value = "./saves")]
    pub save_path: String,

    #[arg(long, default_value = "densenet_101_kappa_25")]
    pub save_file_name: String,

    #[arg(long, default_value = "logits")]
    pub output_kind: OutputKind,

    #[arg(long, default_value = "degrees")]
    pub unit: AngleUnit,

    /// Generate this many lattice points when points.csv is absent
    #[arg(long)]
    pub candidate_count: Option<usize>,

    #[arg(long, help = "Keep dataset order instead of shuffling before batching")]
    pub no_shuffle: bool,

    #[arg(long, default_value = "0")]
    pub seed: u64,

    #[arg(long, default_value = "10")]
    pub log_every: usize,

    /// Write the full JSON report to this file
    #[arg(long)]
    pub report: Option<String>,

    /// Append the epoch result to this CSV file
    #[arg(long)]
    pub history: Option<String>,

    #[arg(long, help = "Log process CPU and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn epoch(&self) -> u32 {
        self.epoch
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn data_path(&self) -> &str {
        &self.data_path
    }

    fn split(&self) -> &str {
        &self.split
    }

    fn save_path(&self) -> &str {
        &self.save_path
    }

    fn save_file_name(&self) -> &str {
        &self.save_file_name
    }

    fn output_kind(&self) -> OutputKind {
        self.output_kind
    }

    fn unit(&self) -> AngleUnit {
        self.unit
    }

    fn shuffle(&self) -> Option<u64> {
        (!self.no_shuffle).then_some(self.seed)
    }

    fn log_every(&self) -> usize {
        self.log_every
    }

    fn candidate_count(&self) -> Option<usize> {
        self.candidate_count
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_common(self)?;
        if let Some(report) = &self.report {
            validate_path("report", report)?;
        }
        if let Some(history) = &self.history {
            validate_path("history", history)?;
        }
        Ok(())
    }
}

/// Checks shared by every configuration source.
pub fn validate_common<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_positive_number("batch_size", config.batch_size(), 1)?;
    validate_path("data_path", config.data_path())?;
    validate_file_stem("split", config.split())?;
    validate_path("save_path", config.save_path())?;
    validate_file_stem("save_file_name", config.save_file_name())?;
    validate_range("log_every", config.log_every(), 0, 1_000_000)?;
    if let Some(n) = config.candidate_count() {
        validate_positive_number("candidate_count", n, 1)?;
    }
    Ok(())
}
