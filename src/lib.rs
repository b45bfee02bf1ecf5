pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    checkpoint::RecordedPredictor,
    dataset::SphereDataset,
    evaluator::{EvalOptions, Evaluator},
};
pub use utils::error::{EvalError, Result};
