use crate::domain::model::{AngleUnit, OutputKind};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn append_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
}

pub trait ConfigProvider {
    fn epoch(&self) -> u32;
    fn batch_size(&self) -> usize;
    fn data_path(&self) -> &str;
    fn split(&self) -> &str;
    fn save_path(&self) -> &str;
    fn save_file_name(&self) -> &str;
    fn output_kind(&self) -> OutputKind;
    fn unit(&self) -> AngleUnit;
    fn shuffle(&self) -> Option<u64>;
    fn log_every(&self) -> usize;
    fn candidate_count(&self) -> Option<usize>;
}

/// Source of network outputs, one row of N values per sample id.
pub trait Predictor {
    fn predict(&self, ids: &[&str]) -> Result<Vec<Vec<f64>>>;
    fn output_kind(&self) -> OutputKind;
}

/// Receives one point per evaluated epoch (live-plot hook).
pub trait ProgressSink {
    fn record(&mut self, epoch: u32, angle_max: f64, angle_exp: f64) -> Result<()>;
}
