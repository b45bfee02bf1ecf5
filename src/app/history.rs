use crate::domain::ports::{ProgressSink, Storage};
use crate::utils::error::Result;
use chrono::Utc;

const HEADER: &str = "timestamp,epoch,angle_max,angle_exp\n";

/// Appends one row per evaluated epoch so an external plotter can follow the
/// test curve while training continues.
pub struct CsvHistory<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> CsvHistory<S> {
    pub fn new(storage: S, file_name: String) -> Self {
        Self { storage, file_name }
    }
}

impl<S: Storage> ProgressSink for CsvHistory<S> {
    fn record(&mut self, epoch: u32, angle_max: f64, angle_exp: f64) -> Result<()> {
        if !self.storage.exists(&self.file_name) {
            self.storage.write_file(&self.file_name, HEADER.as_bytes())?;
        }

        let row = format!(
            "{},{},{:.6},{:.6}\n",
            Utc::now().to_rfc3339(),
            epoch,
            angle_max,
            angle_exp
        );
        self.storage.append_file(&self.file_name, row.as_bytes())?;

        tracing::debug!("History point for epoch {} appended to {}", epoch, self.file_name);
        Ok(())
    }
}
