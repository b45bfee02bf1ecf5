pub mod checkpoint;
pub mod dataset;
pub mod decode;
pub mod evaluator;
pub mod metrics;

pub use crate::domain::model::{Direction, EvalReport, Sample};
pub use crate::domain::ports::{ConfigProvider, Predictor, ProgressSink, Storage};
pub use crate::utils::error::Result;
