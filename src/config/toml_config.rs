use crate::core::ConfigProvider;
use crate::domain::model::{AngleUnit, OutputKind};
use crate::utils::error::{EvalError, Result};
use crate::utils::validation::{validate_path, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub evaluation: EvaluationConfig,
    pub dataset: DatasetConfig,
    pub checkpoint: CheckpointConfig,
    pub output: Option<OutputConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub epochs: Vec<u32>,
    pub batch_size: Option<usize>,
    pub output_kind: Option<OutputKind>,
    pub unit: Option<AngleUnit>,
    /// Defaults to true; batches are drawn in seeded random order.
    pub shuffle: Option<bool>,
    pub shuffle_seed: Option<u64>,
    pub log_every: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub data_path: String,
    pub split: Option<String>,
    pub candidate_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointConfig {
    pub save_path: String,
    pub save_file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub directory: String,
    /// Written once per epoch as `<stem>.<epoch>.json`.
    pub report_stem: Option<String>,
    pub history: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EvalError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DATA_ROOT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EvalError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn epochs(&self) -> &[u32] {
        &self.evaluation.epochs
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.output.as_ref().map(|o| o.directory.as_str())
    }

    pub fn report_stem(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.report_stem.as_deref())
    }

    pub fn history_file(&self) -> Option<&str> {
        self.output.as_ref().and_then(|o| o.history.as_deref())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    /// The last listed epoch.
    fn epoch(&self) -> u32 {
        self.evaluation.epochs.last().copied().unwrap_or_default()
    }

    fn batch_size(&self) -> usize {
        self.evaluation.batch_size.unwrap_or(32)
    }

    fn data_path(&self) -> &str {
        &self.dataset.data_path
    }

    fn split(&self) -> &str {
        self.dataset.split.as_deref().unwrap_or("test")
    }

    fn save_path(&self) -> &str {
        &self.checkpoint.save_path
    }

    fn save_file_name(&self) -> &str {
        &self.checkpoint.save_file_name
    }

    fn output_kind(&self) -> OutputKind {
        self.evaluation.output_kind.unwrap_or_default()
    }

    fn unit(&self) -> AngleUnit {
        self.evaluation.unit.unwrap_or_default()
    }

    fn shuffle(&self) -> Option<u64> {
        if self.evaluation.shuffle.unwrap_or(true) {
            Some(self.evaluation.shuffle_seed.unwrap_or(0))
        } else {
            None
        }
    }

    fn log_every(&self) -> usize {
        self.evaluation.log_every.unwrap_or(10)
    }

    fn candidate_count(&self) -> Option<usize> {
        self.dataset.candidate_count
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if self.evaluation.epochs.is_empty() {
            return Err(EvalError::MissingConfigError {
                field: "evaluation.epochs".to_string(),
            });
        }

        super::validate_common(self)?;

        if let Some(output) = &self.output {
            validate_path("output.directory", &output.directory)?;
            if let Some(stem) = &output.report_stem {
                crate::utils::validation::validate_file_stem("output.report_stem", stem)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[evaluation]
epochs = [10, 20, 50]
batch_size = 16
output_kind = "probabilities"
unit = "radians"

[dataset]
data_path = "./data"

[checkpoint]
save_path = "./saves"
save_file_name = "densenet_101_kappa_25"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.epochs(), &[10, 20, 50]);
        assert_eq!(config.epoch(), 50);
        assert_eq!(config.batch_size(), 16);
        assert_eq!(config.split(), "test");
        assert_eq!(config.output_kind(), OutputKind::Probabilities);
        assert_eq!(config.unit(), AngleUnit::Radians);
        assert_eq!(config.log_every(), 10);
        assert_eq!(config.shuffle(), Some(0));
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SPHERE_EVAL_TEST_DATA", "/mnt/sun360");

        let toml_content = r#"
[evaluation]
epochs = [1]

[dataset]
data_path = "${SPHERE_EVAL_TEST_DATA}"

[checkpoint]
save_path = "./saves"
save_file_name = "model"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dataset.data_path, "/mnt/sun360");

        std::env::remove_var("SPHERE_EVAL_TEST_DATA");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[evaluation]
epochs = []

[dataset]
data_path = "./data"

[checkpoint]
save_path = "./saves"
save_file_name = "model"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shuffle_can_be_disabled() {
        let seeded = BASIC.replace("batch_size = 16", "batch_size = 16\nshuffle_seed = 9");
        assert_eq!(TomlConfig::from_toml_str(&seeded).unwrap().shuffle(), Some(9));

        let ordered = BASIC.replace("batch_size = 16", "batch_size = 16\nshuffle = false\nshuffle_seed = 9");
        assert_eq!(TomlConfig::from_toml_str(&ordered).unwrap().shuffle(), None);
    }

    #[test]
    fn test_bad_output_kind_is_parse_error() {
        let content = BASIC.replace("probabilities", "votes");
        let err = TomlConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, EvalError::TomlError(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.save_file_name(), "densenet_101_kappa_25");
    }
}
