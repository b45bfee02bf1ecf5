use serde::{Deserialize, Serialize};

/// A point in R^3. Unit length wherever it stands for a direction.
pub type Direction = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Degrees,
    Radians,
}

impl AngleUnit {
    pub fn convert_radians(self, radians: f64) -> f64 {
        match self {
            AngleUnit::Degrees => radians.to_degrees(),
            AngleUnit::Radians => radians,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AngleUnit::Degrees => "degrees",
            AngleUnit::Radians => "radians",
        }
    }
}

impl std::str::FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "degrees" | "deg" => Ok(AngleUnit::Degrees),
            "radians" | "rad" => Ok(AngleUnit::Radians),
            other => Err(format!("unknown angle unit '{}'", other)),
        }
    }
}

/// What the recorded network outputs hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Raw scores; softmax is applied before decoding.
    #[default]
    Logits,
    /// Already a distribution over the candidates.
    Probabilities,
}

impl OutputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Logits => "logits",
            OutputKind::Probabilities => "probabilities",
        }
    }
}

impl std::str::FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "logits" => Ok(OutputKind::Logits),
            "probabilities" | "probs" => Ok(OutputKind::Probabilities),
            other => Err(format!("unknown output kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleScore {
    pub id: String,
    pub angle_exp: f64,
    pub angle_max: f64,
    pub argmax_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScore {
    pub index: usize,
    pub samples: usize,
    pub angle_exp: f64,
    pub angle_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ErrorStats {
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub epoch: u32,
    pub unit: AngleUnit,
    pub batches: usize,
    pub samples: usize,
    /// Mean of the per-batch means.
    pub angle_exp: f64,
    pub angle_max: f64,
    pub exp_stats: ErrorStats,
    pub max_stats: ErrorStats,
    pub elapsed_secs: f64,
    pub batch_scores: Vec<BatchScore>,
    pub sample_scores: Vec<SampleScore>,
}
