use crate::domain::model::EvalReport;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub fn write_report<S: Storage>(storage: &S, file_name: &str, report: &EvalReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    tracing::debug!("Writing report ({} bytes) to {}", json.len(), file_name);
    storage.write_file(file_name, json.as_bytes())
}

pub fn print_summary(report: &EvalReport) {
    let unit = report.unit.as_str();
    println!("📋 Evaluation Summary (epoch {}):", report.epoch);
    println!("  Samples: {} in {} batches", report.samples, report.batches);
    println!(
        "  Expectation: {:.4} {} (median {:.4}, p90 {:.4}, max {:.4})",
        report.angle_exp,
        unit,
        report.exp_stats.median,
        report.exp_stats.p90,
        report.exp_stats.max
    );
    println!(
        "  Arg-max:     {:.4} {} (median {:.4}, p90 {:.4}, max {:.4})",
        report.angle_max,
        unit,
        report.max_stats.median,
        report.max_stats.p90,
        report.max_stats.max
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::domain::model::{AngleUnit, ErrorStats, SampleScore};
    use tempfile::TempDir;

    #[test]
    fn test_report_is_written_as_json() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
        let report = EvalReport {
            epoch: 50,
            unit: AngleUnit::Degrees,
            batches: 1,
            samples: 2,
            angle_exp: 3.5,
            angle_max: 4.5,
            exp_stats: ErrorStats::default(),
            max_stats: ErrorStats::default(),
            elapsed_secs: 0.1,
            batch_scores: vec![],
            sample_scores: vec![SampleScore {
                id: "img_7".to_string(),
                angle_exp: 3.0,
                angle_max: 4.0,
                argmax_index: 12,
            }],
        };

        write_report(&storage, "report.json", &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.path().join("report.json")).unwrap()).unwrap();
        assert_eq!(value["epoch"], 50);
        assert_eq!(value["unit"], "degrees");
        assert_eq!(value["angle_exp"], 3.5);
        assert_eq!(value["sample_scores"][0]["id"], "img_7");
        assert_eq!(value["sample_scores"][0]["argmax_index"], 12);
    }
}
