use sphere_eval::app::session;
use sphere_eval::config::toml_config::TomlConfig;
use sphere_eval::core::ConfigProvider;
use sphere_eval::EvalError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const POINTS: &str = "x,y,z\n1,0,0\n0,1,0\n0,0,1\n-1,0,0\n0,-1,0\n0,0,-1\n";

const SPLIT: &str = "id,x,y,z\n\
img_0,1,0,0\n\
img_1,0,1,0\n\
img_2,0,0,1\n\
img_3,0,0,-1\n\
img_4,1,1,0\n";

// img_4 sits halfway between +x and +y. Its distribution splits mass evenly,
// so the expectation is exact while arg-max picks +x (45 degrees off).
const LOGITS: &str = "id,o0,o1,o2,o3,o4,o5\n\
img_0,40,0,0,0,0,0\n\
img_1,0,40,0,0,0,0\n\
img_2,0,0,40,0,0,0\n\
img_3,0,0,0,0,0,40\n\
img_4,20,20,0,0,0,0\n";

struct Fixture {
    _dir: TempDir,
    root: String,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap().to_string();
        let data = dir.path().join("data");
        let saves = dir.path().join("saves");
        fs::create_dir_all(&data).unwrap();
        fs::create_dir_all(&saves).unwrap();
        fs::write(data.join("points.csv"), POINTS).unwrap();
        fs::write(data.join("test.csv"), SPLIT).unwrap();
        fs::write(saves.join("model.50.csv"), LOGITS).unwrap();
        Self { _dir: dir, root }
    }

    fn config(&self, extra: &str) -> TomlConfig {
        let content = format!(
            r#"
[evaluation]
epochs = [50]
batch_size = 2
{extra}

[dataset]
data_path = "{root}/data"

[checkpoint]
save_path = "{root}/saves"
save_file_name = "model"
"#,
            root = self.root,
            extra = extra
        );
        TomlConfig::from_toml_str(&content).unwrap()
    }

    fn path(&self, rel: &str) -> String {
        Path::new(&self.root).join(rel).display().to_string()
    }
}

#[test]
fn test_end_to_end_evaluation() {
    let fixture = Fixture::new();
    let config = fixture.config("shuffle = false");

    let dataset = session::load_dataset(&config).unwrap();
    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.points.len(), 6);

    let report = session::evaluate_epoch(&config, &dataset, 50, None, false).unwrap();

    assert_eq!(report.samples, 5);
    assert_eq!(report.batches, 3);
    assert!(report.exp_stats.max < 1e-4);
    // Batches: [img_0, img_1] -> 0, [img_2, img_3] -> 0, [img_4] -> 45.
    assert!((report.angle_max - 15.0).abs() < 1e-9);
    assert!((report.max_stats.mean - 9.0).abs() < 1e-9);
    assert!((report.max_stats.max - 45.0).abs() < 1e-9);
}

#[test]
fn test_shuffle_keeps_sample_level_stats() {
    let fixture = Fixture::new();
    let config = fixture.config("shuffle_seed = 11");
    let dataset = session::load_dataset(&config).unwrap();

    let report = session::evaluate_epoch(&config, &dataset, 50, None, false).unwrap();
    assert_eq!(report.samples, 5);
    assert!((report.max_stats.mean - 9.0).abs() < 1e-9);
}

#[test]
fn test_history_is_appended_per_epoch() {
    let fixture = Fixture::new();
    let config = fixture.config("shuffle = false");
    let dataset = session::load_dataset(&config).unwrap();
    let history = fixture.path("out/history.csv");

    session::evaluate_epoch(&config, &dataset, 50, Some(&history), false).unwrap();
    session::evaluate_epoch(&config, &dataset, 50, Some(&history), false).unwrap();

    let content = fs::read_to_string(&history).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains(",50,15.000000,"));
}

#[test]
fn test_missing_checkpoint_reports_full_path() {
    let fixture = Fixture::new();
    let config = fixture.config("");
    let dataset = session::load_dataset(&config).unwrap();

    let err = session::evaluate_epoch(&config, &dataset, 7, None, false).unwrap_err();
    match err {
        EvalError::CheckpointNotFound { path } => assert!(path.ends_with("model.7.csv")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_probability_outputs_skip_softmax() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("saves/model.3.csv"),
        "id,o0,o1,o2,o3,o4,o5\n\
         img_0,0,1,0,0,0,0\n\
         img_1,0,1,0,0,0,0\n\
         img_2,0,1,0,0,0,0\n\
         img_3,0,1,0,0,0,0\n\
         img_4,0,1,0,0,0,0\n",
    )
    .unwrap();
    let config = fixture.config("output_kind = \"probabilities\"\nunit = \"radians\"");
    assert_eq!(config.unit().as_str(), "radians");
    let dataset = session::load_dataset(&config).unwrap();

    let report = session::evaluate_epoch(&config, &dataset, 3, None, false).unwrap();
    // Everything predicted on +y: 90, 0, 90, 90, 45 degrees.
    let expected = (90.0 + 0.0 + 90.0 + 90.0 + 45.0_f64).to_radians() / 5.0;
    assert!((report.max_stats.mean - expected).abs() < 1e-9);
    assert!((report.exp_stats.mean - expected).abs() < 1e-9);
}

#[test]
fn test_width_mismatch_is_reported() {
    let fixture = Fixture::new();
    fs::write(
        fixture.path("saves/model.4.csv"),
        "id,o0,o1\nimg_0,1,0\nimg_1,1,0\nimg_2,1,0\nimg_3,1,0\nimg_4,1,0\n",
    )
    .unwrap();
    let config = fixture.config("");
    let dataset = session::load_dataset(&config).unwrap();

    let err = session::evaluate_epoch(&config, &dataset, 4, None, false).unwrap_err();
    assert!(matches!(err, EvalError::ShapeMismatch { expected: 6, actual: 2, .. }));
}
