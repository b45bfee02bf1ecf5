use clap::Parser;
use sphere_eval::app::{report, session};
use sphere_eval::config::toml_config::TomlConfig;
use sphere_eval::core::checkpoint::checkpoint_path;
use sphere_eval::core::dataset::POINTS_FILE;
use sphere_eval::core::ConfigProvider;
use sphere_eval::utils::error::worst_severity;
use sphere_eval::utils::{logger, validation::Validate};
use sphere_eval::{EvalError, LocalStorage};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-eval")]
#[command(about = "Evaluate one or more checkpoints described by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "eval-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Evaluate only this epoch instead of the configured list
    #[arg(long)]
    epoch: Option<u32>,

    /// Dry run - show what would be evaluated without executing
    #[arg(long)]
    dry_run: bool,
}

fn fail(e: &EvalError, stage: &str) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the file, so report on stderr only.
            eprintln!("❌ failed to load config file '{}': {}", args.config, e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    };

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based evaluation");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(epoch) = args.epoch {
        config.evaluation.epochs = vec![epoch];
        tracing::info!("🔧 Epoch list overridden to: [{}]", epoch);
    }

    if let Err(e) = config.validate() {
        fail(&e, "Configuration validation");
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No evaluation will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let dataset = match session::load_dataset(&config) {
        Ok(dataset) => dataset,
        Err(e) => fail(&e, "Loading dataset"),
    };
    let out_dir = config.output_directory().unwrap_or(".").to_string();
    let history = config
        .history_file()
        .map(|h| Path::new(&out_dir).join(h).display().to_string());
    let storage = LocalStorage::new(out_dir);

    let mut failures = Vec::new();
    for &epoch in config.epochs() {
        match session::evaluate_epoch(&config, &dataset, epoch, history.as_deref(), monitor_enabled) {
            Ok(eval_report) => {
                report::print_summary(&eval_report);
                if let Some(stem) = config.report_stem() {
                    let file = format!("{}.{}.json", stem, epoch);
                    if let Err(e) = report::write_report(&storage, &file, &eval_report) {
                        fail(&e, "Writing report");
                    }
                    tracing::info!("📁 Report saved to: {}/{}", storage.base_path(), file);
                }
            }
            Err(e) => {
                tracing::error!(
                    "❌ Epoch {} failed: {} (Category: {:?}, Severity: {:?})",
                    epoch,
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                eprintln!("❌ {}", e.user_friendly_message());
                failures.push(e);
            }
        }
    }

    if let Some(severity) = worst_severity(&failures) {
        eprintln!("❌ {} of {} epochs failed", failures.len(), config.epochs().len());
        std::process::exit(severity.exit_code().max(1));
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Data: {} (split '{}')", config.data_path(), config.split());
    println!(
        "  Checkpoints: {}/{}.<epoch>.csv",
        config.save_path(),
        config.save_file_name()
    );
    println!(
        "  Epochs: {}",
        config
            .epochs()
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Batch Size: {}", config.batch_size());
    println!("  Outputs: {}", config.output_kind().as_str());
    println!("  Unit: {}", config.unit().as_str());

    if let Some(seed) = config.shuffle() {
        println!("  Shuffle Seed: {}", seed);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("💾 Checkpoint Files:");
    for &epoch in config.epochs() {
        let path = checkpoint_path(config.save_path(), config.save_file_name(), epoch);
        let status = if path.is_file() { "✅" } else { "❌ missing" };
        println!("  {} {}", path.display(), status);
    }

    println!();
    println!("📊 Dataset:");
    let points = Path::new(config.data_path()).join(POINTS_FILE);
    if points.is_file() {
        println!("  Candidates: {}", points.display());
    } else if let Some(n) = config.candidate_count() {
        println!("  Candidates: {} generated lattice points", n);
    } else {
        println!("  Candidates: ❌ {} missing", points.display());
    }
    let split = Path::new(config.data_path()).join(format!("{}.csv", config.split()));
    println!("  Split: {}", split.display());

    if let Some(dir) = config.output_directory() {
        println!();
        println!("📁 Output:");
        println!("  Directory: {}", dir);
        if let Some(stem) = config.report_stem() {
            println!("  Reports: {}.<epoch>.json", stem);
        }
        if let Some(history) = config.history_file() {
            println!("  History: {}", history);
        }
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
