use clap::Parser;
use sphere_eval::app::{report, session};
use sphere_eval::utils::{logger, validation::Validate};
use sphere_eval::{CliConfig, EvalError, LocalStorage};

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
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting sphere-eval");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e, "Configuration validation");
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let dataset = match session::load_dataset(&config) {
        Ok(dataset) => dataset,
        Err(e) => fail(&e, "Loading dataset"),
    };
    tracing::info!(
        "📁 {} samples, {} candidate directions",
        dataset.len(),
        dataset.points.len()
    );

    let result = session::evaluate_epoch(
        &config,
        &dataset,
        config.epoch,
        config.history.as_deref(),
        config.monitor,
    );

    match result {
        Ok(eval_report) => {
            report::print_summary(&eval_report);
            if let Some(path) = &config.report {
                let storage = LocalStorage::new(".".to_string());
                if let Err(e) = report::write_report(&storage, path, &eval_report) {
                    fail(&e, "Writing report");
                }
                println!("📁 Report saved to: {}", path);
            }
        }
        Err(e) => fail(&e, "Evaluation"),
    }

    Ok(())
}
