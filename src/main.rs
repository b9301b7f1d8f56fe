use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rectify_engine::utils::{logger, validation::Validate};
use rectify_engine::{
    seeded_rng, CalibrationConfig, CliConfig, Mode, RectificationEngine, RectificationRequest,
    RectificationResult, RectifyError,
};

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting rectify CLI");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match run(&config) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(
                "❌ Rectification failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.severity().exit_code());
        }
    };

    let output = if config.pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    }
    .context("failed to serialize rectification result")?;
    println!("{}", output);

    Ok(())
}

fn run(config: &CliConfig) -> Result<RectificationResult, RectifyError> {
    let calibration = match &config.calibration {
        Some(path) => {
            tracing::info!("📁 Loading calibration from: {}", path);
            CalibrationConfig::from_file(path)?
        }
        None => CalibrationConfig::default(),
    };
    let engine = RectificationEngine::new(calibration)?;

    tracing::info!("📁 Loading request from: {}", config.request);
    let request = RectificationRequest::from_file(&config.request)?;
    let record = request.birth_record()?;

    let mut rng = match config.seed {
        Some(seed) => seeded_rng(seed),
        None => ChaCha8Rng::from_os_rng(),
    };

    match config.mode {
        Mode::Questionnaire => {
            engine.rectify_from_questionnaire(&record, &request.answers, &mut rng)
        }
        Mode::LifeEvents => engine.rectify_from_life_events(&record, &request.events, &mut rng),
        Mode::Combined => {
            engine.rectify_combined(&record, &request.answers, &request.events, &mut rng)
        }
    }
}
