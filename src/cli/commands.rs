//! Command implementations for the Verity CLI.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::VerityConfig;
use crate::model::repository::ModelRepository;
use crate::samples::{SampleCatalog, SampleLabel};
use crate::service::PredictionService;
use crate::training::{self, FAKE_CLASS, TRUE_CLASS, Trainer};

/// Execute a CLI command.
pub fn execute_command(args: VerityArgs) -> Result<()> {
    let config = load_config(&args)?;

    match &args.command {
        Command::Predict(predict_args) => predict(predict_args, &config, &args),
        Command::Train(train_args) => train(train_args, &config, &args),
        Command::Info => show_info(&config, &args),
        Command::Samples(samples_args) => list_samples(samples_args, &config, &args),
        Command::Health => show_health(&config, &args),
    }
}

/// Read the configuration file, if any, and apply command line overrides.
fn load_config(args: &VerityArgs) -> Result<VerityConfig> {
    let mut config = match &args.config {
        Some(path) => VerityConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => VerityConfig::default(),
    };

    if let Some(model) = &args.model {
        config.model.path = model.clone();
        config.model.legacy_path = None;
    }

    debug!("Effective configuration: {config:?}");
    Ok(config)
}

fn build_service(config: &VerityConfig) -> Result<PredictionService> {
    let normalizer = config
        .text
        .build_normalizer()
        .context("Failed to build text normalizer")?;

    let mut repository = ModelRepository::new(&config.model.path)
        .with_expected_min_word_length(config.text.min_word_length);
    if let Some(legacy) = &config.model.legacy_path {
        repository = repository.with_legacy_path(legacy);
    }

    Ok(PredictionService::new(
        Arc::new(normalizer),
        Arc::new(repository),
    ))
}

/// Classify one text, standard input, or every line of a file.
fn predict(args: &PredictArgs, config: &VerityConfig, cli_args: &VerityArgs) -> Result<()> {
    let texts: Vec<String> = if let Some(file) = &args.file {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        content.lines().map(str::to_string).collect()
    } else if args.stdin {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read standard input")?;
        vec![input]
    } else if let Some(text) = &args.text {
        vec![text.clone()]
    } else {
        bail!("Provide text to classify, --stdin or --file");
    };

    let service = build_service(config)?;
    let inputs: Vec<Option<&str>> = texts.iter().map(|t| Some(t.as_str())).collect();
    let results = service.predict_batch(&inputs);

    let lines: Vec<PredictionLine> = texts
        .into_iter()
        .zip(results)
        .map(|(text, result)| PredictionLine {
            normalized: args
                .show_normalized
                .then(|| service.normalizer().clean(&text)),
            text,
            result,
        })
        .collect();

    output_predictions(&lines, cli_args)?;

    if lines.len() == 1 && lines[0].result.is_error() {
        bail!("Prediction failed");
    }
    Ok(())
}

/// Train a model from labelled files and save the artifact.
fn train(args: &TrainArgs, config: &VerityConfig, cli_args: &VerityArgs) -> Result<()> {
    let start = Instant::now();

    let documents = match (&args.jsonl, &args.fake_csv, &args.true_csv) {
        (Some(jsonl), _, _) => training::read_jsonl(jsonl)
            .with_context(|| format!("Failed to read {}", jsonl.display()))?,
        (None, Some(fake), Some(genuine)) => {
            let mut documents = training::read_csv(fake, FAKE_CLASS)
                .with_context(|| format!("Failed to read {}", fake.display()))?;
            documents.extend(
                training::read_csv(genuine, TRUE_CLASS)
                    .with_context(|| format!("Failed to read {}", genuine.display()))?,
            );
            documents
        }
        _ => {
            let fake = PathBuf::from("Fake.csv");
            let genuine = PathBuf::from("True.csv");
            if !fake.exists() || !genuine.exists() {
                bail!("No corpus given: use --jsonl or --fake-csv/--true-csv");
            }
            let mut documents = training::read_csv(&fake, FAKE_CLASS)?;
            documents.extend(training::read_csv(&genuine, TRUE_CLASS)?);
            documents
        }
    };
    info!("Read {} labelled documents", documents.len());

    let mut training_config = config.training.clone();
    if let Some(seed) = args.seed {
        training_config.seed = seed;
    }

    let normalizer = Arc::new(config.text.build_normalizer()?);
    let trainer = Trainer::new(normalizer, training_config);
    let total = documents.len();
    let outcome = trainer.train(documents).context("Training failed")?;

    let output = args.output.clone().unwrap_or_else(|| config.model.path.clone());
    outcome
        .artifact
        .save(&output)
        .with_context(|| format!("Failed to write model to {}", output.display()))?;

    let summary = TrainingSummary {
        artifact_path: output.display().to_string(),
        documents: total - outcome.dropped,
        dropped: outcome.dropped,
        vocabulary_size: outcome.artifact.vectorizer.vocabulary_size(),
        duration_ms: start.elapsed().as_millis() as u64,
        report: outcome.report,
    };
    output_training(&summary, cli_args)?;
    Ok(())
}

/// Show the model description.
fn show_info(config: &VerityConfig, cli_args: &VerityArgs) -> Result<()> {
    let service = build_service(config)?;
    let info = service.model_info();
    output_result("Model information", &info, cli_args)?;
    if let Some(reason) = &info.error {
        bail!(
            "Model could not be loaded from {}: {reason}",
            config.model.path.display()
        );
    }
    Ok(())
}

/// List sample headlines.
fn list_samples(args: &SamplesArgs, config: &VerityConfig, cli_args: &VerityArgs) -> Result<()> {
    let path = args.file.as_ref().unwrap_or(&config.samples.path);
    let catalog = SampleCatalog::load(path);
    let count = args.count.unwrap_or(config.samples.default_count);
    let label = args.label.map(|label| match label {
        SampleLabelArg::Fake => SampleLabel::Fake,
        SampleLabelArg::True => SampleLabel::True,
    });

    let samples = if args.random {
        catalog.random(label).cloned().into_iter().collect::<Vec<_>>()
    } else {
        match label {
            Some(SampleLabel::Fake) => catalog.fake(count),
            Some(SampleLabel::True) => catalog.true_samples(count),
            None => catalog.all().to_vec(),
        }
    };

    output_result("Samples", &samples, cli_args)?;
    Ok(())
}

/// Report whether the model and samples are available.
fn show_health(config: &VerityConfig, cli_args: &VerityArgs) -> Result<()> {
    let catalog = Arc::new(SampleCatalog::load(&config.samples.path));
    let service = build_service(config)?.with_samples(catalog);
    // A failed load shows up as model_loaded: false
    let _ = service.warm_up();
    output_result("Health", &service.health(), cli_args)?;
    Ok(())
}
