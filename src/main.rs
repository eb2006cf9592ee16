//! churnscope: score one customer for churn risk
//!
//! Loads the model artifact once, encodes the customer form, scores it and
//! prints the report.

use anyhow::{Context, Result};
use churnscope::{artifact, classify, viz, Args, FeatureEncoder};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    // Nothing else happens without a model
    let bundle = match artifact::load_cached(&args.artifact) {
        Ok(bundle) => bundle,
        Err(err) => {
            tracing::error!(error = %err, "failed to load model artifact");
            eprintln!("Error loading model: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, bundle) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "prediction failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "churnscope=debug" } else { "churnscope=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// One encode, predict, render cycle
fn run(args: &Args, bundle: &artifact::ArtifactBundle) -> Result<()> {
    let encoder = FeatureEncoder::new(&bundle.schema).context("feature schema cannot be encoded")?;

    if args.verbose {
        println!("churnscope - Customer Churn Prediction");
        println!("======================================\n");
        println!("Artifact: {}", args.artifact.display());
        println!("Features: {}", bundle.schema.len());
        println!("Training means (reference):");
        for (name, mean) in bundle.scaler.training_means() {
            println!("  {:<15} {:.2}", name, mean);
        }
        println!();
    }

    let input = args.customer_input()?;
    input.validate().context("invalid customer form")?;

    let vector = encoder.encode(&input, &bundle.scaler);
    let prediction = classify(&bundle.classifier, &vector).context("scoring failed")?;

    viz::print_prediction_report(&input, &prediction);

    if args.debug {
        viz::print_encoded_vector(&vector, &bundle.schema);
    }

    let weights = bundle.classifier.feature_importance(&bundle.schema);
    if let Some(top) = args.top {
        viz::print_top_weights(&weights, top);
    }
    if let Some(ref path) = args.importance_chart {
        viz::create_importance_chart(&weights, path)?;
        println!("\nFeature weight chart saved to: {}", path);
    }

    Ok(())
}
