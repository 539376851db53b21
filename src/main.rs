//! AgriAid CLI
//!
//! Offline access to the diagnosis pipeline: list the crop catalog, check
//! which crop models load, and diagnose a single leaf image.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use agriaid::backend::{backend_name, default_device};
use agriaid::crops::display_label;
use agriaid::utils::logging::{init_logging, LogConfig};
use agriaid::remediation::DEFAULT_DATABASE_FILE;
use agriaid::{Crop, Diagnoser, DiseaseDatabase, ModelRegistry, DEFAULT_MODELS_DIR};

/// Crop leaf disease diagnosis
#[derive(Parser, Debug)]
#[command(name = "agriaid")]
#[command(version)]
#[command(about = "Diagnose crop leaf diseases from photos", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List supported crops and their disease classes
    Crops,

    /// Load every crop model and report which ones are available
    Models {
        /// Directory containing <crop>_model.mpk / <crop>_model.pth files
        #[arg(short, long, default_value = DEFAULT_MODELS_DIR, env = "AGRIAID_MODELS_DIR")]
        models_dir: PathBuf,
    },

    /// Diagnose a single leaf image
    Predict {
        /// Crop the photo shows (sugarcane, wheat, rice, corn, potato)
        #[arg(short, long)]
        crop: String,

        /// Path to the leaf image
        #[arg(short, long)]
        image: PathBuf,

        /// Directory containing the crop models
        #[arg(short, long, default_value = DEFAULT_MODELS_DIR, env = "AGRIAID_MODELS_DIR")]
        models_dir: PathBuf,

        /// Disease database JSON file
        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE, env = "AGRIAID_DATABASE")]
        database: PathBuf,

        /// Print the diagnosis as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Crops => print_crops(),
        Commands::Models { models_dir } => print_models(models_dir),
        Commands::Predict {
            crop,
            image,
            models_dir,
            database,
            json,
        } => predict(&crop, image, models_dir, database, json)?,
    }

    Ok(())
}

fn print_crops() {
    println!("{}", "Supported crops".green().bold());
    for crop in Crop::ALL {
        println!("\n  {} ({})", crop.display_name().bold(), crop.key());
        for (i, label) in crop.classes().iter().enumerate() {
            println!("    {}. {}", i, display_label(label));
        }
    }
}

fn print_models(models_dir: PathBuf) {
    println!("Backend: {}", backend_name());
    let registry: ModelRegistry = ModelRegistry::load(&models_dir, default_device());

    for status in registry.status() {
        if status.loaded {
            let format = status.format.map(|f| f.to_string()).unwrap_or_default();
            println!("  {} {} ({})", "✓".green(), status.display_name, format);
        } else {
            let reason = status.reason.unwrap_or_default();
            println!("  {} {} - {}", "✗".red(), status.display_name, reason);
        }
    }

    println!(
        "\n{} of {} crop models available",
        registry.len(),
        Crop::ALL.len()
    );
}

fn predict(
    crop: &str,
    image: PathBuf,
    models_dir: PathBuf,
    database: PathBuf,
    json: bool,
) -> Result<()> {
    let crop: Crop = crop.parse()?;

    let registry: ModelRegistry = ModelRegistry::load(&models_dir, default_device());
    let diagnoser = Diagnoser::new(registry, DiseaseDatabase::load_or_empty(&database));

    let diagnosis = diagnoser
        .diagnose_file(crop, &image)
        .with_context(|| format!("Failed to diagnose {:?}", image))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        return Ok(());
    }

    println!("{}", diagnosis.details.display());

    let verdict = if diagnosis.is_healthy {
        diagnosis.prediction.green().bold()
    } else {
        diagnosis.prediction.red().bold()
    };
    println!("{} {}", "Diagnosis:".bold(), verdict);

    if let Some(remediation) = &diagnosis.remediation {
        println!("\n{}", remediation.info.description);
        print_section("Organic solutions", &remediation.info.organic_solutions);
        print_section("Chemical solutions", &remediation.info.chemical_solutions);
        print_section("Prevention", &remediation.info.prevention);
    }

    Ok(())
}

fn print_section(title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}", title.yellow().bold());
    for item in items {
        println!("  - {}", item);
    }
}
