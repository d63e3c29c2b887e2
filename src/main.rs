//! shelf-audit - Retail shelf compliance auditing
//!
//! Analyzes a shelf photograph against a declared planogram: which detected
//! items are correctly placed, which are misplaced, each section's stock
//! status, and the remediation tasks that follow.

mod analysis;
mod detect;
mod geometry;
mod planogram;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::analysis::ComplianceEngine;
use crate::detect::StubDetector;
use crate::planogram::settings::{load_settings, EngineSettings};
use crate::planogram::PlanogramConfig;

/// Retail shelf compliance auditing
#[derive(Parser, Debug)]
#[command(name = "shelf-audit")]
#[command(about = "Audit shelf photographs against a planogram")]
struct Args {
    /// Engine settings file (TOML); defaults apply when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a planogram document for structural issues
    Validate {
        /// Planogram JSON document
        planogram: PathBuf,
    },
    /// Analyze a shelf photograph against a planogram.
    ///
    /// Runs the scripted demo detector; production deployments attach a
    /// real model behind the same detector contract.
    Analyze {
        /// Planogram JSON document
        #[arg(short, long)]
        planogram: PathBuf,
        /// Shelf photograph to analyze
        #[arg(short, long)]
        image: PathBuf,
        /// Where to write the annotated image, if wanted
        #[arg(long)]
        annotated: Option<PathBuf>,
    },
    /// Write a sample planogram document
    Sample {
        /// Output path for the document
        #[arg(short, long, default_value = "sample_planogram.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("failed to load settings from {:?}", path))?,
        None => EngineSettings::default(),
    };

    match args.command {
        Command::Validate { planogram } => {
            let config = PlanogramConfig::load(&planogram)
                .with_context(|| format!("failed to load planogram {:?}", planogram))?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("OK: {} sections, no issues", config.sections.len());
            } else {
                println!("{} issue(s) found:", issues.len());
                for issue in &issues {
                    println!("  - {}", issue);
                }
                std::process::exit(1);
            }
        }

        Command::Analyze {
            planogram,
            image,
            annotated,
        } => {
            let engine = ComplianceEngine::with_detector(
                settings.detection.clone(),
                Box::new(StubDetector::demo()),
            );
            engine
                .load_planogram(&planogram)
                .with_context(|| format!("failed to load planogram {:?}", planogram))?;

            let photo = image::open(&image)
                .with_context(|| format!("failed to load image {:?}", image))?;
            let result = engine.analyze(&photo);

            if let Some(path) = annotated {
                if let Some(canvas) = &result.annotated_image {
                    canvas
                        .save(&path)
                        .with_context(|| format!("failed to write annotated image {:?}", path))?;
                    info!("Wrote annotated image to {:?}", path);
                }
            }

            let report = serde_json::json!({
                "analysis_id": result.analysis_id.to_string(),
                "compliance_score": result.compliance_score,
                "error": result.error,
                "detected_items": result.detected_rows(),
                "misplaced_items": result.misplaced_rows(),
                "inventory": result.inventory_rows(),
                "tasks": result.tasks,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Command::Sample { out } => {
            let config = PlanogramConfig::sample();
            config
                .save(&out)
                .with_context(|| format!("failed to write sample planogram {:?}", out))?;
            println!("Wrote sample planogram to {}", out.display());
        }
    }

    Ok(())
}
