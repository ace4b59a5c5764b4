//! Center-circle task CLI.
//!
//! `generate` produces the input images, ground truth, schema, and
//! instruction document for one task variant. `validate`, `score`, and
//! `annotate` operate on a task directory containing `input/` and the
//! agent's `solution.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use task::core::score::score_solution;
use task::core::target::Variant;
use task::exit_codes;
use task::io::config::{load_config, write_config};
use task::io::instructions::write_instructions;
use task::io::render::{generate_inputs, write_prediction_overlay, write_truth_overlays};
use task::io::target::{load_targets_optional, resolve_truths, write_targets};
use task::validate::{SolutionCheck, check_solution_file, solution_schema};

#[derive(Parser)]
#[command(name = "task", version, about = "Center-circle task tooling")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate inputs, ground truth, schema, and instructions.
    Generate {
        /// Task directory to populate.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Task variant: crosshair | centering.
        #[arg(long, default_value = "crosshair")]
        variant: String,
        /// Seed for reproducible target sampling.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check `solution.json` against the schema and task invariants.
    Validate {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Score `solution.json` against ground truth (or image centers).
    Score {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Render `_pred` overlays from `solution.json` for visual self-check.
    Annotate {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    task::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate { out, variant, seed } => cmd_generate(&out, &variant, seed),
        Command::Validate { dir } => cmd_validate(&dir),
        Command::Score { dir } => cmd_score(&dir),
        Command::Annotate { dir } => cmd_annotate(&dir),
    }
}

fn config_path(dir: &Path) -> PathBuf {
    dir.join(".task").join("config.toml")
}

fn cmd_generate(out: &Path, variant: &str, seed: Option<u64>) -> Result<i32> {
    let variant: Variant = variant.parse()?;
    let cfg = load_config(&config_path(out)).context("load task config")?;
    let input_dir = out.join("input");

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let targets =
        generate_inputs(&input_dir, &cfg, variant, &mut rng).context("generate inputs")?;

    if let Some(targets) = &targets {
        write_targets(&input_dir.join("targets.json"), targets).context("write ground truth")?;
        write_truth_overlays(&input_dir, &input_dir, targets).context("write overlays")?;
    }

    let schema_path = out.join("schemas").join("solution").join("v1.schema.json");
    let schema_dir = schema_path
        .parent()
        .context("schema path missing parent")?;
    std::fs::create_dir_all(schema_dir)
        .with_context(|| format!("create {}", schema_dir.display()))?;
    std::fs::write(&schema_path, solution_schema())
        .with_context(|| format!("write {}", schema_path.display()))?;

    write_config(&config_path(out), &cfg).context("write task config")?;
    write_instructions(out, &cfg, variant).context("write instructions")?;

    println!(
        "generate: variant={} images={} dir={}",
        variant.as_str(),
        cfg.images.len(),
        input_dir.display()
    );
    Ok(exit_codes::OK)
}

fn cmd_validate(dir: &Path) -> Result<i32> {
    let cfg = load_config(&config_path(dir)).context("load task config")?;
    let check = check_solution_file(&dir.join("solution.json"), &cfg.images)?;
    match check {
        SolutionCheck::Valid { solution } => {
            println!("validate: ok circles={}", solution.circles.len());
            Ok(exit_codes::OK)
        }
        other => {
            report_invalid(&other);
            Ok(exit_codes::INVALID_SOLUTION)
        }
    }
}

fn cmd_score(dir: &Path) -> Result<i32> {
    let cfg = load_config(&config_path(dir)).context("load task config")?;
    let solution = match check_solution_file(&dir.join("solution.json"), &cfg.images)? {
        SolutionCheck::Valid { solution } => solution,
        other => {
            report_invalid(&other);
            return Ok(exit_codes::INVALID_SOLUTION);
        }
    };

    let input_dir = dir.join("input");
    let targets = load_targets_optional(&input_dir.join("targets.json"))?;
    let truths = resolve_truths(&input_dir, &cfg.images, targets.as_ref())?;
    let card = score_solution(&truths, &solution, &cfg.criteria());

    for score in &card.per_image {
        match score.error_px {
            Some(error) => println!(
                "score: image={} error_px={:.2} correct={}",
                score.image, error, score.correct
            ),
            None => println!("score: image={} error_px=none correct=false", score.image),
        }
    }
    println!(
        "score: correct={}/{} tolerance_px={}",
        card.summary.num_correct, card.summary.num_images, card.summary.tolerance_px
    );
    if let Some(avg) = card.summary.avg_center_error_px {
        println!("score: avg_error_px={:.2}", avg);
    }
    if let Some(max) = card.summary.max_center_error_px {
        println!("score: max_error_px={:.2}", max);
    }

    if card.passed {
        println!("score: passed");
        Ok(exit_codes::OK)
    } else {
        println!("score: failed");
        Ok(exit_codes::OUT_OF_TOLERANCE)
    }
}

fn cmd_annotate(dir: &Path) -> Result<i32> {
    let cfg = load_config(&config_path(dir)).context("load task config")?;
    let solution = match check_solution_file(&dir.join("solution.json"), &cfg.images)? {
        SolutionCheck::Valid { solution } => solution,
        other => {
            report_invalid(&other);
            return Ok(exit_codes::INVALID_SOLUTION);
        }
    };

    let input_dir = dir.join("input");
    for entry in &solution.circles {
        let path = write_prediction_overlay(
            &input_dir,
            &input_dir,
            &entry.image,
            entry.center(),
            entry.radius,
        )?;
        println!("annotate: wrote {}", path.display());
    }
    Ok(exit_codes::OK)
}

fn report_invalid(check: &SolutionCheck) {
    match check {
        SolutionCheck::Missing => println!("validate: solution.json not found"),
        SolutionCheck::Unreadable { message } => {
            println!("validate: solution.json is not valid JSON: {message}");
        }
        SolutionCheck::SchemaInvalid { violations } => {
            println!("validate: schema violations:");
            for violation in violations {
                println!("- {violation}");
            }
        }
        SolutionCheck::InvariantViolations { violations } => {
            println!("validate: invariant violations:");
            for violation in violations {
                println!("- {violation}");
            }
        }
        SolutionCheck::Valid { .. } => {}
    }
}
