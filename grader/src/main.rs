mod case;
mod cli;
mod config;
mod harness;
mod hints;
mod judge;
mod outcome;
mod report;
mod results;
mod run;
mod workspace;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::hints::{DEFAULT_MAX_PROMPTS, Hint};

#[derive(Parser)]
#[command(name = "grader", version, about = "Grading harness for the center-circle task")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available cases.
    List,
    /// Grade a case: create a workspace, run the solver, judge the solution.
    Run {
        case_id: String,
        #[arg(long, default_value_t = 1)]
        runs: u32,
    },
    /// Aggregate results for a case.
    Report {
        case_id: String,
    },
    /// Remove workspaces and results for a case.
    Clean {
        case_id: String,
    },
    /// Issue a templated hint to the agent, tracked against the budget.
    Hint {
        #[command(subcommand)]
        hint: HintCommand,
    },
    /// Audit a hint transcript against the prompting rules.
    Audit {
        transcript: PathBuf,
    },
}

#[derive(Subcommand)]
enum HintCommand {
    /// Ask the agent to move a circle.
    Nudge {
        /// 1-based image number; rendered as an ordinal word.
        #[arg(long)]
        image: usize,
        /// up | down | left | right
        #[arg(long)]
        direction: String,
        /// slightly | noticeably | far
        #[arg(long)]
        magnitude: String,
        #[arg(long, default_value = "hints.json")]
        transcript: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAX_PROMPTS)]
        max_prompts: u32,
    },
    /// Tell the agent a circle looks right.
    Confirm {
        /// 1-based image number; rendered as an ordinal word.
        #[arg(long)]
        image: usize,
        #[arg(long, default_value = "hints.json")]
        transcript: PathBuf,
        #[arg(long, default_value_t = DEFAULT_MAX_PROMPTS)]
        max_prompts: u32,
    },
}

fn main() -> Result<()> {
    task::logging::init();
    let cli = Cli::parse();
    let repo_root = std::env::current_dir()?;
    match cli.command {
        Command::List => cli::list_cases(&repo_root),
        Command::Run { case_id, runs } => cli::run_case_by_id(&repo_root, &case_id, runs),
        Command::Report { case_id } => cli::report_case(&repo_root, &case_id),
        Command::Clean { case_id } => cli::clean_case(&repo_root, &case_id),
        Command::Hint { hint } => match hint {
            HintCommand::Nudge {
                image,
                direction,
                magnitude,
                transcript,
                max_prompts,
            } => cli::issue_hint(
                &transcript,
                max_prompts,
                &Hint::Nudge {
                    image_index: image,
                    direction: direction.parse()?,
                    magnitude: magnitude.parse()?,
                },
            ),
            HintCommand::Confirm {
                image,
                transcript,
                max_prompts,
            } => cli::issue_hint(&transcript, max_prompts, &Hint::Confirm { image_index: image }),
        },
        Command::Audit { transcript } => cli::audit_transcript_file(&transcript),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_repeats() {
        let cli = Cli::parse_from(["grader", "run", "crosshair-512", "--runs", "3"]);
        match cli.command {
            Command::Run { case_id, runs } => {
                assert_eq!(case_id, "crosshair-512");
                assert_eq!(runs, 3);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn parse_hint_nudge() {
        let cli = Cli::parse_from([
            "grader", "hint", "nudge", "--image", "2", "--direction", "up", "--magnitude",
            "slightly",
        ]);
        match cli.command {
            Command::Hint {
                hint:
                    HintCommand::Nudge {
                        image,
                        direction,
                        magnitude,
                        max_prompts,
                        ..
                    },
            } => {
                assert_eq!(image, 2);
                assert_eq!(direction, "up");
                assert_eq!(magnitude, "slightly");
                assert_eq!(max_prompts, DEFAULT_MAX_PROMPTS);
            }
            _ => panic!("expected nudge"),
        }
    }

    #[test]
    fn parse_audit_path() {
        let cli = Cli::parse_from(["grader", "audit", "results/hints.json"]);
        match cli.command {
            Command::Audit { transcript } => {
                assert_eq!(transcript, PathBuf::from("results/hints.json"));
            }
            _ => panic!("expected audit"),
        }
    }
}
