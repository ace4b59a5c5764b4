//! Hint sessions for human graders.
//!
//! During a graded session the human may send the agent at most a fixed
//! number of prompts, each drawn from a small template vocabulary: an image
//! named by ordinal word, one of four directions, one of three qualitative
//! magnitudes. Numeric hints (distances, angles, sizes) are forbidden, so
//! every rendered message is screened for digits before it is issued and
//! transcripts can be re-audited after the fact.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Context, Error, Result, anyhow, bail};
use minijinja::{Environment, context};
use serde::{Deserialize, Serialize};

/// Default prompt budget for a whole session.
pub const DEFAULT_MAX_PROMPTS: u32 = 15;

const NUDGE_TEMPLATE: &str = include_str!("prompts/nudge.md");
const CONFIRM_TEMPLATE: &str = include_str!("prompts/confirm.md");

const ORDINALS: [&str; 10] = [
    "first", "second", "third", "fourth", "fifth", "sixth", "seventh", "eighth", "ninth", "tenth",
];

static DIGIT_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[0-9]").unwrap());

static NUDGE_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^In the (first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth) image, move your circle (slightly|noticeably|far) (up|down|left|right)\.$",
    )
    .unwrap()
});

static CONFIRM_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(
        r"^Your circle in the (first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth) image looks right\.$",
    )
    .unwrap()
});

/// Compass-like nudge direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            other => Err(anyhow!("unknown direction '{other}'")),
        }
    }
}

/// Qualitative nudge magnitude. Never a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    Slightly,
    Noticeably,
    Far,
}

impl Magnitude {
    pub fn as_str(self) -> &'static str {
        match self {
            Magnitude::Slightly => "slightly",
            Magnitude::Noticeably => "noticeably",
            Magnitude::Far => "far",
        }
    }
}

impl FromStr for Magnitude {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "slightly" => Ok(Magnitude::Slightly),
            "noticeably" => Ok(Magnitude::Noticeably),
            "far" => Ok(Magnitude::Far),
            other => Err(anyhow!("unknown magnitude '{other}'")),
        }
    }
}

/// A permitted hint, prior to rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// Ask the agent to move a circle. `image_index` is 1-based.
    Nudge {
        image_index: usize,
        direction: Direction,
        magnitude: Magnitude,
    },
    /// Tell the agent a circle is placed correctly. `image_index` is 1-based.
    Confirm { image_index: usize },
}

/// Spell a 1-based image index as an ordinal word.
pub fn ordinal(image_index: usize) -> Result<&'static str> {
    if image_index == 0 || image_index > ORDINALS.len() {
        bail!(
            "image index {image_index} out of range (ordinal words cover {} images)",
            ORDINALS.len()
        );
    }
    Ok(ORDINALS[image_index - 1])
}

/// Template engine wrapper around minijinja.
struct HintEngine {
    env: Environment<'static>,
}

impl HintEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("nudge", NUDGE_TEMPLATE)
            .expect("nudge template should be valid");
        env.add_template("confirm", CONFIRM_TEMPLATE)
            .expect("confirm template should be valid");
        Self { env }
    }

    fn render(&self, hint: &Hint) -> Result<String> {
        let rendered = match hint {
            Hint::Nudge {
                image_index,
                direction,
                magnitude,
            } => {
                let ordinal = ordinal(*image_index)?;
                self.env.get_template("nudge")?.render(context! {
                    ordinal,
                    direction => direction.as_str(),
                    magnitude => magnitude.as_str(),
                })?
            }
            Hint::Confirm { image_index } => {
                let ordinal = ordinal(*image_index)?;
                self.env.get_template("confirm")?.render(context! { ordinal })?
            }
        };
        Ok(rendered.trim().to_string())
    }
}

/// A persisted hint session, serialized as `hints.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transcript {
    pub max_prompts: u32,
    pub prompts: Vec<String>,
}

impl Transcript {
    pub fn new(max_prompts: u32) -> Self {
        Self {
            max_prompts,
            prompts: Vec::new(),
        }
    }
}

/// A live session enforcing the budget and the no-digits rule.
#[derive(Debug, Clone)]
pub struct HintSession {
    transcript: Transcript,
}

impl HintSession {
    pub fn new(max_prompts: u32) -> Self {
        Self {
            transcript: Transcript::new(max_prompts),
        }
    }

    /// Continue a session from a persisted transcript.
    pub fn resume(transcript: Transcript) -> Self {
        Self { transcript }
    }

    pub fn remaining(&self) -> u32 {
        self.transcript
            .max_prompts
            .saturating_sub(self.transcript.prompts.len() as u32)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Render, screen, and record a hint. Returns the message to send.
    pub fn issue(&mut self, hint: &Hint) -> Result<String> {
        if self.remaining() == 0 {
            bail!(
                "hint budget exhausted ({} prompts used)",
                self.transcript.max_prompts
            );
        }
        let message = HintEngine::new().render(hint)?;
        if DIGIT_RE.is_match(&message) {
            bail!("refusing hint containing a digit: {message}");
        }
        self.transcript.prompts.push(message.clone());
        Ok(message)
    }
}

/// Re-check a transcript: budget, digit ban, and template conformance.
///
/// Returns violation messages; empty means the session followed the rules.
pub fn audit_transcript(transcript: &Transcript) -> Vec<String> {
    let mut violations = Vec::new();
    if transcript.prompts.len() as u32 > transcript.max_prompts {
        violations.push(format!(
            "session used {} prompts; budget is {}",
            transcript.prompts.len(),
            transcript.max_prompts
        ));
    }
    for (index, message) in transcript.prompts.iter().enumerate() {
        if DIGIT_RE.is_match(message) {
            violations.push(format!("prompts[{index}]: contains a digit"));
        } else if !NUDGE_RE.is_match(message) && !CONFIRM_RE.is_match(message) {
            violations.push(format!("prompts[{index}]: not a permitted template"));
        }
    }
    violations
}

pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

pub fn write_transcript(path: &Path, transcript: &Transcript) -> Result<()> {
    let contents = serde_json::to_string_pretty(transcript).context("serialize transcript")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
