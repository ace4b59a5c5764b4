use serde::{Deserialize, Serialize};

use crate::judge::{Judgment, SolutionStatus};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Fail,
    Invalid,
    Error,
}

/// Classify a run from its judgment.
///
/// `harness_failed` marks runs where the grader itself could not do its job
/// (e.g., the solver failed to spawn); those are `Error` regardless of what
/// is in the workspace.
pub fn classify_outcome(harness_failed: bool, judgment: &Judgment) -> Outcome {
    if harness_failed {
        return Outcome::Error;
    }
    match &judgment.solution {
        SolutionStatus::Missing
        | SolutionStatus::Unreadable { .. }
        | SolutionStatus::SchemaInvalid { .. }
        | SolutionStatus::InvariantViolations { .. } => Outcome::Invalid,
        SolutionStatus::Scored => {
            if judgment.passed() {
                Outcome::Success
            } else {
                Outcome::Fail
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task::core::score::{Criteria, score_solution};
    use task::test_support::{entry, solution, truths};

    fn scored(correct: bool) -> Judgment {
        let truth = truths(&[("image_1.png", 0.0, 0.0)]);
        let prediction = if correct { 0.0 } else { 400.0 };
        let card = score_solution(
            &truth,
            &solution(vec![entry("image_1.png", prediction, 0.0)]),
            &Criteria::default(),
        );
        Judgment {
            solution: SolutionStatus::Scored,
            scorecard: Some(card),
        }
    }

    #[test]
    fn success_when_scored_and_passed() {
        assert_eq!(classify_outcome(false, &scored(true)), Outcome::Success);
    }

    #[test]
    fn fail_when_scored_but_out_of_tolerance() {
        assert_eq!(classify_outcome(false, &scored(false)), Outcome::Fail);
    }

    #[test]
    fn invalid_when_solution_unusable() {
        let judgment = Judgment {
            solution: SolutionStatus::Missing,
            scorecard: None,
        };
        assert_eq!(classify_outcome(false, &judgment), Outcome::Invalid);
    }

    #[test]
    fn error_when_harness_failed() {
        assert_eq!(classify_outcome(true, &scored(true)), Outcome::Error);
    }
}
