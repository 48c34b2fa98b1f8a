//! Evaluation harness: answer known questions and let the model grade itself.

use crate::rag::query::QueryRunner;
use rulebook_core::{AppError, AppResult};
use rulebook_llm::{LlmClient, LlmRequest};
use rulebook_prompt::{answer_eval, build_prompt};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A question with the answer the rulebooks should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalCase {
    pub name: &'static str,
    pub question: &'static str,
    pub expected: &'static str,
}

/// Smoke cases for the Monopoly and Ticket to Ride rulebooks.
pub const RULEBOOK_CASES: [EvalCase; 5] = [
    EvalCase {
        name: "monopoly_starting_money",
        question: "How much total money does a player start with in Monopoly? (Answer with the number only)",
        expected: "$1500",
    },
    EvalCase {
        name: "monopoly_rent",
        question: "What happens if a player cannot pay rent in Monopoly?",
        expected: "If a player cannot pay rent, they must mortgage properties or declare bankruptcy",
    },
    EvalCase {
        name: "ticket_to_ride_longest_train",
        question: "How many points does the longest continuous train get in Ticket to Ride? (Answer with the number only)",
        expected: "10 points",
    },
    EvalCase {
        name: "ticket_to_ride_cards",
        question: "How many train cards can a player draw on their turn in Ticket to Ride?",
        expected: "A player can draw up to 2 train cards on their turn",
    },
    EvalCase {
        name: "nonexistent_rule",
        question: "What is the rule about flying cars in Monopoly?",
        expected: "I cannot find that information in the rulebooks",
    },
];

/// Read a pass/fail verdict out of free model text.
///
/// The text is trimmed and lowercased; any occurrence of `true` passes,
/// otherwise any occurrence of `false` fails. "true" is checked first, so
/// a reply mentioning both passes.
pub fn parse_verdict(response: &str) -> AppResult<bool> {
    let cleaned = response.trim().to_lowercase();
    if cleaned.contains("true") {
        Ok(true)
    } else if cleaned.contains("false") {
        Ok(false)
    } else {
        Err(AppError::Evaluation(format!(
            "Invalid evaluation result: {}",
            cleaned
        )))
    }
}

/// Asks a model whether an actual answer matches the expected one.
pub struct AnswerJudge {
    llm: Arc<dyn LlmClient>,
    model: String,
}

impl AnswerJudge {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
        }
    }

    /// Judge with the same client and model the runner answers with.
    pub fn for_runner(runner: &QueryRunner) -> Self {
        Self::new(runner.llm(), runner.model())
    }

    pub async fn judge(&self, expected: &str, actual: &str) -> AppResult<bool> {
        let mut vars = HashMap::new();
        vars.insert("expected_response".to_string(), expected.to_string());
        vars.insert("actual_response".to_string(), actual.to_string());
        let prompt = build_prompt(&answer_eval(), vars)?;

        let response = self
            .llm
            .complete(&LlmRequest::new(prompt.text, self.model.clone()))
            .await?;

        tracing::debug!("Evaluator replied: {}", response.content.trim());
        parse_verdict(&response.content)
    }
}

/// Result of running one [`EvalCase`].
#[derive(Debug)]
pub struct EvalOutcome {
    pub case: EvalCase,

    /// Answer from the runner, if the query succeeded
    pub actual: Option<String>,

    /// Citations for that answer
    pub sources: Vec<String>,

    /// Verdict, or the error that prevented one
    pub verdict: Result<bool, AppError>,
}

const GREEN: &str = "\x1b[92m";
const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

impl EvalOutcome {
    /// Only an explicit `true` verdict passes.
    pub fn passed(&self) -> bool {
        matches!(self.verdict, Ok(true))
    }

    /// Final ✅/❌ line, wrapped in green or red when `color` is set.
    pub fn verdict_line(&self, color: bool) -> String {
        let line = match &self.verdict {
            Ok(true) => "✅ Test Passed".to_string(),
            Ok(false) => "❌ Test Failed".to_string(),
            Err(e) => format!("❌ Test Error: {}", e),
        };
        if !color {
            return line;
        }
        let code = if self.passed() { GREEN } else { RED };
        format!("{}{}{}", code, line, RESET)
    }

    /// Full report. `Display` is the uncoloured form.
    pub fn report(&self, color: bool) -> String {
        let mut out = format!(
            "Test Question: {}\nExpected: {}\n",
            self.case.question, self.case.expected
        );
        if let Some(actual) = &self.actual {
            out.push_str(&format!("Actual: {}\nSources: {:?}\n", actual, self.sources));
        }
        out.push_str(&self.verdict_line(color));
        out
    }
}

impl fmt::Display for EvalOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(false))
    }
}

/// Run one case end to end.
///
/// Never fails: a query or judging error is recorded in the outcome and
/// counts as a failure.
pub async fn query_and_validate(
    runner: &QueryRunner,
    judge: &AnswerJudge,
    case: &EvalCase,
) -> EvalOutcome {
    let response = match runner.query(case.question).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Case {} failed to query: {}", case.name, e);
            return EvalOutcome {
                case: *case,
                actual: None,
                sources: Vec::new(),
                verdict: Err(e),
            };
        }
    };

    let verdict = judge.judge(case.expected, &response.answer).await;
    if let Err(e) = &verdict {
        tracing::warn!("Case {} could not be judged: {}", case.name, e);
    }

    EvalOutcome {
        case: *case,
        actual: Some(response.answer),
        sources: response.sources,
        verdict,
    }
}
