//! Built-in prompt templates.
//!
//! The rendered text of both templates is a fixed contract: the answering
//! model relies on the fallback sentence and the evaluator relies on the
//! `'true'`/`'false'` instruction.

use crate::types::PromptDefinition;

/// Identifier of the rules-answering prompt.
pub const RULES_QA_ID: &str = "rules.qa";

/// Identifier of the answer-evaluation prompt.
pub const ANSWER_EVAL_ID: &str = "rules.eval";

/// Sentence the model is told to use when the context lacks the answer.
pub const NOT_FOUND_ANSWER: &str = "I cannot find that information in the rulebooks";

/// Numbered instruction block of the rules-answering prompt.
pub const RULES_QA_INSTRUCTIONS: &str = r#"Instructions:
1. Answer concisely and accurately
2. If the information is not in the context, say "I cannot find that information in the rulebooks"
3. Include relevant page numbers or rule references when possible
4. Format your response in a clear, easy-to-read manner
"#;

/// Rules-answering template. Variables: `context`, `question`.
pub const RULES_QA_TEMPLATE: &str = r#"
You are a helpful board game rules assistant. Answer the question based only on the following context:

{{context}}

---

Question: {{question}}

Instructions:
1. Answer concisely and accurately
2. If the information is not in the context, say "I cannot find that information in the rulebooks"
3. Include relevant page numbers or rule references when possible
4. Format your response in a clear, easy-to-read manner
"#;

/// Answer-evaluation template. Variables: `expected_response`, `actual_response`.
pub const ANSWER_EVAL_TEMPLATE: &str = r#"
You are a test evaluator for a board game rules assistant. Compare the expected and actual responses:

Expected Response: {{expected_response}}
Actual Response: {{actual_response}}

Instructions:
1. Consider the responses equivalent if they contain the same key information
2. Ignore minor formatting differences
3. Consider numerical values equivalent if they represent the same amount
4. Answer with 'true' or 'false' only

Does the actual response match the expected response? Answer with 'true' or 'false'.
"#;

/// Definition of the rules-answering prompt.
pub fn rules_qa() -> PromptDefinition {
    PromptDefinition {
        id: RULES_QA_ID.to_string(),
        title: "Board game rules assistant".to_string(),
        template: RULES_QA_TEMPLATE.to_string(),
        variables: vec!["context".to_string(), "question".to_string()],
    }
}

/// Definition of the answer-evaluation prompt.
pub fn answer_eval() -> PromptDefinition {
    PromptDefinition {
        id: ANSWER_EVAL_ID.to_string(),
        title: "Rules answer evaluator".to_string(),
        template: ANSWER_EVAL_TEMPLATE.to_string(),
        variables: vec![
            "expected_response".to_string(),
            "actual_response".to_string(),
        ],
    }
}
