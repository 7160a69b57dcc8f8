//! Prompt templates for the council flow

use crate::council::aggregate::AggregateRanking;
use crate::council::label::AnonymousAnswer;
use crate::orchestration::value_objects::Stage1Result;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the Stage-2 judging call
    pub fn ranking_system() -> &'static str {
        r#"You are an impartial judge evaluating answers from several anonymous experts.
Assess each response for accuracy, completeness, clarity, and practical usefulness.
You do not know which expert wrote which response; judge only the text in front of you.
Be fair and rigorous."#
    }

    /// User prompt for the Stage-2 judging call.
    ///
    /// Responses appear in label order for every judge, and the reply must
    /// end with a `FINAL RANKING:` list so the ranking can be extracted.
    pub fn ranking_prompt(question: &str, answers: &[AnonymousAnswer]) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Below are answers from several anonymous experts. Evaluate each one for:
1. Accuracy and correctness
2. Completeness
3. Clarity and organization
4. Practical usefulness

Answers to evaluate:
"#,
            question
        );

        for answer in answers {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", answer.label, answer.text));
        }

        prompt.push_str(
            r#"
After your evaluation, end your reply with the exact heading "FINAL RANKING:"
followed by a numbered list of the response labels from best to worst, e.g.:

FINAL RANKING:
1. Response B
2. Response A

Rank every response. Do not add anything after the list."#,
        );

        prompt
    }

    /// System prompt for the Stage-3 synthesis call
    pub fn synthesis_system() -> &'static str {
        r#"You are the chairman of a council of AI models. Several members have answered
the same question and then ranked each other's answers anonymously.
Synthesize the strongest single answer, weighing each response by its merit
and by how the council ranked it. Be decisive; do not mention the council
process unless the question itself is about it."#
    }

    /// User prompt for the Stage-3 synthesis call.
    ///
    /// Answers are attributed by model identity here; anonymity only
    /// matters while the judges are ranking.
    pub fn synthesis_prompt(
        question: &str,
        stage1: &Stage1Result,
        aggregate: &AggregateRanking,
    ) -> String {
        let mut prompt = format!(
            r#"Original question: {}

Council answers:
"#,
            question
        );

        for response in stage1.successful() {
            if let Some(text) = &response.text {
                prompt.push_str(&format!("\n--- {} ---\n{}\n", response.model, text));
            }
        }

        if !aggregate.is_empty() {
            prompt.push_str("\nPeer ranking (aggregated from anonymous review, best first):\n");
            for (place, entry) in aggregate.entries().iter().enumerate() {
                prompt.push_str(&format!(
                    "{}. {}: {:.1} points ({} first-place votes)\n",
                    place + 1,
                    entry.model,
                    entry.score,
                    entry.first_place_votes
                ));
            }
        }

        prompt.push_str(
            r#"
Produce the final answer to the original question, drawing on the best
elements of the council's answers. Answer the user directly."#,
        );

        prompt
    }

    /// Prompt for the title generator: given the first user message, produce
    /// a short conversation title.
    pub fn title_prompt(first_message: &str) -> String {
        format!(
            r#"Generate a very short title (3-6 words) for a conversation that starts with
the following message. Reply with the title only, no quotes, no punctuation
at the end.

Message:
{}"#,
            first_message
        )
    }
}
