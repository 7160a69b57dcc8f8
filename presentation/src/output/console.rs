//! Console output formatter for council turns

use colored::Colorize;
use council_domain::CouncilTurn;

/// Formats council turns for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete council turn
    pub fn format(turn: &CouncilTurn) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            turn.question
        ));

        // Stage 1: Council Responses
        output.push_str(&Self::section_header("Stage 1: Council Responses"));
        for response in &turn.stage1.responses {
            match (&response.text, &response.error) {
                (Some(text), _) => output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ──", response.model).yellow().bold(),
                    text
                )),
                (None, Some(failure)) => output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", response.model).red().bold(),
                    failure
                )),
                (None, None) => {}
            }
        }

        // Stage 2: Peer Rankings
        output.push_str(&Self::section_header("Stage 2: Peer Rankings"));
        for submission in &turn.stage2.submissions {
            if submission.is_ranked() {
                let order = submission
                    .ordered_labels
                    .iter()
                    .map(|l| l.to_string())
                    .collect::<Vec<_>>()
                    .join(" > ");
                output.push_str(&format!(
                    "\n{} {}\n",
                    format!("Judge {}:", submission.judge).yellow().bold(),
                    order
                ));
            } else {
                let reason = submission
                    .error
                    .as_ref()
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "no ranking".to_string());
                output.push_str(&format!(
                    "\n{} {}\n",
                    format!("Judge {}:", submission.judge).red().bold(),
                    reason
                ));
            }
        }

        if !turn.aggregate.is_empty() {
            output.push_str(&format!("\n{}\n", "Aggregate ranking:".cyan().bold()));
            for (place, entry) in turn.aggregate.entries().iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {}: {:.1} pts ({} first-place)\n",
                    place + 1,
                    entry.model,
                    entry.score,
                    entry.first_place_votes
                ));
            }
        }

        // Stage 3: Synthesis
        output.push_str(&Self::section_header("Stage 3: Chairman Synthesis"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!("Chairman: {}", turn.stage3.chairman).yellow().bold(),
            turn.stage3.text
        ));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(turn: &CouncilTurn) -> String {
        serde_json::to_string_pretty(turn).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only (concise output)
    pub fn format_final_only(turn: &CouncilTurn) -> String {
        turn.stage3.text.clone()
    }

    fn header(title: &str) -> String {
        format!(
            "\n{}\n{}\n",
            "=".repeat(60).cyan(),
            format!("  {}", title).cyan().bold()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", "-".repeat(60).cyan(), title.cyan().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
