use super::traits::ReasoningRequest;
use crate::utils::preview;
use std::fmt::Write;

/// History items rendered into a prompt.
pub const MAX_PROMPT_HISTORY: usize = 5;
/// Knowledge cards rendered into a prompt.
pub const MAX_PROMPT_KNOWLEDGE: usize = 5;
/// Characters kept from each free-text field of a context item.
pub const PREVIEW_CHARS: usize = 80;

pub const SYSTEM_PROMPT: &str = "You are the reasoning engine of an on-chain assistant. \
Always respond with a compact JSON object: {\"thought\": string, \"reply\": string}. \
Summarise your reasoning in \"thought\" and write the user-facing answer in \"reply\", \
using the language of the goal.";

/// Render the user prompt for a networked backend.
pub fn build_user_prompt(request: &ReasoningRequest) -> String {
    let mut prompt = String::with_capacity(512);

    prompt.push_str("## Current task\n");
    let _ = writeln!(prompt, "Goal: {}", request.goal.trim());
    if !request.chain_action.trim().is_empty() {
        let _ = writeln!(prompt, "Chain action: {}", request.chain_action.trim());
    }
    if !request.address.trim().is_empty() {
        let _ = writeln!(prompt, "Address: {}", request.address.trim());
    }

    if !request.history.is_empty() {
        prompt.push_str("\n## Recent tasks (newest first)\n");
        for (index, entry) in request.history.iter().take(MAX_PROMPT_HISTORY).enumerate() {
            let _ = write!(
                prompt,
                "[{}] goal: {} | reply: {}",
                index + 1,
                preview(&entry.goal, PREVIEW_CHARS),
                preview(&entry.reply, PREVIEW_CHARS),
            );
            if !entry.observations.trim().is_empty() {
                let _ = write!(
                    prompt,
                    " | observations: {}",
                    preview(&entry.observations, PREVIEW_CHARS)
                );
            }
            prompt.push('\n');
        }
    }

    if !request.knowledge.is_empty() {
        prompt.push_str("\n## Knowledge\n");
        for (index, card) in request.knowledge.iter().take(MAX_PROMPT_KNOWLEDGE).enumerate() {
            let _ = writeln!(
                prompt,
                "[{}] {}: {}",
                index + 1,
                card.title.trim(),
                preview(&card.content, PREVIEW_CHARS)
            );
        }
    }

    prompt.push_str(
        "\nUsing the information above, give your most reasonable thought and a reply the user can act on.",
    );
    prompt
}
