// ABOUTME: Centralized prompt templates for ticket generation
// ABOUTME: Builds the per-type generation prompt and the refinement instruction wrapper

use ticketsmith_core::TicketType;

/// Builds the generation prompt for a requirement and ticket type.
///
/// The prompt states the target ticket type, embeds the requirement
/// verbatim, mandates a single JSON object with no surrounding prose or
/// fences, and spells out the exact field set expected for the type. Pure
/// and deterministic; no validation or truncation is performed here, the
/// caller owns the input cap.
pub fn build_prompt(requirement: &str, ticket_type: TicketType) -> String {
    let base_prompt = format!(
        "You are an expert Jira project manager. Your task is to analyze the following user \
         requirement and generate a well-structured Jira ticket of type \"{}\".\n\n\
         User Requirement: \"{}\"\n\n\
         Your response MUST be a single, valid JSON object, without any surrounding text, \
         explanations, or markdown fences. The JSON structure must conform to the specified \
         format for the ticket type.",
        ticket_type, requirement
    );

    match ticket_type {
        TicketType::Bug => format!(
            "{}\n\n\
             If an image is provided by the user, analyze it for additional visual context about \
             the bug (e.g., UI layout issues, error messages shown in the screenshot, etc.).\n\n\
             JSON format for a Bug:\n\
             {{\n\
             \x20 \"title\": \"A concise and descriptive title for the bug\",\n\
             \x20 \"description\": \"A detailed summary of the issue.\",\n\
             \x20 \"stepsToReproduce\": [\"A clear, ordered list of steps to trigger the bug\"],\n\
             \x20 \"expectedBehavior\": \"What should have happened?\",\n\
             \x20 \"actualBehavior\": \"What actually happened?\",\n\
             \x20 \"priority\": \"High | Medium | Low\"\n\
             }}",
            base_prompt
        ),
        TicketType::Story => format!(
            "{}\n\n\
             JSON format for a Story:\n\
             {{\n\
             \x20 \"title\": \"A short, user-centric title for the story\",\n\
             \x20 \"description\": \"The user story in the format: 'As a [user type], I want \
             [some goal] so that [some reason].'\",\n\
             \x20 \"acceptanceCriteria\": [\"A list of specific, testable criteria that must be \
             met for the story to be considered complete.\"]\n\
             }}",
            base_prompt
        ),
        TicketType::Task => format!(
            "{}\n\n\
             JSON format for a Task:\n\
             {{\n\
             \x20 \"title\": \"A clear, action-oriented title for the task\",\n\
             \x20 \"description\": \"A detailed description of the work to be done.\",\n\
             \x20 \"subtasks\": [\"A list of smaller, concrete sub-items needed to complete the \
             main task.\"]\n\
             }}",
            base_prompt
        ),
        TicketType::Epic => format!(
            "{}\n\n\
             JSON format for an Epic:\n\
             {{\n\
             \x20 \"title\": \"A high-level title for the large body of work\",\n\
             \x20 \"description\": \"A comprehensive overview of the epic, its goals, and its \
             business value.\",\n\
             \x20 \"stories\": [\"A list of potential user story titles that could belong to \
             this epic.\"]\n\
             }}",
            base_prompt
        ),
    }
}

/// Builds the follow-up instruction for refining the last generated ticket.
/// The model is asked for the complete replacement JSON object, not a diff.
pub fn build_refine_prompt(instruction: &str) -> String {
    format!(
        "Based on our conversation, please refine the last generated Jira ticket using the \
         following instruction: \"{}\".\n\n\
         IMPORTANT: Your response must be only the complete, updated JSON object for the ticket. \
         Do not include any other text, explanations, or markdown formatting. Just the raw JSON.",
        instruction
    )
}
