// ABOUTME: Textual renderings of generated tickets
// ABOUTME: Markdown document and pretty-printed JSON export formats

use crate::ticket::Ticket;

/// Renders a ticket as a Markdown document.
///
/// Absent or empty fields are skipped entirely, so the output never
/// contains an empty section header.
pub fn ticket_to_markdown(ticket: &Ticket) -> String {
    let mut content = format!("**Title:** {}\n\n", ticket.title());

    if let Ticket::Bug(bug) = ticket {
        if let Some(priority) = bug.priority {
            content.push_str(&format!("**Priority:** {}\n\n", priority));
        }
    }

    if !ticket.description().is_empty() {
        content.push_str(&format!("**Description:**\n{}\n\n", ticket.description()));
    }

    match ticket {
        Ticket::Bug(bug) => {
            if !bug.steps_to_reproduce.is_empty() {
                let steps = bug
                    .steps_to_reproduce
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("{}. {}", i + 1, step))
                    .collect::<Vec<_>>()
                    .join("\n");
                content.push_str(&format!("**Steps to Reproduce:**\n{}\n\n", steps));
            }
            if !bug.expected_behavior.is_empty() {
                content.push_str(&format!(
                    "**Expected Behavior:**\n{}\n\n",
                    bug.expected_behavior
                ));
            }
            if !bug.actual_behavior.is_empty() {
                content.push_str(&format!("**Actual Behavior:**\n{}\n\n", bug.actual_behavior));
            }
        }
        Ticket::Story(story) => {
            if !story.acceptance_criteria.is_empty() {
                content.push_str(&format!(
                    "**Acceptance Criteria:**\n{}\n\n",
                    bullet_list(&story.acceptance_criteria)
                ));
            }
        }
        Ticket::Task(task) => {
            if !task.subtasks.is_empty() {
                content.push_str(&format!("**Sub-tasks:**\n{}\n\n", bullet_list(&task.subtasks)));
            }
        }
        Ticket::Epic(epic) => {
            if !epic.stories.is_empty() {
                content.push_str(&format!(
                    "**Potential Stories:**\n{}\n\n",
                    bullet_list(&epic.stories)
                ));
            }
        }
    }

    content
}

/// Renders the raw ticket as pretty-printed JSON.
pub fn ticket_to_json(ticket: &Ticket) -> String {
    serde_json::to_string_pretty(ticket).expect("ticket serialization is infallible")
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}
