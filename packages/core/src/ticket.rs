// ABOUTME: Ticket data model for Ticketsmith
// ABOUTME: Ticket type tags, per-type ticket records, and the tagged Ticket variant

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four supported ticket types.
///
/// The type determines which `Ticket` variant is valid for a response and
/// which prompt template is used to request it. Bug is the only type that
/// may carry an attached image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketType {
    Bug,
    Story,
    Task,
    Epic,
}

impl TicketType {
    pub const ALL: [TicketType; 4] = [
        TicketType::Bug,
        TicketType::Story,
        TicketType::Task,
        TicketType::Epic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketType::Bug => "Bug",
            TicketType::Story => "Story",
            TicketType::Task => "Task",
            TicketType::Epic => "Epic",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bug" => Ok(TicketType::Bug),
            "story" => Ok(TicketType::Story),
            "task" => Ok(TicketType::Task),
            "epic" => Ok(TicketType::Epic),
            other => Err(format!("unknown ticket type: {}", other)),
        }
    }
}

/// Bug priority as requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Case-insensitive parse that tolerates model drift. Anything outside
    /// the three known levels maps to `None` rather than failing the whole
    /// ticket.
    pub fn parse_lenient(value: &str) -> Option<Priority> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(Priority::parse_lenient))
}

/// A bug report. Only `title` is guaranteed by extraction; every other
/// field defaults when the model omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub steps_to_reproduce: Vec<String>,
    #[serde(default)]
    pub expected_behavior: String,
    #[serde(default)]
    pub actual_behavior: String,
    #[serde(
        default,
        deserialize_with = "lenient_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
}

/// A user story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
}

/// A work task with optional sub-items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subtasks: Vec<String>,
}

/// An epic with candidate story titles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicTicket {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stories: Vec<String>,
}

/// A generated ticket, tagged by its type.
///
/// The JSON wire and persistence format is the flat per-type object with no
/// tag; the tag is always supplied externally by a `TicketType`, so
/// deserialization goes through [`Ticket::from_value`] rather than a serde
/// derive.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ticket {
    Bug(BugTicket),
    Story(StoryTicket),
    Task(TaskTicket),
    Epic(EpicTicket),
}

impl Ticket {
    /// Deserializes the flat ticket object into the variant selected by
    /// `ticket_type`.
    pub fn from_value(
        ticket_type: TicketType,
        value: serde_json::Value,
    ) -> Result<Ticket, serde_json::Error> {
        Ok(match ticket_type {
            TicketType::Bug => Ticket::Bug(serde_json::from_value(value)?),
            TicketType::Story => Ticket::Story(serde_json::from_value(value)?),
            TicketType::Task => Ticket::Task(serde_json::from_value(value)?),
            TicketType::Epic => Ticket::Epic(serde_json::from_value(value)?),
        })
    }

    pub fn ticket_type(&self) -> TicketType {
        match self {
            Ticket::Bug(_) => TicketType::Bug,
            Ticket::Story(_) => TicketType::Story,
            Ticket::Task(_) => TicketType::Task,
            Ticket::Epic(_) => TicketType::Epic,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Ticket::Bug(t) => &t.title,
            Ticket::Story(t) => &t.title,
            Ticket::Task(t) => &t.title,
            Ticket::Epic(t) => &t.title,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Ticket::Bug(t) => &t.description,
            Ticket::Story(t) => &t.description,
            Ticket::Task(t) => &t.description,
            Ticket::Epic(t) => &t.description,
        }
    }
}
