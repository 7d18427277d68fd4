// Terminal presentation: parses stdin commands and renders the queue.

use crate::domain::{AssignmentId, Notification, NotificationLevel};
use crate::use_cases::{AssignmentSnapshot, UserCommand};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    // `None` targets whatever offer is active when the line is handled.
    Accept(Option<AssignmentId>),
    Pass(Option<AssignmentId>),
    List,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    TooManyArguments,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::Unknown(word) => write!(f, "unknown command `{word}` (try `help`)"),
            ParseError::TooManyArguments => f.write_str("expected at most one assignment id"),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "commands: accept|a [id], pass|p [id], list|ls, help, quit|q";

pub fn parse_command(line: &str) -> Result<CliCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(ParseError::Empty);
    };
    let target = words.next().map(AssignmentId::from);
    if words.next().is_some() {
        return Err(ParseError::TooManyArguments);
    }

    match verb.to_ascii_lowercase().as_str() {
        "accept" | "a" => Ok(CliCommand::Accept(target)),
        "pass" | "p" => Ok(CliCommand::Pass(target)),
        "list" | "ls" if target.is_none() => Ok(CliCommand::List),
        "help" | "h" | "?" if target.is_none() => Ok(CliCommand::Help),
        "quit" | "q" | "exit" if target.is_none() => Ok(CliCommand::Quit),
        "list" | "ls" | "help" | "h" | "?" | "quit" | "q" | "exit" => {
            Err(ParseError::TooManyArguments)
        }
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Turns a parsed decision into a session command, defaulting to the active offer.
pub fn to_user_command(command: CliCommand, snapshot: &AssignmentSnapshot) -> Option<UserCommand> {
    let active = || snapshot.active().map(|offer| offer.assignment_id.clone());
    match command {
        CliCommand::Accept(target) => target.or_else(active).map(UserCommand::Accept),
        CliCommand::Pass(target) => target.or_else(active).map(UserCommand::Pass),
        CliCommand::List | CliCommand::Help | CliCommand::Quit => None,
    }
}

pub fn render_snapshot(snapshot: &AssignmentSnapshot) -> String {
    let status = if snapshot.connected {
        "connected"
    } else {
        "offline"
    };
    if !snapshot.has_pending() {
        return format!("[{status}] no pending assignments");
    }

    let mut out = format!("[{status}] {} pending", snapshot.pending.len());
    for (index, offer) in snapshot.pending.iter().enumerate() {
        let marker = if index == 0 { '>' } else { ' ' };
        let items: Vec<String> = offer
            .order
            .items
            .iter()
            .map(|item| format!("{}x {}", item.quantity, item.name))
            .collect();
        out.push_str(&format!(
            "\n{marker} {} table {} order {} [{}]",
            offer.assignment_id,
            offer.order.table_number,
            offer.order.order_number,
            items.join(", ")
        ));
    }
    out
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level() {
        NotificationLevel::Info => "info",
        NotificationLevel::Success => "ok",
        NotificationLevel::Warning => "warn",
    };
    format!("[{tag}] {}", notification.message())
}
