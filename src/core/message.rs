//! Conversation history.
//!
//! A conversation is an append-only list of role-tagged messages owned by a
//! single session. It can be cleared, never edited.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions.
    User,
    /// The remote model.
    Assistant,
}

impl Role {
    /// Returns the wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the number of messages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Checks if the conversation is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Returns all messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the completed turns: each user message immediately followed
    /// by an assistant reply, flattened in order.
    ///
    /// User messages left without a reply by a failed call are skipped, so
    /// the result always alternates user/assistant.
    #[must_use]
    pub fn completed_turns(&self) -> Vec<&Message> {
        self.messages
            .windows(2)
            .filter(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            .flat_map(|pair| [&pair[0], &pair[1]])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_push_and_clear() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push(Message::user("What is this about?"));
        conversation.push(Message::assistant("A report."));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.last().map(|m| m.role), Some(Role::Assistant));

        conversation.clear();
        assert_eq!(conversation.len(), 0);
    }

    #[test]
    fn test_completed_turns_skips_orphans() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("first"));
        conversation.push(Message::assistant("reply one"));
        conversation.push(Message::user("failed question"));
        conversation.push(Message::user("second"));
        conversation.push(Message::assistant("reply two"));
        conversation.push(Message::user("pending"));

        let turns: Vec<&str> = conversation
            .completed_turns()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(turns, vec!["first", "reply one", "second", "reply two"]);
    }

    #[test]
    fn test_completed_turns_empty() {
        let conversation = Conversation::new();
        assert!(conversation.completed_turns().is_empty());
    }
}
