//! Per-agent conversation history.
//!
//! Each specialist owns one [`History`]. Entries are only ever appended and
//! carry a monotonically increasing index; prompts replay a bounded window
//! of the most recent entries.

use serde::Serialize;
use serde_json::Value;
use wayfarer_core::message::{Message, MessageToolCall};

/// Who produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
    Tool,
}

/// What an entry holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntryContent {
    Text(String),
    /// The model asked for a tool invocation
    FunctionCall {
        id: String,
        name: String,
        arguments: Value,
    },
    /// Structured result (or failure marker) fed back to the model
    ToolOutput {
        call_id: String,
        tool_name: String,
        data: Value,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub index: usize,
    pub speaker: Speaker,
    pub content: EntryContent,
}

/// Gateway message for one entry.
pub(crate) fn entry_message(speaker: Speaker, content: &EntryContent) -> Message {
    match (speaker, content) {
        (Speaker::User, EntryContent::Text(text)) => Message::user(text),
        (_, EntryContent::FunctionCall { id, name, arguments }) => {
            let mut msg = Message::assistant("");
            msg.tool_calls.push(MessageToolCall {
                id: id.clone(),
                name: name.clone(),
                arguments: arguments.to_string(),
            });
            msg
        }
        (_, EntryContent::ToolOutput { call_id, tool_name, data }) => {
            Message::tool_result(call_id, tool_name, data.to_string())
        }
        (_, EntryContent::Text(text)) => Message::assistant(text),
    }
}

/// Append-only, ordered log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, content: EntryContent) -> usize {
        let index = self.entries.len();
        self.entries.push(HistoryEntry { index, speaker, content });
        index
    }

    /// Append a batch produced by one turn.
    pub fn extend(&mut self, staged: Vec<(Speaker, EntryContent)>) {
        for (speaker, content) in staged {
            self.push(speaker, content);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The last `size` entries, trimmed at the front so the window opens on
    /// a User entry. Empty when the window holds no User entry at all.
    pub fn window(&self, size: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(size);
        let window = &self.entries[start..];
        let first_user = window
            .iter()
            .position(|e| e.speaker == Speaker::User)
            .unwrap_or(window.len());
        &window[first_user..]
    }

    /// Gateway messages for the last `size` entries.
    pub fn window_messages(&self, size: usize) -> Vec<Message> {
        self.window(size)
            .iter()
            .map(|e| entry_message(e.speaker, &e.content))
            .collect()
    }
}
