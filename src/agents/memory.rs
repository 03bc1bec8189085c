//! Agent memory: a short-term key/value store plus a conversation log

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One conversation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Per-agent working memory. Owned by the caller's agent, not the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentMemory {
    store: IndexMap<String, Value>,
    conversation: Vec<Message>,
}

impl AgentMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value in short-term memory.
    pub fn add(&mut self, key: impl Into<String>, value: Value) {
        self.store.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.store.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Remove a key; returns the removed value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.store.shift_remove(key)
    }

    /// Drop all short-term entries. The conversation log is untouched.
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Append a conversation message.
    pub fn add_history(&mut self, message: Message) {
        self.conversation.push(message);
    }

    /// The conversation log, oldest first.
    pub fn get_history(&self) -> &[Message] {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_roundtrip() {
        let mut memory = AgentMemory::new();
        memory.add("task", json!("summarize"));

        assert!(memory.has("task"));
        assert_eq!(memory.get("task"), Some(&json!("summarize")));
        assert_eq!(memory.remove("task"), Some(json!("summarize")));
        assert!(!memory.has("task"));
    }

    #[test]
    fn test_clear_leaves_conversation() {
        let mut memory = AgentMemory::new();
        memory.add("scratch", json!(1));
        memory.add_history(Message::user("hello"));

        memory.clear();

        assert!(!memory.has("scratch"));
        assert_eq!(memory.get_history().len(), 1);
    }

    #[test]
    fn test_conversation_order() {
        let mut memory = AgentMemory::new();
        memory.add_history(Message::system("be terse"));
        memory.add_history(Message::user("hi"));
        memory.add_history(Message::assistant("hello"));

        let roles: Vec<MessageRole> = memory.get_history().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
    }
}
