// Chat sessions: per-session conversation history and puzzle counter.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_CATEGORY: &str = "عام";
pub const DEFAULT_LEVEL: &str = "متوسط";
pub const ANONYMOUS_USER: &str = "anonymous";

/// One exchange in a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub history: Vec<ChatTurn>,
    pub category: String,
    pub level: String,
    pub user_id: String,
    pub puzzle_counter: u64,
    /// True until the first message has been recorded.
    pub first_message: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self {
            history: Vec::new(),
            category: DEFAULT_CATEGORY.to_string(),
            level: DEFAULT_LEVEL.to_string(),
            user_id: ANONYMOUS_USER.to_string(),
            puzzle_counter: 0,
            first_message: true,
            created_at: Utc::now(),
        }
    }
}

impl ChatSession {
    pub fn new(user_id: &str, category: &str, level: &str) -> Self {
        Self {
            category: category.to_string(),
            level: level.to_string(),
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    /// Append a turn. Category and level follow the latest message.
    pub fn record_turn(&mut self, user: &str, assistant: &str, category: &str, level: &str) {
        self.history.push(ChatTurn {
            user: user.to_string(),
            assistant: assistant.to_string(),
            timestamp: Utc::now(),
        });
        self.category = category.to_string();
        self.level = level.to_string();
        self.first_message = false;
    }

    /// Bump and return the puzzle counter.
    pub fn next_puzzle(&mut self) -> u64 {
        self.puzzle_counter += 1;
        self.puzzle_counter
    }
}
