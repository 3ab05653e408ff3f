use std::collections::HashMap;

use super::callback::Action;
use super::category::Category;
use super::ChatId;

/// Where a chat is in the add/get flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingCourseCode {
        action: Action,
    },
    AwaitingCategorySelection {
        action: Action,
        course_code: String,
    },
    AwaitingUploadContent {
        course_code: String,
        category: Category,
    },
}

/// Per-chat conversation state. Chats without an entry are idle.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<ChatId, ConversationState>,
}

impl SessionStore {
    pub fn get(&self, chat_id: ChatId) -> ConversationState {
        self.sessions.get(&chat_id).cloned().unwrap_or_default()
    }

    pub fn set(&mut self, chat_id: ChatId, state: ConversationState) {
        if state == ConversationState::Idle {
            self.sessions.remove(&chat_id);
        } else {
            self.sessions.insert(chat_id, state);
        }
    }

    pub fn reset(&mut self, chat_id: ChatId) {
        self.sessions.remove(&chat_id);
    }

    pub fn active(&self) -> usize {
        self.sessions.len()
    }
}
