//! Inline button payloads, encoded as `action_courseCode_resourceType`.

use super::category::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Get,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Get => "get",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Action::Add => "Add",
            Action::Get => "Get",
        }
    }

    fn parse(value: &str) -> Option<Action> {
        match value {
            "add" => Some(Action::Add),
            "get" => Some(Action::Get),
            _ => None,
        }
    }
}

/// Telegram rejects `callback_data` longer than this many bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackData {
    pub action: Action,
    pub course_code: String,
    pub category: Category,
}

impl CallbackData {
    pub fn encode(&self) -> String {
        format!(
            "{}_{}_{}",
            self.action.as_str(),
            self.course_code,
            self.category.slug()
        )
    }

    /// `None` unless `data` is a known action and category around a
    /// non-empty course code. The course code may itself contain `_`.
    pub fn parse(data: &str) -> Option<CallbackData> {
        let (action, rest) = data.split_once('_')?;
        let (course_code, category) = rest.rsplit_once('_')?;
        if course_code.is_empty() {
            return None;
        }

        Some(CallbackData {
            action: Action::parse(action)?,
            course_code: course_code.to_string(),
            category: Category::from_slug(category)?,
        })
    }
}
