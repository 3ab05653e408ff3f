use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::backend::{BackendError, ResourceApi, ResourceLookup, ResourceRow};
use super::platform::{ChatPlatform, Choice, PlatformError};
use super::ChatId;
use crate::models::Course;

/// Everything the conversation sent, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { chat_id: ChatId, text: String },
    Choices { chat_id: ChatId, text: String, choices: Vec<Choice> },
    Document { chat_id: ChatId, file_id: String },
    CallbackAnswer { callback_id: String },
}

/// Test platform that records outbound calls. Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    sent: Arc<Mutex<Vec<Sent>>>,
}

impl MockPlatform {
    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }

    pub fn messages(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Message { chat_id, text } if *chat_id == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn documents(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|sent| match sent {
                Sent::Document { chat_id, file_id } if *chat_id == chat => Some(file_id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Prompt and buttons of the latest keyboard sent to `chat`.
    pub fn last_choices(&self, chat: ChatId) -> (String, Vec<Choice>) {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|sent| match sent {
                Sent::Choices { chat_id, text, choices } if *chat_id == chat => {
                    Some((text.clone(), choices.clone()))
                }
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn answered(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|sent| match sent {
                Sent::CallbackAnswer { callback_id } => Some(callback_id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), PlatformError> {
        self.record(Sent::Message { chat_id, text: text.to_string() });
        Ok(())
    }

    async fn send_choices(
        &self,
        chat_id: ChatId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), PlatformError> {
        self.record(Sent::Choices {
            chat_id,
            text: text.to_string(),
            choices: choices.to_vec(),
        });
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, file_id: &str) -> Result<(), PlatformError> {
        self.record(Sent::Document { chat_id, file_id: file_id.to_string() });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), PlatformError> {
        self.record(Sent::CallbackAnswer { callback_id: callback_id.to_string() });
        Ok(())
    }
}

/// In-memory stand-in for the resource service. Pairs that were never set
/// answer `NotFound`.
#[derive(Debug, Clone, Default)]
pub struct MockResourceApi {
    /// `None` makes every call fail as unreachable.
    courses: Option<Vec<Course>>,
    resources: Arc<Mutex<HashMap<(String, String), Vec<ResourceRow>>>>,
    add_rejection: Arc<Mutex<Option<String>>>,
    added: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl MockResourceApi {
    pub fn with_courses(codes: &[&str]) -> Self {
        let courses = codes
            .iter()
            .zip(1..)
            .map(|(code, id)| Course { id, course_code: code.to_string() })
            .collect();
        MockResourceApi {
            courses: Some(courses),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        MockResourceApi::default()
    }

    pub fn set_resources(&self, course_code: &str, resource_type: &str, rows: Vec<ResourceRow>) {
        self.resources
            .lock()
            .unwrap()
            .insert((course_code.to_string(), resource_type.to_string()), rows);
    }

    pub fn reject_adds(&self, reason: &str) {
        *self.add_rejection.lock().unwrap() = Some(reason.to_string());
    }

    pub fn added(&self) -> Vec<(String, String, String)> {
        self.added.lock().unwrap().clone()
    }

    fn unavailable() -> BackendError {
        BackendError::Status {
            status: 503,
            reason: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ResourceApi for MockResourceApi {
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError> {
        self.courses.clone().ok_or_else(Self::unavailable)
    }

    async fn get_resources(
        &self,
        course_code: &str,
        resource_type: &str,
    ) -> Result<ResourceLookup, BackendError> {
        if self.courses.is_none() {
            return Err(Self::unavailable());
        }
        let key = (course_code.to_string(), resource_type.to_string());
        Ok(match self.resources.lock().unwrap().get(&key) {
            Some(rows) => ResourceLookup::Found(rows.clone()),
            None => ResourceLookup::NotFound,
        })
    }

    async fn add_resource(
        &self,
        course_code: &str,
        resource_type: &str,
        resource_data: &str,
    ) -> Result<(), BackendError> {
        if self.courses.is_none() {
            return Err(Self::unavailable());
        }
        if let Some(reason) = self.add_rejection.lock().unwrap().clone() {
            return Err(BackendError::Status { status: 400, reason });
        }
        self.added.lock().unwrap().push((
            course_code.to_string(),
            resource_type.to_string(),
            resource_data.to_string(),
        ));
        Ok(())
    }
}
