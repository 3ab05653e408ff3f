//! The add/get conversation as an explicit state machine.
//!
//! ```text
//! Idle --/add,/get--> AwaitingCourseCode --known code--> AwaitingCategorySelection
//!   ^                   |  unknown code: stays                |
//!   |                                                         | get: retrieve
//!   +---------------------------------------------------------+
//!   |                                                         | add
//!   +------ content submitted ---- AwaitingUploadContent <----+
//! ```
//!
//! Commands always win and drop any pending flow. Button payloads carry the
//! whole action/course/category triple, so a press is honoured even from an
//! older keyboard.

use tracing::{debug, warn};

use super::backend::{ResourceApi, ResourceLookup, ResourceRow};
use super::callback::{Action, CallbackData, MAX_CALLBACK_BYTES};
use super::category::Category;
use super::platform::{ChatPlatform, Choice, PlatformError};
use super::session::{ConversationState, SessionStore};
use super::ChatId;
use crate::references::{decode_references, is_file_id};

const WELCOME: &str = "Hello🎓\nWelcome to the Course Resource Bot!\n\
📚 Easily access and store academic resources.\n\
👉 Use /courses for a list of courses.\n\
✨ Enter /add to add resources or /get to access them.\n\
ℹ️ Enter /help for a list of commands";

const HELP: &str = "ℹ️ Help Section\n\n\
Here are the commands you can use:\n\n\
/start - Start the bot and get a welcome message.\n\
/courses - List all available courses.\n\
/add - Add academic resources to a course.\n\
/get - Retrieve academic resources for a course.\n\
/cancel - Abandon the current add or get.\n\n\
💡 After /add or /get, enter the course code and pick a category.";

const IDLE_HINT: &str = "ℹ️ Use /add to add resources, /get to retrieve them, or /help for all commands.";
const INVALID_FILE_ID: &str = "❌ Invalid file ID stored in database.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Courses,
    Add,
    Get,
    Cancel,
}

impl Command {
    /// Parses `/name`, `/name@botname` and `/name args`. Unknown names are
    /// `None`.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "courses" => Some(Command::Courses),
            "add" => Some(Command::Add),
            "get" => Some(Command::Get),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// Something a user did in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Command(Command),
    Text(String),
    Document { file_id: String },
    Callback { id: String, data: String },
    /// Any other message kind (photos, stickers, ...).
    Unsupported,
}

impl Incoming {
    fn kind(&self) -> &'static str {
        match self {
            Incoming::Command(_) => "command",
            Incoming::Text(_) => "text",
            Incoming::Document { .. } => "document",
            Incoming::Callback { .. } => "callback",
            Incoming::Unsupported => "unsupported",
        }
    }
}

pub struct Conversation<P, A> {
    platform: P,
    api: A,
    sessions: SessionStore,
}

impl<P: ChatPlatform, A: ResourceApi> Conversation<P, A> {
    pub fn new(platform: P, api: A) -> Self {
        Conversation {
            platform,
            api,
            sessions: SessionStore::default(),
        }
    }

    pub fn state(&self, chat_id: ChatId) -> ConversationState {
        self.sessions.get(chat_id)
    }

    /// Runs one transition for `chat_id`. Errors are failures to talk to the
    /// chat platform; backend failures are reported to the user instead.
    pub async fn handle(&mut self, chat_id: ChatId, event: Incoming) -> Result<(), PlatformError> {
        debug!(chat_id, kind = event.kind(), active_sessions = self.sessions.active(), "handling update");

        match event {
            Incoming::Command(command) => {
                self.sessions.reset(chat_id);
                self.run_command(chat_id, command).await
            }
            Incoming::Callback { id, data } => {
                if let Err(err) = self.platform.answer_callback(&id).await {
                    warn!(chat_id, error = %err, "could not acknowledge button press");
                }
                self.on_callback(chat_id, &data).await
            }
            event => match self.sessions.get(chat_id) {
                ConversationState::Idle => self.platform.send_message(chat_id, IDLE_HINT).await,
                ConversationState::AwaitingCourseCode { action } => {
                    self.on_course_code(chat_id, action, event).await
                }
                ConversationState::AwaitingCategorySelection { .. } => {
                    self.platform
                        .send_message(chat_id, "👆 Choose a category from the buttons above.")
                        .await
                }
                ConversationState::AwaitingUploadContent { course_code, category } => {
                    self.on_upload(chat_id, &course_code, category, event).await
                }
            },
        }
    }

    async fn run_command(&mut self, chat_id: ChatId, command: Command) -> Result<(), PlatformError> {
        match command {
            Command::Start => self.platform.send_message(chat_id, WELCOME).await,
            Command::Help => self.platform.send_message(chat_id, HELP).await,
            Command::Courses => self.list_courses(chat_id).await,
            Command::Add => self.ask_course_code(chat_id, Action::Add).await,
            Command::Get => self.ask_course_code(chat_id, Action::Get).await,
            Command::Cancel => self.platform.send_message(chat_id, "👌 Cancelled.").await,
        }
    }

    async fn list_courses(&self, chat_id: ChatId) -> Result<(), PlatformError> {
        match self.api.list_courses().await {
            Ok(courses) => {
                let course_list: Vec<&str> = courses.iter().map(|c| c.course_code.as_str()).collect();
                let text = format!("📜 List of Courses:\n{}", course_list.join("\n"));
                self.platform.send_message(chat_id, &text).await
            }
            Err(err) => {
                warn!(chat_id, error = %err, "failed to fetch courses");
                self.platform.send_message(chat_id, "❌ Failed to fetch courses.").await
            }
        }
    }

    async fn ask_course_code(&mut self, chat_id: ChatId, action: Action) -> Result<(), PlatformError> {
        let heading = match action {
            Action::Add => "🔧 Add Resource",
            Action::Get => "🔍 Get Resource",
        };
        self.platform
            .send_message(chat_id, &format!("{heading}\n\nEnter the course code:"))
            .await?;
        self.sessions.set(chat_id, ConversationState::AwaitingCourseCode { action });
        Ok(())
    }

    async fn on_course_code(
        &mut self,
        chat_id: ChatId,
        action: Action,
        event: Incoming,
    ) -> Result<(), PlatformError> {
        let Incoming::Text(text) = event else {
            return self.platform.send_message(chat_id, "✏️ Enter the course code:").await;
        };
        let course_code = text.trim().to_uppercase();

        let courses = match self.api.list_courses().await {
            Ok(courses) => courses,
            Err(err) => {
                warn!(chat_id, error = %err, "failed to fetch courses");
                self.sessions.reset(chat_id);
                return self.platform.send_message(chat_id, "❌ Failed to fetch courses.").await;
            }
        };

        if !courses.iter().any(|course| course.course_code == course_code) {
            // stays in AwaitingCourseCode
            return self
                .platform
                .send_message(chat_id, "❌ Course does not exist. Enter a valid course:")
                .await;
        }

        let choices: Vec<Choice> = Category::ALL
            .into_iter()
            .map(|category| Choice {
                label: category.label().to_string(),
                data: CallbackData {
                    action,
                    course_code: course_code.clone(),
                    category,
                }
                .encode(),
            })
            .collect();
        if choices.iter().any(|choice| choice.data.len() > MAX_CALLBACK_BYTES) {
            warn!(chat_id, course_code = %course_code, "course code too long for category buttons");
            self.sessions.reset(chat_id);
            return self
                .platform
                .send_message(chat_id, "❌ Course code is too long to choose a category.")
                .await;
        }
        let text = format!("{} resources for {}. Choose a category:", action.title(), course_code);
        self.platform.send_choices(chat_id, &text, &choices).await?;
        self.sessions.set(
            chat_id,
            ConversationState::AwaitingCategorySelection { action, course_code },
        );
        Ok(())
    }

    async fn on_callback(&mut self, chat_id: ChatId, data: &str) -> Result<(), PlatformError> {
        let Some(CallbackData { action, course_code, category }) = CallbackData::parse(data) else {
            warn!(chat_id, data, "ignoring malformed button payload");
            return Ok(());
        };

        match action {
            Action::Get => {
                self.sessions.reset(chat_id);
                self.retrieve(chat_id, &course_code, category).await
            }
            Action::Add => {
                let text = format!(
                    "➕ Add {} for {}. Please upload the file or paste a link.",
                    category.slug(),
                    course_code
                );
                self.platform.send_message(chat_id, &text).await?;
                self.sessions.set(
                    chat_id,
                    ConversationState::AwaitingUploadContent { course_code, category },
                );
                Ok(())
            }
        }
    }

    async fn retrieve(&self, chat_id: ChatId, course_code: &str, category: Category) -> Result<(), PlatformError> {
        let rows = match self.api.get_resources(course_code, category.slug()).await {
            Ok(ResourceLookup::Found(rows)) => rows,
            Ok(ResourceLookup::NotFound) => {
                let text = format!("❌ No resources found for {course_code} ({category}).");
                return self.platform.send_message(chat_id, &text).await;
            }
            Err(err) => {
                warn!(chat_id, %course_code, %category, error = %err, "failed to fetch resources");
                return self.platform.send_message(chat_id, "❌ Failed to fetch resources.").await;
            }
        };

        if rows.is_empty() {
            return self.platform.send_message(chat_id, "❌ No resources found.").await;
        }

        for row in &rows {
            self.send_row(chat_id, row).await?;
        }
        Ok(())
    }

    async fn send_row(&self, chat_id: ChatId, row: &ResourceRow) -> Result<(), PlatformError> {
        let references = decode_references(&row.resource_data);
        if references.is_empty() {
            debug!(chat_id, id = row.id, "resource row has no readable references");
            return self.platform.send_message(chat_id, INVALID_FILE_ID).await;
        }

        for reference in &references {
            if is_file_id(reference) {
                self.platform.send_document(chat_id, reference).await?;
            } else {
                self.platform.send_message(chat_id, INVALID_FILE_ID).await?;
            }
        }
        Ok(())
    }

    async fn on_upload(
        &mut self,
        chat_id: ChatId,
        course_code: &str,
        category: Category,
        event: Incoming,
    ) -> Result<(), PlatformError> {
        let reference = match event {
            Incoming::Document { file_id } => file_id,
            Incoming::Text(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => {
                // stays in AwaitingUploadContent
                return self
                    .platform
                    .send_message(chat_id, "📎 Please upload a document or paste a link.")
                    .await;
            }
        };

        self.sessions.reset(chat_id);
        match self.api.add_resource(course_code, category.slug(), &reference).await {
            Ok(()) => self.platform.send_message(chat_id, "✅ Resource saved successfully").await,
            Err(err) => {
                warn!(chat_id, %course_code, %category, error = %err, "failed to save resource");
                let text = format!("❌ Failed: {}", err.user_reason());
                self.platform.send_message(chat_id, &text).await
            }
        }
    }
}
