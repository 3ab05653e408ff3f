//! Conversational front end. Platform specifics live in [`telegram`]; the
//! state machine in [`conversation`] only sees the [`platform::ChatPlatform`]
//! and [`backend::ResourceApi`] seams.

pub mod backend;
pub mod callback;
pub mod category;
pub mod conversation;
pub mod platform;
pub mod runner;
pub mod session;
pub mod telegram;

#[cfg(test)]
mod mock;

/// Chat identifier as issued by the platform.
pub type ChatId = i64;
