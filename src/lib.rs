//! Course resource sharing: an HTTP service storing course/resource records in
//! Postgres, and a chat bot that browses and uploads through it.

pub mod bot;
pub mod config;
pub mod connection;
pub mod course_seed;
pub mod courses;
pub mod error;
pub mod logging;
pub mod models;
pub mod references;
pub mod resources;
pub mod routes;
pub mod schema;
