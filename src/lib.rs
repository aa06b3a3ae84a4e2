//! # projdeck
//!
//! A terminal client for a project management REST API.
//!
//! ## Features
//! - Create, list and delete projects
//! - Upload files to a project and preview them (JSON/YAML pretty-printed)
//! - Add tasks, toggle them done, and track completion percentage
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine over local mirrors of server data)
//! - Network Layer (Tokio runtime)

pub mod constants;
pub mod config;
pub mod error;
pub mod models;
pub mod viewer;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use config::Config;
pub use error::ApiError;
pub use models::{FileRecord, Project, ProjectId, Task, TaskId};
pub use messages::{ApiCall, ApiReply, NetworkCommand, NetworkResponse, RenderState, UiEvent};
pub use app::{AppActor, AppState};
pub use network::{ApiClient, NetworkActor};
