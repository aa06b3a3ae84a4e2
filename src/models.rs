use serde::{Deserialize, Serialize};
use std::fmt;

use crate::viewer::RenderedContent;

/// Server-assigned project identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

/// Server-assigned task identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

/// Server-assigned file identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project as returned by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Treats `null` like a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A file attached to a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: FileId,
    pub filename: String,
}

/// A task belonging to a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, deserialize_with = "truthy")]
    pub done: bool,
}

/// Accepts `true`/`false` as well as SQL-style `0`/`1` flags.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(Option<()>),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(_) => false,
    })
}

/// Body of `GET /projects/{id}/completion`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub percentage: f64,
}

/// Body of `POST /projects`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub description: String,
}

/// Body of `POST /projects/{id}/tasks`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTask {
    pub title: String,
}

/// Body of `PUT /tasks/{id}`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TaskUpdate {
    pub done: bool,
}

/// The one file currently previewed inline
#[derive(Clone, Debug, PartialEq)]
pub struct ViewedFile {
    pub file: FileRecord,
    pub extension: String,
    pub content: String,
    /// Pretty-printed once on arrival
    pub rendered: RenderedContent,
}

impl ViewedFile {
    pub fn new(file: FileRecord, content: String) -> Self {
        let extension = crate::viewer::file_extension(&file.filename);
        let rendered = crate::viewer::render_content(&content, &extension);
        ViewedFile {
            file,
            extension,
            content,
            rendered,
        }
    }
}

/// A failed action reported to the user
#[derive(Clone, Debug)]
pub struct Notification {
    pub action: String,
    pub message: String,
    pub at: chrono::DateTime<chrono::Local>,
}

impl Notification {
    pub fn new(action: impl Into<String>, message: impl Into<String>) -> Self {
        Notification {
            action: action.into(),
            message: message.into(),
            at: chrono::Local::now(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} failed: {}",
            self.at.format("%H:%M:%S"),
            self.action,
            self.message
        )
    }
}

/// Format a server percentage for display: whole numbers without decimals.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}
