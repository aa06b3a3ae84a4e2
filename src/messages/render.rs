//! Render state - data structure sent from App layer to UI for rendering

use std::collections::HashMap;
use std::path::PathBuf;

use crate::app::state::Inputs;
use crate::messages::ui_events::{InputField, KeyContext};
use crate::models::{FileRecord, Notification, Project, ProjectId, Task, ViewedFile};

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    // Projects list
    pub projects: Vec<Project>,
    pub completion: HashMap<ProjectId, f64>,
    pub project_cursor: usize,

    // Detail panel of the selected project
    pub selected_project: Option<ProjectId>,
    pub tasks: Vec<Task>,
    pub task_cursor: usize,

    // Files of the highlighted project
    pub files: Vec<FileRecord>,
    pub file_cursor: usize,

    // Inline file preview
    pub viewed_file: Option<ViewedFile>,
    pub viewer_scroll: u16,

    // Upload
    pub pending_file: Option<PathBuf>,

    // Inputs
    pub inputs: Inputs,
    pub active_field: InputField,
    pub cursor_position: usize,

    /// Panel, mode and popup flags; also drives key mapping
    pub key_context: KeyContext,
    pub is_loading: bool,
    pub notifications: Vec<Notification>,
    pub picker_input: String,
}

impl RenderState {
    pub fn completion_of(&self, id: ProjectId) -> f64 {
        self.completion.get(&id).copied().unwrap_or(0.0)
    }

    pub fn selected_project_name(&self) -> Option<&str> {
        let id = self.selected_project?;
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.as_str())
    }
}
