//! App state - pure data structure with no I/O logic

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::messages::ui_events::{InputField, InputMode, KeyContext, Panel};
use crate::messages::RenderState;
use crate::models::{FileRecord, Notification, Project, ProjectId, Task, ViewedFile};

/// Local mirrors of server-owned collections.
///
/// Nothing here is authoritative: every entry is the last successful server
/// response for its key. Sub-resource maps are keyed by project id and must
/// never hold a key that is absent from `projects`.
#[derive(Clone, Debug, Default)]
pub struct Mirrors {
    pub projects: Vec<Project>,
    pub files: HashMap<ProjectId, Vec<FileRecord>>,
    pub tasks: HashMap<ProjectId, Vec<Task>>,
    pub completion: HashMap<ProjectId, f64>,
}

impl Mirrors {
    pub fn contains_project(&self, id: ProjectId) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    /// Remove a project and every sub-resource keyed by it
    pub fn remove_project(&mut self, id: ProjectId) {
        self.projects.retain(|p| p.id != id);
        self.files.remove(&id);
        self.tasks.remove(&id);
        self.completion.remove(&id);
    }

    /// Completion shown for a project; 0 until the server has reported one
    pub fn completion_of(&self, id: ProjectId) -> f64 {
        self.completion.get(&id).copied().unwrap_or(0.0)
    }
}

/// Form inputs
#[derive(Clone, Debug, Default)]
pub struct Inputs {
    pub name: String,
    pub description: String,
    pub new_task: String,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub mirrors: Mirrors,

    /// Project whose detail panel is expanded
    pub selected_project: Option<ProjectId>,
    /// At most one file previewed inline
    pub viewed_file: Option<ViewedFile>,
    /// Local file chosen for the next upload
    pub pending_file: Option<PathBuf>,

    // Form inputs
    pub inputs: Inputs,
    pub active_field: InputField,
    pub cursor_position: usize,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub project_cursor: usize,
    pub task_cursor: usize,
    pub file_cursor: usize,
    pub viewer_scroll: u16,

    // Requests
    pub next_request_id: u64,
    pub in_flight: HashSet<u64>,

    // Failed actions, newest last
    pub notifications: Vec<Notification>,

    // Popups
    pub show_help: bool,
    pub show_file_picker: bool,
    pub picker_input: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            mirrors: Mirrors::default(),
            selected_project: None,
            viewed_file: None,
            pending_file: None,
            inputs: Inputs::default(),
            active_field: InputField::Name,
            cursor_position: 0,
            active_panel: Panel::Projects,
            input_mode: InputMode::Normal,
            project_cursor: 0,
            task_cursor: 0,
            file_cursor: 0,
            viewer_scroll: 0,
            next_request_id: 1,
            in_flight: HashSet::new(),
            notifications: Vec::new(),
            show_help: false,
            show_file_picker: false,
            picker_input: String::new(),
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Project under the cursor in the projects list
    pub fn highlighted_project(&self) -> Option<&Project> {
        self.mirrors.projects.get(self.project_cursor)
    }

    /// Tasks of the expanded project
    pub fn selected_tasks(&self) -> &[Task] {
        self.selected_project
            .and_then(|id| self.mirrors.tasks.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files of the highlighted project
    pub fn highlighted_files(&self) -> &[FileRecord] {
        self.highlighted_project()
            .and_then(|p| self.mirrors.files.get(&p.id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get the current input field content
    pub fn current_input(&self) -> &str {
        match self.active_field {
            InputField::Name => &self.inputs.name,
            InputField::Description => &self.inputs.description,
            InputField::NewTask => &self.inputs.new_task,
        }
    }

    /// Get mutable reference to current input field
    pub fn current_input_mut(&mut self) -> &mut String {
        match self.active_field {
            InputField::Name => &mut self.inputs.name,
            InputField::Description => &mut self.inputs.description,
            InputField::NewTask => &mut self.inputs.new_task,
        }
    }

    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            show_help: self.show_help,
            show_file_picker: self.show_file_picker,
            viewing_file: self.viewed_file.is_some(),
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            projects: self.mirrors.projects.clone(),
            completion: self.mirrors.completion.clone(),
            project_cursor: self.project_cursor,
            selected_project: self.selected_project,
            tasks: self.selected_tasks().to_vec(),
            task_cursor: self.task_cursor,
            files: self.highlighted_files().to_vec(),
            file_cursor: self.file_cursor,
            viewed_file: self.viewed_file.clone(),
            viewer_scroll: self.viewer_scroll,
            pending_file: self.pending_file.clone(),
            inputs: self.inputs.clone(),
            active_field: self.active_field,
            cursor_position: self.cursor_position,
            key_context: self.key_context(),
            is_loading: !self.in_flight.is_empty(),
            notifications: self.notifications.clone(),
            picker_input: self.picker_input.clone(),
        }
    }
}
