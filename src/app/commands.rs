//! Command handlers - business logic for processing UI events
//!
//! Every mutation goes to the server first. Local mirrors only change when a
//! reply arrives, and mutations are followed by re-fetches of what they touched.

use std::path::PathBuf;

use crate::app::AppState;
use crate::constants::MAX_NOTIFICATIONS;
use crate::messages::ui_events::{InputField, InputMode, Panel};
use crate::messages::{ApiCall, ApiReply, NetworkCommand, NetworkResponse};
use crate::models::{FileRecord, NewProject, Notification, ProjectId, TaskId, ViewedFile};
use crate::viewer::{self, ViewMode};

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.active_panel = self.active_panel.next();
    }

    pub fn prev_panel(&mut self) {
        self.active_panel = self.active_panel.prev();
    }

    pub fn cursor_down(&mut self) {
        match self.active_panel {
            Panel::Projects => {
                let len = self.mirrors.projects.len();
                if len > 0 {
                    self.project_cursor = (self.project_cursor + 1) % len;
                    self.file_cursor = 0;
                }
            }
            Panel::Tasks => {
                let len = self.selected_tasks().len();
                if len > 0 {
                    self.task_cursor = (self.task_cursor + 1) % len;
                }
            }
            Panel::Files => {
                let len = self.highlighted_files().len();
                if len > 0 {
                    self.file_cursor = (self.file_cursor + 1) % len;
                }
            }
        }
    }

    pub fn cursor_up(&mut self) {
        match self.active_panel {
            Panel::Projects => {
                let len = self.mirrors.projects.len();
                if len > 0 {
                    self.project_cursor = self.project_cursor.checked_sub(1).unwrap_or(len - 1);
                    self.file_cursor = 0;
                }
            }
            Panel::Tasks => {
                let len = self.selected_tasks().len();
                if len > 0 {
                    self.task_cursor = self.task_cursor.checked_sub(1).unwrap_or(len - 1);
                }
            }
            Panel::Files => {
                let len = self.highlighted_files().len();
                if len > 0 {
                    self.file_cursor = self.file_cursor.checked_sub(1).unwrap_or(len - 1);
                }
            }
        }
    }

    pub fn viewer_scroll_up(&mut self) {
        self.viewer_scroll = self.viewer_scroll.saturating_sub(1);
    }

    pub fn viewer_scroll_down(&mut self) {
        self.viewer_scroll = self.viewer_scroll.saturating_add(1);
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self, field: InputField) {
        self.active_field = field;
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    pub fn next_field(&mut self) {
        self.active_field = self.active_field.next();
        self.cursor_position = self.current_input().len();
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        let input = self.current_input_mut();
        if cursor_pos <= input.len() {
            input.insert(cursor_pos, c);
            self.cursor_position = cursor_pos + c.len_utf8();
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let cursor_pos = self.cursor_position;
            let input = self.current_input_mut();
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    /// Enter while editing: create a project or add a task
    pub fn submit(&mut self) -> Option<NetworkCommand> {
        self.stop_editing();
        match self.active_field {
            InputField::Name | InputField::Description => Some(self.create_project()),
            InputField::NewTask => {
                let project_id = self.selected_project?;
                self.add_task(project_id)
            }
        }
    }

    fn clamp_input_cursor(&mut self) {
        self.cursor_position = self.cursor_position.min(self.current_input().len());
    }

    // ========================
    // Requests
    // ========================

    fn dispatch(&mut self, call: ApiCall) -> NetworkCommand {
        let id = self.next_id();
        self.in_flight.insert(id);
        NetworkCommand::Execute { id, call }
    }

    /// Initial load (and refresh) of the project list
    pub fn load_projects(&mut self) -> NetworkCommand {
        self.dispatch(ApiCall::ListProjects)
    }

    /// Create a project from the form inputs. No client-side validation.
    pub fn create_project(&mut self) -> NetworkCommand {
        let body = NewProject {
            name: self.inputs.name.clone(),
            description: self.inputs.description.clone(),
        };
        self.dispatch(ApiCall::CreateProject(body))
    }

    pub fn delete_project(&mut self, project_id: ProjectId) -> NetworkCommand {
        self.dispatch(ApiCall::DeleteProject(project_id))
    }

    /// Upload the pending file; nothing happens when no file was picked.
    pub fn upload_file(&mut self, project_id: ProjectId) -> Option<NetworkCommand> {
        let path = self.pending_file.clone()?;
        Some(self.dispatch(ApiCall::UploadFile { project_id, path }))
    }

    pub fn fetch_files(&mut self, project_id: ProjectId) -> NetworkCommand {
        self.dispatch(ApiCall::ListFiles(project_id))
    }

    pub fn fetch_tasks(&mut self, project_id: ProjectId) -> NetworkCommand {
        self.dispatch(ApiCall::ListTasks(project_id))
    }

    pub fn fetch_completion(&mut self, project_id: ProjectId) -> NetworkCommand {
        self.dispatch(ApiCall::Completion(project_id))
    }

    /// Add a task from the new-task input; blank titles are ignored.
    pub fn add_task(&mut self, project_id: ProjectId) -> Option<NetworkCommand> {
        if self.inputs.new_task.trim().is_empty() {
            return None;
        }
        let title = self.inputs.new_task.clone();
        Some(self.dispatch(ApiCall::CreateTask { project_id, title }))
    }

    /// Ask the server to flip a task. The checkbox only changes after the re-fetch.
    pub fn toggle_task_done(
        &mut self,
        task_id: TaskId,
        done: bool,
        project_id: ProjectId,
    ) -> NetworkCommand {
        self.dispatch(ApiCall::UpdateTask {
            task_id,
            done: !done,
            project_id,
        })
    }

    /// Expand a project's detail panel and load its tasks and completion
    pub fn view_tasks(&mut self, project_id: ProjectId) -> Vec<NetworkCommand> {
        let commands = vec![
            self.fetch_tasks(project_id),
            self.fetch_completion(project_id),
        ];
        if self.selected_project != Some(project_id) {
            self.task_cursor = 0;
        }
        self.selected_project = Some(project_id);
        commands
    }

    /// Open a file: hand it to the OS viewer or fetch it for inline display
    pub fn view_file(&mut self, file: FileRecord) -> NetworkCommand {
        let call = match viewer::classify(&file.filename) {
            ViewMode::External => ApiCall::OpenExternal(file),
            ViewMode::Inline(_) => ApiCall::ViewFile(file),
        };
        self.dispatch(call)
    }

    pub fn close_viewed_file(&mut self) {
        self.viewed_file = None;
        self.viewer_scroll = 0;
    }

    // ========================
    // Cursor-driven actions
    // ========================

    pub fn delete_highlighted(&mut self) -> Option<NetworkCommand> {
        let id = self.highlighted_project()?.id;
        Some(self.delete_project(id))
    }

    pub fn upload_to_highlighted(&mut self) -> Option<NetworkCommand> {
        let id = self.highlighted_project()?.id;
        self.upload_file(id)
    }

    pub fn view_files_of_highlighted(&mut self) -> Option<NetworkCommand> {
        let id = self.highlighted_project()?.id;
        Some(self.fetch_files(id))
    }

    pub fn view_tasks_of_highlighted(&mut self) -> Vec<NetworkCommand> {
        match self.highlighted_project() {
            Some(project) => {
                let id = project.id;
                self.view_tasks(id)
            }
            None => Vec::new(),
        }
    }

    pub fn toggle_highlighted_task(&mut self) -> Option<NetworkCommand> {
        let project_id = self.selected_project?;
        let task = self.selected_tasks().get(self.task_cursor)?.clone();
        Some(self.toggle_task_done(task.id, task.done, project_id))
    }

    pub fn view_highlighted_file(&mut self) -> Option<NetworkCommand> {
        let file = self.highlighted_files().get(self.file_cursor)?.clone();
        Some(self.view_file(file))
    }

    // ========================
    // Response handling
    // ========================

    /// Reconcile a reply into the mirrors. Returns the follow-up re-fetches.
    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<NetworkCommand> {
        self.in_flight.remove(&response.id());

        match response {
            NetworkResponse::Success { reply, .. } => self.apply_reply(reply),
            NetworkResponse::Error {
                action,
                message,
                project_id,
                ..
            } => {
                if let Some(project_id) = project_id {
                    if !self.mirrors.contains_project(project_id) {
                        tracing::debug!(%project_id, action, "Discarding error for a project no longer listed");
                        return Vec::new();
                    }
                }
                self.notify(action, message);
                Vec::new()
            }
        }
    }

    fn apply_reply(&mut self, reply: ApiReply) -> Vec<NetworkCommand> {
        if let Some(project_id) = reply.project_id() {
            if !self.mirrors.contains_project(project_id) {
                tracing::debug!(%project_id, "Discarding reply for a project no longer listed");
                return Vec::new();
            }
        }

        match reply {
            ApiReply::Projects(projects) => {
                self.mirrors.projects = projects;
                self.prune_orphans();
                let ids: Vec<ProjectId> = self.mirrors.projects.iter().map(|p| p.id).collect();
                ids.into_iter().map(|id| self.fetch_completion(id)).collect()
            }
            ApiReply::ProjectCreated(project) => {
                let id = project.id;
                self.mirrors.projects.push(project);
                self.inputs.name.clear();
                self.inputs.description.clear();
                self.clamp_input_cursor();
                vec![self.fetch_completion(id)]
            }
            ApiReply::ProjectDeleted(project_id) => {
                self.mirrors.remove_project(project_id);
                if self.selected_project == Some(project_id) {
                    self.selected_project = None;
                }
                self.clamp_cursors();
                Vec::new()
            }
            ApiReply::FileUploaded(project_id) => {
                self.pending_file = None;
                vec![self.fetch_files(project_id)]
            }
            ApiReply::Files { project_id, files } => {
                self.mirrors.files.insert(project_id, files);
                self.selected_project = Some(project_id);
                self.clamp_cursors();
                Vec::new()
            }
            ApiReply::Tasks { project_id, tasks } => {
                self.mirrors.tasks.insert(project_id, tasks);
                self.clamp_cursors();
                Vec::new()
            }
            ApiReply::TaskCreated(project_id) => {
                self.inputs.new_task.clear();
                self.clamp_input_cursor();
                vec![
                    self.fetch_tasks(project_id),
                    self.fetch_completion(project_id),
                ]
            }
            ApiReply::TaskUpdated { project_id, .. } => vec![
                self.fetch_tasks(project_id),
                self.fetch_completion(project_id),
            ],
            ApiReply::Completion {
                project_id,
                percentage,
            } => {
                self.mirrors.completion.insert(project_id, percentage);
                Vec::new()
            }
            ApiReply::FileContent { file, content } => {
                self.viewed_file = Some(ViewedFile::new(file, content));
                self.viewer_scroll = 0;
                Vec::new()
            }
            ApiReply::Opened(file) => {
                tracing::debug!(file = %file.filename, "Handed file to system viewer");
                Vec::new()
            }
        }
    }

    /// Drop sub-resource entries whose project is gone after a full reload
    fn prune_orphans(&mut self) {
        let mirrors = &mut self.mirrors;
        let live: std::collections::HashSet<ProjectId> =
            mirrors.projects.iter().map(|p| p.id).collect();
        mirrors.files.retain(|id, _| live.contains(id));
        mirrors.tasks.retain(|id, _| live.contains(id));
        mirrors.completion.retain(|id, _| live.contains(id));
        if let Some(selected) = self.selected_project {
            if !live.contains(&selected) {
                self.selected_project = None;
            }
        }
        self.clamp_cursors();
    }

    fn clamp_cursors(&mut self) {
        self.project_cursor = self
            .project_cursor
            .min(self.mirrors.projects.len().saturating_sub(1));
        self.task_cursor = self
            .task_cursor
            .min(self.selected_tasks().len().saturating_sub(1));
        self.file_cursor = self
            .file_cursor
            .min(self.highlighted_files().len().saturating_sub(1));
    }

    // ========================
    // Notifications
    // ========================

    pub fn notify(&mut self, action: &str, message: impl Into<String>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
        self.notifications.push(Notification::new(action, message));
    }

    pub fn dismiss_notifications(&mut self) {
        self.notifications.clear();
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // File picker
    // ========================

    pub fn open_file_picker(&mut self) {
        self.show_file_picker = true;
        if let Some(path) = &self.pending_file {
            self.picker_input = path.to_string_lossy().to_string();
        }
    }

    pub fn picker_char(&mut self, c: char) {
        self.picker_input.push(c);
    }

    pub fn picker_backspace(&mut self) {
        self.picker_input.pop();
    }

    pub fn cancel_picker(&mut self) {
        self.show_file_picker = false;
        self.picker_input.clear();
    }

    pub fn picker_autocomplete(&mut self) {
        use std::fs;

        let input = match expand_home(&self.picker_input) {
            Some(input) => input,
            None => return,
        };

        let path = PathBuf::from(&input);

        if path.is_dir() && !input.ends_with('/') {
            self.picker_input = format!("{}/", input);
            return;
        }

        let (parent, prefix) = if input.ends_with('/') {
            (PathBuf::from(&input), String::new())
        } else if let Some(parent) = path.parent() {
            let prefix = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let parent = if parent.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                parent.to_path_buf()
            };
            (parent, prefix)
        } else {
            return;
        };

        if let Ok(entries) = fs::read_dir(&parent) {
            let mut matches: Vec<(String, bool)> = entries
                .filter_map(|e| e.ok())
                .filter_map(|e| {
                    let is_dir = e.path().is_dir();
                    e.file_name().into_string().ok().map(|name| (name, is_dir))
                })
                .filter(|(name, _)| name.starts_with(&prefix) && !name.starts_with('.'))
                .collect();

            matches.sort();

            if matches.len() == 1 {
                let (name, is_dir) = &matches[0];
                let completed = parent.join(name).to_string_lossy().to_string();
                self.picker_input = if *is_dir {
                    format!("{}/", completed)
                } else {
                    completed
                };
            } else if matches.len() > 1 {
                let names: Vec<String> = matches.into_iter().map(|(name, _)| name).collect();
                if let Some(common) = common_prefix(&names) {
                    if common.len() > prefix.len() {
                        let completed = parent.join(&common);
                        self.picker_input = completed.to_string_lossy().to_string();
                    }
                }
            }
        }
    }

    /// Accept the typed path as the pending upload if it names a file
    pub fn confirm_picker(&mut self) {
        let expanded = expand_home(&self.picker_input).unwrap_or_else(|| self.picker_input.clone());
        let path = PathBuf::from(expanded.trim());

        if path.is_file() {
            self.pending_file = Some(path);
            self.show_file_picker = false;
            self.picker_input.clear();
        } else {
            self.notify("Choose file", format!("{} is not a file", path.display()));
        }
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(input: &str) -> Option<String> {
    if input.starts_with('~') {
        let home = dirs::home_dir()?;
        Some(input.replacen('~', &home.to_string_lossy(), 1))
    } else {
        Some(input.to_string())
    }
}

/// Find common prefix among strings
fn common_prefix(strings: &[String]) -> Option<String> {
    let first = strings.first()?;
    let mut prefix_len = first.len();

    for s in &strings[1..] {
        prefix_len = first
            .char_indices()
            .zip(s.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, a), _)| i + a.len_utf8())
            .unwrap_or(0)
            .min(prefix_len);
    }

    if prefix_len > 0 {
        Some(first[..prefix_len].to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Project, Task};

    fn project(id: u64, name: &str) -> Project {
        Project {
            id: ProjectId(id),
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn task(id: u64, title: &str, done: bool) -> Task {
        Task {
            id: TaskId(id),
            title: title.to_string(),
            done,
        }
    }

    fn file(id: u64, name: &str) -> FileRecord {
        FileRecord {
            id: crate::models::FileId(id),
            filename: name.to_string(),
        }
    }

    fn reply(state: &mut AppState, reply: ApiReply) -> Vec<ApiCall> {
        calls(state.handle_response(NetworkResponse::Success {
            id: 0,
            reply,
            time_ms: 1,
        }))
    }

    fn calls(commands: impl IntoIterator<Item = NetworkCommand>) -> Vec<ApiCall> {
        commands
            .into_iter()
            .filter_map(|cmd| match cmd {
                NetworkCommand::Execute { call, .. } => Some(call),
                NetworkCommand::Shutdown => None,
            })
            .collect()
    }

    fn loaded(projects: Vec<Project>) -> AppState {
        let mut state = AppState::new();
        reply(&mut state, ApiReply::Projects(projects));
        state
    }

    #[test]
    fn test_initial_load_fetches_completion_for_every_project() {
        let mut state = AppState::new();
        let follow_ups = reply(
            &mut state,
            ApiReply::Projects(vec![project(1, "a"), project(2, "b")]),
        );
        assert_eq!(state.mirrors.projects.len(), 2);
        assert_eq!(
            follow_ups,
            vec![
                ApiCall::Completion(ProjectId(1)),
                ApiCall::Completion(ProjectId(2))
            ]
        );
    }

    #[test]
    fn test_create_project_appends_only_on_success() {
        let mut state = AppState::new();
        state.inputs.name = "Launch".into();
        state.inputs.description = "Q1 plan".into();

        let cmd = state.create_project();
        assert_eq!(
            calls([cmd]),
            vec![ApiCall::CreateProject(NewProject {
                name: "Launch".into(),
                description: "Q1 plan".into()
            })]
        );
        assert!(state.mirrors.projects.is_empty());

        let follow_ups = reply(&mut state, ApiReply::ProjectCreated(project(1, "Launch")));
        assert_eq!(state.mirrors.projects.len(), 1);
        assert!(state.inputs.name.is_empty());
        assert!(state.inputs.description.is_empty());
        assert_eq!(follow_ups, vec![ApiCall::Completion(ProjectId(1))]);
    }

    #[test]
    fn test_project_count_matches_successful_creates() {
        let mut state = AppState::new();
        for id in 1..=3 {
            state.create_project();
            reply(&mut state, ApiReply::ProjectCreated(project(id, "p")));
        }
        state.create_project();
        state.handle_response(NetworkResponse::Error {
            id: 99,
            action: "Create project",
            message: "API error 500: boom".into(),
            project_id: None,
            time_ms: 3,
        });
        assert_eq!(state.mirrors.projects.len(), 3);
        assert_eq!(state.notifications.len(), 1);
    }

    #[test]
    fn test_completion_shows_zero_until_server_reports() {
        let mut state = AppState::new();
        reply(&mut state, ApiReply::ProjectCreated(project(1, "Launch")));
        assert_eq!(state.mirrors.completion_of(ProjectId(1)), 0.0);

        reply(
            &mut state,
            ApiReply::Completion {
                project_id: ProjectId(1),
                percentage: 42.0,
            },
        );
        assert_eq!(state.to_render_state().completion_of(ProjectId(1)), 42.0);

        reply(
            &mut state,
            ApiReply::Completion {
                project_id: ProjectId(1),
                percentage: 50.0,
            },
        );
        assert_eq!(state.mirrors.completion_of(ProjectId(1)), 50.0);
    }

    #[test]
    fn test_delete_purges_every_mirror_and_selection() {
        let mut state = loaded(vec![project(1, "a"), project(2, "b")]);
        reply(
            &mut state,
            ApiReply::Files {
                project_id: ProjectId(1),
                files: vec![file(10, "x.json")],
            },
        );
        reply(
            &mut state,
            ApiReply::Tasks {
                project_id: ProjectId(1),
                tasks: vec![task(5, "t", false)],
            },
        );
        reply(
            &mut state,
            ApiReply::Completion {
                project_id: ProjectId(1),
                percentage: 10.0,
            },
        );
        assert_eq!(state.selected_project, Some(ProjectId(1)));

        let cmd = state.delete_project(ProjectId(1));
        assert_eq!(calls([cmd]), vec![ApiCall::DeleteProject(ProjectId(1))]);
        // Nothing changes before confirmation
        assert!(state.mirrors.contains_project(ProjectId(1)));

        reply(&mut state, ApiReply::ProjectDeleted(ProjectId(1)));
        assert!(!state.mirrors.contains_project(ProjectId(1)));
        assert!(!state.mirrors.files.contains_key(&ProjectId(1)));
        assert!(!state.mirrors.tasks.contains_key(&ProjectId(1)));
        assert!(!state.mirrors.completion.contains_key(&ProjectId(1)));
        assert_eq!(state.selected_project, None);
        assert_eq!(state.mirrors.projects, vec![project(2, "b")]);
    }

    #[test]
    fn test_failed_delete_keeps_project() {
        let mut state = loaded(vec![project(1, "a")]);
        state.delete_project(ProjectId(1));
        state.handle_response(NetworkResponse::Error {
            id: 2,
            action: "Delete project",
            message: "Not found: gone".into(),
            project_id: Some(ProjectId(1)),
            time_ms: 4,
        });
        assert!(state.mirrors.contains_project(ProjectId(1)));
        assert_eq!(state.notifications[0].action, "Delete project");
    }

    #[test]
    fn test_late_reply_for_deleted_project_is_discarded() {
        let mut state = loaded(vec![project(1, "a")]);
        state.fetch_tasks(ProjectId(1));
        reply(&mut state, ApiReply::ProjectDeleted(ProjectId(1)));

        let follow_ups = reply(
            &mut state,
            ApiReply::Tasks {
                project_id: ProjectId(1),
                tasks: vec![task(1, "late", false)],
            },
        );
        assert!(follow_ups.is_empty());
        assert!(state.mirrors.tasks.is_empty());
    }

    #[test]
    fn test_late_error_for_deleted_project_is_discarded() {
        let mut state = loaded(vec![project(1, "a"), project(2, "b")]);
        reply(&mut state, ApiReply::ProjectDeleted(ProjectId(1)));

        state.handle_response(NetworkResponse::Error {
            id: 5,
            action: "Load tasks",
            message: "Not found: Project not found".into(),
            project_id: Some(ProjectId(1)),
            time_ms: 2,
        });
        assert!(state.notifications.is_empty());

        state.handle_response(NetworkResponse::Error {
            id: 6,
            action: "Load tasks",
            message: "API error 500: boom".into(),
            project_id: Some(ProjectId(2)),
            time_ms: 2,
        });
        assert_eq!(state.notifications.len(), 1);
    }

    #[test]
    fn test_toggle_sends_negation_and_refetches() {
        let mut state = loaded(vec![project(1, "a")]);
        state.view_tasks(ProjectId(1));
        reply(
            &mut state,
            ApiReply::Tasks {
                project_id: ProjectId(1),
                tasks: vec![task(7, "Draft spec", false), task(8, "Ship", true)],
            },
        );

        let cmd = state.toggle_highlighted_task().unwrap();
        assert_eq!(
            calls([cmd]),
            vec![ApiCall::UpdateTask {
                task_id: TaskId(7),
                done: true,
                project_id: ProjectId(1)
            }]
        );
        // Not optimistic
        assert!(!state.selected_tasks()[0].done);

        let follow_ups = reply(
            &mut state,
            ApiReply::TaskUpdated {
                task_id: TaskId(7),
                project_id: ProjectId(1),
            },
        );
        assert_eq!(
            follow_ups,
            vec![
                ApiCall::ListTasks(ProjectId(1)),
                ApiCall::Completion(ProjectId(1))
            ]
        );
    }

    #[test]
    fn test_add_task_guards_blank_and_refetches() {
        let mut state = loaded(vec![project(1, "a")]);
        state.inputs.new_task = "   ".into();
        assert!(state.add_task(ProjectId(1)).is_none());

        state.inputs.new_task = "Draft spec".into();
        let cmd = state.add_task(ProjectId(1)).unwrap();
        assert_eq!(
            calls([cmd]),
            vec![ApiCall::CreateTask {
                project_id: ProjectId(1),
                title: "Draft spec".into()
            }]
        );

        let follow_ups = reply(&mut state, ApiReply::TaskCreated(ProjectId(1)));
        assert!(state.inputs.new_task.is_empty());
        assert_eq!(
            follow_ups,
            vec![
                ApiCall::ListTasks(ProjectId(1)),
                ApiCall::Completion(ProjectId(1))
            ]
        );

        reply(
            &mut state,
            ApiReply::Tasks {
                project_id: ProjectId(1),
                tasks: vec![task(1, "Draft spec", false)],
            },
        );
        assert_eq!(state.mirrors.tasks[&ProjectId(1)].len(), 1);
    }

    #[test]
    fn test_view_tasks_selects_immediately() {
        let mut state = loaded(vec![project(1, "a"), project(2, "b")]);
        let issued = calls(state.view_tasks(ProjectId(2)));
        assert_eq!(
            issued,
            vec![
                ApiCall::ListTasks(ProjectId(2)),
                ApiCall::Completion(ProjectId(2))
            ]
        );
        assert_eq!(state.selected_project, Some(ProjectId(2)));

        // Another project expanding collapses the first
        state.view_tasks(ProjectId(1));
        assert_eq!(state.selected_project, Some(ProjectId(1)));
    }

    #[test]
    fn test_file_listing_selects_project_on_arrival() {
        let mut state = loaded(vec![project(1, "a"), project(2, "b")]);
        state.fetch_files(ProjectId(2));
        assert_eq!(state.selected_project, None);

        reply(
            &mut state,
            ApiReply::Files {
                project_id: ProjectId(2),
                files: vec![file(3, "notes.md")],
            },
        );
        assert_eq!(state.selected_project, Some(ProjectId(2)));
    }

    #[test]
    fn test_upload_requires_pending_file() {
        let mut state = loaded(vec![project(1, "a")]);
        assert!(state.upload_file(ProjectId(1)).is_none());

        state.pending_file = Some(PathBuf::from("/tmp/roadmap.pdf"));
        let cmd = state.upload_file(ProjectId(1)).unwrap();
        assert_eq!(
            calls([cmd]),
            vec![ApiCall::UploadFile {
                project_id: ProjectId(1),
                path: PathBuf::from("/tmp/roadmap.pdf")
            }]
        );

        let follow_ups = reply(&mut state, ApiReply::FileUploaded(ProjectId(1)));
        assert_eq!(state.pending_file, None);
        assert_eq!(follow_ups, vec![ApiCall::ListFiles(ProjectId(1))]);
    }

    #[test]
    fn test_view_file_routes_by_extension() {
        let mut state = AppState::new();
        for name in ["a.jpg", "b.PNG", "c.pdf", "d.txt", "e.webp"] {
            let call = calls([state.view_file(file(1, name))]);
            assert_eq!(call, vec![ApiCall::OpenExternal(file(1, name))]);
        }
        for name in ["a.json", "b.yaml", "c.csv", "README"] {
            let call = calls([state.view_file(file(1, name))]);
            assert_eq!(call, vec![ApiCall::ViewFile(file(1, name))]);
        }
    }

    #[test]
    fn test_viewed_file_slot_replaces_and_clears() {
        let mut state = AppState::new();
        reply(
            &mut state,
            ApiReply::FileContent {
                file: file(1, "a.JSON"),
                content: "{}".into(),
            },
        );
        assert_eq!(state.viewed_file.as_ref().unwrap().extension, "json");

        reply(
            &mut state,
            ApiReply::FileContent {
                file: file(2, "b.csv"),
                content: "x,y".into(),
            },
        );
        let viewed = state.viewed_file.as_ref().unwrap();
        assert_eq!(viewed.file.id, crate::models::FileId(2));
        assert_eq!(viewed.content, "x,y");

        state.close_viewed_file();
        assert!(state.viewed_file.is_none());
    }

    #[test]
    fn test_invalid_json_arrives_with_parse_error() {
        let mut state = AppState::new();
        reply(
            &mut state,
            ApiReply::FileContent {
                file: file(3, "broken.json"),
                content: "{not json".into(),
            },
        );
        let rendered = &state.viewed_file.as_ref().unwrap().rendered;
        assert_eq!(rendered.text, "{not json");
        assert!(rendered.parse_error.is_some());
        assert_eq!(
            state.to_render_state().viewed_file.unwrap().rendered,
            rendered.clone()
        );
    }

    #[test]
    fn test_opened_externally_leaves_slot_empty() {
        let mut state = AppState::new();
        reply(&mut state, ApiReply::Opened(file(1, "photo.jpg")));
        assert!(state.viewed_file.is_none());
    }

    #[test]
    fn test_reload_prunes_orphaned_entries() {
        let mut state = loaded(vec![project(1, "a"), project(2, "b")]);
        state.view_tasks(ProjectId(2));
        reply(
            &mut state,
            ApiReply::Completion {
                project_id: ProjectId(2),
                percentage: 100.0,
            },
        );

        reply(&mut state, ApiReply::Projects(vec![project(1, "a")]));
        assert!(!state.mirrors.completion.contains_key(&ProjectId(2)));
        assert_eq!(state.selected_project, None);
    }

    #[test]
    fn test_in_flight_tracks_outstanding_calls() {
        let mut state = AppState::new();
        let cmd = state.load_projects();
        assert!(state.to_render_state().is_loading);

        let id = match cmd {
            NetworkCommand::Execute { id, .. } => id,
            NetworkCommand::Shutdown => unreachable!(),
        };
        state.handle_response(NetworkResponse::Success {
            id,
            reply: ApiReply::Projects(Vec::new()),
            time_ms: 2,
        });
        assert!(!state.to_render_state().is_loading);
    }

    #[test]
    fn test_notifications_are_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_NOTIFICATIONS + 3) {
            state.notify("Load tasks", format!("failure {i}"));
        }
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(
            state.notifications.last().unwrap().message,
            format!("failure {}", MAX_NOTIFICATIONS + 2)
        );
        state.dismiss_notifications();
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_editing_inserts_at_cursor() {
        let mut state = AppState::new();
        state.start_editing(InputField::Name);
        for c in "Lanch".chars() {
            state.enter_char(c);
        }
        state.move_cursor_left();
        state.move_cursor_left();
        state.move_cursor_left();
        state.enter_char('u');
        assert_eq!(state.inputs.name, "Launch");

        state.next_field();
        state.enter_char('Q');
        assert_eq!(state.inputs.description, "Q");
        state.delete_char();
        assert!(state.inputs.description.is_empty());
    }

    #[test]
    fn test_submit_task_without_selection_is_noop() {
        let mut state = loaded(vec![project(1, "a")]);
        state.start_editing(InputField::NewTask);
        state.enter_char('x');
        assert!(state.submit().is_none());
        assert_eq!(state.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_picker_autocompletes_and_confirms_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("roadmap.json"), "{}").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();

        let mut state = AppState::new();
        state.open_file_picker();
        state.picker_input = format!("{}/road", dir.path().display());
        state.picker_autocomplete();
        assert_eq!(
            state.picker_input,
            dir.path().join("roadmap.json").to_string_lossy()
        );

        state.confirm_picker();
        assert_eq!(state.pending_file, Some(dir.path().join("roadmap.json")));
        assert!(!state.show_file_picker);
    }

    #[test]
    fn test_picker_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::new();
        state.open_file_picker();
        state.picker_input = dir.path().to_string_lossy().to_string();
        state.confirm_picker();
        assert_eq!(state.pending_file, None);
        assert!(state.show_file_picker);
        assert_eq!(state.notifications.len(), 1);
    }

    #[test]
    fn test_common_prefix() {
        let names = vec!["report-q1.csv".to_string(), "report-q2.csv".to_string()];
        assert_eq!(common_prefix(&names), Some("report-q".to_string()));
        assert_eq!(common_prefix(&[]), None);
    }
}
