//! Network messages - communication between App and Network layers

use std::path::PathBuf;

use crate::models::{FileRecord, NewProject, Project, ProjectId, Task, TaskId};

/// One API round trip, carrying the context needed to reconcile its reply
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    /// GET /projects
    ListProjects,
    /// POST /projects
    CreateProject(NewProject),
    /// DELETE /projects/{id}
    DeleteProject(ProjectId),
    /// POST /projects/{id}/upload (multipart field `file`)
    UploadFile { project_id: ProjectId, path: PathBuf },
    /// GET /projects/{id}/files
    ListFiles(ProjectId),
    /// GET /projects/{id}/tasks
    ListTasks(ProjectId),
    /// POST /projects/{id}/tasks
    CreateTask { project_id: ProjectId, title: String },
    /// PUT /tasks/{id}
    UpdateTask {
        task_id: TaskId,
        done: bool,
        project_id: ProjectId,
    },
    /// GET /projects/{id}/completion
    Completion(ProjectId),
    /// GET /files/{id}/view, read as text
    ViewFile(FileRecord),
    /// Hand /files/{id}/view to the OS viewer
    OpenExternal(FileRecord),
}

impl ApiCall {
    /// User-facing name of the action, used in notifications
    pub fn action(&self) -> &'static str {
        match self {
            ApiCall::ListProjects => "Load projects",
            ApiCall::CreateProject(_) => "Create project",
            ApiCall::DeleteProject(_) => "Delete project",
            ApiCall::UploadFile { .. } => "Upload file",
            ApiCall::ListFiles(_) => "Load files",
            ApiCall::ListTasks(_) => "Load tasks",
            ApiCall::CreateTask { .. } => "Add task",
            ApiCall::UpdateTask { .. } => "Update task",
            ApiCall::Completion(_) => "Load completion",
            ApiCall::ViewFile(_) => "View file",
            ApiCall::OpenExternal(_) => "Open file",
        }
    }

    /// Project the call is scoped to, if any
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            ApiCall::DeleteProject(id)
            | ApiCall::ListFiles(id)
            | ApiCall::ListTasks(id)
            | ApiCall::Completion(id) => Some(*id),
            ApiCall::UploadFile { project_id, .. }
            | ApiCall::CreateTask { project_id, .. }
            | ApiCall::UpdateTask { project_id, .. } => Some(*project_id),
            ApiCall::ListProjects
            | ApiCall::CreateProject(_)
            | ApiCall::ViewFile(_)
            | ApiCall::OpenExternal(_) => None,
        }
    }
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Perform an API call
    Execute { id: u64, call: ApiCall },
    /// Shutdown the network actor
    Shutdown,
}

/// Successful outcome of an [`ApiCall`]
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Projects(Vec<Project>),
    ProjectCreated(Project),
    ProjectDeleted(ProjectId),
    FileUploaded(ProjectId),
    Files {
        project_id: ProjectId,
        files: Vec<FileRecord>,
    },
    Tasks {
        project_id: ProjectId,
        tasks: Vec<Task>,
    },
    TaskCreated(ProjectId),
    TaskUpdated {
        task_id: TaskId,
        project_id: ProjectId,
    },
    Completion {
        project_id: ProjectId,
        percentage: f64,
    },
    FileContent {
        file: FileRecord,
        content: String,
    },
    Opened(FileRecord),
}

impl ApiReply {
    /// Project whose mirrors this reply writes into
    pub fn project_id(&self) -> Option<ProjectId> {
        match self {
            ApiReply::FileUploaded(id) | ApiReply::TaskCreated(id) => Some(*id),
            ApiReply::Files { project_id, .. }
            | ApiReply::Tasks { project_id, .. }
            | ApiReply::TaskUpdated { project_id, .. }
            | ApiReply::Completion { project_id, .. } => Some(*project_id),
            ApiReply::Projects(_)
            | ApiReply::ProjectCreated(_)
            | ApiReply::ProjectDeleted(_)
            | ApiReply::FileContent { .. }
            | ApiReply::Opened(_) => None,
        }
    }
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResponse {
    /// The call succeeded
    Success {
        id: u64,
        reply: ApiReply,
        time_ms: u64,
    },
    /// The call failed (transport, HTTP status or decoding)
    Error {
        id: u64,
        action: &'static str,
        message: String,
        /// Scope of the failed call, so late errors for deleted projects can be dropped
        project_id: Option<ProjectId>,
        time_ms: u64,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Success { id, .. } => *id,
            NetworkResponse::Error { id, .. } => *id,
        }
    }
}
