//! HTTP client wrapper - one method per endpoint of the project API

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::messages::{ApiCall, ApiReply};
use crate::models::{
    Completion, FileId, FileRecord, NewProject, NewTask, Project, ProjectId, Task, TaskId,
    TaskUpdate,
};

/// Thin client over the project API
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        ApiClient {
            base_url: config.api_base.clone(),
            http: create_client(config.timeout),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Address a file is served from, for both inline fetches and the OS viewer
    pub fn view_url(&self, file_id: FileId) -> String {
        self.url(&format!("/files/{file_id}/view"))
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let body = Self::check(resp).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.http.get(self.url(path)).send().await?;
        Self::decode(resp).await
    }

    async fn send_json<B: Serialize>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let resp = self
            .http
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.get_json("/projects").await
    }

    pub async fn create_project(&self, body: &NewProject) -> Result<Project> {
        let resp = self
            .send_json(reqwest::Method::POST, "/projects", body)
            .await?;
        Ok(serde_json::from_str(&resp.text().await?)?)
    }

    pub async fn delete_project(&self, id: ProjectId) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/projects/{id}")))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// Send a local file as multipart field `file`
    pub async fn upload_file(&self, id: ProjectId, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.as_ref())?;
        let form = Form::new().part("file", part);

        let resp = self
            .http
            .post(self.url(&format!("/projects/{id}/upload")))
            .multipart(form)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn list_files(&self, id: ProjectId) -> Result<Vec<FileRecord>> {
        self.get_json(&format!("/projects/{id}/files")).await
    }

    pub async fn list_tasks(&self, id: ProjectId) -> Result<Vec<Task>> {
        self.get_json(&format!("/projects/{id}/tasks")).await
    }

    pub async fn create_task(&self, id: ProjectId, title: &str) -> Result<()> {
        let body = NewTask {
            title: title.to_string(),
        };
        self.send_json(reqwest::Method::POST, &format!("/projects/{id}/tasks"), &body)
            .await?;
        Ok(())
    }

    pub async fn update_task(&self, id: TaskId, done: bool) -> Result<()> {
        let body = TaskUpdate { done };
        self.send_json(reqwest::Method::PUT, &format!("/tasks/{id}"), &body)
            .await?;
        Ok(())
    }

    pub async fn completion(&self, id: ProjectId) -> Result<f64> {
        let completion: Completion = self
            .get_json(&format!("/projects/{id}/completion"))
            .await?;
        Ok(completion.percentage)
    }

    /// Fetch a file body as text
    pub async fn file_content(&self, id: FileId) -> Result<String> {
        let resp = self.http.get(self.view_url(id)).send().await?;
        Ok(Self::check(resp).await?.text().await?)
    }

    /// Run one call and wrap its outcome with the context the app needs
    pub async fn execute(&self, call: ApiCall) -> Result<ApiReply> {
        let reply = match call {
            ApiCall::ListProjects => ApiReply::Projects(self.list_projects().await?),
            ApiCall::CreateProject(body) => {
                ApiReply::ProjectCreated(self.create_project(&body).await?)
            }
            ApiCall::DeleteProject(id) => {
                self.delete_project(id).await?;
                ApiReply::ProjectDeleted(id)
            }
            ApiCall::UploadFile { project_id, path } => {
                self.upload_file(project_id, &path).await?;
                ApiReply::FileUploaded(project_id)
            }
            ApiCall::ListFiles(project_id) => ApiReply::Files {
                project_id,
                files: self.list_files(project_id).await?,
            },
            ApiCall::ListTasks(project_id) => ApiReply::Tasks {
                project_id,
                tasks: self.list_tasks(project_id).await?,
            },
            ApiCall::CreateTask { project_id, title } => {
                self.create_task(project_id, &title).await?;
                ApiReply::TaskCreated(project_id)
            }
            ApiCall::UpdateTask {
                task_id,
                done,
                project_id,
            } => {
                self.update_task(task_id, done).await?;
                ApiReply::TaskUpdated {
                    task_id,
                    project_id,
                }
            }
            ApiCall::Completion(project_id) => ApiReply::Completion {
                project_id,
                percentage: self.completion(project_id).await?,
            },
            ApiCall::ViewFile(file) => {
                let content = self.file_content(file.id).await?;
                ApiReply::FileContent { file, content }
            }
            ApiCall::OpenExternal(file) => {
                open::that_detached(self.view_url(file.id))
                    .map_err(|e| ApiError::Open(e.to_string()))?;
                ApiReply::Opened(file)
            }
        };
        Ok(reply)
    }
}

/// Turn an error into the text shown in a notification
pub fn error_message(err: &ApiError, timeout: Duration) -> String {
    match err {
        ApiError::RequestFailed(e) if e.is_timeout() => {
            format!("Request timed out ({}s)", timeout.as_secs())
        }
        ApiError::RequestFailed(e) if e.is_connect() => format!("Connection failed: {}", e),
        other => other.to_string(),
    }
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
