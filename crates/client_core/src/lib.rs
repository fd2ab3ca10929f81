use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::ClassificationResult,
    protocol::{
        ClassifyRequest, ClassifyResponse, DocumentsRequest, DocumentsResponse, PhasesRequest,
        PhasesResponse,
    },
};
use tracing::debug;

pub mod config;
pub mod error;
pub mod selection;

pub use config::{load_settings, ClientSettings};
pub use error::{ClassificationError, LoadError, SelectionError, ValidationError};
pub use selection::{
    ClassificationOutcome, Level, LevelState, LoadRequest, LoadTicket, OptionList, Selection,
    SelectionController, SubmitTicket, Submission,
};

const PHASES_PATH: &str = "/api/get_phases";
const DOCUMENTS_PATH: &str = "/api/get_documents";
const QUERY_PATH: &str = "/api/query";

/// Request/response boundary to the classification service.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn load_phases(&self, project_type: &str) -> Result<Vec<String>, LoadError>;
    async fn load_documents(
        &self,
        project_type: &str,
        project_phase: &str,
    ) -> Result<Vec<String>, LoadError>;
    async fn classify(
        &self,
        request: &ClassifyRequest,
    ) -> Result<ClassificationResult, ClassificationError>;
}

/// Completed option load, ready to be handed back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResponse {
    pub ticket: LoadTicket,
    pub result: Result<Vec<String>, LoadError>,
}

/// Runs a load handed out by [`SelectionController`].
pub async fn run_load(backend: &dyn ClassifierBackend, request: LoadRequest) -> LoadResponse {
    let ticket = request.ticket();
    let result = match request {
        LoadRequest::Phases { project_type, .. } => backend.load_phases(&project_type).await,
        LoadRequest::Documents {
            project_type,
            project_phase,
            ..
        } => backend.load_documents(&project_type, &project_phase).await,
    };
    LoadResponse { ticket, result }
}

pub async fn run_submission(
    backend: &dyn ClassifierBackend,
    submission: Submission,
) -> (SubmitTicket, Result<ClassificationResult, ClassificationError>) {
    let result = backend.classify(&submission.request).await;
    (submission.ticket, result)
}

/// How a single request to the service went wrong.
enum FetchError {
    Transport(String),
    Malformed(String),
}

pub struct HttpClassifierClient {
    http: Client,
    server_url: String,
}

impl HttpClassifierClient {
    pub fn new(settings: &ClientSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url: settings.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Posts a JSON body and decodes the reply regardless of HTTP status;
    /// the service reports failures through its `success` flag.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, FetchError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.server_url);
        debug!(%url, "posting classifier request");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        serde_json::from_str(&text).map_err(|err| {
            FetchError::Malformed(format!(
                "{path} returned an unreadable body (status {status}): {err}"
            ))
        })
    }
}

impl From<FetchError> for LoadError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Transport(message) => LoadError::Transport(message),
            FetchError::Malformed(message) => LoadError::Malformed(message),
        }
    }
}

impl From<FetchError> for ClassificationError {
    fn from(value: FetchError) -> Self {
        match value {
            FetchError::Transport(message) | FetchError::Malformed(message) => {
                ClassificationError::Transport(message)
            }
        }
    }
}

fn option_list(
    success: bool,
    options: Option<Vec<String>>,
    error: Option<String>,
    field: &str,
) -> Result<Vec<String>, LoadError> {
    if !success {
        return Err(LoadError::Rejected(error));
    }
    options.ok_or_else(|| LoadError::Malformed(format!("response is missing `{field}`")))
}

#[async_trait]
impl ClassifierBackend for HttpClassifierClient {
    async fn load_phases(&self, project_type: &str) -> Result<Vec<String>, LoadError> {
        let body: PhasesResponse = self
            .post_json(
                PHASES_PATH,
                &PhasesRequest {
                    project_type: project_type.to_string(),
                },
            )
            .await?;
        option_list(body.success, body.phases, body.error, "phases")
    }

    async fn load_documents(
        &self,
        project_type: &str,
        project_phase: &str,
    ) -> Result<Vec<String>, LoadError> {
        let body: DocumentsResponse = self
            .post_json(
                DOCUMENTS_PATH,
                &DocumentsRequest {
                    project_type: project_type.to_string(),
                    project_phase: project_phase.to_string(),
                },
            )
            .await?;
        option_list(body.success, body.documents, body.error, "documents")
    }

    async fn classify(
        &self,
        request: &ClassifyRequest,
    ) -> Result<ClassificationResult, ClassificationError> {
        let body: ClassifyResponse = self.post_json(QUERY_PATH, request).await?;
        if !body.success {
            return Err(ClassificationError::Rejected {
                message: body.error.unwrap_or_default(),
            });
        }
        let result_level = body.result_level.ok_or_else(|| {
            ClassificationError::Transport("response is missing `result_level`".to_string())
        })?;
        Ok(ClassificationResult {
            result_level,
            steps: body.flowchart.and_then(|flowchart| flowchart.steps),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
