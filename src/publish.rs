//! Publish Orchestrator: ships a project tree to the hosting provider and
//! tracks asynchronous completion.
//!
//! State machine per attempt: `Submitted → Building → {Ready | Error}`, with
//! an orthogonal `TimedOut` transition from `Building` once the wait budget
//! is exhausted. Submission failures are assumed deterministic (bad
//! credentials, malformed payload) and never retried; the fixed-interval
//! polling loop is itself the retry mechanism for status checks, so
//! transport failures during polling are merely inconclusive and count
//! against the attempt budget.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::HostingConfig;
use crate::project::ProjectTree;

/// Fixed delay between status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Attempt budget: 30 polls at 10s each, a 5-minute ceiling.
pub const MAX_POLL_ATTEMPTS: u32 = 30;

#[derive(Error, Debug)]
pub enum HostingError {
    #[error("hosting request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider rejection; the message is surfaced verbatim to the caller.
    #[error("{0}")]
    Rejected(String),
}

/// Lifecycle of one publish attempt. Terminal once Ready, Error, or
/// TimedOut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentStatus {
    Submitted,
    Building,
    Ready,
    Error,
    TimedOut,
}

impl DeploymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Error | Self::TimedOut)
    }
}

/// Record of one publish attempt. Created on submission, mutated only by
/// the polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub id: String,
    pub submitted_at: DateTime<Utc>,
    /// Hostname the provider assigned at submission time.
    pub target_url_prefix: String,
    pub status: DeploymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-publish parameters beyond the tree itself.
#[derive(Debug, Clone)]
pub struct HostingTarget {
    pub project_name: String,
}

/// Successful submission response from the provider.
#[derive(Debug, Clone)]
pub struct Submission {
    pub deployment_id: String,
    pub hostname: String,
}

/// Provider-reported build state of a submitted deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadyState {
    Ready,
    /// Anything that is not the terminal ready indicator; the loop keeps
    /// polling.
    Pending(String),
}

/// Seam to the hosting provider, so the orchestration loop is testable
/// without a network.
#[async_trait]
pub trait HostingApi: Send + Sync {
    async fn submit(
        &self,
        target: &HostingTarget,
        tree: &ProjectTree,
    ) -> Result<Submission, HostingError>;

    async fn status(&self, deployment_id: &str) -> Result<ReadyState, HostingError>;
}

/// Injected clock so tests can simulate elapsed time instead of sleeping.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Submit a project tree and poll until a terminal state, the attempt
/// budget runs out, or the caller cancels.
///
/// Cancellation stops further polling but does not retract the submitted
/// deployment; the record comes back still `Building` in that case, since
/// the provider may yet finish the build on its own.
pub async fn publish(
    api: &dyn HostingApi,
    tree: &ProjectTree,
    target: &HostingTarget,
    sleeper: &dyn Sleeper,
    cancel: CancellationToken,
) -> DeploymentRecord {
    let submitted_at = Utc::now();

    let submission = match api.submit(target, tree).await {
        Ok(s) => s,
        Err(e) => {
            warn!(project = %target.project_name, error = %e, "deployment submission rejected");
            return DeploymentRecord {
                id: Uuid::new_v4().to_string(),
                submitted_at,
                target_url_prefix: String::new(),
                status: DeploymentStatus::Error,
                result_url: None,
                error: Some(e.to_string()),
            };
        }
    };

    info!(
        project = %target.project_name,
        deployment_id = %submission.deployment_id,
        hostname = %submission.hostname,
        "deployment submitted, polling for completion"
    );

    let mut record = DeploymentRecord {
        id: submission.deployment_id.clone(),
        submitted_at,
        target_url_prefix: submission.hostname.clone(),
        status: DeploymentStatus::Building,
        result_url: None,
        error: None,
    };

    for attempt in 1..=MAX_POLL_ATTEMPTS {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(deployment_id = %record.id, attempt, "publish cancelled by caller");
                return record;
            }
            _ = sleeper.sleep(POLL_INTERVAL) => {}
        }

        match api.status(&submission.deployment_id).await {
            Ok(ReadyState::Ready) => {
                record.status = DeploymentStatus::Ready;
                record.result_url = Some(format!("https://{}", submission.hostname));
                info!(deployment_id = %record.id, attempt, url = ?record.result_url, "deployment ready");
                return record;
            }
            Ok(ReadyState::Pending(state)) => {
                debug!(deployment_id = %record.id, attempt, state = %state, "still building");
            }
            // Transport failure is inconclusive; it just consumes an attempt.
            Err(e) => {
                debug!(deployment_id = %record.id, attempt, error = %e, "status poll failed");
            }
        }
    }

    warn!(deployment_id = %record.id, "poll budget exhausted, reporting timed out");
    record.status = DeploymentStatus::TimedOut;
    record
}

/// Vercel-style hosting client.
pub struct VercelClient {
    config: HostingConfig,
    client: reqwest::Client,
}

impl VercelClient {
    pub fn new(config: HostingConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn deployments_url(&self) -> String {
        format!(
            "{}/v13/deployments",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl HostingApi for VercelClient {
    async fn submit(
        &self,
        target: &HostingTarget,
        tree: &ProjectTree,
    ) -> Result<Submission, HostingError> {
        let files: Vec<_> = tree
            .iter()
            .map(|(path, content)| json!({ "file": path, "data": content }))
            .collect();

        let payload = json!({
            "name": target.project_name,
            "files": files,
            "projectSettings": {
                "framework": self.config.framework,
                "buildCommand": self.config.build_command,
                "outputDirectory": self.config.output_directory,
                "installCommand": self.config.install_command,
            },
            "target": "production",
        });

        let response = self
            .client
            .post(self.deployments_url())
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            // Surface the provider's own message verbatim.
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]["message"]
                .as_str()
                .or_else(|| body["message"].as_str())
                .unwrap_or("Unknown error")
                .to_string();
            return Err(HostingError::Rejected(message));
        }

        let body: serde_json::Value = response.json().await?;
        Ok(Submission {
            deployment_id: body["id"].as_str().unwrap_or_default().to_string(),
            hostname: body["url"].as_str().unwrap_or_default().to_string(),
        })
    }

    async fn status(&self, deployment_id: &str) -> Result<ReadyState, HostingError> {
        let response = self
            .client
            .get(format!("{}/{}", self.deployments_url(), deployment_id))
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(HostingError::Rejected(format!(
                "status check returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response.json().await?;
        let state = body["readyState"].as_str().unwrap_or("UNKNOWN");
        if state == "READY" {
            Ok(ReadyState::Ready)
        } else {
            Ok(ReadyState::Pending(state.to_string()))
        }
    }
}
