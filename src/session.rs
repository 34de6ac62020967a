//! Artifact sessions: the ordered modification log behind iterative
//! code changes.
//!
//! Each preview artifact keeps an append-only log of
//! (instruction, normalized component) revisions. A modification round
//! re-runs the pipeline against the latest revision; nothing is patched in
//! place. Rounds for the same artifact are serialized through the per-
//! artifact lock: concurrent instructions queue, they never merge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::workflow::WorkflowSpec;

/// Instruction recorded for the initial generation round.
pub const INITIAL_INSTRUCTION: &str = "initial generation";

/// One round of the modification log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub instruction: String,
    /// The normalized component this round produced; immutable once logged.
    pub component: String,
    pub created_at: DateTime<Utc>,
}

/// One preview artifact and its full revision history.
#[derive(Debug)]
pub struct ArtifactSession {
    pub id: String,
    pub workflow: WorkflowSpec,
    revisions: Vec<Revision>,
}

impl ArtifactSession {
    /// Latest revision, the artifact every new instruction runs against.
    ///
    /// `None` only for an empty log; [`SessionStore::create`] always seeds
    /// the initial revision.
    pub fn latest(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    /// Append a new round; returns its index in the log.
    pub fn push(&mut self, instruction: String, component: String) -> usize {
        self.revisions.push(Revision {
            instruction,
            component,
            created_at: Utc::now(),
        });
        self.revisions.len() - 1
    }

    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }
}

type SharedSession = Arc<Mutex<ArtifactSession>>;

/// Registry of live artifact sessions, keyed by artifact id.
///
/// Sessions live for the process lifetime; there is no eviction, a restart
/// clears the registry.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly generated artifact; returns its id.
    pub async fn create(&self, workflow: WorkflowSpec, component: String) -> String {
        let id = Uuid::new_v4().to_string();
        let session = ArtifactSession {
            id: id.clone(),
            workflow,
            revisions: vec![Revision {
                instruction: INITIAL_INSTRUCTION.to_string(),
                component,
                created_at: Utc::now(),
            }],
        };
        self.sessions
            .lock()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        id
    }

    /// Look up a session handle. The caller locks it for the duration of a
    /// modification round, which is what serializes racing instructions.
    pub async fn get(&self, artifact_id: &str) -> Option<SharedSession> {
        self.sessions.lock().await.get(artifact_id).cloned()
    }
}
