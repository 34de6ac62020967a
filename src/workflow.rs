//! n8n workflow parsing and analysis
//!
//! The workflow JSON is caller-supplied and read-only to the rest of the
//! pipeline. Connections may reference node ids that do not exist in the
//! node list; such references are inert, never fatal.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Node types that expose an inbound webhook endpoint.
const WEBHOOK_NODE_TYPES: [&str; 2] = ["n8n-nodes-base.formTrigger", "n8n-nodes-base.webhook"];

/// Placeholder used when a workflow has no webhook node with an id.
pub const WEBHOOK_ID_PLACEHOLDER: &str = "your-webhook-id";

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Workflow must have a name")]
    MissingName,
    #[error("Workflow has no nodes")]
    NoNodes,
}

/// A single node of the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(rename = "webhookId", skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub parameters: Value,
}

impl Node {
    /// Type suffix after the last dot, e.g. "formTrigger" for
    /// "n8n-nodes-base.formTrigger".
    pub fn type_suffix(&self) -> &str {
        self.node_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.node_type)
    }
}

/// Caller-supplied workflow description.
///
/// `connections` is kept opaque: n8n nests connection targets several levels
/// deep and the pipeline only needs to know whether any connections exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: serde_json::Map<String, Value>,
}

impl WorkflowSpec {
    /// Reject workflows that cannot drive full-app generation.
    ///
    /// Checked before any generation call; the message is field-level so the
    /// caller can surface it directly.
    pub fn validate_for_app(&self) -> Result<(), WorkflowError> {
        match &self.name {
            Some(n) if !n.trim().is_empty() => {}
            _ => return Err(WorkflowError::MissingName),
        }
        if self.nodes.is_empty() {
            return Err(WorkflowError::NoNodes);
        }
        Ok(())
    }

    /// First node that exposes a webhook endpoint, if any.
    pub fn webhook_node(&self) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| WEBHOOK_NODE_TYPES.contains(&n.node_type.as_str()))
    }

    /// Webhook URL for form submissions from the generated UI.
    ///
    /// `base_url` comes from configuration; the node's webhook id falls back
    /// to a placeholder so prompts stay well-formed for webhook-less flows.
    pub fn webhook_url(&self, base_url: &str) -> String {
        let id = self
            .webhook_node()
            .and_then(|n| n.webhook_id.as_deref())
            .unwrap_or(WEBHOOK_ID_PLACEHOLDER);
        format!("{}/webhook/{}", base_url.trim_end_matches('/'), id)
    }

    /// Unique node types in first-appearance order.
    pub fn unique_node_types(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for node in &self.nodes {
            if !node.node_type.is_empty() && !seen.contains(&node.node_type.as_str()) {
                seen.push(node.node_type.as_str());
            }
        }
        seen
    }

    /// Summary of the workflow structure, served alongside generated code.
    pub fn analyze(&self) -> WorkflowAnalysis {
        let mut node_types: BTreeMap<String, usize> = BTreeMap::new();
        for node in &self.nodes {
            *node_types.entry(node.type_suffix().to_string()).or_insert(0) += 1;
        }
        let has_connections = !self.connections.is_empty();
        WorkflowAnalysis {
            total_nodes: self.nodes.len(),
            node_types,
            has_connections,
            is_multi_step: has_connections && self.nodes.len() > 1,
        }
    }
}

/// Structure summary of a workflow: node counts, types, multi-step hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowAnalysis {
    pub total_nodes: usize,
    pub node_types: BTreeMap<String, usize>,
    pub has_connections: bool,
    pub is_multi_step: bool,
}
