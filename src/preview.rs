//! Preview Adapter: packages a normalized component for sandbox evaluation.
//!
//! The core never executes generated code. The adapter's output is handed to
//! an external react-live style evaluator together with an explicit
//! capability scope; transport semantics of any network call the generated
//! code makes are forced here, never trusted to the generated code itself.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{normalize, Mode};
use crate::workflow::WorkflowSpec;

/// Hook primitives the sandbox injects into the evaluation scope.
pub const SCOPE_HOOKS: [&str; 3] = ["useState", "useEffect", "useMemo"];

/// Transport settings force-injected on every network call the generated
/// code makes. A consistency and security boundary: the snippet can add
/// headers but cannot override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchPolicy {
    pub content_type: String,
    pub mode: String,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            content_type: "application/json".to_string(),
            mode: "cors".to_string(),
        }
    }
}

/// The bindings and permissions available inside the sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitySet {
    /// State/effect/derived-value primitives supplied by the evaluator.
    pub hooks: Vec<String>,
    /// The originating workflow, read-only.
    pub workflow: Value,
    /// Constrained network-call capability.
    pub fetch: FetchPolicy,
}

/// A snippet plus the scope it must be evaluated in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluableSnippet {
    pub code: String,
    pub scope: CapabilitySet,
}

/// Rewrite a component for sandbox evaluation and attach its scope.
///
/// Applies the preview-mode extractor passes (boilerplate strip, reserved
/// name rename, mount call). All passes are idempotent, so already-normalized
/// input is safe to pass again.
pub fn for_preview(text: &str, workflow: &WorkflowSpec) -> EvaluableSnippet {
    let code = normalize(text, Mode::Preview);
    EvaluableSnippet {
        code,
        scope: CapabilitySet {
            hooks: SCOPE_HOOKS.iter().map(|h| h.to_string()).collect(),
            workflow: serde_json::to_value(workflow).unwrap_or(Value::Null),
            fetch: FetchPolicy::default(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> WorkflowSpec {
        serde_json::from_value(serde_json::json!({
            "name": "Intake",
            "nodes": [{"id": "1", "type": "n8n-nodes-base.webhook", "webhookId": "w-1"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_for_preview_scope_contract() {
        let snippet = for_preview("function Card() {\n  return <div />;\n}", &workflow());
        assert_eq!(snippet.scope.hooks, vec!["useState", "useEffect", "useMemo"]);
        assert_eq!(snippet.scope.fetch.content_type, "application/json");
        assert_eq!(snippet.scope.fetch.mode, "cors");
        assert_eq!(snippet.scope.workflow["name"], "Intake");
        assert!(snippet.code.ends_with("render(<Card />);"));
    }

    #[test]
    fn test_for_preview_idempotent_on_clean_input() {
        let first = for_preview("function Card() {\n  return <div />;\n}", &workflow());
        let second = for_preview(&first.code, &workflow());
        assert_eq!(first.code, second.code);
    }

    #[test]
    fn test_for_preview_empty_soft_failure() {
        let snippet = for_preview("", &workflow());
        assert!(snippet.code.is_empty());
    }
}
