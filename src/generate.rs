//! Generative text service boundary.
//!
//! One prompt string in, raw untrusted text out, over an OpenAI-style
//! chat-completions API. Responses always go through the normalization
//! pipeline before anything downstream touches them; nothing here inspects
//! generated code.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::workflow::{Node, WorkflowSpec};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("generation request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generation service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("generation service returned no choices")]
    EmptyResponse,
    #[error("invalid API key header")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for the text-generation service.
pub struct GenerationClient {
    config: GenerationConfig,
    client: reqwest::Client,
}

impl GenerationClient {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Send one prompt and return the raw generated text.
    ///
    /// Upstream errors surface as a single descriptive error; there is no
    /// automatic retry, the caller may re-invoke.
    pub async fn complete(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, prompt_len = prompt.len(), "generation request");

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.api_base.trim_end_matches('/')
            ))
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerateError::EmptyResponse)
    }

    fn headers(&self) -> Result<HeaderMap, GenerateError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|_| GenerateError::InvalidCredentials)?,
        );
        Ok(headers)
    }
}

/// Fixed style/structure contract embedded in every component prompt, so
/// separately generated files share one visual language.
const DESIGN_SYSTEM_CONTRACT: &str = "\
CONSISTENT DESIGN SYSTEM - FOLLOW THESE EXACT STYLES:
- Container: max-w-4xl mx-auto p-6 bg-white min-h-screen
- Page header: text-3xl font-bold text-gray-800 mb-6
- Section headers: text-xl font-semibold text-gray-700 mb-4
- Cards: bg-white border border-gray-200 rounded-lg shadow-sm p-6 mb-6
- Form inputs: w-full p-3 border border-gray-300 rounded-lg focus:ring-2 focus:ring-blue-500 focus:border-blue-500
- Input labels: block text-sm font-medium text-gray-700 mb-2
- Primary buttons: bg-blue-600 hover:bg-blue-700 disabled:bg-gray-400 text-white font-medium py-3 px-6 rounded-lg transition-colors
- Secondary buttons: bg-gray-200 hover:bg-gray-300 text-gray-700 font-medium py-3 px-6 rounded-lg transition-colors
- Success messages: bg-green-50 border border-green-200 text-green-800 p-4 rounded-lg mb-4
- Error messages: bg-red-50 border border-red-200 text-red-800 p-4 rounded-lg mb-4
- Loading states: bg-blue-50 border border-blue-200 text-blue-800 p-4 rounded-lg mb-4
- Step indicators: flex items-center justify-center w-10 h-10 rounded-full bg-blue-600 text-white font-semibold text-lg
- Form sections: space-y-4 mb-6
- Grid layouts: grid grid-cols-1 md:grid-cols-2 gap-6
- Consistent spacing: mb-6 for major sections, mb-4 for elements, mb-2 for labels";

/// Prompt for a preview component evaluated in the sandbox scope.
pub fn preview_component_prompt(spec: &WorkflowSpec, webhook_url: &str) -> String {
    let workflow_json = serde_json::to_string(spec).unwrap_or_default();
    format!(
        "Generate ONLY a React functional component for this n8n workflow:
{workflow_json}

CRITICAL REQUIREMENTS FOR LIVE PREVIEW WITH REAL N8N EXECUTION:
1. NO import statements (React is provided automatically)
2. NO export statements
3. Component must be named 'WorkflowApp'
4. Use React hooks: useState, useEffect, useMemo (available in scope)
5. Use 'workflow' variable for data (provided in scope)
6. Style with Tailwind CSS classes only
7. Create a multi-step application for the workflow
8. For form submissions, use fetch to POST to: {webhook_url}
9. Handle real webhook responses and show success/error states
10. Show loading states during API calls and display real responses

{design_system}

For the form submission, use this pattern:
const handleSubmit = async (formData) => {{
  setLoading(true);
  try {{
    const response = await fetch('{webhook_url}', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify(formData)
    }});
    const result = await response.json();
    // Handle success
  }} catch (error) {{
    // Handle error
  }} finally {{
    setLoading(false);
  }}
}};",
        workflow_json = workflow_json,
        webhook_url = webhook_url,
        design_system = DESIGN_SYSTEM_CONTRACT,
    )
}

/// Prompt for a complete standalone `App.jsx`.
pub fn app_component_prompt(spec: &WorkflowSpec, webhook_url: &str) -> String {
    let workflow_json = serde_json::to_string(spec).unwrap_or_default();
    format!(
        "Generate ONLY a complete React App.jsx file for this n8n workflow:
{workflow_json}

CRITICAL REQUIREMENTS FOR REAL N8N INTEGRATION:
1. Return ONLY pure JSX/JavaScript code - NO explanations, NO descriptions
2. Start with imports, end with export default App
3. Component name must be: App
4. Include ALL necessary imports (React, useState, useEffect, axios if needed)
5. Connect to REAL n8n webhook: {webhook_url}
6. Handle real form submissions to the webhook URL
7. Show actual loading states and responses
8. Use Tailwind CSS classes for styling
9. Include proper error handling for API calls
10. NO markdown code blocks, NO explanatory text

{design_system}

Generate the complete App.jsx file content now:",
        workflow_json = workflow_json,
        webhook_url = webhook_url,
        design_system = DESIGN_SYSTEM_CONTRACT,
    )
}

/// Prompt for one per-node-type component file.
pub fn node_component_prompt(component_name: &str, node_type: &str, nodes: &[&Node]) -> String {
    let nodes_json = serde_json::to_string(nodes).unwrap_or_default();
    format!(
        "Generate ONLY a React component file for n8n node type: {node_type}

CRITICAL REQUIREMENTS:
1. Return ONLY pure JSX/JavaScript code - NO explanations, NO markdown blocks
2. Component name: {component_name}
3. Handle these specific nodes: {nodes_json}
4. Include ALL necessary imports
5. Use Tailwind CSS for styling
6. Export as default
7. Valid JavaScript only

Generate complete {component_name}.jsx file:",
        node_type = node_type,
        component_name = component_name,
        nodes_json = nodes_json,
    )
}

/// Prompt for one modification round against the latest artifact.
pub fn modify_component_prompt(spec: &WorkflowSpec, current_code: &str, instruction: &str) -> String {
    let workflow_json = serde_json::to_string(spec).unwrap_or_default();
    format!(
        "Here is the current React component for an n8n workflow:

{current_code}

The workflow it belongs to:
{workflow_json}

Apply this change: {instruction}

CRITICAL REQUIREMENTS:
1. Return the COMPLETE updated component, not a diff
2. NO import statements, NO export statements
3. Component must stay named 'WorkflowApp'
4. Keep using useState, useEffect, useMemo from scope
5. Style with Tailwind CSS classes only
6. NO explanations, NO markdown blocks",
        current_code = current_code,
        workflow_json = workflow_json,
        instruction = instruction,
    )
}
