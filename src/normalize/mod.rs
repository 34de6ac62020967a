//! Artifact normalization: turns raw generated text into a self-contained
//! component.
//!
//! `normalize` is a fixed pipeline of ordered passes (see [`passes`]) and
//! never fails; completely non-code input comes back as an empty string,
//! which callers must treat as "nothing to preview" rather than a crash.

pub mod passes;

pub use passes::{detect_component_name, FALLBACK_COMPONENT_NAME, RESERVED_ROOT_NAME};

/// Which downstream consumer the cleaned text is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Sandbox evaluation: strip boilerplate the scope provides, rename a
    /// colliding root identifier, guarantee a mount call.
    Preview,
    /// Standalone file: drop explanation prose, synthesize import/export
    /// wrapping so the file is independently loadable.
    Package,
}

/// Normalize raw generated text into a component for the given mode.
///
/// Passes run in a fixed order and each is idempotent, so re-normalizing
/// already-clean package output yields the same string (no double wrapping).
pub fn normalize(raw: &str, mode: Mode) -> String {
    let text = passes::fence_strip(raw);
    let out = match mode {
        Mode::Preview => {
            let text = passes::boilerplate_strip(&text);
            let text = passes::definition_isolate(&text);
            let text = passes::rename_reserved(&text);
            passes::mount_ensure(&text)
        }
        Mode::Package => {
            let imports = passes::import_preamble(&text);
            let body = passes::definition_isolate(&text);
            let body = passes::prose_filter(&body);
            // Isolation drops everything around the definition; put the
            // model's import preamble back unless it survived in the body.
            let kept: Vec<&str> = imports
                .iter()
                .map(String::as_str)
                .filter(|line| !body.contains(line))
                .collect();
            let body = if kept.is_empty() || body.is_empty() {
                body
            } else {
                format!("{}\n\n{}", kept.join("\n"), body)
            };
            passes::wrap_complete(&body)
        }
    };
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FENCED: &str = "```jsx\nfunction A(){return 1;}\n```";

    #[test]
    fn test_normalize_never_empty_handed_on_garbage() {
        // Unrecoverable garbage yields an empty string, not a panic.
        for garbage in ["", "   ", "This workflow is great and very useful for your business needs, thanks for asking about it today and here is a long explanation of what it does."] {
            let out = normalize(garbage, Mode::Package);
            assert!(out.is_empty(), "expected empty for {:?}, got {:?}", garbage, out);
        }
    }

    #[test]
    fn test_normalize_strips_fences() {
        let out = normalize(FENCED, Mode::Package);
        assert!(!out.contains("```"));
        assert!(out.contains("function A"));
    }

    #[test]
    fn test_normalize_package_idempotent() {
        let raw = "Here is your component:\n\nfunction OrderForm() {\n  const [v, setV] = useState('');\n  return <form />;\n}\n\nLet me know if you need anything else about this generated component code!";
        let once = normalize(raw, Mode::Package);
        let twice = normalize(&once, Mode::Package);
        assert_eq!(once, twice);
        // Exactly one import preamble and one export.
        assert_eq!(once.matches("import React").count(), 1);
        assert_eq!(once.matches("export default").count(), 1);
    }

    #[test]
    fn test_normalize_preview_renames_and_mounts() {
        let raw = "import React from 'react';\nfunction App() {\n  return <div>hi</div>;\n}\nexport default App;";
        let out = normalize(raw, Mode::Preview);
        assert!(out.contains("function WorkflowApp("));
        assert!(out.ends_with("render(<WorkflowApp />);"));
        assert!(!out.contains("import "));
        assert!(!out.contains("export default"));
    }

    #[test]
    fn test_normalize_preview_keeps_existing_mount() {
        let raw = "function Card() {\n  return <div />;\n}\n\nrender(<Card />);";
        let out = normalize(raw, Mode::Preview);
        assert_eq!(out.matches("render(").count(), 1);
    }

    #[test]
    fn test_normalize_package_keeps_model_imports() {
        let raw = "import React, { useState } from 'react';\nimport axios from 'axios';\n\nfunction App() {\n  const [v, setV] = useState('');\n  return <div />;\n}\n\nexport default App;";
        let out = normalize(raw, Mode::Package);
        assert!(out.contains("import axios from 'axios';"));
        assert_eq!(out.matches("import React").count(), 1);
        assert_eq!(out.matches("export default App;").count(), 1);
        assert_eq!(normalize(&out, Mode::Package), out);
    }

    #[test]
    fn test_normalize_package_single_definition() {
        let raw = "function A() {\n  return 1;\n}\n\nOr alternatively:\n\nfunction B() {\n  return 2;\n}";
        let out = normalize(raw, Mode::Package);
        assert_eq!(out.matches("function ").count(), 1);
    }

    #[test]
    fn test_normalize_package_completion() {
        let raw = "function OrderForm() {\n  return <form />;\n}";
        let out = normalize(raw, Mode::Package);
        assert!(out.starts_with("import React"));
        assert!(out.ends_with("export default OrderForm;"));
    }
}
