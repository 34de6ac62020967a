//! The individual text-transform passes behind [`normalize`](super::normalize).
//!
//! Every pass is a pure `&str -> String` function and idempotent on its own
//! output, so each one can be tested in isolation and the pipeline stays an
//! explicit ordered composition instead of nested string replacement.
//!
//! Generated text is untrusted: prose, markdown fences, several code
//! fragments, partial syntax. Passes never fail; worst case they return the
//! input (or an empty string) unchanged.

/// Identifier the preview sandbox reserves for its own rendering root.
pub const RESERVED_ROOT_NAME: &str = "App";

/// Name the component gets when it collides with the reserved root, and the
/// fallback when no definition header can be detected at all.
pub const FALLBACK_COMPONENT_NAME: &str = "WorkflowApp";

/// Import line synthesized by [`wrap_complete`].
pub const REACT_IMPORT_LINE: &str =
    "import React, { useState, useEffect, useMemo } from 'react';";

/// Non-code lines shorter than this are tolerated once real code has been
/// seen; the model likes to drop short clarifying asides inside otherwise
/// valid code.
const SHORT_LINE_MAX: usize = 100;

const STATEMENT_KEYWORDS: [&str; 7] = [
    "import ", "export ", "function ", "const ", "let ", "var ", "return ",
];

const HOOK_MARKERS: [&str; 4] = ["useState", "useEffect", "useMemo", "className"];

/// Strip one leading/trailing markdown fence pair.
///
/// Only the outermost pair is removed; fences embedded in the body are left
/// for [`prose_filter`] to drop.
pub fn fence_strip(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.starts_with("```") {
        return input.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    lines.remove(0);
    if let Some(last) = lines.last() {
        if last.trim() == "```" {
            lines.pop();
        }
    }
    lines.join("\n")
}

/// Delete import statements and default exports, line by line.
///
/// Preview mode only: the evaluation sandbox supplies React and the hooks
/// itself, so any import the model emitted would be unresolvable.
pub fn boilerplate_strip(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let t = line.trim_start();
            !t.starts_with("import ") && !t.starts_with("export default")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Isolate the first top-level `function` definition.
///
/// Brace-matches from the definition's opening brace to the first brace at
/// matching depth that sits at the start of a line, and discards everything
/// before and after that span. If no definition (or no anchored close) is
/// found, the input is returned unchanged so later passes can still clean it.
pub fn definition_isolate(input: &str) -> String {
    let Some(header_start) = find_definition_header(input) else {
        return input.to_string();
    };

    let bytes = input.as_bytes();
    let Some(open) = input[header_start..].find('{').map(|i| header_start + i) else {
        return input.to_string();
    };

    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        let idx = open + offset;
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                let line_anchored = idx == 0 || bytes[idx - 1] == b'\n';
                // Close at matching depth but not line-anchored: keep
                // scanning, a later anchored close ends the span instead.
                if depth == 0 && line_anchored {
                    return input[header_start..=idx].to_string();
                }
            }
            _ => {}
        }
    }

    input.to_string()
}

/// Byte offset of the first line whose content begins with `function `.
fn find_definition_header(input: &str) -> Option<usize> {
    let mut offset = 0;
    for line in input.split_inclusive('\n') {
        let t = line.trim_start();
        if t.starts_with("function ") && t.contains('(') {
            return Some(offset + (line.len() - t.len()));
        }
        offset += line.len();
    }
    None
}

/// Detect the component name from the definition header.
///
/// Understands `function Name(` and `const Name =` forms; `None` when the
/// text carries no recognizable header.
pub fn detect_component_name(input: &str) -> Option<String> {
    for line in input.lines() {
        let t = line.trim_start();
        let rest = if let Some(r) = t.strip_prefix("function ") {
            r
        } else if let Some(r) = t.strip_prefix("export default function ") {
            r
        } else if let Some(r) = t.strip_prefix("const ") {
            r
        } else {
            continue;
        };
        let name: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() && name.chars().next().is_some_and(|c| c.is_uppercase()) {
            return Some(name);
        }
    }
    None
}

/// Rename a definition that collides with the sandbox's reserved root name.
///
/// Touches only the definition header and a trailing render call, never
/// arbitrary occurrences of the identifier.
pub fn rename_reserved(input: &str) -> String {
    if detect_component_name(input).as_deref() != Some(RESERVED_ROOT_NAME) {
        return input.to_string();
    }
    let header_from = format!("function {}(", RESERVED_ROOT_NAME);
    let header_to = format!("function {}(", FALLBACK_COMPONENT_NAME);
    let mount_from = format!("render(<{}", RESERVED_ROOT_NAME);
    let mount_to = format!("render(<{}", FALLBACK_COMPONENT_NAME);
    input
        .replacen(&header_from, &header_to, 1)
        .replace(&mount_from, &mount_to)
}

/// Append a canonical mount call when the body never renders the component.
///
/// Preview mode only: the sandbox evaluates the snippet as a program, so a
/// bare definition would display nothing.
pub fn mount_ensure(input: &str) -> String {
    // No detectable definition means there is nothing to reference; leave
    // the text alone so garbage stays garbage instead of gaining a broken
    // render call.
    let Some(name) = detect_component_name(input) else {
        return input.to_string();
    };
    if input.contains(&format!("<{}", name)) {
        return input.to_string();
    }
    format!("{}\n\nrender(<{} />);", input.trim_end(), name)
}

/// Drop explanation lines, keep code lines.
///
/// A line counts as code when it is empty, a comment, or carries any of: an
/// assignment operator, a brace, a semicolon, a statement keyword, a
/// tag-opening angle bracket, or a known hook identifier. Once a code line
/// has been seen, short non-code lines are tolerated as inline asides; long
/// ones are dropped. Bare fence markers are always dropped.
pub fn prose_filter(input: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut seen_code = false;

    for line in input.lines() {
        let t = line.trim();
        if t.is_empty() {
            kept.push(line);
            continue;
        }
        if t.starts_with("```") {
            continue;
        }
        if looks_like_code(t) {
            kept.push(line);
            seen_code = true;
        } else if seen_code && t.len() < SHORT_LINE_MAX {
            kept.push(line);
        }
    }

    kept.join("\n").trim().to_string()
}

fn looks_like_code(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with('<')
        || trimmed.contains('=')
        || trimmed.contains('{')
        || trimmed.contains('}')
        || trimmed.contains(';')
        || STATEMENT_KEYWORDS.iter().any(|k| trimmed.contains(k))
        || HOOK_MARKERS.iter().any(|h| trimmed.contains(h))
}

/// Import lines of the input, trimmed, in order.
///
/// Used to carry a model-emitted preamble across definition isolation;
/// the prompts ask for axios and hook imports explicitly, so dropping them
/// would leave the packaged file unresolvable.
pub fn import_preamble(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("import "))
        .map(str::to_string)
        .collect()
}

/// Synthesize minimal import/export wrapping for a standalone file.
///
/// Packaging mode only. A missing import preamble gets the React line, a
/// missing default export gets one for the detected name (falling back to
/// [`FALLBACK_COMPONENT_NAME`]); halves already present are left alone.
pub fn wrap_complete(input: &str) -> String {
    if input.trim().is_empty() {
        return input.to_string();
    }
    let has_import = input
        .lines()
        .any(|line| line.trim_start().starts_with("import "));
    let has_export = input.contains("export default");
    if has_import && has_export {
        return input.to_string();
    }
    let name = detect_component_name(input).unwrap_or_else(|| FALLBACK_COMPONENT_NAME.to_string());
    let mut out = String::new();
    if !has_import {
        out.push_str(REACT_IMPORT_LINE);
        out.push_str("\n\n");
    }
    out.push_str(input.trim());
    if !has_export {
        out.push_str(&format!("\n\nexport default {};", name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fence_strip_outer_pair() {
        let input = "```jsx\nfunction A(){return 1;}\n```";
        let out = fence_strip(input);
        assert_eq!(out, "function A(){return 1;}");
        assert!(!out.contains("```"));
    }

    #[test]
    fn test_fence_strip_leaves_clean_input() {
        let input = "function A() {\n  return 1;\n}";
        assert_eq!(fence_strip(input), input);
    }

    #[test]
    fn test_fence_strip_keeps_inner_fences() {
        let input = "```\nfunction A() {}\n```\nprose\n```js\ncode\n```";
        let out = fence_strip(input);
        // Only the outermost pair goes; embedded fences survive this pass.
        assert!(out.contains("```"));
        assert!(out.starts_with("function A"));
    }

    #[test]
    fn test_boilerplate_strip() {
        let input = "import React from 'react';\nfunction A() {}\nexport default A;";
        let out = boilerplate_strip(input);
        assert_eq!(out, "function A() {}");
    }

    #[test]
    fn test_definition_isolate_single() {
        let input = "Sure! Here is the component:\nfunction Form() {\n  return <div />;\n}\nHope this helps!";
        let out = definition_isolate(input);
        assert_eq!(out, "function Form() {\n  return <div />;\n}");
    }

    #[test]
    fn test_definition_isolate_two_definitions() {
        let input = "function A() {\n  return 1;\n}\n\nAnd another one:\n\nfunction B() {\n  return 2;\n}";
        let out = definition_isolate(input);
        assert_eq!(out.matches("function ").count(), 1);
        assert!(out.contains("function A"));
    }

    #[test]
    fn test_definition_isolate_nested_braces() {
        let input = "function A() {\n  const x = { a: { b: 1 } };\n  return x;\n}\ntrailing";
        let out = definition_isolate(input);
        assert!(out.ends_with('}'));
        assert!(!out.contains("trailing"));
    }

    #[test]
    fn test_definition_isolate_no_definition() {
        let input = "just some prose";
        assert_eq!(definition_isolate(input), input);
    }

    #[test]
    fn test_detect_component_name() {
        assert_eq!(
            detect_component_name("function OrderForm() {}").as_deref(),
            Some("OrderForm")
        );
        assert_eq!(
            detect_component_name("const Card = () => {}").as_deref(),
            Some("Card")
        );
        assert_eq!(detect_component_name("const count = 1;"), None);
        assert_eq!(detect_component_name("no header here"), None);
    }

    #[test]
    fn test_rename_reserved_header_and_mount() {
        let input = "function App() {\n  return <div />;\n}\n\nrender(<App />);";
        let out = rename_reserved(input);
        assert!(out.contains("function WorkflowApp("));
        assert!(out.contains("render(<WorkflowApp />)"));
        assert!(!out.contains("function App("));
    }

    #[test]
    fn test_rename_leaves_other_names() {
        let input = "function OrderForm() {\n  return <div />;\n}";
        assert_eq!(rename_reserved(input), input);
    }

    #[test]
    fn test_mount_ensure_appends_once() {
        let input = "function WorkflowApp() {\n  return <div />;\n}";
        let out = mount_ensure(input);
        assert!(out.ends_with("render(<WorkflowApp />);"));
        // Idempotent: the mount call is now present.
        assert_eq!(mount_ensure(&out), out);
    }

    #[test]
    fn test_prose_filter_drops_long_explanations() {
        let input = "function A() {\n  return 1;\n}\nThis component demonstrates how the workflow form collects user input and submits it to the webhook endpoint for processing downstream.";
        let out = prose_filter(input);
        assert!(!out.contains("demonstrates"));
        assert!(out.contains("function A"));
    }

    #[test]
    fn test_prose_filter_keeps_short_asides_after_code() {
        let input = "const x = 1;\nstep two\nconst y = 2;";
        let out = prose_filter(input);
        assert!(out.contains("step two"));
    }

    #[test]
    fn test_prose_filter_drops_leading_prose() {
        let input = "short intro\nconst x = 1;";
        let out = prose_filter(input);
        assert!(!out.contains("short intro"));
    }

    #[test]
    fn test_prose_filter_keeps_keyword_inside_jsx_text() {
        // JSX text content can carry a statement keyword mid-line and still
        // be part of valid markup, whatever its length.
        let input = "function Confirm() {\n  return (\n    <p>\n      Once your submission has been accepted the workflow will return a confirmation number that you should keep for your records.\n    </p>\n  );\n}";
        let out = prose_filter(input);
        assert!(out.contains("confirmation number"));
    }

    #[test]
    fn test_prose_filter_drops_inner_fences() {
        let input = "const x = 1;\n```\nconst y = 2;";
        let out = prose_filter(input);
        assert!(!out.contains("```"));
        assert!(out.contains("const y"));
    }

    #[test]
    fn test_wrap_complete_bare_body() {
        let input = "function OrderForm() {\n  return <div />;\n}";
        let out = wrap_complete(input);
        assert!(out.starts_with(REACT_IMPORT_LINE));
        assert!(out.ends_with("export default OrderForm;"));
    }

    #[test]
    fn test_wrap_complete_skips_wrapped_input() {
        let input = "import React from 'react';\nfunction A() {}\nexport default A;";
        assert_eq!(wrap_complete(input), input);
    }

    #[test]
    fn test_wrap_complete_adds_missing_export_only() {
        let input = "import axios from 'axios';\nfunction OrderForm() {\n  return <div />;\n}";
        let out = wrap_complete(input);
        // The model's own import stays, no React line is forced on top.
        assert_eq!(out.matches("import ").count(), 1);
        assert!(out.starts_with("import axios"));
        assert!(out.ends_with("export default OrderForm;"));
    }

    #[test]
    fn test_import_preamble_collects_in_order() {
        let input = "import React from 'react';\nfunction A() {}\nimport axios from 'axios';";
        assert_eq!(
            import_preamble(input),
            vec!["import React from 'react';", "import axios from 'axios';"]
        );
        assert!(import_preamble("function A() {}").is_empty());
    }

    #[test]
    fn test_wrap_complete_fallback_name() {
        let input = "return <div />;";
        let out = wrap_complete(input);
        assert!(out.ends_with(&format!("export default {};", FALLBACK_COMPONENT_NAME)));
    }

    #[test]
    fn test_wrap_complete_empty_is_noop() {
        assert_eq!(wrap_complete(""), "");
        assert_eq!(wrap_complete("   \n"), "   \n");
    }
}
