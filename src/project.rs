//! Project Assembler: synthesizes a complete React project tree from a
//! workflow plus generated component bodies.
//!
//! Output is deterministic for a given input: same path set, same contents,
//! except the generation timestamp inside README.md.

use chrono::Utc;
use serde_json::json;

use crate::workflow::{Node, WorkflowSpec};

/// Base runtime dependencies every generated project gets.
const REACT_VERSION: &str = "^18.2.0";
const REACT_SCRIPTS_VERSION: &str = "5.0.1";
const PROP_TYPES_VERSION: &str = "^15.8.1";

/// Sniffed extras: coarse keyword matching over the serialized workflow.
/// False positives (an unused dependency) are acceptable; the base set keeps
/// the main component running either way.
const AXIOS_VERSION: &str = "^1.6.0";
const SYNTAX_HIGHLIGHTER_VERSION: &str = "^15.5.0";

/// Insertion-ordered relative-path → content mapping for one deployable
/// project. Paths are unique and use forward slashes.
#[derive(Debug, Clone, Default)]
pub struct ProjectTree {
    entries: Vec<(String, String)>,
}

impl ProjectTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a file. Replacement keeps the original position so
    /// iteration order stays stable.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        if let Some(slot) = self.entries.iter_mut().find(|(p, _)| *p == path) {
            slot.1 = content;
        } else {
            self.entries.push((path, content));
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Filesystem-safe project identifier: lower-cased workflow name with
/// non-alphanumeric runs collapsed to a single `-`.
pub fn project_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    if slug.is_empty() {
        "workflow-app".to_string()
    } else {
        slug
    }
}

/// Component file name for a node type: PascalCase type suffix plus a fixed
/// "Component" suffix, e.g. "n8n-nodes-base.formTrigger" → "FormTriggerComponent".
pub fn node_component_name(node_type: &str) -> String {
    let suffix = node_type.rsplit('.').next().unwrap_or(node_type);
    let mut name = String::with_capacity(suffix.len() + 9);
    let mut upper_next = true;
    for c in suffix.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                name.extend(c.to_uppercase());
                upper_next = false;
            } else {
                name.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    name.push_str("Component");
    name
}

/// Build the full project tree: manifest, entry point, styles, docs, ignore
/// list, main component, and one file per node-derived component.
pub fn assemble(
    spec: &WorkflowSpec,
    main_component: &str,
    node_components: &[(String, String)],
) -> ProjectTree {
    let name = spec.name.as_deref().unwrap_or("workflow-app");
    let slug = project_slug(name);

    let mut tree = ProjectTree::new();
    tree.insert("package.json", package_json(&slug, spec));
    tree.insert("public/index.html", index_html(name));
    tree.insert("src/index.js", index_js());
    tree.insert("src/App.jsx", main_component);
    tree.insert("src/index.css", index_css());
    tree.insert("README.md", readme(name, &spec.nodes));
    tree.insert(".gitignore", gitignore());

    for (component_name, body) in node_components {
        tree.insert(format!("src/components/{}.jsx", component_name), body.clone());
    }

    tree
}

/// Manifest with the base dependency set plus keyword-sniffed extras.
fn package_json(slug: &str, spec: &WorkflowSpec) -> String {
    let serialized = serde_json::to_string(spec).unwrap_or_default();

    let mut dependencies = serde_json::Map::new();
    dependencies.insert("react".into(), json!(REACT_VERSION));
    dependencies.insert("react-dom".into(), json!(REACT_VERSION));
    dependencies.insert("react-scripts".into(), json!(REACT_SCRIPTS_VERSION));
    if serialized.contains("webhook") || serialized.contains("http") {
        dependencies.insert("axios".into(), json!(AXIOS_VERSION));
    }
    dependencies.insert("prop-types".into(), json!(PROP_TYPES_VERSION));
    if serialized.contains("function") || serialized.contains("Function") {
        dependencies.insert(
            "react-syntax-highlighter".into(),
            json!(SYNTAX_HIGHLIGHTER_VERSION),
        );
    }

    let manifest = json!({
        "name": slug,
        "version": "1.0.0",
        "description": format!(
            "Generated React app for n8n workflow: {}",
            spec.name.as_deref().unwrap_or(slug)
        ),
        "private": true,
        "dependencies": dependencies,
        "scripts": {
            "start": "react-scripts start",
            "build": "react-scripts build",
            "test": "react-scripts test",
            "eject": "react-scripts eject"
        },
        "eslintConfig": {
            "extends": ["react-app", "react-app/jest"]
        },
        "browserslist": {
            "production": [">0.2%", "not dead", "not op_mini all"],
            "development": [
                "last 1 chrome version",
                "last 1 firefox version",
                "last 1 safari version"
            ]
        }
    });

    serde_json::to_string_pretty(&manifest).unwrap_or_default()
}

fn index_html(name: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <meta name="theme-color" content="#000000" />
    <meta name="description" content="{name} - Generated from n8n workflow" />
    <title>{name}</title>
    <script src="https://cdn.tailwindcss.com"></script>
  </head>
  <body>
    <noscript>You need to enable JavaScript to run this app.</noscript>
    <div id="root"></div>
  </body>
</html>"##
    )
}

fn index_js() -> String {
    r#"import React from 'react';
import ReactDOM from 'react-dom/client';
import App from './App';
import './index.css';

const root = ReactDOM.createRoot(document.getElementById('root'));
root.render(
  <React.StrictMode>
    <App />
  </React.StrictMode>
);"#
    .to_string()
}

fn index_css() -> String {
    r#"@tailwind base;
@tailwind components;
@tailwind utilities;

body {
  margin: 0;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Oxygen',
    'Ubuntu', 'Cantarell', 'Fira Sans', 'Droid Sans', 'Helvetica Neue',
    sans-serif;
  -webkit-font-smoothing: antialiased;
  -moz-osx-font-smoothing: grayscale;
}

code {
  font-family: source-code-pro, Menlo, Monaco, Consolas, 'Courier New',
    monospace;
}"#
    .to_string()
}

fn readme(name: &str, nodes: &[Node]) -> String {
    let node_list = if nodes.is_empty() {
        "No nodes found".to_string()
    } else {
        nodes
            .iter()
            .map(|n| {
                format!(
                    "- **{}** ({})",
                    n.name.as_deref().unwrap_or("Unnamed"),
                    n.node_type
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"# {name}

Generated React application from n8n workflow.

## About

This app was automatically generated from an n8n workflow with {count} nodes
on {date}.

### Workflow Nodes:
{node_list}

## Getting Started

1. Install dependencies:
   ```bash
   npm install
   ```

2. Start the development server:
   ```bash
   npm start
   ```

3. Open [http://localhost:3000](http://localhost:3000) to view it in the browser.

## Available Scripts

- `npm start` - Runs the app in development mode
- `npm run build` - Builds the app for production
- `npm test` - Launches the test runner

## Deployment

Run `npm run build` to create a production build in the `build` folder.

---

*Generated by Astraflow*"#,
        name = name,
        count = nodes.len(),
        date = Utc::now().format("%Y-%m-%d"),
        node_list = node_list,
    )
}

fn gitignore() -> String {
    r#"# See https://help.github.com/articles/ignoring-files/ for more about ignoring files.

# dependencies
/node_modules
/.pnp
.pnp.js

# testing
/coverage

# production
/build

# misc
.DS_Store
.env.local
.env.development.local
.env.test.local
.env.production.local

npm-debug.log*
yarn-debug.log*
yarn-error.log*"#
        .to_string()
}
