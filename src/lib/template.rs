//! The part of Go's `text/template` that `--template` supports: literal text,
//! `{{.}}`, `{{.field.path}}` and `{{-`/`-}}` whitespace trimming.

use anyhow::{bail, Result};
use serde_json::Value;

static NO_VALUE: &str = "<no value>";

#[derive(Debug, PartialEq, Eq)]
enum Node {
    Text(String),
    Field(Vec<String>),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self> {
        let mut nodes = vec![];
        let mut rest = source;
        let mut trim_next_text = false;

        while let Some(start) = rest.find("{{") {
            let mut text = &rest[..start];
            if trim_next_text {
                text = text.trim_start();
            }
            let after_open = &rest[start + 2..];
            let Some(end) = after_open.find("}}") else {
                bail!("template: unclosed action in \"{source}\"");
            };
            let mut action = &after_open[..end];
            if let Some(trimmed) = action.strip_prefix('-') {
                if trimmed.starts_with(char::is_whitespace) {
                    text = text.trim_end();
                    action = trimmed;
                }
            }
            trim_next_text = false;
            if let Some(trimmed) = action.strip_suffix('-') {
                if trimmed.ends_with(char::is_whitespace) {
                    trim_next_text = true;
                    action = trimmed;
                }
            }
            if !text.is_empty() {
                nodes.push(Node::Text(text.to_string()));
            }
            nodes.push(parse_action(action.trim())?);
            rest = &after_open[end + 2..];
        }

        let text = if trim_next_text { rest.trim_start() } else { rest };
        if !text.is_empty() {
            nodes.push(Node::Text(text.to_string()));
        }
        Ok(Self { nodes })
    }

    pub fn render(&self, data: &Value) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field(path) => match lookup(data, path) {
                    Some(value) => out.push_str(&format_value(value)),
                    None => out.push_str(NO_VALUE),
                },
            }
        }
        out
    }
}

fn parse_action(action: &str) -> Result<Node> {
    if action == "." {
        return Ok(Node::Field(vec![]));
    }
    let Some(path) = action.strip_prefix('.') else {
        bail!("template: unsupported action \"{{{{{action}}}}}\"; only field paths like {{{{.sha}}}} are supported");
    };
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || !s.chars().all(|c| c.is_alphanumeric() || c == '_'))
    {
        bail!("template: bad field path \"{action}\"");
    }
    Ok(Node::Field(segments))
}

fn lookup<'a>(data: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter()
        .try_fold(data, |value, key| value.as_object()?.get(key))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "<nil>".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
