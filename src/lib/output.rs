use anyhow::{Context, Result};

use crate::{merge_base_next::MergeBaseNext, template::Template};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Json,
}

/// How a [`MergeBaseNext`] gets printed. Without a format only the sha is
/// printed, and nothing at all when there is no next commit.
pub enum Renderer {
    Sha,
    Json,
    Template(Template),
}

impl Renderer {
    pub fn new(format: Option<Format>, template: Option<&str>) -> Result<Self> {
        Ok(match (format, template) {
            (None, _) => Renderer::Sha,
            (Some(Format::Json), None) => Renderer::Json,
            (Some(Format::Json), Some(template)) => Renderer::Template(
                Template::parse(template).context("failed to parse --template")?,
            ),
        })
    }

    pub fn render(&self, next: &MergeBaseNext) -> Result<String> {
        Ok(match self {
            Renderer::Sha => {
                if next.is_found() {
                    format!("{}\n", next.sha)
                } else {
                    String::new()
                }
            }
            Renderer::Json => format!("{}\n", serde_json::to_string_pretty(next)?),
            Renderer::Template(template) => {
                let mut out = template.render(&serde_json::to_value(next)?);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
        })
    }
}
