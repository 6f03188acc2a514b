//! Prompt templates with `{name}` placeholders

use super::types::Role;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("missing value for template placeholder '{0}'")]
    MissingVariable(String),
    #[error("malformed template: {0}")]
    Malformed(String),
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    /// An escaped `{{` or `}}`
    Brace(char),
    Placeholder(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    text: &'static str,
}

impl PromptTemplate {
    pub const fn new(text: &'static str) -> Self {
        Self { text }
    }

    /// The template a role's agent runs
    pub fn for_role(role: Role) -> Self {
        let text = match role {
            Role::Cardiologist => include_str!("prompts/cardiologist.md"),
            Role::Psychologist => include_str!("prompts/psychologist.md"),
            Role::Pulmonologist => include_str!("prompts/pulmonologist.md"),
            Role::MultidisciplinaryTeam => include_str!("prompts/multidisciplinary_team.md"),
        };
        Self::new(text)
    }

    pub fn text(&self) -> &'static str {
        self.text
    }

    /// Placeholder names in order of first appearance
    pub fn placeholders(&self) -> Result<Vec<&'static str>, TemplateError> {
        let mut names = Vec::new();
        for segment in parse(self.text)? {
            if let Segment::Placeholder(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder by exact name. Values are inserted
    /// verbatim and never re-parsed, so braces inside them are harmless.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.text.len());
        for segment in parse(self.text)? {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Brace(c) => out.push(c),
                Segment::Placeholder(name) => {
                    let value = vars
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingVariable(name.to_string()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn parse(text: &str) -> Result<Vec<Segment<'_>>, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = text;

    while let Some(idx) = rest.find(['{', '}']) {
        if idx > 0 {
            segments.push(Segment::Literal(&rest[..idx]));
        }
        let brace = rest.as_bytes()[idx] as char;
        let after = &rest[idx + 1..];

        if after.starts_with(brace) {
            segments.push(Segment::Brace(brace));
            rest = &after[1..];
            continue;
        }

        if brace == '}' {
            return Err(TemplateError::Malformed("single '}' encountered".to_string()));
        }

        let close = after
            .find('}')
            .ok_or_else(|| TemplateError::Malformed("unterminated '{'".to_string()))?;
        let name = &after[..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TemplateError::Malformed(format!("invalid placeholder '{{{}}}'", name)));
        }
        segments.push(Segment::Placeholder(name));
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }
    Ok(segments)
}

/// Parse every role's template once so a broken prompt file fails at startup
pub fn check_templates() -> Result<(), TemplateError> {
    for role in Role::iter() {
        let template = PromptTemplate::for_role(role);
        let names = template.placeholders()?;
        log::debug!(
            "[TEMPLATE] {} template ({} chars) expects {}",
            role,
            template.text().len(),
            names.join(", ")
        );
    }
    Ok(())
}
