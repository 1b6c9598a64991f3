//! `{{variable}}` substitution for follow-up templates.
//!
//! Rendering is total: a placeholder whose key is not in the variable map
//! becomes the empty string, so a client with missing optional fields still
//! gets a message.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::entities::EmailTemplate;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub body: String,
}

pub fn render(template: &EmailTemplate, variables: &HashMap<String, String>) -> RenderedMessage {
    RenderedMessage {
        subject: render_str(&template.subject, variables),
        body: render_str(&template.body, variables),
    }
}

/// Replaces every `{{key}}` in `input`. Keys are matched exactly, without
/// trimming; a `{{` that is not closed before the next brace is copied as-is.
pub fn render_str(input: &str, variables: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];

        match placeholder_key(after_open) {
            Some(key) => {
                if let Some(value) = variables.get(key) {
                    output.push_str(value);
                }
                rest = &after_open[key.len() + CLOSE.len()..];
            }
            None => {
                output.push_str(OPEN);
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Distinct placeholder keys used by the template, in sorted order.
pub fn placeholders(template: &EmailTemplate) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for text in [&template.subject, &template.body] {
        let mut rest = text.as_str();
        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            match placeholder_key(after_open) {
                Some(key) => {
                    keys.insert(key.to_string());
                    rest = &after_open[key.len() + CLOSE.len()..];
                }
                None => rest = after_open,
            }
        }
    }
    keys
}

/// Placeholders in the template that `variables` does not supply.
pub fn missing_variables(
    template: &EmailTemplate,
    variables: &HashMap<String, String>,
) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|key| !variables.contains_key(key))
        .collect()
}

// `text` starts right after an opening `{{`. Returns the key if a `}}` closes
// it before any other brace.
fn placeholder_key(text: &str) -> Option<&str> {
    let end = text.find(['{', '}'])?;
    text[end..].starts_with(CLOSE).then(|| &text[..end])
}
