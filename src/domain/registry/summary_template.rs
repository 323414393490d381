//! Summary templates - how a tool's successful payload reads as text.
//!
//! A template is plain text with `{placeholder}` holes filled from the
//! payload:
//!
//! - `{field}` or `{field.nested}` inserts a value
//! - `{field:.2}` inserts a number with two decimals
//! - `{list[].title}` inserts one `- title` line per element, at most
//!   [`MAX_LIST_ITEMS`]
//!
//! ```
//! use serde_json::json;
//! use tool_orchestrator::domain::registry::SummaryTemplate;
//!
//! let template = SummaryTemplate::parse("{amount} {from} = {converted_amount:.2} {to}").unwrap();
//! let payload = json!({"amount": 100, "from": "USD", "converted_amount": 92.5, "to": "EUR"});
//! assert_eq!(template.render(&payload).as_deref(), Some("100 USD = 92.50 EUR"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Most list elements rendered by one `{list[]...}` placeholder.
pub const MAX_LIST_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryTemplateError {
    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("unexpected '}}' at byte {0}")]
    StrayClose(usize),

    #[error("empty placeholder at byte {0}")]
    Empty(usize),

    #[error("invalid number format in '{{{0}}}'")]
    Precision(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field {
        path: Vec<String>,
        precision: Option<usize>,
    },
    List {
        path: Vec<String>,
        item: Vec<String>,
    },
}

/// A parsed summary template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SummaryTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl SummaryTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, SummaryTemplateError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut rest = source.char_indices();

        while let Some((at, c)) = rest.next() {
            match c {
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for (_, inner) in rest.by_ref() {
                        match inner {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(SummaryTemplateError::Unclosed(at)),
                            other => body.push(other),
                        }
                    }
                    if !closed {
                        return Err(SummaryTemplateError::Unclosed(at));
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(placeholder(body.trim(), at)?);
                }
                '}' => return Err(SummaryTemplateError::StrayClose(at)),
                other => text.push(other),
            }
        }
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { source, segments })
    }

    /// Top-level payload fields the template reads.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Text(_) => None,
            Segment::Field { path, .. } | Segment::List { path, .. } => {
                path.first().map(String::as_str)
            }
        })
    }

    /// Fills the template from `payload`.
    ///
    /// Returns `None` when a field is missing or null, or a list is empty.
    pub fn render(&self, payload: &Value) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field { path, precision } => {
                    out.push_str(&display(lookup(payload, path)?, *precision));
                }
                Segment::List { path, item } => {
                    let lines: Vec<String> = lookup(payload, path)?
                        .as_array()?
                        .iter()
                        .filter_map(|element| lookup(element, item))
                        .take(MAX_LIST_ITEMS)
                        .map(|value| format!("- {}", display(value, None)))
                        .collect();
                    if lines.is_empty() {
                        return None;
                    }
                    out.push_str(&lines.join("\n"));
                }
            }
        }
        Some(out)
    }
}

fn placeholder(body: &str, at: usize) -> Result<Segment, SummaryTemplateError> {
    if body.is_empty() {
        return Err(SummaryTemplateError::Empty(at));
    }

    if let Some((list, item)) = body.split_once("[]") {
        let path = split_path(list);
        if path.is_empty() {
            return Err(SummaryTemplateError::Empty(at));
        }
        return Ok(Segment::List {
            path,
            item: split_path(item),
        });
    }

    let (field, precision) = match body.split_once(':') {
        Some((field, format)) => {
            let digits = format
                .strip_prefix('.')
                .and_then(|d| d.parse::<usize>().ok())
                .ok_or_else(|| SummaryTemplateError::Precision(body.to_string()))?;
            (field, Some(digits))
        }
        None => (body, None),
    };
    let path = split_path(field);
    if path.is_empty() {
        return Err(SummaryTemplateError::Empty(at));
    }
    Ok(Segment::Field { path, precision })
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'v>(value: &'v Value, path: &[String]) -> Option<&'v Value> {
    let found = path.iter().try_fold(value, |current, key| match current {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        other => other.get(key),
    })?;
    (!found.is_null()).then_some(found)
}

fn display(value: &Value, precision: Option<usize>) -> String {
    match (value, precision) {
        (Value::Number(n), Some(digits)) => match n.as_f64() {
            Some(f) => format!("{:.*}", digits, f),
            None => n.to_string(),
        },
        (Value::String(s), _) => s.clone(),
        (other, _) => other.to_string(),
    }
}

impl TryFrom<String> for SummaryTemplate {
    type Error = SummaryTemplateError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        Self::parse(source)
    }
}

impl From<SummaryTemplate> for String {
    fn from(template: SummaryTemplate) -> Self {
        template.source
    }
}

impl fmt::Display for SummaryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
