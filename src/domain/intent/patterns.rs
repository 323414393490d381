//! Phrase templates used by the pattern parser.
//!
//! A template is a case-insensitive regular expression whose named capture
//! groups are parameter names of the tool it belongs to. Captures are taken
//! from the original text, so "USD" stays "USD".

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use regex::Regex;

use super::RawSlot;

/// A compiled phrase template.
#[derive(Debug, Clone)]
pub struct PhraseTemplate {
    regex: Regex,
    source: String,
}

impl PhraseTemplate {
    /// Compiles a template, anchoring it and making it case-insensitive.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i)^(?:{})$", pattern))?;
        Ok(Self {
            regex,
            source: pattern.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matches a clause, returning captured slots keyed by group name.
    pub fn capture(&self, clause: &str) -> Option<BTreeMap<String, RawSlot>> {
        let caps = self.regex.captures(clause)?;
        let slots = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), RawSlot::Text(m.as_str().trim().to_string())))
            })
            .collect();
        Some(slots)
    }
}

/// Phrase templates per tool.
#[derive(Debug, Clone, Default)]
pub struct PatternBook {
    templates: HashMap<String, Vec<PhraseTemplate>>,
}

impl PatternBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds templates for a tool, after any it already has.
    pub fn add<I, S>(&mut self, tool: &str, patterns: I) -> Result<(), regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| PhraseTemplate::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        self.templates
            .entry(tool.to_string())
            .or_default()
            .extend(compiled);
        Ok(())
    }

    pub fn remove(&mut self, tool: &str) {
        self.templates.remove(tool);
    }

    pub fn has_templates(&self, tool: &str) -> bool {
        self.templates.get(tool).is_some_and(|t| !t.is_empty())
    }

    /// First template of `tool` matching the clause.
    pub fn capture(&self, tool: &str, clause: &str) -> Option<BTreeMap<String, RawSlot>> {
        self.templates
            .get(tool)?
            .iter()
            .find_map(|template| template.capture(clause))
    }
}

/// Pattern book shared between the parser and tool registration.
#[derive(Debug, Clone, Default)]
pub struct SharedPatternBook {
    inner: Arc<RwLock<PatternBook>>,
}

impl SharedPatternBook {
    pub fn new(book: PatternBook) -> Self {
        Self {
            inner: Arc::new(RwLock::new(book)),
        }
    }

    pub fn add<I, S>(&self, tool: &str, patterns: I) -> Result<(), regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut book = self.inner.write().unwrap_or_else(|e| e.into_inner());
        book.add(tool, patterns)
    }

    pub fn remove(&self, tool: &str) {
        let mut book = self.inner.write().unwrap_or_else(|e| e.into_inner());
        book.remove(tool);
    }

    /// Runs `f` with read access to the book.
    pub fn read<T>(&self, f: impl FnOnce(&PatternBook) -> T) -> T {
        let book = self.inner.read().unwrap_or_else(|e| e.into_inner());
        f(&book)
    }
}
