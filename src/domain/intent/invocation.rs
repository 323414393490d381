//! Invocations - a tool selected for one sub-intent, with bound parameters.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::InvocationId;

/// Points at an output field of an earlier invocation in the same query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub step: InvocationId,
    pub field: String,
}

impl Reference {
    pub fn new(step: InvocationId, field: impl Into<String>) -> Self {
        Self {
            step,
            field: field.into(),
        }
    }
}

/// A parameter value: either known now or produced by an earlier step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Literal(Value),
    Reference(Reference),
}

impl ParamValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Reference(_) => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(r) => Some(r),
            Self::Literal(_) => None,
        }
    }
}

/// A tool invocation extracted from the query.
///
/// Parameter names are always declared by the tool's spec; validation
/// happens before an `Invocation` is constructed by a parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    id: InvocationId,
    tool: String,
    parameters: BTreeMap<String, ParamValue>,
    /// Clause of the query this invocation was extracted from.
    source: String,
}

impl Invocation {
    pub fn new(
        id: InvocationId,
        tool: impl Into<String>,
        parameters: BTreeMap<String, ParamValue>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            tool: tool.into(),
            parameters,
            source: source.into(),
        }
    }

    pub fn id(&self) -> InvocationId {
        self.id
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn parameters(&self) -> &BTreeMap<String, ParamValue> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// All references held by this invocation, keyed by parameter name.
    pub fn references(&self) -> impl Iterator<Item = (&str, &Reference)> + '_ {
        self.parameters
            .iter()
            .filter_map(|(name, value)| value.as_reference().map(|r| (name.as_str(), r)))
    }

    /// Distinct invocations this one reads from.
    pub fn dependencies(&self) -> BTreeSet<InvocationId> {
        self.references().map(|(_, r)| r.step).collect()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.references().next().is_none()
    }
}
