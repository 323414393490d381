//! Tool specification - the declared contract of an orchestrated tool.
//!
//! A `ToolSpec` describes what a tool is called, which parameters it accepts
//! (with type, requiredness and default), and which output fields it promises
//! to return. The planner relies on declared outputs to validate references
//! between steps, so a spec is the single source of truth for a tool's shape.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RegistryError, SummaryTemplate};

/// Broad grouping of a tool, used for listings and prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Backed by an external HTTP API.
    #[default]
    Api,
    /// Computed locally.
    Builtin,
}

/// The value type of a declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterType {
    /// Free text.
    String,
    /// Short identifier such as a currency code, normalised to upper case.
    Code,
    /// Any finite number.
    Number,
    /// One of a fixed set of canonical values.
    Enum {
        values: Vec<String>,
        /// Alternative spellings mapped to a canonical value (e.g. "plus" -> "add").
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        aliases: BTreeMap<String, String>,
    },
}

impl ParameterType {
    /// Creates an enum type without aliases.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            values: values.into_iter().map(Into::into).collect(),
            aliases: BTreeMap::new(),
        }
    }

    /// Returns the JSON Schema type keyword for this parameter type.
    pub fn schema_type(&self) -> &'static str {
        match self {
            Self::String | Self::Code | Self::Enum { .. } => "string",
            Self::Number => "number",
        }
    }

    /// Checks whether a literal JSON value is acceptable for this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::String, Value::String(_)) => true,
            (Self::Code, Value::String(s)) => *s == s.to_ascii_uppercase(),
            (Self::Number, Value::Number(_)) => true,
            (Self::Enum { values, .. }, Value::String(s)) => values.iter().any(|v| v == s),
            _ => false,
        }
    }
}

/// A single declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    name: String,

    #[serde(flatten)]
    kind: ParameterType,

    #[serde(default = "default_required")]
    required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<Value>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,

    /// Output field of an earlier step this parameter binds to when the
    /// query refers back to a previous result ("convert it to JPY").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference_field: Option<String>,
}

fn default_required() -> bool {
    true
}

impl ParameterSpec {
    /// Creates a required parameter.
    pub fn required(name: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
            description: String::new(),
            reference_field: None,
        }
    }

    /// Creates an optional parameter with no default.
    pub fn optional(name: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    /// Sets the default used when the parameter is omitted. Implies optional.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    pub fn with_reference_field(mut self, field: impl Into<String>) -> Self {
        self.reference_field = Some(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ParameterType {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reference_field(&self) -> Option<&str> {
        self.reference_field.as_deref()
    }

    fn to_schema(&self) -> Value {
        let mut schema = serde_json::Map::new();
        schema.insert("type".into(), Value::from(self.kind.schema_type()));
        if let ParameterType::Enum { values, .. } = &self.kind {
            schema.insert("enum".into(), Value::from(values.clone()));
        }
        if !self.description.is_empty() {
            schema.insert("description".into(), Value::from(self.description.clone()));
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        Value::Object(schema)
    }
}

/// Declared contract of a tool.
///
/// # Examples
///
/// ```
/// use tool_orchestrator::domain::registry::{ParameterSpec, ParameterType, ToolSpec};
///
/// let spec = ToolSpec::new("weather", "Current weather for a city")
///     .with_parameter(ParameterSpec::required("city", ParameterType::String))
///     .with_outputs(["city", "temperature"]);
///
/// assert!(spec.declares_output("temperature"));
/// assert!(spec.parameter("city").unwrap().is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique name, used as the registry key.
    name: String,

    description: String,

    #[serde(default)]
    category: ToolCategory,

    /// Parameters in declaration order.
    #[serde(default)]
    parameters: Vec<ParameterSpec>,

    /// Output fields the tool promises to return.
    #[serde(default)]
    outputs: Vec<String>,

    /// Example queries, surfaced in listings and generative prompts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    examples: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    invocation_template: Option<String>,

    /// How a successful payload reads in the response summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    summary: Option<SummaryTemplate>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category: ToolCategory::default(),
            parameters: Vec::new(),
            outputs: Vec::new(),
            examples: Vec::new(),
            invocation_template: None,
            summary: None,
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(outputs.into_iter().map(Into::into));
        self
    }

    pub fn with_summary(mut self, template: SummaryTemplate) -> Self {
        self.summary = Some(template);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> ToolCategory {
        self.category
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Looks up a declared parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Returns true if `field` is one of the declared output fields.
    pub fn declares_output(&self, field: &str) -> bool {
        self.outputs.iter().any(|o| o == field)
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Name used when rendering an invocation, defaulting to the tool name.
    pub fn invocation_template(&self) -> &str {
        self.invocation_template.as_deref().unwrap_or(&self.name)
    }

    pub fn summary(&self) -> Option<&SummaryTemplate> {
        self.summary.as_ref()
    }

    /// Checks internal consistency of the spec.
    ///
    /// Rejects empty names, duplicate parameter or output names, empty enums,
    /// aliases pointing outside the enum, defaults of the wrong type, and
    /// summary templates reading undeclared outputs.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |reason: String| RegistryError::InvalidSpec {
            tool: self.name.clone(),
            reason,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("tool name must not be empty".into()));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if param.name.trim().is_empty() {
                return Err(invalid("parameter name must not be empty".into()));
            }
            if !seen.insert(param.name.as_str()) {
                return Err(invalid(format!("duplicate parameter '{}'", param.name)));
            }
            if let ParameterType::Enum { values, aliases } = &param.kind {
                if values.is_empty() {
                    return Err(invalid(format!("enum parameter '{}' has no values", param.name)));
                }
                if let Some((alias, target)) = aliases.iter().find(|(_, t)| !values.contains(t)) {
                    return Err(invalid(format!(
                        "alias '{}' of '{}' maps to unknown value '{}'",
                        alias, param.name, target
                    )));
                }
            }
            if let Some(default) = &param.default {
                if !param.kind.accepts(default) {
                    return Err(invalid(format!(
                        "default for '{}' does not match its type",
                        param.name
                    )));
                }
            }
        }

        let mut outputs = HashSet::new();
        if let Some(dup) = self.outputs.iter().find(|o| !outputs.insert(o.as_str())) {
            return Err(invalid(format!("duplicate output field '{}'", dup)));
        }

        if let Some(template) = &self.summary {
            if let Some(field) = template.fields().find(|f| !outputs.contains(f)) {
                return Err(invalid(format!(
                    "summary reads '{}', which is not a declared output",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Converts to OpenAI function-calling format.
    pub fn to_openai_format(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.to_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required
                },
                "outputs": self.outputs
            }
        })
    }
}
