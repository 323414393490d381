//! Slot validation - turning raw extracted values into typed parameters.
//!
//! Both parser strategies produce raw slots (captured text, JSON values or
//! explicit references). This module checks them against the tool's spec:
//! undeclared names are rejected, values are coerced to the declared type,
//! omitted optionals take their default, and a missing or anaphoric value
//! may bind to the previous step's output when the parameter declares a
//! reference field.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

use super::{IntentError, ParamValue, Reference};
use crate::domain::foundation::InvocationId;
use crate::domain::registry::{ParameterSpec, ParameterType, ToolSpec};

static ANAPHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:it|that|this|them|those|there|the result|the results|that result|that amount|the answer|the same)$")
        .unwrap_or_else(|e| panic!("invalid anaphor regex: {e}"))
});

/// Returns true for words that point back at an earlier result.
pub fn is_anaphor(text: &str) -> bool {
    ANAPHOR.is_match(text.trim())
}

/// A value as extracted, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSlot {
    /// Text captured from the query.
    Text(String),
    /// A structured value, e.g. from a generative proposal.
    Value(Value),
    /// An explicit reference to an earlier invocation.
    Reference(Reference),
    /// A pronoun-like phrase ("it", "the result").
    Anaphor,
}

/// Where an implicit reference may point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceContext {
    /// The invocation extracted from the preceding clause, if any.
    pub previous: Option<InvocationId>,
    /// Clause was introduced by a sequencing marker. A clause holding an
    /// anaphor is treated the same way.
    pub sequenced: bool,
}

/// Validates raw slots against a spec and produces typed parameters.
pub fn validate_slots(
    spec: &ToolSpec,
    mut raw: BTreeMap<String, RawSlot>,
    context: ReferenceContext,
) -> Result<BTreeMap<String, ParamValue>, IntentError> {
    if let Some(undeclared) = raw.keys().find(|name| spec.parameter(name).is_none()) {
        return Err(IntentError::extraction(
            spec.name(),
            undeclared.clone(),
            "not a declared parameter",
        ));
    }

    // A clause that points back at an earlier result continues from it, so
    // its other omitted parameters may bind to the same step.
    let context = ReferenceContext {
        sequenced: context.sequenced || raw.values().any(|slot| matches!(slot, RawSlot::Anaphor)),
        ..context
    };

    let mut parameters = BTreeMap::new();
    for param in spec.parameters() {
        let slot = raw.remove(param.name()).filter(|slot| !is_blank(slot));
        if let Some(value) = bind(spec, param, slot, context)? {
            parameters.insert(param.name().to_string(), value);
        }
    }

    Ok(parameters)
}

fn is_blank(slot: &RawSlot) -> bool {
    match slot {
        RawSlot::Text(text) => text.trim().is_empty(),
        RawSlot::Value(Value::Null) => true,
        RawSlot::Value(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn bind(
    spec: &ToolSpec,
    param: &ParameterSpec,
    slot: Option<RawSlot>,
    context: ReferenceContext,
) -> Result<Option<ParamValue>, IntentError> {
    let fail = |reason: &str| IntentError::extraction(spec.name(), param.name(), reason);

    match slot {
        Some(RawSlot::Text(text)) => coerce_text(param.kind(), &text)
            .map(|v| Some(ParamValue::Literal(v)))
            .map_err(|reason| fail(&reason)),
        Some(RawSlot::Value(value)) => coerce_value(param.kind(), value)
            .map(|v| Some(ParamValue::Literal(v)))
            .map_err(|reason| fail(&reason)),
        Some(RawSlot::Reference(reference)) => Ok(Some(ParamValue::Reference(reference))),
        Some(RawSlot::Anaphor) => implicit_reference(param, context)
            .map(|r| Some(ParamValue::Reference(r)))
            .ok_or_else(|| fail("refers to an earlier result but none can be bound")),
        None => {
            if context.sequenced {
                if let Some(reference) = implicit_reference(param, context) {
                    return Ok(Some(ParamValue::Reference(reference)));
                }
            }
            if let Some(default) = param.default_value() {
                return Ok(Some(ParamValue::Literal(default.clone())));
            }
            if param.is_required() {
                Err(fail("required parameter is missing"))
            } else {
                Ok(None)
            }
        }
    }
}

fn implicit_reference(param: &ParameterSpec, context: ReferenceContext) -> Option<Reference> {
    let step = context.previous?;
    let field = param.reference_field()?;
    Some(Reference::new(step, field))
}

/// Coerces captured text to the declared type.
pub fn coerce_text(kind: &ParameterType, text: &str) -> Result<Value, String> {
    let text = text
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim_end_matches(['?', '.', '!'])
        .trim();

    match kind {
        ParameterType::String => Ok(Value::String(text.to_string())),
        ParameterType::Code if text.is_empty() => Err("empty code".to_string()),
        ParameterType::Code => Ok(Value::String(text.to_ascii_uppercase())),
        ParameterType::Number => parse_number(text),
        ParameterType::Enum { values, aliases } => values
            .iter()
            .find(|v| v.eq_ignore_ascii_case(text))
            .or_else(|| {
                aliases
                    .iter()
                    .find(|(alias, _)| alias.eq_ignore_ascii_case(text))
                    .map(|(_, canonical)| canonical)
            })
            .map(|v| Value::String(v.clone()))
            .ok_or_else(|| format!("'{}' is not one of {}", text, values.join(", "))),
    }
}

/// Coerces a structured value to the declared type.
pub fn coerce_value(kind: &ParameterType, value: Value) -> Result<Value, String> {
    match (kind, value) {
        (ParameterType::Number, Value::Number(n)) => normalize_number(n),
        (ParameterType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (_, Value::String(s)) => coerce_text(kind, &s),
        (_, other) => Err(format!("expected {}, got {}", kind.schema_type(), other)),
    }
}

fn parse_number(text: &str) -> Result<Value, String> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '_').collect();
    let parsed: f64 = cleaned
        .parse()
        .map_err(|_| format!("'{}' is not a number", text))?;
    number_value(parsed).ok_or_else(|| format!("'{}' is not a finite number", text))
}

fn normalize_number(n: Number) -> Result<Value, String> {
    n.as_f64()
        .and_then(number_value)
        .ok_or_else(|| format!("'{}' is not a finite number", n))
}

/// Integral values are stored as integers so `100` and `100.0` compare equal
/// after extraction.
fn number_value(n: f64) -> Option<Value> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        return Some(Value::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number)
}
