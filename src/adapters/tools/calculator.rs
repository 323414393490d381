//! In-process arithmetic tool.

use async_trait::async_trait;
use serde_json::{json, Number, Value};

use crate::ports::{AdapterError, ResolvedCall, ToolAdapter};

/// Evaluates `num1 <operation> num2`.
///
/// `operation` is one of `add`, `subtract`, `multiply`, `divide`; aliases
/// such as "plus" are normalised by slot validation before the call
/// reaches the adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalculatorAdapter;

impl CalculatorAdapter {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(operation: &str, a: f64, b: f64) -> Result<f64, AdapterError> {
        let result = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" if b == 0.0 => {
                return Err(AdapterError::invalid_parameters("division by zero"))
            }
            "divide" => a / b,
            other => {
                return Err(AdapterError::invalid_parameters(format!(
                    "unsupported operation '{}'",
                    other
                )))
            }
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(AdapterError::invalid_parameters("result is not a finite number"))
        }
    }
}

/// Integral results are reported as integers.
fn to_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        json!(value as i64)
    } else {
        Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[async_trait]
impl ToolAdapter for CalculatorAdapter {
    async fn invoke(&self, call: &ResolvedCall) -> Result<Value, AdapterError> {
        let operation = call
            .str_param("operation")
            .ok_or_else(|| AdapterError::invalid_parameters("missing 'operation'"))?;
        let num1 = call
            .number_param("num1")
            .ok_or_else(|| AdapterError::invalid_parameters("'num1' must be a number"))?;
        let num2 = call
            .number_param("num2")
            .ok_or_else(|| AdapterError::invalid_parameters("'num2' must be a number"))?;

        let result = Self::evaluate(operation, num1, num2)?;

        Ok(json!({
            "operation": operation,
            "num1": to_number(num1),
            "num2": to_number(num2),
            "result": to_number(result),
        }))
    }

    fn kind(&self) -> &'static str {
        "builtin"
    }
}
