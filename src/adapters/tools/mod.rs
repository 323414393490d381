//! Tool adapters - implementations of the ToolAdapter port.
//!
//! - `HttpToolAdapter` - Template-driven HTTP calls (RapidAPI-style services)
//! - `CalculatorAdapter` - In-process arithmetic
//! - `RetryingToolAdapter` - Retries transient failures of another adapter
//! - `MockToolAdapter` - Configurable mock for testing

mod calculator;
mod http_adapter;
mod mock_adapter;
mod retrying;

pub use calculator::CalculatorAdapter;
pub use http_adapter::{HttpMethod, HttpTemplate, HttpToolAdapter};
pub use mock_adapter::MockToolAdapter;
pub use retrying::RetryingToolAdapter;
