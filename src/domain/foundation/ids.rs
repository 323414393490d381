//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Position of an invocation within one query.
///
/// Assigned in segmentation order (0-based) by the intent parser, so the same
/// text always yields the same ids. References between invocations use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(usize);

impl InvocationId {
    /// Creates an id from a segmentation index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the segmentation index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step-{}", self.0)
    }
}

/// Unique identifier for one handled query, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(Uuid);

impl QueryId {
    /// Creates a new random QueryId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_id_displays_as_step() {
        assert_eq!(InvocationId::new(2).to_string(), "step-2");
    }

    #[test]
    fn invocation_ids_order_by_index() {
        assert!(InvocationId::new(0) < InvocationId::new(1));
    }

    #[test]
    fn query_id_roundtrips_through_string() {
        let id = QueryId::new();
        let parsed: QueryId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn query_ids_are_unique() {
        assert_ne!(QueryId::new(), QueryId::new());
    }
}
