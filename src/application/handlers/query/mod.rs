//! Query handling.

mod query_engine;

pub use query_engine::{HandleQueryCommand, HandleQueryResult, QueryEngine, QueryError};
