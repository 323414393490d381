//! Tool Orchestrator - natural-language queries over registered tools
//!
//! A query such as "weather in Hanoi and then find news about it" is split
//! into sub-intents, each matched to a registered tool, ordered by the data
//! dependencies between them, executed concurrently where independent, and
//! folded into one response.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
