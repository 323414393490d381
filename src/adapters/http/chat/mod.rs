//! Chat HTTP adapter - answers natural-language queries.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequest, ChatResponse};
pub use handlers::ChatAppState;
pub use routes::chat_router;
