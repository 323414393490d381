//! Intent parsing domain.
//!
//! Converts free-form query text into validated [`Invocation`]s. Two
//! strategies are available, phrase templates ([`PatternIntentParser`]) and
//! a generative backend ([`GenerativeIntentParser`]), plus a hybrid that
//! chains them. All three share segmentation and slot validation, so they
//! reject the same malformed sub-intents.

mod errors;
mod fallback_parser;
mod generative_parser;
mod invocation;
mod parser;
mod pattern_parser;
mod patterns;
pub mod segmenter;
mod slots;

pub use errors::{IntentError, ParserError};
pub use fallback_parser::FallbackIntentParser;
pub use generative_parser::GenerativeIntentParser;
pub use invocation::{Invocation, ParamValue, Reference};
pub use parser::{IntentParser, ParseOutcome, ParserStrategy, RejectedIntent};
pub use pattern_parser::PatternIntentParser;
pub use patterns::{PatternBook, PhraseTemplate, SharedPatternBook};
pub use slots::{coerce_text, coerce_value, is_anaphor, validate_slots, RawSlot, ReferenceContext};
