//! LLM conversation domain.
//!
//! - [`entities::Message`]: a single message sent to or received from a model
//! - [`entities::ChatHistory`]: an explicitly owned multi-turn transcript
//! - [`entities::CompletionRequest`]: what a provider needs to produce one reply
//! - [`stream::StreamEvent`]: incremental reply chunks

pub mod entities;
pub mod stream;
