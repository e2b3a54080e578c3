//! Streaming events for LLM completions.
//!
//! [`StreamEvent`] represents individual events in a streaming reply,
//! enabling real-time display of model output as it's generated.

/// An event in a streaming LLM response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}
