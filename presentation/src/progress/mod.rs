//! Progress reporting for operator runs and streamed replies

pub mod operator;
pub mod response;

pub use operator::OperatorProgressReporter;
pub use response::StreamingPrinter;
