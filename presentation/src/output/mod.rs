//! Console output

pub mod console;

pub use console::{ConsoleFormatter, RULE};
