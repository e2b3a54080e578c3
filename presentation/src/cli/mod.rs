//! Command-line surface: argument definitions and stdin handling

pub mod commands;
pub mod input;
