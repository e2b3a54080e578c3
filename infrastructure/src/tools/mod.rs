//! Process adapters
//!
//! - [`ShellCommandRunner`]: shell command lines with captured output
//!   (operator `run_cmd`, tool-action context)
//! - [`ProcessActionLauncher`]: argv templates attached to the terminal
//!   (tool-action `execute_command`)

pub mod command;
pub mod launcher;
pub mod template;

pub use command::ShellCommandRunner;
pub use launcher::ProcessActionLauncher;
pub use template::build_command_args;
