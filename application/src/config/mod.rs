//! Application-level configuration.
//!
//! Plain settings handed to use cases by the composition root:
//!
//! - [`DetectionSettings`]: how [`DetectRoleUseCase`](crate::use_cases::detect_role::DetectRoleUseCase) picks a role
//! - [`Endpoint`]: where completions go, part of every response cache key
//! - [`RoleCatalog`]: role templates and their `{shell}`/`{os}` values
//! - [`ToolAction`]: one `tool <tool> <action>` recipe

pub mod detection;
pub mod endpoint;
pub mod roles;
pub mod tool_action;

pub use detection::DetectionSettings;
pub use endpoint::Endpoint;
pub use roles::RoleCatalog;
pub use tool_action::ToolAction;
