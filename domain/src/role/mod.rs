//! Role detection domain.
//!
//! A *role* is a named system-prompt template (shell, code, commit, ...).
//! Detection picks one for a free-form message:
//!
//! ```text
//! explicit --role ──▶ use it
//!        │ (none)
//!        ▼
//! heuristic::detect(message, roles, keywords) ── score > 0.3 ──▶ use it
//!        │ (no match)
//!        ▼
//! LLM classification (hybrid mode) ── parse_classification ──▶ use it
//!        │ (error)
//!        ▼
//!     "default"
//! ```
//!
//! Only the pure pieces live here; the orchestration (cache, LLM call) is
//! `DetectRoleUseCase` in the application layer.

pub mod classifier;
pub mod entities;
pub mod heuristic;
pub mod templates;

pub use classifier::{classification_prompt, parse_classification};
pub use entities::{
    DEFAULT_ROLE, DetectionMethod, DetectionMode, DetectionResult, RoleKeywords,
};
pub use heuristic::{HeuristicMatch, detect};
pub use templates::{default_role_templates, render_role_template};
