//! Safety policy for operator tool calls.
//!
//! [`evaluate`] is the pure decision procedure. It never prompts anyone:
//! when a human must approve, it returns [`GuardVerdict::Confirm`] with the
//! message to show, and the caller resolves it.
//!
//! Checks run in this order, first hit wins:
//!
//! 1. Critical risk blocks, with no override
//! 2. Shell tool: empty command blocks
//! 3. Shell tool: denylist substring blocks (before the allowlist)
//! 4. Shell tool: non-empty allowlist must match (prefix or substring)
//! 5. Dry run allows without confirmation
//! 6. Medium risk or above with `confirm_medium_risk` and without `yes` needs confirmation
//! 7. Allow

use crate::tool::{CMD_ARG, RiskLevel, ToolArgs, ToolDefinition};

/// Per-run guard policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardOptions {
    /// Substrings that block a shell command outright (case-insensitive)
    pub denylist: Vec<String>,
    /// When non-empty, a shell command must match one of these
    pub allowlist: Vec<String>,
    pub confirm_medium_risk: bool,
    pub dry_run: bool,
    /// Skip confirmation (never skips list checks or the critical block)
    pub yes: bool,
}

impl GuardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_denylist(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.denylist = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_allowlist(mut self, entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowlist = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confirm_medium_risk(mut self, confirm: bool) -> Self {
        self.confirm_medium_risk = confirm;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_yes(mut self, yes: bool) -> Self {
        self.yes = yes;
        self
    }
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    Allow,
    Block(String),
    /// Proceed only if a human approves this message.
    Confirm(String),
}

impl GuardVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardVerdict::Allow)
    }
}

/// Decide whether `tool` may run with `args` under `options`.
pub fn evaluate(tool: &ToolDefinition, args: &ToolArgs, options: &GuardOptions) -> GuardVerdict {
    if tool.risk_level.is_critical() {
        return GuardVerdict::Block(format!(
            "tool {} is not allowed (critical risk)",
            tool.name
        ));
    }

    if tool.is_shell() {
        let cmd = args.get(CMD_ARG).map(|c| c.trim()).unwrap_or_default();
        if cmd.is_empty() {
            return GuardVerdict::Block("empty command".to_string());
        }
        if let Some(reason) = check_lists(cmd, options) {
            return GuardVerdict::Block(reason);
        }
    }

    if options.dry_run {
        return GuardVerdict::Allow;
    }

    if tool.risk_level >= RiskLevel::Medium && options.confirm_medium_risk && !options.yes {
        return GuardVerdict::Confirm(confirmation_message(tool, args));
    }

    GuardVerdict::Allow
}

fn check_lists(cmd: &str, options: &GuardOptions) -> Option<String> {
    let cmd_lower = cmd.to_lowercase();

    for entry in &options.denylist {
        let needle = entry.trim().to_lowercase();
        if !needle.is_empty() && cmd_lower.contains(&needle) {
            return Some(format!("command blocked by denylist: {}", entry.trim()));
        }
    }

    let allow: Vec<String> = options
        .allowlist
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    if !allow.is_empty()
        && !allow
            .iter()
            .any(|a| cmd_lower.starts_with(a.as_str()) || cmd_lower.contains(a.as_str()))
    {
        return Some("command not in allowlist".to_string());
    }

    None
}

/// Human-readable description of a tool call for the confirmation prompt.
pub fn confirmation_message(tool: &ToolDefinition, args: &ToolArgs) -> String {
    if tool.is_shell()
        && let Some(cmd) = args.get(CMD_ARG)
    {
        return format!("Run command: {}", cmd);
    }
    let rendered = args
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} with args: {}", tool.name, rendered)
}
