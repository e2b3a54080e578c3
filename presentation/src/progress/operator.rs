//! Progress reporting for `gaia investigate`

use colored::Colorize;
use gaia_application::OperatorProgressNotifier;
use gaia_domain::core::string::truncate;
use gaia_domain::{Decision, DecisionAction, DecisionError};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Observations longer than this are cut in the debug trace
pub const TRACE_OBSERVATION_LIMIT: usize = 200;

/// Shows a spinner while the model thinks and, with `--debug`, a trace
/// of every decision and observation on stderr.
pub struct OperatorProgressReporter {
    debug: bool,
    show_spinner: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl OperatorProgressReporter {
    pub fn new() -> Self {
        Self {
            debug: false,
            show_spinner: true,
            spinner: Mutex::new(None),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn clear_spinner(&self) {
        let mut spinner = self.spinner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pb) = spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn trace(&self, line: String) {
        if self.debug {
            eprintln!("{}", line.dimmed());
        }
    }
}

impl Default for OperatorProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorProgressNotifier for OperatorProgressReporter {
    fn on_step_start(&self, step: usize, max_steps: usize) {
        self.clear_spinner();
        if !self.show_spinner {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("Step {}/{}", step, max_steps));
        pb.set_message("Thinking...");
        pb.enable_steady_tick(Duration::from_millis(100));
        *self.spinner.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_decision(&self, decision: &Decision) {
        // Cleared before the guard may prompt for confirmation
        self.clear_spinner();
        self.trace(format_decision_trace(decision));
    }

    fn on_parse_error(&self, error: &DecisionError) {
        self.clear_spinner();
        self.trace(format!("[DEBUG] parse error: {}", error));
    }

    fn on_observation(&self, observation: &str) {
        self.trace(format_observation_trace(observation));
    }
}

/// `[DEBUG] decision: action=tool name=run_cmd args={"cmd": "df -h"} reasoning="..."`
pub fn format_decision_trace(decision: &Decision) -> String {
    let mut line = format!("[DEBUG] decision: action={}", decision.action_name());
    if let DecisionAction::Tool { name, args } = &decision.action {
        line.push_str(&format!(" name={} args={:?}", name, args));
    }
    if let Some(reasoning) = decision.reasoning.as_deref().filter(|r| !r.is_empty()) {
        line.push_str(&format!(" reasoning={:?}", reasoning));
    }
    line
}

pub fn format_observation_trace(observation: &str) -> String {
    format!(
        "[DEBUG] observation: {}",
        truncate(observation, TRACE_OBSERVATION_LIMIT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaia_domain::ToolArgs;

    #[test]
    fn test_decision_trace() {
        let args = ToolArgs::from([("cmd".to_string(), "df -h".to_string())]);
        let decision = Decision::tool("run_cmd", args).with_reasoning("check disk");
        assert_eq!(
            format_decision_trace(&decision),
            r#"[DEBUG] decision: action=tool name=run_cmd args={"cmd": "df -h"} reasoning="check disk""#
        );
        assert_eq!(
            format_decision_trace(&Decision::answer("done")),
            "[DEBUG] decision: action=answer"
        );
    }

    #[test]
    fn test_observation_trace_is_truncated() {
        let long = "x".repeat(500);
        let line = format_observation_trace(&long);
        assert!(line.ends_with("..."));
        assert_eq!(line.len(), "[DEBUG] observation: ".len() + 200 + 3);

        assert_eq!(format_observation_trace("ok"), "[DEBUG] observation: ok");
    }

    #[test]
    fn test_reporter_without_spinner() {
        let reporter = OperatorProgressReporter::new().with_spinner(false);
        reporter.on_step_start(1, 3);
        assert!(reporter.spinner.lock().unwrap().is_none());
        reporter.on_decision(&Decision::answer("done"));
    }
}
