//! Console output formatting for gaia commands

use colored::Colorize;
use gaia_domain::DetectionResult;

/// Separator printed between chat turns
pub const RULE: &str = "----------------------------------------";

/// Formats command output for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn warning(message: &str) -> String {
        format!("{} {}", "Warning:".yellow().bold(), message)
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }

    /// `role: shell (heuristic, score 0.75) matched 2 keywords with score 0.75`
    pub fn detection(result: &DetectionResult) -> String {
        let mut line = format!("role: {} ({}", result.role, result.method);
        if result.score > 0.0 {
            line.push_str(&format!(", score {:.2}", result.score));
        }
        line.push(')');
        if !result.reason.is_empty() {
            line.push(' ');
            line.push_str(&result.reason);
        }
        line
    }

    pub fn version(version: &str, commit: &str, build_date: &str) -> String {
        format!("Gaia {}, commit {}, built at {}", version, commit, build_date)
    }

    pub fn cache_stats(entries: usize, size_bytes: u64) -> String {
        format!("Entries: {}\nSize: {} bytes", entries, size_bytes)
    }

    /// One `cache list` row: key, RFC 3339 creation time, size
    pub fn cache_row(key: &str, created_at: &str, size_bytes: u64) -> String {
        format!("{}\t{}\t{} bytes", key, created_at, size_bytes)
    }

    pub fn cache_dump_entry(key: &str, created_at: &str, response: &str) -> String {
        format!(
            "Key: {}\nCreatedAt: {}\nResponse:\n{}\n",
            key, created_at, response
        )
    }

    pub fn cache_cleared(removed: usize) -> String {
        format!("Removed {} cache entries", removed)
    }

    /// `config path` listing, one line per candidate file
    pub fn config_source(label: &str, path: &str, exists: bool) -> String {
        let status = if exists {
            "(found)".green()
        } else {
            "(not found)".dimmed()
        };
        format!("{:<8} {} {}", label, path, status)
    }
}
