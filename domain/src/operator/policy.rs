//! Operator loop bounds.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_STEPS: usize = 10;
pub const DEFAULT_MAX_PARSE_FAILURES: usize = 2;
pub const DEFAULT_OUTPUT_MAX_BYTES: usize = 4096;

/// Limits for one investigate run.
///
/// Zero values mean "use the default"; [`OperatorPolicy::normalized`]
/// resolves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorPolicy {
    pub max_steps: usize,
    pub max_parse_failures: usize,
    pub output_max_bytes: usize,
}

impl Default for OperatorPolicy {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_parse_failures: DEFAULT_MAX_PARSE_FAILURES,
            output_max_bytes: DEFAULT_OUTPUT_MAX_BYTES,
        }
    }
}

impl OperatorPolicy {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_parse_failures(mut self, max_parse_failures: usize) -> Self {
        self.max_parse_failures = max_parse_failures;
        self
    }

    pub fn with_output_max_bytes(mut self, output_max_bytes: usize) -> Self {
        self.output_max_bytes = output_max_bytes;
        self
    }

    pub fn normalized(self) -> Self {
        let or_default = |value: usize, default: usize| if value == 0 { default } else { value };
        Self {
            max_steps: or_default(self.max_steps, DEFAULT_MAX_STEPS),
            max_parse_failures: or_default(self.max_parse_failures, DEFAULT_MAX_PARSE_FAILURES),
            output_max_bytes: or_default(self.output_max_bytes, DEFAULT_OUTPUT_MAX_BYTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = OperatorPolicy::default();
        assert_eq!(policy.max_steps, 10);
        assert_eq!(policy.max_parse_failures, 2);
        assert_eq!(policy.output_max_bytes, 4096);
    }

    #[test]
    fn test_zero_values_normalize_to_defaults() {
        let policy = OperatorPolicy::default()
            .with_max_steps(0)
            .with_max_parse_failures(0)
            .with_output_max_bytes(0)
            .normalized();
        assert_eq!(policy, OperatorPolicy::default());
    }

    #[test]
    fn test_explicit_values_survive_normalization() {
        let policy = OperatorPolicy::default()
            .with_max_steps(3)
            .with_output_max_bytes(20)
            .normalized();
        assert_eq!(policy.max_steps, 3);
        assert_eq!(policy.output_max_bytes, 20);
    }
}
