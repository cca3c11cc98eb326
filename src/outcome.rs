//! [`BuildOutcome`]: how a guided build ended.

use crate::pattern::Pattern;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// A stop rule with a success verdict matched.
    Completed,
    /// A stop rule with a failure verdict matched.
    BuildFailed,
    /// Nothing matched before a terminal wait deadline.
    TimedOut,
    /// The output stream ended before a stop rule matched.
    ProcessExited,
    /// Writing to the process or the transcript failed.
    Errored,
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OutcomeKind::Completed => "completed",
            OutcomeKind::BuildFailed => "build failed",
            OutcomeKind::TimedOut => "timed out",
            OutcomeKind::ProcessExited => "process exited",
            OutcomeKind::Errored => "error",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub kind: OutcomeKind,
    /// The pattern that ended the loop. `None` when an error did.
    pub matched: Option<Pattern>,
    /// Output seen before the final match, or whatever was left unconsumed.
    pub last_output: String,
    pub error: Option<String>,
    pub responses_sent: usize,
    /// Filled in when the process is released.
    pub exit_code: Option<u32>,
}

impl BuildOutcome {
    pub(crate) fn new(kind: OutcomeKind, matched: Option<Pattern>, last_output: String) -> Self {
        Self {
            kind,
            matched,
            last_output,
            error: None,
            responses_sent: 0,
            exit_code: None,
        }
    }

    pub(crate) fn errored(error: &anyhow::Error, last_output: String) -> Self {
        Self {
            error: Some(format!("{error:#}")),
            ..Self::new(OutcomeKind::Errored, None, last_output)
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn test_errored_keeps_context_chain() {
        let err = Err::<(), _>(anyhow!("broken pipe"))
            .context("Failed to send response")
            .unwrap_err();
        let outcome = BuildOutcome::errored(&err, "partial".into());
        assert_eq!(outcome.kind, OutcomeKind::Errored);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Failed to send response: broken pipe")
        );
        assert_eq!(outcome.last_output, "partial");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OutcomeKind::BuildFailed.to_string(), "build failed");
        assert_eq!(OutcomeKind::ProcessExited.to_string(), "process exited");
    }
}
