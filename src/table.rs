//! Prompt tables: ordered steps of `(pattern, action)` rules.

use crate::pattern::Pattern;
use anyhow::{Result, bail};
use std::time::Duration;

/// How a terminal literal match is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verdict {
    #[default]
    Success,
    Failure,
}

/// What to do when a rule's pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Write the line, plus a newline, to the process.
    Respond(String),
    /// Report the match and keep going.
    Log,
    /// End the loop.
    Stop(Verdict),
}

impl Action {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Stop(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRule {
    pub pattern: Pattern,
    pub action: Action,
}

impl PromptRule {
    pub fn new(pattern: Pattern, action: Action) -> Self {
        Self { pattern, action }
    }

    pub fn respond(literal: impl Into<String>, line: impl Into<String>) -> Self {
        Self::new(Pattern::literal(literal), Action::Respond(line.into()))
    }

    pub fn log(literal: impl Into<String>) -> Self {
        Self::new(Pattern::literal(literal), Action::Log)
    }

    pub fn stop(literal: impl Into<String>, verdict: Verdict) -> Self {
        Self::new(Pattern::literal(literal), Action::Stop(verdict))
    }
}

/// What happens after a non-terminal match in a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Move on to the next step.
    Once,
    /// Wait again with the same rules.
    Repeat,
}

/// One wait stage: the set of patterns that are relevant at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptStep {
    pub name: String,
    pub mode: StepMode,
    /// Overrides the controller's overall timeout for this step.
    pub timeout: Option<Duration>,
    pub rules: Vec<PromptRule>,
}

impl PromptStep {
    pub fn new(name: impl Into<String>, mode: StepMode) -> Self {
        Self {
            name: name.into(),
            mode,
            timeout: None,
            rules: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn rule(mut self, rule: PromptRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// The first rule listing `sentinel`, if any.
    pub fn sentinel_rule(&self, sentinel: &Pattern) -> Option<&PromptRule> {
        self.rules.iter().find(|r| r.pattern == *sentinel)
    }

    /// Every rule's pattern, in rule order.
    pub fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.rules.iter().map(|r| &r.pattern)
    }
}

/// A validated, ordered list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTable {
    steps: Vec<PromptStep>,
}

impl PromptTable {
    /// Build a table, rejecting shapes the controller cannot run.
    ///
    /// # Errors
    ///
    /// - the table has no steps
    /// - the last step is not [`StepMode::Repeat`]
    /// - an `eof` rule responds
    /// - an `eof` or `timeout` rule in a repeating step does not stop
    pub fn new(steps: Vec<PromptStep>) -> Result<Self> {
        let Some(last) = steps.last() else {
            bail!("Prompt table has no steps");
        };
        if last.mode != StepMode::Repeat {
            bail!(
                "Last step '{}' must be 'repeat' so the loop ends on a terminal match",
                last.name
            );
        }
        for step in &steps {
            for rule in step.rules.iter().filter(|r| r.pattern.is_sentinel()) {
                if rule.pattern == Pattern::Eof && matches!(rule.action, Action::Respond(_)) {
                    bail!("Step '{}': cannot respond to eof", step.name);
                }
                if step.mode == StepMode::Repeat && !rule.action.is_terminal() {
                    bail!(
                        "Step '{}': {} in a repeating step must stop",
                        step.name,
                        rule.pattern
                    );
                }
            }
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[PromptStep] {
        &self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repeat_step() -> PromptStep {
        PromptStep::new("build", StepMode::Repeat).rule(PromptRule::stop("done", Verdict::Success))
    }

    #[test]
    fn test_valid_table() {
        let table = PromptTable::new(vec![
            PromptStep::new("setup", StepMode::Once)
                .with_timeout(Duration::from_secs(30))
                .rule(PromptRule::respond("Continue?", "y"))
                .rule(PromptRule::new(Pattern::Timeout, Action::Log)),
            repeat_step(),
        ])
        .unwrap();
        assert_eq!(table.steps().len(), 2);
        assert_eq!(table.steps()[0].timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(PromptTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_last_step_must_repeat() {
        let err = PromptTable::new(vec![PromptStep::new("only", StepMode::Once)])
            .unwrap_err()
            .to_string();
        assert!(err.contains("repeat"), "got: {err}");
    }

    #[test]
    fn test_cannot_respond_to_eof() {
        let step = repeat_step().rule(PromptRule::new(Pattern::Eof, Action::Respond("y".into())));
        assert!(PromptTable::new(vec![step]).is_err());
    }

    #[test]
    fn test_eof_in_repeat_step_must_stop() {
        let step = repeat_step().rule(PromptRule::new(Pattern::Eof, Action::Log));
        assert!(PromptTable::new(vec![step]).is_err());

        let once = PromptStep::new("setup", StepMode::Once)
            .rule(PromptRule::new(Pattern::Eof, Action::Log));
        assert!(PromptTable::new(vec![once, repeat_step()]).is_ok());
    }

    #[test]
    fn test_timeout_in_repeat_step_must_stop() {
        for action in [Action::Log, Action::Respond(String::new())] {
            let step = repeat_step().rule(PromptRule::new(Pattern::Timeout, action));
            let err = PromptTable::new(vec![step]).unwrap_err().to_string();
            assert!(err.contains("<timeout> in a repeating step must stop"), "got: {err}");
        }

        let nudge = PromptStep::new("keystore", StepMode::Once)
            .rule(PromptRule::new(Pattern::Timeout, Action::Respond(String::new())));
        let stop = repeat_step().rule(PromptRule::new(Pattern::Timeout, Action::Stop(Verdict::Failure)));
        assert!(PromptTable::new(vec![nudge, stop]).is_ok());
    }

    #[test]
    fn test_sentinel_rule_lookup() {
        let step = PromptStep::new("setup", StepMode::Once)
            .rule(PromptRule::new(Pattern::Timeout, Action::Log));
        assert_eq!(
            step.sentinel_rule(&Pattern::Timeout).map(|r| &r.action),
            Some(&Action::Log)
        );
        assert!(step.sentinel_rule(&Pattern::Eof).is_none());
    }
}
