//! The [`TableDirective`] trait and the [`TableBuilder`] directives apply to.

use crate::table::{PromptRule, PromptStep, PromptTable};
use anyhow::{Context as _, Result, anyhow};

/// Accumulates steps and rules while a prompt file is read.
#[derive(Debug, Default)]
pub struct TableBuilder {
    steps: Vec<PromptStep>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new step. Following rules attach to it.
    pub fn begin_step(&mut self, step: PromptStep) -> Result<()> {
        if self.steps.iter().any(|s| s.name == step.name) {
            return Err(anyhow!("Duplicate step name: '{}'", step.name));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Append a rule to the current step.
    pub fn add_rule(&mut self, rule: PromptRule) -> Result<()> {
        let step = self
            .steps
            .last_mut()
            .ok_or_else(|| anyhow!("Rule appears before any 'step' line"))?;
        step.rules.push(rule);
        Ok(())
    }

    /// Validate and return the finished table.
    pub fn finish(self) -> Result<PromptTable> {
        PromptTable::new(self.steps).context("Invalid prompt table")
    }
}

/// A single line of a prompt file.
///
/// Implement this trait to add a new directive. Then:
///
/// 1. Define `pub const NAME: &'static str` on your struct, the keyword
///    that starts the line (e.g. `"step"`, `"respond"`).
/// 2. Re-export the struct from `src/directives/mod.rs`.
/// 3. Add one entry to the `REGISTRY` in [`crate::parser`]:
///    `(MyDirective::NAME, MyDirective::parse_boxed)`.
pub trait TableDirective: 'static {
    /// The directive keyword, accessible through a trait object.
    fn name(&self) -> &'static str;

    /// Parse the directive from everything after its keyword.
    fn parse(args: &str) -> Result<Self>
    where
        Self: Sized;

    /// Parse and box. This is the function-pointer type the registry stores.
    fn parse_boxed(args: &str) -> Result<Box<dyn TableDirective>>
    where
        Self: Sized,
    {
        Ok(Box::new(Self::parse(args)?))
    }

    /// Add this directive's step or rule to the table being built.
    fn apply(&self, builder: &mut TableBuilder) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{StepMode, Verdict};

    #[test]
    fn test_rule_before_step_rejected() {
        let mut builder = TableBuilder::new();
        let err = builder
            .add_rule(PromptRule::log("x"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("before any 'step'"), "got: {err}");
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let mut builder = TableBuilder::new();
        builder
            .begin_step(PromptStep::new("build", StepMode::Once))
            .unwrap();
        assert!(
            builder
                .begin_step(PromptStep::new("build", StepMode::Repeat))
                .is_err()
        );
    }

    #[test]
    fn test_finish_validates() {
        let mut builder = TableBuilder::new();
        builder
            .begin_step(PromptStep::new("build", StepMode::Repeat))
            .unwrap();
        builder
            .add_rule(PromptRule::stop("done", Verdict::Success))
            .unwrap();
        let table = builder.finish().unwrap();
        assert_eq!(table.steps()[0].rules.len(), 1);

        assert!(TableBuilder::new().finish().is_err());
    }
}
