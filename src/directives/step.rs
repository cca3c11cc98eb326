//! [`Step`] directive: opens a new wait stage.
//!
//! Script syntax:
//! - `step "project-setup" once 30s`
//! - `step "build" repeat` (uses the overall timeout)

use crate::directive::{TableBuilder, TableDirective};
use crate::parser::{parse_duration, split_quoted};
use crate::table::{PromptStep, StepMode};
use anyhow::{Result, anyhow};
use std::time::Duration;

pub struct Step {
    pub name: String,
    pub mode: StepMode,
    pub timeout: Option<Duration>,
}

impl Step {
    pub const NAME: &'static str = "step";
}

impl TableDirective for Step {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let (name, rest) = split_quoted(args)?;
        let mut words = rest.split_whitespace();
        let mode = match words.next() {
            Some("once") => StepMode::Once,
            Some("repeat") => StepMode::Repeat,
            Some(other) => return Err(anyhow!("Step mode must be 'once' or 'repeat', got: {other}")),
            None => return Err(anyhow!("Missing step mode after step name")),
        };
        let timeout = words.next().map(parse_duration).transpose()?;
        if let Some(extra) = words.next() {
            return Err(anyhow!("Unexpected argument: {extra}"));
        }
        Ok(Self {
            name,
            mode,
            timeout,
        })
    }

    fn apply(&self, builder: &mut TableBuilder) -> Result<()> {
        let mut step = PromptStep::new(self.name.clone(), self.mode);
        step.timeout = self.timeout;
        builder.begin_step(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_timeout() {
        let step = Step::parse(r#""project-setup" once 30s"#).unwrap();
        assert_eq!(step.name, "project-setup");
        assert_eq!(step.mode, StepMode::Once);
        assert_eq!(step.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_without_timeout() {
        let step = Step::parse(r#""build" repeat"#).unwrap();
        assert_eq!(step.mode, StepMode::Repeat);
        assert_eq!(step.timeout, None);
    }

    #[test]
    fn test_parse_bad_mode() {
        assert!(Step::parse(r#""build" forever"#).is_err());
        assert!(Step::parse(r#""build""#).is_err());
    }

    #[test]
    fn test_parse_trailing_garbage() {
        assert!(Step::parse(r#""build" repeat 5s extra"#).is_err());
    }
}
