//! [`Stop`] directive: ends the loop when its pattern matches.
//!
//! Script syntax:
//! - `stop "Build finished"`: success verdict
//! - `stop "Build failed" failure`
//! - `stop eof`, `stop timeout`: classified by the sentinel

use crate::directive::{TableBuilder, TableDirective};
use crate::parser::parse_target;
use crate::pattern::Pattern;
use crate::table::{Action, PromptRule, Verdict};
use anyhow::{Result, anyhow};

pub struct Stop {
    pub pattern: Pattern,
    pub verdict: Verdict,
}

impl Stop {
    pub const NAME: &'static str = "stop";
}

impl TableDirective for Stop {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let (pattern, rest) = parse_target(args)?;
        let verdict = match rest {
            "" | "success" => Verdict::Success,
            "failure" => Verdict::Failure,
            other => {
                return Err(anyhow!(
                    "Verdict must be 'success' or 'failure', got: {other}"
                ));
            }
        };
        Ok(Self { pattern, verdict })
    }

    fn apply(&self, builder: &mut TableBuilder) -> Result<()> {
        builder.add_rule(PromptRule::new(
            self.pattern.clone(),
            Action::Stop(self.verdict),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_verdict() {
        let cmd = Stop::parse(r#""Build finished""#).unwrap();
        assert_eq!(cmd.pattern, Pattern::literal("Build finished"));
        assert_eq!(cmd.verdict, Verdict::Success);
    }

    #[test]
    fn test_parse_failure() {
        let cmd = Stop::parse(r#""Build failed" failure"#).unwrap();
        assert_eq!(cmd.verdict, Verdict::Failure);
    }

    #[test]
    fn test_parse_sentinel() {
        assert_eq!(Stop::parse("timeout").unwrap().pattern, Pattern::Timeout);
    }

    #[test]
    fn test_parse_bad_verdict() {
        assert!(Stop::parse(r#""Build failed" maybe"#).is_err());
    }
}
