//! [`Log`] directive: reports a status message and keeps waiting.
//!
//! Script syntax: `log "Waiting for build"`, `log eof`, `log timeout`

use crate::directive::{TableBuilder, TableDirective};
use crate::parser::parse_target;
use crate::pattern::Pattern;
use crate::table::{Action, PromptRule};
use anyhow::{Result, anyhow};

pub struct Log {
    pub pattern: Pattern,
}

impl Log {
    pub const NAME: &'static str = "log";
}

impl TableDirective for Log {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let (pattern, rest) = parse_target(args)?;
        if !rest.is_empty() {
            return Err(anyhow!("Unexpected argument: {rest}"));
        }
        Ok(Self { pattern })
    }

    fn apply(&self, builder: &mut TableBuilder) -> Result<()> {
        builder.add_rule(PromptRule::new(self.pattern.clone(), Action::Log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            Log::parse(r#""Waiting for build""#).unwrap().pattern,
            Pattern::literal("Waiting for build")
        );
        assert_eq!(Log::parse("eof").unwrap().pattern, Pattern::Eof);
    }

    #[test]
    fn test_parse_extra_argument() {
        assert!(Log::parse(r#""Waiting" "y""#).is_err());
    }
}
