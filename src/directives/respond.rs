//! [`Respond`] directive: answers a prompt with a line of input.
//!
//! Script syntax:
//! - `respond "Would you like to create a project" "y"`
//! - `respond timeout ""`: send an empty line when the wait times out

use crate::directive::{TableBuilder, TableDirective};
use crate::parser::{parse_quoted_string, parse_target};
use crate::pattern::Pattern;
use crate::table::{Action, PromptRule};
use anyhow::{Result, anyhow};

/// Sends `line` followed by a newline when `pattern` matches.
pub struct Respond {
    pub pattern: Pattern,
    pub line: String,
}

impl Respond {
    pub const NAME: &'static str = "respond";
}

impl TableDirective for Respond {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn parse(args: &str) -> Result<Self> {
        let (pattern, rest) = parse_target(args)?;
        if rest.is_empty() {
            return Err(anyhow!("Missing quoted response after pattern"));
        }
        Ok(Self {
            pattern,
            line: parse_quoted_string(rest)?,
        })
    }

    fn apply(&self, builder: &mut TableBuilder) -> Result<()> {
        builder.add_rule(PromptRule::new(
            self.pattern.clone(),
            Action::Respond(self.line.clone()),
        ))
    }
}
