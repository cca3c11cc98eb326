//! The built-in prompt table for `eas build`.
//!
//! These are literal fragments of the EAS CLI's console text. When the CLI
//! rewords a message, update the constant here; nothing else depends on the
//! wording.

use crate::pattern::Pattern;
use crate::table::{Action, PromptRule, PromptStep, PromptTable, StepMode, Verdict};
use anyhow::{Context as _, Result};
use std::time::Duration;

pub const PROJECT_PROMPT: &str = "Would you like to automatically create an EAS project";
/// Older CLI releases ask this instead.
pub const PROJECT_PROMPT_ALT: &str = "Would you like to create a project";
pub const REMOTE_CREDENTIALS: &str = "Using remote Android credentials";
pub const WAITING_FOR_BUILD: &str = "Waiting for build";
pub const BUILD_FAILED: &str = "Build failed";
pub const BUILD_FINISHED: &str = "Build finished";

/// Answer to the project-creation prompt.
pub const AFFIRMATIVE: &str = "y";

/// The project prompt only appears for unlinked projects, so its wait is short.
pub const PROJECT_STEP_TIMEOUT: Duration = Duration::from_secs(30);
/// Default bound on each wait of the build step.
pub const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(600);

pub const DEFAULT_PROGRAM: &str = "./node_modules/.bin/eas";
pub const DEFAULT_PLATFORM: &str = "android";
pub const DEFAULT_PROFILE: &str = "production";
/// Variable the EAS CLI reads its access token from.
pub const TOKEN_VAR: &str = "EXPO_TOKEN";

/// The two-step table for `eas build`.
///
/// 1. `project-setup` (once, 30 s): answer the project-creation prompt if it
///    appears. The credentials notice, end of output or the short timeout all
///    just move on.
/// 2. `build` (repeat): report progress until the build finishes or fails.
///
/// Only the first step ever writes to the build.
pub fn default_table() -> Result<PromptTable> {
    let setup = PromptStep::new("project-setup", StepMode::Once)
        .with_timeout(PROJECT_STEP_TIMEOUT)
        .rule(PromptRule::respond(PROJECT_PROMPT, AFFIRMATIVE))
        .rule(PromptRule::respond(PROJECT_PROMPT_ALT, AFFIRMATIVE))
        .rule(PromptRule::log(REMOTE_CREDENTIALS))
        .rule(PromptRule::new(Pattern::Eof, Action::Log))
        .rule(PromptRule::new(Pattern::Timeout, Action::Log));

    let build = PromptStep::new("build", StepMode::Repeat)
        .rule(PromptRule::log(REMOTE_CREDENTIALS))
        .rule(PromptRule::log(WAITING_FOR_BUILD))
        .rule(PromptRule::stop(BUILD_FAILED, Verdict::Failure))
        .rule(PromptRule::stop(BUILD_FINISHED, Verdict::Success))
        .rule(PromptRule::new(Pattern::Eof, Action::Stop(Verdict::Failure)))
        .rule(PromptRule::new(Pattern::Timeout, Action::Stop(Verdict::Failure)));

    PromptTable::new(vec![setup, build]).context("Built-in EAS prompt table is invalid")
}

/// Arguments for `eas build` on `platform` with build `profile`.
pub fn build_args(platform: &str, profile: &str) -> Vec<String> {
    ["build", "--platform", platform, "--profile", profile]
        .into_iter()
        .map(String::from)
        .collect()
}
