//! # guided-build
//!
//! Runs an interactive build command unattended by answering its prompts.
//!
//! The build is spawned on a pseudo-terminal. Its output is matched against
//! a [`PromptTable`]: an ordered list of steps, each holding literal
//! patterns and what to do when one appears. The controller can send a
//! scripted line, log a status message, or stop. Every byte the build prints
//! is copied to a [`Transcript`], and the run ends with a [`BuildOutcome`].
//!
//! ## Quick start
//!
//! ```no_run
//! use guided_build::{BuildCommand, Transcript, eas, run_guided_build};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let command = BuildCommand::new(eas::DEFAULT_PROGRAM)
//!         .args(eas::build_args("android", "production"))
//!         .env(eas::TOKEN_VAR, "my-token");
//!
//!     let outcome = run_guided_build(
//!         &command,
//!         &eas::default_table()?,
//!         Duration::from_secs(600),
//!         Transcript::create("build_log.txt")?,
//!     )
//!     .await?;
//!
//!     println!("{}", outcome.kind);
//!     Ok(())
//! }
//! ```
//!
//! ## Prompt tables
//!
//! [`eas::default_table`] covers `eas build`. Other tables can be written
//! in code with [`PromptStep`] and [`PromptRule`], or loaded from a file
//! with [`parse_file`]:
//!
//! | Line | Meaning |
//! |------|---------|
//! | `step "name" once 30s` | Start a step; advance after its first non-terminal match |
//! | `step "name" repeat` | Start a step; keep waiting after non-terminal matches |
//! | `respond "prompt" "y"` | Send `y` and a newline when `prompt` appears |
//! | `respond timeout ""` | Send an empty line when the wait times out |
//! | `log "text"` / `log eof` / `log timeout` | Report and keep going |
//! | `stop "text" failure` | End the run (`success` is the default verdict) |
//! | `# comment` | Full-line or inline comment |
//!
//! Within a step the literal that appears earliest in the output wins. When
//! two literals start at the same place, the one listed first wins. `eof`
//! and `timeout` only apply when no literal matched, and in a `repeat` step
//! they must `stop`.
//!
//! ## Driving a custom process
//!
//! [`Controller::new`] accepts any [`ProcessHandle`] and an output channel,
//! so the loop can run against something other than a PTY.

pub mod command;
pub mod controller;
pub mod directive;
pub mod directives;
pub mod eas;
pub mod handle;
pub mod logging;
pub mod outcome;
pub mod parser;
pub mod pattern;
pub(crate) mod pty;
pub mod pty_reader;
pub mod table;
pub mod transcript;

pub use command::BuildCommand;
pub use controller::{Controller, run_guided_build};
pub use handle::ProcessHandle;
pub use outcome::{BuildOutcome, OutcomeKind};
pub use parser::{parse_file, parse_str};
pub use pattern::Pattern;
pub use table::{Action, PromptRule, PromptStep, PromptTable, StepMode, Verdict};
pub use transcript::Transcript;
