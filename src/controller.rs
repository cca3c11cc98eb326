//! The expect/respond loop.
//!
//! A [`Controller`] owns one running build. [`Controller::run`] walks a
//! [`PromptTable`] step by step: it waits until one of the step's patterns
//! shows up in the output, applies the rule's [`Action`], and either moves
//! on, waits again, or stops. The process is released on every exit path.

use crate::command::BuildCommand;
use crate::handle::ProcessHandle;
use crate::outcome::{BuildOutcome, OutcomeKind};
use crate::pattern::{OutputBuffer, Pattern};
use crate::pty::PtySession;
use crate::pty_reader::spawn_reader;
use crate::table::{Action, PromptRule, PromptStep, PromptTable, StepMode, Verdict};
use crate::transcript::Transcript;
use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};

type OutputHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;
type StatusHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// Pause after sending a response, before the next wait.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(2);
/// How long a released build may take to exit before it is killed.
pub const DEFAULT_CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Spawn `command` on a PTY and drive it through `table`.
///
/// `overall_timeout` bounds every wait whose step has no timeout of its own.
///
/// # Errors
///
/// Only when the command cannot be started. Everything that goes wrong after
/// that is reported through the returned [`BuildOutcome`].
pub async fn run_guided_build(
    command: &BuildCommand,
    table: &PromptTable,
    overall_timeout: Duration,
    transcript: Transcript,
) -> Result<BuildOutcome> {
    let controller = Controller::spawn(command, transcript)?;
    Ok(controller.run(table, overall_timeout).await)
}

/// What ended one wait.
struct Observation<'s> {
    pattern: Pattern,
    /// `None` for a sentinel the step does not list.
    rule: Option<&'s PromptRule>,
    before: String,
}

/// Drives a single build process through a prompt table.
pub struct Controller {
    handle: Option<Box<dyn ProcessHandle>>,
    output_rx: UnboundedReceiver<Vec<u8>>,
    buffer: OutputBuffer,
    transcript: Transcript,
    output_handler: Option<OutputHandler>,
    status_handler: StatusHandler,
    eof: bool,
    settle: Duration,
    close_grace: Duration,
    responses_sent: usize,
}

impl Controller {
    /// Wrap an already running process and the channel carrying its output.
    pub fn new(
        handle: Box<dyn ProcessHandle>,
        output_rx: UnboundedReceiver<Vec<u8>>,
        transcript: Transcript,
    ) -> Self {
        Controller {
            handle: Some(handle),
            output_rx,
            buffer: OutputBuffer::new(),
            transcript,
            output_handler: None,
            status_handler: Arc::new(|line| println!("{line}")),
            eof: false,
            settle: DEFAULT_SETTLE,
            close_grace: DEFAULT_CLOSE_GRACE,
            responses_sent: 0,
        }
    }

    /// Start `command` in a PTY.
    pub fn spawn(command: &BuildCommand, transcript: Transcript) -> Result<Self> {
        let (session, reader) = PtySession::spawn(command)?;
        let output_rx = spawn_reader(reader);
        info!(command = %command.display(), "build started");
        Ok(Self::new(Box::new(session), output_rx, transcript))
    }

    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn close_grace(mut self, grace: Duration) -> Self {
        self.close_grace = grace;
        self
    }

    /// Mirror the build's output to stdout as it arrives.
    pub fn echo(self) -> Self {
        self.with_output_handler(|data| {
            let mut stdout = io::stdout();
            if let Err(e) = stdout.write_all(data).and_then(|()| stdout.flush()) {
                debug!("echo to stdout failed: {e}");
            }
        })
    }

    /// Pass every output chunk to `handler` as well as the transcript.
    pub fn with_output_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.output_handler = Some(Arc::new(handler));
        self
    }

    /// Send status lines (`Status: ...`, `Responding ...`) to `handler`
    /// instead of stdout.
    pub fn with_status_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.status_handler = Arc::new(handler);
        self
    }

    /// Run the loop to completion and release the process.
    pub async fn run(mut self, table: &PromptTable, overall_timeout: Duration) -> BuildOutcome {
        let mut outcome = match self.drive(table, overall_timeout).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Error during build: {e:#}");
                self.buffer.finish();
                BuildOutcome::errored(&e, self.buffer.take_all())
            }
        };
        outcome.responses_sent = self.responses_sent;
        outcome.exit_code = self.release().await;
        info!(
            outcome = %outcome.kind,
            matched = ?outcome.matched.as_ref().map(ToString::to_string),
            responses = outcome.responses_sent,
            transcript_bytes = self.transcript.bytes_written(),
            "build loop ended"
        );
        outcome
    }

    async fn drive(&mut self, table: &PromptTable, overall_timeout: Duration) -> Result<BuildOutcome> {
        let mut index = 0;
        // A validated table ends in a repeating step, so this only exits by returning.
        while let Some(step) = table.steps().get(index) {
            let timeout = step.timeout.unwrap_or(overall_timeout);
            debug!(step = %step.name, ?timeout, "waiting");
            let observed = self.wait_step(step, timeout).await?;

            let Some(rule) = observed.rule else {
                info!(step = %step.name, pattern = %observed.pattern, "unhandled sentinel, stopping");
                return Ok(terminal(observed.pattern, Verdict::Success, observed.before));
            };

            match &rule.action {
                Action::Stop(verdict) => {
                    info!(step = %step.name, pattern = %observed.pattern, "stop pattern matched");
                    return Ok(terminal(observed.pattern, *verdict, observed.before));
                }
                Action::Log => {
                    (self.status_handler)(&format!("Status: {}", last_line(&observed.before)));
                    debug!(step = %step.name, pattern = %observed.pattern, before = %observed.before, "status");
                }
                Action::Respond(line) => {
                    (self.status_handler)(&format!("Responding {line:?} to {}...", observed.pattern));
                    debug!(step = %step.name, pattern = %observed.pattern, "responding");
                    self.respond(line).await?;
                }
            }

            if step.mode == StepMode::Once {
                index += 1;
            }
        }
        anyhow::bail!("Prompt table ran out of steps")
    }

    async fn respond(&mut self, line: &str) -> Result<()> {
        let handle = self
            .handle
            .as_mut()
            .context("Build process already released")?;
        handle.send_line(line).context("Failed to send response")?;
        self.responses_sent += 1;
        // Give the program a moment to process the input.
        sleep(self.settle).await;
        Ok(())
    }

    /// Block until one of `step`'s patterns matches, the output ends, or
    /// `timeout` elapses.
    async fn wait_step<'s>(
        &mut self,
        step: &'s PromptStep,
        timeout: Duration,
    ) -> Result<Observation<'s>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some((index, before)) = self.buffer.take_first_match(step.patterns()) {
                let rule = &step.rules[index];
                return Ok(Observation {
                    pattern: rule.pattern.clone(),
                    rule: Some(rule),
                    before,
                });
            }
            if self.eof {
                return Ok(self.sentinel(step, Pattern::Eof));
            }
            // Checked before receiving so a chatty build cannot outlive the deadline.
            if Instant::now() >= deadline {
                return Ok(self.sentinel(step, Pattern::Timeout));
            }

            match timeout_at(deadline, self.output_rx.recv()).await {
                Ok(Some(chunk)) => self.ingest(&chunk)?,
                Ok(None) => {
                    debug!("build output closed");
                    self.eof = true;
                    self.buffer.finish();
                }
                Err(_) => return Ok(self.sentinel(step, Pattern::Timeout)),
            }
        }
    }

    /// Sentinels leave the buffer in place so the next step still sees it.
    fn sentinel<'s>(&self, step: &'s PromptStep, pattern: Pattern) -> Observation<'s> {
        Observation {
            rule: step.sentinel_rule(&pattern),
            pattern,
            before: self.buffer.as_str().to_string(),
        }
    }

    fn ingest(&mut self, chunk: &[u8]) -> Result<()> {
        self.transcript.append(chunk)?;
        if let Some(handler) = &self.output_handler {
            handler(chunk);
        }
        self.buffer.push(chunk);
        debug!(bytes = chunk.len(), "output");
        Ok(())
    }

    async fn release(&mut self) -> Option<u32> {
        let mut handle = self.handle.take()?;
        match handle.close(self.close_grace).await {
            Ok(code) => {
                debug!(?code, "build process released");
                code
            }
            Err(e) => {
                warn!("Failed to release build process: {e:#}");
                None
            }
        }
    }
}

fn terminal(pattern: Pattern, verdict: Verdict, before: String) -> BuildOutcome {
    let kind = match (&pattern, verdict) {
        (Pattern::Eof, _) => OutcomeKind::ProcessExited,
        (Pattern::Timeout, _) => OutcomeKind::TimedOut,
        (Pattern::Literal(_), Verdict::Success) => OutcomeKind::Completed,
        (Pattern::Literal(_), Verdict::Failure) => OutcomeKind::BuildFailed,
    };
    BuildOutcome::new(kind, Some(pattern), before)
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}
