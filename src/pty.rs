use crate::command::BuildCommand;
use crate::handle::ProcessHandle;
use anyhow::{Context, Result};
use async_trait::async_trait;
use portable_pty::{Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

/// Manages a build running inside a PTY
pub struct PtySession {
    // Dropping the master hangs up the terminal, so it lives as long as the session.
    _master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    writer: Box<dyn Write + Send>,
}

impl PtySession {
    /// Spawn the build in a PTY, returning the session and reader separately.
    ///
    /// The PTY merges the child's stdout and stderr into the one reader.
    pub fn spawn(command: &BuildCommand) -> Result<(Self, Box<dyn Read + Send>)> {
        let pty_system = portable_pty::native_pty_system();

        // Wide enough that the build tool does not wrap its prompts mid-phrase.
        let pty_size = PtySize {
            rows: 24,
            cols: 200,
            pixel_width: 0,
            pixel_height: 0,
        };

        let pair = pty_system
            .openpty(pty_size)
            .context("Failed to open PTY")?;

        let mut cmd = CommandBuilder::new(&command.program);
        for arg in &command.args {
            cmd.arg(arg);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &command.cwd {
            cmd.cwd(dir);
        }

        let child = pair
            .slave
            .spawn_command(cmd)
            .with_context(|| format!("Failed to spawn command: {}", command.display()))?;

        let writer = pair
            .master
            .take_writer()
            .context("Failed to get PTY writer")?;

        let reader = pair
            .master
            .try_clone_reader()
            .context("Failed to get PTY reader")?;

        debug!(pid = ?child.process_id(), command = %command.display(), "spawned build");

        let session = PtySession {
            _master: pair.master,
            child,
            writer,
        };

        Ok((session, reader))
    }

    /// Check if the child process is still running
    fn is_running(&mut self) -> bool {
        self.child.try_wait().ok().flatten().is_none()
    }
}

#[async_trait(?Send)]
impl ProcessHandle for PtySession {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.writer
            .write_all(data)
            .context("Failed to write to build input")?;
        self.writer.flush()?;
        Ok(())
    }

    async fn close(&mut self, grace: Duration) -> Result<Option<u32>> {
        let deadline = Instant::now() + grace;
        while self.is_running() && Instant::now() < deadline {
            sleep(Duration::from_millis(50)).await;
        }

        if self.is_running() {
            warn!("build still running after {:?}, killing it", grace);
            if let Err(e) = self.child.kill() {
                // The child may have exited between the check and the kill.
                debug!("kill failed: {e}");
            }
        }

        let status = self.child.wait().context("Failed to reap build process")?;
        Ok(Some(status.exit_code()))
    }
}
