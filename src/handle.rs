//! The [`ProcessHandle`] trait: what the controller needs from a running build.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A spawned build process, exclusively owned by the controller.
///
/// Output does not flow through this trait. It arrives on the channel
/// returned alongside the handle (see [`crate::pty_reader::spawn_reader`]),
/// so a handle only needs to accept input and be released.
#[async_trait(?Send)]
pub trait ProcessHandle {
    /// Write raw bytes to the process's input.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Write `line` followed by a newline.
    fn send_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        self.write(&bytes)
    }

    /// Release the process: give it up to `grace` to exit on its own, then
    /// kill it, then reap it.
    ///
    /// Returns the exit code when the platform reports one. Called exactly
    /// once by the controller.
    async fn close(&mut self, grace: Duration) -> Result<Option<u32>>;
}
