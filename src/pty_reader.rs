use std::io::Read;
use std::thread;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Spawns a background thread to read from a PTY.
///
/// The returned channel closes once the reader hits end of stream, which is
/// how the controller observes that the build has exited.
pub fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> UnboundedReceiver<Vec<u8>> {
    let (tx, rx) = unbounded_channel();

    thread::spawn(move || {
        let mut buffer = [0u8; 4096];
        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break, // EOF
                Ok(n) => {
                    if tx.send(buffer[..n].to_vec()).is_err() {
                        break; // Receiver dropped
                    }
                }
                // Linux reports EIO on the master once the child side closes.
                Err(_) => break,
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwards_chunks_then_closes() {
        let mut rx = spawn_reader(&b"hello build"[..]);
        let mut collected = Vec::new();
        while let Some(chunk) = rx.recv().await {
            collected.extend_from_slice(&chunk);
        }
        assert_eq!(collected, b"hello build");
    }
}
