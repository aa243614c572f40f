//! Async stream log readers (non-UTF8-safe).
//!
//! Python tooling can emit non-UTF8 bytes on stdout/stderr (progress bars,
//! partial multibyte writes). `BufReader::lines()` would end the reader on
//! the first invalid byte, so lines are read as bytes and decoded lossily.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;
use ttsdesk_core::{LogLine, LogStream, SupervisorEvent, SupervisorEventSender};

/// Forward every line of `stream` to `events` as a [`SupervisorEvent::Log`].
///
/// The task ends at EOF, on a read error, or once the receiver is gone.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    port: u16,
    kind: LogStream,
    events: SupervisorEventSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    debug!(port = %port, stream = kind.as_str(), "{line}");
                    if events
                        .send(SupervisorEvent::Log(LogLine::new(kind, line)))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    debug!(port = %port, stream = kind.as_str(), error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(port = %port, stream = kind.as_str(), "log stream reader task exiting");
    })
}
