//! Line relay from child output streams to the launcher's own stdout/stderr.
//!
//! Each child stream is read by a [`pump`] task that splits it into lines and
//! sends them over a channel; an [`OutputRelay`] drains that channel and writes
//! every line prefixed with `[<name>] `. Reading never waits on writing.

use std::io;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Which of the child's streams a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

/// Splits a byte stream into lines on `\n` or `\r\n`.
///
/// A trailing partial line is held back until the next chunk completes it or
/// [`LineSplitter::finish`] flushes it. Empty lines are dropped.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    /// Feed a chunk and return every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            if let Some(line) = Self::decode(&self.pending[start..end]) {
                lines.push(line);
            }
            start = end + 1;
        }
        self.pending.drain(..start);

        lines
    }

    /// Flush whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        Self::decode(&rest)
    }

    fn decode(raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(raw).into_owned())
    }
}

/// Read `reader` to the end, sending each non-empty line to `tx`.
///
/// Stops early if the receiving relay has gone away.
pub async fn pump<R>(mut reader: R, stream: OutputStream, tx: UnboundedSender<OutputLine>)
where
    R: AsyncRead + Unpin,
{
    let mut splitter = LineSplitter::default();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("Output pump for {stream:?} stopped: {e}");
                break;
            }
        };

        for text in splitter.push(&buf[..read]) {
            if tx.send(OutputLine { stream, text }).is_err() {
                return;
            }
        }
    }

    if let Some(text) = splitter.finish() {
        let _ = tx.send(OutputLine { stream, text });
    }
}

/// Writes lines from one child to a pair of sinks, tagged with the child's name.
pub struct OutputRelay<O, E> {
    prefix: String,
    stdout: O,
    stderr: E,
}

impl<O, E> OutputRelay<O, E>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    pub fn new(name: &str, stdout: O, stderr: E) -> Self {
        Self {
            prefix: format!("[{name}] "),
            stdout,
            stderr,
        }
    }

    pub fn format_line(&self, text: &str) -> String {
        format!("{}{}\n", self.prefix, text)
    }

    /// Drain `lines` until every sender is gone, then hand the sinks back.
    pub async fn run(mut self, mut lines: UnboundedReceiver<OutputLine>) -> io::Result<(O, E)> {
        while let Some(line) = lines.recv().await {
            let formatted = self.format_line(&line.text);
            match line.stream {
                OutputStream::Stdout => {
                    self.stdout.write_all(formatted.as_bytes()).await?;
                    self.stdout.flush().await?;
                }
                OutputStream::Stderr => {
                    self.stderr.write_all(formatted.as_bytes()).await?;
                    self.stderr.flush().await?;
                }
            }
        }

        Ok((self.stdout, self.stderr))
    }
}
