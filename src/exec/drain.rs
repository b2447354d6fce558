// src/exec/drain.rs

//! Line-by-line draining of a child's output pipe.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::exec::{ExecutionEvent, OutputLine, StreamSource};
use crate::types::TextEncoding;

/// Read `pipe` to end-of-stream, emitting one `Line` event per line.
///
/// Returns the number of lines read. If the event receiver goes away the
/// pipe is still read to the end (so the child never blocks on a full pipe)
/// but nothing more is sent.
pub async fn drain<R>(
    pipe: Option<R>,
    source: StreamSource,
    encoding: TextEncoding,
    events: &mpsc::Sender<ExecutionEvent>,
) -> usize
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return 0;
    };

    let mut reader = BufReader::new(pipe);
    let mut buf = Vec::new();
    let mut count = 0;
    let mut forwarding = true;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                count += 1;
                let text = encoding.decode(trim_line_ending(&buf));
                trace!(?source, line = %text, "output line");

                if forwarding
                    && events
                        .send(ExecutionEvent::Line(OutputLine::new(source, text)))
                        .await
                        .is_err()
                {
                    debug!(?source, "event receiver dropped; discarding further output");
                    forwarding = false;
                }
            }
            Err(e) => {
                warn!(?source, error = %e, "reading child output failed; stopping this stream");
                break;
            }
        }
    }

    count
}

/// Strip one trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &'static [u8], encoding: TextEncoding) -> (usize, Vec<String>) {
        let (tx, mut rx) = mpsc::channel(16);
        let count = drain(Some(input), StreamSource::Stdout, encoding, &tx).await;
        drop(tx);

        let mut lines = Vec::new();
        while let Some(ExecutionEvent::Line(line)) = rx.recv().await {
            assert_eq!(line.source, StreamSource::Stdout);
            lines.push(line.text);
        }
        (count, lines)
    }

    #[tokio::test]
    async fn splits_lines_and_strips_terminators() {
        let (count, lines) = collect(b"one\r\ntwo\n\nlast", TextEncoding::Auto).await;
        assert_eq!(count, 4);
        assert_eq!(lines, vec!["one", "two", "", "last"]);
    }

    #[tokio::test]
    async fn malformed_bytes_are_replaced() {
        let enc = TextEncoding::Explicit(encoding_rs::UTF_8);
        let (_, lines) = collect(b"a\xffb\n", enc).await;
        assert_eq!(lines, vec!["a\u{FFFD}b"]);
    }

    #[tokio::test]
    async fn keeps_counting_after_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let count = drain(Some(&b"x\ny\nz\n"[..]), StreamSource::Stderr, TextEncoding::Auto, &tx).await;
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn missing_pipe_reads_nothing() {
        let (tx, _rx) = mpsc::channel(1);
        let count = drain(None::<&[u8]>, StreamSource::Stdout, TextEncoding::Auto, &tx).await;
        assert_eq!(count, 0);
    }
}
