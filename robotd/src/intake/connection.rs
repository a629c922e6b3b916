// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::io;
use std::net::{SocketAddr, TcpStream};

use async_channel::Sender;
use async_io::Async;
use futures::io::BufReader;
use futures::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};
use log::{debug, info, warn};
use robot_protocol::{parse_instruction, CommandType, Reply};

use crate::intake::shutdown::ShutdownTrigger;
use crate::mailbox::{Mailbox, Rejected};

pub const SHUTTING_DOWN: &str = "server is shutting down";
pub const LINE_TOO_LONG: &str = "line too long";

/// Longest request line accepted, without its line terminator.
pub const MAX_LINE_LEN: usize = 4096;

/// Whether the connection keeps reading after a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Close,
}

/// Handles one request line and returns the reply for it.
///
/// Parse errors never touch the mailbox. A SHUTDOWN line fires `trigger`
/// instead of being queued. Once the hub is shutting down every line is
/// refused and the connection is closed.
pub fn handle_line(line: &str, mailbox: &Mailbox, trigger: &ShutdownTrigger) -> (Reply, Flow) {
    if !mailbox.is_active() {
        return (Reply::error(SHUTTING_DOWN), Flow::Close);
    }

    let instruction = match parse_instruction(line) {
        Ok(instruction) => instruction,
        Err(err) => {
            warn!("Invalid message received: {err}");
            return (Reply::error(err.to_string()), Flow::Continue);
        }
    };

    if instruction.command() == CommandType::Shutdown {
        trigger.trigger();
        return (Reply::ok("shutting down server"), Flow::Close);
    }

    let target_id = instruction.target_id();
    match mailbox.put(instruction) {
        Ok(()) => (
            Reply::ok(format!("instruction accepted for robot {target_id}")),
            Flow::Continue,
        ),
        Err(Rejected(instruction)) => {
            debug!("Dropping {instruction}, mailbox already shut down");
            (Reply::error(SHUTTING_DOWN), Flow::Close)
        }
    }
}

/// Reply for a line longer than [`MAX_LINE_LEN`]. The rest of the line has
/// already been skipped, so the connection stays usable.
fn oversized_line(mailbox: &Mailbox) -> (Reply, Flow) {
    if !mailbox.is_active() {
        return (Reply::error(SHUTTING_DOWN), Flow::Close);
    }
    (Reply::error(LINE_TOO_LONG), Flow::Continue)
}

enum ReadLine {
    Line(String),
    TooLong,
    Eof,
}

/// Reads one `\n` terminated line of at most [`MAX_LINE_LEN`] bytes. Bytes
/// that are not valid UTF-8 are replaced, so they end up as a parse error or
/// as part of the params instead of killing the connection.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<ReadLine>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_LINE_LEN as u64 + 2;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(ReadLine::Eof);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() as u64 == limit {
        skip_line(reader).await?;
        return Ok(ReadLine::TooLong);
    }

    if buf.len() > MAX_LINE_LEN {
        return Ok(ReadLine::TooLong);
    }
    Ok(ReadLine::Line(String::from_utf8_lossy(buf).into_owned()))
}

/// Discards input up to and including the next `\n`.
async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let (used, done) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        reader.consume_unpin(used);
        if done {
            return Ok(());
        }
    }
}

/// Serves one client until it disconnects or the flow says to close.
/// `_open` is held for the lifetime of the connection so the server can tell
/// when the last one is gone.
pub async fn serve_connection(
    stream: Async<TcpStream>,
    peer: SocketAddr,
    mailbox: Mailbox,
    trigger: ShutdownTrigger,
    _open: Sender<()>,
) {
    let mut reader = BufReader::new(&stream);
    let mut writer = &stream;
    let mut buf = Vec::new();

    loop {
        let (reply, flow) = match read_line(&mut reader, &mut buf).await {
            Ok(ReadLine::Line(line)) => {
                let (reply, flow) = handle_line(&line, &mailbox, &trigger);
                debug!("{peer}: {line:?} -> {reply}");
                (reply, flow)
            }
            Ok(ReadLine::TooLong) => {
                warn!("Client {peer} sent a line longer than {MAX_LINE_LEN} bytes");
                oversized_line(&mailbox)
            }
            Ok(ReadLine::Eof) => break,
            Err(err) => {
                info!("Client {peer} disconnected: {err}");
                break;
            }
        };

        if let Err(err) = writer.write_all(format!("{reply}\n").as_bytes()).await {
            info!("Client {peer} disconnected: {err}");
            break;
        }
        if flow == Flow::Close {
            break;
        }
    }

    debug!("Connection to {peer} closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn lines(mut input: &[u8]) -> Vec<String> {
        let mut buf = Vec::new();
        let mut out = Vec::new();
        loop {
            match block_on(read_line(&mut input, &mut buf)).unwrap() {
                ReadLine::Line(line) => out.push(line),
                ReadLine::TooLong => out.push("<too long>".to_string()),
                ReadLine::Eof => return out,
            }
        }
    }

    #[test]
    fn test_read_line_strips_terminators() {
        assert_eq!(lines(b"1|MOVE|10\r\n2|TURN\nlast"), ["1|MOVE|10", "2|TURN", "last"]);
    }

    #[test]
    fn test_read_line_replaces_invalid_utf8() {
        assert_eq!(lines(b"1|MOVE|\xff\xfe\n"), ["1|MOVE|\u{fffd}\u{fffd}"]);
    }

    #[test]
    fn test_read_line_length_limit() {
        let fits = "a".repeat(MAX_LINE_LEN);
        let over = "b".repeat(MAX_LINE_LEN + 1);
        let far_over = "c".repeat(3 * MAX_LINE_LEN);
        let input = format!("{fits}\r\n{over}\n{far_over}\n1|STATUS\n");

        assert_eq!(
            lines(input.as_bytes()),
            [fits.as_str(), "<too long>", "<too long>", "1|STATUS"]
        );
    }
}
