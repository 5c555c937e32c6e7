//! The framing state machine: raw bytes in, sink events out.
//!
//! MSRP frames a chunk with a textual end-line that repeats the transaction
//! id of the first line. There is no length header; the end of the body can
//! only be found by scanning for `CRLF "-------" <tid>`, and a prefix of
//! that delimiter may be cut in half by the transport. [`Framer`] deals with
//! both problems: it parses header lines as they complete, streams body
//! bytes out as they arrive, and holds back at most
//! `len(terminator) + 2` bytes that may still turn out to be the start of
//! the end-line.

use std::io;

use msrp_types::{
    header::Header,
    message::{ContFlag, Message},
};

use crate::parse::{self, FirstLineKind};

/// Maximum accepted length of a single line in bytes.
pub const MAX_LINE_LENGTH: usize = 16384;

/// Maximum number of header lines in one chunk.
pub const MAX_HEADER_LINES: usize = 64;

/// Receiver of framing events.
///
/// The framer calls these hooks synchronously, in arrival order, from within
/// [`Framer::feed`]. One chunk produces `chunk_start`, zero or more
/// `body_write`s, and `chunk_end`; bytes the framer cannot make sense of are
/// handed to `illegal_data` and skipped.
pub trait Sink {
    /// A complete chunk header was received: the first line parsed and the
    /// headers are attached to `message` (undecoded). Body bytes follow via
    /// [`Sink::body_write`].
    fn chunk_start(&mut self, message: Message);

    /// Body bytes of the current chunk. `last` is true for the final bytes
    /// before the end-line.
    fn body_write(&mut self, data: &[u8], last: bool);

    /// The end-line of the current chunk was received.
    fn chunk_end(&mut self, flag: ContFlag);

    /// Data the framer could not interpret and dropped. The framer itself
    /// keeps going; closing the connection is the caller's decision.
    fn illegal_data(&mut self, data: &[u8]);

    /// The transport closed; `error` is `None` for a clean shutdown. Any
    /// chunk under reception has been discarded.
    fn connection_lost(&mut self, error: Option<io::Error>);
}

#[derive(Debug)]
enum State {
    /// Line mode, waiting for a first line.
    Idle,
    /// Line mode, accumulating the headers of `message`.
    Headers {
        message: Message,
        /// Raw header bytes, kept for the oversize report.
        raw: Vec<u8>,
        line_count: usize,
    },
    /// Raw mode, scanning for `terminator` (`CRLF "-------" <tid>`).
    Body {
        terminator: Vec<u8>,
        /// Directly behind the blank line, where the end-line of an empty
        /// body appears without a leading CRLF of its own.
        at_start: bool,
    },
}

/// The framing state machine. See the [module docs](self).
#[derive(Debug)]
pub struct Framer {
    state: State,
    buffer: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            buffer: Vec::new(),
        }
    }

    /// Feeds bytes received from the transport, invoking `sink` for every
    /// event they complete. The resulting events do not depend on how the
    /// stream is cut into `feed` calls.
    pub fn feed<S: Sink>(&mut self, data: &[u8], sink: &mut S) {
        self.buffer.extend_from_slice(data);
        loop {
            let progressed = match self.state {
                State::Idle | State::Headers { .. } => self.process_line(sink),
                State::Body { .. } => self.process_body(sink),
            };
            if !progressed {
                break;
            }
        }
    }

    /// The transport closed. In-flight reception state is discarded and the
    /// sink is notified.
    pub fn connection_lost<S: Sink>(&mut self, error: Option<io::Error>, sink: &mut S) {
        self.state = State::Idle;
        self.buffer.clear();
        sink.connection_lost(error);
    }

    /// Takes one CRLF-terminated line out of the buffer. Returns false when
    /// no complete line is available yet.
    fn process_line<S: Sink>(&mut self, sink: &mut S) -> bool {
        let Some(position) = find(&self.buffer, b"\r\n") else {
            if self.buffer.len() > MAX_LINE_LENGTH {
                let data = std::mem::take(&mut self.buffer);
                log::debug!("discarding over-long line ({} bytes)", data.len());
                sink.illegal_data(&data);
                self.state = State::Idle;
            }
            return false;
        };
        let line: Vec<u8> = self.buffer.drain(..position + 2).collect();
        let line = &line[..position];
        if line.len() > MAX_LINE_LENGTH {
            log::debug!("discarding over-long line ({} bytes)", line.len());
            sink.illegal_data(line);
            self.state = State::Idle;
        } else {
            self.handle_line(line, sink);
        }
        true
    }

    fn handle_line<S: Sink>(&mut self, line: &[u8], sink: &mut S) {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => {
                // Stray CRLFs between chunks are tolerated.
                if line.is_empty() {
                    return;
                }
                match message_from_first_line(line) {
                    Some(message) => {
                        let mut raw = line.to_vec();
                        raw.extend_from_slice(b"\r\n");
                        self.state = State::Headers {
                            message,
                            raw,
                            line_count: 0,
                        };
                    }
                    None => {
                        log::debug!("discarding line that is not a chunk start");
                        let mut data = line.to_vec();
                        data.extend_from_slice(b"\r\n");
                        sink.illegal_data(&data);
                    }
                }
            }
            State::Headers {
                mut message,
                mut raw,
                line_count,
            } => {
                if line.is_empty() {
                    // Blank line: the headers are complete, the body follows
                    // in raw mode.
                    let terminator =
                        format!("\r\n-------{}", message.transaction_id()).into_bytes();
                    sink.chunk_start(message);
                    self.state = State::Body {
                        terminator,
                        at_start: true,
                    };
                    return;
                }
                let text = std::str::from_utf8(line).ok();
                if let Some(text) = text {
                    if let Some(flag) = parse::end_line(text, message.transaction_id()) {
                        // A bodyless chunk ends while still in line mode.
                        sink.chunk_start(message);
                        sink.chunk_end(flag);
                        return;
                    }
                }
                raw.extend_from_slice(line);
                raw.extend_from_slice(b"\r\n");
                let line_count = line_count + 1;
                if line_count > MAX_HEADER_LINES {
                    log::debug!("discarding chunk with more than {MAX_HEADER_LINES} header lines");
                    sink.illegal_data(&raw);
                    return;
                }
                // Header lines that do not split (or are not UTF-8) are
                // skipped; reception is lenient here.
                if let Some((name, value)) = text.and_then(|text| text.split_once(": ")) {
                    message.add_header(Header::new(name, value));
                }
                self.state = State::Headers {
                    message,
                    raw,
                    line_count,
                };
            }
            state @ State::Body { .. } => self.state = state,
        }
    }

    /// Scans the buffer for the end-line. Returns false when more data is
    /// needed.
    fn process_body<S: Sink>(&mut self, sink: &mut S) -> bool {
        let State::Body {
            terminator,
            at_start,
        } = &mut self.state
        else {
            return false;
        };
        if *at_start {
            // The blank line's CRLF doubles as the CRLF before the end-line
            // when the body is empty.
            match match_bare_end_line(&self.buffer, &terminator[2..]) {
                StartMatch::EndLine(flag, consumed) => {
                    sink.chunk_end(flag);
                    self.buffer.drain(..consumed);
                    self.state = State::Idle;
                    return true;
                }
                StartMatch::Pending => return false,
                StartMatch::Body => *at_start = false,
            }
        }
        match find_end_line(&self.buffer, terminator) {
            Some((position, flag)) => {
                let consumed = position + terminator.len() + 3;
                if position > 0 {
                    sink.body_write(&self.buffer[..position], true);
                }
                sink.chunk_end(flag);
                self.buffer.drain(..consumed);
                self.state = State::Idle;
                true
            }
            None => {
                // Hold back a buffer suffix that may still be the start of
                // the end-line; everything before it is body data.
                let keep = straddle_len(&self.buffer, terminator);
                let emit = self.buffer.len() - keep;
                if emit > 0 {
                    sink.body_write(&self.buffer[..emit], false);
                    self.buffer.drain(..emit);
                }
                false
            }
        }
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

fn message_from_first_line(line: &[u8]) -> Option<Message> {
    let text = std::str::from_utf8(line).ok()?;
    let (_, first_line) = parse::first_line(text).ok()?;
    match first_line.kind {
        FirstLineKind::Request { method } => {
            Message::request(first_line.transaction_id, method).ok()
        }
        FirstLineKind::Response { code, comment } => {
            Message::response(first_line.transaction_id, code, comment).ok()
        }
    }
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Finds the first complete end-line: `terminator` followed by a legal
/// continuation flag and CRLF. Occurrences followed by anything else are
/// body data; occurrences too close to the end of the buffer to be judged
/// are left alone (the straddle logic takes over).
pub(crate) fn find_end_line(buffer: &[u8], terminator: &[u8]) -> Option<(usize, ContFlag)> {
    let mut from = 0;
    while let Some(offset) = find(&buffer[from..], terminator) {
        let at = from + offset;
        let after = at + terminator.len();
        if buffer.len() < after + 3 {
            return None;
        }
        if let Some(flag) = ContFlag::from_byte(buffer[after]) {
            if &buffer[after + 1..after + 3] == b"\r\n" {
                return Some((at, flag));
            }
        }
        from = at + 1;
    }
    None
}

/// How the bytes at the very start of the body relate to the end-line of an
/// empty body (`"-------" tid flag CRLF`, the blank line's CRLF already
/// consumed).
#[derive(Clone, Copy, Debug)]
pub(crate) enum StartMatch {
    /// A complete end-line; the body is empty. Carries the flag and the
    /// number of bytes the end-line occupies.
    EndLine(ContFlag, usize),
    /// Still a prefix of one; more data is needed.
    Pending,
    /// Diverged; the chunk has a body.
    Body,
}

pub(crate) fn match_bare_end_line(buffer: &[u8], bare: &[u8]) -> StartMatch {
    let head = buffer.len().min(bare.len());
    if buffer[..head] != bare[..head] {
        return StartMatch::Body;
    }
    if buffer.len() <= bare.len() {
        return StartMatch::Pending;
    }
    let Some(flag) = ContFlag::from_byte(buffer[bare.len()]) else {
        return StartMatch::Body;
    };
    match (buffer.get(bare.len() + 1), buffer.get(bare.len() + 2)) {
        (None, _) => StartMatch::Pending,
        (Some(b'\r'), None) => StartMatch::Pending,
        (Some(b'\r'), Some(b'\n')) => StartMatch::EndLine(flag, bare.len() + 3),
        _ => StartMatch::Body,
    }
}

/// Length of the longest buffer suffix that is a prefix of
/// `terminator + flag + CR`, i.e. that may complete into an end-line.
/// Bounded by `terminator.len() + 2`.
fn straddle_len(buffer: &[u8], terminator: &[u8]) -> usize {
    let max = (terminator.len() + 2).min(buffer.len());
    for keep in (1..=max).rev() {
        let tail = &buffer[buffer.len() - keep..];
        let matches = if keep <= terminator.len() {
            tail == &terminator[..keep]
        } else {
            &tail[..terminator.len()] == terminator
                && ContFlag::from_byte(tail[terminator.len()]).is_some()
                && (keep == terminator.len() + 1 || tail[terminator.len() + 1] == b'\r')
        };
        if matches {
            return keep;
        }
    }
    0
}
