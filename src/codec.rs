//! # Parsing of complete chunks
//!
//! [`Decode`] is the counterpart of
//! [`Encode`](msrp_types::codec::Encode): it parses one complete chunk
//! (first line through end-line) out of a byte slice and returns the
//! remainder. It is meant for tests, tools, and situations where whole
//! chunks are already at hand; a live byte stream should go through the
//! [`Framer`](crate::framer::Framer) instead, which handles partial input
//! and streams body data.
//!
//! ## Example
//!
//! ```rust
//! use msrp_codec::codec::Decode;
//! use msrp_types::message::Message;
//!
//! let input = b"MSRP d93kswow 200 OK\r\n-------d93kswow$\r\n";
//! let (remainder, message) = Message::decode(input).unwrap();
//!
//! assert!(remainder.is_empty());
//! assert_eq!(message.code(), Some(200));
//! ```

use std::str::from_utf8;

use msrp_types::{header::Header, message::Message};

use crate::{
    framer::{find, find_end_line, match_bare_end_line, StartMatch},
    parse::{self, FirstLineKind},
};

pub trait Decode: Sized {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// More data is needed.
    Incomplete,

    /// Decoding failed.
    Failed,
}

fn next_line<'a>(rest: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let position = find(rest, b"\r\n").ok_or(DecodeError::Incomplete)?;
    let line = from_utf8(&rest[..position]).map_err(|_| DecodeError::Failed)?;
    *rest = &rest[position + 2..];
    Ok(line)
}

impl Decode for Message {
    fn decode(input: &[u8]) -> Result<(&[u8], Self), DecodeError> {
        let mut rest = input;

        let line = next_line(&mut rest)?;
        let (_, first_line) = parse::first_line(line).map_err(|_| DecodeError::Failed)?;
        let mut message = match first_line.kind {
            FirstLineKind::Request { method } => {
                Message::request(first_line.transaction_id, method)
            }
            FirstLineKind::Response { code, comment } => {
                Message::response(first_line.transaction_id, code, comment)
            }
        }
        .map_err(|_| DecodeError::Failed)?;

        loop {
            let line = next_line(&mut rest)?;
            if line.is_empty() {
                // Blank line: the body follows.
                break;
            }
            if let Some(flag) = parse::end_line(line, message.transaction_id()) {
                message.set_contflag(flag);
                return Ok((rest, message));
            }
            // Lines without the separator are skipped, as on live reception.
            if let Some((name, value)) = line.split_once(": ") {
                message.add_header(Header::new(name, value));
            }
        }

        let terminator = format!("\r\n-------{}", message.transaction_id()).into_bytes();
        // The blank line's CRLF doubles as the CRLF before the end-line when
        // the body is empty.
        match match_bare_end_line(rest, &terminator[2..]) {
            StartMatch::EndLine(flag, consumed) => {
                message.set_contflag(flag);
                return Ok((&rest[consumed..], message));
            }
            StartMatch::Pending => return Err(DecodeError::Incomplete),
            StartMatch::Body => {}
        }
        let (position, flag) =
            find_end_line(rest, &terminator).ok_or(DecodeError::Incomplete)?;
        message.set_data(&rest[..position]);
        message.set_contflag(flag);
        Ok((&rest[position + terminator.len() + 3..], message))
    }
}

#[cfg(test)]
mod tests {
    use msrp_types::{
        codec::Encode,
        header::{ByteRange, Header},
        message::ContFlag,
        uri::Uri,
    };

    use super::*;

    fn send_request() -> Message {
        let mut message = Message::request("d93kswow", "SEND").unwrap();
        message.add_header(Header::new(
            "To-Path",
            "msrp://bob.example.com:8888/9di4eae923wzd;tcp",
        ));
        message.add_header(Header::new(
            "From-Path",
            "msrp://alice.example.com:7777/iau39soe2843z;tcp",
        ));
        message.add_header(Header::message_id("12339sdqwer"));
        message
    }

    #[test]
    fn test_decode_without_body() {
        let input = b"MSRP d93kswow SEND\r\n\
            To-Path: msrp://bob.example.com:8888/9di4eae923wzd;tcp\r\n\
            From-Path: msrp://alice.example.com:7777/iau39soe2843z;tcp\r\n\
            Message-ID: 12339sdqwer\r\n\
            -------d93kswow$\r\n???";

        let (remainder, message) = Message::decode(input).unwrap();
        assert_eq!(remainder, b"???");
        assert_eq!(message, send_request());
    }

    #[test]
    fn test_decode_empty_body_after_blank_line() {
        let input = b"MSRP d93kswow SEND\r\n\
            To-Path: msrp://bob.example.com:8888/9di4eae923wzd;tcp\r\n\
            From-Path: msrp://alice.example.com:7777/iau39soe2843z;tcp\r\n\
            Message-ID: 12339sdqwer\r\n\
            Byte-Range: 1-0/0\r\n\
            \r\n\
            -------d93kswow$\r\n???";

        let (remainder, message) = Message::decode(input).unwrap();
        assert_eq!(remainder, b"???");
        assert!(message.data().is_empty());
        assert_eq!(message.contflag(), ContFlag::End);
        assert_eq!(message.headers().len(), 4);
    }

    #[test]
    fn test_decode_with_body() {
        let input = b"MSRP d93kswow SEND\r\n\
            To-Path: msrp://bob.example.com:8888/9di4eae923wzd;tcp\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            Hello world!\r\n\
            -------d93kswow+\r\n";

        let (remainder, message) = Message::decode(input).unwrap();
        assert!(remainder.is_empty());
        assert_eq!(message.data(), b"Hello world!");
        assert_eq!(message.contflag(), ContFlag::More);
        assert_eq!(
            message.content_type().unwrap().as_deref(),
            Some("text/plain")
        );
    }

    #[test]
    fn test_decode_incomplete_failed() {
        let tests = [
            (b"".as_ref(), DecodeError::Incomplete),
            (b"MSRP".as_ref(), DecodeError::Incomplete),
            (b"MSRP d93kswow SEND".as_ref(), DecodeError::Incomplete),
            (b"MSRP d93kswow SEND\r".as_ref(), DecodeError::Incomplete),
            (b"MSRP d93kswow SEND\r\n".as_ref(), DecodeError::Incomplete),
            (
                b"MSRP d93kswow SEND\r\nContent-Type: text/plain\r\n\r\nHello".as_ref(),
                DecodeError::Incomplete,
            ),
            (
                b"MSRP d93kswow SEND\r\nContent-Type: text/plain\r\n\r\nHello\r\n-------d93kswow$"
                    .as_ref(),
                DecodeError::Incomplete,
            ),
            (
                b"MSRP d93kswow SEND\r\nMessage-ID: x1\r\n\r\n-------d93kswo".as_ref(),
                DecodeError::Incomplete,
            ),
            (
                b"MSRP d93kswow SEND\r\nMessage-ID: x1\r\n\r\n-------d93kswow$\r".as_ref(),
                DecodeError::Incomplete,
            ),
            (b"HELLO there\r\n".as_ref(), DecodeError::Failed),
            (b"MSRP abc SEND\r\n".as_ref(), DecodeError::Failed),
            (b"MSRP d93kswow send\r\n".as_ref(), DecodeError::Failed),
            (b"MSRP d93kswow 099\r\n".as_ref(), DecodeError::Failed),
        ];

        for (test, expected) in tests {
            let got = Message::decode(test);
            assert_eq!(got.unwrap_err(), expected, "{:?}", from_utf8(test));
        }
    }

    #[test]
    fn test_message_round_trip() {
        let mut message = send_request();
        message.add_header(Header::byte_range(ByteRange {
            start: 1,
            end: Some(12),
            total: Some(12),
        }));
        message.add_header(Header::content_type("text/plain"));
        message.set_data(b"Hello world!".as_slice());

        let encoded = message.encode_detached().unwrap();
        let (remainder, parsed) = Message::decode(&encoded).unwrap();
        assert!(remainder.is_empty());
        assert_eq!(parsed, message);

        // And a second pass over the re-encoded form.
        let re_encoded = parsed.encode_detached().unwrap();
        assert_eq!(re_encoded, encoded);
    }

    #[test]
    fn test_response_round_trip() {
        let mut message = Message::response("d93kswow", 200, Some("OK")).unwrap();
        message.add_header(Header::to_path(vec![Uri::new("alice.example.com")]));
        message.add_header(Header::from_path(vec![Uri::new("bob.example.com")]));

        let encoded = message.encode_detached().unwrap();
        let (_, parsed) = Message::decode(&encoded).unwrap();
        assert_eq!(parsed, message);
    }
}
