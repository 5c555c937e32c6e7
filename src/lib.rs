//! # msrp-codec
//!
//! A streaming codec for the Message Session Relay Protocol (RFC 4975):
//! parsing of chunks and URIs, canonical serialization, and a framing state
//! machine that turns a raw TCP byte stream into chunk events.
//!
//! The data structures (URIs, headers, messages) live in [`msrp_types`] and
//! are re-exported here. This crate adds the wire side:
//!
//! - [`framer::Framer`] consumes bytes in arbitrary pieces and drives a
//!   [`framer::Sink`] with chunk events. This is the entry point for a
//!   connection owner.
//! - [`codec::Decode`] parses one complete chunk out of a byte slice.
//! - With the `tokio` feature, [`tokio::MsrpCodec`] plugs the framer into
//!   `tokio_util`'s codec infrastructure.
//!
//! ```rust
//! use msrp_codec::codec::Decode;
//! use msrp_types::{codec::Encode, message::Message};
//!
//! let input = b"MSRP d93kswow 200 OK\r\n-------d93kswow$\r\n";
//! let (_, message) = Message::decode(input).unwrap();
//!
//! assert_eq!(message.encode_detached().unwrap(), input);
//! ```

#![deny(missing_debug_implementations)]

pub mod codec;
pub mod framer;
/// Raw nom parsers for the formal syntax of MSRP chunk lines.
pub mod parse;
/// This module is only available when the feature "tokio" was specified.
#[cfg(feature = "tokio")]
pub mod tokio;

pub use msrp_types;
pub use msrp_types as types;
