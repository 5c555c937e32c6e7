//! # Data structures for MSRP
//!
//! This crate provides the URIs, headers, and message objects of the Message
//! Session Relay Protocol (RFC 4975 and friends), together with their
//! canonical serialization. The wire-level parsing of byte streams lives in
//! the companion `msrp-codec` crate.

#![deny(missing_debug_implementations)]

pub mod codec;
pub mod error;
pub mod header;
pub mod message;
pub mod uri;
