//! # Serialization of messages
//!
//! Every type in msrp-types can be serialized into bytes (`&[u8]`) by using
//! the [Encode](crate::codec::Encode) trait.
//!
//! ## Example
//!
//! ```rust
//! use msrp_types::{codec::Encode, header::Header, message::Message, uri::Uri};
//!
//! let mut message = Message::request("d93kswow", "SEND").unwrap();
//! message.add_header(Header::to_path(vec![Uri::new("bob.example.com")]));
//! message.add_header(Header::from_path(vec![Uri::new("alice.example.com")]));
//!
//! let bytes = message.encode_detached().unwrap();
//!
//! println!("{}", String::from_utf8(bytes).unwrap());
//! ```

use std::io::Write;

use crate::{header::Header, message::Message, uri::Uri};

pub trait Encode {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()>;

    fn encode_detached(&self) -> std::io::Result<Vec<u8>> {
        let mut serialized = Vec::new();
        self.encode(&mut serialized)?;
        Ok(serialized)
    }
}

impl Encode for Uri {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write!(writer, "{self}")
    }
}

impl Encode for Header {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        write!(writer, "{}: {}", self.name(), self.to_encoded())
    }
}

impl Encode for Message {
    fn encode(&self, writer: &mut impl Write) -> std::io::Result<()> {
        writer.write_all(self.encoded_header().as_bytes())?;
        writer.write_all(self.data())?;
        writer.write_all(self.encoded_footer().as_bytes())
    }
}
