//! Integration with tokio's codec infrastructure.

use std::{collections::VecDeque, io};

use bytes::BytesMut;
use msrp_types::{
    codec::Encode,
    message::{ContFlag, Message},
};
use tokio_util::codec::{Decoder, Encoder};

use crate::framer::{Framer, Sink};

/// Frames a byte stream into complete MSRP chunks.
///
/// Unlike driving a [`Framer`] directly, bodies are assembled into the
/// decoded [`Message`], so one decoded item is one whole chunk. Framing-level
/// rejects are logged and skipped; deciding to drop the connection over them
/// is left to the caller, which can count them via
/// [`MsrpCodec::illegal_data_count`].
#[derive(Debug, Default)]
pub struct MsrpCodec {
    framer: Framer,
    assembler: Assembler,
}

impl MsrpCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of illegal data reports since the codec was created.
    pub fn illegal_data_count(&self) -> u64 {
        self.assembler.illegal
    }
}

#[derive(Debug, Default)]
struct Assembler {
    current: Option<Message>,
    ready: VecDeque<Message>,
    illegal: u64,
}

impl Sink for Assembler {
    fn chunk_start(&mut self, message: Message) {
        self.current = Some(message);
    }

    fn body_write(&mut self, data: &[u8], _last: bool) {
        if let Some(message) = &mut self.current {
            message.append_data(data);
        }
    }

    fn chunk_end(&mut self, flag: ContFlag) {
        if let Some(mut message) = self.current.take() {
            message.set_contflag(flag);
            self.ready.push_back(message);
        }
    }

    fn illegal_data(&mut self, data: &[u8]) {
        log::debug!("skipped {} bytes of illegal data", data.len());
        self.illegal += 1;
    }

    fn connection_lost(&mut self, _error: Option<io::Error>) {
        self.current = None;
    }
}

impl Decoder for MsrpCodec {
    type Item = Message;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, io::Error> {
        if !src.is_empty() {
            let data = src.split_to(src.len());
            self.framer.feed(&data, &mut self.assembler);
        }
        Ok(self.assembler.ready.pop_front())
    }
}

impl<'a> Encoder<&'a Message> for MsrpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), io::Error> {
        let encoded = item.encode_detached()?;
        dst.extend_from_slice(&encoded);
        Ok(())
    }
}
