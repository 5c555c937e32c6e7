//! MSRP messages (requests and responses).

use std::{cell::OnceCell, fmt};

use crate::{
    error::{HeaderParseError, MessageError, VerifyError},
    header::{names, sort_level, ByteRange, Header, HeaderValue, StatusValue},
    uri::Uri,
};

/// The continuation flag closing a chunk's end-line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContFlag {
    /// `$`: this chunk completes the message.
    End,
    /// `#`: the message is aborted; no further chunks follow.
    Abort,
    /// `+`: more chunks of this message follow.
    More,
}

impl ContFlag {
    pub fn from_byte(byte: u8) -> Option<ContFlag> {
        match byte {
            b'$' => Some(ContFlag::End),
            b'#' => Some(ContFlag::Abort),
            b'+' => Some(ContFlag::More),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            ContFlag::End => '$',
            ContFlag::Abort => '#',
            ContFlag::More => '+',
        }
    }
}

impl fmt::Display for ContFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Whether a message is a request or a response. Fixed at construction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    Request { method: String },
    Response { code: u16, comment: Option<String> },
}

/// `transaction-id = alphanum 3*31(alphanum / "." / "+" / "%" / "=" / "-")`
pub fn is_transaction_id_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'+' | b'%' | b'=' | b'-')
}

fn verify_transaction_id(transaction_id: &str) -> Result<(), MessageError> {
    let bytes = transaction_id.as_bytes();
    let valid = (4..=32).contains(&bytes.len())
        && bytes[0].is_ascii_alphanumeric()
        && bytes.iter().copied().all(is_transaction_id_char);
    if valid {
        Ok(())
    } else {
        Err(MessageError::InvalidTransactionId(
            transaction_id.to_string(),
        ))
    }
}

fn verify_method(method: &str) -> Result<(), MessageError> {
    let valid = !method.is_empty()
        && method
            .bytes()
            .all(|byte| byte.is_ascii_uppercase() || byte == b'_');
    if valid {
        Ok(())
    } else {
        Err(MessageError::InvalidMethod(method.to_string()))
    }
}

/// One MSRP request or response.
///
/// The identity (request method or response code and comment) is fixed at
/// construction. The transaction id, headers, body, and continuation flag
/// are mutable. Serialization goes through
/// [`Encode`](crate::codec::Encode); the header block is rendered once and
/// reused until a header or the transaction id changes.
#[derive(Clone, Debug)]
pub struct Message {
    transaction_id: String,
    kind: Kind,
    headers: Vec<Header>,
    data: Vec<u8>,
    contflag: ContFlag,
    header_block: OnceCell<String>,
}

impl Message {
    /// A request, e.g. `Message::request("d93kswow", "SEND")`.
    pub fn request(
        transaction_id: impl Into<String>,
        method: impl Into<String>,
    ) -> Result<Self, MessageError> {
        let transaction_id = transaction_id.into();
        verify_transaction_id(&transaction_id)?;
        let method = method.into();
        verify_method(&method)?;
        Ok(Self::with_kind(transaction_id, Kind::Request { method }))
    }

    /// A response, e.g. `Message::response("d93kswow", 200, Some("OK"))`.
    pub fn response(
        transaction_id: impl Into<String>,
        code: u16,
        comment: Option<&str>,
    ) -> Result<Self, MessageError> {
        let transaction_id = transaction_id.into();
        verify_transaction_id(&transaction_id)?;
        if !(100..=999).contains(&code) {
            return Err(MessageError::InvalidCode(code));
        }
        Ok(Self::with_kind(
            transaction_id,
            Kind::Response {
                code,
                comment: comment.map(Into::into),
            },
        ))
    }

    fn with_kind(transaction_id: String, kind: Kind) -> Self {
        Self {
            transaction_id,
            kind,
            headers: Vec::new(),
            data: Vec::new(),
            contflag: ContFlag::End,
            header_block: OnceCell::new(),
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Changes the transaction id, which is reflected in the first line and
    /// the end-line.
    pub fn set_transaction_id(
        &mut self,
        transaction_id: impl Into<String>,
    ) -> Result<(), MessageError> {
        let transaction_id = transaction_id.into();
        verify_transaction_id(&transaction_id)?;
        self.transaction_id = transaction_id;
        self.header_block.take();
        Ok(())
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn method(&self) -> Option<&str> {
        match &self.kind {
            Kind::Request { method } => Some(method),
            Kind::Response { .. } => None,
        }
    }

    pub fn code(&self) -> Option<u16> {
        match &self.kind {
            Kind::Request { .. } => None,
            Kind::Response { code, .. } => Some(*code),
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match &self.kind {
            Kind::Request { .. } => None,
            Kind::Response { comment, .. } => comment.as_deref(),
        }
    }

    /// `MSRP <tid> <METHOD>` or `MSRP <tid> CCC[ comment]`.
    pub fn first_line(&self) -> String {
        match &self.kind {
            Kind::Request { method } => {
                format!("MSRP {} {}", self.transaction_id, method)
            }
            Kind::Response {
                code,
                comment: None,
            } => format!("MSRP {} {:03}", self.transaction_id, code),
            Kind::Response {
                code,
                comment: Some(comment),
            } => format!("MSRP {} {:03} {}", self.transaction_id, code, comment),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    pub fn append_data(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Body length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn contflag(&self) -> ContFlag {
        self.contflag
    }

    pub fn set_contflag(&mut self, contflag: ContFlag) {
        self.contflag = contflag;
    }

    /// Stores a header, replacing any existing one of the same name.
    pub fn add_header(&mut self, header: Header) {
        self.header_block.take();
        match self
            .headers
            .iter_mut()
            .find(|existing| existing.name() == header.name())
        {
            Some(existing) => *existing = header,
            None => self.headers.push(header),
        }
    }

    pub fn remove_header(&mut self, name: &str) -> Option<Header> {
        self.header_block.take();
        let position = self
            .headers
            .iter()
            .position(|header| header.name() == name)?;
        Some(self.headers.remove(position))
    }

    pub fn header(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|header| header.name() == name)
    }

    pub fn header_mut(&mut self, name: &str) -> Option<&mut Header> {
        self.header_block.take();
        self.headers
            .iter_mut()
            .find(|header| header.name() == name)
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Checks that `To-Path` and `From-Path` are present and that every
    /// header value decodes.
    pub fn verify_headers(&mut self) -> Result<(), VerifyError> {
        if self.header(names::TO_PATH).is_none() {
            return Err(VerifyError::MissingHeader(names::TO_PATH));
        }
        if self.header(names::FROM_PATH).is_none() {
            return Err(VerifyError::MissingHeader(names::FROM_PATH));
        }
        for header in &mut self.headers {
            header.decoded()?;
        }
        Ok(())
    }

    fn decoded_header(&self, name: &str) -> Result<Option<HeaderValue>, HeaderParseError> {
        self.header(name).map(Header::to_decoded).transpose()
    }

    fn uri_header(&self, name: &str) -> Result<Option<Vec<Uri>>, HeaderParseError> {
        match self.decoded_header(name)? {
            Some(HeaderValue::Uris(uris)) => Ok(Some(uris)),
            _ => Ok(None),
        }
    }

    fn text_header(&self, name: &str) -> Result<Option<String>, HeaderParseError> {
        match self.decoded_header(name)? {
            Some(HeaderValue::Text(text)) => Ok(Some(text)),
            _ => Ok(None),
        }
    }

    pub fn to_path(&self) -> Result<Option<Vec<Uri>>, HeaderParseError> {
        self.uri_header(names::TO_PATH)
    }

    pub fn from_path(&self) -> Result<Option<Vec<Uri>>, HeaderParseError> {
        self.uri_header(names::FROM_PATH)
    }

    pub fn content_type(&self) -> Result<Option<String>, HeaderParseError> {
        self.text_header(names::CONTENT_TYPE)
    }

    pub fn message_id(&self) -> Result<Option<String>, HeaderParseError> {
        self.text_header(names::MESSAGE_ID)
    }

    pub fn byte_range(&self) -> Result<Option<ByteRange>, HeaderParseError> {
        match self.decoded_header(names::BYTE_RANGE)? {
            Some(HeaderValue::ByteRange(range)) => Ok(Some(range)),
            _ => Ok(None),
        }
    }

    pub fn status(&self) -> Result<Option<StatusValue>, HeaderParseError> {
        match self.decoded_header(names::STATUS)? {
            Some(HeaderValue::Status(status)) => Ok(Some(status)),
            _ => Ok(None),
        }
    }

    /// The `Failure-Report` value; `"yes"` when the header is absent.
    pub fn failure_report(&self) -> Result<String, HeaderParseError> {
        Ok(self
            .text_header(names::FAILURE_REPORT)?
            .unwrap_or_else(|| "yes".to_string()))
    }

    /// The `Success-Report` value; `"no"` when the header is absent.
    pub fn success_report(&self) -> Result<String, HeaderParseError> {
        Ok(self
            .text_header(names::SUCCESS_REPORT)?
            .unwrap_or_else(|| "no".to_string()))
    }

    /// The serialized header block: first line plus headers in canonical
    /// order, with the extra blank line when `Content-Type` is present.
    ///
    /// Memoized until a header or the transaction id changes.
    pub fn encoded_header(&self) -> &str {
        self.header_block.get_or_init(|| self.render_header_block())
    }

    fn render_header_block(&self) -> String {
        let mut headers: Vec<&Header> = self.headers.iter().collect();
        headers.sort_by_key(|header| sort_level(header.name()));
        let mut block = self.first_line();
        for header in headers {
            block.push_str("\r\n");
            block.push_str(header.name());
            block.push_str(": ");
            block.push_str(&header.to_encoded());
        }
        if self.header(names::CONTENT_TYPE).is_some() {
            block.push_str("\r\n\r\n");
        }
        block
    }

    /// `CRLF "-------" <tid> <contflag> CRLF`.
    pub fn encoded_footer(&self) -> String {
        format!("\r\n-------{}{}\r\n", self.transaction_id, self.contflag)
    }
}

/// Messages compare by first line, headers (in any order), body, and
/// continuation flag.
impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.first_line() == other.first_line()
            && self.headers.len() == other.headers.len()
            && self
                .headers
                .iter()
                .all(|header| other.headers.iter().any(|candidate| candidate == header))
            && self.data == other.data
            && self.contflag == other.contflag
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.first_line())
    }
}
