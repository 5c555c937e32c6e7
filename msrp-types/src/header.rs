//! MSRP headers.
//!
//! A header pairs a name with a value that exists in two forms: the *encoded*
//! form as written on the wire, and the *decoded*, structured form. Whichever
//! form was set last is authoritative; the other one is derived on demand and
//! cached. Every known header name maps to a [`Grammar`] describing how the
//! two forms relate; unknown names fall back to the opaque text grammar.

use std::{borrow::Cow, fmt};

use crate::{
    error::{HeaderParseError, InvalidHeaderValue},
    uri::Uri,
};

/// Well-known header names.
pub mod names {
    pub const TO_PATH: &str = "To-Path";
    pub const FROM_PATH: &str = "From-Path";
    pub const MESSAGE_ID: &str = "Message-ID";
    pub const SUCCESS_REPORT: &str = "Success-Report";
    pub const FAILURE_REPORT: &str = "Failure-Report";
    pub const BYTE_RANGE: &str = "Byte-Range";
    pub const STATUS: &str = "Status";
    pub const EXPIRES: &str = "Expires";
    pub const MIN_EXPIRES: &str = "Min-Expires";
    pub const MAX_EXPIRES: &str = "Max-Expires";
    pub const USE_PATH: &str = "Use-Path";
    pub const USE_NICKNAME: &str = "Use-Nickname";
    pub const WWW_AUTHENTICATE: &str = "WWW-Authenticate";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const AUTHENTICATION_INFO: &str = "Authentication-Info";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_ID: &str = "Content-ID";
    pub const CONTENT_DESCRIPTION: &str = "Content-Description";
    pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
}

/// Range of message bytes carried by a chunk: `start-end/total`.
///
/// `None` stands for `*` (not yet known).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
    pub total: Option<u64>,
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn part(value: Option<u64>) -> Cow<'static, str> {
            match value {
                Some(value) => Cow::Owned(value.to_string()),
                None => Cow::Borrowed("*"),
            }
        }

        write!(f, "{}-{}/{}", self.start, part(self.end), part(self.total))
    }
}

/// Decoded `Status` header: `000 CCC [comment]`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StatusValue {
    pub code: u16,
    pub comment: Option<String>,
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.comment {
            Some(comment) => write!(f, "000 {:03} {}", self.code, comment),
            None => write!(f, "000 {:03}", self.code),
        }
    }
}

/// Decoded `Content-Disposition` header.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ContentDisposition {
    pub disposition: String,
    pub parameters: Vec<(String, String)>,
}

/// The structured form of a header value.
#[derive(Clone, Debug, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Uris(Vec<Uri>),
    Integer(u64),
    ByteRange(ByteRange),
    Status(StatusValue),
    Disposition(ContentDisposition),
    Parameters(Vec<(String, String)>),
}

const SUCCESS_REPORT_VALUES: &[&str] = &["yes", "no"];
const FAILURE_REPORT_VALUES: &[&str] = &["yes", "no", "partial"];

/// How a header value is written on the wire and which [`HeaderValue`]
/// variant it decodes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Grammar {
    /// Opaque text, passed through unchanged.
    Text,
    /// Space-separated list of MSRP URIs.
    UriList,
    /// Decimal integer.
    Integer,
    /// One token out of an enumerated set. Decodes to [`HeaderValue::Text`].
    Choice(&'static [&'static str]),
    /// `start-end/total` with `*` for an unknown end or total.
    ByteRange,
    /// `000 CCC [comment]`.
    Status,
    /// Disposition token followed by `;`-separated parameters.
    Disposition,
    /// Comma-separated `name="value"` pairs.
    ParameterList,
    /// Literal `Digest ` followed by a parameter list.
    Digest,
}

impl Grammar {
    /// Registry lookup. Unknown names fall back to [`Grammar::Text`].
    ///
    /// The registry is fixed at compile time and therefore safe to consult
    /// from anywhere.
    pub fn for_name(name: &str) -> Grammar {
        match name {
            names::TO_PATH | names::FROM_PATH | names::USE_PATH => Grammar::UriList,
            names::SUCCESS_REPORT => Grammar::Choice(SUCCESS_REPORT_VALUES),
            names::FAILURE_REPORT => Grammar::Choice(FAILURE_REPORT_VALUES),
            names::BYTE_RANGE => Grammar::ByteRange,
            names::STATUS => Grammar::Status,
            names::EXPIRES | names::MIN_EXPIRES | names::MAX_EXPIRES => Grammar::Integer,
            names::WWW_AUTHENTICATE | names::AUTHORIZATION => Grammar::Digest,
            names::AUTHENTICATION_INFO => Grammar::ParameterList,
            names::CONTENT_DISPOSITION => Grammar::Disposition,
            _ => Grammar::Text,
        }
    }

    /// Decodes the wire form. Errors carry the header name and the reason.
    pub fn decode(&self, name: &str, encoded: &str) -> Result<HeaderValue, HeaderParseError> {
        match self {
            Grammar::Text => Ok(HeaderValue::Text(encoded.to_string())),
            Grammar::UriList => {
                let mut uris = Vec::new();
                for part in encoded.split(' ') {
                    let uri = Uri::parse(part)
                        .map_err(|error| HeaderParseError::new(name, error.to_string()))?;
                    uris.push(uri);
                }
                Ok(HeaderValue::Uris(uris))
            }
            Grammar::Integer => encoded.parse().map(HeaderValue::Integer).map_err(|_| {
                HeaderParseError::new(name, format!("invalid integer: {encoded:?}"))
            }),
            Grammar::Choice(allowed) => {
                if allowed.contains(&encoded) {
                    Ok(HeaderValue::Text(encoded.to_string()))
                } else {
                    Err(HeaderParseError::new(
                        name,
                        format!("invalid value: {encoded:?}"),
                    ))
                }
            }
            Grammar::ByteRange => decode_byte_range(encoded)
                .map(HeaderValue::ByteRange)
                .ok_or_else(|| {
                    HeaderParseError::new(name, format!("invalid byte range value: {encoded:?}"))
                }),
            Grammar::Status => decode_status(name, encoded).map(HeaderValue::Status),
            Grammar::Disposition => {
                let (disposition, parameters) = match encoded.split_once(';') {
                    Some((disposition, parameters)) => (disposition, parameters),
                    None => (encoded, ""),
                };
                if disposition.is_empty() {
                    return Err(HeaderParseError::new(
                        name,
                        format!("invalid content disposition: {encoded:?}"),
                    ));
                }
                Ok(HeaderValue::Disposition(ContentDisposition {
                    disposition: disposition.to_string(),
                    parameters: decode_parameters(parameters, ';'),
                }))
            }
            Grammar::ParameterList => Ok(HeaderValue::Parameters(decode_parameters(encoded, ','))),
            Grammar::Digest => match encoded.strip_prefix("Digest ") {
                Some(parameters) => Ok(HeaderValue::Parameters(decode_parameters(parameters, ','))),
                None => Err(HeaderParseError::new(name, "invalid Digest header value")),
            },
        }
    }

    /// Encodes the structured form. Total for values accepted by
    /// [`Grammar::coerce`].
    pub fn encode(&self, value: &HeaderValue) -> String {
        match (self, value) {
            (Grammar::Digest, HeaderValue::Parameters(parameters)) => {
                format!("Digest {}", encode_parameters(parameters))
            }
            (_, HeaderValue::Text(text)) => text.clone(),
            (_, HeaderValue::Uris(uris)) => {
                let uris: Vec<String> = uris.iter().map(ToString::to_string).collect();
                uris.join(" ")
            }
            (_, HeaderValue::Integer(value)) => value.to_string(),
            (_, HeaderValue::ByteRange(range)) => range.to_string(),
            (_, HeaderValue::Status(status)) => status.to_string(),
            (_, HeaderValue::Disposition(disposition)) => {
                let mut parts = vec![disposition.disposition.clone()];
                parts.extend(
                    disposition
                        .parameters
                        .iter()
                        .map(|(name, value)| format!("{name}=\"{value}\"")),
                );
                parts.join("; ")
            }
            (_, HeaderValue::Parameters(parameters)) => encode_parameters(parameters),
        }
    }

    /// Checks that `value` fits this grammar, converting it where a
    /// conversion is well-defined (text into an integer header).
    fn coerce(&self, name: &str, value: HeaderValue) -> Result<HeaderValue, InvalidHeaderValue> {
        let fits = matches!(
            (self, &value),
            (Grammar::Text | Grammar::Choice(_), HeaderValue::Text(_))
                | (Grammar::UriList, HeaderValue::Uris(_))
                | (Grammar::Integer, HeaderValue::Integer(_))
                | (Grammar::ByteRange, HeaderValue::ByteRange(_))
                | (Grammar::Status, HeaderValue::Status(_))
                | (Grammar::Disposition, HeaderValue::Disposition(_))
                | (
                    Grammar::ParameterList | Grammar::Digest,
                    HeaderValue::Parameters(_)
                )
        );
        if fits {
            return Ok(value);
        }
        match (self, value) {
            (Grammar::Integer, HeaderValue::Text(text)) => text
                .parse()
                .map(HeaderValue::Integer)
                .map_err(|_| self.mismatch(name)),
            _ => Err(self.mismatch(name)),
        }
    }

    fn mismatch(&self, name: &str) -> InvalidHeaderValue {
        let expected = match self {
            Grammar::Text | Grammar::Choice(_) => "text",
            Grammar::UriList => "a list of URIs",
            Grammar::Integer => "an integer",
            Grammar::ByteRange => "a byte range",
            Grammar::Status => "a status",
            Grammar::Disposition => "a content disposition",
            Grammar::ParameterList | Grammar::Digest => "a parameter list",
        };
        InvalidHeaderValue {
            name: name.to_string(),
            expected,
        }
    }
}

fn decode_byte_range(encoded: &str) -> Option<ByteRange> {
    fn part(value: &str) -> Option<Option<u64>> {
        if value == "*" {
            Some(None)
        } else {
            value.parse().ok().map(Some)
        }
    }

    let (start, rest) = encoded.split_once('-')?;
    let (end, total) = rest.split_once('/')?;
    Some(ByteRange {
        start: start.parse().ok()?,
        end: part(end)?,
        total: part(total)?,
    })
}

fn decode_status(name: &str, encoded: &str) -> Result<StatusValue, HeaderParseError> {
    let (namespace, rest) = encoded.split_once(' ').ok_or_else(|| {
        HeaderParseError::new(name, format!("invalid status value: {encoded:?}"))
    })?;
    if namespace != "000" {
        return Err(HeaderParseError::new(
            name,
            format!("invalid status value: {encoded:?}"),
        ));
    }
    let (code, comment) = match rest.split_once(' ') {
        Some((code, comment)) => (code, Some(comment)),
        None => (rest, None),
    };
    if code.len() != 3 || !code.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(HeaderParseError::new(
            name,
            format!("invalid status code: {code:?}"),
        ));
    }
    Ok(StatusValue {
        // parse cannot fail on three ASCII digits
        code: code.parse().unwrap_or_default(),
        comment: comment.filter(|comment| !comment.is_empty()).map(Into::into),
    })
}

/// Extracts `name=value` pairs separated by `separator`. A value is either
/// a double-quoted string, which may contain the separator, or a run of
/// unquoted text up to the next separator or quote. Anything that does not
/// fit this shape is skipped, as receivers are expected to be lenient here.
fn decode_parameters(encoded: &str, separator: char) -> Vec<(String, String)> {
    let mut parameters = Vec::new();
    let mut rest = encoded;
    while let Some(equals) = rest.find('=') {
        // The name is the word run directly before the `=`.
        let before = &rest[..equals];
        let name_start = before
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
            .last()
            .map(|(index, _)| index);
        let Some(name_start) = name_start else {
            rest = &rest[equals + 1..];
            continue;
        };
        let name = &before[name_start..];
        let after = &rest[equals + 1..];
        if let Some(quoted) = after.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) if end > 0 => {
                    parameters.push((name.to_string(), quoted[..end].to_string()));
                    rest = &quoted[end + 1..];
                }
                // Unterminated or empty quotes match nothing.
                _ => rest = quoted,
            }
        } else {
            let end = after
                .find(|c: char| c == separator || c == '"')
                .unwrap_or(after.len());
            let value = after[..end].trim();
            if !value.is_empty() {
                parameters.push((name.to_string(), value.to_string()));
            }
            rest = &after[end..];
        }
    }
    parameters
}

fn encode_parameters(parameters: &[(String, String)]) -> String {
    let parameters: Vec<String> = parameters
        .iter()
        .map(|(name, value)| format!("{name}=\"{value}\""))
        .collect();
    parameters.join(", ")
}

#[derive(Clone, Debug)]
enum Value {
    /// Only the wire form is known.
    Encoded(String),
    /// Only the structured form is known.
    Decoded(HeaderValue),
    /// Both forms are known and consistent.
    Both {
        encoded: String,
        decoded: HeaderValue,
    },
}

/// A single MSRP header.
#[derive(Clone, Debug)]
pub struct Header {
    name: String,
    grammar: Grammar,
    value: Value,
}

impl Header {
    /// A header from its wire form. The value is not checked until its
    /// decoded form is requested.
    pub fn new(name: impl Into<String>, encoded: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            grammar: Grammar::for_name(&name),
            name,
            value: Value::Encoded(encoded.into()),
        }
    }

    /// A header from its structured form. Fails when the value does not fit
    /// the grammar registered for `name` and cannot be converted to it.
    pub fn from_decoded(
        name: impl Into<String>,
        decoded: HeaderValue,
    ) -> Result<Self, InvalidHeaderValue> {
        let name = name.into();
        let grammar = Grammar::for_name(&name);
        let decoded = grammar.coerce(&name, decoded)?;
        Ok(Self {
            name,
            grammar,
            value: Value::Decoded(decoded),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    /// The wire form, deriving and caching it from the structured form if
    /// necessary.
    pub fn encoded(&mut self) -> &str {
        if let Value::Decoded(decoded) = &self.value {
            let encoded = self.grammar.encode(decoded);
            let decoded = decoded.clone();
            self.value = Value::Both { encoded, decoded };
        }
        match &self.value {
            Value::Encoded(encoded) | Value::Both { encoded, .. } => encoded,
            // just converted above
            Value::Decoded(_) => unreachable!(),
        }
    }

    /// The structured form, deriving and caching it from the wire form if
    /// necessary.
    pub fn decoded(&mut self) -> Result<&HeaderValue, HeaderParseError> {
        if let Value::Encoded(encoded) = &self.value {
            let decoded = self.grammar.decode(&self.name, encoded)?;
            let encoded = encoded.clone();
            self.value = Value::Both { encoded, decoded };
        }
        match &self.value {
            Value::Decoded(decoded) | Value::Both { decoded, .. } => Ok(decoded),
            // just converted above
            Value::Encoded(_) => unreachable!(),
        }
    }

    /// Like [`Header::decoded`], but without caching, usable behind a shared
    /// reference.
    pub fn to_decoded(&self) -> Result<HeaderValue, HeaderParseError> {
        match &self.value {
            Value::Decoded(decoded) | Value::Both { decoded, .. } => Ok(decoded.clone()),
            Value::Encoded(encoded) => self.grammar.decode(&self.name, encoded),
        }
    }

    /// Like [`Header::encoded`], but without caching.
    pub fn to_encoded(&self) -> Cow<'_, str> {
        match &self.value {
            Value::Encoded(encoded) | Value::Both { encoded, .. } => Cow::Borrowed(encoded),
            Value::Decoded(decoded) => Cow::Owned(self.grammar.encode(decoded)),
        }
    }

    /// Replaces the wire form, dropping any cached structured form.
    pub fn set_encoded(&mut self, encoded: impl Into<String>) {
        self.value = Value::Encoded(encoded.into());
    }

    /// Replaces the structured form, dropping any cached wire form.
    pub fn set_decoded(&mut self, decoded: HeaderValue) -> Result<(), InvalidHeaderValue> {
        self.value = Value::Decoded(self.grammar.coerce(&self.name, decoded)?);
        Ok(())
    }
}

/// Headers compare by name and decoded value. Values that fail to decode
/// fall back to comparing their wire forms.
impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (self.to_decoded(), other.to_decoded()) {
            (Ok(this), Ok(other)) => this == other,
            _ => self.to_encoded() == other.to_encoded(),
        }
    }
}

// Constructors for the registered headers.
impl Header {
    pub fn to_path(uris: Vec<Uri>) -> Self {
        Self::decoded_unchecked(names::TO_PATH, HeaderValue::Uris(uris))
    }

    pub fn from_path(uris: Vec<Uri>) -> Self {
        Self::decoded_unchecked(names::FROM_PATH, HeaderValue::Uris(uris))
    }

    pub fn use_path(uris: Vec<Uri>) -> Self {
        Self::decoded_unchecked(names::USE_PATH, HeaderValue::Uris(uris))
    }

    pub fn message_id(id: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::MESSAGE_ID, HeaderValue::Text(id.into()))
    }

    pub fn success_report(value: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::SUCCESS_REPORT, HeaderValue::Text(value.into()))
    }

    pub fn failure_report(value: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::FAILURE_REPORT, HeaderValue::Text(value.into()))
    }

    pub fn byte_range(range: ByteRange) -> Self {
        Self::decoded_unchecked(names::BYTE_RANGE, HeaderValue::ByteRange(range))
    }

    pub fn status(status: StatusValue) -> Self {
        Self::decoded_unchecked(names::STATUS, HeaderValue::Status(status))
    }

    pub fn expires(seconds: u64) -> Self {
        Self::decoded_unchecked(names::EXPIRES, HeaderValue::Integer(seconds))
    }

    pub fn min_expires(seconds: u64) -> Self {
        Self::decoded_unchecked(names::MIN_EXPIRES, HeaderValue::Integer(seconds))
    }

    pub fn max_expires(seconds: u64) -> Self {
        Self::decoded_unchecked(names::MAX_EXPIRES, HeaderValue::Integer(seconds))
    }

    pub fn use_nickname(nickname: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::USE_NICKNAME, HeaderValue::Text(nickname.into()))
    }

    pub fn www_authenticate(parameters: Vec<(String, String)>) -> Self {
        Self::decoded_unchecked(names::WWW_AUTHENTICATE, HeaderValue::Parameters(parameters))
    }

    pub fn authorization(parameters: Vec<(String, String)>) -> Self {
        Self::decoded_unchecked(names::AUTHORIZATION, HeaderValue::Parameters(parameters))
    }

    pub fn authentication_info(parameters: Vec<(String, String)>) -> Self {
        Self::decoded_unchecked(
            names::AUTHENTICATION_INFO,
            HeaderValue::Parameters(parameters),
        )
    }

    pub fn content_type(value: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::CONTENT_TYPE, HeaderValue::Text(value.into()))
    }

    pub fn content_id(value: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::CONTENT_ID, HeaderValue::Text(value.into()))
    }

    pub fn content_description(value: impl Into<String>) -> Self {
        Self::decoded_unchecked(names::CONTENT_DESCRIPTION, HeaderValue::Text(value.into()))
    }

    pub fn content_disposition(disposition: ContentDisposition) -> Self {
        Self::decoded_unchecked(
            names::CONTENT_DISPOSITION,
            HeaderValue::Disposition(disposition),
        )
    }

    /// For the constructors above, which pass values that fit their grammar
    /// by construction.
    fn decoded_unchecked(name: &str, decoded: HeaderValue) -> Self {
        Self {
            name: name.to_string(),
            grammar: Grammar::for_name(name),
            value: Value::Decoded(decoded),
        }
    }
}

/// Canonical serialization level of a header. Lower levels are emitted
/// first; the order within one level is the insertion order.
pub fn sort_level(name: &str) -> u8 {
    match name {
        names::TO_PATH => 0,
        names::FROM_PATH => 1,
        names::CONTENT_ID | names::CONTENT_DESCRIPTION | names::CONTENT_DISPOSITION => 3,
        names::CONTENT_TYPE => 4,
        _ if name.starts_with("Content-") => 3,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_round_trip() {
        let mut header = Header::new("Message-ID", "12339sdqwer");
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Text("12339sdqwer".to_string())
        );
        assert_eq!(header.encoded(), "12339sdqwer");
    }

    #[test]
    fn test_uri_list() {
        let mut header = Header::new(
            "To-Path",
            "msrp://a.example/1;tcp msrp://b.example/2;tcp",
        );

        match header.decoded().unwrap() {
            HeaderValue::Uris(uris) => {
                assert_eq!(uris.len(), 2);
                assert_eq!(uris[0].host, "a.example");
                assert_eq!(uris[1].session_id, "2");
            }
            other => panic!("unexpected value: {other:?}"),
        }
        assert_eq!(
            header.encoded(),
            "msrp://a.example/1;tcp msrp://b.example/2;tcp"
        );
    }

    #[test]
    fn test_uri_list_failure_names_header() {
        let mut header = Header::new("To-Path", "msrp://a.example/1;tcp nonsense");
        let error = header.decoded().unwrap_err();
        assert_eq!(error.name, "To-Path");
    }

    #[test]
    fn test_integer() {
        let mut header = Header::new("Expires", "600");
        assert_eq!(header.decoded().unwrap(), &HeaderValue::Integer(600));

        let mut header = Header::new("Expires", "soon");
        assert!(header.decoded().is_err());
    }

    #[test]
    fn test_choice() {
        assert!(Header::new("Success-Report", "yes").decoded().is_ok());
        assert!(Header::new("Success-Report", "partial").decoded().is_err());
        assert!(Header::new("Failure-Report", "partial").decoded().is_ok());
        assert!(Header::new("Failure-Report", "maybe").decoded().is_err());
    }

    #[test]
    fn test_byte_range() {
        let tests = [
            (
                "1-0/0",
                ByteRange {
                    start: 1,
                    end: Some(0),
                    total: Some(0),
                },
            ),
            (
                "1-*/2048",
                ByteRange {
                    start: 1,
                    end: None,
                    total: Some(2048),
                },
            ),
            (
                "512-1024/*",
                ByteRange {
                    start: 512,
                    end: Some(1024),
                    total: None,
                },
            ),
        ];

        for (encoded, expected) in tests {
            let mut header = Header::new("Byte-Range", encoded);
            assert_eq!(
                header.decoded().unwrap(),
                &HeaderValue::ByteRange(expected),
                "{encoded}"
            );
            assert_eq!(header.encoded(), encoded);
        }

        assert!(Header::new("Byte-Range", "1-2").decoded().is_err());
        assert!(Header::new("Byte-Range", "x-2/3").decoded().is_err());
    }

    #[test]
    fn test_status() {
        let mut header = Header::new("Status", "000 200 OK");
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Status(StatusValue {
                code: 200,
                comment: Some("OK".to_string()),
            })
        );

        let mut header = Header::new("Status", "000 481");
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Status(StatusValue {
                code: 481,
                comment: None,
            })
        );
        assert_eq!(header.encoded(), "000 481");

        // The namespace must be the literal `000` and the code exactly three
        // digits.
        for bad in ["001 200 OK", "000", "000 20", "000 2000", "000 abc"] {
            assert!(Header::new("Status", bad).decoded().is_err(), "{bad}");
        }
    }

    #[test]
    fn test_status_code_is_zero_padded() {
        let mut header = Header::status(StatusValue {
            code: 99,
            comment: None,
        });
        assert_eq!(header.encoded(), "000 099");
    }

    #[test]
    fn test_content_disposition() {
        let mut header = Header::new("Content-Disposition", "attachment; filename=\"x.png\"; size=1024");
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Disposition(ContentDisposition {
                disposition: "attachment".to_string(),
                parameters: vec![
                    ("filename".to_string(), "x.png".to_string()),
                    ("size".to_string(), "1024".to_string()),
                ],
            })
        );
        // Values are re-quoted on output.
        assert_eq!(
            header.encoded(),
            "attachment; filename=\"x.png\"; size=\"1024\""
        );

        let mut bare = Header::new("Content-Disposition", "render");
        assert_eq!(
            bare.decoded().unwrap(),
            &HeaderValue::Disposition(ContentDisposition {
                disposition: "render".to_string(),
                parameters: vec![],
            })
        );
    }

    #[test]
    fn test_digest() {
        let mut header = Header::new(
            "WWW-Authenticate",
            "Digest realm=\"example.com\", nonce=\"abc123\"",
        );
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Parameters(vec![
                ("realm".to_string(), "example.com".to_string()),
                ("nonce".to_string(), "abc123".to_string()),
            ])
        );
        assert_eq!(
            header.encoded(),
            "Digest realm=\"example.com\", nonce=\"abc123\""
        );

        // The prefix is case sensitive.
        assert!(Header::new("WWW-Authenticate", "digest realm=\"x\"")
            .decoded()
            .is_err());
    }

    #[test]
    fn test_parameter_values_may_contain_the_separator() {
        let mut header = Header::new(
            "WWW-Authenticate",
            "Digest realm=\"example.com, site\", nonce=\"abc123\"",
        );
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Parameters(vec![
                ("realm".to_string(), "example.com, site".to_string()),
                ("nonce".to_string(), "abc123".to_string()),
            ])
        );
        assert_eq!(
            header.encoded(),
            "Digest realm=\"example.com, site\", nonce=\"abc123\""
        );

        let mut header = Header::new("Content-Disposition", "attachment; filename=\"a;b.png\"");
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Disposition(ContentDisposition {
                disposition: "attachment".to_string(),
                parameters: vec![("filename".to_string(), "a;b.png".to_string())],
            })
        );
        assert_eq!(header.encoded(), "attachment; filename=\"a;b.png\"");
    }

    #[test]
    fn test_unknown_header_is_text() {
        let mut header = Header::new("X-Custom", "anything at all");
        assert_eq!(header.grammar(), Grammar::Text);
        assert_eq!(
            header.decoded().unwrap(),
            &HeaderValue::Text("anything at all".to_string())
        );
    }

    #[test]
    fn test_set_decoded_invalidates_encoded() {
        let mut header = Header::new("Expires", "600");
        header.decoded().unwrap();
        header
            .set_decoded(HeaderValue::Integer(1200))
            .unwrap();
        assert_eq!(header.encoded(), "1200");
    }

    #[test]
    fn test_set_decoded_coerces_text_to_integer() {
        let mut header = Header::new("Expires", "600");
        header
            .set_decoded(HeaderValue::Text("1800".to_string()))
            .unwrap();
        assert_eq!(header.decoded().unwrap(), &HeaderValue::Integer(1800));

        assert!(header
            .set_decoded(HeaderValue::Text("soon".to_string()))
            .is_err());
        assert!(header.set_decoded(HeaderValue::Uris(vec![])).is_err());
    }

    #[test]
    fn test_equality_is_on_decoded_values() {
        let a = Header::new("Expires", "600");
        let b = Header::from_decoded("Expires", HeaderValue::Integer(600)).unwrap();
        assert_eq!(a, b);

        let c = Header::new("Min-Expires", "600");
        assert_ne!(a, c);
    }

    #[test]
    fn test_sort_levels() {
        assert_eq!(sort_level("To-Path"), 0);
        assert_eq!(sort_level("From-Path"), 1);
        assert_eq!(sort_level("Message-ID"), 2);
        assert_eq!(sort_level("Status"), 2);
        assert_eq!(sort_level("Content-ID"), 3);
        assert_eq!(sort_level("Content-Disposition"), 3);
        assert_eq!(sort_level("Content-Type"), 4);
        // Unknown headers sort with the content block iff named like one.
        assert_eq!(sort_level("Content-Whatever"), 3);
        assert_eq!(sort_level("X-Custom"), 2);
    }
}
