//! Parsers for the formal syntax of MSRP chunk lines (RFC 4975, section 9).

use msrp_types::message::{is_transaction_id_char, ContFlag};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1, take_while_m_n},
    character::complete::char,
    combinator::{all_consuming, map, map_res, opt, rest, verify},
    sequence::{preceded, tuple},
    IResult,
};

/// Parsed first line of a chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FirstLine<'a> {
    pub transaction_id: &'a str,
    pub kind: FirstLineKind<'a>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FirstLineKind<'a> {
    Request { method: &'a str },
    Response { code: u16, comment: Option<&'a str> },
}

/// `transaction-id = alphanum 3*31(alphanum / "." / "+" / "%" / "=" / "-")`
fn transaction_id(input: &str) -> IResult<&str, &str> {
    verify(
        take_while_m_n(4, 32, |c: char| c.is_ascii() && is_transaction_id_char(c as u8)),
        |tid: &str| tid.as_bytes()[0].is_ascii_alphanumeric(),
    )(input)
}

/// `method = 1*UPALPHA`
///
/// RFC 4975 does not allow `_` in a method, but a deployed client sends
/// `FILE_OFFSET`, so it is accepted here.
fn method(input: &str) -> IResult<&str, &str> {
    let (remaining, method) =
        take_while1(|c: char| c.is_ascii_uppercase() || c == '_')(input)?;
    if method.contains('_') {
        log::warn!("accepted non-conformant method containing '_': {method}");
    }
    Ok((remaining, method))
}

/// `code = 3DIGIT`
fn code(input: &str) -> IResult<&str, u16> {
    map_res(
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
        str::parse,
    )(input)
}

/// `comment = 1*OCTET`
fn comment(input: &str) -> IResult<&str, &str> {
    verify(rest, |comment: &str| !comment.is_empty())(input)
}

/// `first-line = "MSRP" SP transaction-id SP (method / code [SP comment])`
///
/// The whole line must match; anything else is illegal data.
pub fn first_line(input: &str) -> IResult<&str, FirstLine<'_>> {
    map(
        all_consuming(tuple((
            tag("MSRP "),
            transaction_id,
            char(' '),
            alt((
                map(
                    tuple((code, opt(preceded(char(' '), comment)))),
                    |(code, comment)| FirstLineKind::Response { code, comment },
                ),
                map(method, |method| FirstLineKind::Request { method }),
            )),
        ))),
        |(_, transaction_id, _, kind)| FirstLine {
            transaction_id,
            kind,
        },
    )(input)
}

/// `end-line = "-------" transaction-id continuation-flag`
///
/// Matches the bodyless form that shows up in line mode; the end-line of a
/// chunk with a body is found by the raw-mode scanner instead.
pub fn end_line(line: &str, transaction_id: &str) -> Option<ContFlag> {
    let rest = line
        .strip_prefix("-------")?
        .strip_prefix(transaction_id)?
        .as_bytes();
    match rest {
        [flag] => ContFlag::from_byte(*flag),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_line_request() {
        let tests = [
            (
                "MSRP d93kswow SEND",
                FirstLine {
                    transaction_id: "d93kswow",
                    kind: FirstLineKind::Request { method: "SEND" },
                },
            ),
            (
                "MSRP a.+%=-1 REPORT",
                FirstLine {
                    transaction_id: "a.+%=-1",
                    kind: FirstLineKind::Request { method: "REPORT" },
                },
            ),
            (
                "MSRP d93kswow FILE_OFFSET",
                FirstLine {
                    transaction_id: "d93kswow",
                    kind: FirstLineKind::Request {
                        method: "FILE_OFFSET",
                    },
                },
            ),
        ];

        for (test, expected) in tests {
            let (rem, got) = first_line(test).unwrap();
            assert!(rem.is_empty());
            assert_eq!(got, expected, "{test}");
        }
    }

    #[test]
    fn test_first_line_response() {
        let tests = [
            (
                "MSRP d93kswow 200 OK",
                FirstLineKind::Response {
                    code: 200,
                    comment: Some("OK"),
                },
            ),
            (
                "MSRP d93kswow 481",
                FirstLineKind::Response {
                    code: 481,
                    comment: None,
                },
            ),
            (
                "MSRP d93kswow 506 session already bound",
                FirstLineKind::Response {
                    code: 506,
                    comment: Some("session already bound"),
                },
            ),
        ];

        for (test, expected) in tests {
            let (_, got) = first_line(test).unwrap();
            assert_eq!(got.kind, expected, "{test}");
        }
    }

    #[test]
    fn test_first_line_failed() {
        let tests = [
            "",
            "MSRP",
            "MSRP d93kswow",
            "MSRP d93kswow ",
            "MSRP d93kswow send",
            "MSRP d93kswow SEND extra",
            "MSRP d93kswow 1234",
            "MSRP d93kswow 12",
            "MSRP d93kswow 200 ",
            // too short, too long, bad leading character
            "MSRP abc SEND",
            "MSRP aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa SEND",
            "MSRP -93kswow SEND",
            "XSRP d93kswow SEND",
            "msrp d93kswow SEND",
        ];

        for test in tests {
            assert!(first_line(test).is_err(), "{test:?}");
        }
    }

    #[test]
    fn test_end_line() {
        assert_eq!(
            end_line("-------d93kswow$", "d93kswow"),
            Some(ContFlag::End)
        );
        assert_eq!(
            end_line("-------d93kswow#", "d93kswow"),
            Some(ContFlag::Abort)
        );
        assert_eq!(
            end_line("-------d93kswow+", "d93kswow"),
            Some(ContFlag::More)
        );

        assert_eq!(end_line("-------d93kswow", "d93kswow"), None);
        assert_eq!(end_line("-------d93kswow!", "d93kswow"), None);
        assert_eq!(end_line("-------other$", "d93kswow"), None);
        assert_eq!(end_line("------d93kswow$", "d93kswow"), None);
    }
}
