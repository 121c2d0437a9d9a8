//! Parsing of Classify2 XML responses
//!
//! The service returns a namespace-qualified tree with a `response` element
//! carrying a numeric code, plus `recommendations` and `works` subtrees for
//! resolvable results. All parsing here is tolerant: a malformed payload or
//! a missing node yields `None`, never a panic.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Response codes returned by the Classify2 service.
///
/// | Code | Meaning |
/// |------|---------|
/// | 0    | Success. Single-work summary response provided. |
/// | 2    | Success. Single-work detail response provided. |
/// | 4    | Success. Multi-work response provided. |
/// | 100  | No input. The method requires an input argument. |
/// | 101  | Invalid input. The standard number argument is invalid. |
/// | 102  | Not found. No data found for the input argument. |
/// | 200  | Unexpected error. |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    SingleWorkSummary,
    SingleWorkDetail,
    MultiWork,
    NoInput,
    InvalidInput,
    NotFound,
    UnexpectedError,
}

impl ResponseCode {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ResponseCode::SingleWorkSummary),
            2 => Some(ResponseCode::SingleWorkDetail),
            4 => Some(ResponseCode::MultiWork),
            100 => Some(ResponseCode::NoInput),
            101 => Some(ResponseCode::InvalidInput),
            102 => Some(ResponseCode::NotFound),
            200 => Some(ResponseCode::UnexpectedError),
            _ => None,
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ResponseCode::SingleWorkSummary => 0,
            ResponseCode::SingleWorkDetail => 2,
            ResponseCode::MultiWork => 4,
            ResponseCode::NoInput => 100,
            ResponseCode::InvalidInput => 101,
            ResponseCode::NotFound => 102,
            ResponseCode::UnexpectedError => 200,
        }
    }

    pub fn is_single_work(&self) -> bool {
        matches!(
            self,
            ResponseCode::SingleWorkSummary | ResponseCode::SingleWorkDetail
        )
    }

    pub fn is_multi_work(&self) -> bool {
        matches!(self, ResponseCode::MultiWork)
    }

    /// Codes >= 100 all mean the query did not resolve.
    pub fn is_unresolved(&self) -> bool {
        self.code() >= 100
    }
}

/// The two classifiers extracted from a single-work response. Either value
/// may be empty when the corresponding recommendation is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub ddc: String,
    pub lcc: String,
}

fn attr_value(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Read the response code from a Classify payload. `None` means the payload
/// is malformed or carries no recognizable response node; callers treat that
/// the same as an unresolved query.
pub fn classify_response(xml: &str) -> Option<ResponseCode> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let qname = e.name();
                if qname.local_name().as_ref() == b"response" {
                    return attr_value(&e, b"code")
                        .and_then(|c| c.parse::<u32>().ok())
                        .and_then(ResponseCode::from_code);
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => (),
        }
        buf.clear();
    }
}

/// Extract the most popular DDC and LCC recommendations from a single-work
/// response. Each side is independently optional; a missing node yields an
/// empty string. Returns `None` when the response is not a single-work one.
pub fn extract_classifiers(xml: &str) -> Option<Classification> {
    if !classify_response(xml)?.is_single_work() {
        return None;
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut result = Classification::default();
    // Which recommendation subtree we are inside, if any
    let mut section: Option<&'static str> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let qname = e.name();
                match qname.local_name().as_ref() {
                    b"ddc" => section = Some("ddc"),
                    b"lcc" => section = Some("lcc"),
                    b"mostPopular" => {
                        if let Some(nsfa) = attr_value(&e, b"nsfa") {
                            match section {
                                Some("ddc") if result.ddc.is_empty() => result.ddc = nsfa,
                                Some("lcc") if result.lcc.is_empty() => result.lcc = nsfa,
                                _ => {}
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let qname = e.name();
                match qname.local_name().as_ref() {
                    b"ddc" | b"lcc" => section = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => (),
        }
        buf.clear();
    }

    Some(result)
}

/// Pull the work index of the first candidate work out of a multi-work
/// response, for the disambiguating second lookup. `None` when the response
/// is not multi-work or lists no works.
pub fn resolve_work_index(xml: &str) -> Option<String> {
    if !classify_response(xml)?.is_multi_work() {
        return None;
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let qname = e.name();
                if qname.local_name().as_ref() == b"work" {
                    return attr_value(&e, b"wi").filter(|wi| !wi.is_empty());
                }
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => (),
        }
        buf.clear();
    }
}
