//! Error types.

use crate::import::RecordId;
use serde::Serialize;
use trust_dns_proto::error::ProtoError;

/// Error enumerates the possible `lvl` zone import error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned by [`ZoneParser::next_entry`][crate::zone::ZoneParser::next_entry] when an entry
    /// of the zone file is malformed. The parser has already moved past the offending line, so
    /// callers can log the error and keep reading.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Returned when a generic IO error occurs. When this comes out of the zone parser the input
    /// stream is considered broken and parsing should stop.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when processing JSON from disk (e.g. to
    /// [trying to load a `Config`][crate::config::Config::try_from_file], or to
    /// [trying to load a `FileRecordStore`][crate::record_store::file::FileRecordStore::try_from_file])
    /// fails due to invalid JSON content.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),

    /// Returned when a domain name given on the command line can't be parsed.
    #[error("DNS error")]
    DNSError(#[from] ProtoError),

    /// Returned when the domain to import into can't be used as a zone origin, e.g. the root.
    #[error("invalid zone origin: \"{0}\"")]
    InvalidOrigin(String),

    /// Returned by a [`RecordStore`][crate::record_store::RecordStore] asked to delete a record
    /// it doesn't hold.
    #[error("record {0} does not exist")]
    RecordNotFound(RecordId),

    /// Returned when a loaded [`Config`][crate::config::Config] fails validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// A zone file entry that could not be parsed, with the line the entry started on.
#[derive(thiserror::Error, Serialize, Debug, Clone, PartialEq, Eq)]
#[error("error on directive starting at line {line}: {kind}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: u32,
    pub kind: ParseErrorKind,
}

#[derive(thiserror::Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unknown record type: '{0}'")]
    UnknownRecordType(String),

    #[error("invalid domain class, TTL value or record type: '{0}'")]
    InvalidRecordItem(String),

    #[error("found second number when TTL value already given: '{0}'")]
    DuplicateTtl(String),

    #[error("found second DNS class when DNS class already given: '{0}'")]
    DuplicateClass(String),

    #[error("error parsing TTL value '{0}'")]
    InvalidTtl(String),

    #[error("unknown directive: '{0}'")]
    UnknownDirective(String),

    #[error("missing value for {0} directive")]
    MissingDirectiveValue(&'static str),

    #[error("missing record type")]
    MissingRecordType,

    #[error("found opening parentheses while already inside parentheses")]
    NestedParentheses,

    #[error("found closing parentheses but not inside parentheses")]
    UnopenedParentheses,

    #[error("unclosed parentheses pair starting at line {0}")]
    UnclosedParentheses(u32),

    #[error("early EOF while parsing quoted item")]
    UnterminatedQuote,

    #[error("unexpected item found after directive: '{0}'")]
    UnexpectedItem(String),

    #[error("item is not valid UTF-8")]
    InvalidUtf8,
}
