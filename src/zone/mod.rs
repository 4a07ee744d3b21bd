//! Zone file entries and parser.
//!
//! The parser reads the structure of an [RFC-1035][RFC-1035] style zone file and does not try
//! to derive meaning from it: TTL values are not merged into records, owner names are not made
//! absolute and record data is handed out as the raw list of items. Only the record types
//! [`RecordType`] lists are known, since they are needed to tell the optional `[<TTL>] [<class>]`
//! fields of a record apart from its type.
//!
//! ```text
//! $TTL 300
//! @   IN  SOA  ns1.example.com. hostmaster.example.com. (
//!              2100000044 ; serial
//!              14400      ; refresh
//!              3600       ; retry
//!              1209600    ; expire
//!              3600 )     ; minimum
//! www     A    192.0.2.1
//!         AAAA 2001:db8::1
//! ```
//!
//! References:
//! * [RFC-1035 section 5][RFC-1035]
//! * [RFC-2308 section 4](https://www.rfc-editor.org/rfc/rfc2308#section-4)
//! * [IANA DNS parameters](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml)
//!
//! [RFC-1035]: https://www.rfc-editor.org/rfc/rfc1035#section-5

pub mod parser;

pub use parser::ZoneParser;
use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// TTL value in seconds.
pub type RecordTtl = u32;

/// DNS classes a record may be given in.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsClass {
    IN = 1,
    CH = 3,
    HS = 4,
}

/// Record types that can be imported, plus `SOA` since nearly every zone file has one.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A = 1,
    NS = 2,
    CNAME = 5,
    SOA = 6,
    MX = 15,
    TXT = 16,
    AAAA = 28,
    SRV = 33,
    DS = 43,
    TLSA = 52,
    CAA = 257,
}

lazy_static! {
    static ref CLASSES: HashMap<&'static str, DnsClass> = [
        ("IN", DnsClass::IN),
        ("CH", DnsClass::CH),
        ("HS", DnsClass::HS),
    ]
    .into_iter()
    .collect();
    static ref RECORD_TYPES: HashMap<&'static str, RecordType> = [
        ("A", RecordType::A),
        ("NS", RecordType::NS),
        ("CNAME", RecordType::CNAME),
        ("SOA", RecordType::SOA),
        ("MX", RecordType::MX),
        ("TXT", RecordType::TXT),
        ("AAAA", RecordType::AAAA),
        ("SRV", RecordType::SRV),
        ("DS", RecordType::DS),
        ("TLSA", RecordType::TLSA),
        ("CAA", RecordType::CAA),
    ]
    .into_iter()
    .collect();
}

impl DnsClass {
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        CLASSES.get(mnemonic).copied()
    }

    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            DnsClass::IN => "IN",
            DnsClass::CH => "CH",
            DnsClass::HS => "HS",
        }
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl RecordType {
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        RECORD_TYPES.get(mnemonic).copied()
    }

    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::NS => "NS",
            RecordType::CNAME => "CNAME",
            RecordType::SOA => "SOA",
            RecordType::MX => "MX",
            RecordType::TXT => "TXT",
            RecordType::AAAA => "AAAA",
            RecordType::SRV => "SRV",
            RecordType::DS => "DS",
            RecordType::TLSA => "TLSA",
            RecordType::CAA => "CAA",
        }
    }

    /// The IANA assigned TYPE value.
    #[must_use]
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single entry of a zone file: a directive or a resource record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum ZoneEntry {
    /// `$TTL <ttl>`
    Ttl(RecordTtl),

    /// `$ORIGIN <domain-name>`
    Origin(String),

    /// `$INCLUDE <file-name> [<domain-name>]`
    Include {
        file_name: String,
        domain_name: Option<String>,
    },

    Record(ResourceRecord),
}

/// A resource record line.
///
/// Fields that are optional in the zone file syntax are `None` when the line leaves them out.
/// An owner of `None` means the record belongs to the owner of the previous record.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub domain_name: Option<String>,
    pub class: Option<DnsClass>,
    pub ttl: Option<RecordTtl>,
    pub record_type: RecordType,
    /// Unstructured `<RDATA>` items, quotes removed.
    pub data: Vec<String>,
}

impl fmt::Display for ZoneEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneEntry::Ttl(ttl) => write!(f, "$TTL {ttl}"),
            ZoneEntry::Origin(domain_name) => write!(f, "$ORIGIN {domain_name}"),
            ZoneEntry::Include {
                file_name,
                domain_name: Some(domain_name),
            } => write!(f, "$INCLUDE {file_name} {domain_name}"),
            ZoneEntry::Include {
                file_name,
                domain_name: None,
            } => write!(f, "$INCLUDE {file_name}"),
            ZoneEntry::Record(record) => record.fmt(f),
        }
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain = self.domain_name.as_deref().unwrap_or_default();
        let class = self.class.map(DnsClass::mnemonic).unwrap_or_default();
        let ttl = self.ttl.map(|ttl| ttl.to_string()).unwrap_or_default();
        write!(
            f,
            "{domain}\t{class}\t{ttl}\t{}\t{}",
            self.record_type,
            self.data.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonics() {
        assert_eq!(RecordType::from_mnemonic("CAA"), Some(RecordType::CAA));
        assert_eq!(RecordType::from_mnemonic("PTR"), None);
        assert_eq!(RecordType::from_mnemonic("a"), None);
        assert_eq!(DnsClass::from_mnemonic("HS"), Some(DnsClass::HS));
        assert_eq!(RecordType::CAA.code(), 257);
        assert_eq!(DnsClass::CH as u16, 3);
        assert_eq!(RecordType::AAAA.to_string(), "AAAA");
    }

    #[test]
    fn display_record() {
        let record = ResourceRecord {
            domain_name: Some("mail".to_string()),
            class: Some(DnsClass::IN),
            ttl: None,
            record_type: RecordType::MX,
            data: vec!["10".to_string(), "smtp.example.com.".to_string()],
        };
        assert_eq!(
            ZoneEntry::Record(record).to_string(),
            "mail\tIN\t\tMX\t10, smtp.example.com."
        );
        assert_eq!(ZoneEntry::Ttl(300).to_string(), "$TTL 300");
    }
}
