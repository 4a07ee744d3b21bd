use crate::error::ParseError;
use crate::zone::{DnsClass, RecordType, ResourceRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub type RecordId = u64;

/// A record as it exists for a domain before the import.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DomainRecord {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub priority: i32,
}

/// A record to create. `name` is relative to the domain, the apex is `""`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    record_type: String,
    name: String,
}

/// Existing record ids by record type and name.
#[derive(Default, Debug, Clone)]
pub struct ExistingRecordsIndex {
    ids: HashMap<RecordKey, Vec<RecordId>>,
}

impl ExistingRecordsIndex {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DomainRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            index.insert(&record.record_type, &record.name, record.id);
        }
        index
    }

    pub fn insert(&mut self, record_type: &str, name: &str, id: RecordId) {
        let key = RecordKey {
            record_type: record_type.to_string(),
            name: name.to_string(),
        };
        self.ids.entry(key).or_default().push(id);
    }

    #[must_use]
    pub fn ids(&self, record_type: &str, name: &str) -> &[RecordId] {
        let key = RecordKey {
            record_type: record_type.to_string(),
            name: name.to_string(),
        };
        self.ids.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Informational notes about parts of a zone file that are not imported. Each is reported once
/// per import.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Advisory {
    TtlDirectiveIgnored,
    RecordTtlIgnored,
    NonInClassIgnored,
    ApexNsIgnored,
    UnsupportedTypeIgnored,
    IncludeIgnored,
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Advisory::TtlDirectiveIgnored => {
                "TTL directives are not imported, set TTL manually after import"
            }
            Advisory::RecordTtlIgnored => {
                "per-record TTL values are not supported, TTL values will be ignored"
            }
            Advisory::NonInClassIgnored => "non-IN records are not supported, ignoring",
            Advisory::ApexNsIgnored => "NS records at the domain origin are ignored",
            Advisory::UnsupportedTypeIgnored => {
                "some record types are not supported for import, ignoring"
            }
            Advisory::IncludeIgnored => "$INCLUDE directives are not followed, ignoring",
        })
    }
}

/// Why a parsed record did not make it into the plan.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No class given for the record, nor for any record before it.
    MissingClass,
    UnsupportedClass(DnsClass),
    InvalidMxPriority(String),
    ApexNs,
    UnsupportedType(RecordType),
    /// Fewer `<RDATA>` items than the record type needs.
    MissingData,
}

impl SkipReason {
    /// The advisory covering this reason, if it is routine enough not to warn about every record.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        match self {
            SkipReason::UnsupportedClass(_) => Some(Advisory::NonInClassIgnored),
            SkipReason::ApexNs => Some(Advisory::ApexNsIgnored),
            SkipReason::UnsupportedType(_) => Some(Advisory::UnsupportedTypeIgnored),
            SkipReason::MissingClass
            | SkipReason::InvalidMxPriority(_)
            | SkipReason::MissingData => None,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingClass => f.write_str("no DNS class given for record"),
            SkipReason::UnsupportedClass(class) => write!(f, "{class} records are not supported"),
            SkipReason::InvalidMxPriority(priority) => {
                write!(f, "invalid priority in MX record: '{priority}'")
            }
            SkipReason::ApexNs => f.write_str("NS record at domain origin"),
            SkipReason::UnsupportedType(record_type) => {
                write!(f, "importing {record_type} records is not supported")
            }
            SkipReason::MissingData => f.write_str("record data is incomplete"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub record: ResourceRecord,
    pub reason: SkipReason,
}

/// The outcome of reconciling a zone file with the records a domain already has.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Existing records sharing a type and name with an imported record.
    pub to_replace: BTreeSet<RecordId>,
    /// Records to create, in zone file order.
    pub to_create: Vec<RecordRequest>,
    pub advisories: Vec<Advisory>,
    pub skipped: Vec<SkippedRecord>,
    pub parse_errors: Vec<ParseError>,
}
