//! Planning the import of a zone file into a domain.
//!
//! Records are matched with the records the domain already has by type and name only. Every
//! existing record sharing a type and name with an imported record is slated for replacement,
//! whether or not its content differs, so importing the same zone file twice plans to delete the
//! records created by the first run and create them again.
//!
//! # Record content
//!
//! | Type               | content                     | priority   |
//! |--------------------|-----------------------------|------------|
//! | A, AAAA, CNAME     | first data item             | 0          |
//! | MX                 | second data item            | first item |
//! | TXT                | data items concatenated     | 0          |
//! | NS                 | first data item             | 0          |
//! | SRV, TLSA, CAA, DS | data items joined by spaces | 0          |
//!
//! NS records at the apex of the domain are not imported, and neither are `SOA` records or records
//! of a class other than `IN`.

mod apply;
mod model;
pub mod origin;

pub use apply::apply_plan;
pub use model::{
    Advisory, DomainRecord, ExistingRecordsIndex, ImportPlan, RecordId, RecordRequest,
    SkipReason, SkippedRecord,
};
pub use origin::normalize_origin;
use crate::error::{Error, ParseError};
use crate::zone::{DnsClass, RecordType, ResourceRecord, ZoneEntry, ZoneParser};
use std::collections::HashSet;
use std::io::Read;

/// Parse a zone file and plan its import into the zone `zone_origin` (e.g. `example.com.`).
///
/// Entries that fail to parse are logged and collected in [`ImportPlan::parse_errors`]; parsing
/// continues with the next line.
///
/// # Errors
///
/// Returns [`Error::IO`] if reading the zone file fails.
pub fn plan_import<R: Read>(
    zone_origin: &str,
    zone_file: R,
    existing: &ExistingRecordsIndex,
) -> Result<ImportPlan, Error> {
    let mut reconciler = Reconciler::new(zone_origin, existing);
    let mut parser = ZoneParser::new(zone_file);
    loop {
        match parser.next_entry() {
            Ok(Some(entry)) => reconciler.reconcile(&entry),
            Ok(None) => break,
            Err(Error::Parse(err)) => reconciler.record_parse_error(err),
            Err(err) => return Err(err),
        }
    }
    Ok(reconciler.finish())
}

/// Turns zone entries into an [`ImportPlan`], keeping track of the state carried from one entry
/// to the next.
#[derive(Debug)]
pub struct Reconciler<'a> {
    zone_origin: String,
    current_origin: String,
    // Sticky: applies to later records that leave the class out.
    current_class: Option<DnsClass>,
    last_domain: String,
    existing: &'a ExistingRecordsIndex,
    advised: HashSet<Advisory>,
    plan: ImportPlan,
}

impl<'a> Reconciler<'a> {
    pub fn new(zone_origin: &str, existing: &'a ExistingRecordsIndex) -> Self {
        Reconciler {
            zone_origin: zone_origin.to_string(),
            current_origin: zone_origin.to_string(),
            current_class: None,
            last_domain: "@".to_string(),
            existing,
            advised: HashSet::default(),
            plan: ImportPlan::default(),
        }
    }

    pub fn reconcile(&mut self, entry: &ZoneEntry) {
        match entry {
            ZoneEntry::Ttl(_) => self.advise(Advisory::TtlDirectiveIgnored),
            ZoneEntry::Origin(origin) => self.current_origin = origin.to_lowercase(),
            ZoneEntry::Include { .. } => self.advise(Advisory::IncludeIgnored),
            ZoneEntry::Record(record) => self.reconcile_record(record),
        }
    }

    pub fn record_parse_error(&mut self, err: ParseError) {
        tracing::warn!("error parsing record: {err}");
        self.plan.parse_errors.push(err);
    }

    #[must_use]
    pub fn finish(self) -> ImportPlan {
        self.plan
    }

    fn reconcile_record(&mut self, record: &ResourceRecord) {
        if record.ttl.is_some() {
            self.advise(Advisory::RecordTtlIgnored);
        }
        if let Some(class) = record.class {
            self.current_class = Some(class);
        }
        if let Some(domain_name) = &record.domain_name {
            self.last_domain = domain_name.to_lowercase();
        }

        match self.current_class {
            Some(DnsClass::IN) => {}
            Some(class) => return self.skip(record, SkipReason::UnsupportedClass(class)),
            None => return self.skip(record, SkipReason::MissingClass),
        }

        let mut name = normalize_origin(&self.last_domain, &self.current_origin, &self.zone_origin);
        if name == "@" {
            name.clear();
        }

        // Existing records of this type and name are replaced even if this record is skipped
        // below.
        let record_type = record.record_type.to_string();
        self.plan
            .to_replace
            .extend(self.existing.ids(&record_type, &name));

        let (content, priority) = match record_content(record, &name) {
            Ok(content) => content,
            Err(reason) => return self.skip(record, reason),
        };

        self.plan.to_create.push(RecordRequest {
            name,
            record_type,
            content,
            priority,
        });
    }

    fn skip(&mut self, record: &ResourceRecord, reason: SkipReason) {
        match reason.advisory() {
            Some(advisory) => {
                tracing::debug!("skipping record {record}: {reason}");
                self.advise(advisory);
            }
            None => tracing::warn!("skipping record {record}: {reason}"),
        }
        self.plan.skipped.push(SkippedRecord {
            record: record.clone(),
            reason,
        });
    }

    fn advise(&mut self, advisory: Advisory) {
        if self.advised.insert(advisory) {
            tracing::info!("note: {advisory}");
            self.plan.advisories.push(advisory);
        }
    }
}

/// Content and priority of the record to create for `record`, named `name`.
fn record_content(record: &ResourceRecord, name: &str) -> Result<(String, i32), SkipReason> {
    let data = &record.data;
    let first = || data.first().cloned().ok_or(SkipReason::MissingData);
    match record.record_type {
        RecordType::A | RecordType::AAAA | RecordType::CNAME => Ok((first()?, 0)),
        RecordType::MX => {
            let [priority, exchange, ..] = data.as_slice() else {
                return Err(SkipReason::MissingData);
            };
            let priority = priority
                .parse::<i32>()
                .map_err(|_| SkipReason::InvalidMxPriority(priority.clone()))?;
            Ok((exchange.clone(), priority))
        }
        RecordType::TXT => Ok((data.concat(), 0)),
        RecordType::NS if name.is_empty() => Err(SkipReason::ApexNs),
        RecordType::NS => Ok((first()?, 0)),
        RecordType::SRV | RecordType::TLSA | RecordType::CAA | RecordType::DS => {
            Ok((data.join(" "), 0))
        }
        RecordType::SOA => Err(SkipReason::UnsupportedType(record.record_type)),
    }
}
