use lvl::import::{Advisory, ExistingRecordsIndex, RecordRequest, SkipReason};
use lvl::record_store::{DynRecordStore, RecordStore};
use lvl::zone::{RecordType, ZoneEntry};
use lvl::{apply_plan, plan_import, FileRecordStore, ZoneParser};
use std::sync::Arc;
use tokio::sync::RwLock;

const ZONE: &str = r#"
; Zone file for example.com
$ORIGIN example.com.
$TTL 3600
@       IN  SOA   ns1.example.net. hostmaster.example.net. (
                  2024010101 ; serial
                  14400      ; refresh
                  3600       ; retry
                  1209600    ; expire
                  3600 )     ; minimum
        IN  NS    ns1.example.net.
        IN  NS    ns2.example.net.
        IN  MX    10 smtp1.example.net.
            MX    20 smtp2.example.net.
            TXT   "v=spf1 include:_spf.example.net " "~all"
            A     192.0.2.10

www         A     192.0.2.10
www     300 AAAA  2001:db8::10
ftp         CNAME www
reverse     PTR   www.example.com.
_sip._tcp   SRV   0 5 5060 sip.example.com.

$ORIGIN dev.example.com.
api         A     192.0.2.20
"#;

async fn store_at(path: &str) -> (DynRecordStore, ExistingRecordsIndex) {
    let store = FileRecordStore::try_from_file(path).await.unwrap();
    let index = ExistingRecordsIndex::from_records(&store.records().await);
    let store: DynRecordStore = Arc::new(RwLock::new(store));
    (store, index)
}

fn request(name: &str, record_type: &str, content: &str, priority: i32) -> RecordRequest {
    RecordRequest {
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
        priority,
    }
}

#[test]
fn entries_in_source_order() {
    let entries: Vec<ZoneEntry> = ZoneParser::new(ZONE.as_bytes())
        .filter_map(Result::ok)
        .collect();
    // 16 logical entries, one of which (PTR) fails to parse.
    assert_eq!(entries.len(), 15);
    assert_eq!(entries[0], ZoneEntry::Origin("example.com.".to_string()));
    assert_eq!(entries[1], ZoneEntry::Ttl(3600));
    let types: Vec<RecordType> = entries
        .iter()
        .filter_map(|entry| match entry {
            ZoneEntry::Record(record) => Some(record.record_type),
            _ => None,
        })
        .collect();
    assert_eq!(
        types,
        vec![
            RecordType::SOA,
            RecordType::NS,
            RecordType::NS,
            RecordType::MX,
            RecordType::MX,
            RecordType::TXT,
            RecordType::A,
            RecordType::A,
            RecordType::AAAA,
            RecordType::CNAME,
            RecordType::SRV,
            RecordType::A,
        ]
    );
}

#[tokio::test]
async fn import_into_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let path = path.to_str().unwrap();

    let (store, index) = store_at(path).await;
    assert!(index.is_empty());

    let plan = plan_import("example.com.", ZONE.as_bytes(), &index).unwrap();
    assert_eq!(
        plan.to_create,
        vec![
            request("", "MX", "smtp1.example.net.", 10),
            request("", "MX", "smtp2.example.net.", 20),
            request("", "TXT", "v=spf1 include:_spf.example.net ~all", 0),
            request("", "A", "192.0.2.10", 0),
            request("www", "A", "192.0.2.10", 0),
            request("www", "AAAA", "2001:db8::10", 0),
            request("ftp", "CNAME", "www", 0),
            request("_sip._tcp", "SRV", "0 5 5060 sip.example.com.", 0),
            request("api.dev", "A", "192.0.2.20", 0),
        ]
    );
    assert_eq!(
        plan.advisories,
        vec![
            Advisory::TtlDirectiveIgnored,
            Advisory::UnsupportedTypeIgnored,
            Advisory::ApexNsIgnored,
            Advisory::RecordTtlIgnored,
        ]
    );
    let reasons: Vec<_> = plan.skipped.iter().map(|s| s.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::UnsupportedType(RecordType::SOA),
            SkipReason::ApexNs,
            SkipReason::ApexNs,
        ]
    );
    assert_eq!(plan.parse_errors.len(), 1);
    assert_eq!(plan.parse_errors[0].line, 21);

    apply_plan(&store, &plan).await.unwrap();

    // Importing again replaces everything created by the first run.
    let (store, index) = store_at(path).await;
    assert_eq!(index.len(), 9);
    let second = plan_import("example.com.", ZONE.as_bytes(), &index).unwrap();
    assert_eq!(second.to_create, plan.to_create);
    assert_eq!(
        second.to_replace.iter().copied().collect::<Vec<_>>(),
        (1..=9).collect::<Vec<_>>()
    );

    apply_plan(&store, &second).await.unwrap();
    let records = store_at(path).await.0.read().await.records().await;
    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (10..=18).collect::<Vec<_>>());
}
