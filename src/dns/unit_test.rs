use std::collections::HashMap;

use super::*;
use crate::client::{Auth, CfRecord, CfZone, Cli};
use crate::error::Error;
use crate::record::{RecordKey, RecordSpec, RecordType, Ttl};

fn spec() -> RecordSpec {
    RecordSpec {
        rtype: RecordType::TXT,
        name: "cfdns.example.com".to_string(),
        content: "Insert TEST".to_string(),
        ttl: Ttl::Auto,
        priority: None,
        proxied: false,
        comment: None,
    }
}

fn cf_record(id: &str, spec: &RecordSpec) -> CfRecord {
    let mut record = CfRecord::from(spec.clone());
    record.id = Some(id.to_string());
    record
}

#[test]
fn test_plan_upsert_create() {
    assert_eq!(plan_upsert(None, &spec()), UpsertAction::Create);
}

#[test]
fn test_plan_upsert_noop_when_identical() {
    let spec = spec();
    let existing = cf_record("abc123", &spec);
    assert_eq!(plan_upsert(Some(&existing), &spec), UpsertAction::Noop);
}

#[test]
fn test_plan_upsert_update_when_content_differs() {
    let spec = spec();
    let mut existing = cf_record("abc123", &spec);
    existing.content = "Old value".to_string();
    assert_eq!(
        plan_upsert(Some(&existing), &spec),
        UpsertAction::Update("abc123".to_string())
    );
}

#[test]
fn test_plan_upsert_update_when_ttl_differs() {
    let spec = spec();
    let mut existing = cf_record("abc123", &spec);
    existing.ttl = Ttl::Value(3600);
    assert_eq!(
        plan_upsert(Some(&existing), &spec),
        UpsertAction::Update("abc123".to_string())
    );
}

#[test]
fn test_plan_upsert_create_when_cached_record_has_no_id() {
    let spec = spec();
    let mut existing = cf_record("abc123", &spec);
    existing.id = None;
    existing.content = "Old value".to_string();
    assert_eq!(plan_upsert(Some(&existing), &spec), UpsertAction::Create);
}

#[test]
fn test_plan_upsert_ignores_comment() {
    let spec = spec();
    let mut existing = cf_record("abc123", &spec);
    existing.comment = Some("left over from last week".to_string());
    assert_eq!(plan_upsert(Some(&existing), &spec), UpsertAction::Noop);
}

////////////////////////////////////////////////////////////
// Cache and simplification, no network involved
////////////////////////////////////////////////////////////
fn session_with_zone(records: Vec<CfRecord>) -> DnsRecords {
    let zone = CfZone {
        id: "023e105f4ecef8ad9ca31a8372d0c353".to_string(),
        name: "example.com".to_string(),
        status: "active".to_string(),
    };

    let records = records
        .into_iter()
        .map(|record| (RecordKey::new(record.name.clone(), record.rtype), record))
        .collect::<HashMap<_, _>>();

    let mut zones = HashMap::new();
    zones.insert(
        zone.name.clone(),
        ZoneEntry {
            zone,
            records: Some(records),
        },
    );

    DnsRecords {
        cli: Cli::new(Auth::ApiToken("test-token".to_string())),
        zones: Some(zones),
    }
}

#[test]
fn test_simplified_zones() {
    let session = session_with_zone(vec![]);
    let zones = session.simplified_zones();

    assert_eq!(zones.len(), 1);
    let zone = &zones["example.com"];
    assert_eq!(zone.id, "023e105f4ecef8ad9ca31a8372d0c353");
    assert_eq!(zone.status, "active");
}

#[test]
fn test_simplified_records_keyed_by_name_and_type() {
    let spec = spec();
    let session = session_with_zone(vec![
        cf_record("abc123", &spec),
        CfRecord {
            id: Some("def456".to_string()),
            rtype: RecordType::MX,
            name: "example.com".to_string(),
            content: "mail.example.com".to_string(),
            ttl: Ttl::Value(3600),
            priority: Some(10),
            proxied: false,
            comment: None,
        },
    ]);

    let records = session.simplified_records("example.com").unwrap();
    assert_eq!(records.len(), 2);

    let txt = &records[&RecordKey::new("cfdns.example.com", RecordType::TXT)];
    assert_eq!(txt.id, "abc123");
    assert_eq!(txt.priority, None);

    let mx = &records[&RecordKey::new("example.com", RecordType::MX)];
    assert_eq!(mx.id, "def456");
    assert_eq!(mx.priority, Some(10));
}

#[test]
fn test_unknown_zone() {
    let session = session_with_zone(vec![]);
    match session.simplified_records("other.org") {
        Err(Error::ZoneNotFound(name)) => assert_eq!(name, "other.org"),
        other => panic!("expected zone not found, got {:?}", other),
    }
}

////////////////////////////////////////////////////////////
// Live test, run with a real account:
//   CF_API_TOKEN=... CF_ZONE_NAME=... cargo test -- --ignored
////////////////////////////////////////////////////////////
#[tokio::test]
#[ignore = "talks to the live Cloudflare API"]
async fn test_live_upsert_and_delete() {
    let token = std::env::var("CF_API_TOKEN").unwrap();
    let zone_name = std::env::var("CF_ZONE_NAME").unwrap();

    let mut dns = DnsRecords::new(Auth::ApiToken(token));

    let mut spec = spec();
    spec.name = format!("cfdns-test.{}", zone_name);

    let records = dns.upsert(&zone_name, spec.clone()).await.unwrap();
    let created = &records[&spec.key()];
    assert_eq!(created.content, spec.content);

    spec.content = "Update TEST".to_string();
    let records = dns.upsert(&zone_name, spec.clone()).await.unwrap();
    assert_eq!(records[&spec.key()].content, "Update TEST");

    let selector = RecordSelector::NameType(spec.name.clone(), spec.rtype);
    let records = dns.delete(&zone_name, selector).await.unwrap();
    assert!(!records.contains_key(&spec.key()));
}
