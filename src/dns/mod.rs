use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use log::{debug, info};

use crate::client::{Auth, CfRecord, CfZone, Cli};
use crate::error::{Error, Result};
use crate::record::{RecordKey, RecordSpec, RecordType, Ttl};

#[cfg(test)]
mod unit_test;

pub type ZoneName = String;

////////////////////////////////////////////////////////////
// Summaries
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSummary {
    pub id: String,
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub id: String,
    pub name: String,
    pub rtype: RecordType,
    pub content: String,
    pub ttl: Ttl,
    pub priority: Option<u16>,
    pub proxied: bool,
}

pub type RecordMap = BTreeMap<RecordKey, RecordSummary>;

////////////////////////////////////////////////////////////
// Record selection for deletes
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSelector {
    Id(String),
    NameType(String, RecordType),
}

impl fmt::Display for RecordSelector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordSelector::Id(id) => write!(f, "id {}", id),
            RecordSelector::NameType(name, rtype) => write!(f, "{}/{}", name, rtype),
        }
    }
}

////////////////////////////////////////////////////////////
// Upsert planning
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UpsertAction {
    Create,
    Update(String),
    Noop,
}

// The comment field is deliberately left out of the comparison. It does not
// affect resolution, and touching a record for a comment change would churn
// Cloudflare's modified_on timestamps.
fn record_matches(current: &CfRecord, spec: &RecordSpec) -> bool {
    current.rtype == spec.rtype
        && current.name == spec.name
        && current.content == spec.content
        && current.ttl == spec.ttl
        && current.priority == spec.priority
        && current.proxied == spec.proxied
}

pub(crate) fn plan_upsert(existing: Option<&CfRecord>, spec: &RecordSpec) -> UpsertAction {
    match existing {
        None => UpsertAction::Create,
        Some(current) if record_matches(current, spec) => UpsertAction::Noop,
        // A cached record without an id cannot be addressed for an update,
        // so it is treated as absent rather than PUT against a broken URL.
        Some(current) => match &current.id {
            Some(id) => UpsertAction::Update(id.clone()),
            None => UpsertAction::Create,
        },
    }
}

////////////////////////////////////////////////////////////
// Session
////////////////////////////////////////////////////////////
struct ZoneEntry {
    zone: CfZone,
    records: Option<HashMap<RecordKey, CfRecord>>,
}

// A session over one account's zones. Zone and record listings are cached
// in memory for the lifetime of the value; nothing is persisted.
pub struct DnsRecords {
    cli: Cli,
    zones: Option<HashMap<ZoneName, ZoneEntry>>,
}

impl DnsRecords {
    pub fn new(auth: Auth) -> Self {
        Self {
            cli: Cli::new(auth),
            zones: None,
        }
    }

    pub async fn zones(&mut self) -> Result<BTreeMap<ZoneName, ZoneSummary>> {
        self.refresh_zones().await?;
        Ok(self.simplified_zones())
    }

    pub async fn records(&mut self, zone_name: &str) -> Result<RecordMap> {
        self.ensure_zones().await?;
        self.refresh_records(zone_name).await?;
        self.simplified_records(zone_name)
    }

    // Create the record, or replace the cached (name, type) twin when one
    // exists and differs. An identical record is left alone.
    pub async fn upsert(&mut self, zone_name: &str, spec: RecordSpec) -> Result<RecordMap> {
        spec.validate()?;
        self.ensure_zones().await?;
        self.ensure_records(zone_name).await?;

        let entry = self.zone_entry(zone_name)?;
        let zone_id = entry.zone.id.clone();
        let existing = entry
            .records
            .as_ref()
            .and_then(|records| records.get(&spec.key()));

        match plan_upsert(existing, &spec) {
            UpsertAction::Create => {
                info!("creating record {} in zone {}", spec.key(), zone_name);
                self.cli
                    .record_op_create(&zone_id, &CfRecord::from(spec))
                    .await?;
            }
            UpsertAction::Update(record_id) => {
                info!("updating record {} in zone {}", spec.key(), zone_name);
                self.cli
                    .record_op_update(&zone_id, &record_id, &CfRecord::from(spec))
                    .await?;
            }
            UpsertAction::Noop => {
                debug!("record {} already up to date", spec.key());
            }
        }

        self.records(zone_name).await
    }

    pub async fn delete(&mut self, zone_name: &str, selector: RecordSelector) -> Result<RecordMap> {
        self.ensure_zones().await?;
        self.ensure_records(zone_name).await?;

        let entry = self.zone_entry(zone_name)?;
        let zone_id = entry.zone.id.clone();

        let record_id = match &selector {
            RecordSelector::Id(id) => Some(id.clone()),
            RecordSelector::NameType(name, rtype) => entry
                .records
                .as_ref()
                .and_then(|records| records.get(&RecordKey::new(name.clone(), *rtype)))
                .and_then(|record| record.id.clone()),
        };

        let Some(record_id) = record_id else {
            return Err(Error::RecordNotFound(selector.to_string()));
        };

        info!("deleting record {} in zone {}", selector, zone_name);
        self.cli.record_op_delete(&zone_id, &record_id).await?;

        self.records(zone_name).await
    }
}

impl DnsRecords {
    async fn refresh_zones(&mut self) -> Result<()> {
        let listed = self.cli.zones_list().await?;
        let zones = listed
            .into_iter()
            .map(|zone| {
                (
                    zone.name.clone(),
                    ZoneEntry {
                        zone,
                        records: None,
                    },
                )
            })
            .collect();
        self.zones = Some(zones);
        Ok(())
    }

    async fn ensure_zones(&mut self) -> Result<()> {
        if self.zones.is_none() {
            self.refresh_zones().await?;
        }
        Ok(())
    }

    async fn refresh_records(&mut self, zone_name: &str) -> Result<()> {
        let zone_id = self.zone_entry(zone_name)?.zone.id.clone();
        let listed = self.cli.records_list(&zone_id).await?;
        let records = listed
            .into_iter()
            .map(|record| (RecordKey::new(record.name.clone(), record.rtype), record))
            .collect();
        self.zone_entry_mut(zone_name)?.records = Some(records);
        Ok(())
    }

    async fn ensure_records(&mut self, zone_name: &str) -> Result<()> {
        if self.zone_entry(zone_name)?.records.is_none() {
            self.refresh_records(zone_name).await?;
        }
        Ok(())
    }

    fn zone_entry(&self, zone_name: &str) -> Result<&ZoneEntry> {
        self.zones
            .as_ref()
            .and_then(|zones| zones.get(zone_name))
            .ok_or_else(|| Error::ZoneNotFound(zone_name.to_string()))
    }

    fn zone_entry_mut(&mut self, zone_name: &str) -> Result<&mut ZoneEntry> {
        self.zones
            .as_mut()
            .and_then(|zones| zones.get_mut(zone_name))
            .ok_or_else(|| Error::ZoneNotFound(zone_name.to_string()))
    }

    fn simplified_zones(&self) -> BTreeMap<ZoneName, ZoneSummary> {
        self.zones
            .iter()
            .flatten()
            .map(|(name, entry)| {
                (
                    name.clone(),
                    ZoneSummary {
                        id: entry.zone.id.clone(),
                        name: entry.zone.name.clone(),
                        status: entry.zone.status.clone(),
                    },
                )
            })
            .collect()
    }

    fn simplified_records(&self, zone_name: &str) -> Result<RecordMap> {
        let entry = self.zone_entry(zone_name)?;
        let simplified = entry
            .records
            .iter()
            .flatten()
            .map(|(key, record)| {
                (
                    key.clone(),
                    RecordSummary {
                        id: record.id.clone().unwrap_or_default(),
                        name: record.name.clone(),
                        rtype: record.rtype,
                        content: record.content.clone(),
                        ttl: record.ttl,
                        priority: record.priority,
                        proxied: record.proxied,
                    },
                )
            })
            .collect();
        Ok(simplified)
    }
}
