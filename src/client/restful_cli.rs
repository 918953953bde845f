use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::{RecordSpec, RecordType, Ttl};
use crate::wrapper::http::{Client, Header, HeaderKey, Response};

const BASE_URL: &str = "https://api.cloudflare.com/client/v4";

// Cloudflare caps list responses at 100 items per page.
const PER_PAGE: u32 = 100;

////////////////////////////////////////////////////////////
// Authentication
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Auth {
    ApiToken(String),
    ApiKey { email: String, key: String },
}

impl From<&Auth> for Vec<Header> {
    fn from(auth: &Auth) -> Self {
        match auth {
            Auth::ApiToken(api_token) => vec![Header::new(
                HeaderKey::Authorization,
                format!("Bearer {}", api_token),
            )],
            Auth::ApiKey { email, key } => vec![
                Header::new(HeaderKey::Custom("X-Auth-Email".to_string()), email.clone()),
                Header::new(HeaderKey::Custom("X-Auth-Key".to_string()), key.clone()),
            ],
        }
    }
}

////////////////////////////////////////////////////////////
// Response envelope
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
pub(super) struct CfApiError {
    pub(super) code: i32,
    pub(super) message: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(super) struct ResultInfo {
    pub(super) page: u32,
    pub(super) total_pages: u32,
}

// One page is all there is when the envelope carries no result_info.
pub(super) fn next_page(info: Option<ResultInfo>) -> Option<u32> {
    let info = info?;
    (info.page < info.total_pages).then(|| info.page + 1)
}

#[derive(Debug, Deserialize)]
pub(super) struct CfResponse<T> {
    success: bool,

    #[serde(default)]
    errors: Vec<CfApiError>,

    result: Option<T>,
    result_info: Option<ResultInfo>,
}

impl<T> CfResponse<T> {
    pub(super) fn into_result(self) -> Result<(T, Option<ResultInfo>)> {
        if !self.success {
            let err = self.errors.into_iter().next().unwrap_or(CfApiError {
                code: 0,
                message: "unspecified cloudflare error".to_string(),
            });
            return Err(Error::ApiError {
                code: err.code,
                message: err.message,
            });
        }

        match self.result {
            Some(result) => Ok((result, self.result_info)),
            None => Err(Error::ParseError(
                "cloudflare response carries no result".to_string(),
            )),
        }
    }
}

////////////////////////////////////////////////////////////
// Wire types
////////////////////////////////////////////////////////////
#[derive(Debug, Clone, Deserialize)]
pub struct CfZone {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub rtype: RecordType,

    pub name: String,
    pub content: String,

    #[serde(default)]
    pub ttl: Ttl,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,

    #[serde(default)]
    pub proxied: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl From<RecordSpec> for CfRecord {
    fn from(spec: RecordSpec) -> Self {
        Self {
            id: None,
            rtype: spec.rtype,
            name: spec.name,
            content: spec.content,
            ttl: spec.ttl,
            priority: spec.priority,
            proxied: spec.proxied,
            comment: spec.comment,
        }
    }
}

////////////////////////////////////////////////////////////
// Client
////////////////////////////////////////////////////////////
pub struct Cli {
    cli: Client,
}

impl Cli {
    pub fn new(auth: Auth) -> Self {
        let mut headers: Vec<Header> = (&auth).into();
        headers.push(Header::new(
            HeaderKey::ContentType,
            "application/json".to_string(),
        ));

        Self {
            cli: Client::new(headers),
        }
    }

    // Cloudflare answers failed calls with a non-200 status and a regular
    // error envelope, so the body is decoded before the status is consulted.
    fn decode<T: DeserializeOwned>(resp: Response) -> Result<(T, Option<ResultInfo>)> {
        let status = resp.status;
        match serde_json::from_str::<CfResponse<T>>(&resp.body) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if status != 200 => Err(Error::HttpError(format!("status: {}", status))),
            Err(e) => Err(e.into()),
        }
    }
}

impl Cli {
    pub async fn zones_list(&self) -> Result<Vec<CfZone>> {
        let mut zones: Vec<CfZone> = Vec::new();
        let mut page = 1;

        loop {
            let url = format!("{}/zones?page={}&per_page={}", BASE_URL, page, PER_PAGE);
            let resp = self.cli.get(&url).await?;
            let (mut batch, info): (Vec<CfZone>, _) = Self::decode(resp)?;
            zones.append(&mut batch);

            match next_page(info) {
                Some(next) => page = next,
                None => break,
            }
        }

        debug!("listed {} zones", zones.len());
        Ok(zones)
    }

    pub async fn zone_list(&self, name: &str) -> Result<Option<CfZone>> {
        let url = format!("{}/zones?name={}", BASE_URL, name);
        let resp = self.cli.get(&url).await?;
        let (zones, _): (Vec<CfZone>, _) = Self::decode(resp)?;

        match zones.len() {
            0 => Ok(None),
            1 => Ok(zones.into_iter().next()),
            _ => Err(Error::ParseError(format!("multiple zones found: {}", name))),
        }
    }

    pub async fn records_list(&self, zone_id: &str) -> Result<Vec<CfRecord>> {
        let mut records: Vec<CfRecord> = Vec::new();
        let mut page = 1;

        loop {
            let url = format!(
                "{}/zones/{}/dns_records?page={}&per_page={}",
                BASE_URL, zone_id, page, PER_PAGE
            );
            let resp = self.cli.get(&url).await?;
            let (mut batch, info): (Vec<CfRecord>, _) = Self::decode(resp)?;
            records.append(&mut batch);

            match next_page(info) {
                Some(next) => page = next,
                None => break,
            }
        }

        debug!("listed {} records in zone {}", records.len(), zone_id);
        Ok(records)
    }

    pub async fn record_list(
        &self,
        zone_id: &str,
        name: &str,
        rtype: RecordType,
    ) -> Result<Option<CfRecord>> {
        let url = format!(
            "{}/zones/{}/dns_records?name={}&type={}",
            BASE_URL, zone_id, name, rtype
        );
        let resp = self.cli.get(&url).await?;
        let (records, _): (Vec<CfRecord>, _) = Self::decode(resp)?;

        match records.len() {
            0 => Ok(None),
            1 => Ok(records.into_iter().next()),
            _ => Err(Error::ParseError(format!(
                "multiple records found: {}",
                name
            ))),
        }
    }

    pub async fn record_op_create(&self, zone_id: &str, record: &CfRecord) -> Result<CfRecord> {
        let url = format!("{}/zones/{}/dns_records", BASE_URL, zone_id);
        let body = serde_json::to_string(record)?;
        let resp = self.cli.post(&url, body).await?;
        let (created, _) = Self::decode::<CfRecord>(resp)?;

        debug!("created record {}/{}", created.name, created.rtype);
        Ok(created)
    }

    // Full replace. Fields absent from the submitted record are reset by
    // Cloudflare, not preserved.
    pub async fn record_op_update(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &CfRecord,
    ) -> Result<CfRecord> {
        let url = format!("{}/zones/{}/dns_records/{}", BASE_URL, zone_id, record_id);
        let body = serde_json::to_string(record)?;
        let resp = self.cli.put(&url, body).await?;
        let (updated, _) = Self::decode::<CfRecord>(resp)?;

        debug!("updated record {}/{}", updated.name, updated.rtype);
        Ok(updated)
    }

    pub async fn record_op_delete(&self, zone_id: &str, record_id: &str) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", BASE_URL, zone_id, record_id);
        let resp = self.cli.delete(&url).await?;
        Self::decode::<serde_json::Value>(resp)?;

        debug!("deleted record {} in zone {}", record_id, zone_id);
        Ok(())
    }
}
